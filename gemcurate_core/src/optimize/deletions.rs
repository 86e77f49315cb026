//! Single knockout scans

use indexmap::IndexMap;

use crate::metabolic_model::model::Model;
use crate::optimize::fba::{FbaError, ObjectiveSense};

impl Model {
    /// Objective value after knocking out each reaction in turn.
    ///
    /// None for a reaction means the knockout made the problem infeasible.
    pub fn single_reaction_deletion(
        &self,
    ) -> Result<IndexMap<String, Option<f64>>, FbaError> {
        let mut outcomes = IndexMap::new();
        for reaction_id in self.reactions.keys() {
            let mut knocked = self.clone();
            // Ids come from the model itself so the lookup cannot fail
            knocked.knock_out_reaction(reaction_id).unwrap();
            let value = knocked.optimize(ObjectiveSense::Maximize)?.objective_value;
            outcomes.insert(reaction_id.clone(), value);
        }
        Ok(outcomes)
    }

    /// Objective value after knocking out each gene in turn.
    ///
    /// GPR rules can reference gene ids missing from the gene table, which
    /// surfaces here as an error rather than a panic.
    pub fn single_gene_deletion(&self) -> Result<IndexMap<String, Option<f64>>, FbaError> {
        let mut outcomes = IndexMap::new();
        for gene_id in self.genes.keys() {
            let mut knocked = self.clone();
            knocked.knock_out_gene(gene_id)?;
            let value = knocked.optimize(ObjectiveSense::Maximize)?.objective_value;
            outcomes.insert(gene_id.clone(), value);
        }
        Ok(outcomes)
    }
}
