//! This module provides the Model struct for representing an entire metabolic model
use std::fmt::{Display, Formatter};

use crate::metabolic_model::gene::{Gene, GeneActivity};
use crate::metabolic_model::metabolite::{FormulaError, Metabolite};
use crate::metabolic_model::reaction::{Reaction, ReactionBuilder};

use indexmap::IndexMap;
use log::warn;
use thiserror::Error;

/// Represents a Genome Scale Metabolic Model
#[derive(Clone, Debug)]
pub struct Model {
    /// Map of reaction ids to Reaction Objects
    pub reactions: IndexMap<String, Reaction>,
    /// Map of gene ids to Gene Objects
    pub genes: IndexMap<String, Gene>,
    /// Map of metabolite ids to Metabolite Objects
    pub metabolites: IndexMap<String, Metabolite>,
    /// Map of reaction ids to objective function coefficients
    pub objective: IndexMap<String, f64>,
    /// Id associated with the Model
    pub id: Option<String>,
    /// Compartments in the model
    ///
    /// An IndexMap<String, String> of {short name: long name}
    pub compartments: Option<IndexMap<String, String>>,
    /// A version identifier for the Model, stored as a string
    pub version: Option<String>,
}

impl Model {
    pub fn new_empty() -> Self {
        Model {
            reactions: IndexMap::new(),
            genes: IndexMap::new(),
            metabolites: IndexMap::new(),
            objective: IndexMap::new(),
            id: None,
            compartments: None,
            version: None,
        }
    }

    /// Add a reaction to the model
    pub fn add_reaction(&mut self, reaction: Reaction) {
        let id = reaction.id.clone();
        self.reactions.insert(id, reaction);
    }

    /// Add a gene to the model
    pub fn add_gene(&mut self, gene: Gene) {
        let id = gene.id.clone();
        self.genes.insert(id, gene);
    }

    /// Add a metabolite to the model
    pub fn add_metabolite(&mut self, metabolite: Metabolite) {
        let id = metabolite.id.clone();
        self.metabolites.insert(id, metabolite);
    }

    /// Get a mutable reference to a reaction, or an error naming the id
    pub fn reaction_mut(&mut self, reaction_id: &str) -> Result<&mut Reaction, ModelError> {
        self.reactions
            .get_mut(reaction_id)
            .ok_or_else(|| ModelError::ReactionNotFound(reaction_id.to_string()))
    }

    /// Remove a reaction from the model, along with its objective term
    pub fn remove_reaction(&mut self, reaction_id: &str) -> Result<Reaction, ModelError> {
        self.objective.shift_remove(reaction_id);
        self.reactions
            .shift_remove(reaction_id)
            .ok_or_else(|| ModelError::ReactionNotFound(reaction_id.to_string()))
    }

    /// Remove a metabolite from the model and from every reaction that uses it
    pub fn remove_metabolite(&mut self, metabolite_id: &str) -> Result<Metabolite, ModelError> {
        for (_, reaction) in self.reactions.iter_mut() {
            reaction.metabolites.shift_remove(metabolite_id);
        }
        self.metabolites
            .shift_remove(metabolite_id)
            .ok_or_else(|| ModelError::MetaboliteNotFound(metabolite_id.to_string()))
    }

    /// Ids of all exchange reactions (`EX_` prefix)
    pub fn exchange_ids(&self) -> Vec<String> {
        self.reactions
            .values()
            .filter(|rxn| rxn.is_exchange())
            .map(|rxn| rxn.id.clone())
            .collect()
    }

    /// Ids of all biomass reactions (`BIOMASS` prefix)
    pub fn biomass_ids(&self) -> Vec<String> {
        self.reactions
            .values()
            .filter(|rxn| rxn.is_biomass())
            .map(|rxn| rxn.id.clone())
            .collect()
    }

    /// Make `reaction_id` the sole objective of the model
    pub fn set_objective(&mut self, reaction_id: &str) -> Result<(), ModelError> {
        if !self.reactions.contains_key(reaction_id) {
            return Err(ModelError::ReactionNotFound(reaction_id.to_string()));
        }
        self.objective.clear();
        self.objective.insert(reaction_id.to_string(), 1.0);
        Ok(())
    }

    /// Zero the bounds of a reaction so it can't carry flux
    pub fn knock_out_reaction(&mut self, reaction_id: &str) -> Result<(), ModelError> {
        self.reaction_mut(reaction_id)?.knock_out();
        Ok(())
    }

    /// Knock out a gene and propagate the change through GPR rules.
    ///
    /// The gene is marked inactive, and every reaction whose GPR now
    /// evaluates to inactive gets zeroed bounds.
    pub fn knock_out_gene(&mut self, gene_id: &str) -> Result<(), ModelError> {
        match self.genes.get_mut(gene_id) {
            Some(gene) => gene.activity = GeneActivity::Inactive,
            None => return Err(ModelError::GeneNotFound(gene_id.to_string())),
        }
        let gprs: Vec<(String, Gpr)> = self
            .reactions
            .iter()
            .filter_map(|(id, rxn)| rxn.gpr.clone().map(|gpr| (id.clone(), gpr)))
            .collect();
        for (rxn_id, gpr) in gprs {
            if self.eval_gpr(gpr)? == GeneActivity::Inactive {
                if let Some(rxn) = self.reactions.get_mut(&rxn_id) {
                    rxn.knock_out();
                }
            }
        }
        Ok(())
    }

    /// Add an unbounded sink reaction `SK_<metabolite_id>` for a metabolite
    pub fn add_sink(&mut self, metabolite_id: &str) -> Result<String, ModelError> {
        if !self.metabolites.contains_key(metabolite_id) {
            return Err(ModelError::MetaboliteNotFound(metabolite_id.to_string()));
        }
        let sink_id = format!("SK_{}", metabolite_id);
        let mut stoichiometry = IndexMap::new();
        stoichiometry.insert(metabolite_id.to_string(), -1.0);
        let sink = ReactionBuilder::default()
            .id(sink_id.clone())
            .metabolites(stoichiometry)
            .build()
            .map_err(|e| ModelError::BuildError(e.to_string()))?;
        self.add_reaction(sink);
        Ok(sink_id)
    }

    /// Add a reversible exchange reaction `EX_<metabolite_id>` for a metabolite
    pub fn add_boundary(&mut self, metabolite_id: &str) -> Result<String, ModelError> {
        if !self.metabolites.contains_key(metabolite_id) {
            return Err(ModelError::MetaboliteNotFound(metabolite_id.to_string()));
        }
        let exchange_id = format!("EX_{}", metabolite_id);
        let mut stoichiometry = IndexMap::new();
        stoichiometry.insert(metabolite_id.to_string(), -1.0);
        let exchange = ReactionBuilder::default()
            .id(exchange_id.clone())
            .metabolites(stoichiometry)
            .build()
            .map_err(|e| ModelError::BuildError(e.to_string()))?;
        self.add_reaction(exchange);
        Ok(exchange_id)
    }

    /// Remove metabolites not used by any reaction, returning the removed ids
    pub fn prune_unused_metabolites(&mut self) -> Vec<String> {
        let used: Vec<&IndexMap<String, f64>> = self
            .reactions
            .values()
            .map(|rxn| &rxn.metabolites)
            .collect();
        let unused: Vec<String> = self
            .metabolites
            .keys()
            .filter(|met_id| !used.iter().any(|stoich| stoich.contains_key(*met_id)))
            .cloned()
            .collect();
        for met_id in &unused {
            self.metabolites.shift_remove(met_id);
        }
        if !unused.is_empty() {
            warn!("Pruned {} unused metabolites", unused.len());
        }
        unused
    }

    /// Rename a metabolite, updating the stoichiometry of every reaction
    pub fn rename_metabolite(&mut self, old_id: &str, new_id: &str) -> Result<(), ModelError> {
        let mut metabolite = self
            .metabolites
            .shift_remove(old_id)
            .ok_or_else(|| ModelError::MetaboliteNotFound(old_id.to_string()))?;
        metabolite.id = new_id.to_string();
        self.metabolites.insert(new_id.to_string(), metabolite);
        for (_, reaction) in self.reactions.iter_mut() {
            if let Some(coefficient) = reaction.metabolites.shift_remove(old_id) {
                reaction.metabolites.insert(new_id.to_string(), coefficient);
            }
        }
        Ok(())
    }

    /// Rename a reaction, updating the objective if needed
    pub fn rename_reaction(&mut self, old_id: &str, new_id: &str) -> Result<(), ModelError> {
        let mut reaction = self
            .reactions
            .shift_remove(old_id)
            .ok_or_else(|| ModelError::ReactionNotFound(old_id.to_string()))?;
        reaction.id = new_id.to_string();
        self.reactions.insert(new_id.to_string(), reaction);
        if let Some(coefficient) = self.objective.shift_remove(old_id) {
            self.objective.insert(new_id.to_string(), coefficient);
        }
        Ok(())
    }

    /// Rename a gene, updating every GPR rule that references it
    pub fn rename_gene(&mut self, old_id: &str, new_id: &str) -> Result<(), ModelError> {
        let mut gene = self
            .genes
            .shift_remove(old_id)
            .ok_or_else(|| ModelError::GeneNotFound(old_id.to_string()))?;
        gene.id = new_id.to_string();
        self.genes.insert(new_id.to_string(), gene);
        for (_, reaction) in self.reactions.iter_mut() {
            if let Some(ref mut gpr) = reaction.gpr {
                gpr.rename_gene(old_id, new_id);
            }
        }
        Ok(())
    }

    /// Check the mass and charge balance of a reaction by id
    pub fn check_mass_balance(
        &self,
        reaction_id: &str,
    ) -> Result<IndexMap<String, f64>, ModelError> {
        let reaction = self
            .reactions
            .get(reaction_id)
            .ok_or_else(|| ModelError::ReactionNotFound(reaction_id.to_string()))?;
        Ok(reaction.check_mass_balance(&self.metabolites)?)
    }
}

// region GPR Functionality
/// Representation of a Gene Protein Reaction Rule as an AST
#[derive(Clone, Debug, PartialEq)]
pub enum Gpr {
    /// Operation on two genes (see [`GprOperation`])
    Operation(GprOperation),
    /// A terminal gene Node (see [`Gene`])
    GeneNode(String),
}

impl Display for Gpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_id())
    }
}

impl Gpr {
    /// Create a new binary operation node
    pub fn new_binary_operation(
        left: Gpr,
        operator: GprOperatorType,
        right: Gpr,
    ) -> Result<Gpr, GprError> {
        let op = match operator {
            GprOperatorType::Or => GprOperation::Or {
                left: Box::new(left),
                right: Box::new(right),
            },
            GprOperatorType::And => GprOperation::And {
                left: Box::new(left),
                right: Box::new(right),
            },
        };
        Ok(Gpr::Operation(op))
    }

    /// Create a new gene node
    pub fn new_gene_node(gene: &str) -> Gpr {
        Gpr::GeneNode(gene.to_string())
    }

    /// Generate a GPR string with gene ids from the GPR AST
    pub fn to_string_id(&self) -> String {
        match self {
            Gpr::Operation(op) => match op {
                GprOperation::Or { left, right } => {
                    format!("({} or {})", left.to_string_id(), right.to_string_id())
                }
                GprOperation::And { left, right } => {
                    format!("({} and {})", left.to_string_id(), right.to_string_id())
                }
            },
            Gpr::GeneNode(gene_ref) => gene_ref.to_string(),
        }
    }

    /// Collect the ids of all genes appearing in the rule
    pub fn gene_ids(&self) -> Vec<String> {
        match self {
            Gpr::Operation(op) => match op {
                GprOperation::Or { left, right } | GprOperation::And { left, right } => {
                    let mut ids = left.gene_ids();
                    ids.extend(right.gene_ids());
                    ids
                }
            },
            Gpr::GeneNode(gene) => vec![gene.clone()],
        }
    }

    /// Rewrite every occurrence of a gene id in the rule
    pub fn rename_gene(&mut self, old_id: &str, new_id: &str) {
        match self {
            Gpr::Operation(op) => match op {
                GprOperation::Or { left, right } | GprOperation::And { left, right } => {
                    left.rename_gene(old_id, new_id);
                    right.rename_gene(old_id, new_id);
                }
            },
            Gpr::GeneNode(gene) => {
                if gene == old_id {
                    *gene = new_id.to_string();
                }
            }
        }
    }
}

/// Possible operations on genes
#[derive(Clone, Debug, PartialEq)]
pub enum GprOperation {
    Or { left: Box<Gpr>, right: Box<Gpr> },
    And { left: Box<Gpr>, right: Box<Gpr> },
}

/// Types of Allowed GPR Operations
pub enum GprOperatorType {
    /// Or, results in active if either left or right are active
    Or,
    /// And, results in active if both left and right are active
    And,
}

#[derive(Clone, Debug, Error)]
pub enum GprError {
    #[error("Gene in GPR is not present in the model")]
    GeneNotFound,
}

// Model associated functions for working with GPRs
impl Model {
    /// Evaluate whether a GPR evaluates to Active or Inactive
    pub fn eval_gpr(&self, gpr: Gpr) -> Result<GeneActivity, GprError> {
        match gpr {
            Gpr::Operation(op) => match op {
                GprOperation::Or { left, right } => {
                    let l = self.eval_gpr(*left)?;
                    let r = self.eval_gpr(*right)?;
                    if l == GeneActivity::Active || r == GeneActivity::Active {
                        Ok(GeneActivity::Active)
                    } else {
                        Ok(GeneActivity::Inactive)
                    }
                }
                GprOperation::And { left, right } => {
                    let l = self.eval_gpr(*left)?;
                    let r = self.eval_gpr(*right)?;
                    if l == GeneActivity::Active && r == GeneActivity::Active {
                        Ok(GeneActivity::Active)
                    } else {
                        Ok(GeneActivity::Inactive)
                    }
                }
            },
            Gpr::GeneNode(gene) => match self.genes.get(&gene) {
                Some(g) => Ok(g.activity),
                None => Err(GprError::GeneNotFound),
            },
        }
    }
}

// endregion GPR Functionality

/// Errors raised by model manipulation
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Reaction {0} not present in the model")]
    ReactionNotFound(String),
    #[error("Metabolite {0} not present in the model")]
    MetaboliteNotFound(String),
    #[error("Gene {0} not present in the model")]
    GeneNotFound(String),
    #[error("GPR evaluation failed")]
    GprError(#[from] GprError),
    #[error(transparent)]
    FormulaError(#[from] FormulaError),
    #[error("Unable to build reaction: {0}")]
    BuildError(String),
}


#[cfg(test)]
pub(crate) mod model_tests {
    use super::*;
    use crate::metabolic_model::gene::GeneBuilder;
    use crate::metabolic_model::metabolite::MetaboliteBuilder;
    use crate::metabolic_model::reaction::ReactionBuilder;
    use crate::optimize::fba::ObjectiveSense;

    pub(crate) fn toy_model() -> Model {
        // A <-> carried in by EX_A, converted to B by CONV (gene g1), drained by EX_B
        let mut model = Model::new_empty();
        for met_id in ["a_e", "b_e"] {
            model.add_metabolite(
                MetaboliteBuilder::default()
                    .id(met_id.to_string())
                    .build()
                    .unwrap(),
            );
        }
        model.add_gene(GeneBuilder::default().id("g1".to_string()).build().unwrap());

        let mut uptake = IndexMap::new();
        uptake.insert("a_e".to_string(), 1.0);
        model.add_reaction(
            ReactionBuilder::default()
                .id("EX_a_e".to_string())
                .metabolites(uptake)
                .lower_bound(0.0)
                .upper_bound(10.0)
                .build()
                .unwrap(),
        );

        let mut conv = IndexMap::new();
        conv.insert("a_e".to_string(), -1.0);
        conv.insert("b_e".to_string(), 1.0);
        model.add_reaction(
            ReactionBuilder::default()
                .id("CONV".to_string())
                .metabolites(conv)
                .lower_bound(0.0)
                .gpr(Some(Gpr::GeneNode("g1".to_string())))
                .build()
                .unwrap(),
        );

        let mut drain = IndexMap::new();
        drain.insert("b_e".to_string(), -1.0);
        model.add_reaction(
            ReactionBuilder::default()
                .id("EX_b_e".to_string())
                .metabolites(drain)
                .lower_bound(0.0)
                .build()
                .unwrap(),
        );
        model.set_objective("CONV").unwrap();
        model
    }

    #[test]
    fn gene_knockout_propagates_to_reaction_bounds() {
        let mut model = toy_model();
        model.knock_out_gene("g1").unwrap();
        let conv = &model.reactions["CONV"];
        assert_eq!(conv.lower_bound, 0.0);
        assert_eq!(conv.upper_bound, 0.0);
    }

    #[test]
    fn gene_knockout_drops_growth_to_zero() {
        let mut model = toy_model();
        let solution = model.optimize(ObjectiveSense::Maximize).unwrap();
        assert!(solution.objective_value.unwrap() > 9.0);
        model.knock_out_gene("g1").unwrap();
        let solution = model.optimize(ObjectiveSense::Maximize).unwrap();
        assert!(solution.objective_value.unwrap().abs() < 1e-06);
    }

    #[test]
    fn rename_metabolite_updates_stoichiometry() {
        let mut model = toy_model();
        model.rename_metabolite("a_e", "glc__D_e").unwrap();
        assert!(model.metabolites.contains_key("glc__D_e"));
        assert!(model.reactions["CONV"].metabolites.contains_key("glc__D_e"));
        assert!(!model.reactions["CONV"].metabolites.contains_key("a_e"));
    }

    #[test]
    fn rename_reaction_moves_objective() {
        let mut model = toy_model();
        model.rename_reaction("CONV", "CONV2").unwrap();
        assert!((model.objective["CONV2"] - 1.0).abs() < 1e-12);
        assert!(model.objective.get("CONV").is_none());
    }

    #[test]
    fn prune_unused_metabolites_removes_orphans() {
        let mut model = toy_model();
        model.add_metabolite(
            MetaboliteBuilder::default()
                .id("orphan_c".to_string())
                .build()
                .unwrap(),
        );
        let removed = model.prune_unused_metabolites();
        assert_eq!(removed, vec!["orphan_c".to_string()]);
    }

    #[test]
    fn add_sink_creates_reversible_drain() {
        let mut model = toy_model();
        let sink_id = model.add_sink("b_e").unwrap();
        assert_eq!(sink_id, "SK_b_e");
        let sink = &model.reactions["SK_b_e"];
        assert!(sink.lower_bound < 0.0 && sink.upper_bound > 0.0);
    }

    #[test]
    fn add_boundary_creates_reversible_exchange() {
        let mut model = toy_model();
        model.add_metabolite(
            MetaboliteBuilder::default()
                .id("c_e".to_string())
                .build()
                .unwrap(),
        );
        let exchange_id = model.add_boundary("c_e").unwrap();
        assert_eq!(exchange_id, "EX_c_e");
        let exchange = &model.reactions["EX_c_e"];
        assert!(exchange.is_exchange());
        assert!(exchange.lower_bound < 0.0 && exchange.upper_bound > 0.0);
    }

    #[test]
    fn missing_ids_are_reported() {
        let mut model = toy_model();
        assert!(matches!(
            model.knock_out_gene("nope"),
            Err(ModelError::GeneNotFound(_))
        ));
        assert!(matches!(
            model.knock_out_reaction("nope"),
            Err(ModelError::ReactionNotFound(_))
        ));
    }
}
