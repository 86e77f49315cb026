//! Flux variability helpers used by the model comparison report

use crate::configuration::CONFIGURATION;
use crate::metabolic_model::model::Model;
use crate::optimize::fba::{FbaError, ObjectiveSense};

impl Model {
    /// Reset every exchange reaction to the widest configured bounds.
    ///
    /// Blocked-reaction scans are run against a fully open medium so that a
    /// reaction is only reported blocked when the network itself cannot
    /// carry flux through it.
    pub fn open_exchanges(&mut self) {
        let (lower, upper) = {
            let config = CONFIGURATION.read().unwrap();
            (config.lower_bound, config.upper_bound)
        };
        for exchange_id in self.exchange_ids() {
            if let Some(reaction) = self.reactions.get_mut(&exchange_id) {
                reaction.set_bounds(lower, upper);
            }
        }
    }

    /// Ids of reactions that cannot carry flux in either direction.
    ///
    /// Each reaction is maximized and minimized in turn; a reaction whose
    /// flux range collapses to within the zero cutoff of zero is blocked.
    pub fn find_blocked_reactions(&self) -> Result<Vec<String>, FbaError> {
        let zero_cutoff = CONFIGURATION.read().unwrap().zero_cutoff;
        let mut blocked = Vec::new();
        for reaction_id in self.reactions.keys() {
            let mut objective = indexmap::IndexMap::new();
            objective.insert(reaction_id.clone(), 1.);
            let max = self
                .optimize_reactions(&objective, ObjectiveSense::Maximize)?
                .objective_value
                .unwrap_or(0.);
            if max.abs() > zero_cutoff {
                continue;
            }
            let min = self
                .optimize_reactions(&objective, ObjectiveSense::Minimize)?
                .objective_value
                .unwrap_or(0.);
            if min.abs() <= zero_cutoff {
                blocked.push(reaction_id.clone());
            }
        }
        Ok(blocked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::metabolite::MetaboliteBuilder;
    use crate::metabolic_model::model::model_tests::toy_model;
    use crate::metabolic_model::reaction::ReactionBuilder;
    use indexmap::IndexMap;

    #[test]
    fn open_exchanges_widens_bounds() {
        let mut model = toy_model();
        model.open_exchanges();
        assert_eq!(model.reactions["EX_a_e"].lower_bound, -1000.);
        assert_eq!(model.reactions["EX_a_e"].upper_bound, 1000.);
        // Internal conversion untouched
        assert_eq!(model.reactions["CONV"].lower_bound, 0.);
    }

    #[test]
    fn dead_end_reaction_is_blocked() {
        let mut model = toy_model();
        model.add_metabolite(
            MetaboliteBuilder::default()
                .id("dead_c".to_string())
                .build()
                .unwrap(),
        );
        let mut stoich = IndexMap::new();
        stoich.insert("a_e".to_string(), -1.0);
        stoich.insert("dead_c".to_string(), 1.0);
        model.add_reaction(
            ReactionBuilder::default()
                .id("DEADEND".to_string())
                .metabolites(stoich)
                .lower_bound(0.0)
                .build()
                .unwrap(),
        );
        model.open_exchanges();
        let blocked = model.find_blocked_reactions().unwrap();
        assert_eq!(blocked, vec!["DEADEND".to_string()]);
    }
}
