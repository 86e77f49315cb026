//! This module provides a struct for representing reactions
use crate::configuration::CONFIGURATION;
use crate::metabolic_model::metabolite::{FormulaError, Metabolite};
use crate::metabolic_model::model::Gpr;

use derive_builder::Builder;
use indexmap::IndexMap;
use log::warn;

/// Coefficients with a magnitude below this are dropped when merging
/// stoichiometries.
const STOICHIOMETRY_EPS: f64 = 1e-09;

/// Represents a reaction in the metabolic model
#[derive(Builder, Debug, Clone)]
pub struct Reaction {
    /// Used to identify the reaction
    pub id: String,
    /// Metabolite stoichiometry of the reaction, keyed by metabolite id
    #[builder(default = "IndexMap::new()")]
    pub metabolites: IndexMap<String, f64>,
    /// Human-readable reaction name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Gene Protein Reaction rule to determine if reaction is active
    #[builder(default = "None")]
    pub gpr: Option<Gpr>,
    /// Lower flux bound
    #[builder(default = "CONFIGURATION.read().unwrap().lower_bound")]
    pub lower_bound: f64,
    /// Upper flux bound
    #[builder(default = "CONFIGURATION.read().unwrap().upper_bound")]
    pub upper_bound: f64,
    /// Reaction subsystem
    #[builder(default = "None")]
    pub subsystem: Option<String>,
    /// Notes about the reaction
    #[builder(default = "None")]
    pub notes: Option<String>,
    /// Reaction Annotations
    #[builder(default = "None")]
    pub annotation: Option<String>,
}

impl Reaction {
    /// Whether this reaction exchanges a metabolite with the environment
    pub fn is_exchange(&self) -> bool {
        self.id.starts_with("EX_")
    }

    /// Whether this reaction is a biomass objective function
    pub fn is_biomass(&self) -> bool {
        self.id.starts_with("BIOMASS")
    }

    /// Set both flux bounds at once.
    ///
    /// Keeps the invariant `lower_bound <= upper_bound`: inverted input,
    /// which table-driven bound edits can produce, is swapped with a warning.
    pub fn set_bounds(&mut self, lower_bound: f64, upper_bound: f64) {
        if lower_bound > upper_bound {
            warn!(
                "Inverted bounds ({}, {}) on reaction {}, swapping",
                lower_bound, upper_bound, self.id
            );
            self.lower_bound = upper_bound;
            self.upper_bound = lower_bound;
            return;
        }
        self.lower_bound = lower_bound;
        self.upper_bound = upper_bound;
    }

    /// Zero both flux bounds so the reaction can't carry flux
    pub fn knock_out(&mut self) {
        self.set_bounds(0.0, 0.0);
    }

    /// Merge metabolites into the reaction stoichiometry.
    ///
    /// Coefficients for metabolites already present are summed, and entries
    /// whose coefficient cancels to zero are removed.
    pub fn add_metabolites(&mut self, metabolites: &IndexMap<String, f64>) {
        for (met_id, coefficient) in metabolites {
            *self.metabolites.entry(met_id.clone()).or_insert(0.0) += coefficient;
        }
        self.metabolites
            .retain(|_, coefficient| coefficient.abs() > STOICHIOMETRY_EPS);
    }

    /// Remove the given coefficients from the reaction stoichiometry
    pub fn subtract_metabolites(&mut self, metabolites: &IndexMap<String, f64>) {
        let negated: IndexMap<String, f64> = metabolites
            .iter()
            .map(|(met_id, coefficient)| (met_id.clone(), -coefficient))
            .collect();
        self.add_metabolites(&negated);
    }

    /// Replace the entire stoichiometry of the reaction
    pub fn set_metabolites(&mut self, metabolites: IndexMap<String, f64>) {
        self.metabolites = metabolites;
        self.metabolites
            .retain(|_, coefficient| coefficient.abs() > STOICHIOMETRY_EPS);
    }

    /// Check the elemental and charge balance of the reaction.
    ///
    /// Returns a map from element symbol (plus the pseudo element "charge")
    /// to the net residual. An empty map means the reaction is balanced.
    /// Metabolites missing from `metabolites` contribute nothing, matching
    /// the permissive behavior appropriate during curation.
    pub fn check_mass_balance(
        &self,
        metabolites: &IndexMap<String, Metabolite>,
    ) -> Result<IndexMap<String, f64>, FormulaError> {
        let mut balance: IndexMap<String, f64> = IndexMap::new();
        for (met_id, coefficient) in &self.metabolites {
            let met = match metabolites.get(met_id) {
                Some(met) => met,
                None => continue,
            };
            for (element, count) in met.elements()? {
                *balance.entry(element).or_insert(0.0) += coefficient * count;
            }
            *balance.entry("charge".to_string()).or_insert(0.0) +=
                coefficient * f64::from(met.charge);
        }
        let tolerance = CONFIGURATION.read().unwrap().tolerance;
        balance.retain(|_, residual| residual.abs() > tolerance);
        Ok(balance)
    }

    /// Render the reaction as an arrow string, e.g. `atp_c + h2o_c --> adp_c + h_c + pi_c`
    pub fn to_reaction_string(&self) -> String {
        let mut reactants: Vec<String> = Vec::new();
        let mut products: Vec<String> = Vec::new();
        for (met_id, coefficient) in &self.metabolites {
            let magnitude = coefficient.abs();
            let term = if (magnitude - 1.0).abs() < STOICHIOMETRY_EPS {
                met_id.clone()
            } else {
                format!("{} {}", magnitude, met_id)
            };
            if *coefficient < 0.0 {
                reactants.push(term);
            } else {
                products.push(term);
            }
        }
        let arrow = if self.lower_bound < 0.0 && self.upper_bound > 0.0 {
            "<=>"
        } else if self.upper_bound > 0.0 || self.lower_bound >= 0.0 {
            "-->"
        } else {
            "<--"
        };
        format!("{} {} {}", reactants.join(" + "), arrow, products.join(" + "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::metabolite::MetaboliteBuilder;

    fn atpm() -> Reaction {
        let mut metabolites = IndexMap::new();
        metabolites.insert("atp_c".to_string(), -1.0);
        metabolites.insert("h2o_c".to_string(), -1.0);
        metabolites.insert("adp_c".to_string(), 1.0);
        metabolites.insert("h_c".to_string(), 1.0);
        metabolites.insert("pi_c".to_string(), 1.0);
        ReactionBuilder::default()
            .id("ATPM".to_string())
            .metabolites(metabolites)
            .lower_bound(0.0)
            .upper_bound(1000.0)
            .build()
            .unwrap()
    }

    #[test]
    fn add_metabolites_merges_and_cancels() {
        let mut rxn = atpm();
        let mut update = IndexMap::new();
        update.insert("atp_c".to_string(), 1.0);
        update.insert("pi_c".to_string(), 1.0);
        rxn.add_metabolites(&update);
        assert!(rxn.metabolites.get("atp_c").is_none());
        assert!((rxn.metabolites["pi_c"] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn subtract_then_add_round_trips() {
        let mut rxn = atpm();
        let original = rxn.metabolites.clone();
        rxn.subtract_metabolites(&original.clone());
        assert!(rxn.metabolites.is_empty());
        rxn.add_metabolites(&original);
        assert_eq!(rxn.metabolites.len(), 5);
    }

    #[test]
    fn inverted_bounds_are_swapped() {
        let mut rxn = atpm();
        rxn.set_bounds(10.0, -10.0);
        assert_eq!(rxn.lower_bound, -10.0);
        assert_eq!(rxn.upper_bound, 10.0);
        assert!(rxn.lower_bound <= rxn.upper_bound);
    }

    #[test]
    fn knock_out_zeroes_bounds() {
        let mut rxn = atpm();
        rxn.knock_out();
        assert_eq!(rxn.lower_bound, 0.0);
        assert_eq!(rxn.upper_bound, 0.0);
    }

    #[test]
    fn mass_balance_of_water_formation() {
        let mut metabolites = IndexMap::new();
        for (id, formula, charge) in [("h_c", "H", 1), ("oh_c", "HO", -1), ("h2o_c", "H2O", 0)] {
            metabolites.insert(
                id.to_string(),
                MetaboliteBuilder::default()
                    .id(id.to_string())
                    .formula(Some(formula.to_string()))
                    .charge(charge)
                    .build()
                    .unwrap(),
            );
        }
        let mut stoich = IndexMap::new();
        stoich.insert("h_c".to_string(), -1.0);
        stoich.insert("oh_c".to_string(), -1.0);
        stoich.insert("h2o_c".to_string(), 1.0);
        let rxn = ReactionBuilder::default()
            .id("HOH".to_string())
            .metabolites(stoich)
            .build()
            .unwrap();
        let balance = rxn.check_mass_balance(&metabolites).unwrap();
        assert!(balance.is_empty(), "expected balanced, got {:?}", balance);
    }

    #[test]
    fn unbalanced_reaction_reports_residual() {
        let mut metabolites = IndexMap::new();
        metabolites.insert(
            "h2o_c".to_string(),
            MetaboliteBuilder::default()
                .id("h2o_c".to_string())
                .formula(Some("H2O".to_string()))
                .build()
                .unwrap(),
        );
        let mut stoich = IndexMap::new();
        stoich.insert("h2o_c".to_string(), 1.0);
        let rxn = ReactionBuilder::default()
            .id("WATER_SOURCE".to_string())
            .metabolites(stoich)
            .build()
            .unwrap();
        let balance = rxn.check_mass_balance(&metabolites).unwrap();
        assert!((balance["H"] - 2.0).abs() < 1e-12);
        assert!((balance["O"] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn reaction_string_rendering() {
        let rxn = atpm();
        assert_eq!(
            rxn.to_reaction_string(),
            "atp_c + h2o_c --> adp_c + h_c + pi_c"
        );
    }
}
