//! This module provides the Metabolite struct and chemical formula parsing

use std::hash::Hash;

use derive_builder::Builder;
use indexmap::IndexMap;
use thiserror::Error;

/// Represents a metabolite
#[derive(Builder, Debug, Clone)]
pub struct Metabolite {
    /// Used to identify the metabolite (must be unique)
    pub id: String,
    /// Human Readable name of the metabolite
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Which compartment the metabolite is in
    #[builder(default = "None")]
    pub compartment: Option<String>,
    /// Electrical charge of the Metabolite
    #[builder(default = "0")]
    pub charge: i32,
    /// Chemical Formula of the metabolite
    #[builder(default = "None")]
    pub formula: Option<String>,
    /// Notes about the metabolite
    #[builder(default = "None")]
    pub notes: Option<String>,
    /// Metabolite annotations
    #[builder(default = "None")]
    pub annotation: Option<String>,
}

impl Metabolite {
    /// Parse the chemical formula into a map of element symbol to count.
    ///
    /// Counts are kept as f64 since curated biomass components can carry
    /// fractional compositions. A metabolite without a formula contributes
    /// no elements.
    pub fn elements(&self) -> Result<IndexMap<String, f64>, FormulaError> {
        let mut elements: IndexMap<String, f64> = IndexMap::new();
        let formula = match &self.formula {
            Some(f) => f,
            None => return Ok(elements),
        };
        let chars: Vec<char> = formula.chars().collect();
        let mut pos = 0;
        while pos < chars.len() {
            let c = chars[pos];
            if !c.is_ascii_uppercase() {
                return Err(FormulaError::InvalidFormula {
                    metabolite: self.id.clone(),
                    formula: formula.clone(),
                });
            }
            let mut symbol = c.to_string();
            pos += 1;
            while pos < chars.len() && chars[pos].is_ascii_lowercase() {
                symbol.push(chars[pos]);
                pos += 1;
            }
            let start = pos;
            while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '.') {
                pos += 1;
            }
            let count = if start == pos {
                1.0
            } else {
                let count_str: String = chars[start..pos].iter().collect();
                count_str
                    .parse::<f64>()
                    .map_err(|_| FormulaError::InvalidFormula {
                        metabolite: self.id.clone(),
                        formula: formula.clone(),
                    })?
            };
            *elements.entry(symbol).or_insert(0.0) += count;
        }
        Ok(elements)
    }
}

impl Hash for Metabolite {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state); // Hash by id
                             // If the metabolite has an associated compartment, also hash by that
        if let Some(ref compartment) = self.compartment {
            compartment.hash(state)
        };
    }
}

#[derive(Debug, Error, Clone)]
pub enum FormulaError {
    #[error("Metabolite {metabolite} has unparseable formula {formula}")]
    InvalidFormula { metabolite: String, formula: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn met_with_formula(formula: &str) -> Metabolite {
        MetaboliteBuilder::default()
            .id("test_c".to_string())
            .formula(Some(formula.to_string()))
            .build()
            .unwrap()
    }

    #[test]
    fn glucose_elements() {
        let met = met_with_formula("C6H12O6");
        let elements = met.elements().unwrap();
        assert_eq!(elements["C"], 6.0);
        assert_eq!(elements["H"], 12.0);
        assert_eq!(elements["O"], 6.0);
    }

    #[test]
    fn two_letter_symbols_and_implicit_counts() {
        let met = met_with_formula("MgHPO4");
        let elements = met.elements().unwrap();
        assert_eq!(elements["Mg"], 1.0);
        assert_eq!(elements["H"], 1.0);
        assert_eq!(elements["P"], 1.0);
        assert_eq!(elements["O"], 4.0);
    }

    #[test]
    fn fractional_counts() {
        let met = met_with_formula("C4.5H7.2O1");
        let elements = met.elements().unwrap();
        assert!((elements["C"] - 4.5).abs() < 1e-12);
        assert!((elements["H"] - 7.2).abs() < 1e-12);
    }

    #[test]
    fn missing_formula_is_empty() {
        let met = MetaboliteBuilder::default()
            .id("nofml_c".to_string())
            .build()
            .unwrap();
        assert!(met.elements().unwrap().is_empty());
    }

    #[test]
    fn bad_formula_is_rejected() {
        let met = met_with_formula("6CH12");
        assert!(met.elements().is_err());
    }
}
