//! Parse reaction arrow strings into stoichiometry and implied bounds.
//!
//! Curation tables record corrected stoichiometries as strings of the form
//! `2 atp_c + h2o_c --> adp_c + pi_c` with the arrow encoding reversibility.

use indexmap::IndexMap;
use thiserror::Error;

use crate::configuration::CONFIGURATION;

/// Direction implied by the reaction arrow
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Directionality {
    /// `-->`, `->`, `=>`: flux can only run left to right
    Forward,
    /// `<--`, `<-`, `<=`: flux can only run right to left
    Reverse,
    /// `<=>`, `<->`: flux can run in either direction
    Reversible,
}

impl Directionality {
    /// Flux bounds implied by the arrow, using the configured default magnitude
    pub fn bounds(&self) -> (f64, f64) {
        let config = CONFIGURATION.read().unwrap();
        match self {
            Directionality::Forward => (0.0, config.upper_bound),
            Directionality::Reverse => (config.lower_bound, 0.0),
            Directionality::Reversible => (config.lower_bound, config.upper_bound),
        }
    }
}

/// A parsed reaction string: stoichiometry (reactants negative, products
/// positive) plus the arrow's directionality.
#[derive(Clone, Debug)]
pub struct ParsedReaction {
    pub metabolites: IndexMap<String, f64>,
    pub directionality: Directionality,
}

/// Parse a reaction arrow string.
///
/// Coefficients default to 1, an explicit leading number applies to the
/// following metabolite id. Either side of the arrow may be empty, which is
/// how exchange and demand pseudo-reactions are written.
pub fn parse_reaction_string(input: &str) -> Result<ParsedReaction, RxnParseError> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    let arrow_position = tokens.iter().position(|token| arrow(token).is_some());
    let (arrow_index, directionality) = match arrow_position {
        Some(index) => (index, arrow(tokens[index]).unwrap()),
        None => return Err(RxnParseError::MissingArrow(input.to_string())),
    };

    let mut metabolites: IndexMap<String, f64> = IndexMap::new();
    parse_side(&tokens[..arrow_index], -1.0, &mut metabolites, input)?;
    parse_side(&tokens[arrow_index + 1..], 1.0, &mut metabolites, input)?;

    Ok(ParsedReaction {
        metabolites,
        directionality,
    })
}

fn arrow(token: &str) -> Option<Directionality> {
    match token {
        "-->" | "->" | "=>" => Some(Directionality::Forward),
        "<--" | "<-" | "<=" => Some(Directionality::Reverse),
        "<=>" | "<->" => Some(Directionality::Reversible),
        _ => None,
    }
}

fn parse_side(
    tokens: &[&str],
    sign: f64,
    metabolites: &mut IndexMap<String, f64>,
    input: &str,
) -> Result<(), RxnParseError> {
    let mut pending_coefficient: Option<f64> = None;
    for token in tokens {
        if *token == "+" {
            if pending_coefficient.is_some() {
                return Err(RxnParseError::DanglingCoefficient(input.to_string()));
            }
            continue;
        }
        // A bare number is a coefficient for the metabolite that follows.
        // Metabolite ids never parse as numbers.
        if let Ok(value) = token.parse::<f64>() {
            if pending_coefficient.is_some() {
                return Err(RxnParseError::DanglingCoefficient(input.to_string()));
            }
            pending_coefficient = Some(value);
            continue;
        }
        let coefficient = pending_coefficient.take().unwrap_or(1.0);
        *metabolites.entry(token.to_string()).or_insert(0.0) += sign * coefficient;
    }
    if pending_coefficient.is_some() {
        return Err(RxnParseError::DanglingCoefficient(input.to_string()));
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum RxnParseError {
    #[error("Reaction string has no arrow: {0}")]
    MissingArrow(String),
    #[error("Coefficient without a metabolite in reaction string: {0}")]
    DanglingCoefficient(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn irreversible_with_coefficients() {
        let parsed = parse_reaction_string("2 h_c + 0.5 o2_c --> h2o_c").unwrap();
        assert_eq!(parsed.directionality, Directionality::Forward);
        assert!((parsed.metabolites["h_c"] + 2.0).abs() < 1e-12);
        assert!((parsed.metabolites["o2_c"] + 0.5).abs() < 1e-12);
        assert!((parsed.metabolites["h2o_c"] - 1.0).abs() < 1e-12);
        assert_eq!(parsed.directionality.bounds(), (0.0, 1000.0));
    }

    #[test]
    fn reversible_arrow() {
        let parsed = parse_reaction_string("g3p_c <=> dhap_c").unwrap();
        assert_eq!(parsed.directionality, Directionality::Reversible);
        assert_eq!(parsed.directionality.bounds(), (-1000.0, 1000.0));
    }

    #[test]
    fn reverse_arrow() {
        let parsed = parse_reaction_string("etoh_c + nad_c <-- acald_c + nadh_c + h_c").unwrap();
        assert_eq!(parsed.directionality, Directionality::Reverse);
        assert_eq!(parsed.directionality.bounds(), (-1000.0, 0.0));
    }

    #[test]
    fn empty_product_side() {
        let parsed = parse_reaction_string("glc__D_e -->").unwrap();
        assert_eq!(parsed.metabolites.len(), 1);
        assert!((parsed.metabolites["glc__D_e"] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn repeated_metabolite_coefficients_sum() {
        let parsed = parse_reaction_string("a_c + a_c --> b_c").unwrap();
        assert!((parsed.metabolites["a_c"] + 2.0).abs() < 1e-12);
    }

    #[test]
    fn missing_arrow_is_an_error() {
        assert!(parse_reaction_string("a_c + b_c").is_err());
    }

    #[test]
    fn dangling_coefficient_is_an_error() {
        assert!(parse_reaction_string("2 --> b_c").is_err());
    }
}
