//! Module for parsing Gene Protein Reaction strings into AST values

use crate::io::gpr_parse::lexer::LexerError;
use crate::io::gpr_parse::parser::ParseError;
use crate::metabolic_model::gene::Gene;
use crate::metabolic_model::model::Gpr;
use indexmap::IndexMap;
use thiserror::Error;

mod lexer;
pub mod parser;
mod token;

/// Parse a Gene Protein Reaction string into a GPR Tree
///
/// Genes referenced by the rule but missing from `gene_map` are inserted as
/// new active genes.
///
/// # Examples
/// ```rust
/// use indexmap::IndexMap;
/// use gemcurate_core::io::gpr_parse::parse_gpr;
/// let gpr: &str = "Clo1313_0966 and Clo1313_1798";
/// let mut gene_map = IndexMap::new();
/// let gpr_tree = parse_gpr(gpr, &mut gene_map).unwrap();
/// assert_eq!(gene_map.len(), 2);
/// ```
pub fn parse_gpr(input: &str, gene_map: &mut IndexMap<String, Gene>) -> Result<Gpr, GprParseError> {
    // Convert the GPR string into tokens
    let tokens = lexer::Lexer::new(input).scan_tokens()?;

    // Now parse those tokens into a GPR tree
    let mut parser = parser::GprParser::new(tokens, gene_map);
    let gpr = parser.parse()?;
    Ok(gpr)
}

/// Enum representing possible lex and parse errors
#[derive(Debug, Error)]
pub enum GprParseError {
    /// Lexing Error
    #[error("Error occurred during lexing (conversion of GPR string to tokens)")]
    LexingError(#[from] LexerError),
    /// Parsing Error
    #[error("Error occurred during parsing (conversion of tokens to GPR tree)")]
    ParsingError(#[from] ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::model::GprOperation;

    #[test]
    fn parse_nested_rule() {
        let mut gene_map: IndexMap<String, Gene> = IndexMap::new();
        let gpr = parse_gpr("Clo1313_0966 and (Clo1313_1798 or Clo1313_1799)", &mut gene_map)
            .unwrap();
        match gpr {
            Gpr::Operation(GprOperation::And { left, right }) => {
                assert_eq!(*left, Gpr::GeneNode("Clo1313_0966".to_string()));
                match *right {
                    Gpr::Operation(GprOperation::Or { left, right }) => {
                        assert_eq!(*left, Gpr::GeneNode("Clo1313_1798".to_string()));
                        assert_eq!(*right, Gpr::GeneNode("Clo1313_1799".to_string()));
                    }
                    other => panic!("Incorrect parse: {:?}", other),
                }
            }
            other => panic!("Incorrect parse: {:?}", other),
        }
        assert_eq!(gene_map.len(), 3);
    }

    #[test]
    fn chained_binary_is_left_associative() {
        let mut gene_map: IndexMap<String, Gene> = IndexMap::new();
        let gpr = parse_gpr("g1 and g2 or g3", &mut gene_map).unwrap();
        assert_eq!(gpr.to_string_id(), "((g1 and g2) or g3)");
    }

    #[test]
    fn unbalanced_parenthesis_is_an_error() {
        let mut gene_map: IndexMap<String, Gene> = IndexMap::new();
        assert!(parse_gpr("(g1 and g2", &mut gene_map).is_err());
    }
}
