//! Model curation passes
//!
//! Each submodule is one table-driven pass over the model: nomenclature
//! upgrades (`idmap`), draft-reconstruction bound repairs (`bounds`),
//! stoichiometry and formula corrections (`corrections`), and biomass
//! reaction utilities (`biomass`).

pub mod biomass;
pub mod bounds;
pub mod corrections;
pub mod idmap;

use thiserror::Error;

use crate::io::rxn_parse::RxnParseError;
use crate::io::tables::TableError;
use crate::metabolic_model::metabolite::FormulaError;
use crate::metabolic_model::model::ModelError;

#[derive(Debug, Error)]
pub enum CurationError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
    #[error("Reaction string error: {0}")]
    RxnParse(#[from] RxnParseError),
    #[error("Formula error: {0}")]
    Formula(#[from] FormulaError),
    #[error("Table error: {0}")]
    Table(#[from] TableError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Metabolite {0} not found in model")]
    MetaboliteNotFound(String),
    #[error("Biomass reaction {id} does not normalize to 1 g/mmol (got {mw})")]
    BiomassNotNormalized { id: String, mw: f64 },
}
