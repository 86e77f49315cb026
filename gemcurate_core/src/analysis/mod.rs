//! Model analyses: maintenance energy fitting, model comparison, and mutant
//! growth predictions.

pub mod compare;
pub mod growth;
pub mod maintenance;

use thiserror::Error;

use crate::conditions::ConditionError;
use crate::metabolic_model::model::ModelError;
use crate::optimize::fba::FbaError;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
    #[error("Solver error: {0}")]
    Fba(#[from] FbaError),
    #[error("Condition error: {0}")]
    Condition(#[from] ConditionError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Regression needs at least two feasible points, got {0}")]
    TooFewPoints(usize),
    #[error("Wild type model does not grow, cannot normalize mutant growth")]
    NoWildTypeGrowth,
}
