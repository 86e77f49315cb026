//! Module for constructing and solving flux balance problems

pub mod deletions;
pub mod fba;
pub mod variability;

use indexmap::IndexMap;

/// Struct representing the solution to a flux balance problem
#[derive(Clone, Debug)]
pub struct FbaSolution {
    /// The status of the optimization problem, representing if the optimization was
    /// completed successfully
    pub status: OptimizationStatus,
    /// Optimized value of the objective
    ///
    /// Some(f64) if the optimization was completed successfully, None otherwise
    pub objective_value: Option<f64>,
    /// Flux through every reaction at the optimum,
    ///
    /// Some(IndexMap), keyed by reaction id, with values corresponding to reaction
    /// fluxes at optimum if the problem could be solved, None otherwise
    pub fluxes: Option<IndexMap<String, f64>>,
}

impl FbaSolution {
    /// Whether the solver found an optimal solution
    pub fn is_optimal(&self) -> bool {
        self.status == OptimizationStatus::Optimal
    }

    /// Flux through a single reaction at the optimum
    pub fn flux(&self, reaction_id: &str) -> Option<f64> {
        self.fluxes
            .as_ref()
            .and_then(|fluxes| fluxes.get(reaction_id))
            .copied()
    }
}

/// Status of an optimization problem
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum OptimizationStatus {
    /// Problem has been optimized
    Optimal,
    /// Problem can't be optimized because objective value is not bounded
    Unbounded,
    /// Problem can't be solved because it is infeasible (conflicting constraints)
    Infeasible,
    /// The solver failed for a reason other than the problem structure
    SolverHalted,
}
