//! Flux balance analysis
//!
//! Translates a [`Model`] into a linear program (one variable per reaction,
//! one steady-state equality constraint per metabolite) and solves it with
//! the bundled simplex solver.

use indexmap::IndexMap;
use microlp::{ComparisonOp, OptimizationDirection, Problem, Variable};
use thiserror::Error;

use crate::metabolic_model::model::{Model, ModelError};
use crate::optimize::{FbaSolution, OptimizationStatus};

/// Direction in which to optimize the objective
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ObjectiveSense {
    Maximize,
    Minimize,
}

impl From<ObjectiveSense> for OptimizationDirection {
    fn from(sense: ObjectiveSense) -> Self {
        match sense {
            ObjectiveSense::Maximize => OptimizationDirection::Maximize,
            ObjectiveSense::Minimize => OptimizationDirection::Minimize,
        }
    }
}

impl Model {
    /// Solve the flux balance problem for this model.
    ///
    /// An infeasible or unbounded problem is not an error: it is reported
    /// through [`FbaSolution::status`] with no objective value or fluxes.
    pub fn optimize(&self, sense: ObjectiveSense) -> Result<FbaSolution, FbaError> {
        if self.objective.is_empty() {
            return Err(FbaError::NoObjective);
        }
        self.optimize_reactions(&self.objective, sense)
    }

    /// Solve the flux balance problem for an arbitrary linear objective over
    /// reactions, leaving the model's own objective untouched
    pub fn optimize_reactions(
        &self,
        objective: &IndexMap<String, f64>,
        sense: ObjectiveSense,
    ) -> Result<FbaSolution, FbaError> {
        let mut problem = Problem::new(sense.into());

        // One variable per reaction, bounded by the reaction bounds
        let mut variables: IndexMap<String, Variable> = IndexMap::new();
        for (reaction_id, reaction) in self.reactions.iter() {
            let obj_coefficient = objective.get(reaction_id).copied().unwrap_or(0.);
            let var = problem.add_var(
                obj_coefficient,
                (reaction.lower_bound, reaction.upper_bound),
            );
            variables.insert(reaction_id.clone(), var);
        }
        for objective_id in objective.keys() {
            if !variables.contains_key(objective_id) {
                return Err(FbaError::UnknownObjectiveReaction(objective_id.clone()));
            }
        }

        // One steady-state constraint per metabolite: S.v = 0
        let mut rows: IndexMap<&str, Vec<(Variable, f64)>> = IndexMap::new();
        for (reaction_id, reaction) in self.reactions.iter() {
            let var = variables[reaction_id.as_str()];
            for (metabolite_id, coefficient) in reaction.metabolites.iter() {
                rows.entry(metabolite_id.as_str())
                    .or_default()
                    .push((var, *coefficient));
            }
        }
        for (_, row) in rows.iter() {
            problem.add_constraint(row.as_slice(), ComparisonOp::Eq, 0.);
        }

        match problem.solve() {
            Ok(solution) => {
                let fluxes = variables
                    .iter()
                    .map(|(reaction_id, var)| (reaction_id.clone(), solution[*var]))
                    .collect();
                Ok(FbaSolution {
                    status: OptimizationStatus::Optimal,
                    objective_value: Some(solution.objective()),
                    fluxes: Some(fluxes),
                })
            }
            Err(microlp::Error::Infeasible) => Ok(FbaSolution {
                status: OptimizationStatus::Infeasible,
                objective_value: None,
                fluxes: None,
            }),
            Err(microlp::Error::Unbounded) => Ok(FbaSolution {
                status: OptimizationStatus::Unbounded,
                objective_value: None,
                fluxes: None,
            }),
            Err(other) => {
                log::warn!("solver halted: {other:?}");
                Ok(FbaSolution {
                    status: OptimizationStatus::SolverHalted,
                    objective_value: None,
                    fluxes: None,
                })
            }
        }
    }

    /// Optimize and return just the objective value, None when the problem
    /// could not be solved
    pub fn slim_optimize(&self, sense: ObjectiveSense) -> Result<Option<f64>, FbaError> {
        Ok(self.optimize(sense)?.objective_value)
    }
}

#[derive(Debug, Error)]
pub enum FbaError {
    #[error("Model has no objective reactions")]
    NoObjective,
    #[error("Objective reaction {0} is not in the model")]
    UnknownObjectiveReaction(String),
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}
