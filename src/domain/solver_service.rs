// Domain service interface for solving programs
// The only seam through which the crate reaches a MILP backend

use std::time::Duration;

use super::models::{Program, Solution};

/// Error types for the solver service
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("Invalid program: {0}")]
    InvalidProgram(String),

    #[error("Solver not available: {0}")]
    SolverNotAvailable(String),

    #[error("Solver execution failed: {0}")]
    ExecutionFailed(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Domain service interface for MILP solvers
///
/// Implementations translate a [`Program`] into a backend model, solve it and
/// report the outcome as data. Infeasible, unbounded and timed-out solves are
/// `Ok` solutions carrying the matching status; `Err` is reserved for programs
/// that cannot be submitted at all.
pub trait SolverService: Send + Sync {
    /// Solve a program, stopping after `time_limit` if given
    fn solve(&self, program: &Program, time_limit: Option<Duration>) -> Result<Solution>;

    /// Validate a program without solving it
    fn validate(&self, program: &Program) -> Result<()> {
        let mut errors = Vec::new();
        let num_vars = program.num_variables();

        if program.objective.num_variables() != num_vars {
            errors.push(format!(
                "Objective has {} coefficients but program has {} variables",
                program.objective.num_variables(),
                num_vars
            ));
        }

        if let Some(i) = program
            .objective
            .coefficients
            .iter()
            .position(|c| !c.is_finite())
        {
            errors.push(format!("Objective coefficient {} is not finite", i));
        }

        for constraint in &program.constraints {
            if !constraint.bound.is_finite() {
                errors.push(format!(
                    "Constraint '{}' has a non-finite bound",
                    constraint.name
                ));
            }
            for &(column, coeff) in &constraint.terms {
                if column >= num_vars {
                    errors.push(format!(
                        "Constraint '{}' references column {} but program has {} variables",
                        constraint.name, column, num_vars
                    ));
                }
                if !coeff.is_finite() {
                    errors.push(format!(
                        "Constraint '{}' has a non-finite coefficient on column {}",
                        constraint.name, column
                    ));
                }
            }
        }

        for (i, var) in program.variables.iter().enumerate() {
            if let Some(upper) = var.upper_bound {
                if var.lower_bound > upper {
                    errors.push(format!(
                        "Variable {} '{}' has lower bound ({}) > upper bound ({})",
                        i, var.name, var.lower_bound, upper
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SolverError::InvalidProgram(errors.join("; ")))
        }
    }

    /// Get the name of this solver backend
    fn name(&self) -> &str;
}
