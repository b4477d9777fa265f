// HiGHS Solver Adapter
// Implements the SolverService interface for HiGHS
// This is an adapter pattern - translates our domain programs to the HiGHS API

use crate::domain::{
    models::{Program, Solution, SolverStatistics},
    solver_service::{Result, SolverService},
    value_objects::{ConstraintType, SolutionStatus, VariableType},
};
use highs::{Col, HighsModelStatus, RowProblem, Sense};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::{incumbent_solution, FEASIBILITY_TOLERANCE};

pub struct HighsSolver {
    gap_tolerance: Option<f64>,
    verbose: bool,
}

impl HighsSolver {
    pub fn new() -> Self {
        Self {
            gap_tolerance: None,
            verbose: false,
        }
    }

    /// Relative MIP gap at which the search stops
    pub fn with_gap_tolerance(mut self, gap: Option<f64>) -> Self {
        self.gap_tolerance = gap;
        self
    }

    /// Let HiGHS print its own log to stdout
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Default for HighsSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for HighsSolver {
    fn solve(&self, program: &Program, time_limit: Option<Duration>) -> Result<Solution> {
        // Validate first
        self.validate(program)?;

        let start_time = Instant::now();

        // Use HiGHS RowProblem (add columns first, then rows)
        let mut pb = RowProblem::default();
        let mut cols: Vec<Col> = Vec::with_capacity(program.num_variables());

        for (var_def, &obj_coeff) in program
            .variables
            .iter()
            .zip(&program.objective.coefficients)
        {
            let lower = var_def.lower_bound;
            let upper = var_def.upper_bound.unwrap_or(f64::INFINITY);

            let col = match var_def.variable_type {
                VariableType::Binary => pb.add_integer_column(obj_coeff, lower..=upper),
                VariableType::Continuous => pb.add_column(obj_coeff, lower..=upper),
            };
            cols.push(col);
        }

        for constraint in &program.constraints {
            let terms: Vec<(Col, f64)> = constraint
                .terms
                .iter()
                .filter(|&&(_, coeff)| coeff != 0.0)
                .map(|&(column, coeff)| (cols[column], coeff))
                .collect();

            match constraint.constraint_type {
                ConstraintType::LessThanOrEqual => {
                    pb.add_row(..=constraint.bound, &terms);
                }
                ConstraintType::GreaterThanOrEqual => {
                    pb.add_row(constraint.bound.., &terms);
                }
            }
        }

        let mut model = pb.optimise(Sense::Minimise);
        model.set_option("output_flag", self.verbose);
        if let Some(limit) = time_limit {
            model.set_option("time_limit", limit.as_secs_f64());
        }
        if let Some(gap) = self.gap_tolerance {
            model.set_option("mip_rel_gap", gap);
        }

        debug!(
            variables = program.num_variables(),
            constraints = program.num_constraints(),
            mixed_integer = program.is_mixed_integer(),
            time_limit_secs = time_limit.map(|d| d.as_secs_f64()),
            "Submitting program to HiGHS"
        );

        let solved = match model.try_solve() {
            Ok(solved) => solved,
            Err(status) => {
                return Ok(Solution::new(
                    SolutionStatus::Error,
                    format!("HiGHS failed to run: {:?}", status),
                ));
            }
        };
        let solve_time = start_time.elapsed().as_secs_f64() * 1000.0;
        let statistics = SolverStatistics::for_program(program, solve_time);

        let solution = match solved.status() {
            HighsModelStatus::Optimal => {
                let columns = solved.get_solution().columns().to_vec();
                Solution::with_assignment(SolutionStatus::Optimal, program, &columns)
                    .with_message(format!("Optimal solution found for '{}'", program.name))
            }
            // No columns: the empty assignment is the only candidate
            HighsModelStatus::ModelEmpty if program.is_feasible(&[], FEASIBILITY_TOLERANCE) => {
                Solution::with_assignment(SolutionStatus::Optimal, program, &[])
                    .with_message(format!("Program '{}' has no columns", program.name))
            }
            HighsModelStatus::ModelEmpty => Solution::new(
                SolutionStatus::Infeasible,
                "Problem is infeasible: rows without columns cannot be satisfied",
            ),
            HighsModelStatus::ReachedTimeLimit => {
                let columns = solved.get_solution().columns().to_vec();
                incumbent_solution(program, &columns)
            }
            HighsModelStatus::Infeasible => Solution::new(
                SolutionStatus::Infeasible,
                "Problem is infeasible: no solution satisfies all constraints",
            ),
            // A bounded objective cannot diverge, so only infeasibility remains
            HighsModelStatus::UnboundedOrInfeasible if program.has_bounded_objective() => {
                Solution::new(
                    SolutionStatus::Infeasible,
                    "Problem is infeasible: no solution satisfies all constraints",
                )
            }
            HighsModelStatus::Unbounded | HighsModelStatus::UnboundedOrInfeasible => {
                Solution::new(
                    SolutionStatus::Unbounded,
                    "Problem is unbounded: objective can be improved infinitely",
                )
            }
            status => Solution::new(
                SolutionStatus::Error,
                format!("HiGHS solver returned status: {:?}", status),
            ),
        }
        .with_statistics(statistics);

        info!(
            backend = self.name(),
            status = %solution.status,
            objective = solution.objective_value,
            solve_time_ms = solve_time,
            "Solve finished"
        );

        Ok(solution)
    }

    fn name(&self) -> &str {
        "HiGHS"
    }
}
