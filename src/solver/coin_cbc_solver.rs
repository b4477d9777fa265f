// COIN-OR CBC adapter, reached through good_lp

use crate::domain::{
    models::{Program, Solution, SolverStatistics},
    solver_service::{Result, SolverService},
    value_objects::{ConstraintType, SolutionStatus, VariableType},
};
use good_lp::{
    solvers::{coin_cbc, SolutionStatus as CbcStatus, WithTimeLimit},
    variable, variables, Expression, ResolutionError, Solution as GoodLpSolution, SolverModel,
    Variable as GoodLpVariable,
};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::incumbent_solution;

pub struct CoinCbcSolver {
    gap_tolerance: Option<f64>,
    verbose: bool,
}

impl CoinCbcSolver {
    pub fn new() -> Self {
        Self {
            gap_tolerance: None,
            verbose: false,
        }
    }

    /// Relative MIP gap at which branch and cut stops (`ratioGap`)
    pub fn with_gap_tolerance(mut self, gap: Option<f64>) -> Self {
        self.gap_tolerance = gap;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Default for CoinCbcSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for CoinCbcSolver {
    fn solve(&self, program: &Program, time_limit: Option<Duration>) -> Result<Solution> {
        self.validate(program)?;

        let start_time = Instant::now();

        let mut vars = variables!();
        let mut lp_variables: Vec<GoodLpVariable> = Vec::with_capacity(program.num_variables());

        for var_def in &program.variables {
            let mut definition = match var_def.variable_type {
                VariableType::Binary => variable().binary(),
                VariableType::Continuous => variable(),
            };
            definition = definition.min(var_def.lower_bound);
            if let Some(upper) = var_def.upper_bound {
                definition = definition.max(upper);
            }
            lp_variables.push(vars.add(definition));
        }

        let mut objective: Expression = 0.into();
        for (&coeff, &var) in program.objective.coefficients.iter().zip(&lp_variables) {
            if coeff != 0.0 {
                objective += coeff * var;
            }
        }

        let mut model = vars.minimise(objective).using(coin_cbc::coin_cbc);
        model.set_parameter("log", if self.verbose { "1" } else { "0" });
        if let Some(gap) = self.gap_tolerance {
            model.set_parameter("ratioGap", &gap.to_string());
        }
        if let Some(limit) = time_limit {
            model = model.with_time_limit(limit.as_secs_f64());
        }

        for constraint in &program.constraints {
            let mut lhs: Expression = 0.into();
            for &(column, coeff) in &constraint.terms {
                if coeff != 0.0 {
                    lhs += coeff * lp_variables[column];
                }
            }

            model = match constraint.constraint_type {
                ConstraintType::LessThanOrEqual => model.with(lhs.leq(constraint.bound)),
                ConstraintType::GreaterThanOrEqual => model.with(lhs.geq(constraint.bound)),
            };
        }

        debug!(
            variables = program.num_variables(),
            constraints = program.num_constraints(),
            mixed_integer = program.is_mixed_integer(),
            time_limit_secs = time_limit.map(|d| d.as_secs_f64()),
            "Submitting program to CBC"
        );

        let result = model.solve();
        let solve_time = start_time.elapsed().as_secs_f64() * 1000.0;
        let statistics = SolverStatistics::for_program(program, solve_time);

        let solution = match result {
            Ok(sol) => {
                let columns: Vec<f64> = lp_variables.iter().map(|&var| sol.value(var)).collect();
                match sol.status() {
                    CbcStatus::TimeLimit => incumbent_solution(program, &columns),
                    CbcStatus::Optimal | CbcStatus::GapLimit => {
                        Solution::with_assignment(SolutionStatus::Optimal, program, &columns)
                            .with_message(format!(
                                "Optimal solution found for '{}'",
                                program.name
                            ))
                    }
                }
            }
            Err(ResolutionError::Infeasible) => Solution::new(
                SolutionStatus::Infeasible,
                "Problem is infeasible: no solution satisfies all constraints",
            ),
            Err(ResolutionError::Unbounded) => Solution::new(
                SolutionStatus::Unbounded,
                "Problem is unbounded: objective can be improved infinitely",
            ),
            Err(e) => Solution::new(
                SolutionStatus::Error,
                format!("CBC solver failed: {}", e),
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
        "COIN-OR CBC"
    }
}
