// Solver adapters module
// Concrete implementations of SolverService, one per Cargo feature

#[cfg(feature = "cbc")]
pub mod coin_cbc_solver;
pub mod factory;
#[cfg(feature = "highs")]
pub mod highs_solver;

#[cfg(feature = "cbc")]
pub use coin_cbc_solver::CoinCbcSolver;
pub use factory::SolverFactory;
#[cfg(feature = "highs")]
pub use highs_solver::HighsSolver;

#[cfg(any(feature = "highs", feature = "cbc"))]
use crate::domain::{
    models::{Program, Solution},
    value_objects::SolutionStatus,
};

/// Relative row tolerance an incumbent must meet to be reported
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Solution for a solve interrupted by its time limit.
///
/// The backend's last assignment is kept only when it is complete and
/// feasible; otherwise the solution carries no assignment.
#[cfg(any(feature = "highs", feature = "cbc"))]
pub(crate) fn incumbent_solution(program: &Program, columns: &[f64]) -> Solution {
    if program.is_feasible(columns, FEASIBILITY_TOLERANCE) {
        Solution::with_assignment(SolutionStatus::TimeLimitReached, program, columns)
            .with_message("Time limit reached; returning the best feasible solution found")
    } else {
        Solution::new(
            SolutionStatus::TimeLimitReached,
            "Time limit reached before a feasible solution was found",
        )
    }
}

#[cfg(all(test, any(feature = "highs", feature = "cbc")))]
mod tests {
    use super::*;
    use crate::domain::{Constraint, ConstraintType, Variable};

    fn program() -> Program {
        let mut program = Program::new("incumbent");
        let x = program.add_variable(Variable::continuous("x"), 1.0).unwrap();
        program.add_constraint(
            Constraint::new(ConstraintType::GreaterThanOrEqual, vec![(x, 1.0)], 10.0)
                .with_name("floor"),
        );
        program
    }

    #[test]
    fn test_feasible_incumbent_is_kept() {
        let solution = incumbent_solution(&program(), &[12.0]);
        assert_eq!(solution.status, SolutionStatus::TimeLimitReached);
        assert!(solution.has_incumbent());
        assert_eq!(solution.objective_value, Some(12.0));
    }

    #[test]
    fn test_infeasible_or_partial_incumbent_is_dropped() {
        let short = incumbent_solution(&program(), &[9.0]);
        assert!(!short.has_incumbent());
        assert!(short.values.is_empty());

        let missing = incumbent_solution(&program(), &[]);
        assert_eq!(missing.status, SolutionStatus::TimeLimitReached);
        assert!(!missing.has_incumbent());
    }

    #[test]
    fn test_relative_tolerance_on_large_bounds() {
        let mut program = Program::new("scaled");
        let x = program.add_variable(Variable::continuous("x"), 1.0).unwrap();
        program.add_constraint(Constraint::new(
            ConstraintType::GreaterThanOrEqual,
            vec![(x, 1.0)],
            1.0e6,
        ));
        // 0.5 short of a bound of one million is within 1e-6 relative
        assert!(incumbent_solution(&program, &[999_999.5]).has_incumbent());
        assert!(!incumbent_solution(&program, &[999_990.0]).has_incumbent());
    }
}
