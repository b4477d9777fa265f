use std::collections::BTreeMap;

use super::value_objects::{ConstraintType, SolutionStatus, VariableType};

/// Decision variable (column) of a program
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub variable_type: VariableType,
    pub lower_bound: f64,
    pub upper_bound: Option<f64>,
    pub name: String,
}

impl Variable {
    pub fn continuous(name: impl Into<String>) -> Self {
        Self {
            variable_type: VariableType::Continuous,
            lower_bound: 0.0,
            upper_bound: None,
            name: name.into(),
        }
    }

    pub fn binary(name: impl Into<String>) -> Self {
        Self {
            variable_type: VariableType::Binary,
            lower_bound: 0.0,
            upper_bound: Some(1.0),
            name: name.into(),
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self.variable_type, VariableType::Binary)
    }
}

/// Linear objective to minimize, one coefficient per column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectiveFunction {
    pub coefficients: Vec<f64>,
}

impl ObjectiveFunction {
    pub fn num_variables(&self) -> usize {
        self.coefficients.len()
    }

    /// Value of the objective under a full column assignment
    pub fn evaluate(&self, columns: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(columns)
            .map(|(coeff, value)| coeff * value)
            .sum()
    }
}

/// Sparse linear row: `Σ coeff · column (≤|≥) bound`
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub constraint_type: ConstraintType,
    pub terms: Vec<(usize, f64)>,
    pub bound: f64,
    pub name: String,
}

impl Constraint {
    pub fn new(constraint_type: ConstraintType, terms: Vec<(usize, f64)>, bound: f64) -> Self {
        Self {
            constraint_type,
            terms,
            bound,
            name: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn activity(&self, columns: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(column, coeff)| coeff * columns.get(column).copied().unwrap_or(0.0))
            .sum()
    }

    /// Amount by which the row is violated, zero when satisfied
    pub fn violation(&self, columns: &[f64]) -> f64 {
        let activity = self.activity(columns);
        match self.constraint_type {
            ConstraintType::LessThanOrEqual => (activity - self.bound).max(0.0),
            ConstraintType::GreaterThanOrEqual => (self.bound - activity).max(0.0),
        }
    }
}

/// A complete minimization MILP, independent of any solver backend.
///
/// Column names are unique; rows reference columns by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub name: String,
    pub objective: ObjectiveFunction,
    pub variables: Vec<Variable>,
    pub constraints: Vec<Constraint>,
    columns: BTreeMap<String, usize>,
}

impl Program {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Appends a column with its objective coefficient and returns its index.
    ///
    /// Returns `None` if a column with the same name already exists.
    pub fn add_variable(&mut self, variable: Variable, cost: f64) -> Option<usize> {
        if self.columns.contains_key(&variable.name) {
            return None;
        }
        let index = self.variables.len();
        self.columns.insert(variable.name.clone(), index);
        self.variables.push(variable);
        self.objective.coefficients.push(cost);
        Some(index)
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn num_integer_variables(&self) -> usize {
        self.variables.iter().filter(|v| v.is_integer()).count()
    }

    pub fn is_mixed_integer(&self) -> bool {
        self.num_integer_variables() > 0
    }

    /// Whether every objective term is bounded in its improving direction,
    /// which rules out an unbounded minimum
    pub fn has_bounded_objective(&self) -> bool {
        self.variables
            .iter()
            .zip(&self.objective.coefficients)
            .all(|(var, &coeff)| {
                if coeff > 0.0 {
                    var.lower_bound.is_finite()
                } else if coeff < 0.0 {
                    var.upper_bound.is_some_and(f64::is_finite)
                } else {
                    true
                }
            })
    }

    /// Pairs every column name with its value
    pub fn assignment(&self, columns: &[f64]) -> BTreeMap<String, f64> {
        self.variables
            .iter()
            .zip(columns)
            .map(|(var, &value)| (var.name.clone(), value))
            .collect()
    }

    /// Largest row or bound violation, scaled by the magnitude of the bound
    pub fn max_violation(&self, columns: &[f64]) -> f64 {
        let rows = self
            .constraints
            .iter()
            .map(|c| c.violation(columns) / c.bound.abs().max(1.0));

        let bounds = self.variables.iter().zip(columns).map(|(var, &value)| {
            let below = (var.lower_bound - value).max(0.0);
            let above = var
                .upper_bound
                .map_or(0.0, |upper| (value - upper).max(0.0));
            below.max(above)
        });

        rows.chain(bounds).fold(0.0, f64::max)
    }

    pub fn max_integrality_violation(&self, columns: &[f64]) -> f64 {
        self.variables
            .iter()
            .zip(columns)
            .filter(|(var, _)| var.is_integer())
            .map(|(_, &value)| (value - value.round()).abs())
            .fold(0.0, f64::max)
    }

    /// Whether `columns` is a complete assignment satisfying every row and bound
    pub fn is_feasible(&self, columns: &[f64], tolerance: f64) -> bool {
        columns.len() == self.num_variables()
            && columns.iter().all(|v| v.is_finite())
            && self.max_violation(columns) <= tolerance
    }
}

/// Statistics about the solve process
#[derive(Debug, Clone, Default)]
pub struct SolverStatistics {
    pub solve_time_ms: f64,
    pub num_variables: u32,
    pub num_constraints: u32,
    pub num_binary_vars: u32,
}

impl SolverStatistics {
    pub fn for_program(program: &Program, solve_time_ms: f64) -> Self {
        Self {
            solve_time_ms,
            num_variables: program.num_variables() as u32,
            num_constraints: program.num_constraints() as u32,
            num_binary_vars: program.num_integer_variables() as u32,
        }
    }
}

/// Quality metrics for the solution
#[derive(Debug, Clone, Default)]
pub struct SolutionQuality {
    pub max_constraint_violation: f64,
    pub max_integrality_violation: f64,
}

/// Result of submitting a program to a solver backend
#[derive(Debug, Clone)]
pub struct Solution {
    pub status: SolutionStatus,
    pub objective_value: Option<f64>,
    pub values: BTreeMap<String, f64>,
    pub message: String,
    pub statistics: SolverStatistics,
    pub quality: SolutionQuality,
}

impl Solution {
    /// Solution without any assignment
    pub fn new(status: SolutionStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            objective_value: None,
            values: BTreeMap::new(),
            message: message.into(),
            statistics: SolverStatistics::default(),
            quality: SolutionQuality::default(),
        }
    }

    /// Solution carrying an assignment of every column of `program`
    pub fn with_assignment(status: SolutionStatus, program: &Program, columns: &[f64]) -> Self {
        Self {
            status,
            objective_value: Some(program.objective.evaluate(columns)),
            values: program.assignment(columns),
            message: String::new(),
            statistics: SolverStatistics::default(),
            quality: SolutionQuality {
                max_constraint_violation: program.max_violation(columns),
                max_integrality_violation: program.max_integrality_violation(columns),
            },
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_statistics(mut self, statistics: SolverStatistics) -> Self {
        self.statistics = statistics;
        self
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    /// Whether the solution carries a usable assignment
    pub fn has_incumbent(&self) -> bool {
        self.objective_value.is_some()
            && matches!(
                self.status,
                SolutionStatus::Optimal | SolutionStatus::TimeLimitReached
            )
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }
}
