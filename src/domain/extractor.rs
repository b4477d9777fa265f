// Translation of a solver Solution back into sourcing decisions.

use std::fmt;

use tracing::{debug, info, warn};

use super::model_builder::BuildOptions;
use super::models::Solution;
use super::problem_data::{sorted, ProblemData};
use super::value_objects::SolutionStatus;
use super::variables::DecisionVariable;

/// Values at or below this magnitude are numerical noise
pub const EPSILON: f64 = 1e-6;

/// Indicator values above this threshold count as "on"
const INDICATOR_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct ProductionLine {
    pub plant: String,
    pub product: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcurementLine {
    pub supplier: String,
    pub material: String,
    pub quantity: f64,
}

/// Objective split by cost family; fixed costs only when enabled in the model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostBreakdown {
    pub production: f64,
    pub procurement: f64,
    pub installation: Option<f64>,
    pub selection: Option<f64>,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.production
            + self.procurement
            + self.installation.unwrap_or(0.0)
            + self.selection.unwrap_or(0.0)
    }
}

/// Domain-level plan read from a solution with an assignment
#[derive(Debug, Clone, PartialEq)]
pub struct SourcingReport {
    /// `Optimal`, or `TimeLimitReached` when the plan is the best incumbent
    pub status: SolutionStatus,
    pub objective_value: f64,
    pub opened_plants: Vec<String>,
    pub selected_suppliers: Vec<String>,
    pub production: Vec<ProductionLine>,
    pub procurement: Vec<ProcurementLine>,
    pub costs: CostBreakdown,
}

impl SourcingReport {
    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    /// Total quantity of `product` produced across plants
    pub fn produced(&self, product: &str) -> f64 {
        self.production
            .iter()
            .filter(|line| line.product == product)
            .map(|line| line.quantity)
            .sum()
    }

    /// Total quantity of `material` procured across suppliers
    pub fn procured(&self, material: &str) -> f64 {
        self.procurement
            .iter()
            .filter(|line| line.material == material)
            .map(|line| line.quantity)
            .sum()
    }
}

impl fmt::Display for SourcingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Sourcing plan ({}) ===", self.status)?;
        writeln!(f, "Objective value: {:.4}", self.objective_value)?;
        writeln!(f)?;
        writeln!(f, "Opened plants: {}", self.opened_plants.join(", "))?;
        writeln!(f, "Selected suppliers: {}", self.selected_suppliers.join(", "))?;
        writeln!(f)?;
        writeln!(f, "--- Production ---")?;
        for line in &self.production {
            writeln!(f, "  {:<20} {:<20} {:>14.4}", line.plant, line.product, line.quantity)?;
        }
        writeln!(f, "--- Procurement ---")?;
        for line in &self.procurement {
            writeln!(
                f,
                "  {:<20} {:<20} {:>14.4}",
                line.supplier, line.material, line.quantity
            )?;
        }
        writeln!(f, "--- Costs ---")?;
        writeln!(f, "  Production:   {:>14.4}", self.costs.production)?;
        writeln!(f, "  Procurement:  {:>14.4}", self.costs.procurement)?;
        if let Some(installation) = self.costs.installation {
            writeln!(f, "  Installation: {:>14.4}", installation)?;
        }
        if let Some(selection) = self.costs.selection {
            writeln!(f, "  Selection:    {:>14.4}", selection)?;
        }
        write!(f, "  Total:        {:>14.4}", self.costs.total())
    }
}

/// Why no plan could be read from a solution
#[derive(Debug, Clone, PartialEq)]
pub struct NoSolution {
    pub status: SolutionStatus,
    pub reason: String,
}

impl fmt::Display for NoSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No solution found ({}): {}", self.status, self.reason)
    }
}

/// Result of one build, solve and extract cycle
#[derive(Debug, Clone, PartialEq)]
pub enum SourcingOutcome {
    Planned(SourcingReport),
    NoSolutionFound(NoSolution),
}

impl SourcingOutcome {
    pub fn status(&self) -> SolutionStatus {
        match self {
            SourcingOutcome::Planned(report) => report.status,
            SourcingOutcome::NoSolutionFound(none) => none.status,
        }
    }

    pub fn report(&self) -> Option<&SourcingReport> {
        match self {
            SourcingOutcome::Planned(report) => Some(report),
            SourcingOutcome::NoSolutionFound(_) => None,
        }
    }
}

/// Reads plans out of solutions of programs built from the same data and options
pub struct SolutionExtractor<'a> {
    data: &'a ProblemData,
    options: &'a BuildOptions,
}

impl<'a> SolutionExtractor<'a> {
    pub fn new(data: &'a ProblemData, options: &'a BuildOptions) -> Self {
        Self { data, options }
    }

    pub fn extract(&self, solution: &Solution) -> SourcingOutcome {
        if !solution.has_incumbent() {
            let none = NoSolution {
                status: solution.status,
                reason: no_solution_reason(solution),
            };
            info!(status = %none.status, reason = %none.reason, "No sourcing plan");
            return SourcingOutcome::NoSolutionFound(none);
        }

        let value = |var: DecisionVariable| solution.value(&var.name()).unwrap_or(0.0);
        let mut costs = CostBreakdown::default();

        let mut opened_plants = Vec::new();
        let mut installation = 0.0;
        for plant in sorted(&self.data.plants) {
            let open = value(DecisionVariable::PlantOpen(plant));
            if open > INDICATOR_THRESHOLD {
                opened_plants.push(plant.to_string());
            }
            installation += open * self.data.installation_cost.get(plant).copied().unwrap_or(0.0);
        }

        let mut selected_suppliers = Vec::new();
        let mut selection = 0.0;
        for supplier in sorted(&self.data.suppliers) {
            let selected = value(DecisionVariable::SupplierSelected(supplier));
            if selected > INDICATOR_THRESHOLD {
                selected_suppliers.push(supplier.to_string());
            }
            selection += selected * self.data.selection_cost.get(supplier).copied().unwrap_or(0.0);
        }

        let mut production = Vec::new();
        for plant in sorted(&self.data.plants) {
            for product in sorted(&self.data.products) {
                let quantity = value(DecisionVariable::ProduceQty(plant, product));
                costs.production +=
                    quantity * self.data.production_cost(plant, product).unwrap_or(0.0);
                if quantity > EPSILON {
                    production.push(ProductionLine {
                        plant: plant.to_string(),
                        product: product.to_string(),
                        quantity,
                    });
                }
            }
        }

        let mut procurement = Vec::new();
        for supplier in sorted(&self.data.suppliers) {
            for material in sorted(&self.data.materials) {
                let quantity = value(DecisionVariable::ProcureQty(supplier, material));
                costs.procurement +=
                    quantity * self.data.procurement_cost(supplier, material).unwrap_or(0.0);
                if quantity > EPSILON {
                    procurement.push(ProcurementLine {
                        supplier: supplier.to_string(),
                        material: material.to_string(),
                        quantity,
                    });
                }
            }
        }

        if self.options.include_installation_cost {
            costs.installation = Some(installation);
        }
        if self.options.include_selection_cost {
            costs.selection = Some(selection);
        }

        let objective_value = solution.objective_value.unwrap_or_else(|| costs.total());
        let mismatch = (costs.total() - objective_value).abs();
        if mismatch > EPSILON * objective_value.abs().max(1.0) {
            warn!(
                objective = objective_value,
                breakdown = costs.total(),
                mismatch,
                "Cost breakdown does not reconcile with the objective value"
            );
        }

        debug!(
            production_lines = production.len(),
            procurement_lines = procurement.len(),
            "Extracted plan lines"
        );
        info!(
            status = %solution.status,
            objective = objective_value,
            plants = opened_plants.len(),
            suppliers = selected_suppliers.len(),
            "Extracted sourcing plan"
        );

        SourcingOutcome::Planned(SourcingReport {
            status: solution.status,
            objective_value,
            opened_plants,
            selected_suppliers,
            production,
            procurement,
            costs,
        })
    }
}

fn no_solution_reason(solution: &Solution) -> String {
    match solution.status {
        SolutionStatus::Infeasible => {
            "no plan satisfies demand, capacity and material balance together".to_string()
        }
        SolutionStatus::Unbounded => {
            "the objective can decrease without limit; a capacity or bound is missing from the input"
                .to_string()
        }
        SolutionStatus::TimeLimitReached => {
            "the time limit was reached before any feasible plan was found".to_string()
        }
        SolutionStatus::Optimal => {
            "the solver reported optimality without an assignment".to_string()
        }
        SolutionStatus::Error if solution.message.is_empty() => {
            "the solver backend failed".to_string()
        }
        SolutionStatus::Error => solution.message.clone(),
    }
}
