// Translation of ProblemData into a solver-agnostic Program.
// Columns and rows are emitted over lexicographically sorted identifier sets,
// so two builds from equal data compare equal regardless of the order in
// which the sets were supplied.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::models::{Constraint, Program, Variable};
use super::problem_data::{sorted, Key, ProblemData, ValidationError};
use super::value_objects::ConstraintType;
use super::variables::{DecisionVariable, Row};

pub const DEFAULT_MODEL_NAME: &str = "production_sourcing";

/// Formulation switches that do not belong to the instance data
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildOptions {
    /// Add `Σ InstallationCost · PlantOpen` to the objective
    pub include_installation_cost: bool,
    /// Add `Σ SelectionCost · SupplierSelected` to the objective
    pub include_selection_cost: bool,
    /// Universal quantity bound; adds `qty ≤ M · indicator` rows for every pair.
    /// Must cover every pair's linking bound
    pub big_m: Option<f64>,
    /// Name given to the built program
    pub model_name: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            include_installation_cost: false,
            include_selection_cost: false,
            big_m: None,
            model_name: DEFAULT_MODEL_NAME.to_string(),
        }
    }
}

impl BuildOptions {
    pub fn with_fixed_costs(mut self, installation: bool, selection: bool) -> Self {
        self.include_installation_cost = installation;
        self.include_selection_cost = selection;
        self
    }

    pub fn with_big_m(mut self, big_m: f64) -> Self {
        self.big_m = Some(big_m);
        self
    }
}

/// Column indices of the four variable families
#[derive(Default)]
struct Columns<'a> {
    open: BTreeMap<&'a str, usize>,
    select: BTreeMap<&'a str, usize>,
    produce: BTreeMap<(&'a str, &'a str), usize>,
    procure: BTreeMap<(&'a str, &'a str), usize>,
}

/// Quantity each indicator is linked at: the capacity when finite, otherwise
/// the most the pair can carry in a cost-minimal plan
#[derive(Default)]
struct LinkBounds<'a> {
    plant: BTreeMap<(&'a str, &'a str), f64>,
    supplier: BTreeMap<(&'a str, &'a str), f64>,
}

/// Builds the sourcing MILP for one problem instance
pub struct ModelBuilder<'a> {
    data: &'a ProblemData,
    options: &'a BuildOptions,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(data: &'a ProblemData, options: &'a BuildOptions) -> Self {
        Self { data, options }
    }

    /// Validate the data and options, then emit columns, rows and objective
    pub fn build(&self) -> Result<Program, ValidationError> {
        self.data.validate()?;
        let bounds = self.link_bounds()?;
        self.check_options(&bounds)?;

        let plants = sorted(&self.data.plants);
        let suppliers = sorted(&self.data.suppliers);
        let products = sorted(&self.data.products);
        let materials = sorted(&self.data.materials);

        let mut program = Program::new(self.options.model_name.clone());
        let mut columns = Columns::default();

        for &plant in &plants {
            let cost = if self.options.include_installation_cost {
                self.data.installation_cost.get(plant).copied().unwrap_or(0.0)
            } else {
                0.0
            };
            let var = DecisionVariable::PlantOpen(plant);
            columns
                .open
                .insert(plant, push_column(&mut program, Variable::binary(var.name()), cost)?);
        }

        for &supplier in &suppliers {
            let cost = if self.options.include_selection_cost {
                self.data.selection_cost.get(supplier).copied().unwrap_or(0.0)
            } else {
                0.0
            };
            let var = DecisionVariable::SupplierSelected(supplier);
            columns.select.insert(
                supplier,
                push_column(&mut program, Variable::binary(var.name()), cost)?,
            );
        }

        for &plant in &plants {
            for &product in &products {
                // Pairs with zero capacity may have no cost; their quantity is forced to zero
                let cost = self.data.production_cost(plant, product).unwrap_or(0.0);
                let var = DecisionVariable::ProduceQty(plant, product);
                columns.produce.insert(
                    (plant, product),
                    push_column(&mut program, Variable::continuous(var.name()), cost)?,
                );
            }
        }

        for &supplier in &suppliers {
            for &material in &materials {
                let cost = self.data.procurement_cost(supplier, material).unwrap_or(0.0);
                let var = DecisionVariable::ProcureQty(supplier, material);
                columns.procure.insert(
                    (supplier, material),
                    push_column(&mut program, Variable::continuous(var.name()), cost)?,
                );
            }
        }

        let linking = self.add_capacity_rows(&mut program, &columns, &bounds);
        debug!(rows = linking, "Added capacity-linking rows");

        if let Some(big_m) = self.options.big_m {
            let rows = self.add_big_m_rows(&mut program, &columns, big_m);
            debug!(rows, big_m, "Added big-M rows");
        }

        for &material in &materials {
            let mut terms = Vec::new();
            for &plant in &plants {
                for &product in &products {
                    let ratio = self.data.bill_of_materials(product, material).unwrap_or(0.0);
                    if ratio != 0.0 {
                        terms.push((columns.produce[&(plant, product)], ratio));
                    }
                }
            }
            for &supplier in &suppliers {
                terms.push((columns.procure[&(supplier, material)], -1.0));
            }
            program.add_constraint(
                Constraint::new(ConstraintType::LessThanOrEqual, terms, 0.0)
                    .with_name(Row::MaterialBalance(material).to_string()),
            );
        }
        debug!(rows = materials.len(), "Added material balance rows");

        for &product in &products {
            let terms = plants
                .iter()
                .map(|&plant| (columns.produce[&(plant, product)], 1.0))
                .collect();
            let demand = self.data.demand.get(product).copied().unwrap_or(0.0);
            program.add_constraint(
                Constraint::new(ConstraintType::GreaterThanOrEqual, terms, demand)
                    .with_name(Row::Demand(product).to_string()),
            );
        }
        debug!(rows = products.len(), "Added demand rows");

        info!(
            model = %program.name,
            variables = program.num_variables(),
            binaries = program.num_integer_variables(),
            constraints = program.num_constraints(),
            "Built sourcing program"
        );

        Ok(program)
    }

    /// `qty − bound · indicator ≤ 0` for every pair
    fn add_capacity_rows(
        &self,
        program: &mut Program,
        columns: &Columns<'a>,
        bounds: &LinkBounds<'a>,
    ) -> usize {
        let before = program.num_constraints();

        for (&(plant, product), &produce) in &columns.produce {
            program.add_constraint(linking_row(
                produce,
                columns.open[plant],
                bounds.plant[&(plant, product)],
                Row::PlantCapacity(plant, product).to_string(),
            ));
        }

        for (&(supplier, material), &procure) in &columns.procure {
            program.add_constraint(linking_row(
                procure,
                columns.select[supplier],
                bounds.supplier[&(supplier, material)],
                Row::SupplierCapacity(supplier, material).to_string(),
            ));
        }

        program.num_constraints() - before
    }

    /// Linking bound of every plant and supplier pair.
    ///
    /// Costs are non-negative, so some optimal plan produces exactly the demand
    /// and procures exactly what production consumes. An unbounded plant pair
    /// therefore never needs more than the product's demand, and an unbounded
    /// supplier pair never more than the material's largest consumption.
    fn link_bounds(&self) -> Result<LinkBounds<'a>, ValidationError> {
        let plants = sorted(&self.data.plants);
        let suppliers = sorted(&self.data.suppliers);
        let products = sorted(&self.data.products);
        let materials = sorted(&self.data.materials);
        let mut bounds = LinkBounds::default();

        for &plant in &plants {
            for &product in &products {
                let capacity = self.data.plant_capacity(plant, product).unwrap_or(0.0);
                let bound = if capacity.is_finite() {
                    capacity
                } else {
                    self.demand(product)
                };
                bounds.plant.insert((plant, product), bound);
            }
        }

        for &supplier in &suppliers {
            for &material in &materials {
                let capacity = self.data.supplier_capacity(supplier, material).unwrap_or(0.0);
                let bound = if capacity.is_finite() {
                    capacity
                } else {
                    self.material_ceiling(material, &plants, &products)
                };
                if !bound.is_finite() {
                    return Err(ValidationError::UnboundedCapacity {
                        table: "supplier_capacity",
                        key: Key::pair(supplier, material),
                    });
                }
                bounds.supplier.insert((supplier, material), bound);
            }
        }

        Ok(bounds)
    }

    fn demand(&self, product: &str) -> f64 {
        self.data.demand.get(product).copied().unwrap_or(0.0)
    }

    /// Largest total output of `product` a cost-minimal plan can have: the
    /// finite plant capacities, plus its demand when some plant is unbounded
    fn product_ceiling(&self, product: &str, plants: &[&str]) -> f64 {
        let mut total = 0.0;
        let mut unbounded = false;
        for &plant in plants {
            let capacity = self.data.plant_capacity(plant, product).unwrap_or(0.0);
            if capacity.is_finite() {
                total += capacity;
            } else {
                unbounded = true;
            }
        }
        if unbounded {
            total += self.demand(product);
        }
        total
    }

    /// `Σ_x BOM(x, material) · product_ceiling(x)`
    fn material_ceiling(&self, material: &str, plants: &[&str], products: &[&str]) -> f64 {
        products
            .iter()
            .map(|&product| {
                let ratio = self.data.bill_of_materials(product, material).unwrap_or(0.0);
                if ratio == 0.0 {
                    0.0
                } else {
                    ratio * self.product_ceiling(product, plants)
                }
            })
            .sum()
    }

    /// `qty − M · indicator ≤ 0` for every pair
    fn add_big_m_rows(&self, program: &mut Program, columns: &Columns<'_>, big_m: f64) -> usize {
        let before = program.num_constraints();

        for (&(plant, product), &produce) in &columns.produce {
            program.add_constraint(linking_row(
                produce,
                columns.open[plant],
                big_m,
                Row::PlantBigM(plant, product).to_string(),
            ));
        }

        for (&(supplier, material), &procure) in &columns.procure {
            program.add_constraint(linking_row(
                procure,
                columns.select[supplier],
                big_m,
                Row::SupplierBigM(supplier, material).to_string(),
            ));
        }

        program.num_constraints() - before
    }

    fn check_options(&self, bounds: &LinkBounds<'a>) -> Result<(), ValidationError> {
        if self.options.include_installation_cost {
            if let Some(plant) = sorted(&self.data.plants)
                .into_iter()
                .find(|plant| !self.data.installation_cost.contains_key(*plant))
            {
                return Err(ValidationError::MissingEntry {
                    table: "installation_cost",
                    key: Key::unit(plant),
                });
            }
        }

        if self.options.include_selection_cost {
            if let Some(supplier) = sorted(&self.data.suppliers)
                .into_iter()
                .find(|supplier| !self.data.selection_cost.contains_key(*supplier))
            {
                return Err(ValidationError::MissingEntry {
                    table: "selection_cost",
                    key: Key::unit(supplier),
                });
            }
        }

        if let Some(big_m) = self.options.big_m {
            if !(big_m.is_finite() && big_m > 0.0) {
                return Err(ValidationError::InvalidBigM(big_m));
            }
        }

        if let Some(big_m) = self.options.big_m {
            let pairs = [
                ("plant_capacity", &bounds.plant),
                ("supplier_capacity", &bounds.supplier),
            ];
            for (table, values) in pairs {
                for (&(first, second), &required) in values {
                    if required > big_m {
                        return Err(ValidationError::BigMTooSmall {
                            big_m,
                            required,
                            table,
                            key: Key::pair(first, second),
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

fn push_column(program: &mut Program, variable: Variable, cost: f64) -> Result<usize, ValidationError> {
    let name = variable.name.clone();
    program
        .add_variable(variable, cost)
        .ok_or(ValidationError::DuplicateIdentifier {
            set: "columns",
            id: name,
        })
}

fn linking_row(quantity: usize, indicator: usize, bound: f64, name: String) -> Constraint {
    let mut terms = vec![(quantity, 1.0)];
    if bound != 0.0 {
        terms.push((indicator, -bound));
    }
    Constraint::new(ConstraintType::LessThanOrEqual, terms, 0.0).with_name(name)
}
