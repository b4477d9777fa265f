// Input snapshot of one sourcing problem instance.
// Identifier sets are explicit inputs. Parameter tables are keyed by those
// identifiers and are never completed with implicit defaults: a missing
// capacity and a zero capacity are different inputs, and ProblemData::validate
// reports the former.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Table indexed by two identifiers, outer key first.
pub type PairTable = BTreeMap<String, BTreeMap<String, f64>>;

/// Table indexed by a single identifier.
pub type UnitTable = BTreeMap<String, f64>;

/// Reason a problem instance cannot be turned into a program
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Duplicate identifier '{id}' in {set}")]
    DuplicateIdentifier { set: &'static str, id: String },

    #[error("Invalid identifier '{id}' in {set}: identifiers must be non-empty and contain no whitespace, parentheses or commas")]
    InvalidIdentifier { set: &'static str, id: String },

    #[error("Table {table} references unknown identifier '{id}'")]
    UnknownIdentifier { table: &'static str, id: String },

    #[error("Table {table} has no entry for {key}")]
    MissingEntry { table: &'static str, key: Key },

    #[error("Table {table} has invalid value {value} for {key}")]
    InvalidValue {
        table: &'static str,
        key: Key,
        value: f64,
    },

    #[error("Capacity for {key} in {table} is unbounded and no finite quantity bound can be derived")]
    UnboundedCapacity { table: &'static str, key: Key },

    #[error("Big-M must be finite and positive, got {0}")]
    InvalidBigM(f64),

    #[error("Big-M {big_m} is smaller than {required}, the largest quantity {key} in {table} may need")]
    BigMTooSmall {
        big_m: f64,
        required: f64,
        table: &'static str,
        key: Key,
    },
}

/// Identifier tuple naming a table entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Unit(String),
    Pair(String, String),
}

impl Key {
    pub(crate) fn unit(id: &str) -> Self {
        Key::Unit(id.to_string())
    }

    pub(crate) fn pair(first: &str, second: &str) -> Self {
        Key::Pair(first.to_string(), second.to_string())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Unit(id) => write!(f, "'{}'", id),
            Key::Pair(first, second) => write!(f, "('{}', '{}')", first, second),
        }
    }
}

/// Sets and parameters of one problem instance
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProblemData {
    pub plants: Vec<String>,
    pub suppliers: Vec<String>,
    pub products: Vec<String>,
    pub materials: Vec<String>,

    /// Unit production cost, `[plant][product]`
    #[serde(default)]
    pub production_cost: PairTable,
    /// Unit procurement cost, `[supplier][material]`
    #[serde(default)]
    pub procurement_cost: PairTable,
    /// Fixed cost of opening a plant
    #[serde(default)]
    pub installation_cost: UnitTable,
    /// Fixed cost of engaging a supplier
    #[serde(default)]
    pub selection_cost: UnitTable,
    /// Units of material per unit of product, `[product][material]`
    #[serde(default)]
    pub bill_of_materials: PairTable,
    /// `[plant][product]`
    #[serde(default)]
    pub plant_capacity: PairTable,
    /// `[supplier][material]`
    #[serde(default)]
    pub supplier_capacity: PairTable,
    #[serde(default)]
    pub demand: UnitTable,
}

fn set_pair(table: &mut PairTable, first: &str, second: &str, value: f64) {
    table
        .entry(first.to_string())
        .or_default()
        .insert(second.to_string(), value);
}

pub(crate) fn pair_value(table: &PairTable, first: &str, second: &str) -> Option<f64> {
    table.get(first).and_then(|row| row.get(second)).copied()
}

/// Sorted, deduplicated view of an identifier set
pub(crate) fn sorted(ids: &[String]) -> Vec<&str> {
    ids.iter()
        .map(String::as_str)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

impl ProblemData {
    pub fn new<S: Into<String>>(
        plants: impl IntoIterator<Item = S>,
        suppliers: impl IntoIterator<Item = S>,
        products: impl IntoIterator<Item = S>,
        materials: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            plants: plants.into_iter().map(Into::into).collect(),
            suppliers: suppliers.into_iter().map(Into::into).collect(),
            products: products.into_iter().map(Into::into).collect(),
            materials: materials.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn with_production_cost(mut self, plant: &str, product: &str, cost: f64) -> Self {
        set_pair(&mut self.production_cost, plant, product, cost);
        self
    }

    pub fn with_procurement_cost(mut self, supplier: &str, material: &str, cost: f64) -> Self {
        set_pair(&mut self.procurement_cost, supplier, material, cost);
        self
    }

    pub fn with_installation_cost(mut self, plant: &str, cost: f64) -> Self {
        self.installation_cost.insert(plant.to_string(), cost);
        self
    }

    pub fn with_selection_cost(mut self, supplier: &str, cost: f64) -> Self {
        self.selection_cost.insert(supplier.to_string(), cost);
        self
    }

    pub fn with_bill_of_materials(mut self, product: &str, material: &str, ratio: f64) -> Self {
        set_pair(&mut self.bill_of_materials, product, material, ratio);
        self
    }

    pub fn with_plant_capacity(mut self, plant: &str, product: &str, capacity: f64) -> Self {
        set_pair(&mut self.plant_capacity, plant, product, capacity);
        self
    }

    pub fn with_supplier_capacity(mut self, supplier: &str, material: &str, capacity: f64) -> Self {
        set_pair(&mut self.supplier_capacity, supplier, material, capacity);
        self
    }

    pub fn with_demand(mut self, product: &str, quantity: f64) -> Self {
        self.demand.insert(product.to_string(), quantity);
        self
    }

    pub fn production_cost(&self, plant: &str, product: &str) -> Option<f64> {
        pair_value(&self.production_cost, plant, product)
    }

    pub fn procurement_cost(&self, supplier: &str, material: &str) -> Option<f64> {
        pair_value(&self.procurement_cost, supplier, material)
    }

    pub fn bill_of_materials(&self, product: &str, material: &str) -> Option<f64> {
        pair_value(&self.bill_of_materials, product, material)
    }

    pub fn plant_capacity(&self, plant: &str, product: &str) -> Option<f64> {
        pair_value(&self.plant_capacity, plant, product)
    }

    pub fn supplier_capacity(&self, supplier: &str, material: &str) -> Option<f64> {
        pair_value(&self.supplier_capacity, supplier, material)
    }

    /// Check that the instance is complete and consistent
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_identifiers("plants", &self.plants)?;
        check_identifiers("suppliers", &self.suppliers)?;
        check_identifiers("products", &self.products)?;
        check_identifiers("materials", &self.materials)?;

        let plants = id_set(&self.plants);
        let suppliers = id_set(&self.suppliers);
        let products = id_set(&self.products);
        let materials = id_set(&self.materials);

        check_pair_keys("production_cost", &self.production_cost, &plants, &products)?;
        check_pair_keys("procurement_cost", &self.procurement_cost, &suppliers, &materials)?;
        check_unit_keys("installation_cost", &self.installation_cost, &plants)?;
        check_unit_keys("selection_cost", &self.selection_cost, &suppliers)?;
        check_pair_keys("bill_of_materials", &self.bill_of_materials, &products, &materials)?;
        check_pair_keys("plant_capacity", &self.plant_capacity, &plants, &products)?;
        check_pair_keys("supplier_capacity", &self.supplier_capacity, &suppliers, &materials)?;
        check_unit_keys("demand", &self.demand, &products)?;

        check_complete_pairs("plant_capacity", &self.plant_capacity, &plants, &products)?;
        check_complete_pairs("supplier_capacity", &self.supplier_capacity, &suppliers, &materials)?;
        check_complete_pairs("bill_of_materials", &self.bill_of_materials, &products, &materials)?;
        for product in &products {
            if !self.demand.contains_key(*product) {
                return Err(ValidationError::MissingEntry {
                    table: "demand",
                    key: Key::unit(product),
                });
            }
        }

        check_pair_values("production_cost", &self.production_cost, false)?;
        check_pair_values("procurement_cost", &self.procurement_cost, false)?;
        check_unit_values("installation_cost", &self.installation_cost)?;
        check_unit_values("selection_cost", &self.selection_cost)?;
        check_pair_values("bill_of_materials", &self.bill_of_materials, false)?;
        check_pair_values("plant_capacity", &self.plant_capacity, true)?;
        check_pair_values("supplier_capacity", &self.supplier_capacity, true)?;
        check_unit_values("demand", &self.demand)?;

        check_costed_capacity(
            "production_cost",
            &self.plant_capacity,
            &self.production_cost,
        )?;
        check_costed_capacity(
            "procurement_cost",
            &self.supplier_capacity,
            &self.procurement_cost,
        )?;

        Ok(())
    }
}

fn id_set(ids: &[String]) -> BTreeSet<&str> {
    ids.iter().map(String::as_str).collect()
}

fn is_valid_identifier(id: &str) -> bool {
    !id.is_empty()
        && !id
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | ','))
}

fn check_identifiers(set: &'static str, ids: &[String]) -> Result<(), ValidationError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !is_valid_identifier(id) {
            return Err(ValidationError::InvalidIdentifier {
                set,
                id: id.clone(),
            });
        }
        if !seen.insert(id.as_str()) {
            return Err(ValidationError::DuplicateIdentifier {
                set,
                id: id.clone(),
            });
        }
    }
    Ok(())
}

fn check_unit_keys(
    table: &'static str,
    values: &UnitTable,
    ids: &BTreeSet<&str>,
) -> Result<(), ValidationError> {
    match values.keys().find(|id| !ids.contains(id.as_str())) {
        Some(id) => Err(ValidationError::UnknownIdentifier {
            table,
            id: id.clone(),
        }),
        None => Ok(()),
    }
}

fn check_pair_keys(
    table: &'static str,
    values: &PairTable,
    firsts: &BTreeSet<&str>,
    seconds: &BTreeSet<&str>,
) -> Result<(), ValidationError> {
    for (first, row) in values {
        if !firsts.contains(first.as_str()) {
            return Err(ValidationError::UnknownIdentifier {
                table,
                id: first.clone(),
            });
        }
        if let Some(second) = row.keys().find(|id| !seconds.contains(id.as_str())) {
            return Err(ValidationError::UnknownIdentifier {
                table,
                id: second.clone(),
            });
        }
    }
    Ok(())
}

fn check_complete_pairs(
    table: &'static str,
    values: &PairTable,
    firsts: &BTreeSet<&str>,
    seconds: &BTreeSet<&str>,
) -> Result<(), ValidationError> {
    for first in firsts {
        for second in seconds {
            if pair_value(values, first, second).is_none() {
                return Err(ValidationError::MissingEntry {
                    table,
                    key: Key::pair(first, second),
                });
            }
        }
    }
    Ok(())
}

fn is_valid_quantity(value: f64, allow_infinite: bool) -> bool {
    value >= 0.0 && (allow_infinite || value.is_finite())
}

fn check_unit_values(table: &'static str, values: &UnitTable) -> Result<(), ValidationError> {
    for (id, &value) in values {
        if !is_valid_quantity(value, false) {
            return Err(ValidationError::InvalidValue {
                table,
                key: Key::unit(id),
                value,
            });
        }
    }
    Ok(())
}

fn check_pair_values(
    table: &'static str,
    values: &PairTable,
    allow_infinite: bool,
) -> Result<(), ValidationError> {
    for (first, row) in values {
        for (second, &value) in row {
            if !is_valid_quantity(value, allow_infinite) {
                return Err(ValidationError::InvalidValue {
                    table,
                    key: Key::pair(first, second),
                    value,
                });
            }
        }
    }
    Ok(())
}

fn check_costed_capacity(
    table: &'static str,
    capacity: &PairTable,
    cost: &PairTable,
) -> Result<(), ValidationError> {
    for (first, row) in capacity {
        for (second, &value) in row {
            if value > 0.0 && pair_value(cost, first, second).is_none() {
                return Err(ValidationError::MissingEntry {
                    table,
                    key: Key::pair(first, second),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
