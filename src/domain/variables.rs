// Names of the decision variables and rows of the sourcing program.
// The builder and the extractor agree on columns through these names only.

use std::fmt;

/// Decision variable families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionVariable<'a> {
    /// `PlantOpen[plant]`, binary
    PlantOpen(&'a str),
    /// `SupplierSelected[supplier]`, binary
    SupplierSelected(&'a str),
    /// `ProduceQty[plant, product]`, continuous
    ProduceQty(&'a str, &'a str),
    /// `ProcureQty[supplier, material]`, continuous
    ProcureQty(&'a str, &'a str),
}

impl DecisionVariable<'_> {
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DecisionVariable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionVariable::PlantOpen(plant) => write!(f, "open({})", plant),
            DecisionVariable::SupplierSelected(supplier) => write!(f, "select({})", supplier),
            DecisionVariable::ProduceQty(plant, product) => {
                write!(f, "produce({},{})", plant, product)
            }
            DecisionVariable::ProcureQty(supplier, material) => {
                write!(f, "procure({},{})", supplier, material)
            }
        }
    }
}

/// Row families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row<'a> {
    PlantCapacity(&'a str, &'a str),
    SupplierCapacity(&'a str, &'a str),
    PlantBigM(&'a str, &'a str),
    SupplierBigM(&'a str, &'a str),
    MaterialBalance(&'a str),
    Demand(&'a str),
}

impl fmt::Display for Row<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Row::PlantCapacity(a, b) => write!(f, "plant_capacity({},{})", a, b),
            Row::SupplierCapacity(a, b) => write!(f, "supplier_capacity({},{})", a, b),
            Row::PlantBigM(a, b) => write!(f, "plant_big_m({},{})", a, b),
            Row::SupplierBigM(a, b) => write!(f, "supplier_big_m({},{})", a, b),
            Row::MaterialBalance(material) => write!(f, "material_balance({})", material),
            Row::Demand(product) => write!(f, "demand({})", product),
        }
    }
}
