// Tests for problem data validation.

use super::*;

fn two_plant_instance() -> ProblemData {
    ProblemData::new(["north", "south"], ["acme"], ["widget"], ["steel"])
        .with_plant_capacity("north", "widget", 100.0)
        .with_plant_capacity("south", "widget", 0.0)
        .with_production_cost("north", "widget", 3.0)
        .with_supplier_capacity("acme", "steel", 500.0)
        .with_procurement_cost("acme", "steel", 1.5)
        .with_bill_of_materials("widget", "steel", 2.0)
        .with_demand("widget", 40.0)
}

#[test]
fn test_valid_instance() {
    assert_eq!(two_plant_instance().validate(), Ok(()));
}

#[test]
fn test_zero_capacity_needs_no_cost() {
    let data = two_plant_instance();
    assert!(data.production_cost("south", "widget").is_none());
    assert!(data.validate().is_ok());
}

#[test]
fn test_positive_capacity_needs_cost() {
    let data = two_plant_instance().with_plant_capacity("south", "widget", 10.0);
    assert_eq!(
        data.validate(),
        Err(ValidationError::MissingEntry {
            table: "production_cost",
            key: Key::pair("south", "widget"),
        })
    );
}

#[test]
fn test_missing_capacity_is_not_zero() {
    let mut data = two_plant_instance();
    data.plant_capacity.remove("south");
    assert_eq!(
        data.validate(),
        Err(ValidationError::MissingEntry {
            table: "plant_capacity",
            key: Key::pair("south", "widget"),
        })
    );
}

#[test]
fn test_missing_supplier_capacity() {
    let data = ProblemData::new(["p"], ["s1", "s2"], ["x"], ["m"])
        .with_plant_capacity("p", "x", 10.0)
        .with_production_cost("p", "x", 1.0)
        .with_supplier_capacity("s1", "m", 10.0)
        .with_procurement_cost("s1", "m", 1.0)
        .with_bill_of_materials("x", "m", 1.0)
        .with_demand("x", 1.0);
    let err = data.validate().unwrap_err();
    assert_eq!(
        err,
        ValidationError::MissingEntry {
            table: "supplier_capacity",
            key: Key::pair("s2", "m"),
        }
    );
    assert_eq!(
        err.to_string(),
        "Table supplier_capacity has no entry for ('s2', 'm')"
    );
}

#[test]
fn test_missing_bill_of_materials() {
    let mut data = two_plant_instance();
    data.bill_of_materials.clear();
    assert!(matches!(
        data.validate(),
        Err(ValidationError::MissingEntry {
            table: "bill_of_materials",
            ..
        })
    ));
}

#[test]
fn test_missing_demand() {
    let mut data = two_plant_instance();
    data.demand.clear();
    assert_eq!(
        data.validate(),
        Err(ValidationError::MissingEntry {
            table: "demand",
            key: Key::unit("widget"),
        })
    );
}

#[test]
fn test_negative_cost_rejected() {
    let data = two_plant_instance().with_production_cost("north", "widget", -1.0);
    assert!(matches!(
        data.validate(),
        Err(ValidationError::InvalidValue {
            table: "production_cost",
            value,
            ..
        }) if value == -1.0
    ));
}

#[test]
fn test_nan_demand_rejected() {
    let data = two_plant_instance().with_demand("widget", f64::NAN);
    assert!(matches!(
        data.validate(),
        Err(ValidationError::InvalidValue {
            table: "demand",
            ..
        })
    ));
}

#[test]
fn test_infinite_capacity_accepted_infinite_demand_rejected() {
    let data = two_plant_instance().with_supplier_capacity("acme", "steel", f64::INFINITY);
    assert!(data.validate().is_ok());

    let data = two_plant_instance().with_demand("widget", f64::INFINITY);
    assert!(data.validate().is_err());
}

#[test]
fn test_unknown_identifier() {
    let data = two_plant_instance().with_installation_cost("east", 10.0);
    assert_eq!(
        data.validate(),
        Err(ValidationError::UnknownIdentifier {
            table: "installation_cost",
            id: "east".to_string(),
        })
    );

    let data = two_plant_instance().with_bill_of_materials("widget", "copper", 1.0);
    assert!(matches!(
        data.validate(),
        Err(ValidationError::UnknownIdentifier { id, .. }) if id == "copper"
    ));
}

#[test]
fn test_duplicate_identifier() {
    let mut data = two_plant_instance();
    data.plants.push("north".to_string());
    assert_eq!(
        data.validate(),
        Err(ValidationError::DuplicateIdentifier {
            set: "plants",
            id: "north".to_string(),
        })
    );
}

#[test]
fn test_invalid_identifier() {
    for id in ["", "two words", "a,b", "f(x)"] {
        let data = ProblemData::new([id], [], [], []);
        assert!(
            matches!(
                data.validate(),
                Err(ValidationError::InvalidIdentifier { set: "plants", .. })
            ),
            "identifier {:?} should be rejected",
            id
        );
    }
}

#[test]
fn test_empty_instance_is_valid() {
    let data = ProblemData::new(Vec::<String>::new(), vec![], vec![], vec![]);
    assert!(data.validate().is_ok());
}

#[test]
fn test_toml_instance() {
    let data = ProblemData::from_toml_str(
        r#"
        plants = ["p1"]
        suppliers = ["s1"]
        products = ["x"]
        materials = ["m"]

        [production_cost.p1]
        x = 4.0

        [procurement_cost.s1]
        m = 0.0

        [bill_of_materials.x]
        m = 0.0

        [plant_capacity.p1]
        x = 500.0

        [supplier_capacity.s1]
        m = inf

        [demand]
        x = 100.0
        "#,
    )
    .unwrap();

    assert_eq!(data.plant_capacity("p1", "x"), Some(500.0));
    assert_eq!(data.supplier_capacity("s1", "m"), Some(f64::INFINITY));
    assert!(data.validate().is_ok());
}

#[test]
fn test_toml_rejects_unknown_table() {
    let result = ProblemData::from_toml_str(
        r#"
        plants = []
        suppliers = []
        products = []
        materials = []
        [capacity]
        "#,
    );
    assert!(result.is_err());
}
