// End-to-end planning against a real backend.

#![cfg(feature = "highs")]

use std::sync::Arc;
use std::time::Duration;

use sourcing_opt::infrastructure::write_lp_file;
use sourcing_opt::{
    load_problem_data, BuildOptions, HighsSolver, ModelBuilder, ProblemData, SolutionStatus,
    SolverService, SourcingOutcome, SourcingReport, SourcingService,
};

const TOL: f64 = 1e-6;

fn service(options: BuildOptions) -> SourcingService {
    SourcingService::with_solver(Arc::new(HighsSolver::new()), options, None)
}

fn planned(outcome: SourcingOutcome) -> SourcingReport {
    match outcome {
        SourcingOutcome::Planned(report) => report,
        SourcingOutcome::NoSolutionFound(none) => panic!("expected a plan, got {}", none),
    }
}

fn sample_instance() -> ProblemData {
    load_problem_data(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/data/sample_instance.toml"
    ))
    .unwrap()
}

fn single_plant(supplier_capacity: f64) -> ProblemData {
    ProblemData::new(["p"], ["s"], ["x"], ["m"])
        .with_plant_capacity("p", "x", 500.0)
        .with_production_cost("p", "x", 4.0)
        .with_supplier_capacity("s", "m", supplier_capacity)
        .with_procurement_cost("s", "m", 0.0)
        .with_bill_of_materials("x", "m", 0.0)
        .with_demand("x", 100.0)
}

#[test]
fn test_single_plant_with_unlimited_supplier() {
    let report = planned(
        service(BuildOptions::default())
            .plan(&single_plant(f64::INFINITY))
            .unwrap(),
    );

    assert!(report.is_optimal());
    assert_eq!(report.opened_plants, vec!["p".to_string()]);
    assert!((report.produced("x") - 100.0).abs() < TOL);
    assert!((report.objective_value - 400.0).abs() < TOL);
    assert!((report.costs.total() - 400.0).abs() < TOL);

    let options = BuildOptions::default().with_big_m(1e6);
    let report = planned(service(options).plan(&single_plant(f64::INFINITY)).unwrap());
    assert!((report.objective_value - 400.0).abs() < TOL);
}

#[test]
fn test_unlimited_supplier_covers_full_material_need() {
    let data = ProblemData::new(["p"], ["s"], ["x"], ["m"])
        .with_plant_capacity("p", "x", 1000.0)
        .with_production_cost("p", "x", 1.0)
        .with_supplier_capacity("s", "m", f64::INFINITY)
        .with_procurement_cost("s", "m", 0.5)
        .with_bill_of_materials("x", "m", 10.0)
        .with_demand("x", 1000.0);

    let report = planned(service(BuildOptions::default()).plan(&data).unwrap());
    assert!((report.produced("x") - 1000.0).abs() < TOL);
    assert!((report.procured("m") - 10_000.0).abs() < 1e-3);
    assert!((report.objective_value - 6000.0).abs() < 1e-3);
}

#[test]
fn test_single_plant_with_finite_supplier() {
    let report = planned(
        service(BuildOptions::default())
            .plan(&single_plant(1000.0))
            .unwrap(),
    );
    assert!((report.objective_value - 400.0).abs() < TOL);
    assert_eq!(report.opened_plants, vec!["p".to_string()]);
}

#[test]
fn test_demand_above_total_capacity_is_infeasible() {
    let data = ProblemData::new(["a", "b"], ["s"], ["x"], ["m"])
        .with_plant_capacity("a", "x", 300.0)
        .with_plant_capacity("b", "x", 200.0)
        .with_production_cost("a", "x", 1.0)
        .with_production_cost("b", "x", 1.0)
        .with_supplier_capacity("s", "m", 10_000.0)
        .with_procurement_cost("s", "m", 1.0)
        .with_bill_of_materials("x", "m", 1.0)
        .with_demand("x", 1000.0);

    let outcome = service(BuildOptions::default()).plan(&data).unwrap();
    assert_eq!(outcome.status(), SolutionStatus::Infeasible);
    assert!(outcome.report().is_none());
}

#[test]
fn test_sample_instance_plan_properties() {
    let data = sample_instance();
    let options = BuildOptions::default().with_fixed_costs(true, true);
    let report = planned(service(options).plan(&data).unwrap());

    assert!(report.is_optimal());

    // demand satisfaction
    for (product, &demand) in &data.demand {
        assert!(
            report.produced(product) >= demand - TOL,
            "{} under-produced",
            product
        );
    }

    // capacity linking and capacities
    for line in &report.production {
        assert!(report.opened_plants.contains(&line.plant));
        let capacity = data.plant_capacity(&line.plant, &line.product).unwrap();
        assert!(line.quantity <= capacity + TOL);
    }
    for line in &report.procurement {
        assert!(report.selected_suppliers.contains(&line.supplier));
        let capacity = data.supplier_capacity(&line.supplier, &line.material).unwrap();
        assert!(line.quantity <= capacity + TOL);
    }

    // material balance
    for material in &data.materials {
        let consumed: f64 = report
            .production
            .iter()
            .map(|line| {
                line.quantity
                    * data
                        .bill_of_materials(&line.product, material)
                        .unwrap_or(0.0)
            })
            .sum();
        let procured = report.procured(material);
        assert!(
            consumed <= procured + TOL * procured.max(1.0),
            "{}: consumed {} > procured {}",
            material,
            consumed,
            procured
        );
    }

    // cost reconciliation
    assert!(report.costs.installation.is_some());
    assert!(report.costs.selection.is_some());
    assert!((report.costs.total() - report.objective_value).abs() < TOL);
}

#[test]
fn test_builds_and_solves_are_repeatable() {
    let data = sample_instance();
    let options = BuildOptions::default().with_fixed_costs(true, true);

    let first = ModelBuilder::new(&data, &options).build().unwrap();
    let second = ModelBuilder::new(&data, &options).build().unwrap();
    assert_eq!(first, second);

    let solver = HighsSolver::new();
    let a = solver.solve(&first, None).unwrap();
    let b = solver.solve(&second, None).unwrap();
    assert_eq!(a.status, SolutionStatus::Optimal);
    let (a, b) = (a.objective_value.unwrap(), b.objective_value.unwrap());
    assert!((a - b).abs() <= TOL * a.abs().max(1.0));
}

#[test]
fn test_fixed_costs_change_the_plant_choice() {
    let data = ProblemData::new(["north", "south"], ["s"], ["x"], ["m"])
        .with_plant_capacity("north", "x", 300.0)
        .with_plant_capacity("south", "x", 300.0)
        .with_production_cost("north", "x", 3.0)
        .with_production_cost("south", "x", 2.0)
        .with_installation_cost("north", 500.0)
        .with_installation_cost("south", 900.0)
        .with_supplier_capacity("s", "m", 1000.0)
        .with_procurement_cost("s", "m", 0.0)
        .with_selection_cost("s", 0.0)
        .with_bill_of_materials("x", "m", 0.0)
        .with_demand("x", 250.0);

    // Without installation costs the open indicators are free, so only flows are asserted
    let variable_only = planned(service(BuildOptions::default()).plan(&data).unwrap());
    assert!((variable_only.produced("x") - 250.0).abs() < TOL);
    assert!(variable_only.production.iter().all(|line| line.plant == "south"));
    assert!((variable_only.objective_value - 500.0).abs() < TOL);

    let with_fixed = planned(
        service(BuildOptions::default().with_fixed_costs(true, true))
            .plan(&data)
            .unwrap(),
    );
    assert_eq!(with_fixed.opened_plants, vec!["north".to_string()]);
    assert!((with_fixed.objective_value - 1250.0).abs() < TOL);
    assert_eq!(with_fixed.costs.installation, Some(500.0));
}

#[test]
fn test_material_need_drives_supplier_mix() {
    let data = ProblemData::new(["p"], ["a", "b"], ["x"], ["m"])
        .with_plant_capacity("p", "x", 1000.0)
        .with_production_cost("p", "x", 1.0)
        .with_supplier_capacity("a", "m", 150.0)
        .with_supplier_capacity("b", "m", 500.0)
        .with_procurement_cost("a", "m", 3.0)
        .with_procurement_cost("b", "m", 5.0)
        .with_bill_of_materials("x", "m", 2.0)
        .with_demand("x", 100.0);

    let report = planned(service(BuildOptions::default()).plan(&data).unwrap());

    assert_eq!(
        report.selected_suppliers,
        vec!["a".to_string(), "b".to_string()]
    );
    assert!((report.procured("m") - 200.0).abs() < TOL);
    assert!((report.costs.procurement - 700.0).abs() < TOL);
    assert!((report.objective_value - 800.0).abs() < TOL);
}

#[test]
fn test_tiny_time_limit_is_not_an_error() {
    let data = sample_instance();
    let options = BuildOptions::default().with_fixed_costs(true, true);
    let service = SourcingService::with_solver(
        Arc::new(HighsSolver::new()),
        options,
        Some(Duration::from_millis(1)),
    );

    let outcome = service.plan(&data).unwrap();
    assert!(matches!(
        outcome.status(),
        SolutionStatus::Optimal | SolutionStatus::TimeLimitReached
    ));
    if let Some(report) = outcome.report() {
        assert!((report.costs.total() - report.objective_value).abs() < TOL);
    }
}

#[test]
fn test_export_sample_program() {
    let data = sample_instance();
    let options = BuildOptions::default().with_fixed_costs(true, true);
    let program = ModelBuilder::new(&data, &options).build().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sourcing.lp");
    write_lp_file(&program, &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("\\ Problem name: production_sourcing\nMinimize\n"));
    assert!(text.contains("demand(prod_1):"));
    assert!(text.contains("material_balance(mp_4):"));
    assert!(text.contains("Binaries\n"));
    assert!(text.contains("open(usine_1)"));
    assert!(text.ends_with("End\n"));
}

#[cfg(feature = "cbc")]
#[test]
fn test_backends_agree_on_sample_instance() {
    use sourcing_opt::CoinCbcSolver;

    let data = sample_instance();
    let options = BuildOptions::default().with_fixed_costs(true, true);

    let highs = planned(service(options.clone()).plan(&data).unwrap());
    let cbc = planned(
        SourcingService::with_solver(Arc::new(CoinCbcSolver::new()), options, None)
            .plan(&data)
            .unwrap(),
    );
    assert!((highs.objective_value - cbc.objective_value).abs() < 1e-4);
}
