// Mappers: Convert between gRPC protobuf types and domain models
// Keeps protobuf types out of the domain layer

use std::time::Duration;

use tonic::Status;

use crate::domain::{
    BuildOptions, PairTable, ProblemData, SolutionStatus, SourcingOutcome, DEFAULT_MODEL_NAME,
};
use crate::error::SourcingError;
use crate::infrastructure::ExportError;

pub mod sourcing {
    tonic::include_proto!("sourcing");
}

use sourcing as proto;

/// Convert protobuf ProblemData to domain ProblemData.
///
/// Only the shape is checked here; the model builder validates contents.
pub fn proto_to_problem_data(
    proto_data: proto::ProblemData,
) -> std::result::Result<ProblemData, Box<Status>> {
    Ok(ProblemData {
        production_cost: pair_table("production_cost", &proto_data.production_cost)?,
        procurement_cost: pair_table("procurement_cost", &proto_data.procurement_cost)?,
        bill_of_materials: pair_table("bill_of_materials", &proto_data.bill_of_materials)?,
        plant_capacity: pair_table("plant_capacity", &proto_data.plant_capacity)?,
        supplier_capacity: pair_table("supplier_capacity", &proto_data.supplier_capacity)?,
        installation_cost: proto_data.installation_cost.into_iter().collect(),
        selection_cost: proto_data.selection_cost.into_iter().collect(),
        demand: proto_data.demand.into_iter().collect(),
        plants: proto_data.plants,
        suppliers: proto_data.suppliers,
        products: proto_data.products,
        materials: proto_data.materials,
    })
}

fn pair_table(
    table: &str,
    values: &[proto::PairValue],
) -> std::result::Result<PairTable, Box<Status>> {
    let mut out = PairTable::new();
    for entry in values {
        let previous = out
            .entry(entry.first.clone())
            .or_default()
            .insert(entry.second.clone(), entry.value);
        if previous.is_some() {
            return Err(Box::new(Status::invalid_argument(format!(
                "Table {} lists ('{}', '{}') more than once",
                table, entry.first, entry.second
            ))));
        }
    }
    Ok(out)
}

/// Model options for a request; `defaults` applies when the request has none.
/// A non-empty scenario name becomes the model name.
pub fn proto_to_build_options(
    proto_options: Option<proto::ModelOptions>,
    scenario: &str,
    defaults: &BuildOptions,
) -> BuildOptions {
    let mut options = match proto_options {
        Some(o) => BuildOptions {
            include_installation_cost: o.include_installation_cost,
            include_selection_cost: o.include_selection_cost,
            big_m: o.big_m,
            model_name: DEFAULT_MODEL_NAME.to_string(),
        },
        None => defaults.clone(),
    };
    if !scenario.is_empty() {
        options.model_name = scenario.to_string();
    }
    options
}

/// Request time limit, or `default` when unset or not positive
pub fn time_limit(
    seconds: Option<f64>,
    default: Option<Duration>,
) -> Result<Option<Duration>, Box<Status>> {
    match seconds {
        Some(s) if s > 0.0 => Duration::try_from_secs_f64(s).map(Some).map_err(|_| {
            Box::new(Status::invalid_argument(format!(
                "time_limit_secs {} is not a representable duration",
                s
            )))
        }),
        _ => Ok(default),
    }
}

pub fn status_to_proto(status: SolutionStatus) -> proto::PlanStatus {
    match status {
        SolutionStatus::Optimal => proto::PlanStatus::Optimal,
        SolutionStatus::Infeasible => proto::PlanStatus::Infeasible,
        SolutionStatus::Unbounded => proto::PlanStatus::Unbounded,
        SolutionStatus::TimeLimitReached => proto::PlanStatus::TimeLimitReached,
        SolutionStatus::Error => proto::PlanStatus::Error,
    }
}

/// Convert a domain outcome to the reply for `scenario`
pub fn outcome_to_reply(
    scenario: String,
    outcome: SourcingOutcome,
    solver_name: &str,
) -> proto::PlanReply {
    let status = status_to_proto(outcome.status()) as i32;
    match outcome {
        SourcingOutcome::Planned(report) => proto::PlanReply {
            scenario,
            status,
            message: format!("Plan found ({})", report.status),
            objective_value: Some(report.objective_value),
            costs: Some(proto::CostBreakdown {
                production: report.costs.production,
                procurement: report.costs.procurement,
                installation: report.costs.installation,
                selection: report.costs.selection,
                total: report.costs.total(),
            }),
            opened_plants: report.opened_plants,
            selected_suppliers: report.selected_suppliers,
            production: report
                .production
                .into_iter()
                .map(|line| proto::FlowLine {
                    source: line.plant,
                    item: line.product,
                    quantity: line.quantity,
                })
                .collect(),
            procurement: report
                .procurement
                .into_iter()
                .map(|line| proto::FlowLine {
                    source: line.supplier,
                    item: line.material,
                    quantity: line.quantity,
                })
                .collect(),
            solver_backend: solver_name.to_string(),
        },
        SourcingOutcome::NoSolutionFound(none) => proto::PlanReply {
            scenario,
            status,
            message: none.reason,
            solver_backend: solver_name.to_string(),
            ..Default::default()
        },
    }
}

/// gRPC status for a failed request
pub fn error_to_status(error: SourcingError) -> Status {
    match &error {
        SourcingError::Validation(_) | SourcingError::Config(_) => {
            Status::invalid_argument(error.to_string())
        }
        SourcingError::Export(ExportError::Io(_)) | SourcingError::Solver(_) => {
            Status::internal(error.to_string())
        }
        SourcingError::Export(_) => Status::invalid_argument(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NoSolution, ValidationError};
    use std::collections::HashMap;

    fn pair(first: &str, second: &str, value: f64) -> proto::PairValue {
        proto::PairValue {
            first: first.to_string(),
            second: second.to_string(),
            value,
        }
    }

    #[test]
    fn test_problem_data_conversion() {
        let proto_data = proto::ProblemData {
            plants: vec!["p".to_string()],
            suppliers: vec!["s".to_string()],
            products: vec!["x".to_string()],
            materials: vec!["m".to_string()],
            production_cost: vec![pair("p", "x", 4.0)],
            procurement_cost: vec![pair("s", "m", 0.0)],
            bill_of_materials: vec![pair("x", "m", 0.0)],
            plant_capacity: vec![pair("p", "x", 500.0)],
            supplier_capacity: vec![pair("s", "m", f64::INFINITY)],
            demand: HashMap::from([("x".to_string(), 100.0)]),
            ..Default::default()
        };

        let data = proto_to_problem_data(proto_data).unwrap();
        let expected = ProblemData::new(["p"], ["s"], ["x"], ["m"])
            .with_production_cost("p", "x", 4.0)
            .with_procurement_cost("s", "m", 0.0)
            .with_bill_of_materials("x", "m", 0.0)
            .with_plant_capacity("p", "x", 500.0)
            .with_supplier_capacity("s", "m", f64::INFINITY)
            .with_demand("x", 100.0);
        assert_eq!(data, expected);
    }

    #[test]
    fn test_duplicate_pair_rejected() {
        let proto_data = proto::ProblemData {
            plant_capacity: vec![pair("p", "x", 1.0), pair("p", "x", 2.0)],
            ..Default::default()
        };
        let status = proto_to_problem_data(proto_data).unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
    }

    #[test]
    fn test_options_and_time_limit_defaults() {
        let defaults = BuildOptions::default().with_fixed_costs(true, true);

        let options = proto_to_build_options(None, "", &defaults);
        assert_eq!(options, defaults);

        let options = proto_to_build_options(
            Some(proto::ModelOptions {
                include_installation_cost: false,
                include_selection_cost: true,
                big_m: Some(1e6),
            }),
            "peak_season",
            &defaults,
        );
        assert!(!options.include_installation_cost);
        assert_eq!(options.big_m, Some(1e6));
        assert_eq!(options.model_name, "peak_season");

        let fallback = Some(Duration::from_secs(60));
        assert_eq!(time_limit(None, fallback).unwrap(), fallback);
        assert_eq!(time_limit(Some(0.0), fallback).unwrap(), fallback);
        assert_eq!(time_limit(Some(f64::NAN), fallback).unwrap(), fallback);
        assert_eq!(
            time_limit(Some(2.0), fallback).unwrap(),
            Some(Duration::from_secs(2))
        );
    }

    #[test]
    fn test_unrepresentable_time_limit_rejected() {
        for seconds in [f64::INFINITY, 1.0e30] {
            let status = time_limit(Some(seconds), None).unwrap_err();
            assert_eq!(status.code(), tonic::Code::InvalidArgument);
        }
    }

    #[test]
    fn test_no_solution_reply() {
        let outcome = SourcingOutcome::NoSolutionFound(NoSolution {
            status: SolutionStatus::Infeasible,
            reason: "demand exceeds capacity".to_string(),
        });
        let reply = outcome_to_reply("s1".to_string(), outcome, "HiGHS");
        assert_eq!(reply.status, proto::PlanStatus::Infeasible as i32);
        assert_eq!(reply.message, "demand exceeds capacity");
        assert_eq!(reply.objective_value, None);
        assert!(reply.costs.is_none());
        assert_eq!(reply.scenario, "s1");
    }

    #[test]
    fn test_error_codes() {
        let invalid = error_to_status(SourcingError::Validation(ValidationError::InvalidBigM(-1.0)));
        assert_eq!(invalid.code(), tonic::Code::InvalidArgument);

        let solver = error_to_status(SourcingError::Solver(
            crate::domain::SolverError::SolverNotAvailable("cbc".to_string()),
        ));
        assert_eq!(solver.code(), tonic::Code::Internal);
    }
}
