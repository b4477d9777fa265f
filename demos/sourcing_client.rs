// Example: demand sweep over a two-plant, two-supplier network
//
// Plant   | Product | Capacity | Unit cost | Installation
// --------|---------|----------|-----------|-------------
// north   | widget  |   300    |    3.0    |     500
// south   | widget  |   400    |    2.0    |     900
//
// Each widget needs 2 units of steel.
//
// Supplier | Capacity | Unit cost | Selection
// ---------|----------|-----------|----------
// acme     |   500    |    1.0    |    200
// bolt     |   900    |    1.5    |     50
//
// Question: which plants and suppliers should be used as demand grows?

use std::collections::HashMap;
use tonic::Request;

pub mod sourcing {
    tonic::include_proto!("sourcing");
}

use sourcing::{
    sourcing_planner_client::SourcingPlannerClient, ModelOptions, PairValue, PlanReply,
    PlanRequest, PlanStatus, ProblemData,
};

fn pair(first: &str, second: &str, value: f64) -> PairValue {
    PairValue {
        first: first.to_string(),
        second: second.to_string(),
        value,
    }
}

fn network(demand: f64) -> ProblemData {
    ProblemData {
        plants: vec!["north".to_string(), "south".to_string()],
        suppliers: vec!["acme".to_string(), "bolt".to_string()],
        products: vec!["widget".to_string()],
        materials: vec!["steel".to_string()],
        production_cost: vec![pair("north", "widget", 3.0), pair("south", "widget", 2.0)],
        procurement_cost: vec![pair("acme", "steel", 1.0), pair("bolt", "steel", 1.5)],
        installation_cost: HashMap::from([("north".to_string(), 500.0), ("south".to_string(), 900.0)]),
        selection_cost: HashMap::from([("acme".to_string(), 200.0), ("bolt".to_string(), 50.0)]),
        bill_of_materials: vec![pair("widget", "steel", 2.0)],
        plant_capacity: vec![pair("north", "widget", 300.0), pair("south", "widget", 400.0)],
        supplier_capacity: vec![pair("acme", "steel", 500.0), pair("bolt", "steel", 900.0)],
        demand: HashMap::from([("widget".to_string(), demand)]),
    }
}

fn request(scenario: &str, demand: f64) -> PlanRequest {
    PlanRequest {
        scenario: scenario.to_string(),
        data: Some(network(demand)),
        options: Some(ModelOptions {
            include_installation_cost: true,
            include_selection_cost: true,
            big_m: None,
        }),
        time_limit_secs: Some(10.0),
    }
}

fn print_reply(reply: &PlanReply) {
    let status = PlanStatus::try_from(reply.status).unwrap_or(PlanStatus::Error);
    println!("── {} ({:?}, {})", reply.scenario, status, reply.solver_backend);
    match reply.objective_value {
        Some(objective) => {
            println!("   Total cost:  {:.2}", objective);
            println!("   Plants:      {}", reply.opened_plants.join(", "));
            println!("   Suppliers:   {}", reply.selected_suppliers.join(", "));
            for line in &reply.production {
                println!("   produce  {:6} {:8} {:>8.1}", line.source, line.item, line.quantity);
            }
            for line in &reply.procurement {
                println!("   procure  {:6} {:8} {:>8.1}", line.source, line.item, line.quantity);
            }
        }
        None => println!("   {}", reply.message),
    }
    println!();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut client = SourcingPlannerClient::connect("http://127.0.0.1:50051").await?;

    println!("=== Sourcing Plan (single request) ===\n");
    let reply = client.plan(Request::new(request("baseline", 250.0))).await?;
    print_reply(&reply.into_inner());

    println!("=== Demand sweep (streamed) ===\n");
    let sweep: Vec<PlanRequest> = [150.0, 350.0, 600.0, 800.0]
        .iter()
        .map(|&demand| request(&format!("demand_{}", demand), demand))
        .collect();
    let mut replies = client
        .plan_scenarios(Request::new(tokio_stream::iter(sweep)))
        .await?
        .into_inner();
    while let Some(reply) = replies.message().await? {
        print_reply(&reply);
    }

    println!("=== LP export ===\n");
    let program = client
        .export_program(Request::new(request("baseline", 250.0)))
        .await?
        .into_inner();
    println!(
        "{} columns, {} rows\n\n{}",
        program.num_variables, program.num_constraints, program.lp
    );

    Ok(())
}
