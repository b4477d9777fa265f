// Infrastructure: Server setup and configuration
// Single Responsibility: Manage server lifecycle and configuration

use std::net::SocketAddr;
use tonic::transport::Server;
use tracing::info;

use crate::application::mappers::sourcing::sourcing_planner_server::SourcingPlannerServer;
use crate::application::{GrpcSourcingService, SourcingService};

pub struct ServerConfig {
    pub address: SocketAddr,
    pub service: SourcingService,
}

impl ServerConfig {
    pub fn new(address: SocketAddr, service: SourcingService) -> Self {
        Self { address, service }
    }
}

pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    print_banner(&config.address, config.service.solver_name());
    info!(
        address = %config.address,
        backend = config.service.solver_name(),
        time_limit_secs = config.service.time_limit().map(|d| d.as_secs_f64()),
        "Starting sourcing planner"
    );

    let service = GrpcSourcingService::new(config.service);

    Server::builder()
        .add_service(SourcingPlannerServer::new(service))
        .serve(config.address)
        .await?;

    Ok(())
}

fn print_banner(address: &SocketAddr, backend: &str) {
    println!("\n╔════════════════════════════════════════════════════════════╗");
    println!("║  Sourcing Planner - Plants, Suppliers & Material Flows     ║");
    println!("╠════════════════════════════════════════════════════════════╣");
    println!("║  Powered by: {:45} ║", backend);
    println!("║  Listening on: {:43} ║", address);
    println!("╠════════════════════════════════════════════════════════════╣");
    println!("║  Services:                                                 ║");
    println!("║    ✓ Plan            single instance                       ║");
    println!("║    ✓ PlanScenarios   concurrent scenario sweep             ║");
    println!("║    ✓ ExportProgram   CPLEX LP text                         ║");
    println!("╚════════════════════════════════════════════════════════════╝\n");
}
