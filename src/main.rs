use clap::Parser;
use sourcing_opt::infrastructure::logging;
use sourcing_opt::{start_server, ServerConfig, SourcingConfig, SourcingService};
use std::net::SocketAddr;
use std::path::PathBuf;

/// gRPC server planning plant openings, supplier selection and material flows
#[derive(Parser, Debug)]
#[command(name = "sourcing-server", version, about)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overriding `[server] address`
    #[arg(short, long)]
    address: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SourcingConfig::load(path)?,
        None => SourcingConfig::default(),
    };
    logging::init(&config.logging.filter);

    let address = args.address.unwrap_or(config.server.address);
    let service = SourcingService::new(&config)?;

    start_server(ServerConfig::new(address, service)).await?;

    Ok(())
}
