use clap::Parser;
use sourcing_opt::infrastructure::{logging, write_lp_file};
use sourcing_opt::{load_problem_data, SourcingConfig, SourcingOutcome, SourcingService};
use std::path::PathBuf;
use std::process::ExitCode;

/// Solve one sourcing instance and print the plan
#[derive(Parser, Debug)]
#[command(name = "sourcing-plan", version, about)]
struct Args {
    /// Problem instance (TOML)
    instance: PathBuf,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Time limit in seconds, overriding `[solver] time_limit_secs`
    #[arg(short, long)]
    time_limit: Option<f64>,

    /// Also write the program in CPLEX LP format
    #[arg(long, value_name = "PATH")]
    export_lp: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(outcome) => match outcome {
            SourcingOutcome::Planned(report) => {
                println!("{}", report);
                ExitCode::SUCCESS
            }
            SourcingOutcome::NoSolutionFound(none) => {
                println!("{}", none);
                ExitCode::from(2)
            }
        },
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<SourcingOutcome, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => SourcingConfig::load(path)?,
        None => SourcingConfig::default(),
    };
    logging::init(&config.logging.filter);

    if let Some(seconds) = args.time_limit {
        config.solver = config.solver.with_time_limit_secs(seconds);
        config.validate()?;
    }

    let data = load_problem_data(&args.instance)?;
    let service = SourcingService::new(&config)?;

    if let Some(path) = &args.export_lp {
        let program = service.build_program(&data)?;
        write_lp_file(&program, path)?;
    }

    let time_limit = service.time_limit().map(|d| d.as_secs_f64());
    tracing::info!(
        instance = %args.instance.display(),
        backend = service.solver_name(),
        time_limit_secs = time_limit,
        "Planning instance"
    );

    Ok(service.plan(&data)?)
}
