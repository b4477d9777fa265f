// Domain layer: problem data, model building, solution extraction
pub mod domain;

// Application layer: Use cases and service orchestration
pub mod application;

// Configuration files and instance loading
pub mod config;

// Crate-level error
pub mod error;

// Infrastructure layer: LP export, logging, gRPC server
pub mod infrastructure;

// Solver adapters: Concrete implementations of SolverService
pub mod solver;

// Re-export commonly used types
pub use domain::{
    BuildOptions, CostBreakdown, ModelBuilder, NoSolution, ProblemData, ProcurementLine,
    ProductionLine, Program, Solution, SolutionExtractor, SolutionStatus, SolverBackend,
    SolverError, SolverService, SourcingOutcome, SourcingReport, ValidationError,
};

pub use application::SourcingService;
pub use config::{load_problem_data, SourcingConfig};
pub use error::SourcingError;

#[cfg(feature = "server")]
pub use infrastructure::{start_server, ServerConfig};

pub use solver::SolverFactory;
#[cfg(feature = "cbc")]
pub use solver::CoinCbcSolver;
#[cfg(feature = "highs")]
pub use solver::HighsSolver;
