// Build, solve and extract as one use case.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, info_span};

use crate::config::SourcingConfig;
use crate::domain::{
    BuildOptions, ModelBuilder, ProblemData, Program, SolutionExtractor, SolverService,
    SourcingOutcome,
};
use crate::error::Result;
use crate::solver::SolverFactory;

/// Plans sourcing decisions for problem instances with one solver backend
#[derive(Clone)]
pub struct SourcingService {
    solver: Arc<dyn SolverService>,
    options: BuildOptions,
    time_limit: Option<Duration>,
}

impl SourcingService {
    /// Service with the backend, model options and time limit of `config`
    pub fn new(config: &SourcingConfig) -> Result<Self> {
        config.validate()?;
        let solver = SolverFactory::create(&config.solver)?;
        Ok(Self::with_solver(
            solver,
            config.model.clone(),
            config.solver.time_limit(),
        ))
    }

    pub fn with_solver(
        solver: Arc<dyn SolverService>,
        options: BuildOptions,
        time_limit: Option<Duration>,
    ) -> Self {
        Self {
            solver,
            options,
            time_limit,
        }
    }

    pub fn solver_name(&self) -> &str {
        self.solver.name()
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    /// Builds the program for `data` with the service's options
    pub fn build_program(&self, data: &ProblemData) -> Result<Program> {
        Ok(ModelBuilder::new(data, &self.options).build()?)
    }

    /// Plans `data` with the service's options and time limit
    pub fn plan(&self, data: &ProblemData) -> Result<SourcingOutcome> {
        self.plan_with(data, &self.options, self.time_limit)
    }

    /// Plans `data` with explicit options and time limit.
    ///
    /// Invalid input is an `Err`; infeasible, unbounded and timed-out solves
    /// are reported through the returned outcome.
    pub fn plan_with(
        &self,
        data: &ProblemData,
        options: &BuildOptions,
        time_limit: Option<Duration>,
    ) -> Result<SourcingOutcome> {
        let _span = info_span!("plan", model = %options.model_name).entered();

        let program = ModelBuilder::new(data, options).build()?;
        debug!(
            backend = self.solver.name(),
            time_limit_secs = time_limit.map(|d| d.as_secs_f64()),
            "Solving program"
        );
        let solution = self.solver.solve(&program, time_limit)?;
        let outcome = SolutionExtractor::new(data, options).extract(&solution);

        info!(
            status = %outcome.status(),
            solve_time_ms = solution.statistics.solve_time_ms,
            "Planning finished"
        );
        Ok(outcome)
    }
}
