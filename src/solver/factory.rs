use crate::config::SolverSettings;
use crate::domain::{
    solver_service::{SolverError, SolverService},
    value_objects::SolverBackend,
};
use std::sync::Arc;
use tracing::debug;

#[cfg(feature = "cbc")]
use crate::solver::CoinCbcSolver;
#[cfg(feature = "highs")]
use crate::solver::HighsSolver;

/// Factory for creating solver instances based on configuration
pub struct SolverFactory;

impl SolverFactory {
    /// Create the solver described by `settings`
    pub fn create(settings: &SolverSettings) -> Result<Arc<dyn SolverService>, SolverError> {
        let solver = Self::create_from_backend(settings.backend, settings)?;
        debug!(requested = %settings.backend, backend = solver.name(), "Created solver");
        Ok(solver)
    }

    /// Create a solver for a specific backend
    pub fn create_from_backend(
        backend: SolverBackend,
        settings: &SolverSettings,
    ) -> Result<Arc<dyn SolverService>, SolverError> {
        match backend {
            SolverBackend::Auto => Self::create_from_backend(Self::auto_backend()?, settings),
            SolverBackend::Highs => Self::highs(settings),
            SolverBackend::CoinCbc => Self::coin_cbc(settings),
        }
    }

    /// Backends compiled into this build, preferred first
    pub fn available_backends() -> Vec<SolverBackend> {
        let mut backends = Vec::new();
        if cfg!(feature = "highs") {
            backends.push(SolverBackend::Highs);
        }
        if cfg!(feature = "cbc") {
            backends.push(SolverBackend::CoinCbc);
        }
        backends
    }

    fn auto_backend() -> Result<SolverBackend, SolverError> {
        Self::available_backends().into_iter().next().ok_or_else(|| {
            SolverError::SolverNotAvailable(
                "no solver backend compiled in; enable the `highs` or `cbc` feature".to_string(),
            )
        })
    }

    #[cfg(feature = "highs")]
    fn highs(settings: &SolverSettings) -> Result<Arc<dyn SolverService>, SolverError> {
        Ok(Arc::new(
            HighsSolver::new()
                .with_gap_tolerance(settings.gap_tolerance)
                .with_verbose(settings.verbose),
        ))
    }

    #[cfg(not(feature = "highs"))]
    fn highs(_settings: &SolverSettings) -> Result<Arc<dyn SolverService>, SolverError> {
        Err(SolverError::SolverNotAvailable(
            "HiGHS support not compiled in; enable the `highs` feature".to_string(),
        ))
    }

    #[cfg(feature = "cbc")]
    fn coin_cbc(settings: &SolverSettings) -> Result<Arc<dyn SolverService>, SolverError> {
        Ok(Arc::new(
            CoinCbcSolver::new()
                .with_gap_tolerance(settings.gap_tolerance)
                .with_verbose(settings.verbose),
        ))
    }

    #[cfg(not(feature = "cbc"))]
    fn coin_cbc(_settings: &SolverSettings) -> Result<Arc<dyn SolverService>, SolverError> {
        Err(SolverError::SolverNotAvailable(
            "COIN-OR CBC support not compiled in; enable the `cbc` feature".to_string(),
        ))
    }
}
