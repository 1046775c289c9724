use crate::domain::{
    models::SolverConfig,
    solver_service::{Result, SolverError, SolverService},
    value_objects::SolverBackend,
};
use crate::solver::GoodLpSolver;
use std::sync::Arc;

/// Factory for creating solver instances based on configuration
pub struct SolverFactory;

impl SolverFactory {
    /// Create a solver based on the configured backend
    pub fn create_solver(config: &SolverConfig) -> Result<Arc<dyn SolverService>> {
        Self::create_from_backend(config.backend)
    }

    /// Create a solver for a specific backend; backends not compiled in are
    /// reported as unavailable.
    pub fn create_from_backend(backend: SolverBackend) -> Result<Arc<dyn SolverService>> {
        match backend {
            SolverBackend::Auto | SolverBackend::MicroLp => Ok(Self::default_solver()),
            #[cfg(feature = "coin_cbc")]
            SolverBackend::CoinCbc => Ok(Arc::new(GoodLpSolver::coin_cbc())),
            #[cfg(feature = "highs")]
            SolverBackend::Highs => Ok(Arc::new(crate::solver::HighsSolver::new())),
            #[allow(unreachable_patterns)]
            other => Err(SolverError::SolverNotAvailable(format!(
                "{} support was not compiled in",
                other
            ))),
        }
    }

    /// Get the default solver (microlp)
    pub fn default_solver() -> Arc<dyn SolverService> {
        Arc::new(GoodLpSolver::microlp())
    }
}
