// Use case: build one feed blend on a fresh session, solve it once, report it

use std::sync::Arc;

use crate::domain::{SolveSession, SolverConfig, SolverService};
use crate::feed::{
    catalog, synthesize, FeedError, FeedReport, FeedResult, FeedTargets, Ingredient,
    IngredientSpec,
};

/// Orchestrates formulation against one engine. Every call gets its own
/// [`SolveSession`], so calls never share variables or rows.
pub struct FeedFormulationService {
    solver: Arc<dyn SolverService>,
    config: SolverConfig,
}

impl FeedFormulationService {
    pub fn new(solver: Arc<dyn SolverService>) -> Self {
        Self {
            solver,
            config: SolverConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn solver_name(&self) -> &str {
        self.solver.name()
    }

    /// Formulate the built-in layer ration for `targets`.
    pub fn formulate_layer_feed(&self, targets: &FeedTargets) -> FeedResult<FeedReport> {
        let ration = catalog::layer_ration(targets)?;
        self.formulate(ration, targets)
    }

    /// Register `ration`, synthesize the rows and objective, solve once.
    ///
    /// A non-optimal status comes back as [`FeedError::Infeasible`],
    /// [`FeedError::Unbounded`] or [`FeedError::SolveFailed`]; no solved
    /// values are read in that case.
    pub fn formulate(
        &self,
        ration: Vec<IngredientSpec>,
        targets: &FeedTargets,
    ) -> FeedResult<FeedReport> {
        let mut session = SolveSession::new(Arc::clone(&self.solver))
            .with_name("Optimise Feed Digestible Protein")
            .with_config(self.config.clone());

        let ingredients = ration
            .into_iter()
            .map(|spec| Ingredient::register(spec, &mut session))
            .collect::<FeedResult<Vec<_>>>()?;

        synthesize(&mut session, &ingredients, targets)?;

        let (status, message) = {
            let solution = session.solve().map_err(FeedError::from_solve)?;
            (solution.status, solution.message.clone())
        };
        if let Err(err) = FeedError::check_status(status, &message) {
            tracing::warn!(
                component = "formulation_service",
                status = %status,
                "Solver could not find an optimal blend"
            );
            return Err(err);
        }

        let report = FeedReport::collect(&session, &ingredients, targets)?;
        tracing::info!(
            component = "formulation_service",
            objective = report.objective_value,
            total_feed_weight = report.total_feed_weight(),
            "Blend formulated"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OptimizationProblem, Solution, SolverError};

    struct BrokenEngine;

    impl SolverService for BrokenEngine {
        fn solve(&self, _problem: &OptimizationProblem) -> Result<Solution, SolverError> {
            Err(SolverError::ExecutionFailed("engine crashed".into()))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[test]
    fn engine_failure_is_a_solve_failure() {
        let service = FeedFormulationService::new(Arc::new(BrokenEngine));
        let err = service
            .formulate_layer_feed(&FeedTargets::default())
            .unwrap_err();
        assert!(err.is_solve_failure(), "{err}");
        assert!(err.to_string().contains("engine crashed"));
    }

    #[test]
    fn invalid_targets_fail_before_solving() {
        let service = FeedFormulationService::new(Arc::new(BrokenEngine));
        let targets = FeedTargets {
            total_feed_weight: -1.0,
            ..FeedTargets::default()
        };
        assert!(matches!(
            service.formulate_layer_feed(&targets),
            Err(FeedError::InvalidTarget(_))
        ));
    }
}
