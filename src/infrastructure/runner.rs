// Infrastructure: the one-shot CLI run
// Builds the engine from configuration, formulates the layer ration and
// writes the report.

use std::io::{self, Write};

use crate::application::FeedFormulationService;
use crate::domain::SolverConfig;
use crate::feed::{FeedError, FeedTargets};
use crate::solver::SolverFactory;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Solver(#[from] crate::domain::SolverError),

    #[error("Failed to write report: {0}")]
    Io(#[from] io::Error),
}

/// Formulate the built-in ration and write the report to `out`. A blend the
/// engine cannot solve is reported, not returned as an error.
pub fn run(config: SolverConfig, targets: &FeedTargets, out: &mut impl Write) -> Result<(), RunError> {
    let solver = SolverFactory::create_solver(&config)?;
    let service = FeedFormulationService::new(solver).with_config(config);

    match service.formulate_layer_feed(targets) {
        Ok(report) => writeln!(out, "{}", report)?,
        Err(err) if err.is_solve_failure() => {
            writeln!(out, "Status: {}", failure_status(&err))?;
            writeln!(out, "The solver could not find an optimal solution.")?;
            tracing::info!(error = %err, "Run finished without a blend");
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

fn failure_status(err: &FeedError) -> String {
    match err {
        FeedError::Infeasible => "Infeasible".to_string(),
        FeedError::Unbounded => "Unbounded".to_string(),
        FeedError::SolveFailed { status, .. } => status.clone(),
        other => other.to_string(),
    }
}
