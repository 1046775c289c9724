use crate::domain::{SessionError, SolutionStatus, SolverError};

/// Errors raised while formulating, solving or reading back a feed blend
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Invalid weight bounds for '{ingredient}': min {min}, max {max}")]
    InvalidBounds {
        ingredient: String,
        min: f64,
        max: f64,
    },

    #[error("Invalid {nutrient} fraction for '{ingredient}': {value}")]
    InvalidNutrient {
        ingredient: String,
        nutrient: String,
        value: f64,
    },

    #[error("Invalid flexible pool: {0}")]
    InvalidPool(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Ration has no ingredients")]
    EmptyRation,

    #[error("'{ingredient}' has no solved weight: {reason}")]
    NotSolved { ingredient: String, reason: String },

    #[error("Problem is infeasible: no blend satisfies all constraints")]
    Infeasible,

    #[error("Problem is unbounded: objective can be improved infinitely")]
    Unbounded,

    #[error("Solve failed ({status}): {reason}")]
    SolveFailed { status: String, reason: String },

    #[error(transparent)]
    Session(#[from] SessionError),
}

pub type FeedResult<T> = std::result::Result<T, FeedError>;

impl FeedError {
    /// Map a finished solve to `Ok` only when it is optimal.
    pub fn check_status(status: SolutionStatus, message: &str) -> FeedResult<()> {
        match status {
            SolutionStatus::Optimal => Ok(()),
            SolutionStatus::Infeasible => Err(FeedError::Infeasible),
            SolutionStatus::Unbounded => Err(FeedError::Unbounded),
            other => Err(FeedError::SolveFailed {
                status: other.to_string(),
                reason: message.to_string(),
            }),
        }
    }

    /// Engine failures surface as `SolveFailed`; everything else stays a
    /// session error.
    pub fn from_solve(err: SessionError) -> Self {
        match err {
            SessionError::Solver(SolverError::InvalidProblem(reason)) => FeedError::SolveFailed {
                status: "Invalid Problem".into(),
                reason,
            },
            SessionError::Solver(err) => FeedError::SolveFailed {
                status: "Abnormal".into(),
                reason: err.to_string(),
            },
            other => FeedError::Session(other),
        }
    }

    /// True when the engine ran but found no optimal blend. The CLI reports
    /// these instead of failing.
    pub fn is_solve_failure(&self) -> bool {
        matches!(
            self,
            FeedError::Infeasible | FeedError::Unbounded | FeedError::SolveFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(FeedError::check_status(SolutionStatus::Optimal, "").is_ok());
        assert!(matches!(
            FeedError::check_status(SolutionStatus::Infeasible, ""),
            Err(FeedError::Infeasible)
        ));
        assert!(matches!(
            FeedError::check_status(SolutionStatus::Unbounded, ""),
            Err(FeedError::Unbounded)
        ));
        let err = FeedError::check_status(SolutionStatus::TimeLimit, "stopped").unwrap_err();
        assert!(err.is_solve_failure());
        assert_eq!(err.to_string(), "Solve failed (Time Limit Reached): stopped");
    }

    #[test]
    fn engine_errors_become_solve_failures() {
        let err = FeedError::from_solve(SessionError::Solver(SolverError::ExecutionFailed(
            "boom".into(),
        )));
        assert!(err.is_solve_failure());

        let err = FeedError::from_solve(SessionError::NotSolved("x".into()));
        assert!(!err.is_solve_failure());
    }
}
