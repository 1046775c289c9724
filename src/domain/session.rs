// Solve Session
// One problem build and one solve against one engine. Phases run
// Registering -> Constraining -> Ready -> Solved | Failed; out-of-order calls
// are rejected with SessionError::PhaseViolation.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::models::{
    Constraint, ObjectiveFunction, OptimizationProblem, Solution, SolverConfig, SolverStatistics,
    Variable,
};
use super::solver_service::{SolverError, SolverService};
use super::value_objects::{ConstraintType, OptimizationType, SolutionStatus};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to a decision variable declared on a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariableId {
    session: u64,
    index: usize,
}

impl VariableId {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Where a session is in its build/solve lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Variables may be declared
    Registering,
    /// Variable set is sealed, rows may be added
    Constraining,
    /// Objective is set, ready to solve
    Ready,
    /// The engine returned a result (optimal or not)
    Solved,
    /// The engine failed to run
    Failed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::Registering => write!(f, "registering variables"),
            SessionPhase::Constraining => write!(f, "adding constraints"),
            SessionPhase::Ready => write!(f, "ready to solve"),
            SessionPhase::Solved => write!(f, "solved"),
            SessionPhase::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid bounds for '{name}': [{lower}, {upper}]")]
    InvalidBounds { name: String, lower: f64, upper: f64 },

    #[error("Cannot {operation} while the session is {phase}")]
    PhaseViolation {
        operation: &'static str,
        phase: SessionPhase,
    },

    #[error("Variable {0:?} does not belong to this session")]
    ForeignVariable(VariableId),

    #[error("No solved value available: {0}")]
    NotSolved(String),

    #[error(transparent)]
    Solver(#[from] SolverError),
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Explicitly owned engine session
pub struct SolveSession {
    id: u64,
    name: String,
    solver: Arc<dyn SolverService>,
    config: SolverConfig,
    phase: SessionPhase,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    objective: Option<ObjectiveFunction>,
    solution: Option<Solution>,
}

impl SolveSession {
    pub fn new(solver: Arc<dyn SolverService>) -> Self {
        Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            name: String::new(),
            solver,
            config: SolverConfig::default(),
            phase: SessionPhase::Registering,
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: None,
            solution: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn solver_name(&self) -> &str {
        self.solver.name()
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> Option<&ObjectiveFunction> {
        self.objective.as_ref()
    }

    /// Declare a continuous variable bounded to `[lower, upper]`; `None` or
    /// `+inf` leaves it open above.
    pub fn declare_variable(
        &mut self,
        name: impl Into<String>,
        lower: f64,
        upper: Option<f64>,
    ) -> SessionResult<VariableId> {
        self.expect_phase(SessionPhase::Registering, "declare a variable")?;

        let name = name.into();
        let upper = upper.filter(|u| *u != f64::INFINITY);
        let upper_shown = upper.unwrap_or(f64::INFINITY);
        let lower_ok = lower >= 0.0 && lower.is_finite();
        let upper_ok = upper.map_or(true, |u| u >= lower);
        if !lower_ok || !upper_ok {
            return Err(SessionError::InvalidBounds {
                name,
                lower,
                upper: upper_shown,
            });
        }

        let id = VariableId {
            session: self.id,
            index: self.variables.len(),
        };
        tracing::debug!(
            component = "session",
            operation = "declare_variable",
            var_index = id.index,
            name = %name,
            lower,
            upper = upper_shown,
            "Declared variable"
        );
        self.variables
            .push(Variable::continuous(name).with_bounds(lower, upper));
        Ok(id)
    }

    /// Close the variable set; rows can only reference sealed variables.
    pub fn seal_variables(&mut self) -> SessionResult<()> {
        self.expect_phase(SessionPhase::Registering, "seal the variable set")?;
        self.phase = SessionPhase::Constraining;
        tracing::debug!(
            component = "session",
            operation = "seal_variables",
            variables = self.variables.len(),
            "Sealed variable set"
        );
        Ok(())
    }

    /// Add `Σ coeff·var (op) rhs`. Repeated variables have their coefficients
    /// summed; variables not mentioned get zero.
    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        terms: &[(VariableId, f64)],
        constraint_type: ConstraintType,
        rhs: f64,
    ) -> SessionResult<usize> {
        self.expect_phase(SessionPhase::Constraining, "add a constraint")?;
        let coefficients = self.dense(terms)?;
        let name = name.into();
        let row = self.constraints.len();

        tracing::debug!(
            component = "session",
            operation = "add_constraint",
            row,
            name = %name,
            sense = %constraint_type,
            rhs,
            terms = terms.len(),
            "Added constraint"
        );
        self.constraints
            .push(Constraint::new(constraint_type, coefficients, rhs).with_name(name));
        Ok(row)
    }

    /// Set the single objective; no rows may be added afterwards.
    pub fn set_objective(
        &mut self,
        optimization_type: OptimizationType,
        terms: &[(VariableId, f64)],
    ) -> SessionResult<()> {
        self.expect_phase(SessionPhase::Constraining, "set the objective")?;
        let coefficients = self.dense(terms)?;
        self.objective = Some(ObjectiveFunction::new(optimization_type, coefficients));
        self.phase = SessionPhase::Ready;

        tracing::debug!(
            component = "session",
            operation = "set_objective",
            sense = ?optimization_type,
            terms = terms.len(),
            "Set objective function"
        );
        Ok(())
    }

    /// Run the engine once. A non-optimal status is still `Ok`; inspect
    /// [`Solution::status`].
    pub fn solve(&mut self) -> SessionResult<&Solution> {
        self.expect_phase(SessionPhase::Ready, "solve")?;
        let objective = match self.objective.take() {
            Some(objective) => objective,
            None => {
                return Err(SessionError::PhaseViolation {
                    operation: "solve without an objective",
                    phase: self.phase,
                })
            }
        };

        let problem = OptimizationProblem::new(objective)
            .with_name(self.name.clone())
            .with_variables(self.variables.clone())
            .with_config(self.config.clone());
        let problem = self
            .constraints
            .iter()
            .cloned()
            .fold(problem, |p, c| p.add_constraint(c));

        tracing::info!(
            component = "session",
            operation = "solve",
            solver = self.solver.name(),
            variables = problem.variables.len(),
            constraints = problem.constraints.len(),
            "Solving problem"
        );

        let outcome = self.solver.solve(&problem);
        self.objective = Some(problem.objective);

        match outcome {
            Ok(solution) => {
                tracing::info!(
                    component = "session",
                    operation = "solve",
                    status = %solution.status,
                    solve_time_ms = solution.statistics.solve_time_ms,
                    "Solve finished"
                );
                self.phase = SessionPhase::Solved;
                let solution: &Solution = self.solution.insert(solution);
                Ok(solution)
            }
            Err(err) => {
                tracing::error!(
                    component = "session",
                    operation = "solve",
                    error = %err,
                    "Solver failed"
                );
                self.phase = SessionPhase::Failed;
                Err(err.into())
            }
        }
    }

    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    pub fn status(&self) -> Option<SolutionStatus> {
        self.solution.as_ref().map(|s| s.status)
    }

    pub fn statistics(&self) -> Option<&SolverStatistics> {
        self.solution.as_ref().map(|s| &s.statistics)
    }

    /// Solved value of `id`; only available after an optimal solve.
    pub fn value(&self, id: VariableId) -> SessionResult<f64> {
        self.check_owned(id)?;
        let solution = self.optimal_solution()?;
        solution
            .variable_values
            .get(id.index)
            .copied()
            .ok_or_else(|| {
                SessionError::NotSolved(format!("engine returned no value for variable #{}", id.index))
            })
    }

    pub fn objective_value(&self) -> SessionResult<f64> {
        let solution = self.optimal_solution()?;
        solution
            .optimal_value
            .ok_or_else(|| SessionError::NotSolved("engine returned no objective value".into()))
    }

    fn optimal_solution(&self) -> SessionResult<&Solution> {
        match &self.solution {
            Some(solution) if solution.is_optimal() => Ok(solution),
            Some(solution) => Err(SessionError::NotSolved(format!(
                "solve ended with status {}",
                solution.status
            ))),
            None => Err(SessionError::NotSolved(format!(
                "session is {}",
                self.phase
            ))),
        }
    }

    fn expect_phase(&self, expected: SessionPhase, operation: &'static str) -> SessionResult<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SessionError::PhaseViolation {
                operation,
                phase: self.phase,
            })
        }
    }

    fn check_owned(&self, id: VariableId) -> SessionResult<()> {
        if id.session == self.id && id.index < self.variables.len() {
            Ok(())
        } else {
            Err(SessionError::ForeignVariable(id))
        }
    }

    fn dense(&self, terms: &[(VariableId, f64)]) -> SessionResult<Vec<f64>> {
        let mut coefficients = vec![0.0; self.variables.len()];
        for &(id, coeff) in terms {
            self.check_owned(id)?;
            coefficients[id.index] += coeff;
        }
        Ok(coefficients)
    }
}

impl fmt::Debug for SolveSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolveSession")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("solver", &self.solver.name())
            .field("phase", &self.phase)
            .field("variables", &self.variables.len())
            .field("constraints", &self.constraints.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::GoodLpSolver;
    use approx::assert_abs_diff_eq;

    fn session() -> SolveSession {
        SolveSession::new(Arc::new(GoodLpSolver::microlp()))
    }

    #[test]
    fn rejects_malformed_bounds() {
        let mut s = session();
        assert!(matches!(
            s.declare_variable("neg", -1.0, None),
            Err(SessionError::InvalidBounds { .. })
        ));
        assert!(matches!(
            s.declare_variable("inverted", 2.0, Some(1.0)),
            Err(SessionError::InvalidBounds { .. })
        ));
        assert!(matches!(
            s.declare_variable("nan", f64::NAN, None),
            Err(SessionError::InvalidBounds { .. })
        ));
        assert_eq!(s.num_variables(), 0);
    }

    #[test]
    fn rows_before_sealing_are_rejected() {
        let mut s = session();
        let x = s.declare_variable("x", 0.0, None).unwrap();
        let err = s
            .add_constraint("early", &[(x, 1.0)], ConstraintType::GreaterThanOrEqual, 1.0)
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::PhaseViolation {
                phase: SessionPhase::Registering,
                ..
            }
        ));
    }

    #[test]
    fn variables_after_sealing_are_rejected() {
        let mut s = session();
        s.declare_variable("x", 0.0, None).unwrap();
        s.seal_variables().unwrap();
        assert!(matches!(
            s.declare_variable("late", 0.0, None),
            Err(SessionError::PhaseViolation { .. })
        ));
    }

    #[test]
    fn foreign_variables_are_rejected() {
        let mut a = session();
        let mut b = session();
        let xa = a.declare_variable("x", 0.0, None).unwrap();
        b.declare_variable("x", 0.0, None).unwrap();
        b.seal_variables().unwrap();
        assert!(matches!(
            b.add_constraint("mix", &[(xa, 1.0)], ConstraintType::Equal, 1.0),
            Err(SessionError::ForeignVariable(_))
        ));
    }

    #[test]
    fn value_before_solve_is_not_solved() {
        let mut s = session();
        let x = s.declare_variable("x", 0.0, None).unwrap();
        assert!(matches!(s.value(x), Err(SessionError::NotSolved(_))));
    }

    #[test]
    fn solves_once_and_refuses_reuse() {
        let mut s = session();
        let x = s.declare_variable("x", 0.0, Some(10.0)).unwrap();
        let y = s.declare_variable("y", 1.0, None).unwrap();
        s.seal_variables().unwrap();
        s.add_constraint("sum", &[(x, 1.0), (y, 1.0)], ConstraintType::GreaterThanOrEqual, 4.0)
            .unwrap();
        s.set_objective(OptimizationType::Minimize, &[(x, 1.0), (y, 2.0)])
            .unwrap();

        let status = s.solve().unwrap().status;
        assert_eq!(status, SolutionStatus::Optimal);
        assert_abs_diff_eq!(s.value(x).unwrap(), 3.0, epsilon = 1e-6);
        assert_abs_diff_eq!(s.value(y).unwrap(), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(s.objective_value().unwrap(), 5.0, epsilon = 1e-6);

        assert!(matches!(
            s.add_constraint("again", &[(x, 1.0)], ConstraintType::Equal, 1.0),
            Err(SessionError::PhaseViolation { .. })
        ));
        assert!(matches!(
            s.set_objective(OptimizationType::Maximize, &[(x, 1.0)]),
            Err(SessionError::PhaseViolation { .. })
        ));
        assert!(matches!(
            s.solve(),
            Err(SessionError::PhaseViolation {
                phase: SessionPhase::Solved,
                ..
            })
        ));
    }

    #[test]
    fn duplicate_terms_are_summed() {
        let mut s = session();
        let x = s.declare_variable("x", 0.0, None).unwrap();
        let y = s.declare_variable("y", 0.0, None).unwrap();
        s.seal_variables().unwrap();
        s.add_constraint("dup", &[(x, 1.0), (x, 2.0)], ConstraintType::Equal, 3.0)
            .unwrap();
        assert_eq!(s.constraints()[0].coefficients, vec![3.0, 0.0]);
        let _ = y;
    }

    #[test]
    fn infeasible_solve_yields_no_values() {
        let mut s = session();
        let x = s.declare_variable("x", 0.0, Some(1.0)).unwrap();
        s.seal_variables().unwrap();
        s.add_constraint("too_much", &[(x, 1.0)], ConstraintType::GreaterThanOrEqual, 2.0)
            .unwrap();
        s.set_objective(OptimizationType::Minimize, &[(x, 1.0)])
            .unwrap();

        assert_eq!(s.solve().unwrap().status, SolutionStatus::Infeasible);
        assert!(matches!(s.value(x), Err(SessionError::NotSolved(_))));
        assert!(s.objective_value().is_err());
    }
}
