// good_lp adapter
// Translates the domain problem into good_lp variables, rows and objective.
// microlp is always compiled in; CBC is behind the `coin_cbc` feature.

use crate::domain::{
    models::{OptimizationProblem, Solution as DomainSolution, SolverStatistics},
    solver_service::{Result, SolverError, SolverService},
    value_objects::{ConstraintType, OptimizationType, SolutionStatus as DomainSolutionStatus},
};
use good_lp::{
    variable, variables, Constraint as LpConstraint, Expression, ProblemVariables,
    ResolutionError, Solution as GoodLpSolutionTrait, SolverModel, Variable as GoodLpVariable,
};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoodLpBackend {
    MicroLp,
    #[cfg(feature = "coin_cbc")]
    CoinCbc,
}

pub struct GoodLpSolver {
    backend: GoodLpBackend,
}

impl GoodLpSolver {
    pub fn new(backend: GoodLpBackend) -> Self {
        Self { backend }
    }

    pub fn microlp() -> Self {
        Self::new(GoodLpBackend::MicroLp)
    }

    #[cfg(feature = "coin_cbc")]
    pub fn coin_cbc() -> Self {
        Self::new(GoodLpBackend::CoinCbc)
    }
}

impl Default for GoodLpSolver {
    fn default() -> Self {
        Self::microlp()
    }
}

/// Model pieces shared by every good_lp backend
struct Translated {
    vars: ProblemVariables,
    columns: Vec<GoodLpVariable>,
    objective: Expression,
    rows: Vec<LpConstraint>,
}

fn translate(problem: &OptimizationProblem) -> Translated {
    let mut vars = variables!();
    let columns: Vec<GoodLpVariable> = problem
        .variables
        .iter()
        .map(|var_def| {
            let definition = variable().name(var_def.name.clone()).min(var_def.lower_bound);
            let definition = match var_def.upper_bound {
                Some(upper) => definition.max(upper),
                None => definition,
            };
            vars.add(definition)
        })
        .collect();

    let objective = problem
        .objective
        .coefficients
        .iter()
        .zip(&columns)
        .filter(|(coeff, _)| **coeff != 0.0)
        .fold(Expression::from(0.0), |sum, (&coeff, &column)| {
            sum + coeff * column
        });

    let rows = problem
        .constraints
        .iter()
        .map(|constraint| {
            let lhs = constraint
                .coefficients
                .iter()
                .zip(&columns)
                .filter(|(coeff, _)| **coeff != 0.0)
                .fold(Expression::from(0.0), |sum, (&coeff, &column)| {
                    sum + coeff * column
                });

            match constraint.constraint_type {
                ConstraintType::LessThanOrEqual => lhs.leq(constraint.bound),
                ConstraintType::Equal => lhs.eq(constraint.bound),
                ConstraintType::GreaterThanOrEqual => lhs.geq(constraint.bound),
            }
        })
        .collect();

    Translated {
        vars,
        columns,
        objective,
        rows,
    }
}

fn read_values(
    result: std::result::Result<impl GoodLpSolutionTrait, ResolutionError>,
    columns: &[GoodLpVariable],
) -> std::result::Result<Vec<f64>, ResolutionError> {
    result.map(|sol| columns.iter().map(|&column| sol.value(column)).collect())
}

impl SolverService for GoodLpSolver {
    fn solve(&self, problem: &OptimizationProblem) -> Result<DomainSolution> {
        self.validate(problem)?;

        let start_time = Instant::now();
        let config = &problem.solver_config;
        let Translated {
            vars,
            columns,
            objective,
            rows,
        } = translate(problem);

        let unsolved = match problem.objective.optimization_type {
            OptimizationType::Minimize => vars.minimise(objective),
            OptimizationType::Maximize => vars.maximise(objective),
        };

        let values = match self.backend {
            GoodLpBackend::MicroLp => {
                if let Some(limit) = config.time_limit {
                    tracing::warn!(
                        solver = self.name(),
                        time_limit = limit,
                        "Engine has no time limit, ignoring"
                    );
                }
                let model = unsolved.using(good_lp::solvers::microlp::microlp);
                let model = rows.into_iter().fold(model, |m, row| m.with(row));
                read_values(model.solve(), &columns)
            }
            #[cfg(feature = "coin_cbc")]
            GoodLpBackend::CoinCbc => {
                let mut model = unsolved.using(good_lp::solvers::coin_cbc::coin_cbc);
                if let Some(limit) = config.time_limit {
                    model.set_parameter("sec", &limit.to_string());
                }
                if !config.verbose {
                    model.set_parameter("loglevel", "0");
                }
                let model = rows.into_iter().fold(model, |m, row| m.with(row));
                read_values(model.solve(), &columns)
            }
        };

        let statistics = SolverStatistics {
            simplex_iterations: None,
            solve_time_ms: start_time.elapsed().as_secs_f64() * 1000.0,
            num_variables: problem.variables.len() as u32,
            num_constraints: problem.constraints.len() as u32,
        };

        match values {
            Ok(variable_values) => {
                let actual_obj = problem.objective.evaluate(&variable_values);
                let mut solution = DomainSolution::optimal(actual_obj, variable_values)
                    .with_statistics(statistics);
                solution.message = format!("Optimal solution found for '{}'", problem.name);
                Ok(solution)
            }
            Err(ResolutionError::Infeasible) => Ok(DomainSolution::new(
                DomainSolutionStatus::Infeasible,
                "Problem is infeasible: no solution satisfies all constraints",
            )
            .with_statistics(statistics)),
            Err(ResolutionError::Unbounded) => Ok(DomainSolution::new(
                DomainSolutionStatus::Unbounded,
                "Problem is unbounded: objective can be improved infinitely",
            )
            .with_statistics(statistics)),
            Err(e) => Err(SolverError::ExecutionFailed(format!("{:?}", e))),
        }
    }

    fn name(&self) -> &str {
        match self.backend {
            GoodLpBackend::MicroLp => "microlp",
            #[cfg(feature = "coin_cbc")]
            GoodLpBackend::CoinCbc => "COIN-OR CBC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Constraint, ObjectiveFunction, Variable};
    use approx::assert_abs_diff_eq;

    fn diet(sense: OptimizationType, row: Constraint) -> OptimizationProblem {
        OptimizationProblem::new(ObjectiveFunction::new(sense, vec![2.0, 3.0]))
            .with_name("diet")
            .with_variables(vec![
                Variable::continuous("a").with_bounds(0.0, Some(5.0)),
                Variable::continuous("b"),
            ])
            .add_constraint(row)
    }

    #[test]
    fn solves_small_minimisation() {
        let problem = diet(
            OptimizationType::Minimize,
            Constraint::new(ConstraintType::GreaterThanOrEqual, vec![1.0, 1.0], 7.0),
        );
        let solution = GoodLpSolver::microlp().solve(&problem).unwrap();

        assert!(solution.is_optimal());
        assert_abs_diff_eq!(solution.variable_values[0], 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(solution.variable_values[1], 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(solution.optimal_value.unwrap(), 16.0, epsilon = 1e-6);
        assert_eq!(solution.statistics.num_constraints, 1);
        assert_eq!(solution.statistics.simplex_iterations, None);
    }

    #[test]
    fn reports_infeasible_as_status() {
        let problem = diet(
            OptimizationType::Minimize,
            Constraint::new(ConstraintType::LessThanOrEqual, vec![1.0, 1.0], -1.0),
        );
        let solution = GoodLpSolver::microlp().solve(&problem).unwrap();
        assert_eq!(solution.status, DomainSolutionStatus::Infeasible);
        assert!(solution.variable_values.is_empty());
    }

    #[test]
    fn reports_unbounded_as_status() {
        let problem = diet(
            OptimizationType::Maximize,
            Constraint::new(ConstraintType::GreaterThanOrEqual, vec![1.0, 1.0], 1.0),
        );
        let solution = GoodLpSolver::microlp().solve(&problem).unwrap();
        assert_eq!(solution.status, DomainSolutionStatus::Unbounded);
    }

    #[test]
    fn invalid_problem_is_an_error() {
        let problem = OptimizationProblem::new(ObjectiveFunction::new(
            OptimizationType::Minimize,
            vec![1.0],
        ))
        .with_variables(vec![Variable::continuous("x").with_bounds(2.0, Some(1.0))]);
        assert!(matches!(
            GoodLpSolver::microlp().solve(&problem),
            Err(SolverError::InvalidProblem(_))
        ));
    }
}
