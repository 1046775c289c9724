// HiGHS Solver Adapter
// Implements the SolverService interface for HiGHS

use crate::domain::{
    models::{OptimizationProblem, Solution as DomainSolution, SolverStatistics},
    solver_service::{Result, SolverError, SolverService},
    value_objects::{ConstraintType, OptimizationType, SolutionStatus as DomainSolutionStatus},
};
use highs::{HighsModelStatus, RowProblem, Sense};
use std::time::Instant;

pub struct HighsSolver;

impl HighsSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HighsSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a HiGHS model status onto the domain status; statuses with no
/// domain counterpart are engine failures.
fn classify(status: HighsModelStatus) -> Result<DomainSolutionStatus> {
    match status {
        HighsModelStatus::Optimal => Ok(DomainSolutionStatus::Optimal),
        HighsModelStatus::Infeasible => Ok(DomainSolutionStatus::Infeasible),
        HighsModelStatus::Unbounded => Ok(DomainSolutionStatus::Unbounded),
        HighsModelStatus::UnboundedOrInfeasible => Ok(DomainSolutionStatus::Abnormal),
        HighsModelStatus::ReachedTimeLimit => Ok(DomainSolutionStatus::TimeLimit),
        status => Err(SolverError::ExecutionFailed(format!(
            "HiGHS solver returned status: {:?}",
            status
        ))),
    }
}

impl SolverService for HighsSolver {
    fn solve(&self, problem: &OptimizationProblem) -> Result<DomainSolution> {
        self.validate(problem)?;

        let start_time = Instant::now();

        // Columns carry their objective coefficient, rows come after
        let mut pb = RowProblem::default();
        let columns: Vec<_> = problem
            .variables
            .iter()
            .zip(&problem.objective.coefficients)
            .map(|(var_def, &obj_coeff)| {
                pb.add_column(obj_coeff, var_def.lower_bound..var_def.upper_or_infinity())
            })
            .collect();

        for constraint in &problem.constraints {
            let terms: Vec<_> = constraint
                .coefficients
                .iter()
                .zip(&columns)
                .filter(|(coeff, _)| **coeff != 0.0)
                .map(|(&coeff, &column)| (column, coeff))
                .collect();

            match constraint.constraint_type {
                ConstraintType::LessThanOrEqual => {
                    pb.add_row(..=constraint.bound, &terms);
                }
                ConstraintType::Equal => {
                    pb.add_row(constraint.bound..=constraint.bound, &terms);
                }
                ConstraintType::GreaterThanOrEqual => {
                    pb.add_row(constraint.bound.., &terms);
                }
            }
        }

        let sense = match problem.objective.optimization_type {
            OptimizationType::Maximize => Sense::Maximise,
            OptimizationType::Minimize => Sense::Minimise,
        };

        let mut model = pb.optimise(sense);
        if !problem.solver_config.verbose {
            model.make_quiet();
        }
        if let Some(limit) = problem.solver_config.time_limit {
            model.set_option("time_limit", limit);
        }

        let solved = model.solve();
        let statistics = SolverStatistics {
            simplex_iterations: None,
            solve_time_ms: start_time.elapsed().as_secs_f64() * 1000.0,
            num_variables: problem.variables.len() as u32,
            num_constraints: problem.constraints.len() as u32,
        };

        let status = solved.status();
        match classify(status)? {
            DomainSolutionStatus::Optimal => {
                let variable_values = solved.get_solution().columns().to_vec();
                let actual_obj = problem.objective.evaluate(&variable_values);

                let mut solution = DomainSolution::optimal(actual_obj, variable_values)
                    .with_statistics(statistics);
                solution.message = format!("Optimal solution found for '{}'", problem.name);
                Ok(solution)
            }
            DomainSolutionStatus::Infeasible => Ok(DomainSolution::new(
                DomainSolutionStatus::Infeasible,
                "Problem is infeasible: no solution satisfies all constraints",
            )
            .with_statistics(statistics)),
            DomainSolutionStatus::Unbounded => Ok(DomainSolution::new(
                DomainSolutionStatus::Unbounded,
                "Problem is unbounded: objective can be improved infinitely",
            )
            .with_statistics(statistics)),
            DomainSolutionStatus::TimeLimit => Ok(DomainSolution::new(
                DomainSolutionStatus::TimeLimit,
                "Time limit reached before an optimal solution was proven",
            )
            .with_statistics(statistics)),
            DomainSolutionStatus::Abnormal => Ok(DomainSolution::new(
                DomainSolutionStatus::Abnormal,
                format!("HiGHS could not tell infeasible from unbounded: {:?}", status),
            )
            .with_statistics(statistics)),
        }
    }

    fn name(&self) -> &str {
        "HiGHS"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Constraint, ObjectiveFunction, SolverConfig, Variable};
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
    fn ambiguous_status_is_not_reported_as_unbounded() {
        assert_eq!(
            classify(HighsModelStatus::UnboundedOrInfeasible).unwrap(),
            DomainSolutionStatus::Abnormal
        );
        assert_eq!(
            classify(HighsModelStatus::Unbounded).unwrap(),
            DomainSolutionStatus::Unbounded
        );
    }

    #[test]
    fn time_limit_maps_to_its_own_status() {
        assert_eq!(
            classify(HighsModelStatus::ReachedTimeLimit).unwrap(),
            DomainSolutionStatus::TimeLimit
        );
        assert!(matches!(
            classify(HighsModelStatus::LoadError),
            Err(SolverError::ExecutionFailed(_))
        ));
    }

    #[test]
    fn solves_small_minimisation() {
        let problem = diet(
            OptimizationType::Minimize,
            Constraint::new(ConstraintType::GreaterThanOrEqual, vec![1.0, 1.0], 7.0),
        )
        .with_config(SolverConfig::default().with_time_limit(10.0));
        let solution = HighsSolver::new().solve(&problem).unwrap();

        assert!(solution.is_optimal());
        assert_abs_diff_eq!(solution.variable_values[0], 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(solution.variable_values[1], 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(solution.optimal_value.unwrap(), 16.0, epsilon = 1e-6);
    }

    #[test]
    fn reports_infeasible_as_status() {
        let problem = diet(
            OptimizationType::Minimize,
            Constraint::new(ConstraintType::LessThanOrEqual, vec![1.0, 1.0], -1.0),
        );
        let solution = HighsSolver::new().solve(&problem).unwrap();
        assert!(!solution.is_optimal());
        assert!(solution.variable_values.is_empty());
    }
}
