use super::value_objects::{ConstraintType, OptimizationType, SolutionStatus, SolverBackend};

/// Continuous decision variable in an optimization problem
#[derive(Debug, Clone)]
pub struct Variable {
    pub lower_bound: f64,
    pub upper_bound: Option<f64>,
    pub name: String,
}

impl Variable {
    pub fn continuous(name: impl Into<String>) -> Self {
        Self {
            lower_bound: 0.0,
            upper_bound: None,
            name: name.into(),
        }
    }

    pub fn with_bounds(mut self, lower: f64, upper: Option<f64>) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }

    /// Upper bound as the engines expect it, `+inf` when open above.
    pub fn upper_or_infinity(&self) -> f64 {
        self.upper_bound.unwrap_or(f64::INFINITY)
    }
}

/// Objective function to minimize or maximize
#[derive(Debug, Clone)]
pub struct ObjectiveFunction {
    pub optimization_type: OptimizationType,
    pub coefficients: Vec<f64>,
}

impl ObjectiveFunction {
    pub fn new(optimization_type: OptimizationType, coefficients: Vec<f64>) -> Self {
        Self {
            optimization_type,
            coefficients,
        }
    }

    pub fn num_variables(&self) -> usize {
        self.coefficients.len()
    }

    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .map(|(c, v)| c * v)
            .sum()
    }
}

/// Linear constraint on variables
#[derive(Debug, Clone)]
pub struct Constraint {
    pub constraint_type: ConstraintType,
    pub coefficients: Vec<f64>,
    pub bound: f64,
    pub name: String,
}

impl Constraint {
    pub fn new(constraint_type: ConstraintType, coefficients: Vec<f64>, bound: f64) -> Self {
        Self {
            constraint_type,
            coefficients,
            bound,
            name: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn num_variables(&self) -> usize {
        self.coefficients.len()
    }
}

/// Configuration for the solver
#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub backend: SolverBackend,
    /// Seconds; forwarded to engines that support a time limit
    pub time_limit: Option<f64>,
    /// Let the engine write its own log; quiet by default
    pub verbose: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: SolverBackend::Auto,
            time_limit: None,
            verbose: false,
        }
    }
}

impl SolverConfig {
    pub const BACKEND_VAR: &'static str = "FEEDOPT_SOLVER";
    pub const TIME_LIMIT_VAR: &'static str = "FEEDOPT_TIME_LIMIT";
    pub const VERBOSE_VAR: &'static str = "FEEDOPT_VERBOSE";

    /// Defaults overridden by `FEEDOPT_SOLVER`, `FEEDOPT_TIME_LIMIT` and
    /// `FEEDOPT_VERBOSE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(Self::BACKEND_VAR) {
            match SolverBackend::from_name(&raw) {
                Some(backend) => config = config.with_backend(backend),
                None => tracing::warn!(
                    var = Self::BACKEND_VAR,
                    value = %raw,
                    "Unknown solver backend, keeping default"
                ),
            }
        }

        if let Some(raw) = lookup(Self::TIME_LIMIT_VAR) {
            match raw.trim().parse::<f64>() {
                Ok(seconds) if seconds > 0.0 && seconds.is_finite() => {
                    config = config.with_time_limit(seconds)
                }
                _ => tracing::warn!(
                    var = Self::TIME_LIMIT_VAR,
                    value = %raw,
                    "Ignoring invalid time limit"
                ),
            }
        }

        if let Some(raw) = lookup(Self::VERBOSE_VAR) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => config = config.with_verbose(true),
                "0" | "false" | "no" | "off" => config = config.with_verbose(false),
                _ => tracing::warn!(
                    var = Self::VERBOSE_VAR,
                    value = %raw,
                    "Ignoring invalid verbosity flag"
                ),
            }
        }

        config
    }

    pub fn with_backend(mut self, backend: SolverBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Complete optimization problem
#[derive(Debug, Clone)]
pub struct OptimizationProblem {
    pub name: String,
    pub objective: ObjectiveFunction,
    pub constraints: Vec<Constraint>,
    pub variables: Vec<Variable>,
    pub solver_config: SolverConfig,
}

impl OptimizationProblem {
    pub fn new(objective: ObjectiveFunction) -> Self {
        Self {
            name: String::new(),
            objective,
            constraints: Vec::new(),
            variables: Vec::new(),
            solver_config: SolverConfig::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn add_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_variables(mut self, variables: Vec<Variable>) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.solver_config = config;
        self
    }

    pub fn num_variables(&self) -> usize {
        self.objective.num_variables()
    }
}

/// Statistics about the solve process
#[derive(Debug, Clone, Default)]
pub struct SolverStatistics {
    /// `None` when the engine does not expose an iteration count
    pub simplex_iterations: Option<u64>,
    pub solve_time_ms: f64,
    pub num_variables: u32,
    pub num_constraints: u32,
}

/// Solution to an optimization problem
#[derive(Debug, Clone)]
pub struct Solution {
    pub status: SolutionStatus,
    pub optimal_value: Option<f64>,
    pub variable_values: Vec<f64>,
    pub message: String,
    pub statistics: SolverStatistics,
}

impl Solution {
    pub fn new(status: SolutionStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            optimal_value: None,
            variable_values: Vec::new(),
            message: message.into(),
            statistics: SolverStatistics::default(),
        }
    }

    pub fn optimal(value: f64, variable_values: Vec<f64>) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            optimal_value: Some(value),
            variable_values,
            message: "Optimal solution found".to_string(),
            statistics: SolverStatistics::default(),
        }
    }

    pub fn with_statistics(mut self, statistics: SolverStatistics) -> Self {
        self.statistics = statistics;
        self
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn config_defaults_without_env() {
        let config = SolverConfig::from_lookup(lookup(&[]));
        assert_eq!(config.backend, SolverBackend::Auto);
        assert_eq!(config.time_limit, None);
    }

    #[test]
    fn config_reads_backend_and_time_limit() {
        let config = SolverConfig::from_lookup(lookup(&[
            ("FEEDOPT_SOLVER", "highs"),
            ("FEEDOPT_TIME_LIMIT", "2.5"),
        ]));
        assert_eq!(config.backend, SolverBackend::Highs);
        assert_eq!(config.time_limit, Some(2.5));
        assert!(!config.verbose);
    }

    #[test]
    fn config_reads_verbosity_flag() {
        let config = SolverConfig::from_lookup(lookup(&[("FEEDOPT_VERBOSE", " On ")]));
        assert!(config.verbose);

        let config = SolverConfig::from_lookup(lookup(&[("FEEDOPT_VERBOSE", "0")]));
        assert!(!config.verbose);
    }

    #[test]
    fn config_ignores_garbage() {
        let config = SolverConfig::from_lookup(lookup(&[
            ("FEEDOPT_SOLVER", "glop"),
            ("FEEDOPT_TIME_LIMIT", "-1"),
            ("FEEDOPT_VERBOSE", "loud"),
        ]));
        assert_eq!(config.backend, SolverBackend::Auto);
        assert_eq!(config.time_limit, None);
        assert!(!config.verbose);
    }
}
