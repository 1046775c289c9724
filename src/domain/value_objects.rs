// Domain value objects shared by the LP boundary and the feed model

use std::fmt;

/// Type of constraint comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintType {
    /// Less than or equal (≤)
    LessThanOrEqual,
    /// Equal (=)
    Equal,
    /// Greater than or equal (≥)
    GreaterThanOrEqual,
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintType::LessThanOrEqual => write!(f, "<="),
            ConstraintType::Equal => write!(f, "=="),
            ConstraintType::GreaterThanOrEqual => write!(f, ">="),
        }
    }
}

/// Direction of optimization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationType {
    /// Minimize the objective function
    Minimize,
    /// Maximize the objective function
    Maximize,
}

/// Status of the optimization solution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// Found optimal solution
    Optimal,
    /// Problem has no feasible solution
    Infeasible,
    /// Objective can be improved infinitely
    Unbounded,
    /// Time limit reached
    TimeLimit,
    /// Engine stopped for any other reason
    Abnormal,
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolutionStatus::Optimal => write!(f, "Optimal"),
            SolutionStatus::Infeasible => write!(f, "Infeasible"),
            SolutionStatus::Unbounded => write!(f, "Unbounded"),
            SolutionStatus::TimeLimit => write!(f, "Time Limit Reached"),
            SolutionStatus::Abnormal => write!(f, "Abnormal"),
        }
    }
}

/// Solver backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverBackend {
    /// Pick the engine that is always compiled in
    Auto,
    /// Pure-Rust simplex shipped with good_lp
    MicroLp,
    /// COIN-OR CBC solver
    CoinCbc,
    /// HiGHS solver
    Highs,
}

impl SolverBackend {
    /// Parse a backend name as written in `FEEDOPT_SOLVER`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(SolverBackend::Auto),
            "microlp" => Some(SolverBackend::MicroLp),
            "cbc" | "coin_cbc" | "coin-cbc" => Some(SolverBackend::CoinCbc),
            "highs" => Some(SolverBackend::Highs),
            _ => None,
        }
    }
}

impl fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverBackend::Auto => write!(f, "Auto"),
            SolverBackend::MicroLp => write!(f, "microlp"),
            SolverBackend::CoinCbc => write!(f, "COIN-OR CBC"),
            SolverBackend::Highs => write!(f, "HiGHS"),
        }
    }
}

/// Nutrient tracked for every ingredient, as a fraction of the ingredient's mass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nutrient {
    Calcium,
    Salt,
    Methionine,
    /// Digestible crude protein
    Protein,
}

impl Nutrient {
    pub const ALL: [Nutrient; 4] = [
        Nutrient::Calcium,
        Nutrient::Salt,
        Nutrient::Methionine,
        Nutrient::Protein,
    ];
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Nutrient::Calcium => write!(f, "calcium"),
            Nutrient::Salt => write!(f, "salt"),
            Nutrient::Methionine => write!(f, "methionine"),
            Nutrient::Protein => write!(f, "protein"),
        }
    }
}

/// How an ingredient's solved weight is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dosing {
    /// Batched by the whole kilogram: reported weight is rounded
    #[default]
    Coarse,
    /// Small additive doses: reported weight keeps its fraction
    Fine,
}

impl Dosing {
    pub fn apply(self, solved: f64) -> f64 {
        match self {
            Dosing::Coarse => solved.round_ties_even(),
            Dosing::Fine => solved,
        }
    }
}
