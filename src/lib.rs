// Domain layer: LP boundary models, engine contract and solve session
pub mod domain;

// Feed layer: ingredients, bound policy, constraint synthesis and reporting
pub mod feed;

// Application layer: formulation use case
pub mod application;

// Infrastructure layer: logging and the CLI run
pub mod infrastructure;

// Solver adapters: Concrete implementations of SolverService
pub mod solver;

// Re-export commonly used types
pub use domain::{
    ConstraintType, Dosing, Nutrient, OptimizationType, SessionError, SessionPhase, Solution,
    SolutionStatus, SolveSession, SolverBackend, SolverConfig, SolverError, SolverService,
    VariableId,
};

pub use feed::{
    FeedError, FeedReport, FeedTargets, FlexiblePool, Ingredient, IngredientSpec, NutrientProfile,
    WeightBounds,
};

pub use application::FeedFormulationService;

pub use infrastructure::{init_logging, run, RunError};

pub use solver::{GoodLpSolver, SolverFactory};

#[cfg(feature = "highs")]
pub use solver::HighsSolver;
