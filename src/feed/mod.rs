// Feed blending: ingredient model, bound policy, constraint synthesis and reporting

pub mod bound_policy;
pub mod catalog;
pub mod error;
pub mod formulation;
pub mod ingredient;
pub mod report;
pub mod targets;

pub use bound_policy::{mass_share, FlexiblePool};
pub use error::{FeedError, FeedResult};
pub use formulation::{synthesize, Formulation};
pub use ingredient::{Ingredient, IngredientSpec, NutrientProfile, WeightBounds};
pub use report::{FeedReport, ReportLine};
pub use targets::{Comparison, FeedTargets, NutrientTarget, Requirement};
