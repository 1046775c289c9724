use super::error::{FeedError, FeedResult};
use crate::domain::{ConstraintType, Nutrient};

/// How a blend total is compared with its target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Exactly,
    AtLeast,
}

impl From<Comparison> for ConstraintType {
    fn from(comparison: Comparison) -> Self {
        match comparison {
            Comparison::Exactly => ConstraintType::Equal,
            Comparison::AtLeast => ConstraintType::GreaterThanOrEqual,
        }
    }
}

/// What a target row sums over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Plain ingredient mass
    TotalMass,
    Nutrient(Nutrient),
}

impl Requirement {
    pub fn name(&self) -> String {
        match self {
            Requirement::TotalMass => "mass".to_string(),
            Requirement::Nutrient(nutrient) => nutrient.to_string(),
        }
    }
}

/// Requirement expressed as a fraction of total feed mass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NutrientTarget {
    pub requirement: Requirement,
    pub fraction: f64,
    pub comparison: Comparison,
}

impl NutrientTarget {
    pub fn rhs(&self, total_feed_weight: f64) -> f64 {
        self.fraction * total_feed_weight
    }
}

/// Batch size and nutrient targets for one blend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedTargets {
    /// kg
    pub total_feed_weight: f64,
    pub calcium: f64,
    pub salt: f64,
    pub protein: f64,
    /// Reported against, never enforced
    pub methionine: f64,
}

impl Default for FeedTargets {
    /// Layer hens: 4% calcium, 0.3% salt (below the usual 0.4% allowance),
    /// 20% digestible crude protein and 0.6% methionine in a 20 kg batch.
    fn default() -> Self {
        Self {
            total_feed_weight: 20.0,
            calcium: 0.04,
            salt: 0.003,
            protein: 0.20,
            methionine: 0.006,
        }
    }
}

impl FeedTargets {
    /// The rows the blend must satisfy, in the order they are added.
    pub fn enforced(&self) -> [NutrientTarget; 4] {
        [
            NutrientTarget {
                requirement: Requirement::TotalMass,
                fraction: 1.0,
                comparison: Comparison::AtLeast,
            },
            NutrientTarget {
                requirement: Requirement::Nutrient(Nutrient::Calcium),
                fraction: self.calcium,
                comparison: Comparison::Exactly,
            },
            NutrientTarget {
                requirement: Requirement::Nutrient(Nutrient::Salt),
                fraction: self.salt,
                comparison: Comparison::Exactly,
            },
            NutrientTarget {
                requirement: Requirement::Nutrient(Nutrient::Protein),
                fraction: self.protein,
                comparison: Comparison::AtLeast,
            },
        ]
    }

    pub fn validate(&self) -> FeedResult<()> {
        if !(self.total_feed_weight > 0.0 && self.total_feed_weight.is_finite()) {
            return Err(FeedError::InvalidTarget(format!(
                "total feed weight must be positive, got {}",
                self.total_feed_weight
            )));
        }
        let fractions = [
            ("calcium", self.calcium),
            ("salt", self.salt),
            ("protein", self.protein),
            ("methionine", self.methionine),
        ];
        for (name, value) in fractions {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(FeedError::InvalidTarget(format!(
                    "{} fraction must be non-negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
