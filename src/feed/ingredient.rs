// Feed ingredients and the decision variable each one owns.

use std::fmt;

use super::error::{FeedError, FeedResult};
use crate::domain::{Dosing, Nutrient, SessionError, SolveSession, VariableId};

/// Nutrient content as fractions of the ingredient's mass
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NutrientProfile {
    pub calcium: f64,
    pub salt: f64,
    pub methionine: f64,
    /// Digestible crude protein
    pub protein: f64,
}

impl NutrientProfile {
    pub fn fraction(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Calcium => self.calcium,
            Nutrient::Salt => self.salt,
            Nutrient::Methionine => self.methionine,
            Nutrient::Protein => self.protein,
        }
    }

    /// A single-purpose additive made of one nutrient only.
    pub fn pure(nutrient: Nutrient) -> Self {
        let mut profile = Self::default();
        match nutrient {
            Nutrient::Calcium => profile.calcium = 1.0,
            Nutrient::Salt => profile.salt = 1.0,
            Nutrient::Methionine => profile.methionine = 1.0,
            Nutrient::Protein => profile.protein = 1.0,
        }
        profile
    }
}

/// Feasible weight range in kilograms; `max == None` is open above
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightBounds {
    pub min: f64,
    pub max: Option<f64>,
}

impl WeightBounds {
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    pub fn at_least(min: f64) -> Self {
        Self { min, max: None }
    }

    pub fn is_valid(&self) -> bool {
        self.min >= 0.0 && self.min.is_finite() && self.max.map_or(true, |max| max >= self.min)
    }

    pub fn contains(&self, weight: f64) -> bool {
        weight >= self.min && self.max.map_or(true, |max| weight <= max)
    }
}

impl Default for WeightBounds {
    fn default() -> Self {
        Self::at_least(0.0)
    }
}

/// Everything needed to register an ingredient on a session
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientSpec {
    pub name: String,
    pub alt_name: String,
    pub nutrients: NutrientProfile,
    pub bounds: WeightBounds,
    pub dosing: Dosing,
}

impl IngredientSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alt_name: String::new(),
            nutrients: NutrientProfile::default(),
            bounds: WeightBounds::default(),
            dosing: Dosing::Coarse,
        }
    }

    pub fn alt_name(mut self, alt_name: impl Into<String>) -> Self {
        self.alt_name = alt_name.into();
        self
    }

    pub fn nutrients(mut self, nutrients: NutrientProfile) -> Self {
        self.nutrients = nutrients;
        self
    }

    pub fn bounds(mut self, bounds: WeightBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn dosing(mut self, dosing: Dosing) -> Self {
        self.dosing = dosing;
        self
    }

    fn validate(&self) -> FeedResult<()> {
        if !self.bounds.is_valid() {
            return Err(FeedError::InvalidBounds {
                ingredient: self.name.clone(),
                min: self.bounds.min,
                max: self.bounds.max.unwrap_or(f64::INFINITY),
            });
        }
        for nutrient in Nutrient::ALL {
            let value = self.nutrients.fraction(nutrient);
            if !(value >= 0.0 && value.is_finite()) {
                return Err(FeedError::InvalidNutrient {
                    ingredient: self.name.clone(),
                    nutrient: nutrient.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }
}

/// A registered ingredient. Its bounds and coefficients are frozen; the
/// solved weight is read back through the session that owns the variable.
#[derive(Debug, Clone)]
pub struct Ingredient {
    spec: IngredientSpec,
    variable: VariableId,
}

impl Ingredient {
    /// Validate `spec` and declare its decision variable on `session`.
    pub fn register(spec: IngredientSpec, session: &mut SolveSession) -> FeedResult<Self> {
        spec.validate()?;
        let variable = session
            .declare_variable(spec.label(), spec.bounds.min, spec.bounds.max)
            .map_err(|err| match err {
                SessionError::InvalidBounds { lower, upper, .. } => FeedError::InvalidBounds {
                    ingredient: spec.name.clone(),
                    min: lower,
                    max: upper,
                },
                other => FeedError::Session(other),
            })?;
        Ok(Self { spec, variable })
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn alt_name(&self) -> &str {
        &self.spec.alt_name
    }

    pub fn nutrients(&self) -> &NutrientProfile {
        &self.spec.nutrients
    }

    pub fn bounds(&self) -> WeightBounds {
        self.spec.bounds
    }

    pub fn dosing(&self) -> Dosing {
        self.spec.dosing
    }

    pub fn variable(&self) -> VariableId {
        self.variable
    }

    pub fn fraction(&self, nutrient: Nutrient) -> f64 {
        self.spec.nutrients.fraction(nutrient)
    }

    /// `Name (Alt)`, or just the name when there is no alternate name.
    pub fn label(&self) -> String {
        self.spec.label()
    }

    /// Raw solved weight, before the dosing policy is applied.
    pub fn solved_weight(&self, session: &SolveSession) -> FeedResult<f64> {
        session.value(self.variable).map_err(|err| match err {
            SessionError::NotSolved(reason) => FeedError::NotSolved {
                ingredient: self.spec.name.clone(),
                reason,
            },
            other => FeedError::Session(other),
        })
    }

    /// Reported weight: whole kilograms for coarse dosing, exact for fine.
    pub fn weight(&self, session: &SolveSession) -> FeedResult<f64> {
        self.solved_weight(session)
            .map(|solved| self.spec.dosing.apply(solved))
    }

    /// Nutrient mass carried by the reported weight.
    pub fn nutrient_weight(&self, nutrient: Nutrient, session: &SolveSession) -> FeedResult<f64> {
        Ok(self.fraction(nutrient) * self.weight(session)?)
    }
}

impl IngredientSpec {
    fn label(&self) -> String {
        if self.alt_name.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.alt_name)
        }
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [DCP={}]", self.label(), self.spec.nutrients.protein)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConstraintType, OptimizationType};
    use crate::solver::GoodLpSolver;
    use approx::assert_abs_diff_eq;
    use std::sync::Arc;

    fn session() -> SolveSession {
        SolveSession::new(Arc::new(GoodLpSolver::microlp()))
    }

    fn millet() -> IngredientSpec {
        IngredientSpec::new("Pearl Millet")
            .alt_name("Mapfunde")
            .nutrients(NutrientProfile {
                calcium: 0.0005,
                salt: 0.0,
                methionine: 0.0028,
                protein: 0.12,
            })
            .bounds(WeightBounds::between(8.0, 10.0))
    }

    #[test]
    fn display_matches_label_and_protein() {
        let mut s = session();
        let millet = Ingredient::register(millet(), &mut s).unwrap();
        assert_eq!(millet.to_string(), "Pearl Millet (Mapfunde): [DCP=0.12]");

        let grit = Ingredient::register(
            IngredientSpec::new("Limestone Grit").nutrients(NutrientProfile::pure(Nutrient::Calcium)),
            &mut s,
        )
        .unwrap();
        assert_eq!(grit.label(), "Limestone Grit");
    }

    #[test]
    fn inverted_or_negative_bounds_are_rejected() {
        let mut s = session();
        let err = Ingredient::register(millet().bounds(WeightBounds::between(3.0, 2.0)), &mut s)
            .unwrap_err();
        assert!(matches!(err, FeedError::InvalidBounds { .. }));

        let err =
            Ingredient::register(millet().bounds(WeightBounds::at_least(-0.5)), &mut s).unwrap_err();
        assert!(matches!(err, FeedError::InvalidBounds { .. }));
        assert_eq!(s.num_variables(), 0);
    }

    #[test]
    fn negative_nutrients_are_rejected() {
        let mut s = session();
        let spec = millet().nutrients(NutrientProfile {
            salt: -0.1,
            ..NutrientProfile::default()
        });
        assert!(matches!(
            Ingredient::register(spec, &mut s),
            Err(FeedError::InvalidNutrient { .. })
        ));
    }

    #[test]
    fn weight_before_solve_is_not_solved() {
        let mut s = session();
        let millet = Ingredient::register(millet(), &mut s).unwrap();
        assert!(matches!(
            millet.weight(&s),
            Err(FeedError::NotSolved { ref ingredient, .. }) if ingredient == "Pearl Millet"
        ));
    }

    #[test]
    fn dosing_controls_reported_weight() {
        let mut s = session();
        let coarse = Ingredient::register(
            IngredientSpec::new("Maize").bounds(WeightBounds::between(0.0, 10.0)),
            &mut s,
        )
        .unwrap();
        let fine = Ingredient::register(
            IngredientSpec::new("Salt")
                .nutrients(NutrientProfile::pure(Nutrient::Salt))
                .dosing(Dosing::Fine),
            &mut s,
        )
        .unwrap();
        s.seal_variables().unwrap();
        s.add_constraint(
            "maize",
            &[(coarse.variable(), 1.0)],
            ConstraintType::Equal,
            2.6,
        )
        .unwrap();
        s.add_constraint("salt", &[(fine.variable(), 1.0)], ConstraintType::Equal, 0.06)
            .unwrap();
        s.set_objective(OptimizationType::Minimize, &[(coarse.variable(), 1.0)])
            .unwrap();
        s.solve().unwrap();

        assert_abs_diff_eq!(coarse.solved_weight(&s).unwrap(), 2.6, epsilon = 1e-6);
        assert_eq!(coarse.weight(&s).unwrap(), 3.0);
        assert_abs_diff_eq!(fine.weight(&s).unwrap(), 0.06, epsilon = 1e-9);
        assert_abs_diff_eq!(
            fine.nutrient_weight(Nutrient::Salt, &s).unwrap(),
            0.06,
            epsilon = 1e-9
        );
    }
}
