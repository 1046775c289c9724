// Constraint synthesis
// Turns registered ingredients and feed targets into the mass, calcium, salt
// and protein rows plus the least-protein objective. Methionine gets no row.

use super::error::{FeedError, FeedResult};
use super::ingredient::Ingredient;
use super::targets::{FeedTargets, NutrientTarget, Requirement};
use crate::domain::{Nutrient, OptimizationType, SolveSession, VariableId};

/// Row index of each enforced target on the session
#[derive(Debug, Clone, PartialEq)]
pub struct Formulation {
    pub rows: Vec<(Requirement, usize)>,
}

fn coefficient(requirement: Requirement, ingredient: &Ingredient) -> f64 {
    match requirement {
        Requirement::TotalMass => 1.0,
        Requirement::Nutrient(nutrient) => ingredient.fraction(nutrient),
    }
}

fn terms(requirement: Requirement, ingredients: &[Ingredient]) -> Vec<(VariableId, f64)> {
    ingredients
        .iter()
        .map(|ingredient| (ingredient.variable(), coefficient(requirement, ingredient)))
        .collect()
}

fn add_target(
    session: &mut SolveSession,
    ingredients: &[Ingredient],
    target: &NutrientTarget,
    total_feed_weight: f64,
) -> FeedResult<usize> {
    let row = session.add_constraint(
        target.requirement.name(),
        &terms(target.requirement, ingredients),
        target.comparison.into(),
        target.rhs(total_feed_weight),
    )?;
    Ok(row)
}

/// Seal the session's variables, add the four target rows and the
/// least-protein objective. A session can only be synthesized once.
pub fn synthesize(
    session: &mut SolveSession,
    ingredients: &[Ingredient],
    targets: &FeedTargets,
) -> FeedResult<Formulation> {
    if ingredients.is_empty() {
        return Err(FeedError::EmptyRation);
    }
    targets.validate()?;

    session.seal_variables()?;

    let rows = targets
        .enforced()
        .iter()
        .map(|target| {
            add_target(session, ingredients, target, targets.total_feed_weight)
                .map(|row| (target.requirement, row))
        })
        .collect::<FeedResult<Vec<_>>>()?;

    session.set_objective(
        OptimizationType::Minimize,
        &terms(Requirement::Nutrient(Nutrient::Protein), ingredients),
    )?;

    tracing::debug!(
        component = "formulation",
        ingredients = ingredients.len(),
        rows = rows.len(),
        total_feed_weight = targets.total_feed_weight,
        "Synthesized feed formulation"
    );
    Ok(Formulation { rows })
}
