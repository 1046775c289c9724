// The layer-hen ration: ingredient coefficients and mass rules.
//
// Nutrient fractions are per kilogram of ingredient. Pearl millet is the base
// grain at 40–50% of the batch; four fillers share half of the batch; grit and
// salt are pure additives governed only by the nutrient rows.

use super::bound_policy::{mass_share, FlexiblePool};
use super::error::FeedResult;
use super::ingredient::{IngredientSpec, NutrientProfile, WeightBounds};
use super::targets::FeedTargets;
use crate::domain::{Dosing, Nutrient};

pub const FILLER_COUNT: usize = 4;
pub const FILLER_FRACTION: f64 = 0.5;
pub const BASE_MIN_FRACTION: f64 = 0.4;
pub const BASE_MAX_FRACTION: f64 = 0.5;

fn percent(calcium: f64, methionine: f64, protein: f64) -> NutrientProfile {
    NutrientProfile {
        calcium: calcium / 100.0,
        salt: 0.0,
        methionine: methionine / 100.0,
        protein: protein / 100.0,
    }
}

pub fn limestone_grit() -> IngredientSpec {
    IngredientSpec::new("Limestone Grit (Calcium)")
        .nutrients(NutrientProfile::pure(Nutrient::Calcium))
        .bounds(WeightBounds::at_least(0.0))
}

pub fn salt() -> IngredientSpec {
    IngredientSpec::new("Salt")
        .alt_name("Munyu")
        .nutrients(NutrientProfile::pure(Nutrient::Salt))
        .bounds(WeightBounds::at_least(0.0))
        .dosing(Dosing::Fine)
}

pub fn pearl_millet(bounds: WeightBounds) -> IngredientSpec {
    IngredientSpec::new("Pearl Millet")
        .alt_name("Mapfunde")
        .nutrients(percent(0.05, 0.28, 12.0))
        .bounds(bounds)
}

/// Fillers in catalog order, each bounded by `bounds`.
pub fn fillers(bounds: WeightBounds) -> Vec<IngredientSpec> {
    vec![
        IngredientSpec::new("Maize")
            .alt_name("Chibage")
            .nutrients(percent(0.04, 0.0, 7.5)),
        IngredientSpec::new("Soybean")
            .alt_name("Soya")
            .nutrients(percent(0.25, 0.6, 44.0)),
        IngredientSpec::new("Sorghum")
            .alt_name("Mhunga")
            .nutrients(percent(0.04, 0.09, 11.0)),
        IngredientSpec::new("Sunflower Seeds")
            .alt_name("Ruva re Zuva")
            .nutrients(percent(0.3, 0.6, 34.0)),
    ]
    .into_iter()
    .map(|spec| spec.bounds(bounds))
    .collect()
}

/// Full ration for `targets.total_feed_weight`: additives, base grain, then
/// the filler pool.
pub fn layer_ration(targets: &FeedTargets) -> FeedResult<Vec<IngredientSpec>> {
    targets.validate()?;
    let total = targets.total_feed_weight;
    let pool = FlexiblePool::new(FILLER_COUNT, FILLER_FRACTION)?;
    let base = mass_share(total, BASE_MIN_FRACTION, BASE_MAX_FRACTION)?;

    let mut ration = vec![limestone_grit(), salt(), pearl_millet(base)];
    ration.extend(fillers(pool.bounds(total)));
    Ok(ration)
}
