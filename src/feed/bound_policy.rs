// Weight ranges derived from coarse allocation rules.

use super::error::{FeedError, FeedResult};
use super::ingredient::WeightBounds;

/// A pool of interchangeable filler ingredients sharing a fixed part of the
/// batch. Each member may move ±50% around an even split of that part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlexiblePool {
    pub other_count: usize,
    pub available_fraction: f64,
}

impl FlexiblePool {
    const LOWER_FACTOR: f64 = 0.5;
    const UPPER_FACTOR: f64 = 1.5;

    pub fn new(other_count: usize, available_fraction: f64) -> FeedResult<Self> {
        if other_count == 0 {
            return Err(FeedError::InvalidPool(
                "pool needs at least one ingredient".into(),
            ));
        }
        if !(0.0..=1.0).contains(&available_fraction) {
            return Err(FeedError::InvalidPool(format!(
                "available fraction {} is outside [0, 1]",
                available_fraction
            )));
        }
        Ok(Self {
            other_count,
            available_fraction,
        })
    }

    /// Even share of the pool's mass per member.
    pub fn average(&self, total_feed_weight: f64) -> f64 {
        self.available_fraction * total_feed_weight / self.other_count as f64
    }

    pub fn bounds(&self, total_feed_weight: f64) -> WeightBounds {
        let average = self.average(total_feed_weight);
        WeightBounds::between(Self::LOWER_FACTOR * average, Self::UPPER_FACTOR * average)
    }
}

/// Bounds covering `[min_fraction, max_fraction]` of the batch, used for the
/// base grain.
pub fn mass_share(
    total_feed_weight: f64,
    min_fraction: f64,
    max_fraction: f64,
) -> FeedResult<WeightBounds> {
    if !(0.0..=1.0).contains(&min_fraction)
        || !(0.0..=1.0).contains(&max_fraction)
        || min_fraction > max_fraction
    {
        return Err(FeedError::InvalidTarget(format!(
            "mass share [{}, {}] is not a sub-range of [0, 1]",
            min_fraction, max_fraction
        )));
    }
    Ok(WeightBounds::between(
        min_fraction * total_feed_weight,
        max_fraction * total_feed_weight,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn four_fillers_share_half_of_twenty_kilograms() {
        let pool = FlexiblePool::new(4, 0.5).unwrap();
        assert_abs_diff_eq!(pool.average(20.0), 2.5);

        let bounds = pool.bounds(20.0);
        assert_abs_diff_eq!(bounds.min, 1.25);
        assert_abs_diff_eq!(bounds.max.unwrap(), 3.75);
        assert!(bounds.contains(2.5));
        assert!(!bounds.contains(4.0));
    }

    #[test]
    fn degenerate_pools_are_rejected() {
        assert!(matches!(
            FlexiblePool::new(0, 0.5),
            Err(FeedError::InvalidPool(_))
        ));
        assert!(matches!(
            FlexiblePool::new(2, 1.5),
            Err(FeedError::InvalidPool(_))
        ));
    }

    #[test]
    fn base_share_is_forty_to_fifty_percent() {
        let bounds = mass_share(20.0, 0.4, 0.5).unwrap();
        assert_eq!(bounds, WeightBounds::between(8.0, 10.0));
        assert!(mass_share(20.0, 0.6, 0.5).is_err());
    }
}
