/// Hour distribution strategies
///
/// Splits a task's total estimated hours across its day span. All
/// strategies guarantee the per-day hours sum back to the total: the
/// tapered strategies round each day to two decimals and then spread the
/// rounding remainder evenly across every day.
use serde::{Deserialize, Serialize};

/// Strategy for splitting estimated hours across a day span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionStrategy {
    /// Equal hours every day
    Even,

    /// Linear taper favoring early days
    FrontLoaded,

    /// Linear taper favoring late days
    BackLoaded,

    /// Caller-supplied per-day hours; falls back to Even when the supplied
    /// array does not match the span length
    Custom,
}

impl DistributionStrategy {
    /// Converts strategy to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            DistributionStrategy::Even => "even",
            DistributionStrategy::FrontLoaded => "front_loaded",
            DistributionStrategy::BackLoaded => "back_loaded",
            DistributionStrategy::Custom => "custom",
        }
    }
}

fn round2(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}

/// Linear-taper weights: day 0 gets weight `days`, the last day weight 1
/// (front-loaded), or the reverse (back-loaded).
fn tapered(total_hours: f64, days: usize, front: bool) -> Vec<f64> {
    let weight_sum = (days * (days + 1) / 2) as f64;

    let mut hours: Vec<f64> = (0..days)
        .map(|i| {
            let weight = if front { days - i } else { i + 1 } as f64;
            round2(total_hours * weight / weight_sum)
        })
        .collect();

    // Redistribute the rounding remainder evenly so the sum is exact.
    let remainder = total_hours - hours.iter().sum::<f64>();
    if remainder != 0.0 {
        let adjustment = remainder / days as f64;
        for h in &mut hours {
            *h += adjustment;
        }
    }

    hours
}

/// Splits `total_hours` across `days` according to the strategy
///
/// Returns one entry per day; an empty vector for a zero-day span.
pub fn distribute_hours(
    total_hours: f64,
    days: usize,
    strategy: DistributionStrategy,
    custom: Option<&[f64]>,
) -> Vec<f64> {
    if days == 0 {
        return Vec::new();
    }

    match strategy {
        DistributionStrategy::Even => vec![total_hours / days as f64; days],
        DistributionStrategy::FrontLoaded => tapered(total_hours, days, true),
        DistributionStrategy::BackLoaded => tapered(total_hours, days, false),
        DistributionStrategy::Custom => match custom {
            Some(per_day) if per_day.len() == days => per_day.to_vec(),
            _ => vec![total_hours / days as f64; days],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_sums_to(hours: &[f64], total: f64) {
        let sum: f64 = hours.iter().sum();
        assert!(
            (sum - total).abs() < EPSILON,
            "expected sum {} but got {}",
            total,
            sum
        );
    }

    #[test]
    fn test_even_distribution() {
        let hours = distribute_hours(40.0, 5, DistributionStrategy::Even, None);
        assert_eq!(hours, vec![8.0; 5]);
        assert_sums_to(&hours, 40.0);
    }

    #[test]
    fn test_even_distribution_uneven_total() {
        let hours = distribute_hours(10.0, 3, DistributionStrategy::Even, None);
        assert_eq!(hours.len(), 3);
        assert_sums_to(&hours, 10.0);
    }

    #[test]
    fn test_front_loaded_tapers_down() {
        let hours = distribute_hours(30.0, 4, DistributionStrategy::FrontLoaded, None);
        assert_eq!(hours.len(), 4);
        assert_sums_to(&hours, 30.0);
        for pair in hours.windows(2) {
            assert!(pair[0] > pair[1], "front-loaded should decrease: {:?}", hours);
        }
    }

    #[test]
    fn test_back_loaded_tapers_up() {
        let hours = distribute_hours(30.0, 4, DistributionStrategy::BackLoaded, None);
        assert_eq!(hours.len(), 4);
        assert_sums_to(&hours, 30.0);
        for pair in hours.windows(2) {
            assert!(pair[0] < pair[1], "back-loaded should increase: {:?}", hours);
        }
    }

    #[test]
    fn test_tapered_sums_exact_despite_rounding() {
        // 7 days of 13.37h produces awkward per-day rounding.
        for strategy in [DistributionStrategy::FrontLoaded, DistributionStrategy::BackLoaded] {
            let hours = distribute_hours(13.37, 7, strategy, None);
            assert_sums_to(&hours, 13.37);
        }
    }

    #[test]
    fn test_custom_distribution_used_when_lengths_match() {
        let custom = [1.0, 2.0, 3.0];
        let hours = distribute_hours(6.0, 3, DistributionStrategy::Custom, Some(&custom));
        assert_eq!(hours, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_custom_distribution_falls_back_to_even_on_mismatch() {
        let custom = [1.0, 2.0];
        let hours = distribute_hours(6.0, 3, DistributionStrategy::Custom, Some(&custom));
        assert_eq!(hours, vec![2.0; 3]);
    }

    #[test]
    fn test_custom_distribution_falls_back_to_even_when_absent() {
        let hours = distribute_hours(6.0, 3, DistributionStrategy::Custom, None);
        assert_eq!(hours, vec![2.0; 3]);
    }

    #[test]
    fn test_single_day_gets_everything() {
        for strategy in [
            DistributionStrategy::Even,
            DistributionStrategy::FrontLoaded,
            DistributionStrategy::BackLoaded,
        ] {
            let hours = distribute_hours(12.5, 1, strategy, None);
            assert_eq!(hours.len(), 1);
            assert_sums_to(&hours, 12.5);
        }
    }

    #[test]
    fn test_zero_days_yields_empty() {
        let hours = distribute_hours(40.0, 0, DistributionStrategy::Even, None);
        assert!(hours.is_empty());
    }

    #[test]
    fn test_strategy_as_str() {
        assert_eq!(DistributionStrategy::Even.as_str(), "even");
        assert_eq!(DistributionStrategy::FrontLoaded.as_str(), "front_loaded");
        assert_eq!(DistributionStrategy::BackLoaded.as_str(), "back_loaded");
        assert_eq!(DistributionStrategy::Custom.as_str(), "custom");
    }
}
