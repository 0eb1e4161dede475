/// Capacity, utilization, and assignment scoring
///
/// Capacity is fixed at 40 hours per week, prorated by calendar days for
/// arbitrary periods. Over-allocation starts strictly above 110% of
/// capacity; it is flagged, never blocked.
use chrono::NaiveDate;

/// Nominal weekly capacity in hours
pub const WEEKLY_CAPACITY_HOURS: f64 = 40.0;

/// Utilization above which a user counts as over-allocated
pub const OVER_ALLOCATION_THRESHOLD: f64 = 1.1;

/// Hours allocated per day when an allocation does not specify any
pub const DEFAULT_DAILY_HOURS: f64 = 8.0;

/// Inclusive day count of a date span; zero when the span is inverted
pub fn span_days(start: NaiveDate, end: NaiveDate) -> i64 {
    ((end - start).num_days() + 1).max(0)
}

/// Prorated capacity for a number of calendar days
pub fn capacity_for_days(days: i64) -> f64 {
    days as f64 / 7.0 * WEEKLY_CAPACITY_HOURS
}

/// Allocated hours over capacity; zero when capacity is zero
pub fn utilization(allocated_hours: f64, capacity_hours: f64) -> f64 {
    if capacity_hours > 0.0 {
        allocated_hours / capacity_hours
    } else {
        0.0
    }
}

/// True strictly above 110% utilization
pub fn is_over_allocated(utilization: f64) -> bool {
    utilization > OVER_ALLOCATION_THRESHOLD
}

/// Availability component of the recommendation score
pub fn availability(utilization: f64) -> f64 {
    1.0 - utilization
}

/// Balance component: full marks below 80% utilization, linear decay to
/// zero at 120%
pub fn balance_score(utilization: f64) -> f64 {
    if utilization < 0.8 {
        1.0
    } else {
        (1.0 - (utilization - 0.8) / 0.4).max(0.0)
    }
}

/// Assignment recommendation score
///
/// 0.6 × availability + 0.4 × balance; higher is a better candidate.
pub fn recommendation_score(utilization: f64) -> f64 {
    0.6 * availability(utilization) + 0.4 * balance_score(utilization)
}
