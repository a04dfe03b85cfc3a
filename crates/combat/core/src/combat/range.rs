//! Distance-based damage multipliers.

use crate::state::round_to;
use crate::stats::RangeProfile;

/// Decimal places the interpolated multiplier is rounded to.
pub const RANGE_PRECISION: i32 = 6;

/// Damage multiplier for an attack made from `distance` away.
///
/// At or inside the minimum range the min multiplier applies exactly; at or
/// beyond the maximum range the max multiplier applies exactly. In between
/// the multiplier is interpolated by `distance / max_range_allowed`.
pub fn range_multiplier(range: &RangeProfile, distance: f64) -> f64 {
    if distance <= range.min_range_required {
        return range.min_range_multiplier;
    }
    if distance >= range.max_range_allowed || range.max_range_allowed <= 0.0 {
        return range.max_range_multiplier;
    }
    let t = distance / range.max_range_allowed;
    let multiplier =
        range.min_range_multiplier + (range.max_range_multiplier - range.min_range_multiplier) * t;
    round_to(multiplier, RANGE_PRECISION)
}

/// Scales every slot by `multiplier`.
pub fn apply_range(amounts: &[f64], multiplier: f64) -> Vec<f64> {
    amounts.iter().map(|amount| amount * multiplier).collect()
}
