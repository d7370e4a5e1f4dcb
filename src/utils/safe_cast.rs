//! Checked numeric conversions for values derived from landmark coordinates

use crate::{Error, Result};

/// Safely convert f64 to i32, truncating toward zero
///
/// # Errors
///
/// Returns an error if the value is not finite or outside i32 range
#[allow(clippy::cast_possible_truncation)] // Truncation after bounds check is safe
pub fn f64_to_i32(value: f64) -> Result<i32> {
    if value.is_finite() && value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX) {
        Ok(value as i32)
    } else {
        Err(Error::InvalidInput(format!(
            "Value {value} cannot be safely converted to i32"
        )))
    }
}

/// Safely convert f64 to i64, truncating toward zero
///
/// # Errors
///
/// Returns an error if the value is not finite or outside the range an f64 represents exactly
#[allow(clippy::cast_possible_truncation)] // Truncation after bounds check is safe
#[allow(clippy::cast_precision_loss)] // Bounds are the f64-exact integer range
pub fn f64_to_i64(value: f64) -> Result<i64> {
    const LIMIT: f64 = (1_i64 << 53) as f64;
    if value.is_finite() && value.abs() <= LIMIT {
        Ok(value as i64)
    } else {
        Err(Error::InvalidInput(format!(
            "Value {value} cannot be safely converted to i64"
        )))
    }
}

/// Convert a count to f64 for use as a feature channel
#[must_use]
#[allow(clippy::cast_precision_loss)] // Face and point counts are far below 2^53
pub fn count_to_f64(count: usize) -> f64 {
    count as f64
}
