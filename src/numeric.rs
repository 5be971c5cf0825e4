//! Numeric tolerances and guarded arithmetic.

use ndarray::ArrayViewMut1;

/// Threshold below which a value is treated as zero.
///
/// Every division in the consumption and scoring code is guarded against it.
pub const VERY_SMALL: f64 = 1e-20;

#[inline]
pub fn is_zero(value: f64) -> bool {
    value.abs() < VERY_SMALL
}

/// Scale `row` to sum to one. A row with a zero sum is left untouched.
///
/// Returns the original sum.
pub fn normalize_row(mut row: ArrayViewMut1<'_, f64>) -> f64 {
    let sum = row.sum();
    if !is_zero(sum) {
        let inv = 1.0 / sum;
        row.mapv_inplace(|v| v * inv);
    }
    sum
}
