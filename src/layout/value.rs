//! # Scalar Values
//!
//! Every numeric style and layout field uses `NaN` to mean "not set". This
//! keeps "unset" distinct from "set to 0" without paying for an `Option` in
//! the hot loops of the layout algorithm.
//!
//! Raw `==` on these values is always wrong: NaN never equals itself, and
//! sizes that went through many additions drift by tiny amounts. Compare
//! with [`floats_equal`] instead.

/// The "undefined" sentinel.
pub const UNDEFINED: f64 = f64::NAN;

/// Tolerance used by [`floats_equal`].
pub const EPSILON: f64 = 0.00001;

#[inline]
pub fn is_undefined(value: f64) -> bool {
    value.is_nan()
}

#[inline]
pub fn is_defined(value: f64) -> bool {
    !value.is_nan()
}

/// Two values are equal if both are undefined, or if they differ by less
/// than [`EPSILON`].
pub fn floats_equal(a: f64, b: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    (b - a).abs() < EPSILON
}

/// Bridge from an `Option` to the sentinel.
#[inline]
pub fn from_option(value: Option<f64>) -> f64 {
    value.unwrap_or(UNDEFINED)
}

/// Clamp `value` to `[min, max]`. Undefined or negative bounds are ignored,
/// and `min` wins when the bounds conflict.
pub fn bound(value: f64, min: f64, max: f64) -> f64 {
    let mut bounded = value;
    if is_defined(max) && max >= 0.0 && bounded > max {
        bounded = max;
    }
    if is_defined(min) && min >= 0.0 && bounded < min {
        bounded = min;
    }
    bounded
}
