//! Guarded arithmetic shared by every numeric component.
//!
//! RULE: any division whose denominator comes from user data
//! (impressions, totals, volumes, investment) goes through safe_divide().
//! Division by a literal positive constant may use `/` directly.

/// Divide `numerator` by `denominator`, returning `fallback` when the
/// denominator is zero, NaN or infinite, or when the quotient itself is
/// not finite (e.g. a NaN or infinite numerator).
pub fn safe_divide(numerator: f64, denominator: f64, fallback: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        return fallback;
    }
    let result = numerator / denominator;
    if result.is_finite() {
        result
    } else {
        fallback
    }
}

/// Round half away from zero to `decimals` places. Non-finite input yields 0.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let scale = 10f64.powi(decimals as i32);
    let rounded = (value * scale).round() / scale;
    if rounded.is_finite() { rounded } else { 0.0 }
}

/// Replace NaN/Infinite with 0.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
