//! Scalar helpers for angles and interpolation

/// Wrap an angle in degrees into [-180, 180]
///
/// Values already inside the interval are returned unchanged, so both
/// endpoints are preserved: `180` stays `180`, `-180` stays `-180`.
///
/// ```text
/// normalize_angle_deg(350 - 10) = -20
/// normalize_angle_deg(-190)     = 170
/// ```
pub fn normalize_angle_deg(angle: f64) -> f64 {
    let mut a = angle % 360.0;
    if a > 180.0 {
        a -= 360.0;
    }
    if a < -180.0 {
        a += 360.0;
    }
    a
}

/// Clamp to [0, 1]
pub fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Linear interpolation with the fraction clamped to [0, 1]
///
/// `a` need not be smaller than `b`; the result moves monotonically from
/// `a` to `b` either way.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * clamp01(t)
}

/// Fraction of `value` along [a, b], clamped to [0, 1]
///
/// Returns 0 for a degenerate interval.
pub fn inverse_lerp(a: f64, b: f64, value: f64) -> f64 {
    if (b - a).abs() < f64::EPSILON {
        return 0.0;
    }
    clamp01((value - a) / (b - a))
}
