//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Clamp a value into `[min, max]`, returning `min` for NaN.
#[must_use]
pub fn clamp_finite(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.clamp(min, max.max(min))
}

/// Floor a f64 into a `usize` index, returning 0 for negative or NaN values.
#[must_use]
pub fn floor_f64_to_usize(value: f64) -> usize {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    if value.is_infinite() {
        return usize::MAX;
    }
    cast::<f64, usize>(value.floor()).unwrap_or(usize::MAX)
}

/// Convert `usize` to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Half of a reward rounded down, never negative.
#[must_use]
pub fn half_floor(value: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 0.0;
    }
    (value / 2.0).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_handles_nan_and_inverted_bounds() {
        assert!((clamp_finite(f64::NAN, 0.0, 10.0) - 0.0).abs() < f64::EPSILON);
        assert!((clamp_finite(12.0, 0.0, 10.0) - 10.0).abs() < f64::EPSILON);
        assert!((clamp_finite(-3.0, 0.0, 10.0) - 0.0).abs() < f64::EPSILON);
        assert!((clamp_finite(5.0, 0.0, -1.0) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn floor_to_usize_covers_edges() {
        assert_eq!(floor_f64_to_usize(1.9), 1);
        assert_eq!(floor_f64_to_usize(-0.5), 0);
        assert_eq!(floor_f64_to_usize(f64::NAN), 0);
        assert_eq!(floor_f64_to_usize(f64::INFINITY), usize::MAX);
    }

    #[test]
    fn half_floor_rounds_down() {
        assert!((half_floor(5.0) - 2.0).abs() < f64::EPSILON);
        assert!((half_floor(10.0) - 5.0).abs() < f64::EPSILON);
        assert!((half_floor(-4.0) - 0.0).abs() < f64::EPSILON);
    }
}
