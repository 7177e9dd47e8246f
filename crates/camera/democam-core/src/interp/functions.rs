//! Interpolation helpers:
//! - smoothstep (cubic Hermite ease, 0 and 1 fixed points)
//! - progress_ratio (timer / duration with zero-duration guard)
//! - lerp_f64 (scalar blend)

/// Cubic smoothstep `t² (3 − 2t)`. Defined on [0,1]; callers clamp.
#[inline]
pub fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

/// `timer / duration` clamped to [0,1]. A zero duration yields 0.
#[inline]
pub fn progress_ratio(timer: u32, duration: u32) -> f64 {
    if duration == 0 {
        return 0.0;
    }
    (timer as f64 / duration as f64).clamp(0.0, 1.0)
}

/// Smoothstep applied to a clamped transition progress.
#[inline]
pub fn eased_progress(timer: u32, duration: u32) -> f64 {
    smoothstep(progress_ratio(timer, duration))
}

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f64(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothstep_fixed_points() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(0.5), 0.5);
    }

    #[test]
    fn smoothstep_is_monotonic_on_unit_interval() {
        let mut prev = smoothstep(0.0);
        for i in 1..=1000 {
            let v = smoothstep(i as f64 / 1000.0);
            assert!(v >= prev, "smoothstep decreased at step {i}");
            prev = v;
        }
    }

    #[test]
    fn zero_duration_never_divides() {
        assert_eq!(progress_ratio(5, 0), 0.0);
        assert_eq!(eased_progress(0, 0), 0.0);
    }

    #[test]
    fn ratio_is_clamped() {
        assert_eq!(progress_ratio(20, 10), 1.0);
    }
}
