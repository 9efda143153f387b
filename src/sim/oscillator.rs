//! Needle oscillator
//!
//! Maps wall-clock time to the needle angle: `90 + 90·sin(2π·elapsed/period)`
//! sweeps [0, 180] with pendulum-like easing and smooth reversal at the
//! endpoints, centered at 90° when a swing begins.

use std::f64::consts::TAU;

use crate::consts::PERFECT_ANGLE_DEG;

/// Angle of the needle at `now_ms` for a swing started at `start_ms`.
///
/// Always derived from absolute time so repeated per-frame calls cannot
/// accumulate drift. `rem_euclid` keeps the elapsed phase non-negative even
/// when `now_ms` precedes `start_ms`. A non-positive period degrades to the
/// resting center angle instead of dividing by zero.
pub fn angle_at(now_ms: f64, start_ms: f64, period_ms: f64) -> f32 {
    if period_ms <= 0.0 {
        return PERFECT_ANGLE_DEG;
    }
    let elapsed = (now_ms - start_ms).rem_euclid(period_ms);
    let t = elapsed / period_ms * TAU;
    (90.0 + 90.0 * t.sin()) as f32
}

/// One active swing: start time plus period, immutable once created.
///
/// Created when a swing starts, discarded on stop or reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oscillator {
    pub start_ms: f64,
    pub period_ms: f64,
}

impl Oscillator {
    pub fn new(start_ms: f64, period_ms: f64) -> Self {
        Self {
            start_ms,
            period_ms,
        }
    }

    /// Current needle angle in degrees.
    pub fn angle_at(&self, now_ms: f64) -> f32 {
        angle_at(now_ms, self.start_ms, self.period_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn centered_at_start_and_half_period() {
        assert!((angle_at(0.0, 0.0, 1800.0) - 90.0).abs() < 1e-3);
        assert!((angle_at(900.0, 0.0, 1800.0) - 90.0).abs() < 1e-3);
    }

    #[test]
    fn extremes_at_quarter_periods() {
        assert!((angle_at(450.0, 0.0, 1800.0) - 180.0).abs() < 1e-3);
        assert!((angle_at(1350.0, 0.0, 1800.0) - 0.0).abs() < 1e-3);
    }

    #[test]
    fn now_before_start_stays_in_range() {
        let a = angle_at(-431.0, 0.0, 1800.0);
        assert!((0.0..=180.0).contains(&a));
    }

    #[test]
    fn zero_period_rests_at_center() {
        assert_eq!(angle_at(1234.0, 0.0, 0.0), 90.0);
    }

    proptest! {
        #[test]
        fn angle_always_in_arc(
            now in -1e9f64..1e9,
            start in -1e6f64..1e6,
            period in 1.0f64..60_000.0,
        ) {
            let a = angle_at(now, start, period);
            prop_assert!((0.0..=180.0).contains(&a));
        }

        #[test]
        fn periodic(now in -1e6f64..1e6, period in 1.0f64..60_000.0) {
            let a = angle_at(now, 0.0, period);
            let b = angle_at(now + period, 0.0, period);
            prop_assert!((a - b).abs() < 1e-3);
        }
    }
}
