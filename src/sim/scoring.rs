//! Stop scoring
//!
//! Distance from the 90° center maps linearly onto [0, 100].

use crate::consts::{ARC_MAX_DEG, ARC_MIN_DEG, MAX_SCORE, PERFECT_ANGLE_DEG};

/// Score a stopped needle angle.
///
/// 100 only at exactly 90°, 0 at either end of the arc, linear in between.
/// Total over all input: angles outside the arc (unreachable from the
/// oscillator) clamp to the nearest end before scoring.
pub fn score(angle_deg: f32) -> u32 {
    let angle = angle_deg.clamp(ARC_MIN_DEG, ARC_MAX_DEG);
    let diff = (angle - PERFECT_ANGLE_DEG).abs();
    let raw = (100.0 - diff / 90.0 * 100.0).round();
    (raw.max(0.0) as u32).min(MAX_SCORE)
}
