//! Arc Stop - a stop-the-needle timing game
//!
//! Core modules:
//! - `sim`: Deterministic game core (oscillator, scoring, turn state machine)
//! - `settings`: Tunables, persisted to LocalStorage on web
//!
//! Rendering and DOM wiring live in the binary; the library never touches a
//! clock or the platform. Every sim function takes `now_ms` explicitly.

pub mod settings;
pub mod sim;

pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Lowest angle the needle can reach (degrees)
    pub const ARC_MIN_DEG: f32 = 0.0;
    /// Highest angle the needle can reach (degrees)
    pub const ARC_MAX_DEG: f32 = 180.0;
    /// The scoring target: dead center of the arc
    pub const PERFECT_ANGLE_DEG: f32 = 90.0;
    /// Maximum score, awarded only at the perfect angle
    pub const MAX_SCORE: u32 = 100;
    /// Default full swing period (one back-and-forth), milliseconds
    pub const DEFAULT_PERIOD_MS: f64 = 1800.0;
    /// Default handover delay before Player 2's swing, milliseconds
    pub const DEFAULT_ADVANCE_DELAY_MS: f64 = 1000.0;
}

/// Map a needle angle in degrees to a screen-space angle in radians.
///
/// 0° points left along the baseline, 90° straight up, 180° right. Canvas Y
/// grows downward, so the needle sweeps the upper half-plane.
#[inline]
pub fn needle_screen_rad(angle_deg: f32) -> f32 {
    angle_deg.to_radians() - std::f32::consts::PI
}

/// Needle tip position relative to the pivot for a needle of `length`.
#[inline]
pub fn needle_tip(angle_deg: f32, length: f32) -> Vec2 {
    let a = needle_screen_rad(angle_deg);
    Vec2::new(length * a.cos(), length * a.sin())
}
