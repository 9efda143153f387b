//! Deterministic game core
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Every function takes `now_ms` explicitly; no hidden clocks
//! - Angles are always derived from absolute time, never integrated
//! - No rendering or platform dependencies

pub mod controller;
pub mod oscillator;
pub mod scoring;

pub use controller::{
    Controller, Mode, Phase, Player, Snapshot, StopTrigger, SwingConfig, Winner,
};
pub use oscillator::{Oscillator, angle_at};
pub use scoring::score;
