//! Game settings and tunables
//!
//! Persisted separately from any game state in LocalStorage. The game
//! session itself is never persisted; a reload always starts fresh.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_ADVANCE_DELAY_MS, DEFAULT_PERIOD_MS};
use crate::sim::SwingConfig;

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Full swing period of the needle, ms
    pub period_ms: f64,
    /// Delay before Player 2's swing starts in two-player mode, ms
    pub advance_delay_ms: f64,
    /// Show FPS counter
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            period_ms: DEFAULT_PERIOD_MS,
            advance_delay_ms: DEFAULT_ADVANCE_DELAY_MS,
            show_fps: true,
        }
    }
}

impl Settings {
    /// Clamp tunables into sane ranges (guards hand-edited storage)
    pub fn sanitize(&mut self) {
        self.period_ms = self.period_ms.clamp(200.0, 60_000.0);
        self.advance_delay_ms = self.advance_delay_ms.clamp(0.0, 10_000.0);
    }

    /// Adapter for the sim core
    pub fn swing_config(&self) -> SwingConfig {
        SwingConfig {
            period_ms: self.period_ms,
            advance_delay_ms: self.advance_delay_ms,
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "arc_stop_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(mut settings) = serde_json::from_str::<Settings>(&json) {
                    settings.sanitize();
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_clamps_out_of_range_values() {
        let mut s = Settings {
            period_ms: 1.0,
            advance_delay_ms: 500_000.0,
            show_fps: false,
        };
        s.sanitize();
        assert_eq!(s.period_ms, 200.0);
        assert_eq!(s.advance_delay_ms, 10_000.0);
    }

    #[test]
    fn swing_config_passes_tunables_through() {
        let s = Settings::default();
        let cfg = s.swing_config();
        assert_eq!(cfg.period_ms, DEFAULT_PERIOD_MS);
        assert_eq!(cfg.advance_delay_ms, DEFAULT_ADVANCE_DELAY_MS);
    }
}
