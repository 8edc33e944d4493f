//! Tunables for a run.  Every field has a default, so a TOML file only needs
//! to name what it overrides.

use std::{fs, path::Path, time::Duration};

use serde::Deserialize;

use crate::entities::Viewport;
use crate::error::GameError;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    /// Milliseconds between obstacle rows.
    pub spawn_interval_ms: u64,
    /// Downward acceleration in viewport heights per second².
    pub gravity_ratio: f32,
    /// Flap speed in viewport heights per second (applied upward).
    pub flap_ratio: f32,
    /// Obstacles cross the viewport in this many seconds.
    pub scroll_divisor: f32,
    /// How many of its own widths an obstacle travels past the left edge
    /// before it is culled.
    pub offscreen_factor: f32,
    pub pipe_pool_capacity: usize,
    pub zone_pool_capacity: usize,
    /// Player hitbox as a fraction of one slot.
    pub player_width_ratio: f32,
    pub player_height_ratio: f32,
    /// Target frame pacing of the terminal front end.
    pub frame_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            spawn_interval_ms: 2000,
            gravity_ratio: 1.5,
            flap_ratio: 0.6,
            scroll_divisor: 5.0,
            offscreen_factor: 2.0,
            pipe_pool_capacity: 25,
            zone_pool_capacity: 25,
            player_width_ratio: 0.6,
            player_height_ratio: 0.8,
            frame_ms: 33,
        }
    }
}

impl GameConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, GameError> {
        let cfg: GameConfig = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        let mut problems = Vec::new();
        if self.spawn_interval_ms == 0 {
            problems.push("spawn_interval_ms must be > 0".to_string());
        }
        if self.frame_ms == 0 {
            problems.push("frame_ms must be > 0".to_string());
        }
        for (name, value) in [
            ("gravity_ratio", self.gravity_ratio),
            ("flap_ratio", self.flap_ratio),
            ("scroll_divisor", self.scroll_divisor),
            ("offscreen_factor", self.offscreen_factor),
            ("player_width_ratio", self.player_width_ratio),
            ("player_height_ratio", self.player_height_ratio),
        ] {
            if !(value.is_finite() && value > 0.0) {
                problems.push(format!("{name} must be a positive number (got {value})"));
            }
        }
        if self.pipe_pool_capacity == 0 {
            problems.push("pipe_pool_capacity must be > 0".to_string());
        }
        if self.zone_pool_capacity == 0 {
            problems.push("zone_pool_capacity must be > 0".to_string());
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(GameError::InvalidConfig(problems.join("; ")))
        }
    }

    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }

    /// World units per second², positive is down.
    pub fn gravity(&self, viewport: &Viewport) -> f32 {
        viewport.height * self.gravity_ratio
    }

    /// Vertical velocity set by a flap (negative, i.e. upward).
    pub fn flap_velocity(&self, viewport: &Viewport) -> f32 {
        -viewport.height * self.flap_ratio
    }

    /// Horizontal velocity shared by every obstacle of a row.
    pub fn scroll_velocity(&self, viewport: &Viewport) -> f32 {
        -viewport.width / self.scroll_divisor
    }
}
