//! Game balance configuration and scoring table
//!
//! Loaded once at startup (JSON) and read-only afterwards. Missing fields
//! fall back to the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::Bounds;
use crate::sim::{Asteroid, EntityKind, Saucer};

/// Configuration loading/validation failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Points awarded per destroyed entity, indexed by `level - MIN_LEVEL`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringTable {
    pub asteroid: Vec<u64>,
    pub saucer: Vec<u64>,
}

impl Default for ScoringTable {
    fn default() -> Self {
        Self {
            asteroid: vec![20, 50, 100],
            saucer: vec![200, 1000],
        }
    }
}

impl ScoringTable {
    /// Reward for destroying an entity of `kind` at `level` (None for unscored kinds)
    pub fn points(&self, kind: EntityKind, level: u8) -> Option<u64> {
        let (table, min_level) = match kind {
            EntityKind::Asteroid => (&self.asteroid, Asteroid::MIN_LEVEL),
            EntityKind::Saucer => (&self.saucer, Saucer::MIN_LEVEL),
            _ => return None,
        };
        let index = level.checked_sub(min_level)?;
        table.get(index as usize).copied()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let asteroid_levels = (Asteroid::MAX_LEVEL - Asteroid::MIN_LEVEL + 1) as usize;
        if self.asteroid.len() != asteroid_levels {
            return Err(ConfigError::Invalid {
                field: "scoring.asteroid",
                reason: format!("expected {} entries, got {}", asteroid_levels, self.asteroid.len()),
            });
        }
        let saucer_levels = (Saucer::MAX_LEVEL - Saucer::MIN_LEVEL + 1) as usize;
        if self.saucer.len() != saucer_levels {
            return Err(ConfigError::Invalid {
                field: "scoring.saucer",
                reason: format!("expected {} entries, got {}", saucer_levels, self.saucer.len()),
            });
        }
        Ok(())
    }
}

/// Game balance parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Run seed for reproducibility
    pub seed: u64,

    // === World ===
    pub world_width: f32,
    pub world_height: f32,

    // === Player ===
    pub player_lives: u32,
    pub player_respawn_delay_ms: u64,
    /// Delay between the final respawn check and Game Over
    pub game_over_delay_ms: u64,

    // === Asteroid waves ===
    /// Keepout radius around the player; level N asteroids use radius / 2^(N-1)
    pub keepout_zone_radius: f32,
    /// Wave telegraph delay
    pub asteroid_spawn_delay_ms: u64,
    pub initial_wave_size: u32,
    pub max_wave_size: u32,
    /// Rejection-sampling attempts per asteroid before accepting overlap
    pub placement_attempts: u32,

    // === Saucers ===
    pub saucer_spawn_interval_ms: u64,

    // === Progression ===
    /// Score per +1.0 of difficulty multiplier
    pub difficulty_increment_amount: u64,
    /// Score step between extra lives
    pub additional_life_amount: u64,
    pub scoring: ScoringTable,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0,

            world_width: 800.0,
            world_height: 600.0,

            player_lives: 3,
            player_respawn_delay_ms: 2000,
            game_over_delay_ms: 1000,

            keepout_zone_radius: 128.0,
            asteroid_spawn_delay_ms: 1500,
            initial_wave_size: 5,
            max_wave_size: 40,
            placement_attempts: 100,

            saucer_spawn_interval_ms: 15_000,

            difficulty_increment_amount: 5000,
            additional_life_amount: 10_000,
            scoring: ScoringTable::default(),
        }
    }
}

impl GameConfig {
    /// Default configuration with the given seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config (seed {})", config.seed);
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.world_width, self.world_height)
    }

    /// Keepout radius for each asteroid level, largest first
    pub fn keepout_radii(&self) -> [f32; Asteroid::LEVEL_COUNT] {
        let r = self.keepout_zone_radius;
        [r, r / 2.0, r / 4.0]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world_width <= 0.0 || self.world_height <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "world_width/world_height",
                reason: "world must have positive size".into(),
            });
        }
        if self.keepout_zone_radius <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "keepout_zone_radius",
                reason: "must be positive".into(),
            });
        }
        // A player zone that covers the world leaves nowhere to place a wave
        if self.keepout_zone_radius * 2.0 >= self.world_width.min(self.world_height) {
            return Err(ConfigError::Invalid {
                field: "keepout_zone_radius",
                reason: format!(
                    "diameter {} must be smaller than the world",
                    self.keepout_zone_radius * 2.0
                ),
            });
        }
        if self.saucer_spawn_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "saucer_spawn_interval_ms",
                reason: "must be positive".into(),
            });
        }
        if self.difficulty_increment_amount == 0 {
            return Err(ConfigError::Invalid {
                field: "difficulty_increment_amount",
                reason: "must be positive".into(),
            });
        }
        if self.additional_life_amount == 0 {
            return Err(ConfigError::Invalid {
                field: "additional_life_amount",
                reason: "must be positive".into(),
            });
        }
        if self.placement_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "placement_attempts",
                reason: "must be positive".into(),
            });
        }
        if self.initial_wave_size == 0 || self.initial_wave_size > self.max_wave_size {
            return Err(ConfigError::Invalid {
                field: "initial_wave_size",
                reason: format!("must be in 1..={}", self.max_wave_size),
            });
        }
        self.scoring.validate()
    }
}
