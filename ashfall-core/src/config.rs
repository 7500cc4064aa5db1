//! Game tuning knobs.
//!
//! Every field has a default matching the standard Ashfall rules, so a JSON
//! config only needs to name the values it changes.

use crate::world::{Actor, ActorKind, Pool, RoomId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Rules configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Highest attainable level; remorting requires reaching it.
    pub max_level: u8,

    /// Remorts needed before an advanced class may be chosen.
    pub advanced_class_remorts: u32,

    /// Time units between combat rounds.
    pub combat_interval: u64,

    /// Time units between recovery ticks while resting.
    pub recovery_interval: u64,

    /// Hit points recovered per tick.
    pub recovery_hit_points: i32,

    /// Mana recovered per tick.
    pub recovery_mana: i32,

    /// Chance (0.0 to 1.0) that fleeing succeeds.
    pub flee_chance: f64,

    /// Room where slain actors without a home wake up.
    pub respawn_room: String,

    pub starting_hit_points: i32,
    pub starting_mana: i32,
    pub starting_movement: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_level: 50,
            advanced_class_remorts: 50,
            combat_interval: 30,
            recovery_interval: 10,
            recovery_hit_points: 5,
            recovery_mana: 3,
            flee_chance: 0.5,
            respawn_room: "Ruined Neighborhood".to_string(),
            starting_hit_points: 100,
            starting_mana: 0,
            starting_movement: 100,
        }
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_level < 2 {
            return Err(ConfigError::Invalid {
                field: "max_level",
                reason: format!("must be at least 2, got {}", self.max_level),
            });
        }
        if !(0.0..=1.0).contains(&self.flee_chance) {
            return Err(ConfigError::Invalid {
                field: "flee_chance",
                reason: format!("must be between 0 and 1, got {}", self.flee_chance),
            });
        }
        if self.combat_interval == 0 || self.recovery_interval == 0 {
            return Err(ConfigError::Invalid {
                field: "interval",
                reason: "timer intervals must be positive".to_string(),
            });
        }
        if self.starting_hit_points < 1 {
            return Err(ConfigError::Invalid {
                field: "starting_hit_points",
                reason: format!("must be positive, got {}", self.starting_hit_points),
            });
        }
        Ok(())
    }

    /// Pull every ranged field back into the range [`GameConfig::validate`]
    /// accepts. A NaN flee chance becomes zero.
    pub fn sanitized(mut self) -> Self {
        self.max_level = self.max_level.max(2);
        self.flee_chance = clamp_chance(self.flee_chance);
        self.combat_interval = self.combat_interval.max(1);
        self.recovery_interval = self.recovery_interval.max(1);
        self.starting_hit_points = self.starting_hit_points.max(1);
        self
    }

    pub fn with_max_level(mut self, level: u8) -> Self {
        self.max_level = level.max(2);
        self
    }

    pub fn with_advanced_class_remorts(mut self, remorts: u32) -> Self {
        self.advanced_class_remorts = remorts;
        self
    }

    pub fn with_combat_interval(mut self, interval: u64) -> Self {
        self.combat_interval = interval.max(1);
        self
    }

    pub fn with_recovery_interval(mut self, interval: u64) -> Self {
        self.recovery_interval = interval.max(1);
        self
    }

    pub fn with_flee_chance(mut self, chance: f64) -> Self {
        self.flee_chance = clamp_chance(chance);
        self
    }

    pub fn with_respawn_room(mut self, room: impl Into<String>) -> Self {
        self.respawn_room = room.into();
        self
    }

    /// Create a fresh level-1 actor with the configured starting pools.
    pub fn new_actor(&self, name: impl Into<String>, kind: ActorKind, location: RoomId) -> Actor {
        let mut actor = Actor::new(name, kind, location);
        actor.hit_points = Pool::new(self.starting_hit_points);
        actor.mana = Pool::new(self.starting_mana);
        actor.movement = Pool::new(self.starting_movement);
        actor
    }
}

fn clamp_chance(chance: f64) -> f64 {
    if chance.is_nan() {
        0.0
    } else {
        chance.clamp(0.0, 1.0)
    }
}
