//! Character progression and combat core for the Ashfall MUD.
//!
//! This crate provides:
//! - Five base classes and ten advanced classes with their bonuses and grants
//! - Experience, level-ups and remorts
//! - Timed combat rounds, fleeing, death and respawn
//! - Spellcasting and resting recovery
//! - An Intent/Effect rules system: every change to the world is resolved
//!   first and applied second
//! - A text command layer for driving it all from a terminal or a server
//!
//! # Quick Start
//!
//! ```ignore
//! use ashfall_core::{content, GameConfig, GameSession, RulesEngine};
//!
//! let config = GameConfig::default();
//! let mut world = content::build_world(&config)?;
//! let player = content::spawn_player(&mut world, &config, "Drifter")?;
//! let mut session = GameSession::new(world, RulesEngine::new(config));
//!
//! let resolution = session.handle_line(player, "chooseclass warrior");
//! for line in resolution.messages_for(player, session.world.actor(player)?.location) {
//!     println!("{line}");
//! }
//!
//! // Let 30 time units pass so pending combat rounds and recovery ticks fire.
//! session.advance(30);
//! ```

pub mod class_data;
pub mod commands;
pub mod config;
pub mod content;
pub mod dice;
pub mod items;
pub mod progression;
pub mod rules;
pub mod scheduler;
pub mod session;
pub mod spells;
pub mod testing;
pub mod world;

// Primary public API
pub use config::{ConfigError, GameConfig};
pub use rules::{apply_effects, Effect, Intent, Resolution, RulesEngine, RulesError};
pub use session::GameSession;
pub use spells::Spell;
pub use testing::TestHarness;
pub use world::{Actor, ActorId, ActorKind, AdvancedClass, BaseClass, World};
