//! Testing utilities for Ashfall.
//!
//! This module provides tools for integration testing:
//! - `TestHarness` for scripted scenarios with a seeded engine
//! - Assertion helpers for verifying actor state

use crate::config::GameConfig;
use crate::items::standard_item;
use crate::rules::{Intent, Resolution, RulesEngine, RulesError};
use crate::session::GameSession;
use crate::world::{Actor, ActorId, ActorKind, Container, ItemId, Room, RoomId, World};

/// Seed used when a test does not pick its own.
pub const DEFAULT_SEED: u64 = 0xA5_F411;

/// Test harness: a small world with two players standing in one room.
pub struct TestHarness {
    pub session: GameSession,
    /// The actor commands are issued as.
    pub hero: ActorId,
    /// A second player to fight, heal or bless.
    pub rival: ActorId,
    /// Where both start.
    pub room: RoomId,
    /// The respawn room named by the config.
    pub respawn: RoomId,
}

impl TestHarness {
    /// Create a harness with the default rules.
    pub fn new() -> Self {
        Self::with_config(GameConfig::default(), DEFAULT_SEED)
    }

    /// Create a harness with custom rules and seed.
    pub fn with_config(config: GameConfig, seed: u64) -> Self {
        let mut world = World::new();
        let room = world.add_room(Room::new("Town Square", "A test square."));
        let respawn = world.add_room(Room::new(config.respawn_room.clone(), "Where the fallen wake."));
        let hero = world.add_actor(config.new_actor("Hero", ActorKind::Player, room));
        let rival = world.add_actor(config.new_actor("Rival", ActorKind::Player, room));
        Self {
            session: GameSession::new(world, RulesEngine::with_seed(config, seed)),
            hero,
            rival,
            room,
            respawn,
        }
    }

    /// Resolve and apply an intent.
    pub fn execute(&mut self, intent: Intent) -> Result<Resolution, RulesError> {
        self.session.execute(intent)
    }

    /// Run a command line as the hero.
    pub fn input(&mut self, line: &str) -> Resolution {
        self.session.handle_line(self.hero, line)
    }

    /// Run a command line as the hero and return what the hero saw.
    pub fn input_lines(&mut self, line: &str) -> Vec<String> {
        let resolution = self.input(line);
        self.lines_for(&resolution, self.hero)
    }

    /// Lines an actor sees from a resolution, given where the actor is now.
    pub fn lines_for(&self, resolution: &Resolution, actor: ActorId) -> Vec<String> {
        let room = self.actor(actor).location;
        resolution
            .messages_for(actor, room)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Advance time and fire any due timers.
    pub fn advance(&mut self, elapsed: u64) -> Vec<Resolution> {
        self.session.advance(elapsed)
    }

    pub fn actor(&self, id: ActorId) -> &Actor {
        self.session
            .world
            .actor(id)
            .unwrap_or_else(|e| panic!("test actor missing: {e}"))
    }

    pub fn actor_mut(&mut self, id: ActorId) -> &mut Actor {
        self.session
            .world
            .actor_mut(id)
            .unwrap_or_else(|e| panic!("test actor missing: {e}"))
    }

    pub fn hero(&self) -> &Actor {
        self.actor(self.hero)
    }

    pub fn rival(&self) -> &Actor {
        self.actor(self.rival)
    }

    /// Add another actor to the harness room.
    pub fn spawn(&mut self, name: &str, kind: ActorKind) -> ActorId {
        let actor = self.session.engine.config().new_actor(name, kind, self.room);
        self.session.world.add_actor(actor)
    }

    /// Put a standard item somewhere.
    pub fn give_item(&mut self, name: &str, container: Container) -> ItemId {
        let item = standard_item(name).unwrap_or_else(|| panic!("no standard item '{name}'"));
        self.session
            .world
            .add_item(item, container)
            .unwrap_or_else(|e| panic!("could not place '{name}': {e}"))
    }

    /// Choose a class for an actor, panicking if the rules refuse.
    pub fn make_class(&mut self, actor: ActorId, class: crate::world::BaseClass) {
        self.execute(Intent::ChooseClass { actor_id: actor, class })
            .unwrap_or_else(|e| panic!("could not choose {class}: {e}"));
    }

    /// Jump an actor straight to a level without going through experience.
    pub fn set_level(&mut self, actor: ActorId, level: u8) {
        self.actor_mut(actor).progression.level = level;
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert an actor's hit points.
#[track_caller]
pub fn assert_hp(harness: &TestHarness, actor: ActorId, current: i32, max: i32) {
    let hp = harness.actor(actor).hit_points;
    assert_eq!(
        (hp.current, hp.maximum),
        (current, max),
        "Expected HP {current}/{max}, got {hp}"
    );
}

/// Assert an actor's mana.
#[track_caller]
pub fn assert_mana(harness: &TestHarness, actor: ActorId, current: i32, max: i32) {
    let mana = harness.actor(actor).mana;
    assert_eq!(
        (mana.current, mana.maximum),
        (current, max),
        "Expected mana {current}/{max}, got {mana}"
    );
}

/// Assert two actors are engaged with each other.
#[track_caller]
pub fn assert_engaged(harness: &TestHarness, a: ActorId, b: ActorId) {
    assert_eq!(harness.actor(a).combat_target(), Some(b), "Expected first actor to target second");
    assert_eq!(harness.actor(b).combat_target(), Some(a), "Expected second actor to target first");
}

/// Assert an actor is in combat.
#[track_caller]
pub fn assert_in_combat(harness: &TestHarness, actor: ActorId) {
    assert!(harness.actor(actor).in_combat(), "Expected to be in combat");
}

/// Assert an actor is NOT in combat.
#[track_caller]
pub fn assert_not_in_combat(harness: &TestHarness, actor: ActorId) {
    assert!(!harness.actor(actor).in_combat(), "Expected to NOT be in combat");
}

/// Assert some line of output contains `needle`.
#[track_caller]
pub fn assert_saw(lines: &[String], needle: &str) {
    assert!(
        lines.iter().any(|l| l.contains(needle)),
        "Expected a line containing '{needle}', got {lines:?}"
    );
}
