//! Ashfall rules engine with an Intent/Effect pipeline.
//!
//! 1. A command (or a timer) produces an [`Intent`]
//! 2. [`RulesEngine::resolve`] checks it against the current [`World`] and
//!    either rejects it with a [`RulesError`] or returns a [`Resolution`]
//! 3. The resolution's [`Effect`]s describe every state change
//! 4. [`apply_effects`] writes them to the world
//!
//! Resolving never mutates the world, so a rejected intent leaves everything
//! exactly as it was.

use crate::class_data::{valid_advanced_classes, ClassGrants};
use crate::config::GameConfig;
use crate::dice::{roll_percentile, DamageDice};
use crate::progression::{level_growth, pending_levels};
use crate::scheduler::TimerKind;
use crate::spells::{Spell, SpellEffect};
use crate::world::{
    Ability, AbilityScores, Actor, ActorId, AdvancedClass, BaseClass, CombatSession, Container,
    Direction, EquipmentSlot, ItemId, ItemKind, Pool, RoomId, World, WorldError,
    DEFAULT_ABILITY_SCORE,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

// ============================================================================
// Intents
// ============================================================================

/// Something an actor wants to do, or a timer that has fired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    // Progression
    ChooseClass {
        actor_id: ActorId,
        class: BaseClass,
    },
    GainExperience {
        actor_id: ActorId,
        amount: i64,
    },
    LevelUp {
        actor_id: ActorId,
    },
    Remort {
        actor_id: ActorId,
    },
    ChooseAdvancedClass {
        actor_id: ActorId,
        class: AdvancedClass,
    },

    // Combat
    StartCombat {
        attacker_id: ActorId,
        target_id: ActorId,
        weapon_id: Option<ItemId>,
    },
    /// One resolution tick of an actor's combat.
    CombatRound {
        actor_id: ActorId,
    },
    Flee {
        actor_id: ActorId,
    },
    Damage {
        target_id: ActorId,
        amount: i32,
        source_id: Option<ActorId>,
    },

    // Spellcasting
    CastSpell {
        caster_id: ActorId,
        spell: Spell,
        target_id: Option<ActorId>,
    },

    // Resting
    Rest {
        actor_id: ActorId,
    },
    RecoveryTick {
        actor_id: ActorId,
    },
    Stand {
        actor_id: ActorId,
    },

    // Equipment and inventory
    Wield {
        actor_id: ActorId,
        item_id: ItemId,
    },
    Unwield {
        actor_id: ActorId,
    },
    Wear {
        actor_id: ActorId,
        item_id: ItemId,
    },
    Remove {
        actor_id: ActorId,
        item_id: ItemId,
    },
    PickUp {
        actor_id: ActorId,
        item_id: ItemId,
    },
    Drop {
        actor_id: ActorId,
        item_id: ItemId,
    },
    UseItem {
        actor_id: ActorId,
        item_id: ItemId,
    },

    // Movement
    Move {
        actor_id: ActorId,
        direction: Direction,
    },
}

// ============================================================================
// Effects
// ============================================================================

/// Concrete state changes produced by resolving an intent.
///
/// Stat changes carry deltas so that several effects on the same actor in one
/// resolution compose; the `new_*` fields are the resulting values, kept for
/// display and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// A base class was chosen; its bonuses and grants apply.
    ClassChosen { actor_id: ActorId, class: BaseClass },

    ExperienceGained {
        actor_id: ActorId,
        amount: u64,
        new_total: u64,
    },

    LevelGained {
        actor_id: ActorId,
        new_level: u8,
        growth: Vec<(Ability, i32)>,
        hp_gain: i32,
        mana_gain: i32,
    },

    /// The actor has enough remorts for an advanced class. Informational.
    AdvancedClassEligible { actor_id: ActorId },

    /// Level and experience reset and abilities rebuilt from the defaults.
    /// The pools keep their maximum, grow by the class bonus again and refill.
    Remorted {
        actor_id: ActorId,
        remorts: u32,
        abilities: AbilityScores,
        hp_bonus: i32,
        mana_bonus: i32,
    },

    AdvancedClassChosen {
        actor_id: ActorId,
        class: AdvancedClass,
    },

    /// Both actors now reference each other.
    CombatStarted {
        attacker_id: ActorId,
        target_id: ActorId,
        weapon_id: Option<ItemId>,
    },

    /// The actor's combat session ends, and the opponent's too if it still
    /// points back at the actor.
    CombatEnded {
        actor_id: ActorId,
        opponent_id: Option<ActorId>,
    },

    AttackHit {
        attacker_id: ActorId,
        target_id: ActorId,
        roll: i32,
        hit_chance: i32,
        damage: i32,
    },

    AttackMissed {
        attacker_id: ActorId,
        target_id: ActorId,
        roll: i32,
        hit_chance: i32,
    },

    HpChanged {
        target_id: ActorId,
        amount: i32,
        new_current: i32,
        new_max: i32,
    },

    ManaChanged {
        actor_id: ActorId,
        amount: i32,
        new_current: i32,
    },

    HitBonusChanged {
        actor_id: ActorId,
        amount: i32,
        new_value: i32,
    },

    ArmorClassChanged {
        actor_id: ActorId,
        amount: i32,
        new_value: i32,
    },

    /// Hit points reached zero. The actor is restored and moved to
    /// `respawn_room` (or left in place when there is none).
    Died {
        actor_id: ActorId,
        killer_id: Option<ActorId>,
        respawn_room: Option<RoomId>,
    },

    SpellCast {
        caster_id: ActorId,
        spell: Spell,
        target_id: Option<ActorId>,
    },

    RestStarted { actor_id: ActorId },

    RestEnded { actor_id: ActorId },

    TimerScheduled {
        actor_id: ActorId,
        kind: TimerKind,
        delay: u64,
    },

    ItemMoved { item_id: ItemId, to: Container },

    ItemUsed { item_id: ItemId, uses_left: i32 },

    ItemDestroyed { item_id: ItemId },

    ActorMoved {
        actor_id: ActorId,
        from: RoomId,
        to: RoomId,
    },
}

// ============================================================================
// Messages
// ============================================================================

/// Who should see a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Audience {
    /// A single actor.
    Actor(ActorId),
    /// Everyone in a room except the listed actors.
    Room {
        room_id: RoomId,
        exclude: Vec<ActorId>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub audience: Audience,
    pub text: String,
}

/// The result of resolving an intent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub effects: Vec<Effect>,
    pub messages: Vec<Message>,
}

impl Resolution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }

    /// Address a message to one actor.
    pub fn notify(mut self, actor: ActorId, text: impl Into<String>) -> Self {
        self.tell(actor, text);
        self
    }

    /// Address a message to a room.
    pub fn broadcast(mut self, room: RoomId, exclude: &[ActorId], text: impl Into<String>) -> Self {
        self.announce(room, exclude, text);
        self
    }

    pub fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn tell(&mut self, actor: ActorId, text: impl Into<String>) {
        self.messages.push(Message {
            audience: Audience::Actor(actor),
            text: text.into(),
        });
    }

    pub fn announce(&mut self, room: RoomId, exclude: &[ActorId], text: impl Into<String>) {
        self.messages.push(Message {
            audience: Audience::Room {
                room_id: room,
                exclude: exclude.to_vec(),
            },
            text: text.into(),
        });
    }

    /// Append another resolution's effects and messages.
    pub fn extend(&mut self, other: Resolution) {
        self.effects.extend(other.effects);
        self.messages.extend(other.messages);
    }

    /// Lines an actor standing in `room` would see, in order.
    pub fn messages_for(&self, actor: ActorId, room: RoomId) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|m| match &m.audience {
                Audience::Actor(id) => *id == actor,
                Audience::Room { room_id, exclude } => {
                    *room_id == room && !exclude.contains(&actor)
                }
            })
            .map(|m| m.text.as_str())
            .collect()
    }

    pub fn has_effect(&self, predicate: impl Fn(&Effect) -> bool) -> bool {
        self.effects.iter().any(predicate)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Why an intent was rejected. The display text is what the player sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("Invalid class '{0}'. Available classes: warrior, mage, cleric, thief, psionicist")]
    InvalidClass(String),

    #[error("You are already a {0}!")]
    AlreadyClassed(BaseClass),

    #[error("You need {required} remorts to choose an advanced class!")]
    NotEligible { required: u32, remorts: u32 },

    #[error("You have already chosen the {0} advanced class!")]
    AlreadyAdvanced(AdvancedClass),

    #[error("Invalid advanced class '{requested}'. Valid options: {}", valid_list(.valid))]
    InvalidAdvancedClass {
        requested: String,
        valid: Vec<AdvancedClass>,
    },

    #[error("You must reach maximum level before you can remort!")]
    NotMaxLevel,

    #[error("You are already at the maximum level!")]
    MaxLevel,

    #[error("{}", engaged_message(.0))]
    AlreadyEngaged(Option<String>),

    #[error("{0}")]
    InvalidTarget(String),

    #[error("You are not in combat!")]
    NotInCombat,

    #[error("You cannot {0} while in combat!")]
    InCombat(&'static str),

    #[error("You don't know the spell '{0}'.")]
    UnknownSpell(String),

    #[error("You don't have enough mana to cast that spell. ({available}/{required})")]
    InsufficientMana { required: i32, available: i32 },

    #[error("You need a target for {0}.")]
    TargetRequired(Spell),

    #[error("You are not resting.")]
    NotResting,

    #[error("You are already resting.")]
    AlreadyResting,

    #[error("You cannot {0} while resting. Stand up first.")]
    Resting(&'static str),

    #[error("You don't see that here.")]
    ItemNotHere,

    #[error("That's not a weapon!")]
    NotAWeapon,

    #[error("That's not armor!")]
    NotArmor,

    #[error("You can't use that.")]
    NotConsumable,

    #[error("You are not wearing that.")]
    NotEquipped,

    #[error("You are not wielding anything.")]
    NothingWielded,

    #[error("You cannot go that way.")]
    NoExit,

    #[error(transparent)]
    World(#[from] WorldError),
}

fn valid_list(valid: &[AdvancedClass]) -> String {
    if valid.is_empty() {
        return "none (choose a base class first)".to_string();
    }
    valid.iter().map(|c| c.id()).collect::<Vec<_>>().join(", ")
}

fn engaged_message(target: &Option<String>) -> String {
    match target {
        Some(name) => format!("{name} is already in combat!"),
        None => "You are already in combat!".to_string(),
    }
}

// ============================================================================
// Rules Engine
// ============================================================================

/// Resolves intents against the world using the configured rules.
#[derive(Debug, Clone)]
pub struct RulesEngine {
    config: GameConfig,
    rng: StdRng,
}

impl RulesEngine {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config: Self::checked(config),
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic engine for tests and replays.
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self {
            config: Self::checked(config),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Out-of-range settings are clamped rather than left to panic mid-game.
    fn checked(config: GameConfig) -> GameConfig {
        if let Err(e) = config.validate() {
            warn!(error = %e, "Clamping invalid rules config");
        }
        config.sanitized()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Resolve an intent into effects and messages. Never mutates the world.
    pub fn resolve(&mut self, world: &World, intent: Intent) -> Result<Resolution, RulesError> {
        debug!(?intent, "resolving intent");
        match intent {
            Intent::ChooseClass { actor_id, class } => self.resolve_choose_class(world, actor_id, class),
            Intent::GainExperience { actor_id, amount } => {
                self.resolve_gain_experience(world, actor_id, amount)
            }
            Intent::LevelUp { actor_id } => self.resolve_level_up(world, actor_id),
            Intent::Remort { actor_id } => self.resolve_remort(world, actor_id),
            Intent::ChooseAdvancedClass { actor_id, class } => {
                self.resolve_advanced_class(world, actor_id, class)
            }
            Intent::StartCombat {
                attacker_id,
                target_id,
                weapon_id,
            } => self.resolve_start_combat(world, attacker_id, target_id, weapon_id),
            Intent::CombatRound { actor_id } => self.resolve_combat_round(world, actor_id),
            Intent::Flee { actor_id } => self.resolve_flee(world, actor_id),
            Intent::Damage {
                target_id,
                amount,
                source_id,
            } => {
                let mut resolution = Resolution::new();
                self.damage_effects(world, target_id, amount, source_id, &mut resolution)?;
                Ok(resolution)
            }
            Intent::CastSpell {
                caster_id,
                spell,
                target_id,
            } => self.resolve_cast_spell(world, caster_id, spell, target_id),
            Intent::Rest { actor_id } => self.resolve_rest(world, actor_id),
            Intent::RecoveryTick { actor_id } => self.resolve_recovery_tick(world, actor_id),
            Intent::Stand { actor_id } => self.resolve_stand(world, actor_id),
            Intent::Wield { actor_id, item_id } => self.resolve_wield(world, actor_id, item_id),
            Intent::Unwield { actor_id } => self.resolve_unwield(world, actor_id),
            Intent::Wear { actor_id, item_id } => self.resolve_wear(world, actor_id, item_id),
            Intent::Remove { actor_id, item_id } => self.resolve_remove(world, actor_id, item_id),
            Intent::PickUp { actor_id, item_id } => self.resolve_pick_up(world, actor_id, item_id),
            Intent::Drop { actor_id, item_id } => self.resolve_drop(world, actor_id, item_id),
            Intent::UseItem { actor_id, item_id } => self.resolve_use_item(world, actor_id, item_id),
            Intent::Move {
                actor_id,
                direction,
            } => self.resolve_move(world, actor_id, direction),
        }
    }

    // ------------------------------------------------------------------------
    // Progression
    // ------------------------------------------------------------------------

    fn resolve_choose_class(
        &self,
        world: &World,
        actor_id: ActorId,
        class: BaseClass,
    ) -> Result<Resolution, RulesError> {
        let actor = world.actor(actor_id)?;
        if let Some(existing) = actor.base_class {
            return Err(RulesError::AlreadyClassed(existing));
        }
        info!(actor = %actor.name, class = class.id(), "class chosen");
        Ok(Resolution::new()
            .with_effect(Effect::ClassChosen { actor_id, class })
            .notify(actor_id, format!("You have chosen the {} class!", class.id()))
            .notify(actor_id, "Your stats have been adjusted based on your class choice.")
            .notify(actor_id, "Use 'stats' to see your current statistics."))
    }

    fn resolve_gain_experience(
        &self,
        world: &World,
        actor_id: ActorId,
        amount: i64,
    ) -> Result<Resolution, RulesError> {
        let actor = world.actor(actor_id)?;
        let mut resolution = Resolution::new();
        if amount > 0 {
            self.experience_effects(actor, amount.unsigned_abs(), &mut resolution);
        }
        Ok(resolution)
    }

    /// Add experience and every level-up it pays for.
    fn experience_effects(&self, actor: &Actor, amount: u64, resolution: &mut Resolution) {
        let new_total = actor.progression.experience.saturating_add(amount);
        resolution.push(Effect::ExperienceGained {
            actor_id: actor.id,
            amount,
            new_total,
        });
        resolution.tell(actor.id, format!("You gain {amount} experience points."));

        let mut level = actor.progression.level;
        let mut abilities = actor.abilities;
        for _ in 0..pending_levels(level, new_total, self.config.max_level) {
            self.level_up_effects(actor, &mut level, &mut abilities, resolution);
        }
    }

    /// Push one level of growth, starting from the simulated `level` and `abilities`.
    fn level_up_effects(
        &self,
        actor: &Actor,
        level: &mut u8,
        abilities: &mut AbilityScores,
        resolution: &mut Resolution,
    ) {
        let growth = level_growth(actor.base_class, abilities);
        *level += 1;
        *abilities = growth.abilities;

        info!(actor = %actor.name, level = *level, "level gained");
        resolution.push(Effect::LevelGained {
            actor_id: actor.id,
            new_level: *level,
            growth: actor
                .base_class
                .map(|c| c.level_growth().to_vec())
                .unwrap_or_default(),
            hp_gain: growth.hit_points,
            mana_gain: growth.mana,
        });
        resolution.tell(
            actor.id,
            format!("You have gained a level! You are now level {}!", *level),
        );
        resolution.tell(
            actor.id,
            format!(
                "You gain {} hit points and {} mana.",
                growth.hit_points, growth.mana
            ),
        );
        if actor.progression.remorts >= self.config.advanced_class_remorts {
            resolution.push(Effect::AdvancedClassEligible { actor_id: actor.id });
            resolution.tell(actor.id, "You are now eligible for advanced class selection!");
        }
    }

    fn resolve_level_up(&self, world: &World, actor_id: ActorId) -> Result<Resolution, RulesError> {
        let actor = world.actor(actor_id)?;
        if actor.progression.level >= self.config.max_level {
            return Err(RulesError::MaxLevel);
        }
        let mut resolution = Resolution::new();
        let mut level = actor.progression.level;
        let mut abilities = actor.abilities;
        self.level_up_effects(actor, &mut level, &mut abilities, &mut resolution);
        Ok(resolution)
    }

    fn resolve_remort(&self, world: &World, actor_id: ActorId) -> Result<Resolution, RulesError> {
        let actor = world.actor(actor_id)?;
        if actor.progression.level < self.config.max_level {
            return Err(RulesError::NotMaxLevel);
        }

        let mut abilities = AbilityScores::default();
        let (mut hp_bonus, mut mana_bonus) = (0, 0);
        if let Some(class) = actor.base_class {
            let data = class.data();
            abilities.apply(data.ability_bonuses);
            hp_bonus = data.hit_points;
            mana_bonus = data.mana;
        }
        let remorts = actor.progression.remorts.saturating_add(1);

        info!(actor = %actor.name, remorts, "remorted");
        let mut resolution = Resolution::new()
            .with_effect(Effect::Remorted {
                actor_id,
                remorts,
                abilities,
                hp_bonus,
                mana_bonus,
            })
            .notify(
                actor_id,
                format!("You have remorted! This is your {} remort.", ordinal(remorts)),
            );
        if remorts >= self.config.advanced_class_remorts {
            resolution.push(Effect::AdvancedClassEligible { actor_id });
            resolution.tell(actor_id, "You are now eligible for advanced class selection!");
        }
        Ok(resolution)
    }

    fn resolve_advanced_class(
        &self,
        world: &World,
        actor_id: ActorId,
        class: AdvancedClass,
    ) -> Result<Resolution, RulesError> {
        let actor = world.actor(actor_id)?;
        let required = self.config.advanced_class_remorts;
        if actor.progression.remorts < required {
            return Err(RulesError::NotEligible {
                required,
                remorts: actor.progression.remorts,
            });
        }
        if let Some(existing) = actor.advanced_class {
            return Err(RulesError::AlreadyAdvanced(existing));
        }
        let valid = valid_advanced_classes(actor.base_class);
        if !valid.contains(&class) {
            return Err(RulesError::InvalidAdvancedClass {
                requested: class.id().to_string(),
                valid,
            });
        }

        info!(actor = %actor.name, class = class.id(), "advanced class chosen");
        Ok(Resolution::new()
            .with_effect(Effect::AdvancedClassChosen { actor_id, class })
            .notify(
                actor_id,
                format!("You have chosen the {} advanced class!", class.id()),
            ))
    }

    // ------------------------------------------------------------------------
    // Combat
    // ------------------------------------------------------------------------

    fn resolve_start_combat(
        &self,
        world: &World,
        attacker_id: ActorId,
        target_id: ActorId,
        weapon_id: Option<ItemId>,
    ) -> Result<Resolution, RulesError> {
        let attacker = world.actor(attacker_id)?;
        let target = world.actor(target_id)?;

        if attacker_id == target_id {
            return Err(RulesError::InvalidTarget("You can't attack yourself!".to_string()));
        }
        if !target.kind.combat_capable() {
            return Err(RulesError::InvalidTarget(
                "You can only attack other players or creatures.".to_string(),
            ));
        }
        if target.location != attacker.location {
            return Err(RulesError::InvalidTarget("You don't see them here.".to_string()));
        }
        if attacker.in_combat() {
            return Err(RulesError::AlreadyEngaged(None));
        }
        if target.in_combat() {
            return Err(RulesError::AlreadyEngaged(Some(target.name.clone())));
        }
        if let Some(weapon_id) = weapon_id {
            if !carried_by(world, weapon_id, attacker_id) {
                return Err(RulesError::ItemNotHere);
            }
            if !world.item(weapon_id)?.is_weapon() {
                return Err(RulesError::NotAWeapon);
            }
        }

        let interval = self.config.combat_interval;
        let mut resolution = Resolution::new();
        for actor in [attacker, target] {
            if actor.resting {
                resolution.push(Effect::RestEnded { actor_id: actor.id });
            }
        }
        resolution.push(Effect::CombatStarted {
            attacker_id,
            target_id,
            weapon_id,
        });
        resolution.push(Effect::TimerScheduled {
            actor_id: attacker_id,
            kind: TimerKind::Combat,
            delay: interval,
        });
        resolution.push(Effect::TimerScheduled {
            actor_id: target_id,
            kind: TimerKind::Combat,
            delay: interval,
        });
        resolution.tell(attacker_id, format!("You attack {}!", target.name));
        resolution.tell(target_id, format!("{} attacks you!", attacker.name));
        resolution.announce(
            attacker.location,
            &[attacker_id, target_id],
            format!("{} attacks {}!", attacker.name, target.name),
        );
        debug!(attacker = %attacker.name, target = %target.name, "combat started");
        Ok(resolution)
    }

    fn resolve_combat_round(&mut self, world: &World, actor_id: ActorId) -> Result<Resolution, RulesError> {
        let actor = world.actor(actor_id)?;
        let Some(session) = actor.combat else {
            return Ok(Resolution::new());
        };

        let target = match world.actor(session.target) {
            Ok(target)
                if target.combat_target() == Some(actor_id)
                    && target.location == actor.location =>
            {
                target
            }
            _ => {
                debug!(actor = %actor.name, "opponent disengaged, ending combat");
                return Ok(Resolution::new().with_effect(Effect::CombatEnded {
                    actor_id,
                    opponent_id: None,
                }));
            }
        };

        let mut resolution = Resolution::new();
        let hit_chance = 50 + actor.hit_bonus - target.armor_class;
        let roll = roll_percentile(&mut self.rng);
        let mut target_died = false;

        if roll <= hit_chance {
            let damage = self.roll_damage(world, actor, session);
            resolution.push(Effect::AttackHit {
                attacker_id: actor_id,
                target_id: target.id,
                roll,
                hit_chance,
                damage,
            });
            resolution.tell(actor_id, format!("You hit {} for {damage} damage!", target.name));
            resolution.tell(target.id, format!("{} hits you for {damage} damage!", actor.name));
            resolution.announce(
                actor.location,
                &[actor_id, target.id],
                format!("{} hits {} for {damage} damage!", actor.name, target.name),
            );
            target_died = self.damage_effects(world, target.id, damage, Some(actor_id), &mut resolution)?;
        } else {
            resolution.push(Effect::AttackMissed {
                attacker_id: actor_id,
                target_id: target.id,
                roll,
                hit_chance,
            });
            resolution.tell(actor_id, format!("You miss {}!", target.name));
            resolution.tell(target.id, format!("{} misses you!", actor.name));
            resolution.announce(
                actor.location,
                &[actor_id, target.id],
                format!("{} misses {}!", actor.name, target.name),
            );
        }

        if !target_died {
            resolution.push(Effect::TimerScheduled {
                actor_id,
                kind: TimerKind::Combat,
                delay: self.config.combat_interval,
            });
        }
        Ok(resolution)
    }

    /// Damage for one hit: weapon dice (or 1d4 unarmed), plus the actor's
    /// damage bonus and strength bonus, never less than 1.
    fn roll_damage(&mut self, world: &World, actor: &Actor, session: CombatSession) -> i32 {
        let weapon = session
            .weapon
            .filter(|id| carried_by(world, *id, actor.id))
            .or_else(|| actor.equipment.wielded())
            .and_then(|id| world.item(id).ok())
            .and_then(|item| item.weapon_damage());
        let dice = weapon.unwrap_or_else(DamageDice::unarmed);

        let mut damage = dice.roll_with_rng(&mut self.rng).total + actor.damage_bonus;
        if actor.abilities.strength > DEFAULT_ABILITY_SCORE {
            damage += actor.abilities.bonus(Ability::Strength);
        }
        damage.max(1)
    }

    /// Apply damage to a target, handling death. Returns whether the target died.
    fn damage_effects(
        &self,
        world: &World,
        target_id: ActorId,
        amount: i32,
        source_id: Option<ActorId>,
        resolution: &mut Resolution,
    ) -> Result<bool, RulesError> {
        let target = world.actor(target_id)?;
        let amount = amount.max(0);
        let new_current = (target.hit_points.current - amount).max(0);
        resolution.push(Effect::HpChanged {
            target_id,
            amount: -amount,
            new_current,
            new_max: target.hit_points.maximum,
        });
        if new_current > 0 {
            return Ok(false);
        }

        let respawn_room = target.home.or_else(|| world.room_by_name(&self.config.respawn_room));
        if respawn_room.is_none() {
            warn!(
                actor = %target.name,
                room = %self.config.respawn_room,
                "respawn room missing, reviving in place"
            );
        }
        info!(actor = %target.name, "died");

        resolution.push(Effect::CombatEnded {
            actor_id: target_id,
            opponent_id: target.combat_target(),
        });
        resolution.push(Effect::Died {
            actor_id: target_id,
            killer_id: source_id,
            respawn_room,
        });
        resolution.tell(target_id, "You have died!");
        resolution.announce(target.location, &[target_id], format!("{} has died!", target.name));
        let wake_room = respawn_room
            .and_then(|id| world.room(id).ok())
            .map(|room| room.name.clone())
            .unwrap_or_else(|| "the same place".to_string());
        resolution.tell(
            target_id,
            format!("You wake up in {wake_room}, having been revived."),
        );

        if let Some(killer) = source_id
            .filter(|id| *id != target_id)
            .and_then(|id| world.actor(id).ok())
        {
            if target.experience_value > 0 {
                self.experience_effects(killer, target.experience_value, resolution);
            }
        }
        Ok(true)
    }

    fn resolve_flee(&mut self, world: &World, actor_id: ActorId) -> Result<Resolution, RulesError> {
        let actor = world.actor(actor_id)?;
        let Some(session) = actor.combat else {
            return Err(RulesError::NotInCombat);
        };

        if self.rng.gen_bool(self.config.flee_chance) {
            debug!(actor = %actor.name, "fled combat");
            Ok(Resolution::new()
                .with_effect(Effect::CombatEnded {
                    actor_id,
                    opponent_id: Some(session.target),
                })
                .notify(actor_id, "You successfully flee from combat!")
                .broadcast(
                    actor.location,
                    &[actor_id],
                    format!("{} flees from combat!", actor.name),
                ))
        } else {
            Ok(Resolution::new().notify(actor_id, "You fail to flee from combat!"))
        }
    }

    // ------------------------------------------------------------------------
    // Spellcasting
    // ------------------------------------------------------------------------

    fn resolve_cast_spell(
        &self,
        world: &World,
        caster_id: ActorId,
        spell: Spell,
        target_id: Option<ActorId>,
    ) -> Result<Resolution, RulesError> {
        let caster = world.actor(caster_id)?;
        if !caster.knows_spell(spell) {
            return Err(RulesError::UnknownSpell(spell.id().to_string()));
        }
        let cost = caster.spellbook.get(&spell).map(|e| e.cost).unwrap_or(10);
        if caster.mana.current < cost {
            return Err(RulesError::InsufficientMana {
                required: cost,
                available: caster.mana.current,
            });
        }

        let target = match target_id.filter(|_| spell.accepts_target()) {
            Some(id) => {
                let target = world.actor(id)?;
                if target.location != caster.location {
                    return Err(RulesError::InvalidTarget("You don't see them here.".to_string()));
                }
                Some(target)
            }
            None if spell.requires_target() => return Err(RulesError::TargetRequired(spell)),
            None => None,
        };
        if let (SpellEffect::Damage(_), Some(target)) = (spell.effect(), target) {
            if target.id == caster_id {
                return Err(RulesError::InvalidTarget(
                    "You can't cast that at yourself!".to_string(),
                ));
            }
            if !target.kind.combat_capable() {
                return Err(RulesError::InvalidTarget(
                    "You can only attack other players or creatures.".to_string(),
                ));
            }
        }

        let mut resolution = Resolution::new()
            .with_effect(Effect::ManaChanged {
                actor_id: caster_id,
                amount: -cost,
                new_current: caster.mana.current - cost,
            })
            .with_effect(Effect::SpellCast {
                caster_id,
                spell,
                target_id: target.map(|t| t.id),
            });
        let room = caster.location;
        let other = target.filter(|t| t.id != caster_id);

        match spell.effect() {
            SpellEffect::Heal(amount) => {
                let recipient = other.unwrap_or(caster);
                let restored = amount.min(recipient.hit_points.missing());
                resolution.push(Effect::HpChanged {
                    target_id: recipient.id,
                    amount: restored,
                    new_current: recipient.hit_points.current + restored,
                    new_max: recipient.hit_points.maximum,
                });
                let verb = if spell == Spell::Heal { "heal" } else { "cure" };
                match other {
                    Some(t) => {
                        resolution.tell(caster_id, format!("You {verb} {} for {amount} hit points.", t.name));
                        resolution.tell(t.id, format!("{} {verb}s you for {amount} hit points.", caster.name));
                    }
                    None => {
                        resolution.tell(caster_id, format!("You {verb} yourself for {amount} hit points."))
                    }
                }
            }
            SpellEffect::HitBonus(amount) => {
                let recipient = other.unwrap_or(caster);
                resolution.push(Effect::HitBonusChanged {
                    actor_id: recipient.id,
                    amount,
                    new_value: recipient.hit_bonus + amount,
                });
                match other {
                    Some(t) => {
                        resolution.tell(caster_id, format!("You bless {}.", t.name));
                        resolution.tell(t.id, format!("{} blesses you.", caster.name));
                    }
                    None => resolution.tell(caster_id, "You bless yourself."),
                }
            }
            SpellEffect::Damage(amount) => {
                // Damage spells always carry a target other than the caster here.
                if let Some(t) = other {
                    let (you, them, room_text) = damage_spell_text(spell, &caster.name, &t.name, amount);
                    resolution.tell(caster_id, you);
                    resolution.tell(t.id, them);
                    resolution.announce(room, &[caster_id, t.id], room_text);
                    self.damage_effects(world, t.id, amount, Some(caster_id), &mut resolution)?;
                }
            }
            SpellEffect::Cosmetic => {
                resolution.tell(caster_id, "You cast light, illuminating the area.");
                resolution.announce(
                    room,
                    &[caster_id],
                    format!("{} casts light, illuminating the area.", caster.name),
                );
            }
            SpellEffect::Touch => {
                if let Some(t) = target {
                    let (you, them, room_text) = touch_spell_text(spell, &caster.name, &t.name);
                    resolution.tell(caster_id, you);
                    if t.id != caster_id {
                        resolution.tell(t.id, them);
                    }
                    resolution.announce(room, &[caster_id, t.id], room_text);
                }
            }
        }

        debug!(caster = %caster.name, spell = spell.id(), cost, "spell cast");
        Ok(resolution)
    }

    // ------------------------------------------------------------------------
    // Resting
    // ------------------------------------------------------------------------

    fn resolve_rest(&self, world: &World, actor_id: ActorId) -> Result<Resolution, RulesError> {
        let actor = world.actor(actor_id)?;
        if actor.in_combat() {
            return Err(RulesError::InCombat("rest"));
        }
        if actor.resting {
            return Err(RulesError::AlreadyResting);
        }
        Ok(Resolution::new()
            .with_effect(Effect::RestStarted { actor_id })
            .with_effect(Effect::TimerScheduled {
                actor_id,
                kind: TimerKind::Recovery,
                delay: self.config.recovery_interval,
            })
            .notify(actor_id, "You sit down and rest.")
            .broadcast(
                actor.location,
                &[actor_id],
                format!("{} sits down and rests.", actor.name),
            ))
    }

    fn resolve_recovery_tick(&self, world: &World, actor_id: ActorId) -> Result<Resolution, RulesError> {
        let actor = world.actor(actor_id)?;
        let mut resolution = Resolution::new();
        if !actor.resting {
            return Ok(resolution);
        }

        let mut hit_points = actor.hit_points;
        let mut mana = actor.mana;
        let hp = hit_points.restore(self.config.recovery_hit_points);
        if hp > 0 {
            resolution.push(Effect::HpChanged {
                target_id: actor_id,
                amount: hp,
                new_current: hit_points.current,
                new_max: hit_points.maximum,
            });
            resolution.tell(actor_id, format!("You recover {hp} hit points while resting."));
        }
        let mp = mana.restore(self.config.recovery_mana);
        if mp > 0 {
            resolution.push(Effect::ManaChanged {
                actor_id,
                amount: mp,
                new_current: mana.current,
            });
            resolution.tell(actor_id, format!("You recover {mp} mana while resting."));
        }

        if !hit_points.is_full() || !mana.is_full() {
            resolution.push(Effect::TimerScheduled {
                actor_id,
                kind: TimerKind::Recovery,
                delay: self.config.recovery_interval,
            });
        }
        Ok(resolution)
    }

    fn resolve_stand(&self, world: &World, actor_id: ActorId) -> Result<Resolution, RulesError> {
        let actor = world.actor(actor_id)?;
        if !actor.resting {
            return Err(RulesError::NotResting);
        }
        Ok(Resolution::new()
            .with_effect(Effect::RestEnded { actor_id })
            .notify(actor_id, "You stand up.")
            .broadcast(actor.location, &[actor_id], format!("{} stands up.", actor.name)))
    }

    // ------------------------------------------------------------------------
    // Equipment and inventory
    // ------------------------------------------------------------------------

    fn resolve_wield(&self, world: &World, actor_id: ActorId, item_id: ItemId) -> Result<Resolution, RulesError> {
        let actor = world.actor(actor_id)?;
        if !within_reach(world, item_id, actor) {
            return Err(RulesError::ItemNotHere);
        }
        let item = world.item(item_id)?;
        let ItemKind::Weapon { hit_bonus, .. } = item.kind else {
            return Err(RulesError::NotAWeapon);
        };
        if actor.equipment.wielded() == Some(item_id) {
            return Ok(Resolution::new().notify(actor_id, format!("You are already wielding {}.", item.name)));
        }

        let mut resolution = Resolution::new();
        let mut hit = actor.hit_bonus;
        if let Some(current) = actor.equipment.wielded() {
            let current = world.item(current)?;
            resolution.push(Effect::ItemMoved {
                item_id: current.id,
                to: Container::Inventory(actor_id),
            });
            hit = self.stat_change(&mut resolution, actor_id, &current.kind, -1, hit, actor.armor_class).0;
            resolution.tell(actor_id, format!("You stop wielding {}.", current.name));
        }
        resolution.push(Effect::ItemMoved {
            item_id,
            to: Container::Equipped(actor_id, EquipmentSlot::Wield),
        });
        if hit_bonus != 0 {
            resolution.push(Effect::HitBonusChanged {
                actor_id,
                amount: hit_bonus,
                new_value: hit + hit_bonus,
            });
        }
        resolution.tell(actor_id, format!("You wield {}.", item.name));
        resolution.announce(
            actor.location,
            &[actor_id],
            format!("{} wields {}.", actor.name, item.name),
        );
        Ok(resolution)
    }

    fn resolve_unwield(&self, world: &World, actor_id: ActorId) -> Result<Resolution, RulesError> {
        let actor = world.actor(actor_id)?;
        let Some(weapon) = actor.equipment.wielded() else {
            return Err(RulesError::NothingWielded);
        };
        let item = world.item(weapon)?;
        let mut resolution = Resolution::new().with_effect(Effect::ItemMoved {
            item_id: weapon,
            to: Container::Inventory(actor_id),
        });
        self.stat_change(&mut resolution, actor_id, &item.kind, -1, actor.hit_bonus, actor.armor_class);
        resolution.tell(actor_id, format!("You stop wielding {}.", item.name));
        resolution.announce(
            actor.location,
            &[actor_id],
            format!("{} stops wielding {}.", actor.name, item.name),
        );
        Ok(resolution)
    }

    fn resolve_wear(&self, world: &World, actor_id: ActorId, item_id: ItemId) -> Result<Resolution, RulesError> {
        let actor = world.actor(actor_id)?;
        if !within_reach(world, item_id, actor) {
            return Err(RulesError::ItemNotHere);
        }
        let item = world.item(item_id)?;
        let ItemKind::Armor { slot, armor_bonus, .. } = item.kind else {
            return Err(RulesError::NotArmor);
        };
        if actor.equipment.get(slot) == Some(item_id) {
            return Ok(Resolution::new().notify(actor_id, format!("You are already wearing {}.", item.name)));
        }

        let mut resolution = Resolution::new();
        let mut armor_class = actor.armor_class;
        if let Some(current) = actor.equipment.get(slot) {
            let current = world.item(current)?;
            resolution.push(Effect::ItemMoved {
                item_id: current.id,
                to: Container::Inventory(actor_id),
            });
            armor_class = self
                .stat_change(&mut resolution, actor_id, &current.kind, -1, actor.hit_bonus, armor_class)
                .1;
            resolution.tell(actor_id, format!("You remove {}.", current.name));
        }
        resolution.push(Effect::ItemMoved {
            item_id,
            to: Container::Equipped(actor_id, slot),
        });
        if armor_bonus != 0 {
            resolution.push(Effect::ArmorClassChanged {
                actor_id,
                amount: armor_bonus,
                new_value: armor_class + armor_bonus,
            });
        }
        resolution.tell(actor_id, format!("You wear {}.", item.name));
        resolution.announce(
            actor.location,
            &[actor_id],
            format!("{} wears {}.", actor.name, item.name),
        );
        Ok(resolution)
    }

    fn resolve_remove(&self, world: &World, actor_id: ActorId, item_id: ItemId) -> Result<Resolution, RulesError> {
        let actor = world.actor(actor_id)?;
        match world.container_of(item_id) {
            Some(Container::Equipped(owner, _)) if owner == actor_id => {}
            _ => return Err(RulesError::NotEquipped),
        }
        let item = world.item(item_id)?;
        let mut resolution = Resolution::new().with_effect(Effect::ItemMoved {
            item_id,
            to: Container::Inventory(actor_id),
        });
        self.stat_change(&mut resolution, actor_id, &item.kind, -1, actor.hit_bonus, actor.armor_class);
        resolution.tell(actor_id, format!("You remove {}.", item.name));
        resolution.announce(
            actor.location,
            &[actor_id],
            format!("{} removes {}.", actor.name, item.name),
        );
        Ok(resolution)
    }

    /// Push the hit bonus or armor class change for equipping (`sign = 1`) or
    /// unequipping (`sign = -1`) an item. Returns the updated (hit bonus, armor class).
    fn stat_change(
        &self,
        resolution: &mut Resolution,
        actor_id: ActorId,
        kind: &ItemKind,
        sign: i32,
        hit_bonus: i32,
        armor_class: i32,
    ) -> (i32, i32) {
        match *kind {
            ItemKind::Weapon { hit_bonus: bonus, .. } if bonus != 0 => {
                let amount = sign * bonus;
                resolution.push(Effect::HitBonusChanged {
                    actor_id,
                    amount,
                    new_value: hit_bonus + amount,
                });
                (hit_bonus + amount, armor_class)
            }
            ItemKind::Armor { armor_bonus, .. } if armor_bonus != 0 => {
                let amount = sign * armor_bonus;
                resolution.push(Effect::ArmorClassChanged {
                    actor_id,
                    amount,
                    new_value: armor_class + amount,
                });
                (hit_bonus, armor_class + amount)
            }
            _ => (hit_bonus, armor_class),
        }
    }

    fn resolve_pick_up(&self, world: &World, actor_id: ActorId, item_id: ItemId) -> Result<Resolution, RulesError> {
        let actor = world.actor(actor_id)?;
        if world.container_of(item_id) != Some(Container::Room(actor.location)) {
            return Err(RulesError::ItemNotHere);
        }
        let item = world.item(item_id)?;
        Ok(Resolution::new()
            .with_effect(Effect::ItemMoved {
                item_id,
                to: Container::Inventory(actor_id),
            })
            .notify(actor_id, format!("You get {}.", item.name))
            .broadcast(
                actor.location,
                &[actor_id],
                format!("{} gets {}.", actor.name, item.name),
            ))
    }

    fn resolve_drop(&self, world: &World, actor_id: ActorId, item_id: ItemId) -> Result<Resolution, RulesError> {
        let actor = world.actor(actor_id)?;
        if world.container_of(item_id) != Some(Container::Inventory(actor_id)) {
            return Err(RulesError::ItemNotHere);
        }
        let item = world.item(item_id)?;
        Ok(Resolution::new()
            .with_effect(Effect::ItemMoved {
                item_id,
                to: Container::Room(actor.location),
            })
            .notify(actor_id, format!("You drop {}.", item.name))
            .broadcast(
                actor.location,
                &[actor_id],
                format!("{} drops {}.", actor.name, item.name),
            ))
    }

    fn resolve_use_item(&self, world: &World, actor_id: ActorId, item_id: ItemId) -> Result<Resolution, RulesError> {
        let actor = world.actor(actor_id)?;
        if world.container_of(item_id) != Some(Container::Inventory(actor_id)) {
            return Err(RulesError::ItemNotHere);
        }
        let item = world.item(item_id)?;
        let ItemKind::Consumable {
            uses,
            healing,
            radiation_healing,
        } = item.kind
        else {
            return Err(RulesError::NotConsumable);
        };

        let mut resolution = Resolution::new();
        resolution.tell(actor_id, format!("You use {}.", item.name));
        if healing > 0 {
            let restored = healing.min(actor.hit_points.missing());
            resolution.push(Effect::HpChanged {
                target_id: actor_id,
                amount: restored,
                new_current: actor.hit_points.current + restored,
                new_max: actor.hit_points.maximum,
            });
            resolution.tell(actor_id, format!("You recover {restored} hit points."));
        }
        if radiation_healing > 0 {
            resolution.tell(actor_id, "The radiation sickness eases.");
        }

        let mut remaining: Pool = uses;
        remaining.take(1);
        resolution.push(Effect::ItemUsed {
            item_id,
            uses_left: remaining.current,
        });
        if remaining.is_empty() {
            resolution.push(Effect::ItemDestroyed { item_id });
            resolution.tell(actor_id, format!("You have used up {}.", item.name));
        }
        resolution.announce(
            actor.location,
            &[actor_id],
            format!("{} uses {}.", actor.name, item.name),
        );
        Ok(resolution)
    }

    // ------------------------------------------------------------------------
    // Movement
    // ------------------------------------------------------------------------

    fn resolve_move(&self, world: &World, actor_id: ActorId, direction: Direction) -> Result<Resolution, RulesError> {
        let actor = world.actor(actor_id)?;
        if actor.in_combat() {
            return Err(RulesError::InCombat("move"));
        }
        if actor.resting {
            return Err(RulesError::Resting("move"));
        }
        let from = actor.location;
        let to = *world
            .room(from)?
            .exits
            .get(&direction)
            .ok_or(RulesError::NoExit)?;
        world.room(to)?;

        Ok(Resolution::new()
            .with_effect(Effect::ActorMoved { actor_id, from, to })
            .notify(actor_id, format!("You go {direction}."))
            .broadcast(from, &[actor_id], format!("{} leaves {direction}.", actor.name))
            .broadcast(to, &[actor_id], format!("{} arrives.", actor.name)))
    }
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

/// Whether an item is in the actor's inventory or equipment.
fn carried_by(world: &World, item_id: ItemId, actor_id: ActorId) -> bool {
    match world.container_of(item_id) {
        Some(Container::Inventory(owner)) | Some(Container::Equipped(owner, _)) => owner == actor_id,
        _ => false,
    }
}

/// Carried by the actor or lying in the actor's room.
fn within_reach(world: &World, item_id: ItemId, actor: &Actor) -> bool {
    carried_by(world, item_id, actor.id)
        || world.container_of(item_id) == Some(Container::Room(actor.location))
}

fn damage_spell_text(spell: Spell, caster: &str, target: &str, amount: i32) -> (String, String, String) {
    match spell {
        Spell::MindBlast => (
            format!("You blast {target}'s mind for {amount} damage!"),
            format!("{caster} blasts your mind for {amount} damage!"),
            format!("{caster} blasts {target}'s mind!"),
        ),
        _ => (
            format!("You cast {spell} at {target} for {amount} damage!"),
            format!("{caster} casts {spell} at you for {amount} damage!"),
            format!("{caster} casts {spell} at {target}!"),
        ),
    }
}

fn touch_spell_text(spell: Spell, caster: &str, target: &str) -> (String, String, String) {
    match spell {
        Spell::MindScan => (
            format!("You scan {target}'s mind."),
            format!("{caster} scans your mind."),
            format!("{caster} scans {target}'s mind!"),
        ),
        _ => (
            format!("You use {spell} on {target}."),
            format!("{caster} uses {spell} on you."),
            format!("{caster} uses {spell} on {target}!"),
        ),
    }
}

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

// ============================================================================
// Applying effects
// ============================================================================

/// Apply effects to the world, in order.
pub fn apply_effects(world: &mut World, effects: &[Effect]) {
    for effect in effects {
        apply_effect(world, effect);
    }
}

/// Apply a single effect to the world.
///
/// Effects naming an actor or item that no longer exists are skipped with a
/// warning.
pub fn apply_effect(world: &mut World, effect: &Effect) {
    if let Err(e) = try_apply_effect(world, effect) {
        warn!(error = %e, ?effect, "effect could not be applied");
    }
}

fn try_apply_effect(world: &mut World, effect: &Effect) -> Result<(), WorldError> {
    match effect {
        Effect::ClassChosen { actor_id, class } => {
            let actor = world.actor_mut(*actor_id)?;
            let data = class.data();
            actor.base_class = Some(*class);
            actor.abilities.apply(data.ability_bonuses);
            actor.hit_points.grow(data.hit_points);
            actor.mana.grow(data.mana);
            match data.grants {
                ClassGrants::Skills(skills) => actor.skills.extend(skills.iter().copied()),
                ClassGrants::Spells(spells) => {
                    for &(spell, entry) in spells {
                        actor.known_spells.insert(spell);
                        actor.spellbook.insert(spell, entry);
                    }
                }
            }
        }
        Effect::ExperienceGained {
            actor_id, new_total, ..
        } => {
            world.actor_mut(*actor_id)?.progression.experience = *new_total;
        }
        Effect::LevelGained {
            actor_id,
            new_level,
            growth,
            hp_gain,
            mana_gain,
        } => {
            let actor = world.actor_mut(*actor_id)?;
            actor.progression.level = *new_level;
            actor.abilities.apply(growth);
            actor.hit_points.grow(*hp_gain);
            actor.mana.grow(*mana_gain);
        }
        Effect::Remorted {
            actor_id,
            remorts,
            abilities,
            hp_bonus,
            mana_bonus,
        } => {
            let actor = world.actor_mut(*actor_id)?;
            actor.progression.remorts = *remorts;
            actor.progression.level = 1;
            actor.progression.experience = 0;
            actor.abilities = *abilities;
            actor.hit_points.grow(*hp_bonus);
            actor.hit_points.refill();
            actor.mana.grow(*mana_bonus);
            actor.mana.refill();
        }
        Effect::AdvancedClassChosen { actor_id, class } => {
            let actor = world.actor_mut(*actor_id)?;
            let data = class.data();
            actor.advanced_class = Some(*class);
            actor.abilities.apply(data.ability_bonuses);
            actor.hit_points.grow(data.hit_points);
            actor.mana.grow(data.mana);
        }
        Effect::CombatStarted {
            attacker_id,
            target_id,
            weapon_id,
        } => {
            world.actor(*target_id)?;
            world.actor_mut(*attacker_id)?.combat = Some(CombatSession {
                target: *target_id,
                weapon: *weapon_id,
            });
            world.actor_mut(*target_id)?.combat = Some(CombatSession {
                target: *attacker_id,
                weapon: None,
            });
        }
        Effect::CombatEnded {
            actor_id,
            opponent_id,
        } => {
            world.actor_mut(*actor_id)?.combat = None;
            world.timers.cancel(*actor_id, TimerKind::Combat);
            if let Some(opponent_id) = opponent_id {
                if let Some(opponent) = world.actors.get_mut(opponent_id) {
                    if opponent.combat_target() == Some(*actor_id) {
                        opponent.combat = None;
                        world.timers.cancel(*opponent_id, TimerKind::Combat);
                    }
                }
            }
        }
        Effect::HpChanged {
            target_id, amount, ..
        } => {
            let hp = &mut world.actor_mut(*target_id)?.hit_points;
            if *amount < 0 {
                hp.take(-*amount);
            } else {
                hp.restore(*amount);
            }
        }
        Effect::ManaChanged {
            actor_id, amount, ..
        } => {
            let mana = &mut world.actor_mut(*actor_id)?.mana;
            if *amount < 0 {
                mana.take(-*amount);
            } else {
                mana.restore(*amount);
            }
        }
        Effect::HitBonusChanged {
            actor_id, amount, ..
        } => {
            world.actor_mut(*actor_id)?.hit_bonus += amount;
        }
        Effect::ArmorClassChanged {
            actor_id, amount, ..
        } => {
            world.actor_mut(*actor_id)?.armor_class += amount;
        }
        Effect::Died {
            actor_id,
            respawn_room,
            ..
        } => {
            let actor = world.actor_mut(*actor_id)?;
            actor.combat = None;
            actor.resting = false;
            actor.hit_points.refill();
            if let Some(room) = respawn_room {
                actor.location = *room;
            }
            world.timers.cancel(*actor_id, TimerKind::Combat);
            world.timers.cancel(*actor_id, TimerKind::Recovery);
        }
        Effect::RestStarted { actor_id } => {
            world.actor_mut(*actor_id)?.resting = true;
        }
        Effect::RestEnded { actor_id } => {
            world.actor_mut(*actor_id)?.resting = false;
            world.timers.cancel(*actor_id, TimerKind::Recovery);
        }
        Effect::TimerScheduled {
            actor_id,
            kind,
            delay,
        } => {
            world.actor(*actor_id)?;
            world.timers.schedule(*actor_id, *kind, *delay);
        }
        Effect::ItemMoved { item_id, to } => {
            world.move_item(*item_id, *to)?;
        }
        Effect::ItemUsed { item_id, uses_left } => {
            if let ItemKind::Consumable { uses, .. } = &mut world.item_mut(*item_id)?.kind {
                *uses = Pool::with_current(*uses_left, uses.maximum);
            }
        }
        Effect::ItemDestroyed { item_id } => {
            world.destroy_item(*item_id)?;
        }
        Effect::ActorMoved { actor_id, to, .. } => {
            world.room(*to)?;
            world.actor_mut(*actor_id)?.location = *to;
        }
        Effect::AdvancedClassEligible { .. }
        | Effect::AttackHit { .. }
        | Effect::AttackMissed { .. }
        | Effect::SpellCast { .. } => {
            // Informational only
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::standard_item;
    use crate::world::{ActorKind, Room};

    struct Fixture {
        world: World,
        engine: RulesEngine,
        room: RoomId,
        hero: ActorId,
        ghoul: ActorId,
    }

    fn fixture() -> Fixture {
        let config = GameConfig::default();
        let mut world = World::new();
        let room = world.add_room(Room::new("Town Square", "Ash drifts across the square."));
        world.add_room(Room::new("Ruined Neighborhood", "Collapsed houses."));
        let hero = world.add_actor(config.new_actor("Hero", ActorKind::Player, room));
        let ghoul = world.add_actor(config.new_actor("Ghoul", ActorKind::Creature, room));
        Fixture {
            world,
            engine: RulesEngine::with_seed(config, 42),
            room,
            hero,
            ghoul,
        }
    }

    fn run(f: &mut Fixture, intent: Intent) -> Result<Resolution, RulesError> {
        let resolution = f.engine.resolve(&f.world, intent)?;
        apply_effects(&mut f.world, &resolution.effects);
        Ok(resolution)
    }

    #[test]
    fn test_choose_class_applies_bonuses_once() {
        let mut f = fixture();
        let hero = f.hero;
        run(&mut f, Intent::ChooseClass { actor_id: hero, class: BaseClass::Warrior }).unwrap();

        let actor = f.world.actor(hero).unwrap();
        assert_eq!(actor.abilities.strength, 12);
        assert_eq!(actor.abilities.constitution, 11);
        assert_eq!(actor.hit_points, Pool::new(120));
        assert_eq!(actor.skills.len(), 3);

        let err = run(&mut f, Intent::ChooseClass { actor_id: hero, class: BaseClass::Mage }).unwrap_err();
        assert_eq!(err, RulesError::AlreadyClassed(BaseClass::Warrior));
        assert_eq!(f.world.actor(hero).unwrap().abilities.intelligence, 10);
    }

    #[test]
    fn test_gain_experience_ignores_non_positive() {
        let mut f = fixture();
        let hero = f.hero;
        let res = run(&mut f, Intent::GainExperience { actor_id: hero, amount: 0 }).unwrap();
        assert!(res.effects.is_empty());
        let res = run(&mut f, Intent::GainExperience { actor_id: hero, amount: -50 }).unwrap();
        assert!(res.effects.is_empty());
        assert_eq!(f.world.actor(hero).unwrap().progression.experience, 0);
    }

    #[test]
    fn test_gain_experience_grants_every_level_paid_for() {
        let mut f = fixture();
        let hero = f.hero;
        let res = run(&mut f, Intent::GainExperience { actor_id: hero, amount: 4800 }).unwrap();
        let levels = res
            .effects
            .iter()
            .filter(|e| matches!(e, Effect::LevelGained { .. }))
            .count();
        assert_eq!(levels, 2);
        let actor = f.world.actor(hero).unwrap();
        assert_eq!(actor.level(), 3);
        // Unclassed actors gain exactly one hit point per level.
        assert_eq!(actor.hit_points, Pool::new(102));
    }

    #[test]
    fn test_level_ups_match_pending_levels() {
        for (start, amount) in [(1u8, 1199i64), (1, 1200), (3, 100_000), (48, 5_000_000)] {
            let mut f = fixture();
            let hero = f.hero;
            f.world.actor_mut(hero).unwrap().progression.level = start;
            let res = run(&mut f, Intent::GainExperience { actor_id: hero, amount }).unwrap();
            let gained = res
                .effects
                .iter()
                .filter(|e| matches!(e, Effect::LevelGained { .. }))
                .count();
            let expected = pending_levels(start, amount.unsigned_abs(), 50);
            assert_eq!(gained, usize::from(expected), "start {start}, amount {amount}");
            assert_eq!(f.world.actor(hero).unwrap().level(), start + expected);
        }
    }

    #[test]
    fn test_out_of_range_flee_chance_is_clamped() {
        let mut f = fixture();
        let (hero, ghoul) = (f.hero, f.ghoul);
        let config = GameConfig {
            flee_chance: 1.5,
            ..GameConfig::default()
        };
        f.engine = RulesEngine::with_seed(config, 42);
        assert_eq!(f.engine.config().flee_chance, 1.0);

        run(&mut f, Intent::StartCombat { attacker_id: hero, target_id: ghoul, weapon_id: None })
            .unwrap();
        let res = run(&mut f, Intent::Flee { actor_id: hero }).unwrap();
        assert!(res.effects.iter().any(|e| matches!(e, Effect::CombatEnded { .. })));
        assert!(!f.world.actor(hero).unwrap().in_combat());
    }

    #[test]
    fn test_level_up_at_cap_fails() {
        let mut f = fixture();
        let hero = f.hero;
        f.world.actor_mut(hero).unwrap().progression.level = 50;
        let err = run(&mut f, Intent::LevelUp { actor_id: hero }).unwrap_err();
        assert_eq!(err, RulesError::MaxLevel);
    }

    #[test]
    fn test_attack_self_is_invalid() {
        let mut f = fixture();
        let hero = f.hero;
        let err = run(
            &mut f,
            Intent::StartCombat { attacker_id: hero, target_id: hero, weapon_id: None },
        )
        .unwrap_err();
        assert!(matches!(err, RulesError::InvalidTarget(_)));
    }

    #[test]
    fn test_attack_bystander_is_invalid() {
        let mut f = fixture();
        let hero = f.hero;
        let config = GameConfig::default();
        let barkeep = f
            .world
            .add_actor(config.new_actor("Barkeep", ActorKind::Bystander, f.room));
        let err = run(
            &mut f,
            Intent::StartCombat { attacker_id: hero, target_id: barkeep, weapon_id: None },
        )
        .unwrap_err();
        assert!(matches!(err, RulesError::InvalidTarget(_)));
        assert!(!f.world.actor(hero).unwrap().in_combat());
    }

    #[test]
    fn test_start_combat_engages_both_and_schedules_rounds() {
        let mut f = fixture();
        let (hero, ghoul) = (f.hero, f.ghoul);
        run(&mut f, Intent::StartCombat { attacker_id: hero, target_id: ghoul, weapon_id: None })
            .unwrap();
        assert_eq!(f.world.actor(hero).unwrap().combat_target(), Some(ghoul));
        assert_eq!(f.world.actor(ghoul).unwrap().combat_target(), Some(hero));
        assert!(f.world.timers.is_scheduled(hero, TimerKind::Combat));
        assert!(f.world.timers.is_scheduled(ghoul, TimerKind::Combat));

        let err = run(&mut f, Intent::StartCombat { attacker_id: ghoul, target_id: hero, weapon_id: None })
            .unwrap_err();
        assert_eq!(err, RulesError::AlreadyEngaged(None));
    }

    #[test]
    fn test_damage_never_below_zero_and_death_respawns() {
        let mut f = fixture();
        let (hero, ghoul) = (f.hero, f.ghoul);
        run(&mut f, Intent::StartCombat { attacker_id: hero, target_id: ghoul, weapon_id: None })
            .unwrap();

        let res = run(&mut f, Intent::Damage { target_id: ghoul, amount: 500, source_id: Some(hero) })
            .unwrap();
        assert!(res.has_effect(|e| matches!(e, Effect::HpChanged { new_current: 0, .. })));
        assert!(res.has_effect(|e| matches!(e, Effect::Died { .. })));

        let ghoul_actor = f.world.actor(ghoul).unwrap();
        assert!(ghoul_actor.hit_points.is_full());
        assert!(!ghoul_actor.in_combat());
        assert_eq!(
            f.world.room(ghoul_actor.location).unwrap().name,
            "Ruined Neighborhood"
        );
        assert!(!f.world.actor(hero).unwrap().in_combat());
    }

    #[test]
    fn test_damage_short_of_zero_does_not_kill() {
        let mut f = fixture();
        let ghoul = f.ghoul;
        let res = run(&mut f, Intent::Damage { target_id: ghoul, amount: 99, source_id: None }).unwrap();
        assert!(!res.has_effect(|e| matches!(e, Effect::Died { .. })));
        assert_eq!(f.world.actor(ghoul).unwrap().hit_points.current, 1);
    }

    #[test]
    fn test_kill_awards_experience() {
        let mut f = fixture();
        let (hero, ghoul) = (f.hero, f.ghoul);
        f.world.actor_mut(ghoul).unwrap().experience_value = 1500;
        run(&mut f, Intent::Damage { target_id: ghoul, amount: 100, source_id: Some(hero) }).unwrap();
        let actor = f.world.actor(hero).unwrap();
        assert_eq!(actor.progression.experience, 1500);
        assert_eq!(actor.level(), 2);
    }

    #[test]
    fn test_combat_round_without_session_is_noop() {
        let mut f = fixture();
        let hero = f.hero;
        let res = run(&mut f, Intent::CombatRound { actor_id: hero }).unwrap();
        assert!(res.effects.is_empty());
    }

    #[test]
    fn test_rest_blocked_in_combat() {
        let mut f = fixture();
        let (hero, ghoul) = (f.hero, f.ghoul);
        run(&mut f, Intent::StartCombat { attacker_id: hero, target_id: ghoul, weapon_id: None })
            .unwrap();
        assert_eq!(
            run(&mut f, Intent::Rest { actor_id: hero }).unwrap_err(),
            RulesError::InCombat("rest")
        );
    }

    #[test]
    fn test_wear_replaces_slot_and_tracks_armor_class() {
        let mut f = fixture();
        let hero = f.hero;
        let room = f.room;
        let duster = f
            .world
            .add_item(standard_item("leather duster").unwrap(), Container::Room(room))
            .unwrap();
        let plate = f
            .world
            .add_item(standard_item("scrap metal armor").unwrap(), Container::Inventory(hero))
            .unwrap();

        run(&mut f, Intent::Wear { actor_id: hero, item_id: duster }).unwrap();
        assert_eq!(f.world.actor(hero).unwrap().armor_class, 2);

        run(&mut f, Intent::Wear { actor_id: hero, item_id: plate }).unwrap();
        let actor = f.world.actor(hero).unwrap();
        assert_eq!(actor.armor_class, 4);
        assert_eq!(actor.equipment.get(EquipmentSlot::Body), Some(plate));
        assert_eq!(f.world.container_of(duster), Some(Container::Inventory(hero)));

        run(&mut f, Intent::Remove { actor_id: hero, item_id: plate }).unwrap();
        assert_eq!(f.world.actor(hero).unwrap().armor_class, 0);
        assert_eq!(
            run(&mut f, Intent::Remove { actor_id: hero, item_id: plate }).unwrap_err(),
            RulesError::NotEquipped
        );
    }

    #[test]
    fn test_wield_rejects_non_weapons() {
        let mut f = fixture();
        let hero = f.hero;
        let canteen = f
            .world
            .add_item(standard_item("water canteen").unwrap(), Container::Inventory(hero))
            .unwrap();
        assert_eq!(
            run(&mut f, Intent::Wield { actor_id: hero, item_id: canteen }).unwrap_err(),
            RulesError::NotAWeapon
        );
        assert_eq!(
            run(&mut f, Intent::Unwield { actor_id: hero }).unwrap_err(),
            RulesError::NothingWielded
        );
    }

    #[test]
    fn test_use_consumable_until_empty() {
        let mut f = fixture();
        let hero = f.hero;
        let rad = f
            .world
            .add_item(standard_item("rad-away").unwrap(), Container::Inventory(hero))
            .unwrap();
        for _ in 0..2 {
            run(&mut f, Intent::UseItem { actor_id: hero, item_id: rad }).unwrap();
        }
        assert!(matches!(
            f.world.item(rad).unwrap().kind,
            ItemKind::Consumable { uses, .. } if uses.current == 1
        ));
        run(&mut f, Intent::UseItem { actor_id: hero, item_id: rad }).unwrap();
        assert!(f.world.item(rad).is_err());
    }

    #[test]
    fn test_move_requires_exit_and_freedom() {
        let mut f = fixture();
        let hero = f.hero;
        assert_eq!(
            run(&mut f, Intent::Move { actor_id: hero, direction: Direction::North }).unwrap_err(),
            RulesError::NoExit
        );
        let street = f.world.add_room(Room::new("Main Street", "A cracked road."));
        f.world.connect(f.room, Direction::West, street).unwrap();

        run(&mut f, Intent::Rest { actor_id: hero }).unwrap();
        assert_eq!(
            run(&mut f, Intent::Move { actor_id: hero, direction: Direction::West }).unwrap_err(),
            RulesError::Resting("move")
        );
        run(&mut f, Intent::Stand { actor_id: hero }).unwrap();
        run(&mut f, Intent::Move { actor_id: hero, direction: Direction::West }).unwrap();
        assert_eq!(f.world.actor(hero).unwrap().location, street);
    }

    #[test]
    fn test_messages_for_respects_exclusions() {
        let hero = ActorId::new();
        let ghoul = ActorId::new();
        let room = RoomId::new();
        let res = Resolution::new()
            .notify(hero, "You attack Ghoul!")
            .broadcast(room, &[hero], "Hero attacks Ghoul!");
        assert_eq!(res.messages_for(hero, room), vec!["You attack Ghoul!"]);
        assert_eq!(res.messages_for(ghoul, room), vec!["Hero attacks Ghoul!"]);
        assert!(res.messages_for(ghoul, RoomId::new()).is_empty());
    }

    #[test]
    fn test_ordinal() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(50), "50th");
        assert_eq!(ordinal(103), "103rd");
    }
}
