//! Ashfall world types.
//!
//! Contains the types for representing game state: actors and their stats,
//! classes, items and equipment, rooms, and the in-memory object store that
//! owns all of them.

use crate::dice::DamageDice;
use crate::scheduler::TimerQueue;
use crate::spells::{Spell, SpellbookEntry};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for actors (player characters and creatures).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub Uuid);

impl ActorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoomId(pub Uuid);

impl RoomId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors raised by the object store when an id does not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("No such actor: {0}")]
    UnknownActor(ActorId),
    #[error("No such room: {0}")]
    UnknownRoom(RoomId),
    #[error("No room named '{0}'")]
    UnknownRoomName(String),
    #[error("No such item: {0}")]
    UnknownItem(ItemId),
    #[error("Equipment slot {slot} is already occupied")]
    SlotOccupied { actor: ActorId, slot: EquipmentSlot },
}

// ============================================================================
// Ability Scores
// ============================================================================

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Intelligence,
    Wisdom,
    Dexterity,
    Constitution,
    Charisma,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Ability::Strength,
        Ability::Intelligence,
        Ability::Wisdom,
        Ability::Dexterity,
        Ability::Constitution,
        Ability::Charisma,
    ];

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Charisma => "CHA",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Ability::Strength => "Strength",
            Ability::Intelligence => "Intelligence",
            Ability::Wisdom => "Wisdom",
            Ability::Dexterity => "Dexterity",
            Ability::Constitution => "Constitution",
            Ability::Charisma => "Charisma",
        }
    }
}

/// Default value of every ability score.
pub const DEFAULT_ABILITY_SCORE: i32 = 10;

/// Ability scores for an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub charisma: i32,
}

impl AbilityScores {
    pub fn new(
        strength: i32,
        intelligence: i32,
        wisdom: i32,
        dexterity: i32,
        constitution: i32,
        charisma: i32,
    ) -> Self {
        Self {
            strength,
            intelligence,
            wisdom,
            dexterity,
            constitution,
            charisma,
        }
    }

    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn set(&mut self, ability: Ability, value: i32) {
        match ability {
            Ability::Strength => self.strength = value,
            Ability::Intelligence => self.intelligence = value,
            Ability::Wisdom => self.wisdom = value,
            Ability::Dexterity => self.dexterity = value,
            Ability::Constitution => self.constitution = value,
            Ability::Charisma => self.charisma = value,
        }
    }

    /// Add `delta` to one score.
    pub fn adjust(&mut self, ability: Ability, delta: i32) {
        self.set(ability, self.get(ability) + delta);
    }

    /// Apply a list of per-ability deltas.
    pub fn apply(&mut self, deltas: &[(Ability, i32)]) {
        for &(ability, delta) in deltas {
            self.adjust(ability, delta);
        }
    }

    /// Floored half of the distance from the default score: `(score - 10) // 2`.
    pub fn bonus(&self, ability: Ability) -> i32 {
        (self.get(ability) - DEFAULT_ABILITY_SCORE).div_euclid(2)
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        let d = DEFAULT_ABILITY_SCORE;
        Self::new(d, d, d, d, d, d)
    }
}

// ============================================================================
// Pools (hit points, mana, movement)
// ============================================================================

/// A max-bounded resource. `0 <= current <= maximum` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub current: i32,
    pub maximum: i32,
}

impl Pool {
    /// A full pool.
    pub fn new(maximum: i32) -> Self {
        let maximum = maximum.max(0);
        Self {
            current: maximum,
            maximum,
        }
    }

    /// A pool with an explicit current value, clamped into range.
    pub fn with_current(current: i32, maximum: i32) -> Self {
        let maximum = maximum.max(0);
        Self {
            current: current.clamp(0, maximum),
            maximum,
        }
    }

    /// Remove up to `amount`, never going below zero. Returns the amount removed.
    pub fn take(&mut self, amount: i32) -> i32 {
        let taken = amount.clamp(0, self.current);
        self.current -= taken;
        taken
    }

    /// Restore up to `amount`, capped at the maximum. Returns the amount restored.
    pub fn restore(&mut self, amount: i32) -> i32 {
        let restored = amount.clamp(0, self.missing());
        self.current += restored;
        restored
    }

    /// Raise (or lower) both the current value and the maximum by `amount`.
    pub fn grow(&mut self, amount: i32) {
        self.maximum = (self.maximum + amount).max(0);
        self.current = (self.current + amount).clamp(0, self.maximum);
    }

    pub fn refill(&mut self) {
        self.current = self.maximum;
    }

    pub fn missing(&self) -> i32 {
        self.maximum - self.current
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.maximum
    }

    pub fn is_empty(&self) -> bool {
        self.current <= 0
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.maximum)
    }
}

// ============================================================================
// Progression
// ============================================================================

/// Level, experience and remort counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    pub level: u8,
    pub experience: u64,
    pub remorts: u32,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            level: 1,
            experience: 0,
            remorts: 0,
        }
    }
}

// ============================================================================
// Classes and Skills
// ============================================================================

/// Base classes. Chosen once per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BaseClass {
    Warrior,
    Mage,
    Cleric,
    Thief,
    Psionicist,
}

impl BaseClass {
    pub fn name(&self) -> &'static str {
        match self {
            BaseClass::Warrior => "Warrior",
            BaseClass::Mage => "Mage",
            BaseClass::Cleric => "Cleric",
            BaseClass::Thief => "Thief",
            BaseClass::Psionicist => "Psionicist",
        }
    }

    /// Lowercase identifier used by commands.
    pub fn id(&self) -> &'static str {
        match self {
            BaseClass::Warrior => "warrior",
            BaseClass::Mage => "mage",
            BaseClass::Cleric => "cleric",
            BaseClass::Thief => "thief",
            BaseClass::Psionicist => "psionicist",
        }
    }
}

impl fmt::Display for BaseClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Advanced classes, unlocked by remorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AdvancedClass {
    Warlord,
    Juggernaut,
    Warlock,
    Arcanist,
    Inquisitor,
    Hierophant,
    Assassin,
    Ashstalker,
    Mindreaver,
    Seer,
}

impl AdvancedClass {
    pub fn name(&self) -> &'static str {
        match self {
            AdvancedClass::Warlord => "Warlord",
            AdvancedClass::Juggernaut => "Juggernaut",
            AdvancedClass::Warlock => "Warlock",
            AdvancedClass::Arcanist => "Arcanist",
            AdvancedClass::Inquisitor => "Inquisitor",
            AdvancedClass::Hierophant => "Hierophant",
            AdvancedClass::Assassin => "Assassin",
            AdvancedClass::Ashstalker => "Ashstalker",
            AdvancedClass::Mindreaver => "Mindreaver",
            AdvancedClass::Seer => "Seer",
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            AdvancedClass::Warlord => "warlord",
            AdvancedClass::Juggernaut => "juggernaut",
            AdvancedClass::Warlock => "warlock",
            AdvancedClass::Arcanist => "arcanist",
            AdvancedClass::Inquisitor => "inquisitor",
            AdvancedClass::Hierophant => "hierophant",
            AdvancedClass::Assassin => "assassin",
            AdvancedClass::Ashstalker => "ashstalker",
            AdvancedClass::Mindreaver => "mindreaver",
            AdvancedClass::Seer => "seer",
        }
    }

    /// The base class this specialization belongs to.
    pub fn base(&self) -> BaseClass {
        match self {
            AdvancedClass::Warlord | AdvancedClass::Juggernaut => BaseClass::Warrior,
            AdvancedClass::Warlock | AdvancedClass::Arcanist => BaseClass::Mage,
            AdvancedClass::Inquisitor | AdvancedClass::Hierophant => BaseClass::Cleric,
            AdvancedClass::Assassin | AdvancedClass::Ashstalker => BaseClass::Thief,
            AdvancedClass::Mindreaver | AdvancedClass::Seer => BaseClass::Psionicist,
        }
    }
}

impl fmt::Display for AdvancedClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Trained skills granted by non-casting classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Skill {
    Sword,
    Shield,
    Armor,
    Stealth,
    Lockpick,
    Sneak,
}

impl Skill {
    pub fn name(&self) -> &'static str {
        match self {
            Skill::Sword => "sword",
            Skill::Shield => "shield",
            Skill::Armor => "armor",
            Skill::Stealth => "stealth",
            Skill::Lockpick => "lockpick",
            Skill::Sneak => "sneak",
        }
    }
}

// ============================================================================
// Equipment
// ============================================================================

/// Fixed equipment slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EquipmentSlot {
    Head,
    Neck,
    Body,
    About,
    Arms,
    Hands,
    FingerLeft,
    FingerRight,
    Wield,
    Shield,
    Legs,
    Feet,
}

impl EquipmentSlot {
    pub const ALL: [EquipmentSlot; 12] = [
        EquipmentSlot::Head,
        EquipmentSlot::Neck,
        EquipmentSlot::Body,
        EquipmentSlot::About,
        EquipmentSlot::Arms,
        EquipmentSlot::Hands,
        EquipmentSlot::FingerLeft,
        EquipmentSlot::FingerRight,
        EquipmentSlot::Wield,
        EquipmentSlot::Shield,
        EquipmentSlot::Legs,
        EquipmentSlot::Feet,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EquipmentSlot::Head => "head",
            EquipmentSlot::Neck => "neck",
            EquipmentSlot::Body => "body",
            EquipmentSlot::About => "about",
            EquipmentSlot::Arms => "arms",
            EquipmentSlot::Hands => "hands",
            EquipmentSlot::FingerLeft => "finger_l",
            EquipmentSlot::FingerRight => "finger_r",
            EquipmentSlot::Wield => "wield",
            EquipmentSlot::Shield => "shield",
            EquipmentSlot::Legs => "legs",
            EquipmentSlot::Feet => "feet",
        }
    }
}

impl fmt::Display for EquipmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for EquipmentSlot {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        EquipmentSlot::ALL
            .into_iter()
            .find(|slot| slot.name() == s)
            .ok_or(())
    }
}

/// What an actor has equipped, one item per slot.
///
/// Only [`World::move_item`] mutates this, keeping it in step with the
/// world's ownership map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    slots: BTreeMap<EquipmentSlot, ItemId>,
}

impl Equipment {
    pub fn get(&self, slot: EquipmentSlot) -> Option<ItemId> {
        self.slots.get(&slot).copied()
    }

    pub fn wielded(&self) -> Option<ItemId> {
        self.get(EquipmentSlot::Wield)
    }

    pub fn slot_of(&self, item: ItemId) -> Option<EquipmentSlot> {
        self.slots
            .iter()
            .find(|(_, id)| **id == item)
            .map(|(slot, _)| *slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EquipmentSlot, ItemId)> + '_ {
        self.slots.iter().map(|(slot, id)| (*slot, *id))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn insert(&mut self, slot: EquipmentSlot, item: ItemId) {
        self.slots.insert(slot, item);
    }

    fn remove(&mut self, slot: EquipmentSlot) -> Option<ItemId> {
        self.slots.remove(&slot)
    }
}

// ============================================================================
// Items
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponType {
    Melee,
    Ranged,
    Energy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmmoType {
    Standard,
    Energy,
}

/// Category-specific item attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Weapon {
        damage: DamageDice,
        hit_bonus: i32,
        weapon_type: WeaponType,
        durability: i32,
    },
    Armor {
        armor_bonus: i32,
        slot: EquipmentSlot,
        durability: i32,
        radiation_protection: i32,
    },
    Consumable {
        uses: Pool,
        healing: i32,
        radiation_healing: i32,
    },
    Ammo {
        ammo_type: AmmoType,
        quantity: u32,
    },
    Currency {
        value: u32,
    },
}

impl ItemKind {
    pub fn category(&self) -> &'static str {
        match self {
            ItemKind::Weapon { .. } => "weapon",
            ItemKind::Armor { .. } => "armor",
            ItemKind::Consumable { .. } => "consumable",
            ItemKind::Ammo { .. } => "ammo",
            ItemKind::Currency { .. } => "currency",
        }
    }
}

/// An item in the world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
    pub kind: ItemKind,
}

impl Item {
    pub fn new(name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            aliases: Vec::new(),
            description: String::new(),
            kind,
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Case-insensitive match against the name or any alias.
    pub fn matches_name(&self, query: &str) -> bool {
        names_match(&self.name, &self.aliases, query)
    }

    pub fn is_weapon(&self) -> bool {
        matches!(self.kind, ItemKind::Weapon { .. })
    }

    pub fn weapon_damage(&self) -> Option<DamageDice> {
        match self.kind {
            ItemKind::Weapon { damage, .. } => Some(damage),
            _ => None,
        }
    }
}

fn names_match(name: &str, aliases: &[String], query: &str) -> bool {
    let query = query.trim();
    !query.is_empty()
        && (name.eq_ignore_ascii_case(query) || aliases.iter().any(|a| a.eq_ignore_ascii_case(query)))
}

/// Where an item currently lives. Every item has exactly one container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Container {
    Room(RoomId),
    Inventory(ActorId),
    Equipped(ActorId, EquipmentSlot),
}

// ============================================================================
// Actors
// ============================================================================

/// What sort of actor this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    Player,
    Creature,
    /// Townsfolk and other scenery that cannot be attacked.
    Bystander,
}

impl ActorKind {
    pub fn combat_capable(&self) -> bool {
        !matches!(self, ActorKind::Bystander)
    }
}

/// An active combat engagement, held by both participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatSession {
    pub target: ActorId,
    pub weapon: Option<ItemId>,
}

/// A character or creature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
    pub kind: ActorKind,
    pub location: RoomId,
    /// Where this actor wakes up after dying. Falls back to the configured respawn room.
    pub home: Option<RoomId>,

    pub abilities: AbilityScores,
    pub hit_points: Pool,
    pub mana: Pool,
    pub movement: Pool,
    pub armor_class: i32,
    pub hit_bonus: i32,
    pub damage_bonus: i32,

    pub progression: Progression,
    /// Experience awarded to whoever kills this actor.
    pub experience_value: u64,

    pub base_class: Option<BaseClass>,
    pub advanced_class: Option<AdvancedClass>,

    pub equipment: Equipment,
    pub skills: BTreeMap<Skill, u32>,
    pub known_spells: BTreeSet<Spell>,
    pub spellbook: BTreeMap<Spell, SpellbookEntry>,

    pub resting: bool,
    pub combat: Option<CombatSession>,
}

impl Actor {
    /// Create an actor with default ability scores and zero progression.
    pub fn new(name: impl Into<String>, kind: ActorKind, location: RoomId) -> Self {
        Self {
            id: ActorId::new(),
            name: name.into(),
            aliases: Vec::new(),
            description: String::new(),
            kind,
            location,
            home: None,
            abilities: AbilityScores::default(),
            hit_points: Pool::new(100),
            mana: Pool::new(0),
            movement: Pool::new(100),
            armor_class: 0,
            hit_bonus: 0,
            damage_bonus: 0,
            progression: Progression::default(),
            experience_value: 0,
            base_class: None,
            advanced_class: None,
            equipment: Equipment::default(),
            skills: BTreeMap::new(),
            known_spells: BTreeSet::new(),
            spellbook: BTreeMap::new(),
            resting: false,
            combat: None,
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_hit_points(mut self, maximum: i32) -> Self {
        self.hit_points = Pool::new(maximum);
        self
    }

    pub fn with_combat_stats(mut self, armor_class: i32, hit_bonus: i32, damage_bonus: i32) -> Self {
        self.armor_class = armor_class;
        self.hit_bonus = hit_bonus;
        self.damage_bonus = damage_bonus;
        self
    }

    pub fn with_experience_value(mut self, experience: u64) -> Self {
        self.experience_value = experience;
        self
    }

    pub fn with_home(mut self, room: RoomId) -> Self {
        self.home = Some(room);
        self
    }

    pub fn matches_name(&self, query: &str) -> bool {
        names_match(&self.name, &self.aliases, query)
    }

    pub fn in_combat(&self) -> bool {
        self.combat.is_some()
    }

    pub fn combat_target(&self) -> Option<ActorId> {
        self.combat.map(|c| c.target)
    }

    pub fn level(&self) -> u8 {
        self.progression.level
    }

    pub fn knows_spell(&self, spell: Spell) -> bool {
        self.known_spells.contains(&spell)
    }
}

// ============================================================================
// Rooms
// ============================================================================

/// Compass and vertical directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Up,
    Down,
}

impl Direction {
    pub fn name(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Direction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "n" | "north" => Ok(Direction::North),
            "s" | "south" => Ok(Direction::South),
            "e" | "east" => Ok(Direction::East),
            "w" | "west" => Ok(Direction::West),
            "u" | "up" => Ok(Direction::Up),
            "d" | "down" => Ok(Direction::Down),
            _ => Err(()),
        }
    }
}

/// A location in the world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub description: String,
    pub exits: BTreeMap<Direction, RoomId>,
}

impl Room {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: RoomId::new(),
            name: name.into(),
            description: description.into(),
            exits: BTreeMap::new(),
        }
    }
}

// ============================================================================
// World (object store)
// ============================================================================

/// The in-memory object store: every actor, room and item, who owns which
/// item, and the pending timers.
#[derive(Debug, Clone, Default)]
pub struct World {
    pub actors: HashMap<ActorId, Actor>,
    pub rooms: HashMap<RoomId, Room>,
    pub items: HashMap<ItemId, Item>,
    containers: HashMap<ItemId, Container>,
    pub timers: TimerQueue,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- rooms -------------------------------------------------------------

    pub fn add_room(&mut self, room: Room) -> RoomId {
        let id = room.id;
        self.rooms.insert(id, room);
        id
    }

    pub fn room(&self, id: RoomId) -> Result<&Room, WorldError> {
        self.rooms.get(&id).ok_or(WorldError::UnknownRoom(id))
    }

    pub fn room_by_name(&self, name: &str) -> Option<RoomId> {
        let mut matches: Vec<&Room> = self
            .rooms
            .values()
            .filter(|r| r.name.eq_ignore_ascii_case(name))
            .collect();
        matches.sort_by_key(|r| r.id);
        matches.first().map(|r| r.id)
    }

    /// Link two rooms with exits in both directions.
    pub fn connect(&mut self, from: RoomId, direction: Direction, to: RoomId) -> Result<(), WorldError> {
        self.room(to)?;
        self.rooms
            .get_mut(&from)
            .ok_or(WorldError::UnknownRoom(from))?
            .exits
            .insert(direction, to);
        if let Some(back) = self.rooms.get_mut(&to) {
            back.exits.insert(direction.opposite(), from);
        }
        Ok(())
    }

    // ---- actors ------------------------------------------------------------

    pub fn add_actor(&mut self, actor: Actor) -> ActorId {
        let id = actor.id;
        self.actors.insert(id, actor);
        id
    }

    pub fn actor(&self, id: ActorId) -> Result<&Actor, WorldError> {
        self.actors.get(&id).ok_or(WorldError::UnknownActor(id))
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Result<&mut Actor, WorldError> {
        self.actors.get_mut(&id).ok_or(WorldError::UnknownActor(id))
    }

    /// Actors standing in a room, ordered by name then id.
    pub fn actors_in(&self, room: RoomId) -> Vec<&Actor> {
        let mut found: Vec<&Actor> = self.actors.values().filter(|a| a.location == room).collect();
        found.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        found
    }

    /// Find an actor in a room by name or alias.
    pub fn find_actor_in_room(&self, room: RoomId, query: &str) -> Option<ActorId> {
        self.actors_in(room)
            .into_iter()
            .find(|a| a.matches_name(query))
            .map(|a| a.id)
    }

    // ---- items -------------------------------------------------------------

    /// Place a new item into a container.
    pub fn add_item(&mut self, item: Item, container: Container) -> Result<ItemId, WorldError> {
        self.check_container(container)?;
        let id = item.id;
        self.items.insert(id, item);
        self.attach(id, container);
        Ok(id)
    }

    pub fn item(&self, id: ItemId) -> Result<&Item, WorldError> {
        self.items.get(&id).ok_or(WorldError::UnknownItem(id))
    }

    pub fn item_mut(&mut self, id: ItemId) -> Result<&mut Item, WorldError> {
        self.items.get_mut(&id).ok_or(WorldError::UnknownItem(id))
    }

    pub fn container_of(&self, id: ItemId) -> Option<Container> {
        self.containers.get(&id).copied()
    }

    /// Items held by a container, ordered by name then id.
    pub fn items_in(&self, container: Container) -> Vec<&Item> {
        let mut found: Vec<&Item> = self
            .containers
            .iter()
            .filter(|(_, c)| **c == container)
            .filter_map(|(id, _)| self.items.get(id))
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        found
    }

    /// Everything an actor carries: inventory first, then equipped items.
    pub fn carried_by(&self, actor: ActorId) -> Vec<&Item> {
        let mut found = self.items_in(Container::Inventory(actor));
        let mut equipped: Vec<&Item> = self
            .containers
            .iter()
            .filter(|(_, c)| matches!(c, Container::Equipped(owner, _) if *owner == actor))
            .filter_map(|(id, _)| self.items.get(id))
            .collect();
        equipped.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        found.extend(equipped);
        found
    }

    /// Find an item by name in the first container (in order) that has one.
    pub fn find_item(&self, containers: &[Container], query: &str) -> Option<ItemId> {
        containers.iter().find_map(|c| {
            self.items_in(*c)
                .into_iter()
                .find(|i| i.matches_name(query))
                .map(|i| i.id)
        })
    }

    /// Move an item between containers.
    ///
    /// Either the whole move happens or nothing changes: the destination is
    /// validated before the item leaves its source.
    pub fn move_item(&mut self, id: ItemId, destination: Container) -> Result<(), WorldError> {
        self.item(id)?;
        self.check_container(destination)?;
        if let Container::Equipped(actor, slot) = destination {
            match self.actor(actor)?.equipment.get(slot) {
                Some(occupant) if occupant != id => {
                    return Err(WorldError::SlotOccupied { actor, slot });
                }
                _ => {}
            }
        }
        self.detach(id);
        self.attach(id, destination);
        Ok(())
    }

    /// Remove an item from the world entirely.
    pub fn destroy_item(&mut self, id: ItemId) -> Result<Item, WorldError> {
        let item = self.items.remove(&id).ok_or(WorldError::UnknownItem(id))?;
        self.detach(id);
        Ok(item)
    }

    fn check_container(&self, container: Container) -> Result<(), WorldError> {
        match container {
            Container::Room(room) => self.room(room).map(|_| ()),
            Container::Inventory(actor) | Container::Equipped(actor, _) => {
                self.actor(actor).map(|_| ())
            }
        }
    }

    fn detach(&mut self, id: ItemId) {
        if let Some(Container::Equipped(actor, slot)) = self.containers.remove(&id) {
            if let Some(owner) = self.actors.get_mut(&actor) {
                owner.equipment.remove(slot);
            }
        }
    }

    fn attach(&mut self, id: ItemId, container: Container) {
        if let Container::Equipped(actor, slot) = container {
            if let Some(owner) = self.actors.get_mut(&actor) {
                owner.equipment.insert(slot, id);
            }
        }
        self.containers.insert(id, container);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::standard_item;

    fn two_room_world() -> (World, RoomId, RoomId) {
        let mut world = World::new();
        let square = world.add_room(Room::new("Town Square", "Dust and ruin."));
        let street = world.add_room(Room::new("Main Street", "A cracked road."));
        world.connect(square, Direction::West, street).unwrap();
        (world, square, street)
    }

    #[test]
    fn test_ability_bonus_floors() {
        let mut scores = AbilityScores::default();
        assert_eq!(scores.bonus(Ability::Constitution), 0);
        scores.constitution = 13;
        assert_eq!(scores.bonus(Ability::Constitution), 1);
        scores.constitution = 7;
        assert_eq!(scores.bonus(Ability::Constitution), -2);
    }

    #[test]
    fn test_pool_bounds() {
        let mut hp = Pool::new(20);
        assert_eq!(hp.take(25), 20);
        assert_eq!(hp.current, 0);
        assert_eq!(hp.restore(50), 20);
        assert!(hp.is_full());
        hp.grow(5);
        assert_eq!(hp, Pool::with_current(25, 25));
        hp.grow(-30);
        assert_eq!(hp, Pool::with_current(0, 0));
    }

    #[test]
    fn test_connect_creates_both_exits() {
        let (world, square, street) = two_room_world();
        assert_eq!(world.room(square).unwrap().exits[&Direction::West], street);
        assert_eq!(world.room(street).unwrap().exits[&Direction::East], square);
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("n".parse::<Direction>(), Ok(Direction::North));
        assert_eq!("West".parse::<Direction>(), Ok(Direction::West));
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_move_item_keeps_equipment_in_sync() {
        let (mut world, square, _) = two_room_world();
        let hero = world.add_actor(Actor::new("Hero", ActorKind::Player, square));
        let pipe = world
            .add_item(standard_item("rusty pipe").unwrap(), Container::Room(square))
            .unwrap();

        world
            .move_item(pipe, Container::Equipped(hero, EquipmentSlot::Wield))
            .unwrap();
        assert_eq!(world.actor(hero).unwrap().equipment.wielded(), Some(pipe));
        assert!(world.items_in(Container::Room(square)).is_empty());

        world.move_item(pipe, Container::Inventory(hero)).unwrap();
        assert_eq!(world.actor(hero).unwrap().equipment.wielded(), None);
        assert_eq!(world.container_of(pipe), Some(Container::Inventory(hero)));
    }

    #[test]
    fn test_move_into_occupied_slot_changes_nothing() {
        let (mut world, square, _) = two_room_world();
        let hero = world.add_actor(Actor::new("Hero", ActorKind::Player, square));
        let pipe = world
            .add_item(
                standard_item("rusty pipe").unwrap(),
                Container::Equipped(hero, EquipmentSlot::Wield),
            )
            .unwrap();
        let club = world
            .add_item(standard_item("scrap metal club").unwrap(), Container::Room(square))
            .unwrap();

        let err = world
            .move_item(club, Container::Equipped(hero, EquipmentSlot::Wield))
            .unwrap_err();
        assert!(matches!(err, WorldError::SlotOccupied { .. }));
        assert_eq!(world.container_of(club), Some(Container::Room(square)));
        assert_eq!(world.actor(hero).unwrap().equipment.wielded(), Some(pipe));
    }

    #[test]
    fn test_find_by_alias_is_case_insensitive() {
        let (mut world, square, _) = two_room_world();
        let ghoul = world.add_actor(
            Actor::new("Feral Ghoul", ActorKind::Creature, square).with_aliases(["ghoul"]),
        );
        assert_eq!(world.find_actor_in_room(square, "GHOUL"), Some(ghoul));
        assert_eq!(world.find_actor_in_room(square, "rat"), None);
        assert_eq!(world.find_actor_in_room(square, ""), None);
    }

    #[test]
    fn test_destroy_item_clears_ownership() {
        let (mut world, square, _) = two_room_world();
        let caps = world
            .add_item(standard_item("bottle cap").unwrap(), Container::Room(square))
            .unwrap();
        world.destroy_item(caps).unwrap();
        assert!(world.items_in(Container::Room(square)).is_empty());
        assert_eq!(world.container_of(caps), None);
    }
}
