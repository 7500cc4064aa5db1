//! Spell catalogue.
//!
//! Every spell a class can grant is a variant of [`Spell`], and its effect is
//! decided by an exhaustive match, so there is no way to learn a spell that
//! has no effect handler.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// Returned when a spell name does not match any spell.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown spell: {0}")]
pub struct UnknownSpellName(pub String);

/// All castable spells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Spell {
    // Mage
    Fireball,
    MagicMissile,
    Light,
    // Cleric
    Heal,
    CureLight,
    Bless,
    // Psionicist
    MindBlast,
    Telekinesis,
    MindScan,
}

/// What a spell does when it resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpellEffect {
    /// Restore hit points to the target (or the caster), capped at max.
    Heal(i32),
    /// Permanently raise the target's (or caster's) hit bonus.
    HitBonus(i32),
    /// Deal damage to the target.
    Damage(i32),
    /// Flavour only; no mechanical change.
    Cosmetic,
    /// Must be aimed at someone but changes nothing.
    Touch,
}

/// Cost and level of a spell as recorded in a spellbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellbookEntry {
    pub cost: i32,
    pub level: u8,
}

impl Spell {
    pub const ALL: [Spell; 9] = [
        Spell::Fireball,
        Spell::MagicMissile,
        Spell::Light,
        Spell::Heal,
        Spell::CureLight,
        Spell::Bless,
        Spell::MindBlast,
        Spell::Telekinesis,
        Spell::MindScan,
    ];

    /// Identifier with underscores, e.g. `magic_missile`.
    pub fn id(&self) -> &'static str {
        match self {
            Spell::Fireball => "fireball",
            Spell::MagicMissile => "magic_missile",
            Spell::Light => "light",
            Spell::Heal => "heal",
            Spell::CureLight => "cure_light",
            Spell::Bless => "bless",
            Spell::MindBlast => "mind_blast",
            Spell::Telekinesis => "telekinesis",
            Spell::MindScan => "mind_scan",
        }
    }

    /// Name as players see it, e.g. `magic missile`.
    pub fn name(&self) -> &'static str {
        match self {
            Spell::Fireball => "fireball",
            Spell::MagicMissile => "magic missile",
            Spell::Light => "light",
            Spell::Heal => "heal",
            Spell::CureLight => "cure light",
            Spell::Bless => "bless",
            Spell::MindBlast => "mind blast",
            Spell::Telekinesis => "telekinesis",
            Spell::MindScan => "mind scan",
        }
    }

    pub fn effect(&self) -> SpellEffect {
        match self {
            Spell::Heal => SpellEffect::Heal(20),
            Spell::CureLight => SpellEffect::Heal(10),
            Spell::Bless => SpellEffect::HitBonus(2),
            Spell::Fireball => SpellEffect::Damage(15),
            Spell::MagicMissile => SpellEffect::Damage(8),
            Spell::MindBlast => SpellEffect::Damage(12),
            Spell::Light => SpellEffect::Cosmetic,
            Spell::Telekinesis | Spell::MindScan => SpellEffect::Touch,
        }
    }

    /// Whether casting needs an explicit target.
    pub fn requires_target(&self) -> bool {
        matches!(self.effect(), SpellEffect::Damage(_) | SpellEffect::Touch)
    }

    /// Whether the spell may be aimed at someone other than the caster.
    pub fn accepts_target(&self) -> bool {
        !matches!(self.effect(), SpellEffect::Cosmetic)
    }
}

impl fmt::Display for Spell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

static SPELL_NAMES: LazyLock<HashMap<String, Spell>> = LazyLock::new(|| {
    let mut names = HashMap::new();
    for spell in Spell::ALL {
        names.insert(spell.id().to_string(), spell);
        names.insert(spell.name().to_string(), spell);
    }
    names
});

/// Look up a spell by id or display name (case-insensitive).
pub fn find_spell(name: &str) -> Option<Spell> {
    let normalized = name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    SPELL_NAMES.get(&normalized).copied()
}

impl FromStr for Spell {
    type Err = UnknownSpellName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        find_spell(s).ok_or_else(|| UnknownSpellName(s.trim().to_string()))
    }
}
