//! Class catalogue: the flat bonuses each base class and advanced class
//! grants, the skills or spells that come with them, and per-level growth.

use crate::spells::{Spell, SpellbookEntry};
use crate::world::{Ability, AdvancedClass, BaseClass, Skill};
use std::str::FromStr;
use thiserror::Error;

/// Returned when a class identifier is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown class: {0}")]
pub struct UnknownClass(pub String);

/// Abilities that come with a base class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassGrants {
    Skills(&'static [(Skill, u32)]),
    Spells(&'static [(Spell, SpellbookEntry)]),
}

/// Flat bonuses applied when a base class is chosen (and again on remort).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassData {
    pub ability_bonuses: &'static [(Ability, i32)],
    pub hit_points: i32,
    pub mana: i32,
    pub grants: ClassGrants,
}

/// Flat bonuses applied once when an advanced class is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvancedClassData {
    pub ability_bonuses: &'static [(Ability, i32)],
    pub hit_points: i32,
    pub mana: i32,
}

const fn entry(cost: i32) -> SpellbookEntry {
    SpellbookEntry { cost, level: 1 }
}

const MAGE_SPELLS: &[(Spell, SpellbookEntry)] = &[
    (Spell::Fireball, entry(15)),
    (Spell::MagicMissile, entry(10)),
    (Spell::Light, entry(5)),
];

const CLERIC_SPELLS: &[(Spell, SpellbookEntry)] = &[
    (Spell::Heal, entry(20)),
    (Spell::CureLight, entry(10)),
    (Spell::Bless, entry(15)),
];

const PSIONICIST_SPELLS: &[(Spell, SpellbookEntry)] = &[
    (Spell::MindBlast, entry(12)),
    (Spell::Telekinesis, entry(8)),
    (Spell::MindScan, entry(5)),
];

impl BaseClass {
    pub fn all() -> &'static [BaseClass] {
        &[
            BaseClass::Warrior,
            BaseClass::Mage,
            BaseClass::Cleric,
            BaseClass::Thief,
            BaseClass::Psionicist,
        ]
    }

    pub fn data(&self) -> ClassData {
        match self {
            BaseClass::Warrior => ClassData {
                ability_bonuses: &[(Ability::Strength, 2), (Ability::Constitution, 1)],
                hit_points: 20,
                mana: 0,
                grants: ClassGrants::Skills(&[
                    (Skill::Sword, 10),
                    (Skill::Shield, 10),
                    (Skill::Armor, 10),
                ]),
            },
            BaseClass::Mage => ClassData {
                ability_bonuses: &[(Ability::Intelligence, 3)],
                hit_points: 0,
                mana: 50,
                grants: ClassGrants::Spells(MAGE_SPELLS),
            },
            BaseClass::Cleric => ClassData {
                ability_bonuses: &[(Ability::Wisdom, 3)],
                hit_points: 10,
                mana: 30,
                grants: ClassGrants::Spells(CLERIC_SPELLS),
            },
            BaseClass::Thief => ClassData {
                ability_bonuses: &[(Ability::Dexterity, 3)],
                hit_points: 10,
                mana: 0,
                grants: ClassGrants::Skills(&[
                    (Skill::Stealth, 15),
                    (Skill::Lockpick, 10),
                    (Skill::Sneak, 15),
                ]),
            },
            BaseClass::Psionicist => ClassData {
                ability_bonuses: &[(Ability::Intelligence, 2), (Ability::Wisdom, 2)],
                hit_points: 10,
                mana: 40,
                grants: ClassGrants::Spells(PSIONICIST_SPELLS),
            },
        }
    }

    /// Ability growth applied on every level-up.
    pub fn level_growth(&self) -> &'static [(Ability, i32)] {
        match self {
            BaseClass::Warrior => &[(Ability::Strength, 1), (Ability::Constitution, 1)],
            BaseClass::Mage => &[(Ability::Intelligence, 2)],
            BaseClass::Cleric => &[(Ability::Wisdom, 2)],
            BaseClass::Thief => &[(Ability::Dexterity, 2)],
            BaseClass::Psionicist => &[(Ability::Intelligence, 1), (Ability::Wisdom, 1)],
        }
    }

    /// Base hit points gained per level, before the constitution bonus.
    pub fn hit_point_base(&self) -> i32 {
        match self {
            BaseClass::Warrior => 10,
            BaseClass::Cleric | BaseClass::Thief | BaseClass::Psionicist => 6,
            BaseClass::Mage => 4,
        }
    }

    /// The two specializations open to this class.
    pub fn advanced_classes(&self) -> [AdvancedClass; 2] {
        match self {
            BaseClass::Warrior => [AdvancedClass::Warlord, AdvancedClass::Juggernaut],
            BaseClass::Mage => [AdvancedClass::Warlock, AdvancedClass::Arcanist],
            BaseClass::Cleric => [AdvancedClass::Inquisitor, AdvancedClass::Hierophant],
            BaseClass::Thief => [AdvancedClass::Assassin, AdvancedClass::Ashstalker],
            BaseClass::Psionicist => [AdvancedClass::Mindreaver, AdvancedClass::Seer],
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BaseClass::Warrior => "Masters of combat and weapons, skilled in melee fighting",
            BaseClass::Mage => "Wielders of arcane magic, powerful but fragile",
            BaseClass::Cleric => "Divine spellcasters, healers and support specialists",
            BaseClass::Thief => "Stealthy and agile, experts in subterfuge and precision",
            BaseClass::Psionicist => "Masters of the mind, using mental powers to control others",
        }
    }
}

/// Valid advanced classes for an actor's base class. Empty when unclassed.
pub fn valid_advanced_classes(base: Option<BaseClass>) -> Vec<AdvancedClass> {
    base.map(|b| b.advanced_classes().to_vec()).unwrap_or_default()
}

impl FromStr for BaseClass {
    type Err = UnknownClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        BaseClass::all()
            .iter()
            .copied()
            .find(|c| c.id() == wanted)
            .ok_or_else(|| UnknownClass(s.trim().to_string()))
    }
}

impl AdvancedClass {
    pub fn all() -> &'static [AdvancedClass] {
        &[
            AdvancedClass::Warlord,
            AdvancedClass::Juggernaut,
            AdvancedClass::Warlock,
            AdvancedClass::Arcanist,
            AdvancedClass::Inquisitor,
            AdvancedClass::Hierophant,
            AdvancedClass::Assassin,
            AdvancedClass::Ashstalker,
            AdvancedClass::Mindreaver,
            AdvancedClass::Seer,
        ]
    }

    pub fn data(&self) -> AdvancedClassData {
        use Ability::*;
        match self {
            AdvancedClass::Warlord => AdvancedClassData {
                ability_bonuses: &[(Strength, 3), (Charisma, 2)],
                hit_points: 50,
                mana: 0,
            },
            AdvancedClass::Juggernaut => AdvancedClassData {
                ability_bonuses: &[(Strength, 2), (Constitution, 3)],
                hit_points: 100,
                mana: 0,
            },
            AdvancedClass::Warlock => AdvancedClassData {
                ability_bonuses: &[(Intelligence, 3), (Charisma, 2)],
                hit_points: 0,
                mana: 100,
            },
            AdvancedClass::Arcanist => AdvancedClassData {
                ability_bonuses: &[(Intelligence, 4)],
                hit_points: 0,
                mana: 150,
            },
            AdvancedClass::Inquisitor => AdvancedClassData {
                ability_bonuses: &[(Wisdom, 3), (Strength, 2)],
                hit_points: 30,
                mana: 50,
            },
            AdvancedClass::Hierophant => AdvancedClassData {
                ability_bonuses: &[(Wisdom, 4)],
                hit_points: 0,
                mana: 100,
            },
            AdvancedClass::Assassin => AdvancedClassData {
                ability_bonuses: &[(Dexterity, 3), (Strength, 2)],
                hit_points: 20,
                mana: 0,
            },
            AdvancedClass::Ashstalker => AdvancedClassData {
                ability_bonuses: &[(Dexterity, 4), (Wisdom, 2)],
                hit_points: 30,
                mana: 0,
            },
            AdvancedClass::Mindreaver => AdvancedClassData {
                ability_bonuses: &[(Intelligence, 3), (Wisdom, 3)],
                hit_points: 0,
                mana: 80,
            },
            AdvancedClass::Seer => AdvancedClassData {
                ability_bonuses: &[(Wisdom, 4), (Intelligence, 2)],
                hit_points: 0,
                mana: 120,
            },
        }
    }
}

impl FromStr for AdvancedClass {
    type Err = UnknownClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        AdvancedClass::all()
            .iter()
            .copied()
            .find(|c| c.id() == wanted)
            .ok_or_else(|| UnknownClass(s.trim().to_string()))
    }
}
