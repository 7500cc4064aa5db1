//! Experience thresholds and per-level growth.
//!
//! These are pure functions; [`crate::rules::RulesEngine`] turns their results
//! into effects.

use crate::world::{Ability, AbilityScores, BaseClass};
use serde::{Deserialize, Serialize};

/// Total experience needed to reach `level`.
///
/// `1000 * (level - 1)^2 * 1.2`, i.e. `1200 * (level - 1)^2`; zero for level 1
/// and below.
pub fn exp_required(level: u32) -> u64 {
    if level <= 1 {
        return 0;
    }
    let steps = u64::from(level - 1);
    1200 * steps * steps
}

/// Hit points gained on reaching a new level.
///
/// `max(1, (CON - 10) // 2 + base)` for classed actors; exactly 1 otherwise.
pub fn hp_gain(class: Option<BaseClass>, abilities: &AbilityScores) -> i32 {
    match class {
        Some(class) => (abilities.bonus(Ability::Constitution) + class.hit_point_base()).max(1),
        None => 1,
    }
}

/// Mana gained on reaching a new level. Only casters gain mana.
pub fn mana_gain(class: Option<BaseClass>, abilities: &AbilityScores) -> i32 {
    let int = abilities.intelligence.div_euclid(2);
    let wis = abilities.wisdom.div_euclid(2);
    match class {
        Some(BaseClass::Mage) => int + 10,
        Some(BaseClass::Cleric) => wis + 8,
        Some(BaseClass::Psionicist) => int + wis + 6,
        _ => 0,
    }
}

/// Everything that changes on a single level-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelGrowth {
    /// Ability scores after class growth.
    pub abilities: AbilityScores,
    pub hit_points: i32,
    pub mana: i32,
}

/// Compute one level of growth. Class ability growth is applied first and the
/// hit point and mana gains are computed from the grown scores.
pub fn level_growth(class: Option<BaseClass>, abilities: &AbilityScores) -> LevelGrowth {
    let mut grown = *abilities;
    if let Some(class) = class {
        grown.apply(class.level_growth());
    }
    LevelGrowth {
        abilities: grown,
        hit_points: hp_gain(class, &grown),
        mana: mana_gain(class, &grown),
    }
}

/// How many levels an actor at `level` with `experience` total would gain,
/// stopping at `max_level`.
pub fn pending_levels(level: u8, experience: u64, max_level: u8) -> u8 {
    let mut reached = level;
    while reached < max_level && experience >= exp_required(u32::from(reached) + 1) {
        reached += 1;
    }
    reached - level
}
