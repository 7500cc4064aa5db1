//! QA tests for classes, experience, level-ups and remorts.
//!
//! Run with: `cargo test -p ashfall-core --test qa_progression`

use ashfall_core::testing::{assert_hp, assert_mana, assert_saw, TestHarness, DEFAULT_SEED};
use ashfall_core::world::{Pool, Skill};
use ashfall_core::{AdvancedClass, BaseClass, Effect, GameConfig, Intent, RulesError, Spell};

// =============================================================================
// Choosing a class
// =============================================================================

#[test]
fn test_each_class_applies_its_bonuses() {
    let cases = [
        (BaseClass::Warrior, 120, 0),
        (BaseClass::Mage, 100, 50),
        (BaseClass::Cleric, 110, 30),
        (BaseClass::Thief, 110, 0),
        (BaseClass::Psionicist, 110, 40),
    ];
    for (class, hp, mana) in cases {
        let mut harness = TestHarness::new();
        harness.make_class(harness.hero, class);
        assert_hp(&harness, harness.hero, hp, hp);
        assert_mana(&harness, harness.hero, mana, mana);
        assert_eq!(harness.hero().base_class, Some(class));
    }
}

#[test]
fn test_mage_learns_spells_with_costs() {
    let mut harness = TestHarness::new();
    harness.make_class(harness.hero, BaseClass::Mage);
    let hero = harness.hero();
    assert_eq!(hero.abilities.intelligence, 13);
    assert!(hero.knows_spell(Spell::Fireball));
    assert!(hero.knows_spell(Spell::MagicMissile));
    assert!(hero.knows_spell(Spell::Light));
    assert_eq!(hero.spellbook[&Spell::Fireball].cost, 15);
    assert!(hero.skills.is_empty());
}

#[test]
fn test_thief_gets_skills() {
    let mut harness = TestHarness::new();
    harness.make_class(harness.hero, BaseClass::Thief);
    let hero = harness.hero();
    assert_eq!(hero.abilities.dexterity, 13);
    assert_eq!(hero.skills.get(&Skill::Stealth), Some(&15));
    assert_eq!(hero.skills.get(&Skill::Lockpick), Some(&10));
    assert!(hero.known_spells.is_empty());
}

#[test]
fn test_second_class_choice_is_refused() {
    let mut harness = TestHarness::new();
    harness.input("chooseclass warrior");
    let lines = harness.input_lines("chooseclass mage");
    assert_saw(&lines, "You are already a Warrior!");
    assert_eq!(harness.hero().abilities.intelligence, 10);
    assert_hp(&harness, harness.hero, 120, 120);
}

#[test]
fn test_invalid_class_lists_options() {
    let mut harness = TestHarness::new();
    let lines = harness.input_lines("chooseclass bard");
    assert_saw(&lines, "Invalid class 'bard'");
    assert_saw(&lines, "warrior, mage, cleric, thief, psionicist");
    assert_eq!(harness.hero().base_class, None);
}

// =============================================================================
// Experience and levels
// =============================================================================

#[test]
fn test_level_up_at_threshold() {
    let mut harness = TestHarness::new();
    harness.make_class(harness.hero, BaseClass::Warrior);

    harness
        .execute(Intent::GainExperience { actor_id: harness.hero, amount: 1199 })
        .unwrap();
    assert_eq!(harness.hero().level(), 1);

    let resolution = harness
        .execute(Intent::GainExperience { actor_id: harness.hero, amount: 1 })
        .unwrap();
    let lines = harness.lines_for(&resolution, harness.hero);
    assert_saw(&lines, "You have gained a level! You are now level 2!");
    assert_saw(&lines, "You gain 11 hit points and 0 mana.");

    let hero = harness.hero();
    assert_eq!(hero.level(), 2);
    assert_eq!(hero.abilities.strength, 13);
    assert_eq!(hero.abilities.constitution, 12);
    // CON 12 after growth: +1 bonus and 10 base.
    assert_hp(&harness, harness.hero, 131, 131);
}

#[test]
fn test_big_experience_gain_levels_repeatedly() {
    let mut harness = TestHarness::new();
    harness.make_class(harness.hero, BaseClass::Mage);
    let resolution = harness
        .execute(Intent::GainExperience { actor_id: harness.hero, amount: 10_800 })
        .unwrap();

    let levels: Vec<u8> = resolution
        .effects
        .iter()
        .filter_map(|e| match e {
            Effect::LevelGained { new_level, .. } => Some(*new_level),
            _ => None,
        })
        .collect();
    assert_eq!(levels, vec![2, 3, 4]);
    assert_eq!(harness.hero().progression.experience, 10_800);
    // INT 13 -> 15 -> 17 -> 19; mana gains 17, 18, 19.
    assert_eq!(harness.hero().abilities.intelligence, 19);
    assert_mana(&harness, harness.hero, 104, 104);
}

#[test]
fn test_level_command_shows_progress() {
    let mut harness = TestHarness::new();
    harness
        .execute(Intent::GainExperience { actor_id: harness.hero, amount: 200 })
        .unwrap();
    let lines = harness.input_lines("level");
    assert_eq!(lines[0], "Level: 1 | Experience: 200 | Remorts: 0");
    assert_eq!(lines[1], "Experience needed for next level: 1000");
}

#[test]
fn test_no_levels_past_cap() {
    let mut harness = TestHarness::new();
    harness.set_level(harness.hero, 50);
    let resolution = harness
        .execute(Intent::GainExperience { actor_id: harness.hero, amount: 10_000_000 })
        .unwrap();
    assert!(!resolution.has_effect(|e| matches!(e, Effect::LevelGained { .. })));
    assert_eq!(harness.hero().level(), 50);
    assert_eq!(
        harness.execute(Intent::LevelUp { actor_id: harness.hero }).unwrap_err(),
        RulesError::MaxLevel
    );
    assert_saw(&harness.input_lines("lvl"), "You are at maximum level!");
}

// =============================================================================
// Remorts and advanced classes
// =============================================================================

#[test]
fn test_remort_requires_max_level() {
    let mut harness = TestHarness::new();
    harness.set_level(harness.hero, 49);
    let lines = harness.input_lines("remort");
    assert_saw(&lines, "You must reach maximum level before you can remort!");
    assert_eq!(harness.hero().progression.remorts, 0);
}

#[test]
fn test_remort_resets_abilities_but_keeps_growth() {
    let mut harness = TestHarness::new();
    harness.make_class(harness.hero, BaseClass::Warrior);
    harness
        .execute(Intent::GainExperience { actor_id: harness.hero, amount: 10_000_000 })
        .unwrap();
    assert_eq!(harness.hero().level(), 50);
    let max_hp = harness.hero().hit_points.maximum;
    assert!(max_hp > 1000, "fifty levels of warrior growth, got {max_hp}");
    harness.actor_mut(harness.hero).hit_points.take(40);
    harness.actor_mut(harness.hero).movement.take(30);
    let movement = harness.hero().movement;

    let lines = harness.input_lines("remort");
    assert_saw(&lines, "You have remorted! This is your 1st remort.");

    let hero = harness.hero();
    assert_eq!(hero.level(), 1);
    assert_eq!(hero.progression.experience, 0);
    assert_eq!(hero.progression.remorts, 1);
    assert_eq!(hero.abilities.strength, 12);
    assert_eq!(hero.abilities.constitution, 11);
    assert_eq!(hero.abilities.wisdom, 10);
    // The class bonus lands on top of everything already earned.
    assert_eq!(hero.hit_points, Pool::new(max_hp + 20));
    assert_eq!(hero.movement, movement);
    assert_eq!(hero.base_class, Some(BaseClass::Warrior));
}

#[test]
fn test_remort_keeps_advanced_class_pools() {
    let mut harness = TestHarness::new();
    harness.make_class(harness.hero, BaseClass::Warrior);
    harness.actor_mut(harness.hero).progression.remorts = 50;
    harness.input("advancedclass warlord");
    assert_hp(&harness, harness.hero, 170, 170);

    harness.set_level(harness.hero, 50);
    harness.input("remort");
    let hero = harness.hero();
    assert_eq!(hero.advanced_class, Some(AdvancedClass::Warlord));
    assert_eq!(hero.abilities.strength, 12);
    assert_hp(&harness, harness.hero, 190, 190);
}

#[test]
fn test_advanced_class_needs_remorts() {
    let mut harness = TestHarness::new();
    harness.make_class(harness.hero, BaseClass::Warrior);
    let lines = harness.input_lines("advancedclass warlord");
    assert_saw(&lines, "You need 50 remorts to choose an advanced class!");
    assert_eq!(harness.hero().advanced_class, None);
}

#[test]
fn test_advanced_class_applies_bonuses_once() {
    let mut harness = TestHarness::new();
    harness.make_class(harness.hero, BaseClass::Warrior);
    harness.actor_mut(harness.hero).progression.remorts = 50;

    let lines = harness.input_lines("advclass warlord");
    assert_saw(&lines, "You have chosen the warlord advanced class!");
    let hero = harness.hero();
    assert_eq!(hero.advanced_class, Some(AdvancedClass::Warlord));
    assert_eq!(hero.abilities.strength, 15);
    assert_eq!(hero.abilities.charisma, 12);
    assert_hp(&harness, harness.hero, 170, 170);

    let err = harness
        .execute(Intent::ChooseAdvancedClass {
            actor_id: harness.hero,
            class: AdvancedClass::Juggernaut,
        })
        .unwrap_err();
    assert_eq!(err, RulesError::AlreadyAdvanced(AdvancedClass::Warlord));
    assert_eq!(harness.hero().abilities.strength, 15);
}

#[test]
fn test_advanced_class_must_match_base() {
    let mut harness = TestHarness::new();
    harness.make_class(harness.hero, BaseClass::Mage);
    harness.actor_mut(harness.hero).progression.remorts = 50;

    let lines = harness.input_lines("advancedclass warlord");
    assert_saw(&lines, "Valid options: warlock, arcanist");
    assert_eq!(harness.hero().advanced_class, None);

    let lines = harness.input_lines("advancedclass dragonlord");
    assert_saw(&lines, "Invalid advanced class 'dragonlord'");
}

#[test]
fn test_remort_announces_eligibility() {
    let config = GameConfig::default().with_advanced_class_remorts(1);
    let mut harness = TestHarness::with_config(config, DEFAULT_SEED);
    harness.make_class(harness.hero, BaseClass::Cleric);
    harness.set_level(harness.hero, 50);

    let lines = harness.input_lines("remort");
    assert_saw(&lines, "You are now eligible for advanced class selection!");
    let lines = harness.input_lines("advancedclass");
    assert_saw(&lines, "Available advanced classes for Cleric: inquisitor, hierophant");
}

#[test]
fn test_fiftieth_remort_unlocks_warlord() {
    let mut harness = TestHarness::new();
    harness.make_class(harness.hero, BaseClass::Warrior);
    harness.actor_mut(harness.hero).progression.remorts = 49;
    harness.set_level(harness.hero, 50);

    let lines = harness.input_lines("remort");
    assert_saw(&lines, "This is your 50th remort.");
    assert_saw(&lines, "You are now eligible for advanced class selection!");
    assert_eq!(harness.hero().progression.remorts, 50);

    assert_saw(
        &harness.input_lines("advancedclass warlord"),
        "You have chosen the warlord advanced class!",
    );
    assert_eq!(harness.hero().advanced_class, Some(AdvancedClass::Warlord));
}
