//! QA tests for the command layer: resting, items, equipment and moving
//! around the Ashfall map.
//!
//! Run with: `cargo test -p ashfall-core --test qa_commands`

use ashfall_core::content::{build_world, spawn_player};
use ashfall_core::scheduler::TimerKind;
use ashfall_core::testing::{assert_hp, assert_mana, assert_saw, TestHarness};
use ashfall_core::world::{Container, EquipmentSlot};
use ashfall_core::{BaseClass, GameConfig, GameSession, RulesEngine};

// =============================================================================
// Resting
// =============================================================================

#[test]
fn test_rest_and_stand() {
    let mut harness = TestHarness::new();
    assert_saw(&harness.input_lines("rest"), "You sit down and rest.");
    assert!(harness.hero().resting);
    assert_saw(&harness.input_lines("sleep"), "You are already resting.");
    assert_saw(&harness.input_lines("stand"), "You stand up.");
    assert!(!harness.hero().resting);
    assert_saw(&harness.input_lines("stand"), "You are not resting.");
}

#[test]
fn test_resting_recovers_hit_points_and_mana() {
    let mut harness = TestHarness::new();
    harness.make_class(harness.hero, BaseClass::Cleric);
    harness.actor_mut(harness.hero).hit_points.take(12);
    harness.actor_mut(harness.hero).mana.take(30);
    harness.input("rest");

    let ticks = harness.advance(10);
    assert_eq!(ticks.len(), 1);
    let lines = harness.lines_for(&ticks[0], harness.hero);
    assert_saw(&lines, "You recover 5 hit points while resting.");
    assert_saw(&lines, "You recover 3 mana while resting.");
    assert_hp(&harness, harness.hero, 103, 110);
    assert_mana(&harness, harness.hero, 3, 30);

    harness.advance(20);
    assert_hp(&harness, harness.hero, 110, 110);
    assert_mana(&harness, harness.hero, 9, 30);
}

#[test]
fn test_recovery_stops_when_full() {
    let mut harness = TestHarness::new();
    harness.actor_mut(harness.hero).hit_points.take(3);
    harness.input("rest");
    let ticks = harness.advance(1000);
    assert_eq!(ticks.len(), 1);
    assert_hp(&harness, harness.hero, 100, 100);
    assert!(!harness.session.world.timers.is_scheduled(harness.hero, TimerKind::Recovery));
}

#[test]
fn test_standing_stops_recovery() {
    let mut harness = TestHarness::new();
    harness.actor_mut(harness.hero).hit_points.take(50);
    harness.input("rest");
    harness.advance(10);
    harness.input("stand");
    assert!(harness.advance(100).is_empty());
    assert_hp(&harness, harness.hero, 55, 100);
}

#[test]
fn test_no_rest_in_combat() {
    let mut harness = TestHarness::new();
    harness.input("kill rival");
    assert_saw(&harness.input_lines("rest"), "You cannot rest while in combat!");
    assert!(!harness.hero().resting);
}

// =============================================================================
// Items and equipment
// =============================================================================

#[test]
fn test_get_and_drop() {
    let mut harness = TestHarness::new();
    let room = harness.room;
    let cap = harness.give_item("bottle cap", Container::Room(room));

    assert_saw(&harness.input_lines("inventory"), "You are carrying nothing.");
    assert_saw(&harness.input_lines("get cap"), "You get bottle cap.");
    assert_eq!(harness.session.world.container_of(cap), Some(Container::Inventory(harness.hero)));

    let lines = harness.input_lines("i");
    assert_eq!(lines, vec!["You are carrying:", "  bottle cap"]);

    assert_saw(&harness.input_lines("drop cap"), "You drop bottle cap.");
    assert_eq!(harness.session.world.container_of(cap), Some(Container::Room(room)));
    assert_saw(&harness.input_lines("drop cap"), "You aren't carrying 'cap'.");
}

#[test]
fn test_wield_swaps_weapons() {
    let mut harness = TestHarness::new();
    let hero = harness.hero;
    let pipe = harness.give_item("rusty pipe", Container::Inventory(hero));
    let club = harness.give_item("scrap metal club", Container::Inventory(hero));

    assert_saw(&harness.input_lines("wield pipe"), "You wield rusty pipe.");
    let lines = harness.input_lines("hold club");
    assert_saw(&lines, "You stop wielding rusty pipe.");
    assert_saw(&lines, "You wield scrap metal club.");
    assert_eq!(harness.hero().equipment.wielded(), Some(club));
    assert_eq!(harness.session.world.container_of(pipe), Some(Container::Inventory(hero)));

    assert_saw(&harness.input_lines("unwield"), "You stop wielding scrap metal club.");
    assert_saw(&harness.input_lines("unwield"), "You are not wielding anything.");
}

#[test]
fn test_wear_and_remove_armor() {
    let mut harness = TestHarness::new();
    let hero = harness.hero;
    harness.give_item("combat helmet", Container::Inventory(hero));
    harness.give_item("rusty pipe", Container::Inventory(hero));

    assert_saw(&harness.input_lines("wear pipe"), "That's not armor!");
    assert_saw(&harness.input_lines("wield helmet"), "That's not a weapon!");
    assert_saw(&harness.input_lines("wear helmet"), "You wear combat helmet.");
    assert_eq!(harness.hero().armor_class, 1);
    assert!(harness.hero().equipment.get(EquipmentSlot::Head).is_some());

    let lines = harness.input_lines("eq");
    assert_saw(&lines, "head: combat helmet");
    assert_saw(&lines, "body: <empty>");

    assert_saw(&harness.input_lines("remove helmet"), "You remove combat helmet.");
    assert_eq!(harness.hero().armor_class, 0);
    assert_saw(&harness.input_lines("remove helmet"), "You are not wearing that.");
}

#[test]
fn test_wear_from_the_floor() {
    let mut harness = TestHarness::new();
    let room = harness.room;
    let duster = harness.give_item("leather duster", Container::Room(room));
    harness.input("wear duster");
    assert_eq!(
        harness.session.world.container_of(duster),
        Some(Container::Equipped(harness.hero, EquipmentSlot::Body))
    );
    assert_eq!(harness.hero().armor_class, 2);
}

#[test]
fn test_use_medical_kit() {
    let mut harness = TestHarness::new();
    let hero = harness.hero;
    harness.give_item("medical kit", Container::Inventory(hero));
    harness.actor_mut(hero).hit_points.take(70);
    let lines = harness.input_lines("use medkit");
    assert_saw(&lines, "You recover 50 hit points.");
    assert_hp(&harness, hero, 80, 100);
    assert_saw(&harness.input_lines("use pipe"), "You aren't carrying 'pipe'.");
}

#[test]
fn test_cannot_use_non_consumables() {
    let mut harness = TestHarness::new();
    let hero = harness.hero;
    harness.give_item("bottle cap", Container::Inventory(hero));
    assert_saw(&harness.input_lines("use cap"), "You can't use that.");
}

// =============================================================================
// Information
// =============================================================================

#[test]
fn test_stats_display() {
    let mut harness = TestHarness::new();
    harness.input("chooseclass thief");
    let lines = harness.input_lines("score");
    assert_eq!(lines[0], "Level: 1 | Class: Thief | Remorts: 0");
    assert_eq!(lines[1], "Advanced Class: None");
    assert_saw(&lines, "Dexterity: 13");
    assert_saw(&lines, "Hit Points: 110/110");
    assert_saw(&lines, "Armor Class: 0");
}

#[test]
fn test_classes_and_help() {
    let mut harness = TestHarness::new();
    let lines = harness.input_lines("classes");
    assert_saw(&lines, "Warrior - Masters of combat");
    assert_saw(&lines, "+2 Strength, +1 Constitution, +20 HP");
    assert_saw(&lines, "Advanced: Mindreaver, Seer");
    assert_saw(&harness.input_lines("help"), "Available commands:");
}

#[test]
fn test_unknown_command() {
    let mut harness = TestHarness::new();
    assert_saw(&harness.input_lines("xyzzy"), "Huh? 'xyzzy' is not a command.");
    assert!(harness.input_lines("").is_empty());
}

#[test]
fn test_say_and_emote_reach_the_room() {
    let mut harness = TestHarness::new();
    let resolution = harness.input("say howdy");
    assert_eq!(harness.lines_for(&resolution, harness.rival), vec!["Hero says, \"howdy\""]);
    let resolution = harness.input(":tips his hat");
    assert_eq!(harness.lines_for(&resolution, harness.rival), vec!["Hero tips his hat"]);
}

// =============================================================================
// The Ashfall map
// =============================================================================

fn ashfall() -> (GameSession, ashfall_core::ActorId) {
    let config = GameConfig::default();
    let mut world = build_world(&config).unwrap();
    let player = spawn_player(&mut world, &config, "Drifter").unwrap();
    (GameSession::new(world, RulesEngine::with_seed(config, 99)), player)
}

fn lines(session: &mut GameSession, player: ashfall_core::ActorId, line: &str) -> Vec<String> {
    let resolution = session.handle_line(player, line);
    let room = session.world.actor(player).unwrap().location;
    resolution
        .messages_for(player, room)
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_walk_to_the_wasteland() {
    let (mut session, player) = ashfall();
    let start = lines(&mut session, player, "look");
    assert_eq!(start[0], "Town Square");
    assert_saw(&start, "Exits: north, south, east, west");
    assert_saw(&start, "You see: bottle cap, rusty pipe");

    assert_saw(&lines(&mut session, player, "up"), "You cannot go that way.");
    let street = lines(&mut session, player, "west");
    assert_saw(&street, "You go west.");
    assert_saw(&street, "Main Street");
    let waste = lines(&mut session, player, "go w");
    assert_saw(&waste, "Wasteland");
    assert_saw(&waste, "feral ghoul is here.");
}

#[test]
fn test_resting_blocks_movement() {
    let (mut session, player) = ashfall();
    lines(&mut session, player, "rest");
    assert_saw(&lines(&mut session, player, "n"), "You cannot move while resting. Stand up first.");
}

#[test]
fn test_prospector_will_not_fight() {
    let (mut session, player) = ashfall();
    lines(&mut session, player, "north");
    assert_saw(
        &lines(&mut session, player, "kill prospector"),
        "You can only attack other players or creatures.",
    );
}

#[test]
fn test_fight_a_mutant_rat() {
    let (mut session, player) = ashfall();
    for step in ["w", "w", "e"] {
        lines(&mut session, player, step);
    }
    assert_saw(&lines(&mut session, player, "get pistol"), "You get laser pistol.");
    assert_saw(&lines(&mut session, player, "wield pistol"), "You wield laser pistol.");
    assert_saw(&lines(&mut session, player, "kill rat"), "You attack mutant rat!");

    // A 25 HP rat cannot outlast 1d12+4 for long.
    for _ in 0..40 {
        session.advance(30);
        if !session.world.actor(player).unwrap().in_combat() {
            break;
        }
    }
    let drifter = session.world.actor(player).unwrap();
    assert!(!drifter.in_combat());
    assert!(drifter.progression.experience == 150 || drifter.hit_points.is_full());
}
