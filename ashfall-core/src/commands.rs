//! Text commands.
//!
//! [`parse`] turns a line of input into a [`Command`]; [`run`] resolves the
//! names it mentions against the world, hands the matching intent to the
//! session and reports the outcome as messages. Informational commands
//! (`stats`, `look`, ...) only render text.

use crate::class_data::valid_advanced_classes;
use crate::progression::exp_required;
use crate::rules::{Intent, Resolution, RulesError};
use crate::session::GameSession;
use crate::spells::find_spell;
use crate::world::{
    Ability, Actor, ActorId, AdvancedClass, BaseClass, Container, Direction, EquipmentSlot, ItemId,
    RoomId, World,
};
use thiserror::Error;

/// A parsed player command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Character
    ChooseClass(String),
    Stats,
    Remort,
    AdvancedClass(Option<String>),
    Level,
    Classes,
    Rest,
    Stand,

    // Combat
    Kill {
        target: String,
        weapon: Option<String>,
    },
    Flee,
    Cast {
        spell: String,
        target: Option<String>,
    },
    Skills,
    Wield(String),
    Unwield,
    Wear(String),
    Remove(String),
    Equipment,
    Use(String),

    // Movement and interaction
    Look(Option<String>),
    Go(Direction),
    Get(String),
    Drop(String),
    Inventory,
    Say(String),
    Emote(String),
    Help,
}

/// Why a command could not be carried out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("{0}")]
    Usage(&'static str),

    #[error("Huh? '{0}' is not a command. Type 'help' for a list of commands.")]
    UnknownCommand(String),

    #[error("You don't see '{0}' here.")]
    NotFound(String),

    #[error("You aren't carrying '{0}'.")]
    NotCarrying(String),

    #[error(transparent)]
    Rules(#[from] RulesError),
}

/// Parse a line of input. Blank lines parse to `None`.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    let Some(first) = line.chars().next() else {
        return Ok(None);
    };

    // `'hello` and `:waves` need no space after the verb.
    let (verb, rest) = if first == '\'' || first == ':' {
        line.split_at(first.len_utf8())
    } else {
        line.split_once(char::is_whitespace).unwrap_or((line, ""))
    };
    let verb = verb.to_lowercase();
    let rest = rest.trim();
    let arg = |usage: &'static str| -> Result<String, CommandError> {
        if rest.is_empty() {
            Err(CommandError::Usage(usage))
        } else {
            Ok(rest.to_string())
        }
    };
    let optional = || (!rest.is_empty()).then(|| rest.to_string());

    let command = match verb.as_str() {
        "chooseclass" | "class" | "choose" => Command::ChooseClass(arg("Usage: chooseclass <class>")?),
        "stats" | "stat" | "score" => Command::Stats,
        "remort" => Command::Remort,
        "advancedclass" | "advclass" | "advanced" => Command::AdvancedClass(optional()),
        "level" | "lvl" | "exp" => Command::Level,
        "classes" | "classlist" => Command::Classes,
        "rest" | "sleep" => Command::Rest,
        "stand" | "wake" => Command::Stand,

        "kill" | "attack" | "hit" | "fight" => {
            let (target, weapon) = split_keyword(rest, "with");
            if target.is_empty() {
                return Err(CommandError::Usage("Usage: kill <target> [with <weapon>]"));
            }
            Command::Kill { target, weapon }
        }
        "flee" | "run" | "escape" => Command::Flee,
        "cast" | "spell" => {
            let (spell, target) = split_keyword(rest, "at");
            if spell.is_empty() {
                return Err(CommandError::Usage("Usage: cast <spell> [at <target>]"));
            }
            Command::Cast { spell, target }
        }
        "skills" | "spells" | "abilities" => Command::Skills,
        "wield" | "hold" => Command::Wield(arg("Wield what?")?),
        "unwield" => Command::Unwield,
        "wear" | "put" => Command::Wear(arg("Wear what?")?),
        "remove" => Command::Remove(arg("Remove what?")?),
        "equipment" | "eq" | "worn" => Command::Equipment,
        "use" | "quaff" | "eat" | "drink" => Command::Use(arg("Use what?")?),

        "look" | "l" => Command::Look(optional()),
        "go" => Command::Go(
            rest.parse()
                .map_err(|_| CommandError::Usage("Go where? (north, south, east, west, up, down)"))?,
        ),
        "get" | "take" | "pickup" => Command::Get(arg("Get what?")?),
        "drop" => Command::Drop(arg("Drop what?")?),
        "inventory" | "i" | "inv" => Command::Inventory,
        "say" | "'" => Command::Say(arg("Say what?")?),
        "emote" | ":" | "pose" => Command::Emote(arg("Emote what?")?),
        "help" | "?" => Command::Help,

        other => match other.parse::<Direction>() {
            Ok(direction) if rest.is_empty() => Command::Go(direction),
            _ => return Err(CommandError::UnknownCommand(other.to_string())),
        },
    };
    Ok(Some(command))
}

/// Split `"<head> <keyword> <tail>"` on the first standalone keyword.
fn split_keyword(args: &str, keyword: &str) -> (String, Option<String>) {
    let words: Vec<&str> = args.split_whitespace().collect();
    match words.iter().position(|w| w.eq_ignore_ascii_case(keyword)) {
        Some(i) => {
            let tail = words[i + 1..].join(" ");
            (words[..i].join(" "), (!tail.is_empty()).then_some(tail))
        }
        None => (words.join(" "), None),
    }
}

/// Parse and carry out a line of input. Every failure becomes a message to
/// the actor.
pub fn run(session: &mut GameSession, actor: ActorId, line: &str) -> Resolution {
    let result = parse(line).and_then(|command| match command {
        Some(command) => execute(session, actor, command),
        None => Ok(Resolution::new()),
    });
    result.unwrap_or_else(|e| Resolution::new().notify(actor, e.to_string()))
}

/// Carry out a parsed command.
pub fn execute(session: &mut GameSession, actor_id: ActorId, command: Command) -> Result<Resolution, CommandError> {
    let world = &session.world;
    let actor = world.actor(actor_id).map_err(RulesError::from)?;
    let room = actor.location;

    let intent = match command {
        // Informational: render only.
        Command::Stats => return Ok(reply(actor_id, render_stats(actor))),
        Command::Level => {
            let max_level = session.engine.config().max_level;
            return Ok(reply(actor_id, render_level(actor, max_level)));
        }
        Command::Classes => return Ok(reply(actor_id, render_classes())),
        Command::Skills => return Ok(reply(actor_id, render_skills(actor))),
        Command::Equipment => return Ok(reply(actor_id, render_equipment(world, actor))),
        Command::Inventory => return Ok(reply(actor_id, render_inventory(world, actor_id))),
        Command::Help => return Ok(reply(actor_id, render_help())),
        Command::Look(None) => return Ok(reply(actor_id, render_room(world, room, actor_id))),
        Command::Look(Some(target)) => return look_at(world, actor, &target),
        Command::Say(text) => {
            return Ok(Resolution::new()
                .notify(actor_id, format!("You say, \"{text}\""))
                .broadcast(room, &[actor_id], format!("{} says, \"{text}\"", actor.name)))
        }
        Command::Emote(text) => {
            return Ok(Resolution::new()
                .notify(actor_id, format!("You {text}"))
                .broadcast(room, &[actor_id], format!("{} {text}", actor.name)))
        }
        Command::AdvancedClass(None) => {
            let mut lines = vec!["Usage: advancedclass <class>".to_string()];
            let config = session.engine.config();
            match actor.base_class {
                Some(class) if actor.progression.remorts >= config.advanced_class_remorts => {
                    let valid: Vec<&str> = class.advanced_classes().iter().map(|c| c.id()).collect();
                    lines.push(format!("Available advanced classes for {class}: {}", valid.join(", ")));
                }
                _ => lines.push(format!(
                    "You need {} remorts to choose an advanced class!",
                    config.advanced_class_remorts
                )),
            }
            return Ok(reply(actor_id, lines));
        }

        // Character
        Command::ChooseClass(name) => {
            let class = name
                .parse::<BaseClass>()
                .map_err(|_| RulesError::InvalidClass(name.trim().to_lowercase()))?;
            Intent::ChooseClass { actor_id, class }
        }
        Command::Remort => Intent::Remort { actor_id },
        Command::AdvancedClass(Some(name)) => {
            let class = match name.parse::<AdvancedClass>() {
                Ok(class) => class,
                // Eligibility is reported before the name is judged.
                Err(_) => {
                    let required = session.engine.config().advanced_class_remorts;
                    let error = if actor.progression.remorts < required {
                        RulesError::NotEligible {
                            required,
                            remorts: actor.progression.remorts,
                        }
                    } else {
                        RulesError::InvalidAdvancedClass {
                            requested: name.trim().to_lowercase(),
                            valid: valid_advanced_classes(actor.base_class),
                        }
                    };
                    return Err(error.into());
                }
            };
            Intent::ChooseAdvancedClass { actor_id, class }
        }
        Command::Rest => Intent::Rest { actor_id },
        Command::Stand => Intent::Stand { actor_id },

        // Combat
        Command::Kill { target, weapon } => {
            let target_id = find_actor(world, room, actor_id, &target)?;
            let weapon_id = weapon
                .map(|w| {
                    world
                        .find_item(&carried_containers(actor_id), &w)
                        .ok_or(CommandError::NotCarrying(w))
                })
                .transpose()?;
            Intent::StartCombat {
                attacker_id: actor_id,
                target_id,
                weapon_id,
            }
        }
        Command::Flee => Intent::Flee { actor_id },
        Command::Cast { spell, target } => {
            let spell = find_spell(&spell).ok_or_else(|| RulesError::UnknownSpell(spell.trim().to_lowercase()))?;
            let target_id = target
                .map(|t| find_actor(world, room, actor_id, &t))
                .transpose()?;
            Intent::CastSpell {
                caster_id: actor_id,
                spell,
                target_id,
            }
        }
        Command::Wield(name) => Intent::Wield {
            actor_id,
            item_id: find_reachable(world, actor_id, room, &name)?,
        },
        Command::Unwield => Intent::Unwield { actor_id },
        Command::Wear(name) => Intent::Wear {
            actor_id,
            item_id: find_reachable(world, actor_id, room, &name)?,
        },
        Command::Remove(name) => Intent::Remove {
            actor_id,
            item_id: world
                .find_item(&equipped_containers(actor_id), &name)
                .ok_or(RulesError::NotEquipped)?,
        },
        Command::Use(name) => Intent::UseItem {
            actor_id,
            item_id: world
                .find_item(&[Container::Inventory(actor_id)], &name)
                .ok_or(CommandError::NotCarrying(name))?,
        },

        // Movement and interaction
        Command::Go(direction) => Intent::Move { actor_id, direction },
        Command::Get(name) => Intent::PickUp {
            actor_id,
            item_id: world
                .find_item(&[Container::Room(room)], &name)
                .ok_or(CommandError::NotFound(name))?,
        },
        Command::Drop(name) => Intent::Drop {
            actor_id,
            item_id: world
                .find_item(&[Container::Inventory(actor_id)], &name)
                .ok_or(CommandError::NotCarrying(name))?,
        },
    };

    let moving = matches!(intent, Intent::Move { .. });
    let mut resolution = session.execute(intent)?;
    if moving {
        let world = &session.world;
        if let Ok(actor) = world.actor(actor_id) {
            for line in render_room(world, actor.location, actor_id) {
                resolution.tell(actor_id, line);
            }
        }
    }
    Ok(resolution)
}

fn reply(actor: ActorId, lines: Vec<String>) -> Resolution {
    let mut resolution = Resolution::new();
    for line in lines {
        resolution.tell(actor, line);
    }
    resolution
}

fn find_actor(world: &World, room: RoomId, actor: ActorId, name: &str) -> Result<ActorId, CommandError> {
    if matches!(name.trim().to_lowercase().as_str(), "me" | "self" | "myself") {
        return Ok(actor);
    }
    world
        .find_actor_in_room(room, name)
        .ok_or_else(|| CommandError::NotFound(name.to_string()))
}

/// Inventory, then equipped items, then the floor.
fn find_reachable(world: &World, actor: ActorId, room: RoomId, name: &str) -> Result<ItemId, CommandError> {
    let mut containers = carried_containers(actor);
    containers.push(Container::Room(room));
    world
        .find_item(&containers, name)
        .ok_or_else(|| CommandError::NotFound(name.to_string()))
}

fn carried_containers(actor: ActorId) -> Vec<Container> {
    let mut containers = vec![Container::Inventory(actor)];
    containers.extend(equipped_containers(actor));
    containers
}

fn equipped_containers(actor: ActorId) -> Vec<Container> {
    EquipmentSlot::ALL
        .iter()
        .map(|slot| Container::Equipped(actor, *slot))
        .collect()
}

fn look_at(world: &World, viewer: &Actor, target: &str) -> Result<Resolution, CommandError> {
    let room = viewer.location;
    if let Ok(direction) = target.parse::<Direction>() {
        let text = match world.room(room).ok().and_then(|r| r.exits.get(&direction)) {
            Some(dest) => {
                let name = world.room(*dest).map(|r| r.name.as_str()).unwrap_or("somewhere");
                format!("You look {direction} and see {name}.")
            }
            None => format!("You look {direction} but see nothing special."),
        };
        return Ok(Resolution::new().notify(viewer.id, text));
    }
    if let Ok(id) = find_actor(world, room, viewer.id, target) {
        let other = world.actor(id).map_err(RulesError::from)?;
        if other.id == viewer.id {
            return Ok(reply(viewer.id, render_stats(other)));
        }
        let mut lines = vec![other.name.clone()];
        if !other.description.is_empty() {
            lines.push(other.description.clone());
        }
        lines.push(format!("Health: {}", other.hit_points));
        return Ok(reply(viewer.id, lines));
    }
    let mut containers = carried_containers(viewer.id);
    containers.push(Container::Room(room));
    let item_id = world
        .find_item(&containers, target)
        .ok_or_else(|| CommandError::NotFound(target.to_string()))?;
    let item = world.item(item_id).map_err(RulesError::from)?;
    let mut lines = vec![item.name.clone()];
    if !item.description.is_empty() {
        lines.push(item.description.clone());
    }
    Ok(reply(viewer.id, lines))
}

// ============================================================================
// Rendering
// ============================================================================

pub fn render_stats(actor: &Actor) -> Vec<String> {
    let class = actor.base_class.map(|c| c.name()).unwrap_or("None");
    let advanced = actor.advanced_class.map(|c| c.name()).unwrap_or("None");
    let a = &actor.abilities;
    vec![
        format!(
            "Level: {} | Class: {class} | Remorts: {}",
            actor.progression.level, actor.progression.remorts
        ),
        format!("Advanced Class: {advanced}"),
        String::new(),
        format!("Strength: {:<8} Intelligence: {}", a.strength, a.intelligence),
        format!("Wisdom: {:<10} Dexterity: {}", a.wisdom, a.dexterity),
        format!("Constitution: {:<4} Charisma: {}", a.constitution, a.charisma),
        String::new(),
        format!("Hit Points: {}", actor.hit_points),
        format!("Mana: {}", actor.mana),
        format!("Move: {}", actor.movement),
        String::new(),
        format!("Armor Class: {}", actor.armor_class),
        format!("Hit Bonus: {}", actor.hit_bonus),
        format!("Damage Bonus: {}", actor.damage_bonus),
    ]
}

pub fn render_level(actor: &Actor, max_level: u8) -> Vec<String> {
    let p = actor.progression;
    if p.level < max_level {
        let needed = exp_required(u32::from(p.level) + 1).saturating_sub(p.experience);
        vec![
            format!("Level: {} | Experience: {} | Remorts: {}", p.level, p.experience, p.remorts),
            format!("Experience needed for next level: {needed}"),
        ]
    } else {
        vec![
            format!("Level: {} (MAX) | Experience: {} | Remorts: {}", p.level, p.experience, p.remorts),
            "You are at maximum level! Use 'remort' to advance further.".to_string(),
        ]
    }
}

pub fn render_classes() -> Vec<String> {
    let mut lines = vec!["Available Starting Classes:".to_string()];
    for class in BaseClass::all() {
        let data = class.data();
        let mut bonuses: Vec<String> = data
            .ability_bonuses
            .iter()
            .map(|(ability, n)| format!("+{n} {}", ability.name()))
            .collect();
        if data.hit_points > 0 {
            bonuses.push(format!("+{} HP", data.hit_points));
        }
        if data.mana > 0 {
            bonuses.push(format!("+{} Mana", data.mana));
        }
        let [first, second] = class.advanced_classes();
        lines.push(String::new());
        lines.push(format!("{class} - {}", class.description()));
        lines.push(format!("  {}", bonuses.join(", ")));
        lines.push(format!("  Advanced: {first}, {second}"));
    }
    lines.push(String::new());
    lines.push("Use 'chooseclass <class>' to select your class.".to_string());
    lines.push(
        "Use 'advancedclass <class>' to select advanced class (requires 50 remorts).".to_string(),
    );
    lines
}

pub fn render_skills(actor: &Actor) -> Vec<String> {
    let mut lines = Vec::new();
    if actor.skills.is_empty() {
        lines.push("You have no skills.".to_string());
    } else {
        lines.push("Skills:".to_string());
        lines.extend(
            actor
                .skills
                .iter()
                .map(|(skill, level)| format!("  {}: {level}", skill.name())),
        );
    }
    lines.push(String::new());
    if actor.known_spells.is_empty() {
        lines.push("You know no spells.".to_string());
    } else {
        lines.push("Known Spells:".to_string());
        for spell in &actor.known_spells {
            let cost = actor.spellbook.get(spell).map(|e| e.cost).unwrap_or(10);
            lines.push(format!("  {} (cost: {cost} mana)", spell.id()));
        }
    }
    lines
}

pub fn render_equipment(world: &World, actor: &Actor) -> Vec<String> {
    let mut lines = vec!["Equipment:".to_string()];
    for slot in EquipmentSlot::ALL {
        let item = actor
            .equipment
            .get(slot)
            .and_then(|id| world.item(id).ok())
            .map(|item| item.name.as_str())
            .unwrap_or("<empty>");
        lines.push(format!("  {slot}: {item}"));
    }
    lines
}

pub fn render_inventory(world: &World, actor: ActorId) -> Vec<String> {
    let items = world.items_in(Container::Inventory(actor));
    if items.is_empty() {
        return vec!["You are carrying nothing.".to_string()];
    }
    let mut lines = vec!["You are carrying:".to_string()];
    lines.extend(items.iter().map(|item| format!("  {}", item.name)));
    lines
}

pub fn render_room(world: &World, room_id: RoomId, viewer: ActorId) -> Vec<String> {
    let Ok(room) = world.room(room_id) else {
        return vec!["You are nowhere.".to_string()];
    };
    let mut lines = vec![room.name.clone(), room.description.clone()];

    let exits: Vec<&str> = room.exits.keys().map(|d| d.name()).collect();
    if exits.is_empty() {
        lines.push("Exits: none".to_string());
    } else {
        lines.push(format!("Exits: {}", exits.join(", ")));
    }

    let items: Vec<&str> = world
        .items_in(Container::Room(room_id))
        .into_iter()
        .map(|item| item.name.as_str())
        .collect();
    if !items.is_empty() {
        lines.push(format!("You see: {}", items.join(", ")));
    }

    for other in world.actors_in(room_id) {
        if other.id == viewer {
            continue;
        }
        let state = if other.in_combat() {
            " (fighting)"
        } else if other.resting {
            " (resting)"
        } else {
            ""
        };
        lines.push(format!("{} is here{state}.", other.name));
    }
    lines
}

pub fn render_help() -> Vec<String> {
    [
        "Available commands:",
        "  Character: chooseclass, stats, remort, advancedclass, level, classes, rest, stand",
        "  Combat: kill, flee, cast, skills, wield, unwield, wear, remove, equipment, use",
        "  Movement: look, go, north/south/east/west/up/down, get, drop, inventory",
        "  Social: say, emote",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Ability lines in the order shown by `stats`.
pub fn ability_summary(actor: &Actor) -> String {
    Ability::ALL
        .iter()
        .map(|a| format!("{} {}", a.abbreviation(), actor.abilities.get(*a)))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!(parse("score").unwrap(), Some(Command::Stats));
        assert_eq!(parse("  ").unwrap(), None);
        assert_eq!(parse("n").unwrap(), Some(Command::Go(Direction::North)));
        assert_eq!(parse("go west").unwrap(), Some(Command::Go(Direction::West)));
        assert_eq!(parse("i").unwrap(), Some(Command::Inventory));
        assert_eq!(parse("'hello there").unwrap(), Some(Command::Say("hello there".to_string())));
        assert_eq!(parse("class Mage").unwrap(), Some(Command::ChooseClass("Mage".to_string())));
    }

    #[test]
    fn test_parse_kill_with_weapon() {
        assert_eq!(
            parse("attack feral ghoul with rusty pipe").unwrap(),
            Some(Command::Kill {
                target: "feral ghoul".to_string(),
                weapon: Some("rusty pipe".to_string()),
            })
        );
        assert_eq!(
            parse("kill rat").unwrap(),
            Some(Command::Kill { target: "rat".to_string(), weapon: None })
        );
        assert!(matches!(parse("kill"), Err(CommandError::Usage(_))));
    }

    #[test]
    fn test_parse_cast_at_target() {
        assert_eq!(
            parse("cast magic missile at rat").unwrap(),
            Some(Command::Cast {
                spell: "magic missile".to_string(),
                target: Some("rat".to_string()),
            })
        );
        assert_eq!(
            parse("cast light").unwrap(),
            Some(Command::Cast { spell: "light".to_string(), target: None })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse("dance").unwrap_err(),
            CommandError::UnknownCommand("dance".to_string())
        );
        assert_eq!(parse("get").unwrap_err().to_string(), "Get what?");
        assert!(matches!(parse("go nowhere"), Err(CommandError::Usage(_))));
    }

    #[test]
    fn test_render_level_at_cap() {
        let mut actor = Actor::new("Ash", crate::world::ActorKind::Player, RoomId::new());
        assert_eq!(
            render_level(&actor, 50)[1],
            "Experience needed for next level: 1200"
        );
        actor.progression.level = 50;
        assert!(render_level(&actor, 50)[0].contains("(MAX)"));
    }
}
