//! The town of Ashfall: rooms, the loot lying around, and what lives there.

use crate::config::GameConfig;
use crate::items::standard_item;
use crate::world::{ActorId, ActorKind, Container, Direction, Room, RoomId, World, WorldError};
use tracing::warn;

/// Where new players appear.
pub const START_ROOM: &str = "Town Square";

const ROOMS: &[(&str, &str)] = &[
    (
        "Town Square",
        "What is left of a frontier town square. Ash blows over cracked boards and a \
         weathered sign still creaks in the hot wind: \"Welcome to Ashfall.\"",
    ),
    (
        "Broken Saloon",
        "Overturned tables and a splintered bar. The mirror behind it hangs in jagged \
         shards and an old piano sits silent in the corner.",
    ),
    (
        "Ruined General Store",
        "Warped, empty shelves and broken glass underfoot. The register drawer hangs \
         open, long since looted.",
    ),
    (
        "Water Tower",
        "A rusted tower leans over the town, its tank dry and its ladder missing rungs.",
    ),
    (
        "Main Street",
        "A cracked road lined with gutted storefronts runs west toward open desert.",
    ),
    (
        "Ruined Neighborhood",
        "Rows of collapsed houses. Survivors drag the fallen here and patch them up \
         as best they can.",
    ),
    (
        "Wasteland",
        "Grey dunes stretch to the horizon under a bruised sky. Something moves among \
         the wrecked cars.",
    ),
    (
        "Radiation Zone",
        "The ground glows faintly and the air tastes of metal. A geiger counter would \
         be screaming here.",
    ),
    (
        "Old Mine",
        "A timber-framed shaft slopes into darkness. Water drips somewhere below.",
    ),
];

const EXITS: &[(&str, Direction, &str)] = &[
    ("Town Square", Direction::North, "Broken Saloon"),
    ("Town Square", Direction::South, "Ruined General Store"),
    ("Town Square", Direction::East, "Water Tower"),
    ("Town Square", Direction::West, "Main Street"),
    ("Main Street", Direction::South, "Ruined Neighborhood"),
    ("Main Street", Direction::West, "Wasteland"),
    ("Wasteland", Direction::North, "Radiation Zone"),
    ("Wasteland", Direction::East, "Old Mine"),
];

const LOOT: &[(&str, &str)] = &[
    ("Town Square", "rusty pipe"),
    ("Town Square", "bottle cap"),
    ("Broken Saloon", "leather duster"),
    ("Broken Saloon", "bottle cap"),
    ("Ruined General Store", "water canteen"),
    ("Ruined General Store", "medical kit"),
    ("Ruined General Store", "bottle cap"),
    ("Wasteland", "scrap metal club"),
    ("Radiation Zone", "radiation suit"),
    ("Radiation Zone", "rad-away"),
    ("Old Mine", "laser pistol"),
    ("Old Mine", "energy cell"),
];

struct CreatureTemplate {
    name: &'static str,
    aliases: &'static [&'static str],
    description: &'static str,
    room: &'static str,
    hit_points: i32,
    armor_class: i32,
    hit_bonus: i32,
    damage_bonus: i32,
    experience: u64,
}

const CREATURES: &[CreatureTemplate] = &[
    CreatureTemplate {
        name: "feral ghoul",
        aliases: &["ghoul", "feral"],
        description: "Peeling skin over wiry muscle. It watches you with milky eyes.",
        room: "Wasteland",
        hit_points: 60,
        armor_class: 2,
        hit_bonus: 5,
        damage_bonus: 1,
        experience: 400,
    },
    CreatureTemplate {
        name: "mutant rat",
        aliases: &["rat", "mutant"],
        description: "A rat the size of a dog, with too many teeth.",
        room: "Old Mine",
        hit_points: 25,
        armor_class: 0,
        hit_bonus: 0,
        damage_bonus: 0,
        experience: 150,
    },
    CreatureTemplate {
        name: "rad scorpion",
        aliases: &["scorpion"],
        description: "A glowing scorpion as long as a man is tall, stinger raised.",
        room: "Radiation Zone",
        hit_points: 80,
        armor_class: 4,
        hit_bonus: 8,
        damage_bonus: 3,
        experience: 900,
    },
];

/// Build the full Ashfall world.
pub fn build_world(config: &GameConfig) -> Result<World, WorldError> {
    let mut world = World::new();
    for (name, description) in ROOMS {
        world.add_room(Room::new(*name, *description));
    }
    for (from, direction, to) in EXITS {
        world.connect(room_named(&world, from)?, *direction, room_named(&world, to)?)?;
    }

    for (room, name) in LOOT {
        let room = room_named(&world, room)?;
        match standard_item(name) {
            Some(item) => {
                world.add_item(item, Container::Room(room))?;
            }
            None => warn!(item = name, "no standard item with this name"),
        }
    }

    for template in CREATURES {
        let room = room_named(&world, template.room)?;
        let creature = config
            .new_actor(template.name, ActorKind::Creature, room)
            .with_aliases(template.aliases.iter().copied())
            .with_description(template.description)
            .with_hit_points(template.hit_points)
            .with_combat_stats(template.armor_class, template.hit_bonus, template.damage_bonus)
            .with_experience_value(template.experience)
            .with_home(room);
        world.add_actor(creature);
    }

    let saloon = room_named(&world, "Broken Saloon")?;
    world.add_actor(
        config
            .new_actor("old prospector", ActorKind::Bystander, saloon)
            .with_aliases(["prospector", "old man"])
            .with_description("A leathery old man nursing an empty glass."),
    );

    if world.room_by_name(&config.respawn_room).is_none() {
        warn!(room = %config.respawn_room, "configured respawn room is not on the map");
    }
    Ok(world)
}

/// Add a new player in the starting room.
pub fn spawn_player(world: &mut World, config: &GameConfig, name: &str) -> Result<ActorId, WorldError> {
    let start = room_named(world, START_ROOM)?;
    Ok(world.add_actor(config.new_actor(name, ActorKind::Player, start)))
}

fn room_named(world: &World, name: &str) -> Result<RoomId, WorldError> {
    world
        .room_by_name(name)
        .ok_or_else(|| WorldError::UnknownRoomName(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_is_connected_both_ways() {
        let world = build_world(&GameConfig::default()).unwrap();
        assert_eq!(world.rooms.len(), 9);
        let square = world.room_by_name("Town Square").unwrap();
        let saloon = world.room_by_name("Broken Saloon").unwrap();
        assert_eq!(world.room(square).unwrap().exits[&Direction::North], saloon);
        assert_eq!(world.room(saloon).unwrap().exits[&Direction::South], square);
    }

    #[test]
    fn test_loot_placement() {
        let world = build_world(&GameConfig::default()).unwrap();
        let mine = world.room_by_name("Old Mine").unwrap();
        let names: Vec<&str> = world
            .items_in(Container::Room(mine))
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["energy cell", "laser pistol"]);
    }

    #[test]
    fn test_creatures_have_homes() {
        let world = build_world(&GameConfig::default()).unwrap();
        let wasteland = world.room_by_name("Wasteland").unwrap();
        let ghoul = world.find_actor_in_room(wasteland, "ghoul").unwrap();
        let ghoul = world.actor(ghoul).unwrap();
        assert_eq!(ghoul.home, Some(wasteland));
        assert_eq!(ghoul.hit_points.maximum, 60);
    }

    #[test]
    fn test_spawn_player_in_town_square() {
        let config = GameConfig::default();
        let mut world = build_world(&config).unwrap();
        let id = spawn_player(&mut world, &config, "Drifter").unwrap();
        let actor = world.actor(id).unwrap();
        assert_eq!(world.room(actor.location).unwrap().name, START_ROOM);
        assert_eq!(actor.kind, ActorKind::Player);
    }
}
