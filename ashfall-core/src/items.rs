//! Standard Ashfall items.
//!
//! Each entry is a template; [`standard_item`] hands out a fresh copy with
//! its own id so the same kind of item can exist many times in the world.

use crate::dice::DamageDice;
use crate::world::{AmmoType, EquipmentSlot, Item, ItemKind, Pool, WeaponType};
use std::sync::LazyLock;
use tracing::warn;

/// Build a weapon from its `NdM+K` damage notation. A template with bad
/// notation is logged and left out of the table.
fn weapon(
    name: &str,
    aliases: &[&str],
    damage: &str,
    weapon_type: WeaponType,
    durability: i32,
    description: &str,
) -> Option<Item> {
    let damage: DamageDice = match damage.parse() {
        Ok(dice) => dice,
        Err(e) => {
            warn!(item = name, error = %e, "Skipping weapon with bad damage notation");
            return None;
        }
    };
    let item = Item::new(
        name,
        ItemKind::Weapon {
            damage,
            hit_bonus: 0,
            weapon_type,
            durability,
        },
    )
    .with_aliases(aliases.iter().copied())
    .with_description(description);
    Some(item)
}

fn armor(
    name: &str,
    aliases: &[&str],
    armor_bonus: i32,
    slot: EquipmentSlot,
    durability: i32,
    radiation_protection: i32,
    description: &str,
) -> Item {
    Item::new(
        name,
        ItemKind::Armor {
            armor_bonus,
            slot,
            durability,
            radiation_protection,
        },
    )
    .with_aliases(aliases.iter().copied())
    .with_description(description)
}

fn consumable(
    name: &str,
    aliases: &[&str],
    uses: i32,
    healing: i32,
    radiation_healing: i32,
    description: &str,
) -> Item {
    Item::new(
        name,
        ItemKind::Consumable {
            uses: Pool::new(uses),
            healing,
            radiation_healing,
        },
    )
    .with_aliases(aliases.iter().copied())
    .with_description(description)
}

/// Every standard item template.
pub static STANDARD_ITEMS: LazyLock<Vec<Item>> = LazyLock::new(|| {
    let weapons = [
        weapon(
            "rusty pipe",
            &["pipe", "weapon"],
            "1d8+1",
            WeaponType::Melee,
            60,
            "A length of corroded plumbing, heavy enough to crack a skull.",
        ),
        weapon(
            "scrap metal club",
            &["club", "weapon"],
            "1d10+2",
            WeaponType::Melee,
            80,
            "Sheet metal hammered around a fence post and bristling with bolts.",
        ),
        weapon(
            "salvaged rifle",
            &["rifle", "gun"],
            "2d8+3",
            WeaponType::Ranged,
            70,
            "A bolt-action rifle held together with wire and hope.",
        ),
        weapon(
            "laser pistol",
            &["pistol", "laser"],
            "1d12+4",
            WeaponType::Energy,
            90,
            "A pre-war sidearm that still hums when you thumb the safety.",
        ),
    ];
    let mut items: Vec<Item> = weapons.into_iter().flatten().collect();
    items.extend([
        // Armor
        armor(
            "leather duster",
            &["duster", "coat"],
            2,
            EquipmentSlot::Body,
            50,
            0,
            "A long coat of cracked leather that turns away grit and the odd blade.",
        ),
        armor(
            "scrap metal armor",
            &["scrap armor", "armor"],
            4,
            EquipmentSlot::Body,
            80,
            0,
            "Road signs and hubcaps strapped together into a clanking breastplate.",
        ),
        armor(
            "radiation suit",
            &["suit", "armor"],
            3,
            EquipmentSlot::Body,
            60,
            5,
            "A sealed yellow suit, patched in a dozen places.",
        ),
        armor(
            "combat helmet",
            &["helmet", "helm"],
            1,
            EquipmentSlot::Head,
            70,
            0,
            "A dented military helmet with a cracked visor.",
        ),
        // Consumables
        consumable(
            "water canteen",
            &["canteen", "water"],
            10,
            20,
            0,
            "A battered tin canteen. The water inside tastes of rust but it is clean.",
        ),
        consumable(
            "medical kit",
            &["medkit", "med"],
            5,
            50,
            0,
            "Bandages, a suture needle and a few unlabeled pills.",
        ),
        consumable(
            "rad-away",
            &["medicine", "rad"],
            3,
            0,
            30,
            "An IV bag of orange fluid that flushes radiation from the blood.",
        ),
        // Ammunition and currency
        Item::new(
            "ammo box",
            ItemKind::Ammo {
                ammo_type: AmmoType::Standard,
                quantity: 10,
            },
        )
        .with_aliases(["ammo", "rounds"])
        .with_description("A cardboard box of mismatched rifle rounds."),
        Item::new(
            "energy cell",
            ItemKind::Ammo {
                ammo_type: AmmoType::Energy,
                quantity: 5,
            },
        )
        .with_aliases(["cell", "battery"])
        .with_description("A palm-sized power cell with a faint charge light."),
        Item::new("bottle cap", ItemKind::Currency { value: 1 })
            .with_aliases(["cap", "caps"])
            .with_description("A bent bottle cap, the currency of the wastes."),
    ]);
    items
});

/// Create a fresh copy of a standard item by name or alias (case-insensitive).
pub fn standard_item(name: &str) -> Option<Item> {
    let template = STANDARD_ITEMS
        .iter()
        .find(|i| i.name.eq_ignore_ascii_case(name.trim()))
        .or_else(|| STANDARD_ITEMS.iter().find(|i| i.matches_name(name)))?;
    let mut item = template.clone();
    item.id = crate::world::ItemId::new();
    Some(item)
}
