//! Game content database
//!
//! Static definitions for items, skills, monsters, quests, materials and set
//! bonuses. Content can be overridden by RON files under `assets/data/`, with
//! compiled-in defaults as fallback.

pub mod items;
pub mod loader;
pub mod monsters;
pub mod quests;
pub mod skills;

pub use loader::GameData;

use serde::{Deserialize, Serialize};

/// The four attack elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Fire,
    Water,
    Wind,
    Earth,
}

impl Element {
    pub fn name(self) -> &'static str {
        match self {
            Element::Fire => "Fire",
            Element::Water => "Water",
            Element::Wind => "Wind",
            Element::Earth => "Earth",
        }
    }
}

/// Stats that temporary effects can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    Atk,
    Def,
}

impl Stat {
    pub fn name(self) -> &'static str {
        match self {
            Stat::Atk => "ATK",
            Stat::Def => "DEF",
        }
    }
}

/// Equipment slots. Exactly one item may be equipped per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotType {
    Weapon,
    Shield,
    Helmet,
    Armor,
    Gloves,
    Boots,
}

impl SlotType {
    pub fn name(self) -> &'static str {
        match self {
            SlotType::Weapon => "Weapon",
            SlotType::Shield => "Shield",
            SlotType::Helmet => "Helmet",
            SlotType::Armor => "Armor",
            SlotType::Gloves => "Gloves",
            SlotType::Boots => "Boots",
        }
    }

    pub fn all() -> [SlotType; 6] {
        [
            SlotType::Weapon,
            SlotType::Shield,
            SlotType::Helmet,
            SlotType::Armor,
            SlotType::Gloves,
            SlotType::Boots,
        ]
    }
}

/// Item rarity tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn name(self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }

    /// Multiplier applied to an item's base price in the shop.
    pub fn price_multiplier(self) -> f64 {
        match self {
            Rarity::Common => 1.0,
            Rarity::Uncommon => 1.5,
            Rarity::Rare => 2.5,
            Rarity::Epic => 5.0,
            Rarity::Legendary => 10.0,
        }
    }

    /// Divisor applied to loot chances for non-boss kills.
    pub fn drop_factor(self) -> f64 {
        match self {
            Rarity::Common => 1.0,
            Rarity::Uncommon => 2.0,
            Rarity::Rare => 5.0,
            Rarity::Epic => 10.0,
            Rarity::Legendary => 20.0,
        }
    }
}
