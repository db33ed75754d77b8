//! Item and material templates
//!
//! These are loaded from RON files or fall back to the compiled-in defaults.

use serde::{Deserialize, Serialize};

use super::{Element, Rarity, SlotType};

/// Immutable definition of an equippable item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDef {
    /// Unique template id (e.g. "w1")
    pub id: String,
    /// Display name
    pub name: String,
    /// Slot this item occupies when equipped
    pub slot: SlotType,
    pub atk: i32,
    pub def: i32,
    /// Minimum player level to equip
    pub min_level: u32,
    /// Base price before the rarity multiplier
    pub price: u32,
    pub rarity: Rarity,
    /// Set identifier for set bonuses
    #[serde(default)]
    pub set: Option<String>,
    /// Attack element (weapons only)
    #[serde(default)]
    pub element: Option<Element>,
    /// Elemental resistances granted while equipped
    #[serde(default)]
    pub resistance: Vec<Element>,
    #[serde(default)]
    pub description: String,
}

impl ItemDef {
    /// Shop price after the rarity multiplier.
    pub fn shop_price(&self) -> u32 {
        (self.price as f64 * self.rarity.price_multiplier()).floor() as u32
    }
}

/// Collection of item templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemTemplates {
    pub items: Vec<ItemDef>,
}

impl ItemTemplates {
    /// Find a template by id.
    pub fn find(&self, id: &str) -> Option<&ItemDef> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Number of distinct items belonging to a set.
    pub fn set_size(&self, set: &str) -> u8 {
        self.items
            .iter()
            .filter(|i| i.set.as_deref() == Some(set))
            .count() as u8
    }
}

/// A crafting material definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialDef {
    pub id: String,
    pub name: String,
}

/// Collection of material definitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialTemplates {
    pub materials: Vec<MaterialDef>,
}

impl MaterialTemplates {
    pub fn find(&self, id: &str) -> Option<&MaterialDef> {
        self.materials.iter().find(|m| m.id == id)
    }
}

/// A single set-bonus tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetTier {
    /// Equipped pieces required to activate this tier
    pub pieces: u8,
    #[serde(default)]
    pub atk: i32,
    #[serde(default)]
    pub def: i32,
    #[serde(default)]
    pub description: String,
}

/// Bonuses for one equipment set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetBonusDef {
    /// Set identifier matching `ItemDef::set`
    pub set: String,
    /// Display name
    pub name: String,
    pub tiers: Vec<SetTier>,
}

impl SetBonusDef {
    /// Highest tier whose piece requirement is met, if any.
    /// Tiers are not cumulative.
    pub fn active_tier(&self, count: u8) -> Option<&SetTier> {
        self.tiers
            .iter()
            .filter(|t| count >= t.pieces)
            .max_by_key(|t| t.pieces)
    }
}

/// Collection of set-bonus definitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetBonusDefs {
    pub sets: Vec<SetBonusDef>,
}

impl SetBonusDefs {
    pub fn find(&self, set: &str) -> Option<&SetBonusDef> {
        self.sets.iter().find(|s| s.set == set)
    }
}

fn item(
    id: &str,
    name: &str,
    slot: SlotType,
    atk: i32,
    def: i32,
    min_level: u32,
    price: u32,
    rarity: Rarity,
    description: &str,
) -> ItemDef {
    ItemDef {
        id: id.to_string(),
        name: name.to_string(),
        slot,
        atk,
        def,
        min_level,
        price,
        rarity,
        set: None,
        element: None,
        resistance: Vec::new(),
        description: description.to_string(),
    }
}

fn in_set(mut def: ItemDef, set: &str) -> ItemDef {
    def.set = Some(set.to_string());
    def
}

fn with_element(mut def: ItemDef, element: Element) -> ItemDef {
    def.element = Some(element);
    def
}

fn with_resistance(mut def: ItemDef, resistance: &[Element]) -> ItemDef {
    def.resistance = resistance.to_vec();
    def
}

/// Compiled-in item defaults.
pub fn default_item_templates() -> ItemTemplates {
    use Element::*;
    use Rarity::*;
    use SlotType::*;

    ItemTemplates {
        items: vec![
            item("w1", "Short Sword", Weapon, 5, 0, 1, 50, Common,
                 "A simple and reliable sword for beginners."),
            item("s1", "Wooden Shield", Shield, 0, 5, 1, 50, Common,
                 "A strapped piece of wood. It's better than nothing."),
            in_set(item("h1", "Leather Cap", Helmet, 0, 2, 2, 40, Common,
                 "Protects the head from low-hanging branches."), "leather"),
            in_set(item("a1", "Leather Chestplate", Armor, 0, 4, 2, 60, Common,
                 "Made of hardened leather, it offers modest protection."), "leather"),
            item("w2", "Battle Axe", Weapon, 12, 0, 3, 200, Uncommon,
                 "Heavy and brutal, this axe can cleave through light armor."),
            in_set(item("s2", "Iron Shield", Shield, 0, 10, 3, 220, Uncommon,
                 "A solid iron shield that can stop a serious blow."), "iron"),
            in_set(item("g1", "Leather Gloves", Gloves, 0, 2, 4, 80, Common,
                 "Simple gloves for a better grip on your weapon."), "leather"),
            in_set(item("b1", "Leather Boots", Boots, 0, 2, 4, 80, Common,
                 "Sturdy boots for long walks and stomping on slimes."), "leather"),
            item("w3", "Elven Blade", Weapon, 20, 0, 5, 500, Uncommon,
                 "Light and sharp, crafted with elven skill."),
            in_set(item("h2", "Iron Helm", Helmet, 0, 5, 5, 250, Uncommon,
                 "An iron helm that fully encases the head."), "iron"),
            in_set(item("a2", "Iron Chestplate", Armor, 0, 8, 5, 300, Uncommon,
                 "Iron plates that offer good protection for the torso."), "iron"),
            with_element(item("w4", "Flame Sword", Weapon, 18, 0, 6, 750, Rare,
                 "An enchanted blade that burns to the touch."), Fire),
            with_resistance(item("s3", "Water Shield", Shield, 0, 15, 6, 750, Rare,
                 "A shield that ripples with water magic, dousing flames."), &[Fire]),
            in_set(item("g2", "Iron Gauntlets", Gloves, 0, 5, 7, 280, Uncommon,
                 "Iron gauntlets that add weight to your punches."), "iron"),
            in_set(item("b2", "Iron Greaves", Boots, 0, 5, 7, 280, Uncommon,
                 "Heavy iron greaves for a firm stance."), "iron"),
            with_element(item("w5", "Stone Hammer", Weapon, 25, 0, 8, 1200, Rare,
                 "A warhammer so heavy it can crack the ground."), Earth),
            with_resistance(item("s4", "Wind Shield", Shield, 0, 20, 8, 1200, Rare,
                 "A light shield that deflects blows with gusts of wind."), &[Earth]),
            with_element(item("w6", "Cyclone Dagger", Weapon, 30, 0, 10, 2000, Rare,
                 "A dagger that strikes with the speed of a hurricane."), Wind),
            in_set(item("h3", "Steel Helm", Helmet, 0, 12, 12, 1500, Rare,
                 "A polished steel helm, a sign of a veteran warrior."), "steel"),
            in_set(item("a3", "Steel Chestplate", Armor, 0, 18, 12, 2000, Rare,
                 "A suit of steel plate, heavy but very protective."), "steel"),
            in_set(item("s5", "Steel Shield", Shield, 0, 25, 12, 1800, Rare,
                 "A large shield made of reinforced steel."), "steel"),
            in_set(item("w7", "Steel Longsword", Weapon, 40, 0, 12, 2500, Rare,
                 "A well-balanced two-hander for power and precision."), "steel"),
            with_element(item("w8", "Ice Staff", Weapon, 35, 0, 14, 3500, Epic,
                 "A staff that freezes the air around it."), Water),
            with_resistance(item("s6", "Runed Shield", Shield, 0, 30, 15, 4000, Epic,
                 "Engraved with runes that nullify elemental magics."), &[Fire, Water]),
            with_element(item("w10", "Worldbreaker", Weapon, 70, 0, 15, 15000, Legendary,
                 "A hammer so heavy it is said to be able to break the world."), Earth),
            with_element(item("w11", "Trident of the Depths", Weapon, 85, 0, 20, 25000, Legendary,
                 "A royal weapon from a lost underwater civilization."), Water),
            item("w12", "Daggers of the Unseen", Weapon, 120, 0, 40, 40000, Legendary,
                 "Daggers that strike from the shadows, unseen and deadly."),
        ],
    }
}

/// Compiled-in material defaults.
pub fn default_material_templates() -> MaterialTemplates {
    let materials = [
        ("m1", "Slime Essence"),
        ("m2", "Goblin Ear"),
        ("m3", "Orc Fang"),
        ("m4", "Igneous Core"),
        ("m5", "Stone Heart"),
        ("m6", "Gale Scale"),
    ];
    MaterialTemplates {
        materials: materials
            .iter()
            .map(|(id, name)| MaterialDef {
                id: id.to_string(),
                name: name.to_string(),
            })
            .collect(),
    }
}

/// Compiled-in set-bonus defaults.
pub fn default_set_bonuses() -> SetBonusDefs {
    SetBonusDefs {
        sets: vec![
            SetBonusDef {
                set: "leather".to_string(),
                name: "Leather Set".to_string(),
                tiers: vec![
                    SetTier {
                        pieces: 2,
                        atk: 0,
                        def: 5,
                        description: "Bonus (2 pieces): +5 DEF".to_string(),
                    },
                    SetTier {
                        pieces: 4,
                        atk: 5,
                        def: 10,
                        description: "Bonus (4 pieces): +10 DEF, +5 ATK".to_string(),
                    },
                ],
            },
            SetBonusDef {
                set: "iron".to_string(),
                name: "Iron Set".to_string(),
                tiers: vec![
                    SetTier {
                        pieces: 2,
                        atk: 0,
                        def: 10,
                        description: "Bonus (2 pieces): +10 DEF".to_string(),
                    },
                    SetTier {
                        pieces: 4,
                        atk: 10,
                        def: 25,
                        description: "Bonus (4 pieces): +25 DEF, +10 ATK".to_string(),
                    },
                ],
            },
            SetBonusDef {
                set: "steel".to_string(),
                name: "Steel Set".to_string(),
                tiers: vec![
                    SetTier {
                        pieces: 2,
                        atk: 15,
                        def: 0,
                        description: "Bonus (2 pieces): +15 ATK".to_string(),
                    },
                    SetTier {
                        pieces: 4,
                        atk: 30,
                        def: 15,
                        description: "Bonus (4 pieces): +30 ATK, +15 DEF".to_string(),
                    },
                ],
            },
        ],
    }
}
