//! Content loading.
//!
//! Each table can be overridden by a RON file under `assets/data/`. Missing or
//! malformed files fall back to the compiled-in defaults, so the engine always
//! starts with a playable content set.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use super::items::{
    default_item_templates, default_material_templates, default_set_bonuses, ItemTemplates,
    MaterialTemplates, SetBonusDefs,
};
use super::monsters::{default_monster_templates, MonsterTemplates};
use super::quests::{default_quests, QuestDefs};
use super::skills::{default_skills, SkillCollection};

const DATA_DIR: &str = "assets/data";

/// The full static content database.
#[derive(Debug, Clone)]
pub struct GameData {
    pub items: ItemTemplates,
    pub materials: MaterialTemplates,
    pub sets: SetBonusDefs,
    pub skills: SkillCollection,
    pub monsters: MonsterTemplates,
    pub quests: QuestDefs,
    /// Item ids the shop offers for sale.
    pub shop: Vec<String>,
}

impl GameData {
    /// Load the database, preferring RON overrides on disk.
    pub fn new() -> Self {
        Self::load_from(Path::new(DATA_DIR))
    }

    fn load_from(dir: &Path) -> Self {
        let defaults = Self::default();
        GameData {
            items: load_or(dir.join("items.ron"), defaults.items),
            materials: load_or(dir.join("materials.ron"), defaults.materials),
            sets: load_or(dir.join("sets.ron"), defaults.sets),
            skills: load_or(dir.join("skills.ron"), defaults.skills),
            monsters: load_or(dir.join("monsters.ron"), defaults.monsters),
            quests: load_or(dir.join("quests.ron"), defaults.quests),
            shop: defaults.shop,
        }
    }
}

impl Default for GameData {
    /// The compiled-in content set.
    fn default() -> Self {
        GameData {
            items: default_item_templates(),
            materials: default_material_templates(),
            sets: default_set_bonuses(),
            skills: default_skills(),
            monsters: default_monster_templates(),
            quests: default_quests(),
            shop: [
                "w1", "s1", "h1", "a1", "g1", "b1", "w2", "s2", "h2", "a2", "g2", "b2", "w3",
                "w4", "s3", "w5", "s4", "w6", "h3", "a3", "s5", "w7", "w8", "s6",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

fn load_or<T: DeserializeOwned>(path: impl AsRef<Path>, fallback: T) -> T {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(text) => match ron::from_str(&text) {
            Ok(value) => {
                log::info!("loaded content from {}", path.display());
                value
            }
            Err(e) => {
                log::warn!("failed to parse {}: {e}; using defaults", path.display());
                fallback
            }
        },
        Err(_) => fallback,
    }
}
