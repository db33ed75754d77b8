//! Loot rolls after a victory.

use rand::Rng;

use crate::data::monsters::MonsterDef;
use crate::data::GameData;

/// What dropped: item template ids and material ids, one entry per drop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LootResult {
    pub items: Vec<String>,
    pub materials: Vec<String>,
}

/// Roll the monster's loot table.
///
/// Each item entry rolls independently against `chance / drop_factor`, where
/// the drop factor comes from the item's rarity. Bosses bypass the factor and
/// use the raw chance, so guaranteed boss drops stay guaranteed. Material
/// entries always use the raw chance.
pub fn roll_loot(monster: &MonsterDef, data: &GameData, rng: &mut impl Rng) -> LootResult {
    let mut result = LootResult::default();

    for drop in &monster.loot.items {
        let Some(def) = data.items.find(&drop.item) else {
            log::warn!("loot table for {} references unknown item {}", monster.name, drop.item);
            continue;
        };
        let chance = if monster.boss {
            drop.chance
        } else {
            drop.chance / def.rarity.drop_factor()
        };
        if rng.gen::<f64>() < chance {
            result.items.push(drop.item.clone());
        }
    }

    for drop in &monster.loot.materials {
        if rng.gen::<f64>() < drop.chance {
            result.materials.push(drop.material.clone());
        }
    }

    result
}
