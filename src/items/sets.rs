//! Set bonuses from matching equipped pieces.

use std::collections::HashMap;

use crate::data::GameData;
use crate::items::Equipment;

/// A set bonus currently granted by equipped gear.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSetBonus {
    pub set: String,
    pub name: String,
    /// Matching pieces equipped
    pub pieces: u8,
    /// Pieces required by the active tier
    pub of: u8,
    pub atk: i32,
    pub def: i32,
    pub description: String,
}

/// Active set bonuses for the current equipment. For each set, only the
/// highest tier whose piece count is met applies.
pub fn active_set_bonuses(equipment: &Equipment, data: &GameData) -> Vec<ActiveSetBonus> {
    let mut counts: HashMap<&str, u8> = HashMap::new();
    for item in equipment.items() {
        if let Some(def) = data.items.find(&item.item) {
            if let Some(set) = def.set.as_deref() {
                *counts.entry(set).or_insert(0) += 1;
            }
        }
    }

    let mut active = Vec::new();
    for bonus in &data.sets.sets {
        let count = counts.get(bonus.set.as_str()).copied().unwrap_or(0);
        if let Some(tier) = bonus.active_tier(count) {
            active.push(ActiveSetBonus {
                set: bonus.set.clone(),
                name: bonus.name.clone(),
                pieces: count,
                of: tier.pieces,
                atk: tier.atk,
                def: tier.def,
                description: tier.description.clone(),
            });
        }
    }
    active
}
