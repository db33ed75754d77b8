//! Effective player stats from base values, gear, set bonuses and effects.

use crate::data::{Element, GameData, Stat};
use crate::items::{active_set_bonuses, ActiveSetBonus, Equipment};
use crate::player::PlayerStats;

use super::effects::EffectSet;

/// The aggregated combat stats of the player at a point in time.
#[derive(Debug, Clone)]
pub struct EffectiveStats {
    pub atk: i32,
    pub def: i32,
    /// Element of the equipped weapon, if any
    pub attack_element: Option<Element>,
    /// Union of resistances granted by equipped gear, deduplicated
    pub resistances: Vec<Element>,
    pub set_bonuses: Vec<ActiveSetBonus>,
    /// Item contribution alone, for display
    pub equipment_atk: i32,
    pub equipment_def: i32,
}

impl EffectiveStats {
    pub fn resists(&self, element: Element) -> bool {
        self.resistances.contains(&element)
    }
}

/// Aggregate the player's effective stats. Pure read.
///
/// Order: base + item sums, plus the highest qualifying tier of each set
/// added once, then temporary effects applied multiplicatively in their
/// application order with a floor after each step.
pub fn effective_stats(
    player: &PlayerStats,
    equipment: &Equipment,
    effects: &EffectSet,
    data: &GameData,
) -> EffectiveStats {
    let equipment_atk = equipment.atk_bonus();
    let equipment_def = equipment.def_bonus();

    let mut atk = player.base_atk + equipment_atk;
    let mut def = player.base_def + equipment_def;

    let set_bonuses = active_set_bonuses(equipment, data);
    for bonus in &set_bonuses {
        atk += bonus.atk;
        def += bonus.def;
    }

    atk = effects.apply_to(Stat::Atk, atk);
    def = effects.apply_to(Stat::Def, def);

    let mut attack_element = None;
    let mut resistances: Vec<Element> = Vec::new();
    for item in equipment.items() {
        if let Some(item_def) = data.items.find(&item.item) {
            if item_def.slot == crate::data::SlotType::Weapon {
                attack_element = item_def.element;
            }
            for &r in &item_def.resistance {
                if !resistances.contains(&r) {
                    resistances.push(r);
                }
            }
        }
    }

    EffectiveStats {
        atk,
        def,
        attack_element,
        resistances,
        set_bonuses,
        equipment_atk,
        equipment_def,
    }
}
