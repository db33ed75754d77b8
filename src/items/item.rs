//! Owned item instances and upgrade math.

use serde::{Deserialize, Serialize};

use crate::data::items::ItemDef;
use crate::data::SlotType;

pub type InstanceId = u64;

pub const MAX_UPGRADE_LEVEL: u8 = 10;

/// An owned copy of an item template, with its own upgrade level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemInstance {
    /// Template id
    pub item: String,
    pub instance_id: InstanceId,
    /// Upgrade level, 0..=10
    pub level: u8,
    /// Current atk after upgrades
    pub atk: i32,
    /// Current def after upgrades
    pub def: i32,
    pub slot: SlotType,
}

impl ItemInstance {
    /// A fresh, unupgraded instance of a template.
    pub fn from_def(def: &ItemDef, instance_id: InstanceId) -> Self {
        ItemInstance {
            item: def.id.clone(),
            instance_id,
            level: 0,
            atk: def.atk,
            def: def.def,
            slot: def.slot,
        }
    }

    /// A base stat at a given upgrade level: `base + floor(base * 0.1 * level)`.
    /// Zero stats stay zero.
    pub fn upgraded_stat(base: i32, level: u8) -> i32 {
        if base > 0 {
            base + (base as f64 * 0.1 * level as f64).floor() as i32
        } else {
            0
        }
    }

    /// Gold returned when selling: half the shop price plus 10 per upgrade level.
    pub fn sell_price(&self, def: &ItemDef) -> u32 {
        def.shop_price() / 2 + 10 * self.level as u32
    }

    /// Gold cost of the next upgrade from `level`.
    pub fn upgrade_gold_cost(level: u8) -> u32 {
        (level as u32 + 1) * 100
    }

    /// Material id required for the next upgrade from `level`.
    /// Tiers up every two levels, capped at m6.
    pub fn upgrade_material(level: u8) -> String {
        format!("m{}", (level as u32 / 2 + 1).min(6))
    }

    /// Number of materials required for the next upgrade from `level`.
    pub fn upgrade_material_cost(level: u8) -> u32 {
        level as u32 + 1
    }
}
