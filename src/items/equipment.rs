//! Equipped gear, one item per slot.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::SlotType;
use crate::items::ItemInstance;

/// The player's equipped gear. Each slot holds at most one item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Equipment {
    slots: HashMap<SlotType, ItemInstance>,
}

impl Equipment {
    /// Equip an item into its slot, returning whatever it replaced.
    pub fn equip(&mut self, item: ItemInstance) -> Option<ItemInstance> {
        self.slots.insert(item.slot, item)
    }

    /// Remove the item in a slot, if any.
    pub fn unequip(&mut self, slot: SlotType) -> Option<ItemInstance> {
        self.slots.remove(&slot)
    }

    pub fn get(&self, slot: SlotType) -> Option<&ItemInstance> {
        self.slots.get(&slot)
    }

    pub fn get_mut(&mut self, slot: SlotType) -> Option<&mut ItemInstance> {
        self.slots.get_mut(&slot)
    }

    /// All equipped items, in no particular order.
    pub fn items(&self) -> impl Iterator<Item = &ItemInstance> {
        self.slots.values()
    }

    pub fn items_mut(&mut self) -> impl Iterator<Item = &mut ItemInstance> {
        self.slots.values_mut()
    }

    pub fn atk_bonus(&self) -> i32 {
        self.slots.values().map(|i| i.atk).sum()
    }

    pub fn def_bonus(&self) -> i32 {
        self.slots.values().map(|i| i.def).sum()
    }
}
