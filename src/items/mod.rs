//! Owned items: instances, equipment slots and set bonuses.

pub mod equipment;
pub mod item;
pub mod sets;

pub use equipment::Equipment;
pub use item::{InstanceId, ItemInstance, MAX_UPGRADE_LEVEL};
pub use sets::{active_set_bonuses, ActiveSetBonus};
