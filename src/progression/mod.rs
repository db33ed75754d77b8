//! Rewards, leveling, loot rolls and quest tracking.

pub mod loot;
pub mod quests;
pub mod xp;

pub use loot::{roll_loot, LootResult};
pub use quests::{QuestLog, QuestProgress};
pub use xp::{grant_exp, roll_rewards, LevelUp, VictoryRewards};
