//! Emberfall: a turn-based combat and progression engine for a single-player
//! text RPG.
//!
//! The crate is a pure engine. [`GameSession`] owns every piece of mutable
//! state and exposes explicit operations for combat turns, shopping,
//! equipment, skills, upgrades and quests; renderers consume the read-only
//! [`CombatView`] projection. An optional [`narrative::Narrator`] adds
//! asynchronous flavor text without ever touching combat results.

pub mod combat;
pub mod data;
pub mod error;
pub mod items;
pub mod narrative;
pub mod player;
pub mod progression;
pub mod save;
pub mod session;

pub use data::GameData;
pub use error::GameError;
pub use session::{CombatView, GameSession};
