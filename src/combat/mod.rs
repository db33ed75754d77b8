//! Combat: effect lifecycle, damage math, stat aggregation, monster AI,
//! the combat log and per-encounter state.

pub mod ai;
pub mod damage;
pub mod effects;
pub mod encounter;
pub mod log;
pub mod stats;

pub use damage::{attack_damage, elemental_factor, Effectiveness};
pub use effects::{EffectSet, TemporaryEffect};
pub use encounter::{Encounter, Outcome, Phase};
pub use log::{CombatLog, LogBody, LogEntry, LogEntryId, LogIcon, NarrativeState};
pub use stats::{effective_stats, EffectiveStats};
