//! Optional async storyteller.
//!
//! A [`Narrator`] turns a structured turn summary into flavor text. Requests
//! run on fire-and-forget worker threads; results land in a shared queue the
//! session drains between turns and patches into pending log entries. The
//! storyteller can never block or alter combat: a failed or slow narrator
//! degrades to a fallback sentence, and results for a torn-down encounter
//! are discarded.

use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use thiserror::Error;

use crate::combat::LogEntryId;
use crate::data::Element;

/// Shown when the narrator fails.
pub const FALLBACK_TEXT: &str = "The storyteller's voice fades, lost to the chaos of battle...";

/// Everything a narrator may know about one resolved turn.
#[derive(Debug, Clone, Default)]
pub struct TurnEvent {
    /// "attack", skill name, ability name, "dodge", ...
    pub action: String,
    pub skill_name: Option<String>,
    pub attack_element: Option<Element>,
    /// e.g. "super effective", "resisted"
    pub elemental_effect: Option<String>,
    pub damage_dealt: Option<i32>,
    /// The target dodged; no damage was dealt
    pub dodged: bool,
    pub healed: Option<i32>,
    pub lifesteal: Option<i32>,
    pub buff_applied: Option<String>,
    pub debuff_applied: Option<String>,
    /// "victory", "defeat", "ongoing"
    pub result: String,
    pub monster_name: String,
}

#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("narrative generation failed: {0}")]
    Generation(String),
}

/// A pluggable turn describer. Implementations may call out to anything;
/// they run off-thread and may take as long as they like.
pub trait Narrator: Send + Sync {
    fn describe_turn(&self, event: &TurnEvent, is_player_turn: bool)
        -> Result<String, NarrativeError>;
}

/// A finished narration, waiting to be patched into the log.
#[derive(Debug, Clone)]
pub struct NarrativeResult {
    /// Encounter generation the request belongs to
    pub generation: u64,
    /// Pending log entry to fill
    pub entry: LogEntryId,
    pub text: String,
}

/// Dispatches narration requests and collects their results.
#[derive(Clone)]
pub struct NarrativeHub {
    narrator: Option<Arc<dyn Narrator>>,
    results: Arc<Mutex<Vec<NarrativeResult>>>,
}

impl std::fmt::Debug for NarrativeHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NarrativeHub")
            .field("enabled", &self.narrator.is_some())
            .finish()
    }
}

impl NarrativeHub {
    /// A hub with no narrator; dispatch is a no-op.
    pub fn disabled() -> Self {
        NarrativeHub {
            narrator: None,
            results: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn new(narrator: Arc<dyn Narrator>) -> Self {
        NarrativeHub {
            narrator: Some(narrator),
            results: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.narrator.is_some()
    }

    /// Fire a narration request for a pending log entry. Returns immediately;
    /// the result shows up in a later [`NarrativeHub::drain`].
    pub fn dispatch(
        &self,
        generation: u64,
        entry: LogEntryId,
        event: TurnEvent,
        is_player_turn: bool,
    ) {
        let Some(narrator) = self.narrator.clone() else {
            return;
        };
        let results = Arc::clone(&self.results);
        thread::spawn(move || {
            let text = match narrator.describe_turn(&event, is_player_turn) {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("narrator failed: {e}");
                    FALLBACK_TEXT.to_string()
                }
            };
            results.lock().push(NarrativeResult {
                generation,
                entry,
                text,
            });
        });
    }

    /// Take every result that has arrived so far.
    pub fn drain(&self) -> Vec<NarrativeResult> {
        std::mem::take(&mut *self.results.lock())
    }
}
