//! Kill-quest tracking.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::quests::QuestDefs;
use crate::error::GameError;

/// Progress on one quest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestProgress {
    /// Matching kills so far; counts past the requirement too
    pub kills: u32,
    /// Set once the reward has been claimed
    pub claimed: bool,
}

/// Progress across all quests, keyed by quest id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestLog {
    progress: HashMap<String, QuestProgress>,
}

impl QuestLog {
    pub fn progress(&self, quest_id: &str) -> QuestProgress {
        self.progress.get(quest_id).cloned().unwrap_or_default()
    }

    /// Record a kill against every matching, unclaimed quest. `target` is the
    /// defeated monster's quest-target name and must equal the quest's target
    /// exactly. Returns the ids of quests that just reached their requirement.
    pub fn record_kill(&mut self, target: &str, defs: &QuestDefs) -> Vec<String> {
        let mut newly_complete = Vec::new();
        for quest in &defs.quests {
            if quest.target != target {
                continue;
            }
            let entry = self.progress.entry(quest.id.clone()).or_default();
            if entry.claimed {
                continue;
            }
            entry.kills += 1;
            if entry.kills == quest.required {
                newly_complete.push(quest.id.clone());
            }
        }
        newly_complete
    }

    /// Whether the quest can be claimed right now.
    pub fn can_claim(&self, quest_id: &str, defs: &QuestDefs) -> bool {
        let Some(quest) = defs.find(quest_id) else {
            return false;
        };
        let p = self.progress(quest_id);
        !p.claimed && p.kills >= quest.required
    }

    /// Whether the quest's reward has been claimed.
    pub fn is_claimed(&self, quest_id: &str) -> bool {
        self.progress(quest_id).claimed
    }

    /// Mark the quest claimed. Errors when incomplete, unknown or repeated;
    /// rewards are granted by the caller.
    pub fn claim(&mut self, quest_id: &str, defs: &QuestDefs) -> Result<(), GameError> {
        let quest = defs
            .find(quest_id)
            .ok_or_else(|| GameError::UnknownQuest(quest_id.to_string()))?;
        let entry = self.progress.entry(quest.id.clone()).or_default();
        if entry.claimed {
            return Err(GameError::QuestAlreadyClaimed);
        }
        if entry.kills < quest.required {
            return Err(GameError::QuestIncomplete);
        }
        entry.claimed = true;
        Ok(())
    }
}
