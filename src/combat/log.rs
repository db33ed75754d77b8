//! Ordered combat log.
//!
//! Entries are either standard text or narrative placeholders that a
//! background storyteller fills in later.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

pub type LogEntryId = u64;

/// Maximum retained entries; older ones are dropped from the front.
const LOG_CAPACITY: usize = 100;

/// Visual category of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogIcon {
    Attack,
    Skill,
    Heal,
    Buff,
    Debuff,
    Dodge,
    Monster,
    Victory,
    Defeat,
    Loot,
    Quest,
    Gold,
    Level,
    Info,
    Narrative,
}

impl LogIcon {
    pub fn symbol(self) -> char {
        match self {
            LogIcon::Attack => '⚔',
            LogIcon::Skill => '✦',
            LogIcon::Heal => '♥',
            LogIcon::Buff => '▲',
            LogIcon::Debuff => '▼',
            LogIcon::Dodge => '~',
            LogIcon::Monster => '!',
            LogIcon::Victory => '★',
            LogIcon::Defeat => '✝',
            LogIcon::Loot => '◆',
            LogIcon::Quest => '?',
            LogIcon::Gold => '$',
            LogIcon::Level => '↑',
            LogIcon::Info => '·',
            LogIcon::Narrative => '"',
        }
    }
}

/// State of a narrative entry: a placeholder until the storyteller answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NarrativeState {
    Pending,
    Resolved(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogBody {
    Standard { text: String, icon: LogIcon },
    Narrative(NarrativeState),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: LogEntryId,
    pub body: LogBody,
}

impl LogEntry {
    /// Display text; pending narrative shows an ellipsis.
    pub fn text(&self) -> &str {
        match &self.body {
            LogBody::Standard { text, .. } => text,
            LogBody::Narrative(NarrativeState::Resolved(text)) => text,
            LogBody::Narrative(NarrativeState::Pending) => "...",
        }
    }
}

/// Capped, ordered log of combat events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatLog {
    entries: VecDeque<LogEntry>,
    next_id: LogEntryId,
}

impl CombatLog {
    pub fn push_standard(&mut self, text: impl Into<String>, icon: LogIcon) -> LogEntryId {
        self.push(LogBody::Standard {
            text: text.into(),
            icon,
        })
    }

    /// Reserve a placeholder for narrative text that arrives later.
    pub fn push_pending(&mut self) -> LogEntryId {
        self.push(LogBody::Narrative(NarrativeState::Pending))
    }

    /// Patch narrative text into its placeholder. Returns false when the
    /// entry has already been dropped or is not a pending narrative slot.
    pub fn resolve(&mut self, id: LogEntryId, text: String) -> bool {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            if matches!(entry.body, LogBody::Narrative(NarrativeState::Pending)) {
                entry.body = LogBody::Narrative(NarrativeState::Resolved(text));
                return true;
            }
        }
        false
    }

    fn push(&mut self, body: LogBody) -> LogEntryId {
        let id = self.next_id;
        self.next_id += 1;
        if self.entries.len() == LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry { id, body });
        id
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
