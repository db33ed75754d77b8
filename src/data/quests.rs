//! Quest definitions.

use serde::{Deserialize, Serialize};

/// A kill-target quest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestDef {
    pub id: String,
    pub title: String,
    /// Monster target name to match kills against
    pub target: String,
    /// Kills required before the reward can be claimed
    pub required: u32,
    pub reward_gold: u32,
    pub reward_exp: u32,
}

/// Collection of quest definitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestDefs {
    pub quests: Vec<QuestDef>,
}

impl QuestDefs {
    pub fn find(&self, id: &str) -> Option<&QuestDef> {
        self.quests.iter().find(|q| q.id == id)
    }
}

fn quest(id: &str, title: &str, target: &str, required: u32, gold: u32, exp: u32) -> QuestDef {
    QuestDef {
        id: id.to_string(),
        title: title.to_string(),
        target: target.to_string(),
        required,
        reward_gold: gold,
        reward_exp: exp,
    }
}

/// Compiled-in quest defaults.
pub fn default_quests() -> QuestDefs {
    QuestDefs {
        quests: vec![
            quest("q1", "Slime Extermination", "Slime", 5, 100, 50),
            quest("q2", "Goblin Menace", "Goblin", 3, 250, 120),
            quest("q3", "Heart of Stone", "Golem", 5, 1000, 500),
            quest("q4", "The Guardian Falls", "Guardian Golem", 1, 5000, 2000),
            quest("q5", "Serpents of the Gale", "Serpent", 10, 1500, 800),
            quest("q6", "Terror of the Deep", "Abyssal Serpent", 1, 8000, 3000),
        ],
    }
}
