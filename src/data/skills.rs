//! Player skill definitions.

use serde::{Deserialize, Serialize};

use super::Stat;

/// What a skill does when used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkillKind {
    /// Plain damage with a multiplier on the attack formula.
    Attack { multiplier: f64 },
    /// Restore `floor(max_hp * fraction)` HP. Deals no damage.
    Heal { fraction: f64 },
    /// Apply a self effect multiplying `stat` for `duration` rounds.
    Buff {
        stat: Stat,
        multiplier: f64,
        duration: u32,
    },
    /// Damage plus a stat debuff on the target.
    DebuffStrike {
        multiplier: f64,
        stat: Stat,
        stat_multiplier: f64,
        duration: u32,
    },
    /// Damage, then heal for `fraction` of the damage dealt.
    LifestealStrike { multiplier: f64, fraction: f64 },
}

/// Immutable definition of a learnable skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillDef {
    pub id: String,
    pub name: String,
    pub kind: SkillKind,
    pub energy_cost: i32,
    /// Minimum player level to learn
    pub min_level: u32,
    /// Gold cost to learn
    pub learn_cost: u32,
    #[serde(default)]
    pub description: String,
}

/// Collection of skill definitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillCollection {
    pub skills: Vec<SkillDef>,
}

impl SkillCollection {
    pub fn find(&self, id: &str) -> Option<&SkillDef> {
        self.skills.iter().find(|s| s.id == id)
    }
}

/// Compiled-in skill defaults.
pub fn default_skills() -> SkillCollection {
    SkillCollection {
        skills: vec![
            SkillDef {
                id: "sk1".to_string(),
                name: "Mighty Blow".to_string(),
                kind: SkillKind::Attack { multiplier: 1.5 },
                energy_cost: 15,
                min_level: 3,
                learn_cost: 500,
                description: "A powerful strike dealing 150% damage.".to_string(),
            },
            SkillDef {
                id: "sk2".to_string(),
                name: "Mend Wounds".to_string(),
                kind: SkillKind::Heal { fraction: 0.3 },
                energy_cost: 20,
                min_level: 5,
                learn_cost: 1000,
                description: "Heal 30% of your maximum HP.".to_string(),
            },
            SkillDef {
                id: "sk3".to_string(),
                name: "War Cry".to_string(),
                kind: SkillKind::Buff {
                    stat: Stat::Atk,
                    multiplier: 1.2,
                    duration: 3,
                },
                energy_cost: 10,
                min_level: 8,
                learn_cost: 1500,
                description: "Raise your attack by 20% for 3 turns.".to_string(),
            },
            SkillDef {
                id: "sk4".to_string(),
                name: "Stone Skin".to_string(),
                kind: SkillKind::Buff {
                    stat: Stat::Def,
                    multiplier: 1.3,
                    duration: 3,
                },
                energy_cost: 10,
                min_level: 6,
                learn_cost: 1200,
                description: "Raise your defense by 30% for 3 turns.".to_string(),
            },
            SkillDef {
                id: "sk5".to_string(),
                name: "Crippling Strike".to_string(),
                kind: SkillKind::DebuffStrike {
                    multiplier: 1.2,
                    stat: Stat::Atk,
                    stat_multiplier: 0.8,
                    duration: 2,
                },
                energy_cost: 20,
                min_level: 10,
                learn_cost: 2500,
                description: "Deal 120% damage and lower the foe's attack for 2 turns."
                    .to_string(),
            },
            SkillDef {
                id: "sk6".to_string(),
                name: "Vampiric Touch".to_string(),
                kind: SkillKind::LifestealStrike {
                    multiplier: 1.0,
                    fraction: 0.5,
                },
                energy_cost: 25,
                min_level: 12,
                learn_cost: 3500,
                description: "Deal normal damage and heal for half of it.".to_string(),
            },
        ],
    }
}
