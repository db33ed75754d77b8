//! Per-encounter combat state.

use serde::{Deserialize, Serialize};

use crate::data::monsters::MonsterDef;
use crate::data::Stat;

use super::effects::EffectSet;
use super::log::CombatLog;

/// How a finished encounter ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Victory,
    Defeat,
}

/// Whose action the encounter is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    PlayerTurn,
    MonsterTurn,
    Resolved(Outcome),
}

/// A running fight against one monster. The template stays immutable; the
/// encounter owns the monster's current HP and both effect lists.
#[derive(Debug, Clone)]
pub struct Encounter {
    pub monster: MonsterDef,
    pub monster_hp: i32,
    /// Boss cycle counter, incremented at the start of each monster turn
    pub turn: u32,
    pub player_effects: EffectSet,
    pub monster_effects: EffectSet,
    pub log: CombatLog,
    pub phase: Phase,
    /// Ties async narrative results to this encounter instance
    pub generation: u64,
}

impl Encounter {
    pub fn new(monster: MonsterDef, generation: u64) -> Self {
        let monster_hp = monster.max_hp;
        Encounter {
            monster,
            monster_hp,
            turn: 0,
            player_effects: EffectSet::default(),
            monster_effects: EffectSet::default(),
            log: CombatLog::default(),
            phase: Phase::PlayerTurn,
            generation,
        }
    }

    /// Reduce monster HP, clamped at 0. Returns the damage actually dealt.
    pub fn damage_monster(&mut self, amount: i32) -> i32 {
        let dealt = amount.min(self.monster_hp).max(0);
        self.monster_hp -= dealt;
        dealt
    }

    /// Restore monster HP, clamped at max. Returns the amount healed.
    pub fn heal_monster(&mut self, amount: i32) -> i32 {
        let healed = amount.min(self.monster.max_hp - self.monster_hp).max(0);
        self.monster_hp += healed;
        healed
    }

    /// Monster attack after its active atk effects.
    pub fn effective_monster_atk(&self) -> i32 {
        self.monster_effects.apply_to(Stat::Atk, self.monster.atk)
    }

    /// Monster defense after its active def effects.
    pub fn effective_monster_def(&self) -> i32 {
        self.monster_effects.apply_to(Stat::Def, self.monster.def)
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::Resolved(_))
    }
}
