//! Player character state.

use serde::{Deserialize, Serialize};

/// Mutable player stats. Equipment and effects live elsewhere; these are the
/// raw base values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStats {
    pub level: u32,
    pub hp: i32,
    pub max_hp: i32,
    pub energy: i32,
    pub max_energy: i32,
    pub gold: u32,
    pub base_atk: i32,
    pub base_def: i32,
    pub exp: u32,
    pub exp_to_next_level: u32,
    /// Ids of learned skills, in learn order.
    pub learned_skills: Vec<String>,
}

impl Default for PlayerStats {
    fn default() -> Self {
        PlayerStats {
            level: 1,
            hp: 100,
            max_hp: 100,
            energy: 50,
            max_energy: 50,
            gold: 100,
            base_atk: 10,
            base_def: 5,
            exp: 0,
            exp_to_next_level: 100,
            learned_skills: Vec::new(),
        }
    }
}

impl PlayerStats {
    /// Reduce HP, clamped at 0. Returns the damage actually taken.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let taken = amount.min(self.hp).max(0);
        self.hp -= taken;
        taken
    }

    /// Restore HP, clamped at max. Returns the amount actually healed.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let healed = amount.min(self.max_hp - self.hp).max(0);
        self.hp += healed;
        healed
    }

    /// Restore energy, clamped at max.
    pub fn restore_energy(&mut self, amount: i32) {
        self.energy = (self.energy + amount.max(0)).min(self.max_energy);
    }

    /// Spend energy. Callers check affordability first.
    pub fn spend_energy(&mut self, amount: i32) {
        self.energy = (self.energy - amount).max(0);
    }

    pub fn hp_fraction(&self) -> f64 {
        if self.max_hp <= 0 {
            0.0
        } else {
            self.hp as f64 / self.max_hp as f64
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn knows_skill(&self, id: &str) -> bool {
        self.learned_skills.iter().any(|s| s == id)
    }
}
