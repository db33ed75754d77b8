//! Victory rewards and the leveling loop.

use rand::Rng;

use crate::player::PlayerStats;

/// Gold and experience from one victory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VictoryRewards {
    pub gold: u32,
    pub exp: u32,
}

/// Roll rewards for defeating a monster of a given level.
///
/// Both rewards scale with the monster level and a random factor in [1, 2).
pub fn roll_rewards(monster_level: u32, rng: &mut impl Rng) -> VictoryRewards {
    let gold = (monster_level as f64 * 10.0 * (1.0 + rng.gen::<f64>())).floor() as u32;
    let exp = (monster_level as f64 * 15.0 * (1.0 + rng.gen::<f64>())).floor() as u32;
    VictoryRewards { gold, exp }
}

/// One level gained, with the new maxima for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    pub level: u32,
    pub max_hp: i32,
    pub max_energy: i32,
}

/// Add experience and resolve any level-ups.
///
/// Each level: the threshold is consumed and grows x1.5, max HP x1.1 and max
/// energy x1.05 (both floored), +2 atk, +1 def, and HP/energy fully restore.
/// Large grants can chain several levels.
pub fn grant_exp(player: &mut PlayerStats, exp: u32) -> Vec<LevelUp> {
    player.exp += exp;
    let mut ups = Vec::new();
    while player.exp >= player.exp_to_next_level {
        player.exp -= player.exp_to_next_level;
        player.exp_to_next_level = (player.exp_to_next_level as f64 * 1.5).floor() as u32;
        player.level += 1;
        player.max_hp = (player.max_hp as f64 * 1.1).floor() as i32;
        player.max_energy = (player.max_energy as f64 * 1.05).floor() as i32;
        player.base_atk += 2;
        player.base_def += 1;
        player.hp = player.max_hp;
        player.energy = player.max_energy;
        ups.push(LevelUp {
            level: player.level,
            max_hp: player.max_hp,
            max_energy: player.max_energy,
        });
    }
    ups
}
