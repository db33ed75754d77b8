//! Monster action selection.

use rand::Rng;

use crate::data::monsters::{AbilityDef, AiBehavior, MonsterDef};

/// What the monster does on its turn.
#[derive(Debug, Clone, PartialEq)]
pub enum MonsterMove {
    Ability(AbilityDef),
    Basic,
}

/// Pick the monster's action for this turn.
///
/// `boss_turn` is the boss cycle counter, already incremented for this turn.
/// Bosses follow a fixed 3-turn cycle; other behaviors roll against the RNG.
pub fn choose_action(
    monster: &MonsterDef,
    monster_hp: i32,
    boss_turn: u32,
    rng: &mut impl Rng,
) -> MonsterMove {
    match monster.behavior {
        AiBehavior::BossPattern => match boss_turn % 3 {
            2 => monster
                .find_buff()
                .cloned()
                .map(MonsterMove::Ability)
                .unwrap_or(MonsterMove::Basic),
            0 => monster
                .find_heavy_attack()
                .cloned()
                .map(MonsterMove::Ability)
                .unwrap_or(MonsterMove::Basic),
            _ => MonsterMove::Basic,
        },
        AiBehavior::Healer => {
            let half = monster.max_hp / 2;
            if monster_hp < half {
                if let Some(heal) = monster.find_heal() {
                    return MonsterMove::Ability(heal.clone());
                }
            }
            roll_abilities(monster, rng)
        }
        AiBehavior::Debuffer => {
            if rng.gen::<f64>() < 0.5 {
                if let Some(debuff) = monster.find_debuff() {
                    return MonsterMove::Ability(debuff.clone());
                }
            }
            roll_abilities(monster, rng)
        }
        AiBehavior::Standard | AiBehavior::Evasive => roll_abilities(monster, rng),
    }
}

/// First ability whose independent chance roll succeeds, else a basic attack.
fn roll_abilities(monster: &MonsterDef, rng: &mut impl Rng) -> MonsterMove {
    for ability in &monster.abilities {
        if rng.gen::<f64>() < ability.chance {
            return MonsterMove::Ability(ability.clone());
        }
    }
    MonsterMove::Basic
}
