//! Damage and elemental math.

use crate::data::Element;

/// How an attack's element interacted with the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effectiveness {
    Neutral,
    /// Hit the target's weakness (x1.5)
    SuperEffective,
    /// Hit the target's elemental resistance (x0.5)
    NotVeryEffective,
    /// Halved by the defender's resistance gear
    Resisted,
}

impl Effectiveness {
    pub fn describe(self) -> Option<&'static str> {
        match self {
            Effectiveness::Neutral => None,
            Effectiveness::SuperEffective => Some("It's super effective!"),
            Effectiveness::NotVeryEffective => Some("It's not very effective..."),
            Effectiveness::Resisted => Some("The blow is resisted!"),
        }
    }
}

/// Elemental multiplier for an attack element against a target's weakness
/// and resistance. Weakness takes 1.5, resistance 0.5, otherwise 1.0.
pub fn elemental_factor(
    attack: Option<Element>,
    weakness: Option<Element>,
    resistance: Option<Element>,
) -> (f64, Effectiveness) {
    match attack {
        Some(e) if weakness == Some(e) => (1.5, Effectiveness::SuperEffective),
        Some(e) if resistance == Some(e) => (0.5, Effectiveness::NotVeryEffective),
        _ => (1.0, Effectiveness::Neutral),
    }
}

/// `final = floor(max(1, atk - def) * multiplier)`.
///
/// The pre-multiplier base never drops below 1, so any landed hit deals at
/// least some damage before multipliers shrink it.
pub fn attack_damage(eff_atk: i32, target_def: i32, multiplier: f64) -> i32 {
    let base = (eff_atk - target_def).max(1);
    (base as f64 * multiplier).floor() as i32
}
