//! Temporary stat effects (buffs and debuffs).

use serde::{Deserialize, Serialize};

use crate::data::Stat;

/// A multiplicative stat modifier with a remaining-turn counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporaryEffect {
    /// Name of the skill or ability that applied it
    pub name: String,
    pub stat: Stat,
    pub multiplier: f64,
    /// Rounds left, always >= 1 while the effect exists
    pub remaining: u32,
}

/// Effects expired by a tick.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub expired: Vec<TemporaryEffect>,
}

/// The effects active on one combatant. At most one effect per stat;
/// applying another replaces it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectSet {
    effects: Vec<TemporaryEffect>,
}

impl EffectSet {
    /// Apply an effect. An existing effect on the same stat is replaced in
    /// place, keeping its position in the application order. Effects with no
    /// rounds remaining are dropped; content files may carry a zero duration.
    pub fn apply(&mut self, effect: TemporaryEffect) {
        if effect.remaining == 0 {
            return;
        }
        if let Some(existing) = self.effects.iter_mut().find(|e| e.stat == effect.stat) {
            *existing = effect;
        } else {
            self.effects.push(effect);
        }
    }

    /// Fold the effects for `stat` over a value, flooring after each
    /// multiplication, in application order.
    pub fn apply_to(&self, stat: Stat, value: i32) -> i32 {
        self.effects
            .iter()
            .filter(|e| e.stat == stat)
            .fold(value, |v, e| (v as f64 * e.multiplier).floor() as i32)
    }

    /// Decrement every effect by one round, removing and reporting the ones
    /// that reach zero.
    pub fn tick(&mut self) -> TickReport {
        let mut expired = Vec::new();
        self.effects.retain_mut(|e| {
            e.remaining -= 1;
            if e.remaining == 0 {
                expired.push(e.clone());
                false
            } else {
                true
            }
        });
        TickReport { expired }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TemporaryEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effect(name: &str, stat: Stat, multiplier: f64, remaining: u32) -> TemporaryEffect {
        TemporaryEffect {
            name: name.to_string(),
            stat,
            multiplier,
            remaining,
        }
    }

    #[test]
    fn zero_duration_is_dropped_on_apply() {
        let mut set = EffectSet::default();
        set.apply(effect("noop", Stat::Atk, 1.2, 0));
        assert!(set.is_empty());
        // A later tick must not see it either
        assert!(set.tick().expired.is_empty());
    }

    #[test]
    fn reapplying_replaces_same_stat() {
        let mut set = EffectSet::default();
        set.apply(effect("War Cry", Stat::Atk, 1.2, 1));
        set.apply(effect("War Cry", Stat::Atk, 1.2, 3));
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next().unwrap().remaining, 3);
    }

    #[test]
    fn different_stats_coexist() {
        let mut set = EffectSet::default();
        set.apply(effect("War Cry", Stat::Atk, 1.2, 3));
        set.apply(effect("Stone Skin", Stat::Def, 1.3, 3));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn apply_to_floors_each_step() {
        let mut set = EffectSet::default();
        set.apply(effect("a", Stat::Atk, 1.2, 3));
        // floor(25 * 1.2) = 30
        assert_eq!(set.apply_to(Stat::Atk, 25), 30);
        // Def untouched
        assert_eq!(set.apply_to(Stat::Def, 25), 25);
        // floor(21 * 1.2) = 25, not 25.2 rounded
        assert_eq!(set.apply_to(Stat::Atk, 21), 25);
    }

    #[test]
    fn tick_expires_at_zero() {
        let mut set = EffectSet::default();
        set.apply(effect("short", Stat::Atk, 1.2, 1));
        set.apply(effect("long", Stat::Def, 1.3, 2));

        let report = set.tick();
        assert_eq!(report.expired.len(), 1);
        assert_eq!(report.expired[0].name, "short");
        assert_eq!(set.len(), 1);

        let report = set.tick();
        assert_eq!(report.expired.len(), 1);
        assert_eq!(report.expired[0].name, "long");
        assert!(set.is_empty());
    }
}
