//! The game session: all mutable state and every player-facing operation.

use std::collections::HashMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::combat::ai::{choose_action, MonsterMove};
use crate::combat::effects::TemporaryEffect;
use crate::combat::log::{CombatLog, LogEntry, LogIcon};
use crate::combat::{
    attack_damage, effective_stats, elemental_factor, Encounter, Outcome, Phase,
};
use crate::data::monsters::{AbilityKind, AiBehavior};
use crate::data::skills::SkillKind;
use crate::data::{GameData, SlotType};
use crate::error::GameError;
use crate::items::{Equipment, InstanceId, ItemInstance, MAX_UPGRADE_LEVEL};
use crate::narrative::{NarrativeHub, Narrator, TurnEvent};
use crate::player::PlayerStats;
use crate::progression::{grant_exp, roll_loot, roll_rewards, QuestLog};
use crate::save::{SaveData, SAVE_VERSION};

pub const AUTO_HEAL_GOLD_COST: u32 = 100;
pub const AUTO_HEAL_ENERGY_COST: i32 = 20;

/// Auto-battle stops chaining below this HP fraction without auto-heal.
const AUTO_BATTLE_HP_CUTOFF: f64 = 0.4;

/// What auto-heal spends to restore the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoHealCost {
    Gold,
    Energy,
}

/// Automatic full heal after the monster's action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoHealSettings {
    pub enabled: bool,
    /// HP percentage below which the heal triggers
    pub threshold: f64,
    pub cost: AutoHealCost,
}

impl Default for AutoHealSettings {
    fn default() -> Self {
        AutoHealSettings {
            enabled: false,
            threshold: 50.0,
            cost: AutoHealCost::Gold,
        }
    }
}

/// A read-only projection of the running encounter for any renderer.
#[derive(Debug, Clone)]
pub struct CombatView {
    pub player_hp: i32,
    pub player_max_hp: i32,
    pub player_energy: i32,
    pub player_max_energy: i32,
    pub monster_name: String,
    pub monster_level: u32,
    pub monster_hp: i32,
    pub monster_max_hp: i32,
    pub player_effects: Vec<TemporaryEffect>,
    pub monster_effects: Vec<TemporaryEffect>,
    pub log: Vec<LogEntry>,
    pub actions: ActionAvailability,
    pub over: Option<Outcome>,
}

/// Which actions the current state permits.
#[derive(Debug, Clone, Default)]
pub struct ActionAvailability {
    pub can_attack: bool,
    /// Learned skills the current energy can pay for
    pub usable_skills: Vec<String>,
    pub can_auto_battle: bool,
    pub auto_battling: bool,
    pub can_flee: bool,
}

/// One game in progress. Owns the content database, the RNG and all player
/// and encounter state; every operation goes through a method here.
pub struct GameSession {
    pub data: GameData,
    pub player: PlayerStats,
    pub inventory: Vec<ItemInstance>,
    pub equipment: Equipment,
    pub materials: HashMap<String, u32>,
    pub quests: QuestLog,
    pub auto_heal: AutoHealSettings,
    pub encounter: Option<Encounter>,
    rng: StdRng,
    seed: u64,
    narrative: NarrativeHub,
    auto_battle: bool,
    next_instance_id: InstanceId,
    encounter_generation: u64,
}

impl GameSession {
    pub fn new(seed: u64) -> Self {
        Self::with_data(GameData::new(), seed)
    }

    /// A session over an explicit content database. Tests use this with
    /// `GameData::default()` to avoid touching the filesystem.
    pub fn with_data(data: GameData, seed: u64) -> Self {
        GameSession {
            data,
            player: PlayerStats::default(),
            inventory: Vec::new(),
            equipment: Equipment::default(),
            materials: HashMap::new(),
            quests: QuestLog::default(),
            auto_heal: AutoHealSettings::default(),
            encounter: None,
            rng: StdRng::seed_from_u64(seed),
            seed,
            narrative: NarrativeHub::disabled(),
            auto_battle: false,
            next_instance_id: 1,
            encounter_generation: 0,
        }
    }

    /// Plug in a storyteller. Combat keeps working identically without one.
    pub fn set_narrator(&mut self, narrator: Arc<dyn Narrator>) {
        self.narrative = NarrativeHub::new(narrator);
    }

    pub fn is_auto_battling(&self) -> bool {
        self.auto_battle
    }

    // ---- encounter lifecycle -------------------------------------------

    /// Start a fight against a monster template by name.
    pub fn start_encounter(&mut self, name: &str) -> Result<(), GameError> {
        if let Some(enc) = &self.encounter {
            if !enc.is_over() {
                return Err(GameError::EncounterInProgress);
            }
        }
        let monster = self
            .data
            .monsters
            .find(name)
            .ok_or(GameError::UnknownMonster)?
            .clone();

        // Too dangerous to even try
        let required = monster.level.saturating_sub(2);
        if self.player.level < required {
            return Err(GameError::LevelTooLow { required });
        }
        if let Some(quest) = &monster.unlock_quest {
            if !self.quests.is_claimed(quest) {
                return Err(GameError::MonsterLocked);
            }
        }

        log::info!("encounter started: {}", monster.name);
        self.encounter_generation += 1;
        let mut enc = Encounter::new(monster, self.encounter_generation);
        enc.log
            .push_standard(format!("A wild {} appears!", enc.monster.name), LogIcon::Monster);
        self.encounter = Some(enc);
        self.auto_battle = false;
        Ok(())
    }

    /// Abandon the fight. No reward, no penalty.
    pub fn flee(&mut self) -> Result<(), GameError> {
        let enc = self.encounter.as_ref().ok_or(GameError::NoEncounter)?;
        if enc.is_over() {
            return Err(GameError::CombatOver);
        }
        log::info!("fled from {}", enc.monster.name);
        self.encounter = None;
        self.auto_battle = false;
        Ok(())
    }

    // ---- player turn ---------------------------------------------------

    /// Basic attack. Evasive monsters may dodge it.
    pub fn player_attack(&mut self) -> Result<(), GameError> {
        let enc = self.encounter.as_mut().ok_or(GameError::NoEncounter)?;
        match enc.phase {
            Phase::PlayerTurn => {}
            Phase::MonsterTurn => return Err(GameError::MonsterTurnPending),
            Phase::Resolved(_) => return Err(GameError::CombatOver),
        }

        let stats = effective_stats(&self.player, &self.equipment, &enc.player_effects, &self.data);
        let mut event = TurnEvent {
            action: "attack".to_string(),
            monster_name: enc.monster.name.clone(),
            result: "ongoing".to_string(),
            ..TurnEvent::default()
        };
        let mut lines: Vec<(String, LogIcon)> = Vec::new();

        if enc.monster.behavior == AiBehavior::Evasive
            && self.rng.gen::<f64>() < enc.monster.dodge_chance
        {
            event.dodged = true;
            lines.push((
                format!("The {} dodges your attack!", enc.monster.name),
                LogIcon::Dodge,
            ));
            emit_turn(&mut enc.log, enc.generation, &self.narrative, lines, event, true);
            enc.phase = Phase::MonsterTurn;
            return Ok(());
        }

        let (factor, effectiveness) =
            elemental_factor(stats.attack_element, enc.monster.weakness, enc.monster.resistance);
        let damage = attack_damage(stats.atk, enc.effective_monster_def(), factor);
        let dealt = enc.damage_monster(damage);

        event.attack_element = stats.attack_element;
        event.damage_dealt = Some(dealt);
        event.elemental_effect = effectiveness.describe().map(str::to_string);
        lines.push((
            format!("You strike the {} for {} damage.", enc.monster.name, dealt),
            LogIcon::Attack,
        ));
        if let Some(text) = effectiveness.describe() {
            lines.push((text.to_string(), LogIcon::Info));
        }

        let dead = enc.monster_hp == 0;
        if dead {
            event.result = "victory".to_string();
        }
        emit_turn(&mut enc.log, enc.generation, &self.narrative, lines, event, true);

        if dead {
            self.resolve_victory();
        } else {
            enc.phase = Phase::MonsterTurn;
        }
        Ok(())
    }

    /// Use a learned skill. Skills cannot be dodged.
    ///
    /// Returns `InsufficientEnergy` without consuming the turn or mutating
    /// anything when the cost cannot be paid.
    pub fn use_skill(&mut self, skill_id: &str) -> Result<(), GameError> {
        let skill = self
            .data
            .skills
            .find(skill_id)
            .ok_or_else(|| GameError::UnknownSkill(skill_id.to_string()))?
            .clone();
        if !self.player.knows_skill(skill_id) {
            return Err(GameError::SkillNotLearned);
        }

        let enc = self.encounter.as_mut().ok_or(GameError::NoEncounter)?;
        match enc.phase {
            Phase::PlayerTurn => {}
            Phase::MonsterTurn => return Err(GameError::MonsterTurnPending),
            Phase::Resolved(_) => return Err(GameError::CombatOver),
        }

        if self.player.energy < skill.energy_cost {
            return Err(GameError::InsufficientEnergy {
                needed: skill.energy_cost,
                available: self.player.energy,
            });
        }
        self.player.spend_energy(skill.energy_cost);

        let stats = effective_stats(&self.player, &self.equipment, &enc.player_effects, &self.data);
        let mut event = TurnEvent {
            action: skill.name.clone(),
            skill_name: Some(skill.name.clone()),
            monster_name: enc.monster.name.clone(),
            result: "ongoing".to_string(),
            ..TurnEvent::default()
        };
        let mut lines: Vec<(String, LogIcon)> = Vec::new();

        let mut strike = |enc: &mut Encounter,
                          event: &mut TurnEvent,
                          lines: &mut Vec<(String, LogIcon)>,
                          multiplier: f64|
         -> i32 {
            let (factor, effectiveness) = elemental_factor(
                stats.attack_element,
                enc.monster.weakness,
                enc.monster.resistance,
            );
            let damage =
                attack_damage(stats.atk, enc.effective_monster_def(), multiplier * factor);
            let dealt = enc.damage_monster(damage);
            event.attack_element = stats.attack_element;
            event.damage_dealt = Some(dealt);
            event.elemental_effect = effectiveness.describe().map(str::to_string);
            lines.push((
                format!("{} hits the {} for {} damage!", skill.name, enc.monster.name, dealt),
                LogIcon::Skill,
            ));
            if let Some(text) = effectiveness.describe() {
                lines.push((text.to_string(), LogIcon::Info));
            }
            damage
        };

        match skill.kind.clone() {
            SkillKind::Attack { multiplier } => {
                strike(enc, &mut event, &mut lines, multiplier);
            }
            SkillKind::Heal { fraction } => {
                let amount = (self.player.max_hp as f64 * fraction).floor() as i32;
                let healed = self.player.heal(amount);
                event.healed = Some(healed);
                lines.push((
                    format!("{} restores {} HP.", skill.name, healed),
                    LogIcon::Heal,
                ));
            }
            SkillKind::Buff {
                stat,
                multiplier,
                duration,
            } => {
                enc.player_effects.apply(TemporaryEffect {
                    name: skill.name.clone(),
                    stat,
                    multiplier,
                    remaining: duration,
                });
                event.buff_applied = Some(skill.name.clone());
                lines.push((
                    format!(
                        "{}! Your {} rises for {} turns.",
                        skill.name,
                        stat.name(),
                        duration
                    ),
                    LogIcon::Buff,
                ));
            }
            SkillKind::DebuffStrike {
                multiplier,
                stat,
                stat_multiplier,
                duration,
            } => {
                strike(enc, &mut event, &mut lines, multiplier);
                if enc.monster_hp > 0 {
                    enc.monster_effects.apply(TemporaryEffect {
                        name: skill.name.clone(),
                        stat,
                        multiplier: stat_multiplier,
                        remaining: duration,
                    });
                    event.debuff_applied = Some(skill.name.clone());
                    lines.push((
                        format!(
                            "The {}'s {} falls for {} turns.",
                            enc.monster.name,
                            stat.name(),
                            duration
                        ),
                        LogIcon::Debuff,
                    ));
                }
            }
            SkillKind::LifestealStrike { multiplier, fraction } => {
                // Heals from the full hit, even past the monster's remaining HP.
                let damage = strike(enc, &mut event, &mut lines, multiplier);
                let healed = self.player.heal((damage as f64 * fraction).floor() as i32);
                event.lifesteal = Some(healed);
                lines.push((format!("You drain {} HP.", healed), LogIcon::Heal));
            }
        }

        let dead = enc.monster_hp == 0;
        if dead {
            event.result = "victory".to_string();
        }
        emit_turn(&mut enc.log, enc.generation, &self.narrative, lines, event, true);

        if dead {
            self.resolve_victory();
        } else {
            enc.phase = Phase::MonsterTurn;
        }
        Ok(())
    }

    // ---- monster turn --------------------------------------------------

    /// Run the monster's counter-turn: effects tick, the monster acts,
    /// auto-heal fires if configured.
    pub fn advance_monster_turn(&mut self) -> Result<(), GameError> {
        let enc = self.encounter.as_mut().ok_or(GameError::NoEncounter)?;
        match enc.phase {
            Phase::MonsterTurn => {}
            Phase::PlayerTurn => return Err(GameError::NoPendingMonsterTurn),
            Phase::Resolved(_) => return Err(GameError::CombatOver),
        }

        // Both sides' effects age once per round, here.
        for expired in enc.player_effects.tick().expired {
            enc.log.push_standard(
                format!("The effect of {} wore off.", expired.name),
                LogIcon::Info,
            );
        }
        for expired in enc.monster_effects.tick().expired {
            enc.log.push_standard(
                format!("The effect of {} wore off.", expired.name),
                LogIcon::Info,
            );
        }

        enc.turn += 1;
        let action = choose_action(&enc.monster, enc.monster_hp, enc.turn, &mut self.rng);
        let stats = effective_stats(&self.player, &self.equipment, &enc.player_effects, &self.data);

        let mut event = TurnEvent {
            action: "attack".to_string(),
            monster_name: enc.monster.name.clone(),
            result: "ongoing".to_string(),
            ..TurnEvent::default()
        };
        let mut lines: Vec<(String, LogIcon)> = Vec::new();

        let resisted = enc.monster.element.map_or(false, |e| stats.resists(e));
        let mut strike = |enc: &mut Encounter,
                          player: &mut PlayerStats,
                          event: &mut TurnEvent,
                          lines: &mut Vec<(String, LogIcon)>,
                          name: Option<&str>,
                          multiplier: f64| {
            let factor = if resisted { 0.5 } else { 1.0 };
            let damage = attack_damage(enc.effective_monster_atk(), stats.def, multiplier * factor);
            let taken = player.take_damage(damage);
            event.damage_dealt = Some(taken);
            if resisted {
                event.elemental_effect = Some("resisted".to_string());
            }
            let verb = match name {
                Some(name) => format!("The {} uses {}", enc.monster.name, name),
                None => format!("The {} attacks", enc.monster.name),
            };
            lines.push((format!("{} for {} damage!", verb, taken), LogIcon::Monster));
            if resisted {
                lines.push(("Your gear resists the blow!".to_string(), LogIcon::Info));
            }
        };

        match action {
            MonsterMove::Basic => {
                strike(enc, &mut self.player, &mut event, &mut lines, None, 1.0);
            }
            MonsterMove::Ability(ability) => {
                event.action = ability.name.clone();
                match ability.kind {
                    AbilityKind::HeavyAttack { multiplier } => {
                        strike(
                            enc,
                            &mut self.player,
                            &mut event,
                            &mut lines,
                            Some(&ability.name),
                            multiplier,
                        );
                    }
                    AbilityKind::Buff {
                        stat,
                        multiplier,
                        duration,
                    } => {
                        enc.monster_effects.apply(TemporaryEffect {
                            name: ability.name.clone(),
                            stat,
                            multiplier,
                            remaining: duration,
                        });
                        event.buff_applied = Some(ability.name.clone());
                        lines.push((
                            format!(
                                "The {} uses {}! Its {} rises.",
                                enc.monster.name,
                                ability.name,
                                stat.name()
                            ),
                            LogIcon::Buff,
                        ));
                    }
                    AbilityKind::Debuff {
                        stat,
                        multiplier,
                        duration,
                    } => {
                        enc.player_effects.apply(TemporaryEffect {
                            name: ability.name.clone(),
                            stat,
                            multiplier,
                            remaining: duration,
                        });
                        event.debuff_applied = Some(ability.name.clone());
                        lines.push((
                            format!(
                                "The {} uses {}! Your {} falls.",
                                enc.monster.name,
                                ability.name,
                                stat.name()
                            ),
                            LogIcon::Debuff,
                        ));
                    }
                    AbilityKind::Heal { fraction } => {
                        let amount = (enc.monster.max_hp as f64 * fraction).floor() as i32;
                        let healed = enc.heal_monster(amount);
                        event.healed = Some(healed);
                        lines.push((
                            format!(
                                "The {} uses {} and recovers {} HP.",
                                enc.monster.name, ability.name, healed
                            ),
                            LogIcon::Heal,
                        ));
                    }
                }
            }
        }

        let defeated = !self.player.is_alive();
        if defeated {
            event.result = "defeat".to_string();
        }
        emit_turn(&mut enc.log, enc.generation, &self.narrative, lines, event, false);

        if defeated {
            enc.phase = Phase::Resolved(Outcome::Defeat);
            enc.log
                .push_standard("You have been defeated...", LogIcon::Defeat);
            self.auto_battle = false;
            return Ok(());
        }

        // Auto-heal runs once per round, right after the monster's action.
        // Short funds skip it quietly.
        if self.auto_heal.enabled
            && self.player.hp_fraction() * 100.0 < self.auto_heal.threshold
        {
            match self.auto_heal.cost {
                AutoHealCost::Gold => {
                    if self.player.gold >= AUTO_HEAL_GOLD_COST {
                        self.player.gold -= AUTO_HEAL_GOLD_COST;
                        self.player.hp = self.player.max_hp;
                        enc.log.push_standard(
                            format!("Auto-heal restores you to full. (-{} gold)", AUTO_HEAL_GOLD_COST),
                            LogIcon::Heal,
                        );
                    } else {
                        log::debug!("auto-heal skipped: not enough gold");
                    }
                }
                AutoHealCost::Energy => {
                    if self.player.energy >= AUTO_HEAL_ENERGY_COST {
                        self.player.spend_energy(AUTO_HEAL_ENERGY_COST);
                        self.player.hp = self.player.max_hp;
                        enc.log.push_standard(
                            format!(
                                "Auto-heal restores you to full. (-{} energy)",
                                AUTO_HEAL_ENERGY_COST
                            ),
                            LogIcon::Heal,
                        );
                    } else {
                        log::debug!("auto-heal skipped: not enough energy");
                    }
                }
            }
        }

        enc.phase = Phase::PlayerTurn;
        Ok(())
    }

    // ---- resolution ----------------------------------------------------

    /// Rewards, loot, quest progress and auto-battle chaining after a kill.
    /// Guarded by the phase: runs at most once per encounter.
    fn resolve_victory(&mut self) {
        let Some(enc) = self.encounter.as_mut() else {
            return;
        };
        if enc.is_over() {
            return;
        }
        enc.phase = Phase::Resolved(Outcome::Victory);
        let monster = enc.monster.clone();
        log::info!("{} defeated", monster.name);
        enc.log.push_standard(
            format!("The {} is defeated!", monster.name),
            LogIcon::Victory,
        );

        let rewards = roll_rewards(monster.level, &mut self.rng);
        self.player.gold += rewards.gold;
        enc.log.push_standard(
            format!("You gain {} gold and {} EXP.", rewards.gold, rewards.exp),
            LogIcon::Gold,
        );
        for up in grant_exp(&mut self.player, rewards.exp) {
            enc.log.push_standard(
                format!("Level up! You are now level {}.", up.level),
                LogIcon::Level,
            );
        }

        let loot = roll_loot(&monster, &self.data, &mut self.rng);
        for item_id in loot.items {
            if let Some(def) = self.data.items.find(&item_id) {
                let instance = ItemInstance::from_def(def, self.next_instance_id);
                self.next_instance_id += 1;
                enc.log
                    .push_standard(format!("You found {}!", def.name), LogIcon::Loot);
                self.inventory.push(instance);
            }
        }
        for material in loot.materials {
            *self.materials.entry(material.clone()).or_insert(0) += 1;
            let name = self
                .data
                .materials
                .find(&material)
                .map(|m| m.name.clone())
                .unwrap_or(material);
            enc.log
                .push_standard(format!("You collected {}.", name), LogIcon::Loot);
        }

        let completed = self
            .quests
            .record_kill(monster.target_name(), &self.data.quests);
        for quest_id in completed {
            if let Some(quest) = self.data.quests.find(&quest_id) {
                enc.log.push_standard(
                    format!("Quest complete: {}!", quest.title),
                    LogIcon::Quest,
                );
            }
        }

        // Chain into a fresh copy of the same template when auto-battling,
        // unless the player is too hurt to keep going unattended.
        if self.auto_battle && !monster.boss {
            if self.player.hp_fraction() < AUTO_BATTLE_HP_CUTOFF && !self.auto_heal.enabled {
                self.auto_battle = false;
                enc.log.push_standard(
                    "Auto-battle stops: you are too wounded to continue.",
                    LogIcon::Info,
                );
            } else {
                self.encounter_generation += 1;
                let mut next = Encounter::new(monster, self.encounter_generation);
                next.log.push_standard(
                    format!("A wild {} appears!", next.monster.name),
                    LogIcon::Monster,
                );
                self.encounter = Some(next);
            }
        }
    }

    // ---- auto-battle ---------------------------------------------------

    /// Toggle auto-battle for the running encounter. Never allowed against
    /// bosses.
    pub fn set_auto_battle(&mut self, on: bool) -> Result<(), GameError> {
        if !on {
            self.auto_battle = false;
            return Ok(());
        }
        let enc = self.encounter.as_ref().ok_or(GameError::NoEncounter)?;
        if enc.is_over() {
            return Err(GameError::CombatOver);
        }
        if enc.monster.boss {
            return Err(GameError::AutoBattleForbidden);
        }
        self.auto_battle = true;
        Ok(())
    }

    /// One auto-battle step: a basic attack or the pending monster turn.
    pub fn auto_battle_step(&mut self) -> Result<(), GameError> {
        if !self.auto_battle {
            return Err(GameError::NoEncounter);
        }
        let phase = self.encounter.as_ref().ok_or(GameError::NoEncounter)?.phase;
        match phase {
            Phase::PlayerTurn => self.player_attack(),
            Phase::MonsterTurn => self.advance_monster_turn(),
            Phase::Resolved(_) => Err(GameError::CombatOver),
        }
    }

    // ---- town ----------------------------------------------------------

    /// Out-of-combat recovery: 1% max HP and 2% max energy per tick, both
    /// rounded up. Does nothing during an active encounter.
    pub fn regen_tick(&mut self) {
        if matches!(&self.encounter, Some(enc) if !enc.is_over()) {
            return;
        }
        let hp = (self.player.max_hp as f64 * 0.01).ceil() as i32;
        let energy = (self.player.max_energy as f64 * 0.02).ceil() as i32;
        self.player.heal(hp);
        self.player.restore_energy(energy);
    }

    /// Buy a shop item at its rarity-scaled price.
    pub fn buy(&mut self, item_id: &str) -> Result<InstanceId, GameError> {
        if !self.data.shop.iter().any(|id| id == item_id) {
            return Err(GameError::NotInShop);
        }
        let def = self.data.items.find(item_id).ok_or(GameError::UnknownItem)?;
        let price = def.shop_price();
        if self.player.gold < price {
            return Err(GameError::InsufficientGold {
                needed: price,
                available: self.player.gold,
            });
        }
        self.player.gold -= price;
        let instance = ItemInstance::from_def(def, self.next_instance_id);
        let id = instance.instance_id;
        self.next_instance_id += 1;
        log::info!("bought {} for {} gold", def.name, price);
        self.inventory.push(instance);
        Ok(id)
    }

    /// Sell an item from the inventory. Returns the gold received.
    pub fn sell(&mut self, instance_id: InstanceId) -> Result<u32, GameError> {
        let index = self
            .inventory
            .iter()
            .position(|i| i.instance_id == instance_id)
            .ok_or(GameError::ItemNotFound(instance_id))?;
        let def = self
            .data
            .items
            .find(&self.inventory[index].item)
            .ok_or(GameError::UnknownItem)?;
        let price = self.inventory[index].sell_price(def);
        self.inventory.remove(index);
        self.player.gold += price;
        Ok(price)
    }

    /// Equip an inventory item, swapping out whatever held its slot.
    pub fn equip(&mut self, instance_id: InstanceId) -> Result<(), GameError> {
        let index = self
            .inventory
            .iter()
            .position(|i| i.instance_id == instance_id)
            .ok_or(GameError::ItemNotFound(instance_id))?;
        let def = self
            .data
            .items
            .find(&self.inventory[index].item)
            .ok_or(GameError::UnknownItem)?;
        if self.player.level < def.min_level {
            return Err(GameError::LevelTooLow {
                required: def.min_level,
            });
        }
        let item = self.inventory.remove(index);
        if let Some(previous) = self.equipment.equip(item) {
            self.inventory.push(previous);
        }
        Ok(())
    }

    /// Move the item in a slot back to the inventory.
    pub fn unequip(&mut self, slot: SlotType) -> Result<(), GameError> {
        let item = self.equipment.unequip(slot).ok_or(GameError::SlotEmpty)?;
        self.inventory.push(item);
        Ok(())
    }

    /// Learn a skill, gated by level and gold.
    pub fn learn_skill(&mut self, skill_id: &str) -> Result<(), GameError> {
        let skill = self
            .data
            .skills
            .find(skill_id)
            .ok_or_else(|| GameError::UnknownSkill(skill_id.to_string()))?;
        if self.player.knows_skill(skill_id) {
            return Err(GameError::SkillAlreadyKnown);
        }
        if self.player.level < skill.min_level {
            return Err(GameError::LevelTooLow {
                required: skill.min_level,
            });
        }
        if self.player.gold < skill.learn_cost {
            return Err(GameError::InsufficientGold {
                needed: skill.learn_cost,
                available: self.player.gold,
            });
        }
        self.player.gold -= skill.learn_cost;
        self.player.learned_skills.push(skill_id.to_string());
        Ok(())
    }

    /// Upgrade an owned item (equipped or not) by one level, spending gold
    /// and materials. Stats rescale from the template base.
    pub fn upgrade_item(&mut self, instance_id: InstanceId) -> Result<(), GameError> {
        let (base_atk, base_def, level) = {
            let item = self
                .find_item(instance_id)
                .ok_or(GameError::ItemNotFound(instance_id))?;
            let def = self.data.items.find(&item.item).ok_or(GameError::UnknownItem)?;
            (def.atk, def.def, item.level)
        };
        if level >= MAX_UPGRADE_LEVEL {
            return Err(GameError::UpgradeLimit);
        }

        let gold_cost = ItemInstance::upgrade_gold_cost(level);
        let material = ItemInstance::upgrade_material(level);
        let material_cost = ItemInstance::upgrade_material_cost(level);

        if self.player.gold < gold_cost {
            return Err(GameError::InsufficientGold {
                needed: gold_cost,
                available: self.player.gold,
            });
        }
        let available = self.materials.get(&material).copied().unwrap_or(0);
        if available < material_cost {
            return Err(GameError::InsufficientMaterials {
                material,
                needed: material_cost,
                available,
            });
        }

        self.player.gold -= gold_cost;
        if let Some(count) = self.materials.get_mut(&material) {
            *count -= material_cost;
        }
        if let Some(item) = self.find_item_mut(instance_id) {
            item.level += 1;
            item.atk = ItemInstance::upgraded_stat(base_atk, item.level);
            item.def = ItemInstance::upgraded_stat(base_def, item.level);
        }
        Ok(())
    }

    /// Claim a completed quest's reward. Exactly once per quest.
    pub fn claim_quest(&mut self, quest_id: &str) -> Result<(), GameError> {
        self.quests.claim(quest_id, &self.data.quests)?;
        // Claim succeeded, so the quest exists.
        if let Some(quest) = self.data.quests.find(quest_id) {
            log::info!("quest {} claimed", quest.id);
            self.player.gold += quest.reward_gold;
            grant_exp(&mut self.player, quest.reward_exp);
        }
        Ok(())
    }

    fn find_item(&self, instance_id: InstanceId) -> Option<&ItemInstance> {
        self.inventory
            .iter()
            .find(|i| i.instance_id == instance_id)
            .or_else(|| self.equipment.items().find(|i| i.instance_id == instance_id))
    }

    fn find_item_mut(&mut self, instance_id: InstanceId) -> Option<&mut ItemInstance> {
        if self.inventory.iter().any(|i| i.instance_id == instance_id) {
            return self
                .inventory
                .iter_mut()
                .find(|i| i.instance_id == instance_id);
        }
        self.equipment
            .items_mut()
            .find(|i| i.instance_id == instance_id)
    }

    // ---- narrative -----------------------------------------------------

    /// Patch any finished narrations into their log entries. Results from a
    /// previous encounter are discarded. Returns how many entries resolved.
    pub fn poll_narrative(&mut self) -> usize {
        let mut resolved = 0;
        for result in self.narrative.drain() {
            let Some(enc) = self.encounter.as_mut() else {
                continue;
            };
            if result.generation != enc.generation {
                log::debug!("dropping stale narrative result");
                continue;
            }
            if enc.log.resolve(result.entry, result.text) {
                resolved += 1;
            }
        }
        resolved
    }

    // ---- view ----------------------------------------------------------

    /// Snapshot of the running (or just-finished) encounter for rendering.
    pub fn combat_view(&self) -> Option<CombatView> {
        let enc = self.encounter.as_ref()?;
        let over = match enc.phase {
            Phase::Resolved(outcome) => Some(outcome),
            _ => None,
        };
        let at_player_turn = enc.phase == Phase::PlayerTurn;
        let usable_skills = if at_player_turn {
            self.player
                .learned_skills
                .iter()
                .filter(|id| {
                    self.data
                        .skills
                        .find(id.as_str())
                        .map_or(false, |s| s.energy_cost <= self.player.energy)
                })
                .cloned()
                .collect()
        } else {
            Vec::new()
        };

        Some(CombatView {
            player_hp: self.player.hp,
            player_max_hp: self.player.max_hp,
            player_energy: self.player.energy,
            player_max_energy: self.player.max_energy,
            monster_name: enc.monster.name.clone(),
            monster_level: enc.monster.level,
            monster_hp: enc.monster_hp,
            monster_max_hp: enc.monster.max_hp,
            player_effects: enc.player_effects.iter().cloned().collect(),
            monster_effects: enc.monster_effects.iter().cloned().collect(),
            log: enc.log.entries().cloned().collect(),
            actions: ActionAvailability {
                can_attack: at_player_turn,
                usable_skills,
                can_auto_battle: !enc.monster.boss && over.is_none(),
                auto_battling: self.auto_battle,
                can_flee: over.is_none(),
            },
            over,
        })
    }

    // ---- persistence ---------------------------------------------------

    /// Durable state only; the running encounter is never persisted.
    pub fn snapshot(&self) -> SaveData {
        SaveData {
            version: SAVE_VERSION,
            player: self.player.clone(),
            inventory: self.inventory.clone(),
            equipment: self.equipment.clone(),
            materials: self.materials.clone(),
            quests: self.quests.clone(),
            auto_heal: self.auto_heal.clone(),
            next_instance_id: self.next_instance_id,
            rng_seed: self.seed,
        }
    }

    pub fn from_snapshot(data: GameData, save: SaveData) -> Self {
        let mut session = Self::with_data(data, save.rng_seed);
        session.player = save.player;
        session.inventory = save.inventory;
        session.equipment = save.equipment;
        session.materials = save.materials;
        session.quests = save.quests;
        session.auto_heal = save.auto_heal;
        session.next_instance_id = save.next_instance_id;
        session
    }
}

/// Standard lines go straight to the log; with a storyteller attached the
/// whole turn becomes one pending entry filled in asynchronously.
fn emit_turn(
    log: &mut CombatLog,
    generation: u64,
    hub: &NarrativeHub,
    lines: Vec<(String, LogIcon)>,
    event: TurnEvent,
    is_player_turn: bool,
) {
    if hub.is_enabled() {
        let id = log.push_pending();
        hub.dispatch(generation, id, event, is_player_turn);
    } else {
        for (text, icon) in lines {
            log.push_standard(text, icon);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::monsters::MonsterDef;
    use crate::data::Element;
    use crate::narrative::{NarrativeError, Narrator};
    use std::thread;
    use std::time::Duration;

    fn dummy(name: &str, hp: i32, atk: i32, def: i32) -> MonsterDef {
        MonsterDef {
            name: name.to_string(),
            level: 1,
            max_hp: hp,
            atk,
            def,
            element: None,
            weakness: None,
            resistance: None,
            behavior: AiBehavior::Standard,
            dodge_chance: 0.0,
            abilities: Vec::new(),
            loot: Default::default(),
            boss: false,
            quest_target: None,
            unlock_quest: None,
        }
    }

    fn session_with(extra: Vec<MonsterDef>) -> GameSession {
        let mut data = GameData::default();
        data.monsters.monsters.extend(extra);
        GameSession::with_data(data, 7)
    }

    fn monster_hp(session: &GameSession) -> i32 {
        session.encounter.as_ref().unwrap().monster_hp
    }

    fn phase(session: &GameSession) -> Phase {
        session.encounter.as_ref().unwrap().phase
    }

    #[test]
    fn basic_attack_applies_stat_difference() {
        // base 10 atk vs 2 def: 8 damage
        let mut s = session_with(vec![dummy("Dummy", 50, 5, 2)]);
        s.start_encounter("Dummy").unwrap();
        s.player_attack().unwrap();
        assert_eq!(monster_hp(&s), 42);
        assert_eq!(phase(&s), Phase::MonsterTurn);
    }

    #[test]
    fn weapon_weakness_multiplies_damage() {
        let mut kindling = dummy("Kindling", 100, 5, 8);
        kindling.weakness = Some(Element::Fire);
        let mut s = session_with(vec![kindling]);
        s.player.gold = 10_000;
        s.player.level = 6;
        let sword = s.buy("w4").unwrap(); // Flame Sword, 18 atk
        s.equip(sword).unwrap();

        s.start_encounter("Kindling").unwrap();
        s.player_attack().unwrap();
        // (10 + 18 - 8) * 1.5 = 30
        assert_eq!(monster_hp(&s), 70);
    }

    #[test]
    fn outgeared_attacks_still_deal_at_least_one() {
        let mut s = session_with(vec![dummy("Wall", 50, 5, 500)]);
        s.start_encounter("Wall").unwrap();
        s.player_attack().unwrap();
        assert_eq!(monster_hp(&s), 49);
    }

    #[test]
    fn attack_out_of_phase_errors() {
        let mut s = session_with(vec![dummy("Dummy", 50, 5, 2)]);
        assert_eq!(s.player_attack(), Err(GameError::NoEncounter));
        s.start_encounter("Dummy").unwrap();
        s.player_attack().unwrap();
        assert_eq!(s.player_attack(), Err(GameError::MonsterTurnPending));
        assert_eq!(
            s.advance_monster_turn().and_then(|_| s.advance_monster_turn()),
            Err(GameError::NoPendingMonsterTurn)
        );
    }

    #[test]
    fn underfunded_skill_changes_nothing() {
        let mut s = session_with(vec![dummy("Dummy", 50, 5, 2)]);
        s.player.learned_skills.push("sk1".to_string());
        s.player.energy = 10; // sk1 costs 15
        s.start_encounter("Dummy").unwrap();

        let err = s.use_skill("sk1").unwrap_err();
        assert_eq!(
            err,
            GameError::InsufficientEnergy {
                needed: 15,
                available: 10
            }
        );
        // No damage, no energy spent, turn not consumed
        assert_eq!(monster_hp(&s), 50);
        assert_eq!(s.player.energy, 10);
        assert_eq!(phase(&s), Phase::PlayerTurn);
    }

    #[test]
    fn attack_skill_spends_energy_and_multiplies() {
        let mut s = session_with(vec![dummy("Dummy", 50, 5, 2)]);
        s.player.learned_skills.push("sk1".to_string());
        s.start_encounter("Dummy").unwrap();
        s.use_skill("sk1").unwrap();
        // floor(8 * 1.5) = 12
        assert_eq!(monster_hp(&s), 38);
        assert_eq!(s.player.energy, 35);
        assert_eq!(phase(&s), Phase::MonsterTurn);
    }

    #[test]
    fn unknown_and_unlearned_skills_error() {
        let mut s = session_with(vec![dummy("Dummy", 50, 5, 2)]);
        s.start_encounter("Dummy").unwrap();
        assert!(matches!(s.use_skill("sk99"), Err(GameError::UnknownSkill(_))));
        assert_eq!(s.use_skill("sk1"), Err(GameError::SkillNotLearned));
    }

    #[test]
    fn buff_skill_lasts_through_ticks() {
        let mut s = session_with(vec![dummy("Dummy", 1000, 1, 0)]);
        s.player.learned_skills.push("sk3".to_string());
        s.start_encounter("Dummy").unwrap();

        s.use_skill("sk3").unwrap();
        {
            let enc = s.encounter.as_ref().unwrap();
            let effect = enc.player_effects.iter().next().unwrap();
            assert_eq!(effect.remaining, 3);
            assert_eq!(effect.multiplier, 1.2);
        }

        // Buffed attack: floor(10 * 1.2) - 0 = 12
        s.advance_monster_turn().unwrap();
        let before = monster_hp(&s);
        s.player_attack().unwrap();
        assert_eq!(before - monster_hp(&s), 12);

        // Two more rounds and the buff is gone
        s.advance_monster_turn().unwrap();
        s.player_attack().unwrap();
        s.advance_monster_turn().unwrap();
        assert!(s.encounter.as_ref().unwrap().player_effects.is_empty());
    }

    #[test]
    fn heal_skill_restores_without_damage() {
        let mut s = session_with(vec![dummy("Dummy", 50, 5, 2)]);
        s.player.learned_skills.push("sk2".to_string());
        s.player.hp = 40;
        s.start_encounter("Dummy").unwrap();
        s.use_skill("sk2").unwrap();
        // floor(100 * 0.3) = 30
        assert_eq!(s.player.hp, 70);
        assert_eq!(monster_hp(&s), 50);
        assert_eq!(phase(&s), Phase::MonsterTurn);
    }

    #[test]
    fn lifesteal_heals_half_the_damage() {
        let mut s = session_with(vec![dummy("Dummy", 500, 5, 2)]);
        s.player.learned_skills.push("sk6".to_string());
        s.player.hp = 50;
        s.start_encounter("Dummy").unwrap();
        s.use_skill("sk6").unwrap();
        // 8 damage, floor(8 * 0.5) = 4 back
        assert_eq!(monster_hp(&s), 492);
        assert_eq!(s.player.hp, 54);
    }

    #[test]
    fn lifesteal_counts_overkill_damage() {
        // 10 damage against 1 remaining HP still heals floor(10 * 0.5)
        let mut s = session_with(vec![dummy("Wisp", 1, 5, 0)]);
        s.player.learned_skills.push("sk6".to_string());
        s.player.hp = 50;
        s.start_encounter("Wisp").unwrap();
        s.use_skill("sk6").unwrap();
        assert_eq!(s.player.hp, 55);
        assert!(matches!(phase(&s), Phase::Resolved(Outcome::Victory)));
    }

    #[test]
    fn debuff_strike_weakens_the_monster() {
        let mut s = session_with(vec![dummy("Bruiser", 500, 50, 2)]);
        s.player.learned_skills.push("sk5".to_string());
        s.start_encounter("Bruiser").unwrap();
        s.use_skill("sk5").unwrap();
        let enc = s.encounter.as_ref().unwrap();
        assert_eq!(enc.monster_effects.len(), 1);
        // floor(50 * 0.8) = 40 effective atk
        assert_eq!(enc.effective_monster_atk(), 40);
    }

    #[test]
    fn sure_dodge_blocks_basic_attacks_only() {
        let mut ghost = dummy("Ghost", 50, 1, 0);
        ghost.behavior = AiBehavior::Evasive;
        ghost.dodge_chance = 1.0;
        let mut s = session_with(vec![ghost]);
        s.player.learned_skills.push("sk1".to_string());
        s.start_encounter("Ghost").unwrap();

        s.player_attack().unwrap();
        assert_eq!(monster_hp(&s), 50);
        assert_eq!(phase(&s), Phase::MonsterTurn);

        s.advance_monster_turn().unwrap();
        s.use_skill("sk1").unwrap();
        // Skills cannot be dodged: floor(10 * 1.5) = 15
        assert_eq!(monster_hp(&s), 35);
    }

    #[test]
    fn resistance_gear_halves_monster_damage() {
        let mut burner = dummy("Burner", 500, 30, 2);
        burner.element = Some(Element::Fire);
        let mut s = session_with(vec![burner]);
        s.player.gold = 10_000;
        s.player.level = 6;
        let shield = s.buy("s3").unwrap(); // Water Shield: +15 def, resists Fire
        s.equip(shield).unwrap();

        s.start_encounter("Burner").unwrap();
        s.player_attack().unwrap();
        s.advance_monster_turn().unwrap();
        // floor(max(1, 30 - 20) * 0.5) = 5
        assert_eq!(s.player.hp, 95);
    }

    #[test]
    fn victory_awards_and_guards_reentry() {
        let mut s = session_with(vec![dummy("Wisp", 5, 1, 0)]);
        let gold_before = s.player.gold;
        s.start_encounter("Wisp").unwrap();
        s.player_attack().unwrap();

        assert_eq!(phase(&s), Phase::Resolved(Outcome::Victory));
        // level 1 monster: gold in [10, 20), exp in [15, 30)
        let gained = s.player.gold - gold_before;
        assert!((10..20).contains(&gained), "gold {gained}");
        assert!(s.player.exp >= 15 && s.player.exp < 30);

        // The resolved encounter accepts no further actions and awards nothing
        assert_eq!(s.player_attack(), Err(GameError::CombatOver));
        assert_eq!(s.advance_monster_turn(), Err(GameError::CombatOver));
        assert_eq!(s.player.gold - gold_before, gained);
    }

    #[test]
    fn defeat_resolves_and_stops_auto_battle() {
        let mut s = session_with(vec![dummy("Titan", 10_000, 9_999, 0)]);
        s.start_encounter("Titan").unwrap();
        s.set_auto_battle(true).unwrap();
        s.player_attack().unwrap();
        s.advance_monster_turn().unwrap();
        assert_eq!(phase(&s), Phase::Resolved(Outcome::Defeat));
        assert!(!s.player.is_alive());
        assert!(!s.is_auto_battling());
    }

    #[test]
    fn too_weak_gate_blocks_high_level_monsters() {
        let mut s = session_with(vec![]);
        assert_eq!(
            s.start_encounter("Wind Serpent"),
            Err(GameError::LevelTooLow { required: 8 })
        );
        s.player.level = 8;
        assert!(s.start_encounter("Wind Serpent").is_ok());
    }

    #[test]
    fn boss_unlock_requires_claimed_quest() {
        let mut s = session_with(vec![]);
        s.player.level = 15;
        assert_eq!(
            s.start_encounter("Guardian Golem"),
            Err(GameError::MonsterLocked)
        );
        for _ in 0..5 {
            s.quests.record_kill("Golem", &s.data.quests.clone());
        }
        s.claim_quest("q3").unwrap();
        assert!(s.start_encounter("Guardian Golem").is_ok());
    }

    #[test]
    fn kills_count_toward_the_quest_target_name() {
        let mut pebble = dummy("Pebble Golem", 10, 1, 0);
        pebble.quest_target = Some("Golem".to_string());
        let mut s = session_with(vec![pebble, dummy("Golem King", 10, 1, 0)]);

        for name in ["Pebble Golem", "Golem King"] {
            s.encounter = None;
            s.start_encounter(name).unwrap();
            while !s.encounter.as_ref().unwrap().is_over() {
                match phase(&s) {
                    Phase::PlayerTurn => s.player_attack().unwrap(),
                    Phase::MonsterTurn => s.advance_monster_turn().unwrap(),
                    Phase::Resolved(_) => break,
                }
            }
        }

        // Only the override matches q3; "Golem King" is not "Golem"
        assert_eq!(s.quests.progress("q3").kills, 1);
        assert_eq!(s.quests.progress("q4").kills, 0);
    }

    #[test]
    fn starting_over_a_live_encounter_errors() {
        let mut s = session_with(vec![dummy("Dummy", 50, 5, 2)]);
        s.start_encounter("Dummy").unwrap();
        assert_eq!(s.start_encounter("Slime"), Err(GameError::EncounterInProgress));
        s.flee().unwrap();
        assert!(s.start_encounter("Slime").is_ok());
    }

    #[test]
    fn flee_ends_without_reward() {
        let mut s = session_with(vec![dummy("Dummy", 50, 5, 2)]);
        let gold = s.player.gold;
        s.start_encounter("Dummy").unwrap();
        s.flee().unwrap();
        assert!(s.encounter.is_none());
        assert_eq!(s.player.gold, gold);
        assert_eq!(s.flee(), Err(GameError::NoEncounter));
    }

    #[test]
    fn auto_battle_rules() {
        let mut s = session_with(vec![dummy("Dummy", 1_000, 1, 0)]);
        assert_eq!(s.set_auto_battle(true), Err(GameError::NoEncounter));
        s.start_encounter("Dummy").unwrap();
        s.set_auto_battle(true).unwrap();
        assert!(s.is_auto_battling());
        s.auto_battle_step().unwrap(); // player attacks
        assert_eq!(phase(&s), Phase::MonsterTurn);
        s.auto_battle_step().unwrap(); // monster answers
        assert_eq!(phase(&s), Phase::PlayerTurn);
        s.set_auto_battle(false).unwrap();
        assert_eq!(s.auto_battle_step(), Err(GameError::NoEncounter));
    }

    #[test]
    fn auto_battle_forbidden_for_bosses() {
        let mut s = session_with(vec![]);
        s.player.level = 40;
        // Shadow Stalker is a boss with no unlock quest
        s.start_encounter("Shadow Stalker").unwrap();
        assert_eq!(s.set_auto_battle(true), Err(GameError::AutoBattleForbidden));
    }

    #[test]
    fn auto_battle_chains_fresh_copies() {
        let mut s = session_with(vec![dummy("Wisp", 5, 1, 0)]);
        s.start_encounter("Wisp").unwrap();
        let first_gen = s.encounter.as_ref().unwrap().generation;
        s.set_auto_battle(true).unwrap();
        s.auto_battle_step().unwrap(); // one hit kills it

        // A new full-health copy of the same template is already running
        let enc = s.encounter.as_ref().unwrap();
        assert_eq!(enc.monster.name, "Wisp");
        assert_eq!(enc.monster_hp, 5);
        assert_eq!(enc.phase, Phase::PlayerTurn);
        assert!(enc.generation > first_gen);
        assert!(s.is_auto_battling());
    }

    #[test]
    fn auto_battle_stops_when_too_hurt() {
        let mut s = session_with(vec![dummy("Wisp", 5, 1, 0)]);
        s.player.hp = 30; // under 40% of 100
        s.start_encounter("Wisp").unwrap();
        s.set_auto_battle(true).unwrap();
        s.auto_battle_step().unwrap();
        assert!(!s.is_auto_battling());
        assert_eq!(phase(&s), Phase::Resolved(Outcome::Victory));
    }

    #[test]
    fn auto_heal_spends_gold_after_the_monster_turn() {
        let mut s = session_with(vec![dummy("Bruiser", 1_000, 80, 0)]);
        s.auto_heal = AutoHealSettings {
            enabled: true,
            threshold: 50.0,
            cost: AutoHealCost::Gold,
        };
        s.player.gold = 150;
        s.start_encounter("Bruiser").unwrap();
        s.player_attack().unwrap();
        s.advance_monster_turn().unwrap();
        // 75 damage put the player at 25%, then the heal fired
        assert_eq!(s.player.hp, s.player.max_hp);
        assert_eq!(s.player.gold, 50);
    }

    #[test]
    fn auto_heal_shortfall_skips_silently() {
        let mut s = session_with(vec![dummy("Bruiser", 1_000, 80, 0)]);
        s.auto_heal = AutoHealSettings {
            enabled: true,
            threshold: 50.0,
            cost: AutoHealCost::Gold,
        };
        s.player.gold = 50;
        s.start_encounter("Bruiser").unwrap();
        s.player_attack().unwrap();
        s.advance_monster_turn().unwrap();
        assert_eq!(s.player.hp, 25);
        assert_eq!(s.player.gold, 50);
    }

    #[test]
    fn auto_heal_energy_variant() {
        let mut s = session_with(vec![dummy("Bruiser", 1_000, 80, 0)]);
        s.auto_heal = AutoHealSettings {
            enabled: true,
            threshold: 50.0,
            cost: AutoHealCost::Energy,
        };
        s.start_encounter("Bruiser").unwrap();
        s.player_attack().unwrap();
        s.advance_monster_turn().unwrap();
        assert_eq!(s.player.hp, s.player.max_hp);
        assert_eq!(s.player.energy, 30);
    }

    #[test]
    fn regen_only_outside_combat() {
        let mut s = session_with(vec![dummy("Dummy", 50, 5, 2)]);
        s.player.hp = 50;
        s.player.energy = 10;
        s.regen_tick();
        // ceil(1) hp, ceil(1) energy at the starting maxima
        assert_eq!(s.player.hp, 51);
        assert_eq!(s.player.energy, 11);

        s.start_encounter("Dummy").unwrap();
        s.regen_tick();
        assert_eq!(s.player.hp, 51);
        s.flee().unwrap();
        s.regen_tick();
        assert_eq!(s.player.hp, 52);
    }

    #[test]
    fn shop_and_equipment_flow() {
        let mut s = session_with(vec![]);
        s.player.gold = 60;
        assert_eq!(
            s.buy("w2"),
            Err(GameError::InsufficientGold {
                needed: 300,
                available: 60
            })
        );
        assert_eq!(s.buy("w10"), Err(GameError::NotInShop));

        let sword = s.buy("w1").unwrap();
        assert_eq!(s.player.gold, 10);
        s.equip(sword).unwrap();
        assert!(s.inventory.is_empty());

        s.unequip(SlotType::Weapon).unwrap();
        assert_eq!(s.unequip(SlotType::Weapon), Err(GameError::SlotEmpty));
        let received = s.sell(sword).unwrap();
        assert_eq!(received, 25);
        assert_eq!(s.player.gold, 35);
        assert_eq!(s.sell(sword), Err(GameError::ItemNotFound(sword)));
    }

    #[test]
    fn equip_respects_min_level() {
        let mut s = session_with(vec![]);
        s.player.gold = 10_000;
        let axe = s.buy("w2").unwrap(); // min level 3
        assert_eq!(s.equip(axe), Err(GameError::LevelTooLow { required: 3 }));
        s.player.level = 3;
        s.equip(axe).unwrap();
    }

    #[test]
    fn equipping_swaps_the_previous_item_back() {
        let mut s = session_with(vec![]);
        s.player.gold = 10_000;
        s.player.level = 5;
        let sword = s.buy("w1").unwrap();
        let blade = s.buy("w3").unwrap();
        s.equip(sword).unwrap();
        s.equip(blade).unwrap();
        assert_eq!(s.inventory.len(), 1);
        assert_eq!(s.inventory[0].instance_id, sword);
        assert_eq!(
            s.equipment.get(SlotType::Weapon).unwrap().instance_id,
            blade
        );
    }

    #[test]
    fn learn_skill_gates_and_records() {
        let mut s = session_with(vec![]);
        s.player.gold = 10_000;
        assert_eq!(
            s.learn_skill("sk1"),
            Err(GameError::LevelTooLow { required: 3 })
        );
        s.player.level = 3;
        s.learn_skill("sk1").unwrap();
        assert!(s.player.knows_skill("sk1"));
        assert_eq!(s.player.gold, 9_500);
        assert_eq!(s.learn_skill("sk1"), Err(GameError::SkillAlreadyKnown));
    }

    #[test]
    fn upgrade_spends_and_rescales() {
        let mut s = session_with(vec![]);
        s.player.gold = 1_000;
        let sword = s.buy("w1").unwrap(); // 5 atk base, cost 50
        s.materials.insert("m1".to_string(), 5);

        s.upgrade_item(sword).unwrap();
        let item = s.inventory.iter().find(|i| i.instance_id == sword).unwrap();
        assert_eq!(item.level, 1);
        assert_eq!(item.atk, 5); // floor(5 * 0.1 * 1) = 0
        assert_eq!(s.player.gold, 850);
        assert_eq!(s.materials["m1"], 4);

        s.upgrade_item(sword).unwrap();
        let item = s.inventory.iter().find(|i| i.instance_id == sword).unwrap();
        assert_eq!(item.level, 2);
        assert_eq!(item.atk, 6);
    }

    #[test]
    fn upgrade_works_on_equipped_items() {
        let mut s = session_with(vec![]);
        s.player.gold = 1_000;
        let sword = s.buy("w1").unwrap();
        s.equip(sword).unwrap();
        s.materials.insert("m1".to_string(), 1);
        s.upgrade_item(sword).unwrap();
        assert_eq!(s.equipment.get(SlotType::Weapon).unwrap().level, 1);
    }

    #[test]
    fn upgrade_requires_materials_and_caps() {
        let mut s = session_with(vec![]);
        s.player.gold = 100_000;
        let sword = s.buy("w1").unwrap();
        assert_eq!(
            s.upgrade_item(sword),
            Err(GameError::InsufficientMaterials {
                material: "m1".to_string(),
                needed: 1,
                available: 0
            })
        );
        for m in 1..=6 {
            s.materials.insert(format!("m{m}"), 100);
        }
        for _ in 0..10 {
            s.upgrade_item(sword).unwrap();
        }
        assert_eq!(s.upgrade_item(sword), Err(GameError::UpgradeLimit));
        let item = s.inventory.iter().find(|i| i.instance_id == sword).unwrap();
        assert_eq!(item.atk, 10); // 5 + floor(5 * 0.1 * 10)
    }

    #[test]
    fn quest_claim_pays_out_once() {
        let mut s = session_with(vec![dummy("Wisp", 5, 1, 0)]);
        // q1 needs 5 slime kills; wisps do not count
        s.start_encounter("Wisp").unwrap();
        s.player_attack().unwrap();
        assert_eq!(s.quests.progress("q1").kills, 0);

        for _ in 0..5 {
            s.encounter = None;
            s.start_encounter("Slime").unwrap();
            while !s.encounter.as_ref().unwrap().is_over() {
                if phase(&s) == Phase::PlayerTurn {
                    s.player_attack().unwrap();
                } else {
                    s.advance_monster_turn().unwrap();
                }
            }
        }
        assert_eq!(s.quests.progress("q1").kills, 5);

        let gold = s.player.gold;
        s.claim_quest("q1").unwrap();
        assert_eq!(s.player.gold, gold + 100);
        assert_eq!(s.claim_quest("q1"), Err(GameError::QuestAlreadyClaimed));
    }

    #[test]
    fn combat_view_reflects_state() {
        let mut s = session_with(vec![dummy("Dummy", 50, 5, 2)]);
        assert!(s.combat_view().is_none());
        s.player.learned_skills.push("sk1".to_string());
        s.player.learned_skills.push("sk6".to_string());
        s.player.energy = 20; // enough for sk1 (15), not sk6 (25)
        s.start_encounter("Dummy").unwrap();

        let view = s.combat_view().unwrap();
        assert_eq!(view.monster_name, "Dummy");
        assert_eq!(view.monster_hp, 50);
        assert!(view.actions.can_attack);
        assert!(view.actions.can_flee);
        assert!(view.actions.can_auto_battle);
        assert_eq!(view.actions.usable_skills, vec!["sk1".to_string()]);
        assert!(view.over.is_none());
        assert!(!view.log.is_empty());

        s.player_attack().unwrap();
        let view = s.combat_view().unwrap();
        assert!(!view.actions.can_attack);
        assert!(view.actions.usable_skills.is_empty());
    }

    struct CannedNarrator;

    impl Narrator for CannedNarrator {
        fn describe_turn(
            &self,
            event: &TurnEvent,
            _is_player_turn: bool,
        ) -> Result<String, NarrativeError> {
            Ok(format!("The {} reels!", event.monster_name))
        }
    }

    fn poll_until_resolved(s: &mut GameSession) -> usize {
        for _ in 0..100 {
            let n = s.poll_narrative();
            if n > 0 {
                return n;
            }
            thread::sleep(Duration::from_millis(10));
        }
        0
    }

    #[test]
    fn narrative_replaces_turn_lines_and_resolves() {
        let mut s = session_with(vec![dummy("Dummy", 50, 5, 2)]);
        s.set_narrator(std::sync::Arc::new(CannedNarrator));
        s.start_encounter("Dummy").unwrap();
        s.player_attack().unwrap();

        // The turn produced a single pending entry
        let view = s.combat_view().unwrap();
        let pending: Vec<_> = view.log.iter().filter(|e| e.text() == "...").collect();
        assert_eq!(pending.len(), 1);

        assert_eq!(poll_until_resolved(&mut s), 1);
        let view = s.combat_view().unwrap();
        assert!(view.log.iter().any(|e| e.text() == "The Dummy reels!"));
    }

    #[test]
    fn stale_narrative_results_are_discarded() {
        let mut s = session_with(vec![dummy("Dummy", 50, 5, 2)]);
        s.set_narrator(std::sync::Arc::new(CannedNarrator));
        s.start_encounter("Dummy").unwrap();
        s.player_attack().unwrap();

        // Tear the encounter down before the result lands
        s.flee().unwrap();
        s.start_encounter("Slime").unwrap();

        thread::sleep(Duration::from_millis(200));
        assert_eq!(s.poll_narrative(), 0);
        let view = s.combat_view().unwrap();
        assert!(view.log.iter().all(|e| e.text() != "The Dummy reels!"));
    }

    #[test]
    fn without_narrator_lines_are_standard() {
        let mut s = session_with(vec![dummy("Dummy", 50, 5, 2)]);
        s.start_encounter("Dummy").unwrap();
        s.player_attack().unwrap();
        let view = s.combat_view().unwrap();
        assert!(view.log.iter().any(|e| e.text().contains("You strike")));
        assert!(view.log.iter().all(|e| e.text() != "..."));
    }

    #[test]
    fn boss_cycle_plays_out_in_combat() {
        let mut boss = dummy("Warden", 100_000, 10, 0);
        boss.boss = true;
        boss.behavior = AiBehavior::BossPattern;
        boss.abilities = vec![
            crate::data::monsters::AbilityDef {
                name: "Iron Ward".to_string(),
                chance: 0.0,
                kind: AbilityKind::Buff {
                    stat: crate::data::Stat::Def,
                    multiplier: 2.0,
                    duration: 2,
                },
            },
            crate::data::monsters::AbilityDef {
                name: "Crush".to_string(),
                chance: 0.0,
                kind: AbilityKind::HeavyAttack { multiplier: 2.0 },
            },
        ];
        let mut s = session_with(vec![boss]);
        s.player.max_hp = 10_000;
        s.player.hp = 10_000;

        s.start_encounter("Warden").unwrap();
        // Turn 1: basic attack for 10 - 5 = 5
        s.player_attack().unwrap();
        s.advance_monster_turn().unwrap();
        assert_eq!(s.player.hp, 9_995);
        assert!(s.encounter.as_ref().unwrap().monster_effects.is_empty());

        // Turn 2: the ward goes up
        s.player_attack().unwrap();
        s.advance_monster_turn().unwrap();
        assert_eq!(s.player.hp, 9_995);
        assert_eq!(s.encounter.as_ref().unwrap().monster_effects.len(), 1);

        // Turn 3: heavy attack for floor(5 * 2.0) = 10
        s.player_attack().unwrap();
        s.advance_monster_turn().unwrap();
        assert_eq!(s.player.hp, 9_985);
    }
}
