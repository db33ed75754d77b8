//! Monster templates, abilities and loot tables.

use serde::{Deserialize, Serialize};

use super::{Element, Stat};

/// How a monster picks its action on its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiBehavior {
    /// Roll each ability's chance in order; basic attack otherwise.
    Standard,
    /// Standard, plus a chance to dodge basic attacks.
    Evasive,
    /// Heals itself when under half HP.
    Healer,
    /// 50% chance to open with a debuff.
    Debuffer,
    /// Fixed 3-turn cycle: basic, buff, heavy attack.
    BossPattern,
}

/// The effect of a monster ability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AbilityKind {
    HeavyAttack { multiplier: f64 },
    Buff {
        stat: Stat,
        multiplier: f64,
        duration: u32,
    },
    Debuff {
        stat: Stat,
        multiplier: f64,
        duration: u32,
    },
    Heal { fraction: f64 },
}

/// A named monster ability with an independent trigger chance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityDef {
    pub name: String,
    /// Probability the ability fires on a given turn (ignored by bosses,
    /// whose cycle is deterministic).
    #[serde(default)]
    pub chance: f64,
    pub kind: AbilityKind,
}

/// One possible item drop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDrop {
    pub item: String,
    pub chance: f64,
}

/// One possible material drop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialDrop {
    pub material: String,
    pub chance: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LootTable {
    #[serde(default)]
    pub items: Vec<ItemDrop>,
    #[serde(default)]
    pub materials: Vec<MaterialDrop>,
}

/// Immutable monster template. Encounters clone the mutable parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonsterDef {
    pub name: String,
    pub level: u32,
    pub max_hp: i32,
    pub atk: i32,
    pub def: i32,
    #[serde(default)]
    pub element: Option<Element>,
    #[serde(default)]
    pub weakness: Option<Element>,
    #[serde(default)]
    pub resistance: Option<Element>,
    pub behavior: AiBehavior,
    #[serde(default)]
    pub dodge_chance: f64,
    #[serde(default)]
    pub abilities: Vec<AbilityDef>,
    #[serde(default)]
    pub loot: LootTable,
    #[serde(default)]
    pub boss: bool,
    /// Name quests match kills against. Defaults to the monster name.
    #[serde(default)]
    pub quest_target: Option<String>,
    /// Quest that must be claimed before this boss can be challenged.
    #[serde(default)]
    pub unlock_quest: Option<String>,
}

impl MonsterDef {
    /// The name quest kill counters match against.
    pub fn target_name(&self) -> &str {
        self.quest_target.as_deref().unwrap_or(&self.name)
    }

    fn find_ability(&self, pred: impl Fn(&AbilityKind) -> bool) -> Option<&AbilityDef> {
        self.abilities.iter().find(|a| pred(&a.kind))
    }

    pub fn find_buff(&self) -> Option<&AbilityDef> {
        self.find_ability(|k| matches!(k, AbilityKind::Buff { .. }))
    }

    pub fn find_heavy_attack(&self) -> Option<&AbilityDef> {
        self.find_ability(|k| matches!(k, AbilityKind::HeavyAttack { .. }))
    }

    pub fn find_heal(&self) -> Option<&AbilityDef> {
        self.find_ability(|k| matches!(k, AbilityKind::Heal { .. }))
    }

    pub fn find_debuff(&self) -> Option<&AbilityDef> {
        self.find_ability(|k| matches!(k, AbilityKind::Debuff { .. }))
    }
}

/// Collection of monster templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonsterTemplates {
    pub monsters: Vec<MonsterDef>,
}

impl MonsterTemplates {
    pub fn find(&self, name: &str) -> Option<&MonsterDef> {
        self.monsters.iter().find(|m| m.name == name)
    }
}

fn monster(name: &str, level: u32, max_hp: i32, atk: i32, def: i32) -> MonsterDef {
    MonsterDef {
        name: name.to_string(),
        level,
        max_hp,
        atk,
        def,
        element: None,
        weakness: None,
        resistance: None,
        behavior: AiBehavior::Standard,
        dodge_chance: 0.0,
        abilities: Vec::new(),
        loot: LootTable::default(),
        boss: false,
        quest_target: None,
        unlock_quest: None,
    }
}

fn item_drop(item: &str, chance: f64) -> ItemDrop {
    ItemDrop {
        item: item.to_string(),
        chance,
    }
}

fn material_drop(material: &str, chance: f64) -> MaterialDrop {
    MaterialDrop {
        material: material.to_string(),
        chance,
    }
}

/// Compiled-in monster defaults.
pub fn default_monster_templates() -> MonsterTemplates {
    use Element::*;

    let mut slime = monster("Slime", 1, 50, 5, 2);
    slime.loot.materials = vec![material_drop("m1", 0.6)];

    let mut goblin = monster("Goblin", 3, 80, 12, 5);
    goblin.abilities = vec![AbilityDef {
        name: "Vicious Strike".to_string(),
        chance: 0.25,
        kind: AbilityKind::HeavyAttack { multiplier: 1.5 },
    }];
    goblin.loot.items = vec![item_drop("w1", 0.05)];
    goblin.loot.materials = vec![material_drop("m2", 0.5)];

    let mut orc = monster("Orc", 5, 150, 20, 10);
    orc.behavior = AiBehavior::Debuffer;
    orc.abilities = vec![AbilityDef {
        name: "War Drum".to_string(),
        chance: 0.3,
        kind: AbilityKind::Debuff {
            stat: Stat::Def,
            multiplier: 0.8,
            duration: 3,
        },
    }];
    orc.loot.items = vec![item_drop("s2", 0.05)];
    orc.loot.materials = vec![material_drop("m3", 0.5)];

    let mut elemental = monster("Fire Elemental", 6, 200, 25, 12);
    elemental.element = Some(Fire);
    elemental.weakness = Some(Water);
    elemental.resistance = Some(Wind);
    elemental.loot.items = vec![item_drop("w4", 0.03)];
    elemental.loot.materials = vec![material_drop("m4", 0.4)];

    let mut golem = monster("Stone Golem", 8, 300, 18, 25);
    golem.quest_target = Some("Golem".to_string());
    golem.behavior = AiBehavior::Healer;
    golem.element = Some(Earth);
    golem.weakness = Some(Wind);
    golem.resistance = Some(Fire);
    golem.abilities = vec![AbilityDef {
        name: "Stone Regrowth".to_string(),
        chance: 0.2,
        kind: AbilityKind::Heal { fraction: 0.25 },
    }];
    golem.loot.items = vec![item_drop("h2", 0.05)];
    golem.loot.materials = vec![material_drop("m5", 0.4)];

    let mut serpent = monster("Wind Serpent", 10, 250, 35, 18);
    serpent.quest_target = Some("Serpent".to_string());
    serpent.behavior = AiBehavior::Evasive;
    serpent.dodge_chance = 0.2;
    serpent.element = Some(Wind);
    serpent.weakness = Some(Fire);
    serpent.resistance = Some(Earth);
    serpent.loot.items = vec![item_drop("w6", 0.03)];
    serpent.loot.materials = vec![material_drop("m6", 0.4)];

    let mut guardian = monster("Guardian Golem", 15, 1000, 50, 40);
    guardian.boss = true;
    guardian.behavior = AiBehavior::BossPattern;
    guardian.element = Some(Earth);
    guardian.weakness = Some(Wind);
    guardian.resistance = Some(Fire);
    guardian.unlock_quest = Some("q3".to_string());
    guardian.abilities = vec![
        AbilityDef {
            name: "Earthen Ward".to_string(),
            chance: 0.0,
            kind: AbilityKind::Buff {
                stat: Stat::Def,
                multiplier: 2.5,
                duration: 2,
            },
        },
        AbilityDef {
            name: "Granite Slam".to_string(),
            chance: 0.0,
            kind: AbilityKind::HeavyAttack { multiplier: 2.0 },
        },
    ];
    guardian.loot.items = vec![item_drop("w10", 1.0)];
    guardian.loot.materials = vec![material_drop("m5", 1.0)];

    let mut abyssal = monster("Abyssal Serpent", 20, 2500, 80, 60);
    abyssal.boss = true;
    abyssal.behavior = AiBehavior::BossPattern;
    abyssal.element = Some(Water);
    abyssal.weakness = Some(Wind);
    abyssal.resistance = Some(Fire);
    abyssal.unlock_quest = Some("q5".to_string());
    abyssal.abilities = vec![
        AbilityDef {
            name: "Corrosive Spittle".to_string(),
            chance: 0.0,
            kind: AbilityKind::Debuff {
                stat: Stat::Def,
                multiplier: 0.7,
                duration: 3,
            },
        },
        AbilityDef {
            name: "Tidal Wave".to_string(),
            chance: 0.0,
            kind: AbilityKind::HeavyAttack { multiplier: 1.8 },
        },
    ];
    abyssal.loot.items = vec![item_drop("w11", 1.0)];

    let mut stalker = monster("Shadow Stalker", 40, 4000, 150, 90);
    stalker.boss = true;
    stalker.behavior = AiBehavior::Evasive;
    stalker.dodge_chance = 0.3;
    stalker.abilities = vec![AbilityDef {
        name: "Ambush".to_string(),
        chance: 0.35,
        kind: AbilityKind::HeavyAttack { multiplier: 2.2 },
    }];
    stalker.loot.items = vec![item_drop("w12", 1.0)];

    MonsterTemplates {
        monsters: vec![
            slime, goblin, orc, elemental, golem, serpent, guardian, abyssal, stalker,
        ],
    }
}
