//! Typed engine errors.

use thiserror::Error;

/// Errors returned by session and combat operations.
///
/// Operations that return an error mutate nothing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    #[error("not enough energy: need {needed}, have {available}")]
    InsufficientEnergy { needed: i32, available: i32 },

    #[error("not enough gold: need {needed}, have {available}")]
    InsufficientGold { needed: u32, available: u32 },

    #[error("not enough {material}: need {needed}, have {available}")]
    InsufficientMaterials {
        material: String,
        needed: u32,
        available: u32,
    },

    #[error("no encounter in progress")]
    NoEncounter,

    #[error("an encounter is already in progress")]
    EncounterInProgress,

    #[error("the encounter is already resolved")]
    CombatOver,

    #[error("the monster has not taken its turn yet")]
    MonsterTurnPending,

    #[error("it is the player's turn")]
    NoPendingMonsterTurn,

    #[error("auto-battle is not allowed against bosses")]
    AutoBattleForbidden,

    #[error("unknown skill: {0}")]
    UnknownSkill(String),

    #[error("that skill has not been learned")]
    SkillNotLearned,

    #[error("that skill is already known")]
    SkillAlreadyKnown,

    #[error("unknown item id")]
    UnknownItem,

    #[error("that item is not sold here")]
    NotInShop,

    #[error("item instance {0} not found")]
    ItemNotFound(u64),

    #[error("nothing is equipped in that slot")]
    SlotEmpty,

    #[error("requires level {required}")]
    LevelTooLow { required: u32 },

    #[error("the item is already at its maximum upgrade level")]
    UpgradeLimit,

    #[error("unknown monster")]
    UnknownMonster,

    #[error("this foe is not yet unlocked")]
    MonsterLocked,

    #[error("unknown quest: {0}")]
    UnknownQuest(String),

    #[error("the quest is not complete")]
    QuestIncomplete,

    #[error("the quest reward was already claimed")]
    QuestAlreadyClaimed,
}
