//! Saving and loading.
//!
//! Durable progress only; a running encounter is never written to disk.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::items::{Equipment, ItemInstance};
use crate::player::PlayerStats;
use crate::progression::QuestLog;
use crate::session::AutoHealSettings;

pub const SAVE_VERSION: u32 = 1;

const SAVE_FILE: &str = "save.json";

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("no usable save directory on this system")]
    NoSaveDir,
}

/// Everything that survives a restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub player: PlayerStats,
    pub inventory: Vec<ItemInstance>,
    pub equipment: Equipment,
    pub materials: HashMap<String, u32>,
    pub quests: QuestLog,
    pub auto_heal: AutoHealSettings,
    pub next_instance_id: u64,
    pub rng_seed: u64,
}

/// Platform save-file location.
pub fn save_path() -> Result<PathBuf, SaveError> {
    let dirs = ProjectDirs::from("com", "emberfall", "emberfall").ok_or(SaveError::NoSaveDir)?;
    Ok(dirs.data_dir().join(SAVE_FILE))
}

/// Write a snapshot to the default location.
pub fn save_to_disk(data: &SaveData) -> Result<(), SaveError> {
    let path = save_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(data)?;
    fs::write(&path, json)?;
    log::info!("saved to {}", path.display());
    Ok(())
}

/// Read the snapshot at the default location. `Ok(None)` when no save exists.
pub fn load_from_disk() -> Result<Option<SaveData>, SaveError> {
    let path = save_path()?;
    if !path.exists() {
        return Ok(None);
    }
    let json = fs::read_to_string(&path)?;
    Ok(Some(serde_json::from_str(&json)?))
}
