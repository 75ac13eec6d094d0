use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Result;

/// Current save-game format revision.
pub const SAVE_VERSION: u32 = 1;

/// Highest sanity value; new games start here.
pub const MAX_SANITY: u8 = 100;

fn default_version() -> u32 {
    SAVE_VERSION
}

fn default_room() -> String {
    "gallery_entrance".to_owned()
}

fn default_sanity() -> u8 {
    MAX_SANITY
}

/// Full save-game state.
///
/// Every field carries a default so saves written by older or newer builds
/// still load: missing keys fall back to the documented value instead of
/// failing the whole file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveGame {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Unix seconds of the last write.
    #[serde(default)]
    pub timestamp: i64,
    /// Accumulated play time in seconds.
    #[serde(default)]
    pub playtime: f64,
    #[serde(default = "default_room")]
    pub current_room: String,
    /// 0 to 100; values above the cap are clamped on load.
    #[serde(default = "default_sanity")]
    pub player_sanity: u8,
    #[serde(default)]
    pub healed_paintings: Vec<String>,
    /// Item id to count.
    #[serde(default)]
    pub inventory: BTreeMap<String, u32>,
    #[serde(default)]
    pub story_flags: BTreeMap<String, bool>,
    #[serde(default)]
    pub death_count: u32,
    /// Free-form extension data, preserved as-is.
    #[serde(default)]
    pub custom_data: serde_json::Map<String, serde_json::Value>,
}

impl Default for SaveGame {
    fn default() -> Self {
        Self::new_game()
    }
}

impl SaveGame {
    pub fn new_game() -> Self {
        Self {
            version: SAVE_VERSION,
            timestamp: Utc::now().timestamp(),
            playtime: 0.0,
            current_room: default_room(),
            player_sanity: MAX_SANITY,
            healed_paintings: Vec::new(),
            inventory: BTreeMap::new(),
            story_flags: BTreeMap::new(),
            death_count: 0,
            custom_data: serde_json::Map::new(),
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let mut save: Self = serde_json::from_str(text)?;
        save.player_sanity = save.player_sanity.min(MAX_SANITY);
        Ok(save)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Refreshes the write timestamp.
    pub fn touch(&mut self) {
        self.timestamp = Utc::now().timestamp();
    }

    pub fn heal_painting(&mut self, id: &str) {
        if !self.is_painting_healed(id) {
            self.healed_paintings.push(id.to_owned());
        }
    }

    pub fn is_painting_healed(&self, id: &str) -> bool {
        self.healed_paintings.iter().any(|healed| healed == id)
    }

    pub fn set_flag(&mut self, name: &str, value: bool) {
        self.story_flags.insert(name.to_owned(), value);
    }

    pub fn flag(&self, name: &str) -> bool {
        self.story_flags.get(name).copied().unwrap_or(false)
    }

    pub fn add_item(&mut self, id: &str, count: u32) {
        *self.inventory.entry(id.to_owned()).or_insert(0) += count;
    }

    pub fn item_count(&self, id: &str) -> u32 {
        self.inventory.get(id).copied().unwrap_or(0)
    }

    pub fn adjust_sanity(&mut self, delta: i16) {
        let sanity = (self.player_sanity as i16 + delta).clamp(0, MAX_SANITY as i16);
        self.player_sanity = sanity as u8;
    }
}
