use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::QuestError;

pub const TOTAL_LEVELS: u8 = 15;
/// Levels whose hint only unlocks after the team has been stuck for a while.
pub const DELAYED_HINT_LEVELS: [u8; 2] = [1, 11];
pub const HINT_DELAY_SECS: u64 = 300;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelKind {
    Clock,
    Url,
    Morse,
    Video,
    Filesystem,
    Still,
    Mcq,
    PhoneKeypad,
    Crossword,
    FloorPlan,
    ThreeDoors,
    CodeCracker,
    Tangram,
    Consequence,
    Rotary,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    pub id: u8,
    pub title: String,
    pub kind: LevelKind,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub hint: Option<String>,
}

impl LevelDef {
    /// Whether the intel hint may be shown after `secs_on_level` seconds.
    pub fn hint_unlocked(&self, secs_on_level: u64) -> bool {
        if self.hint.is_none() {
            return false;
        }
        !DELAYED_HINT_LEVELS.contains(&self.id) || secs_on_level >= HINT_DELAY_SECS
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LevelCatalog {
    levels: Vec<LevelDef>,
}

impl LevelCatalog {
    pub fn builtin() -> Self {
        match Self::from_json(include_str!("../../levels.json")) {
            Ok(c) => c,
            Err(e) => {
                warn!("embedded levels.json rejected: {e}");
                Self::default()
            }
        }
    }

    pub fn from_json(text: &str) -> Result<Self, QuestError> {
        let levels: Vec<LevelDef> = serde_json::from_str(text)?;
        for (i, l) in levels.iter().enumerate() {
            if usize::from(l.id) != i + 1 {
                return Err(QuestError::NonContiguousLevels {
                    expected_last: levels.len(),
                    position: i,
                    found: l.id,
                });
            }
        }
        Ok(LevelCatalog { levels })
    }

    pub fn get(&self, id: u8) -> Option<&LevelDef> {
        let i = usize::from(id).checked_sub(1)?;
        self.levels.get(i)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LevelDef> {
        self.levels.iter()
    }
}
