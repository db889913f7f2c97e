//! Store and drag-and-drop configuration.

use crate::model::DEFAULT_BACKGROUND_COLOR;
use serde::{Deserialize, Serialize};

/// Storage key the document blob is persisted under.
pub const DEFAULT_STORAGE_KEY: &str = "trello-board-storage";

/// Configuration for a [`BoardStore`](crate::BoardStore) and its drag coordinators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KanbanConfig {
    pub storage_key: String,
    pub default_background_color: String,
    pub drag: DragConfig,
}

impl Default for KanbanConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            drag: DragConfig::default(),
        }
    }
}

impl KanbanConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Drag session behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DragConfig {
    /// Restore the board as it was at drag start when a drag ends without a
    /// drop target. When false, speculative cross-list moves made while
    /// hovering are kept.
    pub rollback_on_cancel: bool,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            rollback_on_cancel: true,
        }
    }
}
