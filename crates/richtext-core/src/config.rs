//! Editor configuration.

use serde::{Deserialize, Serialize};

/// Default bound of the undo stack.
pub const DEFAULT_MAX_UNDO_DEPTH: usize = 100;

/// Default persistence key.
pub const DEFAULT_STORAGE_KEY: &str = "richtext.document";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Settings shared by an editor session and its persistence adapter.
///
/// Every field is optional in serialized form.
pub struct EditorConfig {
    #[serde(default = "default_max_undo_depth")]
    /// Maximum number of undo entries kept; the oldest are dropped first.
    pub max_undo_depth: usize,

    #[serde(default = "default_storage_key")]
    /// Key under which the document is persisted.
    pub storage_key: String,

    #[serde(default)]
    /// A read-only editor ignores every commit.
    pub read_only: bool,
}

fn default_max_undo_depth() -> usize {
    DEFAULT_MAX_UNDO_DEPTH
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_undo_depth: DEFAULT_MAX_UNDO_DEPTH,
            storage_key: default_storage_key(),
            read_only: false,
        }
    }
}

impl EditorConfig {
    /// Parse a JSON configuration; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Copy with the read-only flag set.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}
