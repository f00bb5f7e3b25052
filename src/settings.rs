//! The import configuration surface: which source components map to which
//! entity category, which boards become conversations, and the global
//! import options. Persisted as JSON independently of the source project.

use serde::{Deserialize, Serialize};

/// Selects one leaf board for conversion and configures its participants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationSpec {
    pub board_guid: String,
    /// Index into the board's element list naming the entry the START node
    /// links to.
    pub start_index: usize,
    /// Component GUID of the player-side participant. Falls back to the
    /// first player actor in the database.
    pub actor_guid: Option<String>,
    /// Component GUID of the NPC-side participant. Falls back to the first
    /// non-player actor.
    pub conversant_guid: Option<String>,
}

impl ConversationSpec {
    pub fn new(board_guid: impl Into<String>) -> Self {
        Self {
            board_guid: board_guid.into(),
            ..Self::default()
        }
    }
}

/// Everything the user configured for an import, save/loadable as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    pub conversations: Vec<ConversationSpec>,
    /// Boards classified as quests. Persisted for round-tripping; quest
    /// conversion is a separate concern and not part of this pipeline.
    pub quest_board_guids: Vec<String>,
    pub player_component_guids: Vec<String>,
    pub npc_component_guids: Vec<String>,
    pub item_component_guids: Vec<String>,
    pub location_component_guids: Vec<String>,
    /// Merge into existing database content instead of assuming a clean
    /// database. Matching names are updated in place either way.
    pub merge: bool,
    /// Record component cover asset file names as actor portraits.
    pub import_portraits: bool,
    /// Add a `Guid` field to each imported entry for traceability.
    pub import_guids: bool,
    /// Greater than 1 imports a prefixed variable set per player.
    pub num_players: u32,
    /// Variable names exempt from per-player prefixing.
    pub global_variables: Vec<String>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            conversations: Vec::new(),
            quest_board_guids: Vec::new(),
            player_component_guids: Vec::new(),
            npc_component_guids: Vec::new(),
            item_component_guids: Vec::new(),
            location_component_guids: Vec::new(),
            merge: false,
            import_portraits: true,
            import_guids: false,
            num_players: 1,
            global_variables: Vec::new(),
        }
    }
}

impl ImportSettings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
