//! The normalized conversation model produced by an import.
//!
//! This is the canonical target structure for any vendor conversion: a
//! [`Database`] of entities plus [`Conversation`] graphs made of
//! [`DialogueEntry`] nodes and directed [`Link`] edges. Entry `0` of every
//! conversation is its START node.

use serde::{Deserialize, Serialize};

/// Value types a field or variable can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Boolean,
    Number,
    Text,
}

/// A named value attached to an entity or dialogue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub title: String,
    pub value: String,
    pub kind: FieldKind,
}

impl Field {
    pub fn text(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            kind: FieldKind::Text,
        }
    }
}

/// Initial value of an imported variable. The kind is implied by the
/// variant, so there is no way to construct a mismatched pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VariableValue {
    Boolean(bool),
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub id: i32,
    pub name: String,
    pub value: VariableValue,
}

/// A speaking participant. `is_player` distinguishes player-controlled
/// actors from NPCs when assigning connection entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i32,
    pub name: String,
    pub is_player: bool,
    pub fields: Vec<Field>,
    /// File name of a portrait image, if the source component had a cover
    /// asset. Loading the image is the host's concern.
    pub portrait: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: i32,
    pub name: String,
    pub fields: Vec<Field>,
}

/// A directed edge between two dialogue entries. Both endpoints carry a
/// conversation id so that jumps between conversations are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub from_conversation: i32,
    pub from_entry: i32,
    pub to_conversation: i32,
    pub to_entry: i32,
}

impl Link {
    pub fn new(from: EntryRef, to: EntryRef) -> Self {
        Self {
            from_conversation: from.0,
            from_entry: from.1,
            to_conversation: to.0,
            to_entry: to.1,
        }
    }

    pub fn target(&self) -> EntryRef {
        (self.to_conversation, self.to_entry)
    }
}

/// `(conversation id, entry id)` — the stable address of a dialogue entry.
pub type EntryRef = (i32, i32);

/// One node in a conversation graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueEntry {
    pub id: i32,
    pub conversation_id: i32,
    pub title: String,
    pub dialogue_text: String,
    /// Cutscene/stage directions, e.g. `None()` or `Continue()`.
    pub sequence: String,
    /// Condition that must hold for this entry to be offered, in the target
    /// scripting syntax.
    pub conditions: String,
    /// Side-effect script run when the entry plays.
    pub user_script: String,
    pub actor_id: i32,
    pub conversant_id: i32,
    /// Structural pass-through node with no rendered text.
    pub is_group: bool,
    pub outgoing_links: Vec<Link>,
    pub fields: Vec<Field>,
}

impl DialogueEntry {
    pub fn new(id: i32, conversation_id: i32) -> Self {
        Self {
            id,
            conversation_id,
            title: String::new(),
            dialogue_text: String::new(),
            sequence: String::new(),
            conditions: String::new(),
            user_script: String::new(),
            actor_id: 0,
            conversant_id: 0,
            is_group: false,
            outgoing_links: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn entry_ref(&self) -> EntryRef {
        (self.conversation_id, self.id)
    }
}

/// An ordered collection of dialogue entries forming one conversation
/// graph. Entry id `0` is the START node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i32,
    pub title: String,
    pub actor_id: i32,
    pub conversant_id: i32,
    pub entries: Vec<DialogueEntry>,
}

impl Conversation {
    pub fn new(id: i32, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            actor_id: 0,
            conversant_id: 0,
            entries: Vec::new(),
        }
    }

    pub fn entry(&self, id: i32) -> Option<&DialogueEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn entry_mut(&mut self, id: i32) -> Option<&mut DialogueEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    pub fn start_entry(&self) -> Option<&DialogueEntry> {
        self.entry(0)
    }

    pub fn next_entry_id(&self) -> i32 {
        self.entries.iter().map(|e| e.id + 1).max().unwrap_or(0)
    }
}

/// The destination database an import writes into. May already hold
/// content from a previous import; entity creation merges by name instead
/// of duplicating.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub description: String,
    pub actors: Vec<Actor>,
    pub items: Vec<Item>,
    pub locations: Vec<Location>,
    pub variables: Vec<Variable>,
    pub conversations: Vec<Conversation>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actor_named(&self, name: &str) -> Option<&Actor> {
        self.actors.iter().find(|a| a.name == name)
    }

    pub fn actor_named_mut(&mut self, name: &str) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|a| a.name == name)
    }

    pub fn first_player(&self) -> Option<&Actor> {
        self.actors.iter().find(|a| a.is_player)
    }

    pub fn first_npc(&self) -> Option<&Actor> {
        self.actors.iter().find(|a| !a.is_player)
    }

    pub fn conversation(&self, id: i32) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn conversation_mut(&mut self, id: i32) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    pub fn conversation_titled(&self, title: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.title == title)
    }

    pub fn entry(&self, entry_ref: EntryRef) -> Option<&DialogueEntry> {
        self.conversation(entry_ref.0)?.entry(entry_ref.1)
    }

    pub fn entry_mut(&mut self, entry_ref: EntryRef) -> Option<&mut DialogueEntry> {
        self.conversation_mut(entry_ref.0)?.entry_mut(entry_ref.1)
    }

    pub fn next_actor_id(&self) -> i32 {
        self.actors.iter().map(|a| a.id + 1).max().unwrap_or(1)
    }

    pub fn next_item_id(&self) -> i32 {
        self.items.iter().map(|i| i.id + 1).max().unwrap_or(1)
    }

    pub fn next_location_id(&self) -> i32 {
        self.locations.iter().map(|l| l.id + 1).max().unwrap_or(1)
    }

    pub fn next_variable_id(&self) -> i32 {
        self.variables.iter().map(|v| v.id + 1).max().unwrap_or(1)
    }

    pub fn next_conversation_id(&self) -> i32 {
        self.conversations.iter().map(|c| c.id + 1).max().unwrap_or(1)
    }
}
