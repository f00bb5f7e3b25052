//! Typed mirror of the vendor export schema.
//!
//! Field names match the vendor JSON byte-for-byte (via `serde(rename)`
//! where Rust naming differs), so a well-formed export deserializes without
//! any dynamic traversal. Every object category is a GUID-keyed map.

use ahash::AHashMap;
use serde::Deserialize;

/// A complete exported project. The root of the source object graph.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub boards: AHashMap<String, Board>,
    #[serde(default)]
    pub elements: AHashMap<String, Element>,
    #[serde(default)]
    pub connections: AHashMap<String, Connection>,
    #[serde(default)]
    pub branches: AHashMap<String, Branch>,
    #[serde(default)]
    pub jumpers: AHashMap<String, Jumper>,
    #[serde(default)]
    pub conditions: AHashMap<String, Condition>,
    #[serde(default)]
    pub components: AHashMap<String, Component>,
    #[serde(default)]
    pub attributes: AHashMap<String, Attribute>,
    #[serde(default)]
    pub assets: AHashMap<String, Asset>,
    #[serde(default)]
    pub variables: AHashMap<String, SourceVariable>,
}

/// A board: one authored graph. Boards form a containment hierarchy; a
/// board with no `children` array is a leaf and a conversation candidate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Board {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub root: bool,
    /// GUIDs of child boards. `None` marks a leaf; an empty list marks a
    /// container that happens to hold no boards.
    pub children: Option<Vec<String>>,
    #[serde(default)]
    pub elements: Vec<String>,
    #[serde(default)]
    pub connections: Vec<String>,
    #[serde(default)]
    pub branches: Vec<String>,
    #[serde(default)]
    pub jumpers: Vec<String>,
}

/// A dialogue node. `outputs` preserves the authored left-to-right order of
/// outgoing connections, which the final link ordering must match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Element {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub outputs: Vec<String>,
    /// Component GUIDs attached to this element. The first is the speaker,
    /// the second the listener.
    #[serde(default)]
    pub components: Vec<String>,
}

/// A directed edge between two graph objects. A blank label is a structural
/// pass-through; a non-blank label is player-choice text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Connection {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub sourceid: String,
    #[serde(default)]
    pub targetid: String,
}

/// A conditional router over an `if` / `elseif`* / `else` chain of
/// [`Condition`] objects.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Branch {
    #[serde(default)]
    pub conditions: BranchConditions,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BranchConditions {
    #[serde(rename = "ifCondition")]
    pub if_condition: Option<String>,
    #[serde(rename = "elseIfConditions", default)]
    pub else_if_conditions: Vec<String>,
    #[serde(rename = "elseCondition")]
    pub else_condition: Option<String>,
}

/// A portal to an element, possibly in a different board. Destinations are
/// resolved in a deferred pass because forward references are common.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Jumper {
    #[serde(rename = "elementId")]
    pub element_id: Option<String>,
}

/// One arm of a branch. The script is in the vendor's expression grammar
/// and is converted to the target scripting syntax during import.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub script: String,
}

/// An authored entity: character, item, or location, depending on how the
/// import settings classify it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Component {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<String>,
    pub assets: Option<ComponentAssets>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComponentAssets {
    pub cover: Option<AssetRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetRef {
    #[serde(default)]
    pub id: String,
}

/// A named attribute attached to a component.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Attribute {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: AttributeValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttributeValue {
    #[serde(rename = "type", default)]
    pub type_tag: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Asset {
    #[serde(default)]
    pub name: String,
}

/// A project variable. `type_tag` is one of the vendor's
/// `boolean|float|integer|string`; anything else is reported and skipped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceVariable {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_tag: String,
    #[serde(default)]
    pub value: serde_json::Value,
}
