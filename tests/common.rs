//! Common test utilities for building source project fixtures.

use serde_json::{Value, json};
use skein::prelude::*;

/// Builds a vendor-shaped project export as JSON. Starts with a root board
/// (`b-root`) and grows leaf boards and graph objects from there.
pub struct ProjectFixture {
    value: Value,
}

#[allow(dead_code)]
impl ProjectFixture {
    pub fn new(name: &str) -> Self {
        Self {
            value: json!({
                "name": name,
                "boards": {
                    "b-root": { "name": name, "root": true, "children": [] }
                },
                "elements": {},
                "connections": {},
                "branches": {},
                "jumpers": {},
                "conditions": {},
                "components": {},
                "attributes": {},
                "assets": {},
                "variables": {}
            }),
        }
    }

    /// Adds a leaf board (no `children` array) under the root.
    pub fn leaf_board(&mut self, guid: &str, name: &str) -> &mut Self {
        self.value["boards"]["b-root"]["children"]
            .as_array_mut()
            .unwrap()
            .push(json!(guid));
        self.value["boards"][guid] = json!({
            "name": name,
            "elements": [],
            "connections": [],
            "branches": [],
            "jumpers": []
        });
        self
    }

    pub fn element(&mut self, board: &str, guid: &str, title: &str, content: &str) -> &mut Self {
        self.value["elements"][guid] = json!({
            "title": title,
            "content": content,
            "outputs": [],
            "components": []
        });
        self.push_into(board, "elements", guid);
        self
    }

    /// Sets the authored left-to-right output order of an element.
    pub fn outputs(&mut self, element: &str, outputs: &[&str]) -> &mut Self {
        self.value["elements"][element]["outputs"] = json!(outputs);
        self
    }

    pub fn attach_components(&mut self, element: &str, components: &[&str]) -> &mut Self {
        self.value["elements"][element]["components"] = json!(components);
        self
    }

    pub fn connection(
        &mut self,
        board: &str,
        guid: &str,
        label: &str,
        source: &str,
        target: &str,
    ) -> &mut Self {
        self.value["connections"][guid] = json!({
            "label": label,
            "sourceid": source,
            "targetid": target
        });
        self.push_into(board, "connections", guid);
        self
    }

    pub fn branch(
        &mut self,
        board: &str,
        guid: &str,
        if_condition: Option<&str>,
        else_if_conditions: &[&str],
        else_condition: Option<&str>,
    ) -> &mut Self {
        self.value["branches"][guid] = json!({
            "conditions": {
                "ifCondition": if_condition,
                "elseIfConditions": else_if_conditions,
                "elseCondition": else_condition
            }
        });
        self.push_into(board, "branches", guid);
        self
    }

    pub fn condition(&mut self, guid: &str, script: &str) -> &mut Self {
        self.value["conditions"][guid] = json!({ "script": script });
        self
    }

    pub fn jumper(&mut self, board: &str, guid: &str, element_id: Option<&str>) -> &mut Self {
        self.value["jumpers"][guid] = json!({ "elementId": element_id });
        self.push_into(board, "jumpers", guid);
        self
    }

    pub fn component(&mut self, guid: &str, name: &str) -> &mut Self {
        self.value["components"][guid] = json!({ "name": name, "attributes": [] });
        self
    }

    pub fn component_cover(&mut self, component: &str, asset: &str) -> &mut Self {
        self.value["components"][component]["assets"] = json!({ "cover": { "id": asset } });
        self
    }

    pub fn component_attribute(
        &mut self,
        component: &str,
        guid: &str,
        name: &str,
        type_tag: &str,
        data: Value,
    ) -> &mut Self {
        self.value["attributes"][guid] = json!({
            "name": name,
            "value": { "type": type_tag, "data": data }
        });
        self.value["components"][component]["attributes"]
            .as_array_mut()
            .unwrap()
            .push(json!(guid));
        self
    }

    pub fn asset(&mut self, guid: &str, name: &str) -> &mut Self {
        self.value["assets"][guid] = json!({ "name": name });
        self
    }

    pub fn variable(&mut self, name: &str, type_tag: &str, value: Value) -> &mut Self {
        self.value["variables"][format!("v-{name}")] = json!({
            "name": name,
            "type": type_tag,
            "value": value
        });
        self
    }

    pub fn json(&self) -> String {
        self.value.to_string()
    }

    fn push_into(&mut self, board: &str, category: &str, guid: &str) {
        self.value["boards"][board][category]
            .as_array_mut()
            .expect("board must exist before adding graph objects to it")
            .push(json!(guid));
    }
}

/// Settings selecting a single board for conversion, everything else
/// defaulted.
#[allow(dead_code)]
pub fn single_board_settings(board: &str) -> ImportSettings {
    let mut settings = ImportSettings::default();
    settings.conversations.push(ConversationSpec::new(board));
    settings
}

/// Initializes test logging once. Honors `RUST_LOG`.
#[allow(dead_code)]
pub fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Runs a full import of the fixture into a fresh database.
#[allow(dead_code)]
pub fn import_fixture(
    fixture: &ProjectFixture,
    settings: ImportSettings,
) -> (Database, ImportReport) {
    init_tracing();
    let mut db = Database::new();
    let report = Importer::new(settings)
        .import(&fixture.json(), &mut db)
        .expect("import should succeed");
    (db, report)
}

#[allow(dead_code)]
pub fn entry_with_text<'a>(conversation: &'a Conversation, text: &str) -> &'a DialogueEntry {
    conversation
        .entries
        .iter()
        .find(|e| e.dialogue_text == text)
        .unwrap_or_else(|| panic!("no entry with text {text:?}"))
}

#[allow(dead_code)]
pub fn entry_with_title<'a>(conversation: &'a Conversation, title: &str) -> &'a DialogueEntry {
    conversation
        .entries
        .iter()
        .find(|e| e.title == title)
        .unwrap_or_else(|| panic!("no entry with title {title:?}"))
}
