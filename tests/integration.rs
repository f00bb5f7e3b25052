//! End-to-end import over a project exercising every graph object kind,
//! plus settings persistence.

mod common;

use common::ProjectFixture;
use serde_json::json;
use skein::prelude::*;
use std::io::Write;

fn full_fixture() -> ProjectFixture {
    let mut fixture = ProjectFixture::new("Greenhollow");
    fixture
        .leaf_board("b-gate", "Gate")
        .leaf_board("b-inn", "Inn")
        // Gate: greeting, a choice pair, a branch, and a jumper to the inn.
        .element("b-gate", "e-greet", "Speaker: Guard", "<p>Halt. State your business.</p>")
        .element("b-gate", "e-pass", "", "<p>Move along.</p>")
        .element(
            "b-gate",
            "e-bribe",
            "",
            "<pre><code>if gold > 10</code></pre><p>That works.</p>\
             <pre><code>else</code></pre><p>Not enough.</p>\
             <pre><code>endif</code></pre>",
        )
        .outputs("e-greet", &["c-talk", "c-bribe"])
        .connection("b-gate", "c-talk", "<p>Just passing through</p>", "e-greet", "e-pass")
        .connection("b-gate", "c-bribe", "<code>gold -= 10</code>", "e-greet", "e-bribe")
        .branch("b-gate", "br-mood", Some("cond-angry"), &[], Some("cond-calm"))
        .condition("cond-angry", "visits() > 2")
        .condition("cond-calm", "")
        .connection("b-gate", "c-to-mood", "", "e-pass", "br-mood")
        .jumper("b-gate", "j-inn", Some("e-welcome"))
        .connection("b-gate", "c-to-inn", "", "e-bribe", "j-inn")
        // Inn.
        .element("b-inn", "e-welcome", "Welcome", "<p>Warm fire, cold ale.</p>")
        // Entities.
        .component("comp-hero", "Hero")
        .component("comp-guard", "Guard")
        .component_cover("comp-guard", "asset-guard")
        .asset("asset-guard", "guard.png")
        .variable("gold", "integer", json!(25))
        .variable("visited", "boolean", json!(false));
    fixture
}

fn full_settings() -> ImportSettings {
    let mut settings = ImportSettings::default();
    settings.conversations.push(ConversationSpec::new("b-gate"));
    settings.conversations.push(ConversationSpec::new("b-inn"));
    settings.player_component_guids.push("comp-hero".to_string());
    settings.npc_component_guids.push("comp-guard".to_string());
    settings
}

#[test]
fn full_project_imports_cleanly() {
    let mut db = Database::new();
    let report = Importer::new(full_settings())
        .import(&full_fixture().json(), &mut db)
        .expect("full project should import");

    assert_eq!(report.conversations_created, 2);
    assert_eq!(report.actors_created, 2);
    assert_eq!(report.variables_created, 2);
    assert!(
        !report.warnings.iter().any(|w| matches!(
            w,
            Warning::DanglingReference { .. } | Warning::UnresolvedJumper { .. }
        )),
        "unexpected warnings: {:?}",
        report.warnings
    );

    let gate = db.conversation_titled("Gate").expect("gate conversation");
    assert!(db.conversation_titled("Inn").is_some());
    assert_eq!(gate.start_entry().map(|e| e.sequence.as_str()), Some("None()"));
}

#[test]
fn entry_ids_are_unique_and_links_resolve() {
    let mut db = Database::new();
    Importer::new(full_settings())
        .import(&full_fixture().json(), &mut db)
        .expect("import");

    for conversation in &db.conversations {
        let mut ids: Vec<i32> = conversation.entries.iter().map(|e| e.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(
            ids.len(),
            conversation.entries.len(),
            "duplicate entry id in conversation {}",
            conversation.title
        );

        for entry in &conversation.entries {
            for link in &entry.outgoing_links {
                assert_eq!(link.from_conversation, conversation.id);
                assert_eq!(link.from_entry, entry.id);
                assert!(
                    db.entry(link.target()).is_some(),
                    "dangling link {:?} from entry {} of {}",
                    link.target(),
                    entry.id,
                    conversation.title
                );
            }
        }
    }
}

#[test]
fn scripts_and_conditions_are_fully_converted() {
    let mut db = Database::new();
    Importer::new(full_settings())
        .import(&full_fixture().json(), &mut db)
        .expect("import");

    let gate = db.conversation_titled("Gate").expect("gate conversation");
    assert!(
        gate.entries
            .iter()
            .any(|e| e.user_script == "Variable[\"gold\"] = Variable[\"gold\"] - 10"),
        "bribe connection script not converted"
    );

    let angry = common::entry_with_title(gate, "if visits() > 2");
    assert_eq!(angry.conditions, "visits(\"\") > 2");
    let calm = common::entry_with_title(gate, "else");
    assert_eq!(calm.conditions, "not (visits(\"\") > 2)");
}

#[test]
fn database_serializes_and_round_trips() {
    let mut db = Database::new();
    Importer::new(full_settings())
        .import(&full_fixture().json(), &mut db)
        .expect("import");

    let json = serde_json::to_string(&db).expect("serialize database");
    let restored: Database = serde_json::from_str(&json).expect("deserialize database");
    assert_eq!(restored.conversations.len(), db.conversations.len());
    assert_eq!(restored.actors, db.actors);
    assert_eq!(restored.variables, db.variables);
}

#[test]
fn settings_persist_through_a_file() {
    let settings = full_settings();
    let serialized = settings.to_json().expect("serialize settings");

    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(serialized.as_bytes()).expect("write settings");

    let reread = std::fs::read_to_string(file.path()).expect("read settings back");
    let restored = ImportSettings::from_json(&reread).expect("parse settings");
    assert_eq!(restored, settings);
}

#[test]
fn partial_settings_json_fills_defaults() {
    let restored = ImportSettings::from_json(r#"{"num_players": 2}"#).expect("parse");
    assert_eq!(restored.num_players, 2);
    assert!(restored.import_portraits);
    assert!(restored.conversations.is_empty());
}
