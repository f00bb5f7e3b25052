//! The graph converter: walks each selected source board and materializes
//! a normalized conversation graph from its elements, connections,
//! branches, and jumpers.
//!
//! All conversion state lives in an explicit [`Converter`] context that is
//! threaded through every pass — there is no module-level state, so
//! imports are re-entrant by construction.

pub mod content;
pub mod postprocess;

use crate::catalog::{BoardTree, Catalog};
use crate::error::{ImportError, Warning};
use crate::graph::{Conversation, Database, DialogueEntry, EntryRef, Field, Link};
use crate::report::ImportReport;
use crate::script::ScriptConverter;
use crate::settings::{ConversationSpec, ImportSettings};
use crate::source::Project;
use ahash::{AHashMap, AHashSet};
use content::{ConditionalBlock, extract_label_code, process_content, speaker_directive};
use tracing::debug;

/// Which arm of a branch node a condition entry represents. Controls the
/// entry title and the cumulative-negation chaining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConditionRole {
    If,
    ElseIf,
    Else,
}

/// Conversion context for one import: the source project, the destination
/// lookups, and every piece of deferred work discovered along the way.
pub struct Converter<'a> {
    catalog: Catalog<'a>,
    tree: &'a BoardTree,
    settings: &'a ImportSettings,
    pub(crate) script: ScriptConverter,
    actor_lookup: &'a AHashMap<String, i32>,
    /// Source GUID → created dialogue entry, across all conversations.
    pub(crate) entry_lookup: AHashMap<String, EntryRef>,
    /// Inline conditional blocks awaiting diamond expansion.
    pub(crate) conditionals: AHashMap<EntryRef, ConditionalBlock>,
    /// Jumper entry → destination GUID, resolved in the deferred pass.
    pub(crate) jumper_targets: AHashMap<EntryRef, String>,
    /// Blank, codeless connection entries eligible for elimination.
    pub(crate) pass_through: AHashSet<EntryRef>,
    current_player_id: i32,
    current_npc_id: i32,
}

impl<'a> Converter<'a> {
    pub fn new(
        project: &'a Project,
        tree: &'a BoardTree,
        settings: &'a ImportSettings,
        actor_lookup: &'a AHashMap<String, i32>,
        script: ScriptConverter,
    ) -> Self {
        Self {
            catalog: Catalog::new(project),
            tree,
            settings,
            script,
            actor_lookup,
            entry_lookup: AHashMap::new(),
            conditionals: AHashMap::new(),
            jumper_targets: AHashMap::new(),
            pass_through: AHashSet::new(),
            current_player_id: 0,
            current_npc_id: 1,
        }
    }

    /// Converts every selected board, then resolves cross-graph links and
    /// runs the post-processing pass.
    pub fn convert(
        mut self,
        db: &mut Database,
        report: &mut ImportReport,
    ) -> Result<(), ImportError> {
        if self.settings.conversations.is_empty() {
            return Err(ImportError::Aborted(
                "no boards selected for conversion".to_string(),
            ));
        }

        for spec in &self.settings.conversations {
            self.convert_board(spec, db, report);
        }

        // Connection links are deferred until every conversation exists so
        // that edges crossing into later-processed boards still resolve.
        for spec in &self.settings.conversations {
            let Some(board) = self.catalog.board(&spec.board_guid) else {
                continue;
            };
            for connection_guid in &board.connections {
                let Some(connection) = self.catalog.connection(connection_guid) else {
                    continue;
                };
                self.add_link(&connection.sourceid, connection_guid, db, report);
                self.add_link(connection_guid, &connection.targetid, db, report);
            }
        }

        postprocess::run(&mut self, db, report);

        report.conversations_created = db.conversations.len();
        report.entries_created = db
            .conversations
            .iter()
            .map(|c| c.entries.len())
            .sum();
        Ok(())
    }

    fn convert_board(
        &mut self,
        spec: &ConversationSpec,
        db: &mut Database,
        report: &mut ImportReport,
    ) {
        let Some(board) = self.catalog.board(&spec.board_guid) else {
            report.warn(Warning::MissingBoard {
                board_id: spec.board_guid.clone(),
            });
            return;
        };

        self.current_player_id = spec
            .actor_guid
            .as_ref()
            .and_then(|guid| self.actor_lookup.get(guid).copied())
            .or_else(|| db.first_player().map(|a| a.id))
            .unwrap_or(0);
        self.current_npc_id = spec
            .conversant_guid
            .as_ref()
            .and_then(|guid| self.actor_lookup.get(guid).copied())
            .or_else(|| db.first_npc().map(|a| a.id))
            .unwrap_or(1);

        let title = self
            .tree
            .title_path(&spec.board_guid)
            .unwrap_or(&board.name)
            .to_string();
        if self.settings.merge {
            db.conversations.retain(|c| c.title != title);
        }
        let conversation_id = db.next_conversation_id();
        let mut conversation = Conversation::new(conversation_id, title);
        conversation.actor_id = self.current_player_id;
        conversation.conversant_id = self.current_npc_id;

        let mut start = DialogueEntry::new(0, conversation_id);
        start.title = "START".to_string();
        start.actor_id = self.current_player_id;
        start.conversant_id = self.current_npc_id;
        self.entry_lookup
            .insert(spec.board_guid.clone(), (conversation_id, 0));
        conversation.entries.push(start);
        db.conversations.push(conversation);

        debug!(board = %spec.board_guid, conversation_id, "converting board");

        self.add_elements(spec, db, report);
        self.add_connections(spec, db, report);
        self.add_branches(spec, db, report);
        self.add_jumpers(spec, db, report);

        // Connect START to the configured starting element.
        match board.elements.get(spec.start_index) {
            Some(start_guid) => {
                if let Some(&first_ref) = self.entry_lookup.get(start_guid) {
                    let start_ref = (conversation_id, 0);
                    if let Some(entry) = db.entry_mut(start_ref) {
                        entry.outgoing_links.push(Link::new(start_ref, first_ref));
                    }
                }
            }
            None => {
                report.warn(Warning::MalformedNode {
                    id: spec.board_guid.clone(),
                    reason: format!(
                        "start index {} out of range for {} elements",
                        spec.start_index,
                        board.elements.len()
                    ),
                });
            }
        }
    }

    fn add_elements(
        &mut self,
        spec: &ConversationSpec,
        db: &mut Database,
        report: &mut ImportReport,
    ) {
        let Some(board) = self.catalog.board(&spec.board_guid) else {
            return;
        };
        for element_guid in &board.elements {
            let Some(element) = self.catalog.element(element_guid) else {
                report.warn(Warning::DanglingReference {
                    source_id: spec.board_guid.clone(),
                    target_id: element_guid.clone(),
                });
                continue;
            };

            let actor_id = self.speaker_from_title(&element.title, db, report);
            let entry_ref = self.get_or_create_entry(element_guid, db);
            let processed = process_content(&element.content);

            // Component attachments override the title-derived speaker:
            // first component speaks, second listens.
            let component_actor = element
                .components
                .first()
                .and_then(|guid| self.actor_lookup.get(guid).copied());
            let component_conversant = element
                .components
                .get(1)
                .and_then(|guid| self.actor_lookup.get(guid).copied());

            if let Some(conditional) = processed.conditional {
                self.conditionals.insert(entry_ref, conditional);
            }
            if let Some(entry) = db.entry_mut(entry_ref) {
                entry.title = element.title.clone();
                entry.actor_id = component_actor.unwrap_or(actor_id);
                entry.conversant_id = component_conversant.unwrap_or(self.current_player_id);
                entry.dialogue_text = processed.dialogue_text;
                entry.user_script = processed.user_script;
            }
        }
    }

    fn add_connections(
        &mut self,
        spec: &ConversationSpec,
        db: &mut Database,
        report: &mut ImportReport,
    ) {
        let Some(board) = self.catalog.board(&spec.board_guid) else {
            return;
        };
        for connection_guid in &board.connections {
            let Some(connection) = self.catalog.connection(connection_guid) else {
                report.warn(Warning::DanglingReference {
                    source_id: spec.board_guid.clone(),
                    target_id: connection_guid.clone(),
                });
                continue;
            };

            let (label, code) = extract_label_code(&connection.label);
            let cleaned_label = content::touch_up_rich_text(&label);
            let is_blank = cleaned_label.is_empty();

            let entry_ref = self.get_or_create_entry(connection_guid, db);
            if is_blank && code.is_empty() {
                self.pass_through.insert(entry_ref);
            }
            if let Some(entry) = db.entry_mut(entry_ref) {
                if is_blank {
                    // Structural pass-through: nothing rendered.
                    entry.actor_id = self.current_npc_id;
                    entry.conversant_id = self.current_player_id;
                    entry.is_group = true;
                } else {
                    // Labeled connections read as player choices.
                    entry.actor_id = self.current_player_id;
                    entry.conversant_id = self.current_npc_id;
                    entry.dialogue_text = cleaned_label;
                }
                entry.user_script = code;
            }
        }
    }

    fn add_branches(
        &mut self,
        spec: &ConversationSpec,
        db: &mut Database,
        report: &mut ImportReport,
    ) {
        let Some(board) = self.catalog.board(&spec.board_guid) else {
            return;
        };
        for branch_guid in &board.branches {
            let Some(branch) = self.catalog.branch(branch_guid) else {
                report.warn(Warning::DanglingReference {
                    source_id: spec.board_guid.clone(),
                    target_id: branch_guid.clone(),
                });
                continue;
            };

            let entry_ref = self.get_or_create_entry(branch_guid, db);
            if let Some(entry) = db.entry_mut(entry_ref) {
                entry.actor_id = self.current_npc_id;
                entry.conversant_id = self.current_player_id;
                entry.is_group = true;
            }

            // Each arm becomes its own group entry carrying its condition,
            // with prior arms negated so only one arm can fire.
            let conditions = &branch.conditions;
            let mut cumulative = String::new();
            if let Some(if_guid) = &conditions.if_condition {
                self.create_condition_entry(
                    if_guid,
                    ConditionRole::If,
                    &mut cumulative,
                    db,
                    report,
                );
                self.add_link(branch_guid, if_guid, db, report);
            }
            for else_if_guid in &conditions.else_if_conditions {
                self.create_condition_entry(
                    else_if_guid,
                    ConditionRole::ElseIf,
                    &mut cumulative,
                    db,
                    report,
                );
                self.add_link(branch_guid, else_if_guid, db, report);
            }
            if let Some(else_guid) = &conditions.else_condition {
                self.create_condition_entry(
                    else_guid,
                    ConditionRole::Else,
                    &mut cumulative,
                    db,
                    report,
                );
                self.add_link(branch_guid, else_guid, db, report);
            }
        }
    }

    fn add_jumpers(
        &mut self,
        spec: &ConversationSpec,
        db: &mut Database,
        report: &mut ImportReport,
    ) {
        let Some(board) = self.catalog.board(&spec.board_guid) else {
            return;
        };
        for jumper_guid in &board.jumpers {
            let Some(jumper) = self.catalog.jumper(jumper_guid) else {
                report.warn(Warning::DanglingReference {
                    source_id: spec.board_guid.clone(),
                    target_id: jumper_guid.clone(),
                });
                continue;
            };

            let entry_ref = self.get_or_create_entry(jumper_guid, db);
            if let Some(entry) = db.entry_mut(entry_ref) {
                entry.actor_id = self.current_npc_id;
                entry.conversant_id = self.current_player_id;
                entry.title = "Jumper".to_string();
                entry.is_group = true;
            }
            match &jumper.element_id {
                Some(target) => {
                    self.jumper_targets.insert(entry_ref, target.clone());
                }
                None => report.warn(Warning::UnresolvedJumper {
                    jumper_id: jumper_guid.clone(),
                }),
            }
        }
    }

    fn create_condition_entry(
        &mut self,
        condition_guid: &str,
        role: ConditionRole,
        cumulative: &mut String,
        db: &mut Database,
        report: &mut ImportReport,
    ) {
        let Some(condition) = self.catalog.condition(condition_guid) else {
            report.warn(Warning::DanglingReference {
                source_id: "branch conditions".to_string(),
                target_id: condition_guid.to_string(),
            });
            return;
        };

        let entry_ref = self.get_or_create_entry(condition_guid, db);
        let has_condition = !condition.script.is_empty();
        let mut sanitized = if has_condition {
            self.script.convert_condition(&condition.script)
        } else {
            String::new()
        };
        if has_condition && (sanitized.contains(" and ") || sanitized.contains(" or ")) {
            sanitized = format!("({})", sanitized);
        }

        let have_previous = !cumulative.is_empty();
        let complete = match (has_condition, have_previous) {
            (_, false) => sanitized.clone(),
            // Unconditional arm after prior arms: fires only when none of
            // them did.
            (false, true) => format!("not ({})", cumulative),
            (true, true) => {
                if cumulative.starts_with('(') {
                    format!("(not {}) and {}", cumulative, sanitized)
                } else {
                    format!("(not ({})) and {}", cumulative, sanitized)
                }
            }
        };
        if has_condition {
            if !have_previous {
                *cumulative = sanitized;
            } else {
                *cumulative = format!("{} or {}", cumulative, sanitized);
            }
        }

        let title = match role {
            ConditionRole::If => format!("if {}", condition.script),
            ConditionRole::ElseIf => format!("elseif {}", condition.script),
            ConditionRole::Else => "else".to_string(),
        };
        if let Some(entry) = db.entry_mut(entry_ref) {
            entry.actor_id = self.current_npc_id;
            entry.conversant_id = self.current_player_id;
            entry.is_group = true;
            entry.conditions = complete;
            entry.title = title;
        }
    }

    fn speaker_from_title(
        &self,
        title: &str,
        db: &Database,
        report: &mut ImportReport,
    ) -> i32 {
        match speaker_directive(title) {
            Some(name) => match db.actor_named(&name) {
                Some(actor) => actor.id,
                None => {
                    report.warn(Warning::UnresolvedSpeaker { name });
                    self.current_npc_id
                }
            },
            None => self.current_npc_id,
        }
    }

    /// Fetches the entry already created for a GUID, or creates a fresh
    /// one in the current conversation.
    fn get_or_create_entry(&mut self, guid: &str, db: &mut Database) -> EntryRef {
        if let Some(&entry_ref) = self.entry_lookup.get(guid) {
            return entry_ref;
        }
        let conversation = db
            .conversations
            .last_mut()
            .unwrap_or_else(|| unreachable!("entries are only created inside a conversation"));
        let id = conversation.next_entry_id();
        let mut entry = DialogueEntry::new(id, conversation.id);
        if self.settings.import_guids {
            entry.fields.push(Field::text("Guid", guid));
        }
        let entry_ref = entry.entry_ref();
        conversation.entries.push(entry);
        self.entry_lookup.insert(guid.to_string(), entry_ref);
        entry_ref
    }

    /// Adds a link between the entries created for two GUIDs. Dangling
    /// endpoints are warned about and skipped, never fatal.
    pub(crate) fn add_link(
        &mut self,
        source_guid: &str,
        target_guid: &str,
        db: &mut Database,
        report: &mut ImportReport,
    ) -> bool {
        let (Some(&source_ref), Some(&target_ref)) = (
            self.entry_lookup.get(source_guid),
            self.entry_lookup.get(target_guid),
        ) else {
            report.warn(Warning::DanglingReference {
                source_id: source_guid.to_string(),
                target_id: target_guid.to_string(),
            });
            return false;
        };
        if let Some(entry) = db.entry_mut(source_ref) {
            entry.outgoing_links.push(Link::new(source_ref, target_ref));
            true
        } else {
            false
        }
    }
}
