//! The deferred pass over the fully built conversation set: link ordering,
//! pass-through elimination, jumper resolution, inline-conditional
//! expansion, and final text/script touch-up.
//!
//! Everything here runs only after every selected board has been
//! converted, because jumpers and connection edges routinely point forward
//! into graphs that did not exist yet during the first pass.

use super::Converter;
use super::content::{extract_sequence, strip_tags, touch_up_rich_text};
use crate::error::Warning;
use crate::graph::{Database, DialogueEntry, EntryRef, Link};
use crate::report::ImportReport;
use ahash::AHashMap;
use itertools::Itertools;
use tracing::debug;

const NONE_SEQUENCE: &str = "None()";
const CONTINUE_SEQUENCE: &str = "Continue()";

pub(crate) fn run(converter: &mut Converter, db: &mut Database, report: &mut ImportReport) {
    // Reverse of the GUID → entry map, for output-order and jumper titles.
    let guid_of: AHashMap<EntryRef, String> = converter
        .entry_lookup
        .iter()
        .map(|(guid, &entry_ref)| (entry_ref, guid.clone()))
        .collect();

    order_links_by_outputs(converter, &guid_of, db);
    eliminate_pass_throughs(converter, db);
    set_start_sequences(db);
    connect_jumpers(converter, &guid_of, db, report);
    expand_conditionals(converter, db);
    extract_sequences(db);
    final_touch_up(converter, db);
    debug!("post-processing complete");
}

/// Stable-sorts each element entry's outgoing links to match the authored
/// order of the element's output sockets. Links whose target has no output
/// index keep their insertion order at the end.
fn order_links_by_outputs(
    converter: &Converter,
    guid_of: &AHashMap<EntryRef, String>,
    db: &mut Database,
) {
    for (guid, &entry_ref) in &converter.entry_lookup {
        let Some(element) = converter.catalog.element(guid) else {
            continue;
        };
        if element.outputs.is_empty() {
            continue;
        }
        let Some(entry) = db.entry_mut(entry_ref) else {
            continue;
        };
        entry.outgoing_links.sort_by_key(|link| {
            guid_of
                .get(&link.target())
                .and_then(|target_guid| {
                    element.outputs.iter().position(|o| o == target_guid)
                })
                .unwrap_or(usize::MAX)
        });
    }
}

/// Removes blank, codeless connection entries: incoming links are
/// re-pointed at the pass-through's own target, then the entry is dropped.
fn eliminate_pass_throughs(converter: &Converter, db: &mut Database) {
    // Chains of pass-throughs resolve transitively; a cycle just stops.
    let hops: AHashMap<EntryRef, EntryRef> = converter
        .pass_through
        .iter()
        .filter_map(|&entry_ref| {
            let entry = db.entry(entry_ref)?;
            if !entry.is_group {
                return None;
            }
            let first = entry.outgoing_links.first()?;
            Some((entry_ref, first.target()))
        })
        .collect();
    if hops.is_empty() {
        return;
    }

    let resolve = |mut target: EntryRef| -> EntryRef {
        let mut seen = vec![target];
        while let Some(&next) = hops.get(&target) {
            if seen.contains(&next) {
                break;
            }
            seen.push(next);
            target = next;
        }
        target
    };

    for conversation in &mut db.conversations {
        for entry in &mut conversation.entries {
            for link in &mut entry.outgoing_links {
                if hops.contains_key(&link.target()) {
                    let resolved = resolve(link.target());
                    link.to_conversation = resolved.0;
                    link.to_entry = resolved.1;
                }
            }
        }
    }
    for conversation in &mut db.conversations {
        conversation
            .entries
            .retain(|entry| !hops.contains_key(&entry.entry_ref()));
    }
}

fn set_start_sequences(db: &mut Database) {
    for conversation in &mut db.conversations {
        if let Some(start) = conversation.entry_mut(0) {
            if start.sequence.is_empty() {
                start.sequence = NONE_SEQUENCE.to_string();
            }
        }
    }
}

/// Resolves jumper placeholders against the complete entry map, so a
/// jumper can land in a conversation converted after its own.
fn connect_jumpers(
    converter: &Converter,
    guid_of: &AHashMap<EntryRef, String>,
    db: &mut Database,
    report: &mut ImportReport,
) {
    let targets = converter
        .jumper_targets
        .iter()
        .sorted_by_key(|&(&entry_ref, _)| entry_ref);
    for (&jumper_ref, target_guid) in targets {
        let Some(&destination_ref) = converter.entry_lookup.get(target_guid) else {
            report.warn(Warning::UnresolvedJumper {
                jumper_id: guid_of
                    .get(&jumper_ref)
                    .cloned()
                    .unwrap_or_else(|| target_guid.clone()),
            });
            continue;
        };

        let destination_text = db
            .entry(destination_ref)
            .map(|destination| {
                if destination.title.is_empty() {
                    destination.dialogue_text.clone()
                } else {
                    destination.title.clone()
                }
            })
            .unwrap_or_default();

        let Some(jumper) = db.entry_mut(jumper_ref) else {
            continue;
        };
        jumper.title = if destination_text.is_empty() {
            "Jumper".to_string()
        } else {
            format!(
                "Jumper: {}",
                strip_tags(&destination_text.replace(['\n', '\r'], ""))
            )
        };
        jumper.outgoing_links.clear();
        jumper
            .outgoing_links
            .push(Link::new(jumper_ref, destination_ref));
    }
}

/// Materializes each pending inline conditional as a diamond sub-graph:
/// entry → {if, elseif*, else} → post-if, with the post-if entry taking
/// over the entry's original outgoing links verbatim.
fn expand_conditionals(converter: &mut Converter, db: &mut Database) {
    let pending = std::mem::take(&mut converter.conditionals);
    for (entry_ref, block) in pending.into_iter().sorted_by_key(|(entry_ref, _)| *entry_ref) {
        let Some(conversation) = db.conversation_mut(entry_ref.0) else {
            continue;
        };
        let Some(original) = conversation.entry(entry_ref.1) else {
            continue;
        };
        let actor_id = original.actor_id;
        let conversant_id = original.conversant_id;
        let inherited_links = original.outgoing_links.clone();

        let post_if_id = conversation.next_entry_id();
        let mut post_if = DialogueEntry::new(post_if_id, conversation.id);
        let post_if_ref = post_if.entry_ref();
        post_if.actor_id = actor_id;
        post_if.conversant_id = conversant_id;
        // Same targets as the original entry, re-sourced to the new node.
        post_if.outgoing_links = inherited_links
            .iter()
            .map(|link| Link::new(post_if_ref, link.target()))
            .collect();
        if block.post_text.is_empty() {
            post_if.is_group = true;
        } else {
            post_if.dialogue_text = block.post_text;
        }
        conversation.entries.push(post_if);

        let mut branch_links = Vec::new();
        for branch in &block.branches {
            let branch_id = conversation.next_entry_id();
            let mut branch_entry = DialogueEntry::new(branch_id, conversation.id);
            branch_entry.actor_id = actor_id;
            branch_entry.conversant_id = conversant_id;
            branch_entry.is_group = branch.text.is_empty();
            if !branch_entry.is_group {
                branch_entry.sequence = CONTINUE_SEQUENCE.to_string();
            }
            branch_entry.dialogue_text = branch.text.clone();
            branch_entry.conditions = branch.condition.clone();
            branch_entry.user_script = branch.inner_code.clone();
            let branch_ref = branch_entry.entry_ref();
            branch_entry
                .outgoing_links
                .push(Link::new(branch_ref, post_if_ref));
            conversation.entries.push(branch_entry);
            branch_links.push(Link::new(entry_ref, branch_ref));
        }

        if let Some(original) = conversation.entry_mut(entry_ref.1) {
            original.outgoing_links = branch_links;
            // Fallthrough for when no arm fires.
            original
                .outgoing_links
                .push(Link::new(entry_ref, post_if_ref));
        }
    }
}

fn extract_sequences(db: &mut Database) {
    for conversation in &mut db.conversations {
        for entry in &mut conversation.entries {
            if let Some((sequence, remaining)) = extract_sequence(&entry.dialogue_text) {
                if entry.sequence.is_empty() {
                    entry.sequence = sequence;
                } else {
                    entry.sequence = format!("{};\n{}", entry.sequence, sequence);
                }
                entry.dialogue_text = remaining;
            }
        }
    }
}

/// Final cleanup over every entry: rich text, script conversion, and
/// default sequences for textless non-group entries.
fn final_touch_up(converter: &Converter, db: &mut Database) {
    for conversation in &mut db.conversations {
        for entry in &mut conversation.entries {
            entry.title = touch_up_rich_text(&entry.title);
            entry.dialogue_text = touch_up_rich_text(&entry.dialogue_text);
            if !entry.user_script.is_empty() {
                entry.user_script = converter.script.convert_script(&entry.user_script);
            }
            if !entry.conditions.is_empty() {
                entry.conditions = converter.script.convert_condition(&entry.conditions);
            }
            if !entry.is_group && entry.dialogue_text.is_empty() && entry.sequence.is_empty() {
                entry.sequence = if entry.id == 0 {
                    NONE_SEQUENCE.to_string()
                } else {
                    CONTINUE_SEQUENCE.to_string()
                };
            }
        }
    }
}
