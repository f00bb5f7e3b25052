//! Maps classified source components and variables into normalized
//! entities with stable numeric ids.
//!
//! Creation merges by exact name: re-importing the same project augments
//! existing entities instead of duplicating them, so entity lists are
//! idempotent across imports.

use crate::catalog::Catalog;
use crate::convert::content::touch_up_rich_text;
use crate::error::Warning;
use crate::graph::{Actor, Database, Field, Item, Location, Variable, VariableValue};
use crate::report::ImportReport;
use crate::settings::ImportSettings;
use crate::source::{Component, Project};
use ahash::AHashMap;
use tracing::debug;

pub struct EntityMapper<'a> {
    project: &'a Project,
    catalog: Catalog<'a>,
    settings: &'a ImportSettings,
}

impl<'a> EntityMapper<'a> {
    pub fn new(project: &'a Project, settings: &'a ImportSettings) -> Self {
        Self {
            project,
            catalog: Catalog::new(project),
            settings,
        }
    }

    /// Populates the database's entity lists and returns the component
    /// GUID → actor id lookup used while converting conversations.
    pub fn apply(
        &self,
        db: &mut Database,
        report: &mut ImportReport,
    ) -> AHashMap<String, i32> {
        db.description = self.project.name.clone();

        self.add_variables(db, report);
        self.add_locations(db, report);
        self.add_items(db, report);

        let mut actor_lookup = AHashMap::new();
        self.add_actors(
            &self.settings.player_component_guids,
            "Player",
            true,
            db,
            report,
            &mut actor_lookup,
        );
        self.add_actors(
            &self.settings.npc_component_guids,
            "NPC",
            false,
            db,
            report,
            &mut actor_lookup,
        );

        // Deterministic output ordering for reproducible re-import diffs.
        db.actors.sort_by(|a, b| a.name.cmp(&b.name));
        db.items.sort_by(|a, b| a.name.cmp(&b.name));
        db.locations.sort_by(|a, b| a.name.cmp(&b.name));
        db.variables.sort_by(|a, b| a.name.cmp(&b.name));

        debug!(
            actors = db.actors.len(),
            items = db.items.len(),
            locations = db.locations.len(),
            variables = db.variables.len(),
            "entity mapping complete"
        );
        actor_lookup
    }

    fn add_variables(&self, db: &mut Database, report: &mut ImportReport) {
        let mut prefixes = vec![String::new()];
        if self.settings.num_players > 1 {
            for i in 0..self.settings.num_players {
                prefixes.push(format!("Player{}_", i));
            }
        }

        // Source maps have no stable order; sort so ids are deterministic.
        let mut source_variables: Vec<_> = self
            .project
            .variables
            .values()
            .filter(|v| !v.name.is_empty())
            .collect();
        source_variables.sort_by(|a, b| a.name.cmp(&b.name));

        for prefix in &prefixes {
            for source in &source_variables {
                let is_global = self.settings.global_variables.contains(&source.name);
                if is_global && !prefix.is_empty() {
                    continue;
                }
                let value = match source.type_tag.as_str() {
                    "boolean" => VariableValue::Boolean(source.value.as_bool().unwrap_or(false)),
                    "float" => VariableValue::Number(source.value.as_f64().unwrap_or(0.0)),
                    "integer" => {
                        VariableValue::Number(source.value.as_i64().unwrap_or(0) as f64)
                    }
                    "string" => VariableValue::Text(
                        source.value.as_str().unwrap_or_default().to_string(),
                    ),
                    other => {
                        report.warn(Warning::UnsupportedFieldType {
                            name: source.name.clone(),
                            type_tag: other.to_string(),
                        });
                        continue;
                    }
                };
                let name = format!("{}{}", prefix, source.name);
                if let Some(existing) = db.variables.iter_mut().find(|v| v.name == name) {
                    existing.value = value;
                } else {
                    let id = db.next_variable_id();
                    db.variables.push(Variable { id, name, value });
                    report.variables_created += 1;
                }
            }
        }
    }

    fn add_locations(&self, db: &mut Database, report: &mut ImportReport) {
        for guid in &self.settings.location_component_guids {
            let Some(component) = self.catalog.component(guid) else {
                report.warn(Warning::DanglingReference {
                    source_id: "settings.location_component_guids".to_string(),
                    target_id: guid.clone(),
                });
                continue;
            };
            let fields = self.attribute_fields(component);
            if let Some(existing) = db.locations.iter_mut().find(|l| l.name == component.name) {
                existing.fields = fields;
            } else {
                let id = db.next_location_id();
                db.locations.push(Location {
                    id,
                    name: component.name.clone(),
                    fields,
                });
                report.locations_created += 1;
            }
        }
    }

    fn add_items(&self, db: &mut Database, report: &mut ImportReport) {
        for guid in &self.settings.item_component_guids {
            let Some(component) = self.catalog.component(guid) else {
                report.warn(Warning::DanglingReference {
                    source_id: "settings.item_component_guids".to_string(),
                    target_id: guid.clone(),
                });
                continue;
            };
            let fields = self.attribute_fields(component);
            if let Some(existing) = db.items.iter_mut().find(|i| i.name == component.name) {
                existing.fields = fields;
            } else {
                let id = db.next_item_id();
                db.items.push(Item {
                    id,
                    name: component.name.clone(),
                    fields,
                });
                report.items_created += 1;
            }
        }
    }

    fn add_actors(
        &self,
        guids: &[String],
        default_name: &str,
        is_player: bool,
        db: &mut Database,
        report: &mut ImportReport,
        actor_lookup: &mut AHashMap<String, i32>,
    ) {
        let mut any_resolved = false;
        for guid in guids {
            let Some(component) = self.catalog.component(guid) else {
                report.warn(Warning::DanglingReference {
                    source_id: "settings actor classification".to_string(),
                    target_id: guid.clone(),
                });
                continue;
            };
            any_resolved = true;
            let fields = self.attribute_fields(component);
            let portrait = self.portrait_for(component);
            let id = if let Some(existing) = db.actor_named_mut(&component.name) {
                existing.is_player = is_player;
                existing.fields = fields;
                if portrait.is_some() {
                    existing.portrait = portrait;
                }
                existing.id
            } else {
                let id = db.next_actor_id();
                db.actors.push(Actor {
                    id,
                    name: component.name.clone(),
                    is_player,
                    fields,
                    portrait,
                });
                report.actors_created += 1;
                id
            };
            actor_lookup.insert(guid.clone(), id);
        }

        // Conversations always need both participants, so synthesize a
        // default when no component was classified for this side.
        if !any_resolved && db.actor_named(default_name).is_none() {
            let id = db.next_actor_id();
            db.actors.push(Actor {
                id,
                name: default_name.to_string(),
                is_player,
                fields: Vec::new(),
                portrait: None,
            });
            report.actors_created += 1;
        }
    }

    fn attribute_fields(&self, component: &Component) -> Vec<Field> {
        let mut fields = Vec::new();
        for attribute_guid in &component.attributes {
            let Some(attribute) = self.catalog.attribute(attribute_guid) else {
                continue;
            };
            if attribute.value.type_tag == "string" {
                let text = touch_up_rich_text(attribute.value.data.as_str().unwrap_or_default());
                fields.push(Field::text(attribute.name.clone(), text));
            }
        }
        fields
    }

    fn portrait_for(&self, component: &Component) -> Option<String> {
        if !self.settings.import_portraits {
            return None;
        }
        let cover = component.assets.as_ref()?.cover.as_ref()?;
        let asset = self.catalog.asset(&cover.id)?;
        Some(asset.name.clone())
    }
}
