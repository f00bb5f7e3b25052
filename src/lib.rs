//! # Skein - Dialogue Graph Import Pipeline
//!
//! **Skein** turns node-graph dialogue projects (boards of elements,
//! connections, branches, and jumpers, as exported by visual writing
//! tools) into a normalized conversation database: flat conversations of
//! numbered dialogue entries wired together by resolvable links, plus the
//! actors, items, locations, and variables the dialogue references.
//!
//! ## Core Workflow
//!
//! 1.  **Configure**: Build an [`settings::ImportSettings`] describing which
//!     boards become conversations, which components are player or NPC
//!     actors, and how scripts should be converted.
//! 2.  **Import**: Feed the exported project JSON to
//!     [`importer::Importer::import`]. Parsing, hierarchy validation,
//!     entity mapping, graph conversion, and post-processing all run in
//!     one call.
//! 3.  **Inspect**: The returned [`report::ImportReport`] carries counts
//!     and every non-fatal warning; the populated
//!     [`graph::Database`] is ready to serialize or hand to a runtime.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use skein::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let json = std::fs::read_to_string("project.json")?;
//!
//!     let mut settings = ImportSettings::default();
//!     settings.conversations.push(ConversationSpec::new("board-guid"));
//!     settings.npc_component_guids.push("component-guid".to_string());
//!
//!     let mut db = Database::new();
//!     let report = Importer::new(settings).import(&json, &mut db)?;
//!
//!     for warning in &report.warnings {
//!         eprintln!("warning: {warning}");
//!     }
//!     for conversation in &db.conversations {
//!         println!("{} ({} entries)", conversation.title, conversation.entries.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod convert;
pub mod entities;
pub mod error;
pub mod graph;
pub mod importer;
pub mod prelude;
pub mod report;
pub mod script;
pub mod settings;
pub mod source;
