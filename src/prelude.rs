//! Prelude module for convenient imports
//!
//! Re-exports the types most programs need to run an import: the importer
//! itself, its settings, the normalized database model, and the error and
//! report types.
//!
//! # Example
//!
//! ```rust,no_run
//! use skein::prelude::*;
//!
//! # fn run_example() -> Result<(), Box<dyn std::error::Error>> {
//! let json = std::fs::read_to_string("path/to/project.json")?;
//!
//! let mut settings = ImportSettings::default();
//! settings.conversations.push(ConversationSpec::new("board-guid"));
//!
//! let mut db = Database::new();
//! let report = Importer::new(settings).import(&json, &mut db)?;
//!
//! println!("{}", report);
//! # Ok(())
//! # }
//! ```

// Pipeline entry points
pub use crate::importer::Importer;
pub use crate::settings::{ConversationSpec, ImportSettings};

// Normalized output model
pub use crate::graph::{
    Actor, Conversation, Database, DialogueEntry, EntryRef, Field, Item, Link, Location, Variable,
};

// Diagnostics
pub use crate::error::{ImportError, Warning};
pub use crate::report::ImportReport;
