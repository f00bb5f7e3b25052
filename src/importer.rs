//! The top-level import pipeline: parse, validate the board hierarchy,
//! map entities, convert conversations, post-process.

use crate::catalog::BoardTree;
use crate::convert::Converter;
use crate::entities::EntityMapper;
use crate::error::ImportError;
use crate::graph::Database;
use crate::report::ImportReport;
use crate::script::ScriptConverter;
use crate::settings::ImportSettings;
use crate::source::Project;
use tracing::info;

/// Drives a full import of one exported project into a [`Database`].
///
/// The importer itself is cheap and reusable: all per-import state lives in
/// the conversion context created inside [`Importer::import`], so one
/// configured importer can process any number of project files.
#[derive(Debug, Clone, Default)]
pub struct Importer {
    settings: ImportSettings,
}

impl Importer {
    pub fn new(settings: ImportSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Imports the project JSON into `db`.
    ///
    /// On success the database holds the converted conversations and
    /// entities, and the returned [`ImportReport`] lists every non-fatal
    /// problem encountered along the way. On error the database may hold a
    /// partial result and should be discarded.
    pub fn import(&self, json: &str, db: &mut Database) -> Result<ImportReport, ImportError> {
        let mut report = ImportReport::default();

        let project = Project::from_json(json)?;
        let tree = BoardTree::build(&project, &mut report)?;

        let actor_lookup = EntityMapper::new(&project, &self.settings).apply(db, &mut report);

        let variable_names: Vec<String> = project
            .variables
            .values()
            .filter(|v| !v.name.is_empty())
            .map(|v| v.name.clone())
            .collect();
        let script = ScriptConverter::new(
            variable_names,
            self.settings.global_variables.clone(),
            self.settings.num_players,
        );

        Converter::new(&project, &tree, &self.settings, &actor_lookup, script)
            .convert(db, &mut report)?;

        info!(
            project = %project.name,
            conversations = report.conversations_created,
            entries = report.entries_created,
            warnings = report.warnings.len(),
            "import complete"
        );
        Ok(report)
    }
}
