use crate::error::Warning;
use std::fmt;

/// Summary of a completed import: everything that went wrong without being
/// fatal, plus counts of what was produced.
///
/// Warnings are accumulated during conversion and surfaced here as a single
/// post-import report rather than as individual interrupts.
#[derive(Debug, Default, Clone)]
pub struct ImportReport {
    pub warnings: Vec<Warning>,
    pub conversations_created: usize,
    pub entries_created: usize,
    pub actors_created: usize,
    pub items_created: usize,
    pub locations_created: usize,
    pub variables_created: usize,
}

impl ImportReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(%warning, "import warning");
        self.warnings.push(warning);
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Imported {} conversations ({} entries), {} actors, {} items, {} locations, {} variables.",
            self.conversations_created,
            self.entries_created,
            self.actors_created,
            self.items_created,
            self.locations_created,
            self.variables_created
        )?;
        if self.warnings.is_empty() {
            write!(f, "No warnings.")
        } else {
            writeln!(f, "{} warning(s):", self.warnings.len())?;
            for warning in &self.warnings {
                writeln!(f, "  - {}", warning)?;
            }
            Ok(())
        }
    }
}
