use crate::error::ImportError;
use crate::source::model::Project;
use tracing::debug;

impl Project {
    /// Deserializes a vendor project export.
    ///
    /// Fails with [`ImportError::Parse`] on malformed JSON,
    /// [`ImportError::SchemaMismatch`] if the root `boards` marker is
    /// absent, and [`ImportError::EmptyProject`] if no boards exist.
    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| ImportError::Parse(e.to_string()))?;

        if value.get("boards").is_none() {
            return Err(ImportError::SchemaMismatch(
                "no 'boards' object at document root".to_string(),
            ));
        }

        let project: Project =
            serde_json::from_value(value).map_err(|e| ImportError::Parse(e.to_string()))?;

        if project.boards.is_empty() {
            return Err(ImportError::EmptyProject);
        }

        debug!(
            name = %project.name,
            boards = project.boards.len(),
            elements = project.elements.len(),
            "loaded project export"
        );
        Ok(project)
    }
}
