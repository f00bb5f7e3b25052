use thiserror::Error;

/// Fatal errors that abort an import entirely.
///
/// Anything structural — an unreadable document, a missing schema root, a
/// cyclic board hierarchy — lands here. Per-node problems do not: those are
/// recovered locally and reported as a [`Warning`].
#[derive(Error, Debug, Clone)]
pub enum ImportError {
    #[error("Failed to parse project JSON: {0}")]
    Parse(String),

    #[error("Project document is missing required structure: {0}")]
    SchemaMismatch(String),

    #[error("Project contains no boards to import")]
    EmptyProject,

    #[error("Board hierarchy exceeds depth limit of {limit} at '{path}' (cyclic parent chain?)")]
    DepthExceeded { path: String, limit: usize },

    #[error("Import aborted: {0}")]
    Aborted(String),
}

/// Recoverable per-node problems, accumulated into an
/// [`ImportReport`](crate::report::ImportReport) instead of interrupting
/// the import.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    #[error("Link from '{source_id}' refers to unknown object '{target_id}'; link skipped")]
    DanglingReference {
        source_id: String,
        target_id: String,
    },

    #[error("Variable '{name}' has unsupported type tag '{type_tag}'; variable skipped")]
    UnsupportedFieldType { name: String, type_tag: String },

    #[error("Jumper '{jumper_id}' has no resolvable destination; left unlinked")]
    UnresolvedJumper { jumper_id: String },

    #[error("Speaker directive names unknown actor '{name}'; using default speaker")]
    UnresolvedSpeaker { name: String },

    #[error("Node '{id}' is malformed ({reason}); node skipped")]
    MalformedNode { id: String, reason: String },

    #[error("Board '{board_id}' selected for conversion was not found; conversation skipped")]
    MissingBoard { board_id: String },

    #[error("Board '{board_id}' has an empty children list; treated as a container with no conversations")]
    ChildlessContainer { board_id: String },
}
