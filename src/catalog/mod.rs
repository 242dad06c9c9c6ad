//! The endpoint snapshot: retrieval and read-only query access.

pub mod fetch;
pub mod store;

/// Literal caption shown when the snapshot cannot be fetched or opened.
///
/// Load failures never propagate past the load boundary; they degrade to this
/// string in the table caption (dashboard) or on stderr (CLI).
pub const SNAPSHOT_LOAD_ERROR_CAPTION: &str = "Could not load SQLite file.";
