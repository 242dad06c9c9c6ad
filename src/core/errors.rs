//! EPMX-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, EpmxError>;

/// Top-level error type for endpoint_matrix.
#[derive(Debug, Error)]
pub enum EpmxError {
    #[error("[EPMX-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[EPMX-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[EPMX-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[EPMX-2001] snapshot fetch failure for {url}: {details}")]
    SnapshotFetch { url: String, details: String },

    #[error("[EPMX-2002] snapshot open failure for {path}: {details}")]
    SnapshotOpen { path: PathBuf, details: String },

    #[error("[EPMX-2101] SQL failure in {context}: {details}")]
    Sql {
        context: &'static str,
        details: String,
    },

    #[error("[EPMX-2102] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[EPMX-2201] tooltip fetch failure for {url}: {details}")]
    TooltipFetch { url: String, details: String },

    #[error("[EPMX-3001] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[EPMX-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl EpmxError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "EPMX-1001",
            Self::MissingConfig { .. } => "EPMX-1002",
            Self::ConfigParse { .. } => "EPMX-1003",
            Self::SnapshotFetch { .. } => "EPMX-2001",
            Self::SnapshotOpen { .. } => "EPMX-2002",
            Self::Sql { .. } => "EPMX-2101",
            Self::Serialization { .. } => "EPMX-2102",
            Self::TooltipFetch { .. } => "EPMX-2201",
            Self::Io { .. } => "EPMX-3001",
            Self::Runtime { .. } => "EPMX-3900",
        }
    }

    /// Whether the error belongs to the snapshot load boundary. Load-boundary
    /// errors are rendered as the table caption, never propagated past it.
    #[must_use]
    pub const fn is_snapshot_load_failure(&self) -> bool {
        matches!(self, Self::SnapshotFetch { .. } | Self::SnapshotOpen { .. })
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<rusqlite::Error> for EpmxError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql {
            context: "rusqlite",
            details: value.to_string(),
        }
    }
}

impl From<serde_json::Error> for EpmxError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for EpmxError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
