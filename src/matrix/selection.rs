//! The persisted region selection: normalization and JSON storage.
//!
//! The selection is the single piece of mutable state in the whole pipeline.
//! Every mutation goes through the same normalization — de-duplicate, and
//! replace an empty result with the fixed fallback list — and is persisted
//! before the caller rebuilds anything from it.
//!
//! # Persistence Strategy
//!
//! Atomic write: serialize → temp file → fsync → rename over target, so a
//! reader never sees a partial file.
//!
//! # Error Philosophy
//!
//! Load problems (absent file, unreadable JSON, a JSON value that is not a
//! list, an empty list) are all the same case: use the fallback. They are
//! logged and silently corrected — restoring the selection re-persists the
//! resolved value so malformed stored state heals itself. Save failures are
//! logged and never block a rebuild.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

/// The fixed fallback applied whenever no valid selection can be resolved.
pub const FALLBACK_REGIONS: [&str; 7] = [
    "us-east-1",
    "us-west-1",
    "ca-central-1",
    "eu-central-1",
    "cn-north-1",
    "us-gov-west-1",
    "eusc-de-east-1",
];

/// An ordered, duplicate-free set of region names.
///
/// Internally a `BTreeSet`, so iteration order is lexicographic by name
/// regardless of construction order — which is exactly the column order the
/// table wants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection(BTreeSet<String>);

impl Selection {
    /// Normalize raw input into a selection: de-duplicate, and fall back to
    /// [`FALLBACK_REGIONS`] when the result would be empty.
    pub fn normalize<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if set.is_empty() {
            tracing::debug!("empty region selection, applying fallback list");
            Self::fallback()
        } else {
            Self(set)
        }
    }

    /// The fixed seven-region fallback selection.
    #[must_use]
    pub fn fallback() -> Self {
        Self(FALLBACK_REGIONS.iter().map(ToString::to_string).collect())
    }

    /// Number of selected regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the selection is empty. Normalized selections never are.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Membership test by region name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Region names in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// The serialized form: ordered unique names.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().collect();
        write!(f, "{}", names.join(", "))
    }
}

// ──────────────────── persistence ────────────────────

/// Load outcome from the persistence layer.
#[derive(Debug)]
pub enum LoadOutcome {
    /// A non-empty list of names was read. Not yet normalized.
    Loaded(Vec<String>),
    /// File not found — normal for first launch.
    Missing,
    /// File exists but is not a JSON list of strings.
    Corrupt { details: String },
    /// I/O error reading the file.
    IoError { details: String },
}

impl LoadOutcome {
    /// Whether the stored state needs to be corrected by a re-persist.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// Persistent store for the selection: one JSON file holding the serialized
/// region-name list, nothing else.
#[derive(Debug, Clone)]
pub struct SelectionStore {
    path: PathBuf,
}

impl SelectionStore {
    /// Create a store targeting the given file path.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the raw stored list without interpreting it.
    #[must_use]
    pub fn load(&self) -> LoadOutcome {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return LoadOutcome::Missing,
            Err(e) => {
                return LoadOutcome::IoError {
                    details: e.to_string(),
                };
            }
        };

        match serde_json::from_str::<Vec<String>>(&content) {
            Ok(names) if names.is_empty() => LoadOutcome::Corrupt {
                details: "stored selection is empty".to_string(),
            },
            Ok(names) => LoadOutcome::Loaded(names),
            Err(e) => LoadOutcome::Corrupt {
                details: e.to_string(),
            },
        }
    }

    /// Restore the selection: stored names if usable, the fallback otherwise.
    ///
    /// Always re-persists the resolved selection, so absent or malformed
    /// stored state is normalized on the spot.
    pub fn restore(&self) -> Selection {
        let selection = match self.load() {
            LoadOutcome::Loaded(names) => Selection::normalize(names),
            LoadOutcome::Missing => Selection::fallback(),
            LoadOutcome::Corrupt { details } => {
                tracing::warn!(
                    path = %self.path.display(),
                    details,
                    "stored region selection unusable, applying fallback"
                );
                Selection::fallback()
            }
            LoadOutcome::IoError { details } => {
                tracing::warn!(
                    path = %self.path.display(),
                    details,
                    "could not read region selection, applying fallback"
                );
                Selection::fallback()
            }
        };

        self.persist(&selection);
        selection
    }

    /// Normalize `names`, persist the result, and return it.
    ///
    /// The replacement is all-or-nothing: either the whole normalized input
    /// becomes the selection, or (when it normalizes to empty) the whole
    /// fallback list does. Malformed input is never an error.
    pub fn set<I, S>(&self, names: I) -> Selection
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let selection = Selection::normalize(names);
        self.persist(&selection);
        selection
    }

    /// Force the fallback selection (equivalent to `set([])`).
    pub fn reset(&self) -> Selection {
        self.set(Vec::<String>::new())
    }

    fn persist(&self, selection: &Selection) {
        if let Err(e) = save(selection, &self.path) {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "could not persist region selection"
            );
        }
    }
}

/// Atomic save: serialize → temp file → fsync → rename.
///
/// Creates parent directories as needed.
pub fn save(selection: &Selection, path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string(&selection.to_vec())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let tmp_path = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}
