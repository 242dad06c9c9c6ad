//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use endpoint_matrix::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{EpmxError, Result};

// Catalog
pub use crate::catalog::SNAPSHOT_LOAD_ERROR_CAPTION;
pub use crate::catalog::fetch::{download_snapshot, ensure_snapshot};
pub use crate::catalog::store::{EndpointRow, EndpointStore, Region, SnapshotStats};

// Matrix
pub use crate::matrix::MatrixController;
pub use crate::matrix::classify::{CellClass, classify_cell};
pub use crate::matrix::selection::{FALLBACK_REGIONS, Selection, SelectionStore};
pub use crate::matrix::table::{MatrixTable, build_matrix};
pub use crate::matrix::tooltip::TooltipCache;
