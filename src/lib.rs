#![forbid(unsafe_code)]

//! endpoint_matrix (epmx) — AWS service endpoints by region and IPv6 support,
//! rendered as a service × region matrix in the terminal.
//!
//! The pipeline: download a SQLite snapshot of the `region` and `endpoint`
//! relations, restore the persisted region selection (or fall back to a fixed
//! default set), and build the full matrix by querying the snapshot per cell.
//! Every selection change is normalized, persisted, and followed by a complete
//! table rebuild — the table is never patched in place.
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use endpoint_matrix::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use endpoint_matrix::catalog::store::EndpointStore;
//! use endpoint_matrix::matrix::selection::SelectionStore;
//! ```

pub mod prelude;

pub mod catalog;
pub mod core;
pub mod matrix;
#[cfg(feature = "tui")]
pub mod tui;
