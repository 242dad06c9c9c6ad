//! The region-selection table controller and its parts.
//!
//! [`MatrixController`] owns every piece of mutable state — the selection,
//! the open snapshot, the current table value — as explicit fields of one
//! instance constructed at startup. Handlers receive it by reference; there
//! are no ambient globals.

pub mod classify;
pub mod selection;
pub mod table;
pub mod tooltip;

use crate::catalog::store::{EndpointStore, Region, SnapshotStats};
use crate::core::errors::Result;
use crate::matrix::selection::{Selection, SelectionStore};
use crate::matrix::table::{MatrixTable, build_matrix};

/// Owns the selected region set, persists it, and rebuilds the rendered
/// service × region matrix whenever the selection changes.
pub struct MatrixController {
    store: EndpointStore,
    selection_store: SelectionStore,
    selection: Selection,
    all_regions: Vec<Region>,
    services: Vec<String>,
    table: MatrixTable,
}

impl MatrixController {
    /// Load reference data, restore the persisted selection (normalizing
    /// malformed stored state), and build the initial table.
    pub fn new(store: EndpointStore, selection_store: SelectionStore) -> Result<Self> {
        let all_regions = store.regions()?;
        let services = store.services()?;
        let selection = selection_store.restore();

        let mut controller = Self {
            store,
            selection_store,
            selection,
            all_regions,
            services,
            table: MatrixTable::default(),
        };
        controller.rebuild();
        Ok(controller)
    }

    /// Current selection.
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// All known regions in dataset load order.
    #[must_use]
    pub fn all_regions(&self) -> &[Region] {
        &self.all_regions
    }

    /// All known service names, ordered.
    #[must_use]
    pub fn services(&self) -> &[String] {
        &self.services
    }

    /// The current table value.
    #[must_use]
    pub fn table(&self) -> &MatrixTable {
        &self.table
    }

    /// Replace the selection wholesale: normalize, persist, rebuild.
    ///
    /// The persistence write completes before the rebuild reads the new
    /// selection; callers re-render from [`Self::table`] afterwards.
    pub fn set_selection<I, S>(&mut self, names: I) -> &Selection
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection = self.selection_store.set(names);
        self.rebuild();
        &self.selection
    }

    /// Force the fallback selection and rebuild.
    pub fn reset_selection(&mut self) -> &Selection {
        self.selection = self.selection_store.reset();
        self.rebuild();
        &self.selection
    }

    /// Rebuild the table value from scratch for the current selection.
    pub fn rebuild(&mut self) {
        let store = &self.store;
        let table = build_matrix(
            &self.all_regions,
            &self.services,
            &self.selection,
            |service, region| match store.endpoint(service, region) {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!(service, region, error = %e, "endpoint lookup failed");
                    None
                }
            },
        );
        self.table = table;
    }

    /// Snapshot-wide IPv6 adoption stats.
    pub fn stats(&self) -> Result<SnapshotStats> {
        self.store.stats()
    }
}
