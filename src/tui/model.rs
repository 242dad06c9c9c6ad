//! Display-state model for the dashboard.
//!
//! All state lives in [`MatrixModel`]. Input and data events arrive as
//! [`MatrixMsg`] values; side-effects are represented as [`MatrixCmd`]
//! values returned from the update function.
//!
//! **Design invariant:** the model is deterministic and testable — no I/O
//! happens here.

use crossterm::event::KeyEvent;

use crate::catalog::store::{Region, SnapshotStats};
use crate::matrix::selection::Selection;
use crate::matrix::table::{MatrixTable, contains_ci};

/// One region picker entry: checkbox label plus the underlying name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerEntry {
    /// Region name, the selection key.
    pub region_name: String,
    /// Visible label, `name (description)`.
    pub label: String,
}

impl PickerEntry {
    /// Build the entry for a region.
    #[must_use]
    pub fn for_region(region: &Region) -> Self {
        Self {
            region_name: region.name.clone(),
            label: format!("{} ({})", region.name, region.description),
        }
    }
}

/// Loaded tooltip fragment shown in the detail pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipView {
    /// Service the fragment belongs to.
    pub service: String,
    /// Fragment body; empty means the fetch failed and the pane stays bare.
    pub body: Option<String>,
}

/// Events consumed by the update function.
#[derive(Debug, Clone)]
pub enum MatrixMsg {
    /// A terminal key event.
    Key(KeyEvent),
    /// The controller applied a selection change: the normalized selection
    /// and the freshly rebuilt table, replacing prior content wholesale.
    SelectionApplied {
        /// Normalized selected region names.
        selection: Vec<String>,
        /// The rebuilt table.
        table: MatrixTable,
    },
    /// A tooltip fragment fetch finished (possibly unsuccessfully).
    TooltipLoaded {
        /// Service the fetch was for.
        service: String,
        /// Fragment body, `None` on failure.
        body: Option<String>,
    },
}

/// Side-effects requested from the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixCmd {
    /// Nothing to do.
    None,
    /// Leave the event loop.
    Quit,
    /// Normalize + persist + rebuild for these checked region names.
    /// An empty list is the reset path and lands on the fallback selection.
    ApplySelection(Vec<String>),
    /// Fetch the tooltip fragment for a service.
    FetchTooltip(String),
}

/// Complete dashboard state.
#[derive(Debug, Clone)]
pub struct MatrixModel {
    /// Caption line; carries the load-failure string in degraded mode.
    pub caption: String,
    /// Snapshot-wide stats for the status line, when available.
    pub stats: Option<SnapshotStats>,
    /// True when the snapshot could not be loaded; the table stays empty.
    pub degraded: bool,
    /// Current table value. Replaced wholesale on every selection change.
    pub table: MatrixTable,

    /// Picker entries in dataset load order.
    pub picker_entries: Vec<PickerEntry>,
    /// Checkbox state parallel to `picker_entries`.
    pub picker_checked: Vec<bool>,
    /// Whether the picker overlay is open.
    pub picker_open: bool,
    /// Cursor position within the *visible* picker entries.
    pub picker_cursor: usize,
    /// Case-insensitive substring filter over picker entry labels.
    pub picker_filter: String,

    /// Substring filter over service row labels. Render-time only.
    pub service_filter: String,
    /// Whether keystrokes currently edit the service filter.
    pub filter_editing: bool,

    /// Cell cursor: index into the visible rows.
    pub cursor_row: usize,
    /// Cell cursor: column index.
    pub cursor_col: usize,

    /// Loaded tooltip fragment for the detail pane.
    pub tooltip: Option<TooltipView>,
}

impl MatrixModel {
    /// Model for a successfully loaded snapshot.
    #[must_use]
    pub fn new(
        caption: String,
        stats: Option<SnapshotStats>,
        all_regions: &[Region],
        selection: &Selection,
        table: MatrixTable,
    ) -> Self {
        let picker_entries: Vec<PickerEntry> =
            all_regions.iter().map(PickerEntry::for_region).collect();
        let picker_checked = picker_entries
            .iter()
            .map(|e| selection.contains(&e.region_name))
            .collect();

        Self {
            caption,
            stats,
            degraded: false,
            table,
            picker_entries,
            picker_checked,
            picker_open: false,
            picker_cursor: 0,
            picker_filter: String::new(),
            service_filter: String::new(),
            filter_editing: false,
            cursor_row: 0,
            cursor_col: 0,
            tooltip: None,
        }
    }

    /// Model for a failed snapshot load: no table, caption carries the
    /// failure string, every handler stays inert except quit.
    #[must_use]
    pub fn degraded(caption: String) -> Self {
        Self {
            caption,
            stats: None,
            degraded: true,
            table: MatrixTable::default(),
            picker_entries: Vec::new(),
            picker_checked: Vec::new(),
            picker_open: false,
            picker_cursor: 0,
            picker_filter: String::new(),
            service_filter: String::new(),
            filter_editing: false,
            cursor_row: 0,
            cursor_col: 0,
            tooltip: None,
        }
    }

    /// Indices of picker entries whose label matches the picker filter.
    /// Hidden entries keep their checkbox state.
    #[must_use]
    pub fn visible_picker_indices(&self) -> Vec<usize> {
        self.picker_entries
            .iter()
            .enumerate()
            .filter(|(_, e)| contains_ci(&e.label, &self.picker_filter))
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of table rows whose service label matches the service filter.
    #[must_use]
    pub fn visible_row_indices(&self) -> Vec<usize> {
        self.table
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| contains_ci(&row.service, &self.service_filter))
            .map(|(i, _)| i)
            .collect()
    }

    /// Region names of all currently checked picker entries, in entry order.
    #[must_use]
    pub fn checked_names(&self) -> Vec<String> {
        self.picker_entries
            .iter()
            .zip(&self.picker_checked)
            .filter(|(_, checked)| **checked)
            .map(|(e, _)| e.region_name.clone())
            .collect()
    }

    /// Re-derive checkbox state from an applied (normalized) selection.
    pub fn sync_picker(&mut self, selected: &[String]) {
        for (entry, checked) in self.picker_entries.iter().zip(&mut self.picker_checked) {
            *checked = selected.contains(&entry.region_name);
        }
    }

    /// Clamp cursors into the current table/picker dimensions.
    pub fn clamp_cursors(&mut self) {
        let visible_rows = self.visible_row_indices().len();
        self.cursor_row = self.cursor_row.min(visible_rows.saturating_sub(1));
        self.cursor_col = self
            .cursor_col
            .min(self.table.column_count().saturating_sub(1));
        let visible_entries = self.visible_picker_indices().len();
        self.picker_cursor = self.picker_cursor.min(visible_entries.saturating_sub(1));
    }

    /// Service name under the cell cursor, if any.
    #[must_use]
    pub fn cursor_service(&self) -> Option<&str> {
        let visible = self.visible_row_indices();
        let row_index = *visible.get(self.cursor_row)?;
        self.table.rows.get(row_index).map(|r| r.service.as_str())
    }
}
