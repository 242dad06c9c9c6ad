//! Pure table description builder.
//!
//! [`MatrixTable`] is a lightweight structural value: column specs in
//! lexicographic region order, one row per service, each cell carrying its
//! class, text, and detail lines. Renderers (the dashboard, the text
//! printer) materialize it and replace their output wholesale on every
//! rebuild, so stale rows or columns cannot survive a shrinking selection.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::catalog::store::{EndpointRow, Region};
use crate::matrix::classify::{CellClass, classify_cell};
use crate::matrix::selection::Selection;

/// One table column: a selected region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    /// Region name, e.g. `eu-central-1`.
    pub region_name: String,
    /// Short human label, e.g. `Frankfurt`.
    pub short_label: String,
}

/// One matrix cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellSpec {
    /// IPv6-support class.
    pub class: CellClass,
    /// Cell text (the class label).
    pub text: &'static str,
    /// Hostname detail lines, e.g.
    /// `default s3.eu-central-1.amazonaws.com [ipv4]`.
    pub detail: Vec<String>,
}

/// One body row: a service and its cell per selected region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowSpec {
    /// Service name label.
    pub service: String,
    /// Cells in column order.
    pub cells: Vec<CellSpec>,
}

/// The full table description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatrixTable {
    /// Columns, lexicographic by region name.
    pub columns: Vec<ColumnSpec>,
    /// One row per service, ordered by service name.
    pub rows: Vec<RowSpec>,
}

impl MatrixTable {
    /// Number of data columns (excluding the leading service column).
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

static TRAILING_PARENS: LazyLock<Regex> = LazyLock::new(|| {
    // Unwrap is fine for a literal pattern.
    Regex::new(r".*\((.*)\)").unwrap()
});

/// Text of the trailing parenthesized segment of a region description, or
/// the full description when there is none.
///
/// `"Europe (Frankfurt)"` → `"Frankfurt"`; `"euc1"` → `"euc1"`.
#[must_use]
pub fn short_label(description: &str) -> String {
    TRAILING_PARENS
        .captures(description)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| description.to_string(), |m| m.as_str().to_string())
}

/// Case-insensitive substring match used by the service and picker filters.
#[must_use]
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Build the full table for `selection`.
///
/// `all_regions` is the dataset's region list (already ordered by name);
/// columns are those regions that are in the selection, which keeps column
/// order lexicographic regardless of how the selection was constructed.
/// Selected names unknown to the dataset stay persisted but grow no column.
/// `endpoint_for` resolves one (service, region) pair; the builder calls it
/// once per cell.
pub fn build_matrix<F>(
    all_regions: &[Region],
    services: &[String],
    selection: &Selection,
    mut endpoint_for: F,
) -> MatrixTable
where
    F: FnMut(&str, &str) -> Option<EndpointRow>,
{
    let columns: Vec<ColumnSpec> = all_regions
        .iter()
        .filter(|region| selection.contains(&region.name))
        .map(|region| ColumnSpec {
            region_name: region.name.clone(),
            short_label: short_label(&region.description),
        })
        .collect();

    let rows: Vec<RowSpec> = services
        .iter()
        .map(|service| {
            let cells = columns
                .iter()
                .map(|column| build_cell(endpoint_for(service, &column.region_name).as_ref()))
                .collect();
            RowSpec {
                service: service.clone(),
                cells,
            }
        })
        .collect();

    MatrixTable { columns, rows }
}

fn build_cell(endpoint: Option<&EndpointRow>) -> CellSpec {
    let class = classify_cell(endpoint);
    let detail = endpoint.map_or_else(Vec::new, |ep| {
        let mut lines = Vec::new();
        if let Some(hostname) = &ep.default_hostname {
            lines.push(format!(
                "default {hostname} {}",
                protocols(ep.default_has_ipv4, ep.default_has_ipv6)
            ));
        }
        if let Some(hostname) = &ep.dualstack_hostname {
            lines.push(format!(
                "dualstack {hostname} {}",
                protocols(ep.dualstack_has_ipv4, ep.dualstack_has_ipv6)
            ));
        }
        lines
    });

    CellSpec {
        class,
        text: class.label(),
        detail,
    }
}

fn protocols(has_ipv4: bool, has_ipv6: bool) -> String {
    let mut names = Vec::new();
    if has_ipv4 {
        names.push("ipv4");
    }
    if has_ipv6 {
        names.push("ipv6");
    }
    format!("[{}]", names.join(", "))
}
