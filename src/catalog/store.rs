//! Read-only query access to the endpoint snapshot.
//!
//! The snapshot carries two relations: `region` (name, partition,
//! description) and `endpoint` (one row per service/region pair, with
//! default and dualstack hostnames and their IPv4/IPv6 flags). Both are
//! reference data; the store never writes.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use serde::Serialize;

use crate::core::errors::{EpmxError, Result};

/// A deployment locality: name, partition, and human-readable description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    pub name: String,
    pub partition: String,
    pub description: String,
}

/// Network-reachability record for one (service, region) pair.
///
/// The `default` endpoint is always usable; the `dualstack` endpoint requires
/// explicit opt-in configuration on the client side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EndpointRow {
    pub service_name: String,
    pub region_name: String,
    pub default_hostname: Option<String>,
    pub default_has_ipv4: bool,
    pub default_has_ipv6: bool,
    pub dualstack_hostname: Option<String>,
    pub dualstack_has_ipv4: bool,
    pub dualstack_has_ipv6: bool,
}

/// Snapshot-wide IPv6 adoption counts over endpoints with a default hostname.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotStats {
    pub total: u64,
    pub ipv6_default: u64,
    pub ipv6_dualstack: u64,
    pub ipv4_only: u64,
}

impl SnapshotStats {
    fn pct(count: u64, total: u64) -> u64 {
        if total == 0 { 0 } else { count * 100 / total }
    }

    /// Percentage of endpoints that are IPv6 by default.
    #[must_use]
    pub fn ipv6_default_pct(&self) -> u64 {
        Self::pct(self.ipv6_default, self.total)
    }

    /// Percentage of endpoints that are IPv6 only via the dualstack opt-in.
    #[must_use]
    pub fn ipv6_dualstack_pct(&self) -> u64 {
        Self::pct(self.ipv6_dualstack, self.total)
    }

    /// Percentage of endpoints with no IPv6 support at all.
    #[must_use]
    pub fn ipv4_only_pct(&self) -> u64 {
        Self::pct(self.ipv4_only, self.total)
    }
}

/// Read-only handle over the snapshot database.
#[derive(Debug)]
pub struct EndpointStore {
    conn: Connection,
    path: PathBuf,
}

impl EndpointStore {
    /// Open the snapshot at `path` read-only.
    ///
    /// Open failures are load-boundary errors: callers render them as the
    /// snapshot-unavailable caption rather than propagating further.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| EpmxError::SnapshotOpen {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;

        // A snapshot without the two expected relations is as unusable as a
        // missing file; surface it at the same boundary.
        let probe: std::result::Result<u32, rusqlite::Error> = conn.query_row(
            "SELECT count(*) FROM sqlite_master
             WHERE type = 'table' AND name IN ('region', 'endpoint')",
            [],
            |row| row.get(0),
        );
        match probe {
            Ok(2) => {}
            Ok(n) => {
                return Err(EpmxError::SnapshotOpen {
                    path: path.to_path_buf(),
                    details: format!("expected region and endpoint tables, found {n}"),
                });
            }
            Err(e) => {
                return Err(EpmxError::SnapshotOpen {
                    path: path.to_path_buf(),
                    details: e.to_string(),
                });
            }
        }

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Path to the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All known regions, ordered by name.
    pub fn regions(&self) -> Result<Vec<Region>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT region_name, partition_name, description
             FROM region
             ORDER BY region_name",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Region {
                    name: row.get(0)?,
                    partition: row.get(1)?,
                    description: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Distinct service names, ordered by name.
    pub fn services(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT DISTINCT service_name
             FROM endpoint
             ORDER BY service_name",
        )?;
        let rows = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// The endpoint row for one (service, region) pair, if any.
    pub fn endpoint(&self, service: &str, region: &str) -> Result<Option<EndpointRow>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT service_name, region_name,
                    endpoint_default_hostname,
                    endpoint_default_has_ipv4, endpoint_default_has_ipv6,
                    endpoint_dualstack_hostname,
                    endpoint_dualstack_has_ipv4, endpoint_dualstack_has_ipv6
             FROM endpoint
             WHERE service_name = ?1 AND region_name = ?2",
        )?;
        let row = stmt
            .query_row(params![service, region], |row| {
                Ok(EndpointRow {
                    service_name: row.get(0)?,
                    region_name: row.get(1)?,
                    default_hostname: row.get(2)?,
                    default_has_ipv4: row.get(3)?,
                    default_has_ipv6: row.get(4)?,
                    dualstack_hostname: row.get(5)?,
                    dualstack_has_ipv4: row.get(6)?,
                    dualstack_has_ipv6: row.get(7)?,
                })
            })
            .optional()?;
        Ok(row)
    }

    /// IPv6 adoption counts over all endpoints with a default hostname.
    pub fn stats(&self) -> Result<SnapshotStats> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT
                COUNT(*),
                SUM(CASE WHEN endpoint_default_has_ipv6 THEN 1 ELSE 0 END),
                SUM(CASE WHEN endpoint_dualstack_has_ipv6
                          AND NOT endpoint_default_has_ipv6 THEN 1 ELSE 0 END),
                SUM(CASE WHEN NOT endpoint_default_has_ipv6
                          AND NOT endpoint_dualstack_has_ipv6 THEN 1 ELSE 0 END)
             FROM endpoint
             WHERE endpoint_default_hostname IS NOT NULL",
        )?;
        let stats = stmt.query_row([], |row| {
            Ok(SnapshotStats {
                total: row.get::<_, Option<u64>>(0)?.unwrap_or(0),
                ipv6_default: row.get::<_, Option<u64>>(1)?.unwrap_or(0),
                ipv6_dualstack: row.get::<_, Option<u64>>(2)?.unwrap_or(0),
                ipv4_only: row.get::<_, Option<u64>>(3)?.unwrap_or(0),
            })
        })?;
        Ok(stats)
    }
}
