//! Snapshot retrieval: one HTTP download into a local cache file.
//!
//! Failures here are expected operating conditions (offline machine, origin
//! outage) and degrade to [`SNAPSHOT_LOAD_ERROR_CAPTION`] at the load
//! boundary; nothing in this module panics or retries.
//!
//! [`SNAPSHOT_LOAD_ERROR_CAPTION`]: crate::catalog::SNAPSHOT_LOAD_ERROR_CAPTION

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::core::config::SnapshotConfig;
use crate::core::errors::{EpmxError, Result};

/// Make sure a snapshot file exists at the configured cache path.
///
/// An existing cache file is reused as-is; pass `force` to re-download.
/// Returns the path to the usable snapshot.
pub fn ensure_snapshot(config: &SnapshotConfig, force: bool) -> Result<PathBuf> {
    if config.cache_file.exists() && !force {
        tracing::debug!(path = %config.cache_file.display(), "using cached snapshot");
        return Ok(config.cache_file.clone());
    }
    download_snapshot(config)
}

/// Download the snapshot from the configured URL into the cache path.
///
/// The write is atomic (temp file, then rename) so a failed download never
/// clobbers a previously usable cache file.
pub fn download_snapshot(config: &SnapshotConfig) -> Result<PathBuf> {
    tracing::info!(url = %config.url, "downloading endpoint snapshot");

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.fetch_timeout_secs))
        .build()
        .map_err(|e| EpmxError::SnapshotFetch {
            url: config.url.clone(),
            details: e.to_string(),
        })?;

    let response = client
        .get(&config.url)
        .send()
        .map_err(|e| EpmxError::SnapshotFetch {
            url: config.url.clone(),
            details: e.to_string(),
        })?;

    if !response.status().is_success() {
        return Err(EpmxError::SnapshotFetch {
            url: config.url.clone(),
            details: format!("HTTP status {}", response.status()),
        });
    }

    let body = response.bytes().map_err(|e| EpmxError::SnapshotFetch {
        url: config.url.clone(),
        details: e.to_string(),
    })?;

    write_atomic(&config.cache_file, &body)?;
    tracing::info!(
        path = %config.cache_file.display(),
        bytes = body.len(),
        "snapshot cached"
    );
    Ok(config.cache_file.clone())
}

/// Modification time of the cached snapshot, if one exists.
#[must_use]
pub fn snapshot_timestamp(path: &Path) -> Option<DateTime<Local>> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Local>::from(modified))
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| EpmxError::io(parent, source))?;
    }

    // Temp file in the same directory so the rename stays on one filesystem.
    let tmp_path = path.with_extension("sqlite.tmp");
    {
        let mut file =
            fs::File::create(&tmp_path).map_err(|source| EpmxError::io(&tmp_path, source))?;
        file.write_all(contents)
            .map_err(|source| EpmxError::io(&tmp_path, source))?;
        file.sync_all()
            .map_err(|source| EpmxError::io(&tmp_path, source))?;
    }
    fs::rename(&tmp_path, path).map_err(|source| EpmxError::io(path, source))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_cache_is_reused_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("endpoints.sqlite");
        fs::write(&cache, b"cached").unwrap();

        let config = SnapshotConfig {
            // Any fetch attempt against this URL would fail loudly.
            url: "http://127.0.0.1:1/unreachable".to_string(),
            cache_file: cache.clone(),
            fetch_timeout_secs: 1,
        };

        let path = ensure_snapshot(&config, false).unwrap();
        assert_eq!(path, cache);
        assert_eq!(fs::read(&cache).unwrap(), b"cached");
    }

    #[test]
    fn unreachable_origin_is_a_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = SnapshotConfig {
            url: "http://127.0.0.1:1/unreachable".to_string(),
            cache_file: dir.path().join("endpoints.sqlite"),
            fetch_timeout_secs: 1,
        };

        let err = ensure_snapshot(&config, false).unwrap_err();
        assert_eq!(err.code(), "EPMX-2001");
        assert!(err.is_snapshot_load_failure());
    }

    #[test]
    fn failed_download_keeps_previous_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("endpoints.sqlite");
        fs::write(&cache, b"previous").unwrap();

        let config = SnapshotConfig {
            url: "http://127.0.0.1:1/unreachable".to_string(),
            cache_file: cache.clone(),
            fetch_timeout_secs: 1,
        };

        assert!(ensure_snapshot(&config, true).is_err());
        assert_eq!(fs::read(&cache).unwrap(), b"previous");
    }

    #[test]
    fn write_atomic_creates_parents_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("nested").join("db.sqlite");
        write_atomic(&path, b"data").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"data");
        assert!(!path.with_extension("sqlite.tmp").exists());
    }

    #[test]
    fn snapshot_timestamp_for_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(snapshot_timestamp(&dir.path().join("absent")).is_none());
    }

    #[test]
    fn snapshot_timestamp_for_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.sqlite");
        fs::write(&path, b"x").unwrap();
        assert!(snapshot_timestamp(&path).is_some());
    }
}
