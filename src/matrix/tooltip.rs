//! Per-service tooltip fragments with a one-entry cache.
//!
//! Fragments are static HTML snippets served next to the snapshot, named
//! deterministically from the service name. Only the most recently fetched
//! URL is cached; a fetch failure is logged and yields nothing — the detail
//! pane simply stays empty.

use std::time::Duration;

use crate::core::config::TooltipConfig;
use crate::core::errors::{EpmxError, Result};

/// One-entry fragment cache keyed by the most recently fetched URL.
pub struct TooltipCache {
    config: TooltipConfig,
    last: Option<(String, String)>,
}

impl TooltipCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new(config: TooltipConfig) -> Self {
        Self { config, last: None }
    }

    /// Fragment URL for a service.
    #[must_use]
    pub fn fragment_url(&self, service: &str) -> String {
        format!("{}{service}.html", self.config.base_url)
    }

    /// Fetch the fragment for `service` over HTTP, going through the cache.
    ///
    /// Returns `None` when fragments are disabled or the fetch fails.
    pub fn fetch(&mut self, service: &str) -> Option<String> {
        if !self.config.enabled {
            return None;
        }
        let timeout = Duration::from_secs(self.config.fetch_timeout_secs);
        let url = self.fragment_url(service);
        self.fetch_with(&url, |url| http_get(url, timeout))
    }

    /// Cache-aware fetch with an injectable transport, for tests and for
    /// callers that already hold a client.
    pub fn fetch_with<F>(&mut self, url: &str, fetch: F) -> Option<String>
    where
        F: FnOnce(&str) -> Result<String>,
    {
        if let Some((cached_url, body)) = &self.last {
            if cached_url == url {
                return Some(body.clone());
            }
        }

        match fetch(url) {
            Ok(body) => {
                self.last = Some((url.to_string(), body.clone()));
                Some(body)
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "tooltip fragment fetch failed");
                None
            }
        }
    }

    /// URL of the cached entry, if any.
    #[must_use]
    pub fn cached_url(&self) -> Option<&str> {
        self.last.as_ref().map(|(url, _)| url.as_str())
    }
}

fn http_get(url: &str, timeout: Duration) -> Result<String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| EpmxError::TooltipFetch {
            url: url.to_string(),
            details: e.to_string(),
        })?;

    let response = client.get(url).send().map_err(|e| EpmxError::TooltipFetch {
        url: url.to_string(),
        details: e.to_string(),
    })?;

    if !response.status().is_success() {
        return Err(EpmxError::TooltipFetch {
            url: url.to_string(),
            details: format!("HTTP status {}", response.status()),
        });
    }

    response.text().map_err(|e| EpmxError::TooltipFetch {
        url: url.to_string(),
        details: e.to_string(),
    })
}
