//! Documentation-fetch tracking.
//!
//! The test harness appends one entry per fetched page to a tracking
//! JSON file while the agent runs; at the end the file is folded into
//! the `documentation_fetches` block of the execution record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::record::{DocFetches, FetchedPage};

/// On-disk tracking file: an append-only list of fetches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackingFile {
    #[serde(default)]
    pub fetches: Vec<FetchEntry>,
}

/// One tracked documentation fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchEntry {
    pub url: String,

    #[serde(default)]
    pub title: String,

    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_duration_ms: Option<u64>,
}

impl TrackingFile {
    /// Load a tracking file, starting empty when it does not exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write the tracking file with two-space-indented JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Append one fetch, timestamped now.
    pub fn add_fetch(&mut self, url: &str, title: Option<&str>, duration_ms: Option<u64>) {
        self.fetches.push(FetchEntry {
            url: url.to_string(),
            title: title.unwrap_or_default().to_string(),
            timestamp: Utc::now(),
            fetch_duration_ms: duration_ms,
        });
    }

    /// Fold the tracked fetches into the execution-record shape.
    pub fn summary(&self) -> DocFetches {
        let domains: BTreeSet<&str> = self
            .fetches
            .iter()
            .filter_map(|f| host_of(&f.url))
            .collect();

        DocFetches {
            total_count: self.fetches.len() as u32,
            pages: self
                .fetches
                .iter()
                .map(|f| FetchedPage {
                    url: f.url.clone(),
                    title: f.title.clone(),
                    timestamp: Some(f.timestamp),
                })
                .collect(),
            domains: domains.into_iter().map(str::to_string).collect(),
        }
    }

    /// Count of distinct URLs fetched.
    pub fn unique_page_count(&self) -> usize {
        self.fetches
            .iter()
            .map(|f| f.url.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }
}

/// Extract the hostname from a URL, without scheme, path, or port.
pub fn host_of(url: &str) -> Option<&str> {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let host = rest.split(['/', '?', '#']).next()?;
    let host = host.rsplit_once('@').map_or(host, |(_, h)| h);
    let host = host.split(':').next()?;
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}
