//! Result normalization
//!
//! Converts raw CSE payloads into simplified title/link/snippet records,
//! keeping only entries with a well-formed http(s) link.

use crate::cse::SearchResponse;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

/// Sentinel for a missing title or snippet
pub const MISSING_FIELD: &str = "N/A";

/// A normalized search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

impl ResultRecord {
    /// Hostname of the link, if it parses as a URL
    pub fn hostname(&self) -> Option<String> {
        Url::parse(&self.link)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
    }
}

fn has_valid_link(link: &str) -> bool {
    link.starts_with("http://") || link.starts_with("https://")
}

/// Extract title/link/snippet records from a CSE payload.
///
/// Entries without an http(s)-prefixed link are skipped with a warning
/// naming the offending title. An absent payload, or one without items,
/// yields an empty list. Relative order of kept entries is preserved.
pub fn normalize(payload: Option<&SearchResponse>) -> Vec<ResultRecord> {
    let items = match payload.and_then(|p| p.items.as_ref()) {
        Some(items) => items,
        None => {
            debug!("No search result items found in CSE API response");
            return Vec::new();
        }
    };

    let mut records = Vec::new();
    for item in items {
        match item.link.as_deref() {
            Some(link) if has_valid_link(link) => {
                records.push(ResultRecord {
                    title: item
                        .title
                        .clone()
                        .unwrap_or_else(|| MISSING_FIELD.to_string()),
                    link: link.to_string(),
                    snippet: item
                        .snippet
                        .clone()
                        .unwrap_or_else(|| MISSING_FIELD.to_string()),
                });
            }
            _ => {
                warn!(
                    "Skipping result with invalid/missing link: Title '{}'",
                    item.title.as_deref().unwrap_or(MISSING_FIELD)
                );
            }
        }
    }
    records
}
