//! Per-source change detection.
//!
//! Remembers, for every source URL, the last `ETag` and the SHA-256 of the
//! last written output. A write is skipped when the server reports the
//! content as not modified, or when the freshly rendered output hashes to the
//! value already on disk (servers that ignore conditional requests or send
//! weak validators).
//!
//! State lives for the lifetime of the process only.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::rules::RenderedOutput;

/// What the server said about a source on this fetch.
#[derive(Debug, Clone, Copy)]
pub enum Revalidation<'a> {
    /// 304: the cached copy is current and no body was sent.
    NotModified,
    /// Full content was returned and rendered.
    Modified(&'a RenderedOutput),
}

/// Why a write was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The server answered 304.
    NotModified,
    /// The rendered content hashes to the last written value.
    Unchanged,
}

/// Outcome of [`ChangeCache::decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteDecision {
    /// Leave the output file alone.
    Skip(SkipReason),
    /// Write the rendered content, then [`ChangeCache::record`] it.
    Write,
}

/// Last known state of a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// `ETag` of the last written response, if the server sent one.
    pub etag: Option<String>,
    /// SHA-256 (lowercase hex) of the last written output.
    pub content_hash: String,
    /// When the entry was last written.
    pub last_check: DateTime<Utc>,
}

/// In-memory change cache keyed by source URL.
///
/// Entries are created on the first successful write for a URL, replaced on
/// every later write, and never removed.
#[derive(Debug, Default)]
pub struct ChangeCache {
    entries: HashMap<String, CacheEntry>,
}

impl ChangeCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `ETag` to send as `If-None-Match` for a URL.
    ///
    /// `None` for unknown URLs and for sources whose server sent no `ETag`,
    /// so the first fetch is always unconditional.
    #[must_use]
    pub fn etag(&self, url: &str) -> Option<&str> {
        self.entries
            .get(url)
            .and_then(|entry| entry.etag.as_deref())
            .filter(|etag| !etag.is_empty())
    }

    /// Returns the entry for a URL.
    #[must_use]
    pub fn get(&self, url: &str) -> Option<&CacheEntry> {
        self.entries.get(url)
    }

    /// Decide whether fetched content should be written.
    ///
    /// # Example
    ///
    /// ```
    /// use hostsync::cache::{ChangeCache, Revalidation, SkipReason, WriteDecision};
    /// use hostsync::rules::RenderedOutput;
    ///
    /// let mut cache = ChangeCache::new();
    /// let url = "https://example.org/hosts";
    /// let output = RenderedOutput::new("0.0.0.0 ads.example.com".to_string());
    ///
    /// assert_eq!(cache.decide(url, Revalidation::Modified(&output)), WriteDecision::Write);
    /// cache.record(url, None, output.hash.clone());
    ///
    /// assert_eq!(
    ///     cache.decide(url, Revalidation::Modified(&output)),
    ///     WriteDecision::Skip(SkipReason::Unchanged)
    /// );
    /// ```
    #[must_use]
    pub fn decide(&self, url: &str, revalidation: Revalidation<'_>) -> WriteDecision {
        let output = match revalidation {
            Revalidation::NotModified => return WriteDecision::Skip(SkipReason::NotModified),
            Revalidation::Modified(output) => output,
        };

        match self.entries.get(url) {
            Some(entry) if entry.content_hash == output.hash => {
                WriteDecision::Skip(SkipReason::Unchanged)
            }
            _ => WriteDecision::Write,
        }
    }

    /// Record a successful write.
    ///
    /// Must only be called once the output file has been written, so that a
    /// failed write is retried on the next cycle.
    pub fn record(&mut self, url: &str, etag: Option<String>, content_hash: String) {
        let entry = CacheEntry {
            etag: etag.filter(|etag| !etag.is_empty()),
            content_hash,
            last_check: Utc::now(),
        };
        tracing::debug!(
            url = %url,
            etag = ?entry.etag,
            last_check = %entry.last_check.to_rfc3339(),
            "recorded source state"
        );
        self.entries.insert(url.to_string(), entry);
    }

    /// Returns the number of tracked sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no source has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
