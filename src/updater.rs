//! Fetch cycle orchestration.
//!
//! Runs every configured source through fetch → validate → render → change
//! detection → write. Sources are processed one after another; a failing
//! source is logged and counted but never stops the cycle.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info, instrument};

use crate::cache::{ChangeCache, Revalidation, SkipReason, WriteDecision};
use crate::config::{Config, SourceConfig};
use crate::error::{Error, Result};
use crate::fetch::{FetchError, FetchResponse, HttpFetcher, SourceFetcher};
use crate::metrics::record_outcome;
use crate::rules::{Whitelist, render, validate};

/// Result of processing one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOutcome {
    /// The output file was (re)written.
    Written {
        /// Size of the written file.
        bytes: usize,
    },
    /// Rendered content matched the last written file.
    Unchanged,
    /// The server answered 304.
    NotModified,
}

impl SourceOutcome {
    const fn label(self) -> &'static str {
        match self {
            Self::Written { .. } => "written",
            Self::Unchanged => "unchanged",
            Self::NotModified => "not_modified",
        }
    }
}

/// Per-cycle counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub written: usize,
    pub unchanged: usize,
    pub not_modified: usize,
    pub failed: usize,
}

/// Keeps output files in sync with their upstream blocklists.
///
/// Owns the [`ChangeCache`], so repeated cycles on the same `Updater` skip
/// writes for content that has not changed.
///
/// # Example
///
/// ```no_run
/// use hostsync::config::Config;
/// use hostsync::updater::Updater;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::load("config.toml")?;
/// let mut updater = Updater::from_config(&config)?;
/// let summary = updater.run_cycle(&config.sources).await;
/// println!("{} files written", summary.written);
/// # Ok(())
/// # }
/// ```
pub struct Updater<F> {
    fetcher: F,
    whitelist: Whitelist,
    output_dir: PathBuf,
    cache: ChangeCache,
}

impl Updater<HttpFetcher> {
    /// Create an updater with an HTTP fetcher from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(config.http_client.timeout())?;
        Ok(Self::new(
            fetcher,
            Whitelist::new(&config.whitelist),
            config.output_dir.clone(),
        ))
    }
}

impl<F: SourceFetcher> Updater<F> {
    /// Create an updater with an empty change cache.
    pub fn new(fetcher: F, whitelist: Whitelist, output_dir: PathBuf) -> Self {
        Self {
            fetcher,
            whitelist,
            output_dir,
            cache: ChangeCache::new(),
        }
    }

    /// Change cache state, for inspection.
    pub const fn cache(&self) -> &ChangeCache {
        &self.cache
    }

    /// Directory output files are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Process every source once.
    ///
    /// Failures are logged per source and do not affect the others.
    pub async fn run_cycle(&mut self, sources: &[SourceConfig]) -> CycleSummary {
        debug!(sources = sources.len(), "starting fetch cycle");
        let mut summary = CycleSummary::default();

        for source in sources {
            match self.update_source(source).await {
                Ok(outcome) => {
                    record_outcome(outcome.label());
                    match outcome {
                        SourceOutcome::Written { .. } => summary.written += 1,
                        SourceOutcome::Unchanged => summary.unchanged += 1,
                        SourceOutcome::NotModified => summary.not_modified += 1,
                    }
                }
                Err(err) => {
                    record_outcome("failed");
                    summary.failed += 1;
                    error!(url = %source.url, filename = %source.filename, error = %err, "failed to update source");
                }
            }
        }

        debug!(?summary, "fetch cycle completed");
        summary
    }

    /// Fetch one source and apply the response.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply); fetch failures are returned as
    /// [`Error::Fetch`].
    #[instrument(skip(self, source), fields(url = %source.url))]
    pub async fn update_source(&mut self, source: &SourceConfig) -> Result<SourceOutcome> {
        debug!(filename = %source.filename, "fetching source");
        let etag = self.cache.etag(&source.url).map(str::to_string);
        let response = self.fetcher.fetch(&source.url, etag.as_deref()).await?;
        self.apply(source, response).await
    }

    /// Run a fetched response through validation, rendering and change
    /// detection, writing the output file when the content changed.
    ///
    /// The cache entry for the source is only updated after the file has been
    /// written.
    ///
    /// # Errors
    ///
    /// - [`Error::Fetch`] if the response status is neither 200 nor 304
    /// - [`Error::Validation`] if the body does not look like a blocklist
    /// - [`Error::Render`] if the content cannot be rendered
    /// - [`Error::Io`] if the output file cannot be written
    pub async fn apply(
        &mut self,
        source: &SourceConfig,
        response: FetchResponse,
    ) -> Result<SourceOutcome> {
        if response.not_modified {
            return Ok(skipped(source, SkipReason::NotModified));
        }

        if response.status != 200 {
            return Err(FetchError::HttpStatus {
                url: source.url.clone(),
                status: response.status,
            }
            .into());
        }

        let body = response.body.unwrap_or_default();
        debug!(bytes = body.len(), "read response body");
        let content = String::from_utf8_lossy(&body);

        if !validate(&content) {
            return Err(Error::Validation {
                url: source.url.clone(),
            });
        }

        if let Some(format) = source.output_format {
            debug!(%format, "converting content");
        }
        let output = render(&content, &self.whitelist, source.output_format)?;
        debug!(hash = %output.hash, "rendered content");

        match self
            .cache
            .decide(&source.url, Revalidation::Modified(&output))
        {
            WriteDecision::Skip(reason) => Ok(skipped(source, reason)),
            WriteDecision::Write => {
                let path = self.output_dir.join(&source.filename);
                tokio::fs::write(&path, output.content.as_bytes())
                    .await
                    .map_err(|err| Error::Io {
                        path: path.clone(),
                        source: err,
                    })?;

                self.cache
                    .record(&source.url, response.etag, output.hash);
                info!(filename = %source.filename, url = %source.url, "updated");
                Ok(SourceOutcome::Written {
                    bytes: output.content.len(),
                })
            }
        }
    }
}

fn skipped(source: &SourceConfig, reason: SkipReason) -> SourceOutcome {
    match reason {
        SkipReason::NotModified => {
            info!(filename = %source.filename, "no changes (not modified)");
            SourceOutcome::NotModified
        }
        SkipReason::Unchanged => {
            info!(filename = %source.filename, "no changes (content unchanged)");
            SourceOutcome::Unchanged
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::sync::Mutex;

    /// Mock fetcher returning queued responses and recording revalidation
    /// tokens.
    #[derive(Clone, Default)]
    struct MockFetcher {
        responses: Arc<Mutex<VecDeque<std::result::Result<FetchResponse, FetchError>>>>,
        etags_seen: Arc<Mutex<Vec<Option<String>>>>,
    }

    impl MockFetcher {
        async fn push(&self, response: std::result::Result<FetchResponse, FetchError>) {
            self.responses.lock().await.push_back(response);
        }
    }

    impl SourceFetcher for MockFetcher {
        async fn fetch(
            &self,
            url: &str,
            etag: Option<&str>,
        ) -> std::result::Result<FetchResponse, FetchError> {
            self.etags_seen.lock().await.push(etag.map(str::to_string));
            self.responses
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| {
                    Err(FetchError::HttpStatus {
                        url: url.to_string(),
                        status: 500,
                    })
                })
        }
    }

    fn source(filename: &str, format: Option<OutputFormat>) -> SourceConfig {
        SourceConfig {
            url: format!("https://lists.example/{filename}"),
            filename: filename.to_string(),
            output_format: format,
        }
    }

    fn updater(fetcher: MockFetcher, dir: &TempDir) -> Updater<MockFetcher> {
        Updater::new(fetcher, Whitelist::default(), dir.path().to_path_buf())
    }

    #[tokio::test]
    async fn should_write_rendered_output() {
        let dir = TempDir::new().unwrap();
        let mut updater = updater(MockFetcher::default(), &dir);
        let source = source("hosts.txt", Some(OutputFormat::Hosts));

        let outcome = updater
            .apply(&source, FetchResponse::ok("||ads.example.com^", None))
            .await
            .unwrap();

        assert_eq!(outcome, SourceOutcome::Written { bytes: 23 });
        let written = std::fs::read_to_string(dir.path().join("hosts.txt")).unwrap();
        assert_eq!(written, "0.0.0.0 ads.example.com");
        assert!(updater.cache().get(&source.url).is_some());
    }

    #[tokio::test]
    async fn should_skip_identical_content_with_new_etag() {
        let dir = TempDir::new().unwrap();
        let mut updater = updater(MockFetcher::default(), &dir);
        let source = source("hosts.txt", None);

        updater
            .apply(&source, FetchResponse::ok("0.0.0.0 a.com", Some("\"v1\"".into())))
            .await
            .unwrap();
        let outcome = updater
            .apply(&source, FetchResponse::ok("0.0.0.0 a.com", Some("\"v2\"".into())))
            .await
            .unwrap();

        assert_eq!(outcome, SourceOutcome::Unchanged);
        // The entry still reflects the response that was written.
        assert_eq!(updater.cache().etag(&source.url), Some("\"v1\""));
    }

    #[tokio::test]
    async fn should_leave_cache_untouched_when_not_modified() {
        let dir = TempDir::new().unwrap();
        let mut updater = updater(MockFetcher::default(), &dir);
        let source = source("hosts.txt", None);

        updater
            .apply(&source, FetchResponse::ok("0.0.0.0 a.com", Some("\"v1\"".into())))
            .await
            .unwrap();
        let before = updater.cache().get(&source.url).cloned();

        let outcome = updater
            .apply(&source, FetchResponse::not_modified(Some("\"v2\"".into())))
            .await
            .unwrap();

        assert_eq!(outcome, SourceOutcome::NotModified);
        assert_eq!(updater.cache().get(&source.url).cloned(), before);
    }

    #[tokio::test]
    async fn should_reject_invalid_payload_without_touching_state() {
        let dir = TempDir::new().unwrap();
        let mut updater = updater(MockFetcher::default(), &dir);
        let source = source("hosts.txt", Some(OutputFormat::Hosts));

        let result = updater
            .apply(&source, FetchResponse::ok("<html>\n<p>Not Found</p>\n</html>", None))
            .await;

        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(updater.cache().is_empty());
        assert!(!dir.path().join("hosts.txt").exists());
    }

    #[tokio::test]
    async fn should_reject_unexpected_status() {
        let dir = TempDir::new().unwrap();
        let mut updater = updater(MockFetcher::default(), &dir);
        let source = source("hosts.txt", None);
        let response = FetchResponse {
            status: 500,
            not_modified: false,
            etag: None,
            body: None,
        };

        let result = updater.apply(&source, response).await;

        assert!(matches!(
            result,
            Err(Error::Fetch(FetchError::HttpStatus { status: 500, .. }))
        ));
    }

    #[tokio::test]
    async fn should_not_record_when_write_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");
        let mut updater = Updater::new(MockFetcher::default(), Whitelist::default(), missing);
        let source = source("hosts.txt", None);

        let result = updater
            .apply(&source, FetchResponse::ok("0.0.0.0 a.com", None))
            .await;

        assert!(matches!(result, Err(Error::Io { .. })));
        assert!(updater.cache().is_empty());
    }

    #[tokio::test]
    async fn should_send_recorded_etag_on_next_fetch() {
        let dir = TempDir::new().unwrap();
        let fetcher = MockFetcher::default();
        fetcher
            .push(Ok(FetchResponse::ok("0.0.0.0 a.com", Some("\"v1\"".into()))))
            .await;
        fetcher.push(Ok(FetchResponse::not_modified(None))).await;
        let mut updater = updater(fetcher.clone(), &dir);
        let source = source("hosts.txt", None);

        updater.update_source(&source).await.unwrap();
        updater.update_source(&source).await.unwrap();

        let seen = fetcher.etags_seen.lock().await.clone();
        assert_eq!(seen, vec![None, Some("\"v1\"".to_string())]);
    }

    #[tokio::test]
    async fn should_continue_cycle_after_failure() {
        let dir = TempDir::new().unwrap();
        let fetcher = MockFetcher::default();
        fetcher
            .push(Err(FetchError::Timeout {
                url: "https://lists.example/a".into(),
            }))
            .await;
        fetcher
            .push(Ok(FetchResponse::ok("0.0.0.0 b.com", None)))
            .await;
        let mut updater = updater(fetcher, &dir);
        let sources = [source("a", None), source("b", None)];

        let summary = updater.run_cycle(&sources).await;

        assert_eq!(
            summary,
            CycleSummary {
                written: 1,
                unchanged: 0,
                not_modified: 0,
                failed: 1,
            }
        );
        assert!(!dir.path().join("a").exists());
        assert!(dir.path().join("b").exists());
    }

    #[tokio::test]
    async fn should_apply_whitelist() {
        let dir = TempDir::new().unwrap();
        let mut updater = Updater::new(
            MockFetcher::default(),
            Whitelist::new(["*.example.com"]),
            dir.path().to_path_buf(),
        );
        let source = source("zone.db", Some(OutputFormat::Dnsmasq));

        updater
            .apply(
                &source,
                FetchResponse::ok("||ads.example.com^\n||ads.example.net^", None),
            )
            .await
            .unwrap();

        let written = std::fs::read_to_string(dir.path().join("zone.db")).unwrap();
        assert_eq!(written, "address=/ads.example.net/0.0.0.0");
    }
}
