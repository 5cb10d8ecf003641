//! Hostsync - keeps DNS blocklists on disk in sync with their upstream sources.
//!
//! Hostsync periodically downloads blocklists published in hosts, Adblock-style
//! or plain-domain form, normalizes them into one of several output formats
//! (hosts, dnsmasq, RFC 1035 zone), applies a whitelist, and writes the result
//! to disk only when the content actually changed.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`config`]: Configuration loading and validation
//! - [`rules`]: Line parsing, validation, whitelisting and rendering
//! - [`fetch`]: Conditional HTTP retrieval
//! - [`cache`]: Per-source change detection
//! - [`updater`]: Fetch cycle orchestration
//! - [`metrics`]: Prometheus exporter
//! - [`error`]: Error types
//!
//! # Testing
//!
//! Retrieval sits behind the [`fetch::SourceFetcher`] trait and the rendering
//! core is pure, so everything can be tested without network access:
//!
//! ```rust
//! use hostsync::config::OutputFormat;
//! use hostsync::rules::{Whitelist, convert};
//!
//! let whitelist = Whitelist::new(["*.example.org"]);
//! let output = convert("||ads.example.com^", &whitelist, OutputFormat::Dnsmasq).unwrap();
//! assert_eq!(output, "address=/ads.example.com/0.0.0.0");
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod metrics;
pub mod rules;
pub mod updater;

pub use config::Config;
pub use error::{Error, Result};
