//! Error types for hostsync.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::fetch::FetchError;
use crate::rules::RenderError;

/// Main error type for hostsync operations.
///
/// Every variant except [`Error::Config`] and [`Error::Metrics`] is scoped to
/// a single source: the update cycle logs it and moves on to the next source.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("content from {url} is not a valid blocklist")]
    Validation { url: String },

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("metrics error: {0}")]
    Metrics(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[source] io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Validation errors for configuration values.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("output_dir cannot be empty")]
    EmptyOutputDir,

    #[error("whitelist pattern cannot be empty")]
    EmptyWhitelistPattern,

    #[error("invalid wildcard pattern: {pattern:?}")]
    InvalidWildcardPattern { pattern: String },

    #[error("source {filename:?} has empty URL")]
    EmptySourceUrl { filename: String },

    #[error("invalid source URL (must start with http:// or https://): {url:?}")]
    InvalidSourceUrl { url: String },

    #[error("source {url:?} has empty filename")]
    EmptySourceFilename { url: String },

    #[error("source filename must be a plain file name: {filename:?}")]
    InvalidSourceFilename { filename: String },

    #[error("duplicate source filename: {filename:?}")]
    DuplicateSourceFilename { filename: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;
