//! Configuration loading and validation.

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, Result, ValidationError};
use crate::rules::WildcardMode;

/// Main configuration for hostsync.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory the rendered files are written to.
    pub output_dir: PathBuf,

    /// Seconds between fetch cycles. `0` runs a single cycle and exits.
    #[serde(default)]
    pub interval_seconds: u64,

    /// Domains that are never blocked.
    /// Supports exact matches ("example.com") and wildcards ("*.example.com").
    #[serde(default)]
    pub whitelist: Vec<String>,

    /// HTTP client settings.
    #[serde(default)]
    pub http_client: HttpClientSettings,

    /// Blocklists to fetch, processed in order.
    #[serde(default)]
    pub sources: Vec<SourceConfig>,

    /// Prometheus metrics exporter.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// HTTP client settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpClientSettings {
    /// Timeout applied to every request.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for HttpClientSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
        }
    }
}

impl HttpClientSettings {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// A remote blocklist and the file it is rendered to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// URL to fetch (http or https).
    pub url: String,

    /// File name inside the output directory.
    pub filename: String,

    /// Target format. When absent (or `""` / `"none"`) the fetched content is
    /// written as-is, minus whitelisted hosts entries.
    #[serde(default, deserialize_with = "deserialize_output_format")]
    pub output_format: Option<OutputFormat>,
}

/// Output file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// `0.0.0.0 domain` lines.
    Hosts,
    /// `address=/domain/0.0.0.0` lines for dnsmasq. Keeps wildcards.
    Dnsmasq,
    /// RFC 1035 zone fragment with a fixed SOA record.
    Rfc1035,
}

impl OutputFormat {
    /// Whether rules rendered in this format keep their wildcards.
    #[must_use]
    pub const fn wildcard_mode(self) -> WildcardMode {
        match self {
            Self::Dnsmasq => WildcardMode::Keep,
            Self::Hosts | Self::Rfc1035 => WildcardMode::Strip,
        }
    }

    /// Name used in configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hosts => "hosts",
            Self::Dnsmasq => "dnsmasq",
            Self::Rfc1035 => "rfc1035",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "hosts" => Ok(Self::Hosts),
            "dnsmasq" => Ok(Self::Dnsmasq),
            "rfc1035" => Ok(Self::Rfc1035),
            other => Err(format!(
                "unknown output format {other:?} (expected hosts, dnsmasq or rfc1035)"
            )),
        }
    }
}

/// Prometheus metrics exporter settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Expose a `/metrics` endpoint.
    #[serde(default)]
    pub enabled: bool,

    /// Listen address of the exporter.
    #[serde(
        default = "default_metrics_listen",
        deserialize_with = "deserialize_socket_addr"
    )]
    pub listen: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen: default_metrics_listen(),
        }
    }
}

const fn default_timeout() -> u64 {
    30
}

fn default_metrics_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9090))
}

fn deserialize_socket_addr<'de, D>(deserializer: D) -> std::result::Result<SocketAddr, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}

fn deserialize_output_format<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<OutputFormat>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("" | "none") => Ok(None),
        Some(name) => name.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        if config.http_client.timeout_seconds == 0 {
            config.http_client.timeout_seconds = default_timeout();
        }
        config.validate().map_err(ConfigError::Validation)?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(ValidationError::EmptyOutputDir);
        }

        for pattern in &self.whitelist {
            let pattern = pattern.trim();
            if pattern.is_empty() {
                return Err(ValidationError::EmptyWhitelistPattern);
            }
            if pattern == "*." {
                return Err(ValidationError::InvalidWildcardPattern {
                    pattern: pattern.to_string(),
                });
            }
        }

        let mut filenames = HashSet::new();
        for source in &self.sources {
            if source.url.is_empty() {
                return Err(ValidationError::EmptySourceUrl {
                    filename: source.filename.clone(),
                });
            }
            if !source.url.starts_with("http://") && !source.url.starts_with("https://") {
                return Err(ValidationError::InvalidSourceUrl {
                    url: source.url.clone(),
                });
            }
            if source.filename.is_empty() {
                return Err(ValidationError::EmptySourceFilename {
                    url: source.url.clone(),
                });
            }
            if source.filename.contains(['/', '\\'])
                || matches!(source.filename.as_str(), "." | "..")
            {
                return Err(ValidationError::InvalidSourceFilename {
                    filename: source.filename.clone(),
                });
            }
            if !filenames.insert(source.filename.as_str()) {
                return Err(ValidationError::DuplicateSourceFilename {
                    filename: source.filename.clone(),
                });
            }
        }

        Ok(())
    }
}
