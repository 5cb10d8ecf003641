//! Output format rendering.
//!
//! Turns fetched blocklist content into one of the supported output formats,
//! applying the allow-list along the way.

use std::borrow::Cow;
use std::fmt::Write;

use sha2::{Digest, Sha256};

use super::parser::{ParsedLine, hosts_entry, parse_line};
use super::whitelist::Whitelist;
use crate::config::OutputFormat;

/// Address blocked domains are pointed at.
pub const SINKHOLE_ADDRESS: &str = "0.0.0.0";

/// Fixed SOA record that prefixes every RFC 1035 zone fragment.
pub const SOA_RECORD: &str = "@\tIN\tSOA\tlocalhost. root.localhost. (\n\
                              \t\t1\t\t; serial\n\
                              \t\t3600\t\t; refresh\n\
                              \t\t1800\t\t; retry\n\
                              \t\t604800\t\t; expire\n\
                              \t\t86400\t\t; minimum TTL\n\
                              )\n";

/// Error type for rendering.
///
/// None of the built-in formats can fail; the variant exists so a format
/// with representational limits can report them per source.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A line could not be expressed in the target format.
    #[error("line {line} cannot be rendered as {format}: {reason}")]
    Unrepresentable {
        /// Target format.
        format: OutputFormat,
        /// Line number (1-indexed).
        line: usize,
        /// Reason for the error.
        reason: String,
    },
}

/// Rendered content of one source together with its SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOutput {
    /// Final file content.
    pub content: String,
    /// Lowercase hex SHA-256 of `content`.
    pub hash: String,
}

impl RenderedOutput {
    /// Wrap content and compute its hash.
    #[must_use]
    pub fn new(content: String) -> Self {
        let hash = content_hash(&content);
        Self { content, hash }
    }
}

/// Lowercase hex SHA-256 digest of the content.
#[must_use]
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let digest = hasher.finalize();

    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

/// Render fetched content for a source.
///
/// Without a target format the content is kept as fetched, minus whitelisted
/// hosts entries (see [`filter_whitelist`]).
///
/// # Errors
///
/// Returns a [`RenderError`] if a line cannot be expressed in the target
/// format. The built-in formats never fail.
pub fn render(
    content: &str,
    whitelist: &Whitelist,
    format: Option<OutputFormat>,
) -> Result<RenderedOutput, RenderError> {
    let rendered = match format {
        Some(format) => convert(content, whitelist, format)?,
        None => filter_whitelist(content, whitelist),
    };
    Ok(RenderedOutput::new(rendered))
}

/// Convert mixed hosts / `AdBlock` content into the target format.
///
/// Line positions are preserved: blank input lines stay blank, and dropped
/// rules leave no line at all.
///
/// # Example
///
/// ```
/// use hostsync::config::OutputFormat;
/// use hostsync::rules::{Whitelist, convert};
///
/// let whitelist = Whitelist::default();
/// let hosts = convert("||doubleclick.net^", &whitelist, OutputFormat::Hosts).unwrap();
/// assert_eq!(hosts, "0.0.0.0 doubleclick.net");
///
/// let dnsmasq = convert("||doubleclick.net^", &whitelist, OutputFormat::Dnsmasq).unwrap();
/// assert_eq!(dnsmasq, "address=/doubleclick.net/0.0.0.0");
/// ```
///
/// # Errors
///
/// See [`render`].
pub fn convert(
    content: &str,
    whitelist: &Whitelist,
    format: OutputFormat,
) -> Result<String, RenderError> {
    let mode = format.wildcard_mode();
    let mut lines: Vec<Cow<'_, str>> = Vec::new();

    for line in content.split('\n') {
        if let Some(rendered) = render_line(parse_line(line, mode), whitelist, format) {
            lines.push(rendered);
        }
    }

    let body = lines.join("\n");
    Ok(match format {
        OutputFormat::Rfc1035 => format!("{SOA_RECORD}{body}"),
        OutputFormat::Hosts | OutputFormat::Dnsmasq => body,
    })
}

/// Render one classified line. `None` means the line is left out.
fn render_line<'a>(
    parsed: ParsedLine<'a>,
    whitelist: &Whitelist,
    format: OutputFormat,
) -> Option<Cow<'a, str>> {
    match parsed {
        ParsedLine::Blank => Some(Cow::Borrowed("")),
        ParsedLine::Comment(line) => Some(render_comment(line, format)),
        ParsedLine::Exception | ParsedLine::Removal | ParsedLine::Regex | ParsedLine::Dropped => {
            None
        }
        ParsedLine::Domain { name, .. } => {
            if whitelist.is_whitelisted(&name) {
                return None;
            }
            Some(Cow::Owned(render_domain(&name, format)))
        }
        ParsedLine::Passthrough(line) => Some(Cow::Borrowed(line)),
    }
}

fn render_comment(line: &str, format: OutputFormat) -> Cow<'_, str> {
    match format {
        OutputFormat::Hosts | OutputFormat::Dnsmasq => Cow::Borrowed(line),
        OutputFormat::Rfc1035 => {
            let marker = if line.trim_start().starts_with('!') {
                "!"
            } else {
                "#"
            };
            Cow::Owned(line.replacen(marker, ";", 1))
        }
    }
}

fn render_domain(domain: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Hosts => format!("{SINKHOLE_ADDRESS} {domain}"),
        OutputFormat::Dnsmasq => format!("address=/{domain}/{SINKHOLE_ADDRESS}"),
        OutputFormat::Rfc1035 => {
            let dot = if domain.ends_with('.') { "" } else { "." };
            format!("{domain}{dot}\tIN\tA\t{SINKHOLE_ADDRESS}")
        }
    }
}

/// Remove whitelisted hosts entries from raw content, leaving everything else
/// untouched.
///
/// Only `<ip> <host> [host...]` lines are considered. The aliases are matched
/// as one string, so a line is removed only when its alias list as a whole is
/// whitelisted.
#[must_use]
pub fn filter_whitelist(content: &str, whitelist: &Whitelist) -> String {
    if whitelist.is_empty() {
        return content.to_string();
    }

    let mut kept: Vec<&str> = Vec::new();

    for line in content.split('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(['#', '!']) {
            kept.push(line);
            continue;
        }

        if let Some(hosts) = hosts_entry(trimmed)
            && whitelist.is_whitelisted(&hosts)
        {
            continue;
        }

        kept.push(line);
    }

    kept.join("\n")
}
