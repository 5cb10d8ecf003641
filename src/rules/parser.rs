//! Line classifier for mixed hosts / `AdBlock` rule syntax.
//!
//! Every input line is turned into a [`ParsedLine`] without looking at its
//! neighbours. The renderer decides per output format how each variant is
//! spelled (or dropped).

use std::borrow::Cow;

use super::domain::{is_ip_address, is_valid_domain};

/// Leading rule markers, most specific first.
///
/// A leading `*` is handled separately: it is only a marker when the target
/// format strips wildcards.
const RULE_MARKERS: &[&str] = &["||", "|", ".", "://", "^"];

/// Trailing rule markers, stripped once each in this order.
const TRAILING_MARKERS: &[&str] = &["^|", "^", "|", "."];

/// Whether a target format can express wildcard domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WildcardMode {
    /// Remove `*` and keep the rule only if a valid domain remains.
    Strip,
    /// Keep `*` as part of the domain.
    Keep,
}

/// Classification of a single blocklist line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine<'a> {
    /// Empty or whitespace-only line.
    Blank,
    /// `#` or `!` comment. Holds the original, untrimmed line.
    Comment(&'a str),
    /// `@@` exception rule.
    Exception,
    /// `-` removal directive.
    Removal,
    /// `/.../` regular expression rule.
    Regex,
    /// Wildcard rule that does not leave a valid domain once `*` is removed.
    Dropped,
    /// Rule carrying a domain.
    Domain {
        /// Extracted domain. For hosts lines with several aliases the aliases
        /// are joined with single spaces.
        name: String,
        /// `true` when `name` still contains a `*`.
        wildcard: bool,
    },
    /// Unrecognized syntax, emitted unchanged. Holds the original line.
    Passthrough(&'a str),
}

impl ParsedLine<'_> {
    /// Returns the extracted domain, if any.
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        match self {
            Self::Domain { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Classify a single line.
///
/// # Example
///
/// ```
/// use hostsync::rules::{ParsedLine, WildcardMode, parse_line};
///
/// let parsed = parse_line("||ads.example.com^$third-party", WildcardMode::Strip);
/// assert_eq!(parsed.domain(), Some("ads.example.com"));
///
/// assert_eq!(parse_line("@@||ok.example.com^", WildcardMode::Strip), ParsedLine::Exception);
/// ```
#[must_use]
pub fn parse_line(line: &str, mode: WildcardMode) -> ParsedLine<'_> {
    let trimmed = line.trim();

    if trimmed.is_empty() {
        return ParsedLine::Blank;
    }

    if trimmed.starts_with(['#', '!']) {
        return ParsedLine::Comment(line);
    }

    // Exceptions are dropped before any marker stripping so that `@@||x^`
    // can never be read as a block of `x`.
    if trimmed.starts_with("@@") {
        return ParsedLine::Exception;
    }

    if trimmed.starts_with('-') {
        return ParsedLine::Removal;
    }

    if is_regex_rule(trimmed) {
        return ParsedLine::Regex;
    }

    let leading_wildcard = mode == WildcardMode::Strip && trimmed.starts_with('*');
    let candidate = strip_rule_marker(trimmed, mode);
    let candidate = clean_candidate(&candidate);

    if candidate.is_empty() {
        return ParsedLine::Passthrough(line);
    }

    // A stripped leading `*` still has to leave a valid domain behind.
    let name = if mode == WildcardMode::Strip && (leading_wildcard || candidate.contains('*')) {
        let stripped = candidate.replace('*', "");
        if !is_valid_domain(&stripped) {
            return ParsedLine::Dropped;
        }
        stripped
    } else {
        candidate.to_string()
    };

    if name.starts_with('/') {
        return ParsedLine::Passthrough(line);
    }

    let wildcard = name.contains('*');
    ParsedLine::Domain { name, wildcard }
}

/// `/ads/` style rules.
fn is_regex_rule(trimmed: &str) -> bool {
    trimmed.starts_with('/') && trimmed.ends_with('/')
}

/// Remove one leading rule marker, or split off the address of a hosts line.
fn strip_rule_marker(trimmed: &str, mode: WildcardMode) -> Cow<'_, str> {
    for marker in RULE_MARKERS {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            return Cow::Borrowed(rest);
        }
    }

    if let Some(rest) = trimmed.strip_prefix('*') {
        return match mode {
            WildcardMode::Strip => Cow::Borrowed(rest),
            WildcardMode::Keep => Cow::Borrowed(trimmed),
        };
    }

    hosts_entry(trimmed).map_or(Cow::Borrowed(trimmed), Cow::Owned)
}

/// Extract the host aliases of an `<ip> <host> [host...]` line.
pub(super) fn hosts_entry(trimmed: &str) -> Option<String> {
    let mut fields = trimmed.split_whitespace();
    let address = fields.next()?;
    if !is_ip_address(address) {
        return None;
    }

    let hosts: Vec<&str> = fields.collect();
    if hosts.is_empty() {
        return None;
    }
    Some(hosts.join(" "))
}

/// Remove trailing markers, schemes, paths and rule options.
fn clean_candidate(candidate: &str) -> &str {
    let mut domain = candidate;
    for suffix in TRAILING_MARKERS {
        domain = domain.strip_suffix(suffix).unwrap_or(domain);
    }

    if let Some(url) = domain.split("://").nth(1) {
        domain = match url.find('/') {
            Some(idx) => &url[..idx],
            None => url.find('^').map_or(url, |idx| &url[..idx]),
        };
    }

    if let Some(idx) = domain.find('/') {
        domain = &domain[..idx];
    }
    if let Some(idx) = domain.find('^') {
        domain = &domain[..idx];
    }

    domain
}
