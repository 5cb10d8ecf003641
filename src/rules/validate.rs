//! Whole-payload sanity check.
//!
//! Rejects content that is obviously not a blocklist (an HTML error page
//! served with a 200, an unrelated text file) before any conversion runs.

use super::domain::is_ip_address;

/// Decide whether fetched content plausibly is a blocklist.
///
/// - Blank lines and `#` / `!` comments are skipped.
/// - `||domain^` lines count as entries.
/// - Lines with a single field are skipped.
/// - Any other line must start with an IPv4 or IPv6 address. A single line
///   that does not rejects the whole payload.
///
/// Returns `true` only if at least one entry was found.
///
/// # Example
///
/// ```
/// use hostsync::rules::validate;
///
/// assert!(validate("# list\n0.0.0.0 ads.example.com\n"));
/// assert!(validate("! list\n||ads.example.com^\n"));
/// assert!(!validate("<html>\n<body>Not Found</body>\n</html>"));
/// assert!(!validate(""));
/// ```
#[must_use]
pub fn validate(content: &str) -> bool {
    if content.is_empty() {
        return false;
    }

    let mut has_entry = false;

    for line in content.split('\n') {
        let line = line.trim();
        if line.is_empty() || line.starts_with(['#', '!']) {
            continue;
        }

        if is_adblock_rule(line) {
            has_entry = true;
            continue;
        }

        let mut fields = line.split_whitespace();
        let (Some(address), Some(_host)) = (fields.next(), fields.next()) else {
            continue;
        };

        if !is_ip_address(address) {
            tracing::debug!(line = %line, "first field is not an IP address");
            return false;
        }

        has_entry = true;
    }

    has_entry
}

/// `||domain^` blocking rule.
fn is_adblock_rule(line: &str) -> bool {
    line.starts_with("||") && line.ends_with('^')
}
