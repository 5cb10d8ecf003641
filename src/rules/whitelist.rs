//! Operator allow-list.
//!
//! Supports exact matches (`example.com`) and wildcard suffixes
//! (`*.example.com`). Patterns are pre-processed at construction time so a
//! lookup never allocates.

use std::collections::HashSet;

/// A compiled allow-list.
///
/// Unlike a block pattern, a wildcard entry also covers its base domain:
/// `*.example.com` allows both `example.com` and `ads.example.com`.
/// Matching is case-sensitive, mirroring how list entries are stored.
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    /// Exact domains.
    exact: HashSet<String>,
    /// Wildcard suffixes with their leading dot (`.example.com`).
    suffixes: Vec<String>,
}

impl Whitelist {
    /// Build an allow-list from patterns.
    ///
    /// Blank patterns and a bare `*.` are ignored. Surrounding whitespace is
    /// trimmed.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut exact = HashSet::new();
        let mut suffixes = Vec::new();

        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if pattern.is_empty() {
                continue;
            }

            if let Some(suffix) = pattern.strip_prefix("*.") {
                if !suffix.is_empty() {
                    suffixes.push(format!(".{suffix}"));
                }
            } else {
                exact.insert(pattern.to_string());
            }
        }

        Self { exact, suffixes }
    }

    /// Check whether a domain is allowed.
    ///
    /// One trailing `.` on the domain is ignored.
    ///
    /// # Example
    ///
    /// ```
    /// use hostsync::rules::Whitelist;
    ///
    /// let whitelist = Whitelist::new(["*.example.com"]);
    /// assert!(whitelist.is_whitelisted("ads.example.com"));
    /// assert!(whitelist.is_whitelisted("example.com"));
    /// assert!(!whitelist.is_whitelisted("notexample.com"));
    /// ```
    #[must_use]
    pub fn is_whitelisted(&self, domain: &str) -> bool {
        let domain = domain.strip_suffix('.').unwrap_or(domain);

        if self.exact.contains(domain) {
            return true;
        }

        self.suffixes
            .iter()
            .any(|suffix| domain.ends_with(suffix.as_str()) || domain == &suffix[1..])
    }

    /// Check if the allow-list has no patterns.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.suffixes.is_empty()
    }

    /// Returns the number of patterns.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.exact.len() + self.suffixes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_match_wildcard_subdomains() {
        let whitelist = Whitelist::new(["*.example.com"]);

        assert!(whitelist.is_whitelisted("ads.example.com"));
        assert!(whitelist.is_whitelisted("a.b.example.com"));
    }

    #[test]
    fn should_match_wildcard_base_domain() {
        let whitelist = Whitelist::new(["*.example.com"]);

        assert!(whitelist.is_whitelisted("example.com"));
    }

    #[test]
    fn should_not_match_unrelated_suffix() {
        let whitelist = Whitelist::new(["*.example.com"]);

        assert!(!whitelist.is_whitelisted("notexample.com"));
        assert!(!whitelist.is_whitelisted("example.com.evil.net"));
    }

    #[test]
    fn should_match_exact_domains_only() {
        let whitelist = Whitelist::new(["ads.example.com"]);

        assert!(whitelist.is_whitelisted("ads.example.com"));
        assert!(!whitelist.is_whitelisted("sub.ads.example.com"));
        assert!(!whitelist.is_whitelisted("example.com"));
    }

    #[test]
    fn should_ignore_one_trailing_dot() {
        let whitelist = Whitelist::new(["ads.example.com", "*.tracker.net"]);

        assert!(whitelist.is_whitelisted("ads.example.com."));
        assert!(whitelist.is_whitelisted("x.tracker.net."));
    }

    #[test]
    fn should_be_case_sensitive() {
        let whitelist = Whitelist::new(["ads.example.com"]);

        assert!(!whitelist.is_whitelisted("ADS.example.com"));
    }

    #[test]
    fn should_skip_blank_patterns() {
        let whitelist = Whitelist::new(["", "   ", "*.", " ads.example.com "]);

        assert_eq!(whitelist.len(), 1);
        assert!(whitelist.is_whitelisted("ads.example.com"));
        assert!(!whitelist.is_whitelisted(""));
    }

    #[test]
    fn should_not_match_when_empty() {
        let whitelist = Whitelist::default();

        assert!(whitelist.is_empty());
        assert!(!whitelist.is_whitelisted("example.com"));
    }
}
