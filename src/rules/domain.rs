//! Domain and address syntax checks shared by the validator and the parser.

use std::net::IpAddr;

/// Check whether a string is a syntactically plausible domain name.
///
/// Used after wildcard markers have been removed from a rule, so the result
/// must still look like a dotted name.
///
/// # Rejected
///
/// - empty (or whitespace-only) strings
/// - a leading or trailing `.`
/// - an empty label (`a..b`)
/// - a label starting or ending with `-`
///
/// # Example
///
/// ```
/// use hostsync::rules::is_valid_domain;
///
/// assert!(is_valid_domain("ads.example.com"));
/// assert!(!is_valid_domain("ads..example.com"));
/// assert!(!is_valid_domain("-ads.example.com"));
/// ```
#[must_use]
pub fn is_valid_domain(domain: &str) -> bool {
    let domain = domain.trim();
    if domain.is_empty() {
        return false;
    }

    if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return false;
    }

    domain
        .split('.')
        .all(|label| !label.is_empty() && !label.starts_with('-') && !label.ends_with('-'))
}

/// Check for a dotted-quad IPv4 address.
///
/// Each of the four components must be one to three ASCII digits with a value
/// of at most 255. Leading zeros are accepted (`010.001.000.001`), which is
/// looser than [`std::net::Ipv4Addr`] parsing and matches what published hosts
/// files actually contain.
#[must_use]
pub fn is_valid_ipv4(ip: &str) -> bool {
    let mut count = 0;
    for part in ip.split('.') {
        count += 1;
        if count > 4 || part.is_empty() || part.len() > 3 {
            return false;
        }
        if !part.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        match part.parse::<u16>() {
            Ok(value) if value <= 255 => {}
            _ => return false,
        }
    }
    count == 4
}

/// Check whether the first field of a hosts line is an IP address.
///
/// Accepts IPv4 (see [`is_valid_ipv4`]) and IPv6 literals. An IPv6 zone
/// suffix such as `fe80::1%lo0` is ignored.
#[must_use]
pub fn is_ip_address(token: &str) -> bool {
    let address = token.split_once('%').map_or(token, |(address, _zone)| address);

    address.parse::<IpAddr>().is_ok() || is_valid_ipv4(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_accept_dotted_domains() {
        assert!(is_valid_domain("a.b.c"));
        assert!(is_valid_domain("example.com"));
        assert!(is_valid_domain("xn--bcher-kva.example"));
        assert!(is_valid_domain("localhost"));
        assert!(is_valid_domain("1-1ads.com"));
    }

    #[test]
    fn should_reject_malformed_domains() {
        assert!(!is_valid_domain(""));
        assert!(!is_valid_domain("   "));
        assert!(!is_valid_domain("a..b"));
        assert!(!is_valid_domain(".a.b"));
        assert!(!is_valid_domain("a.b."));
        assert!(!is_valid_domain("-a.b"));
        assert!(!is_valid_domain("a-.b"));
        assert!(!is_valid_domain("a.-b"));
    }

    #[test]
    fn should_trim_before_validating_domain() {
        assert!(is_valid_domain("  example.com  "));
    }

    #[test]
    fn should_accept_ipv4_addresses() {
        assert!(is_valid_ipv4("0.0.0.0"));
        assert!(is_valid_ipv4("127.0.0.1"));
        assert!(is_valid_ipv4("255.255.255.255"));
        assert!(is_valid_ipv4("010.001.000.001"));
    }

    #[test]
    fn should_reject_malformed_ipv4_addresses() {
        assert!(!is_valid_ipv4(""));
        assert!(!is_valid_ipv4("0.0.0"));
        assert!(!is_valid_ipv4("0.0.0.0.0"));
        assert!(!is_valid_ipv4("256.0.0.1"));
        assert!(!is_valid_ipv4("1..2.3"));
        assert!(!is_valid_ipv4("1.2.3.0001"));
        assert!(!is_valid_ipv4("a.b.c.d"));
        assert!(!is_valid_ipv4("1.2.3.-4"));
    }

    #[test]
    fn should_recognize_ipv6_literals() {
        assert!(is_ip_address("::1"));
        assert!(is_ip_address("fe80::1"));
        assert!(is_ip_address("ff02::2"));
        assert!(is_ip_address("fe80::1%lo0"));
        assert!(is_ip_address("::"));
    }

    #[test]
    fn should_not_treat_hostnames_as_addresses() {
        assert!(!is_ip_address("example.com"));
        assert!(!is_ip_address("localhost"));
        assert!(!is_ip_address("||ads.example.com^"));
        assert!(!is_ip_address("<html>"));
        assert!(!is_ip_address("%lo0"));
    }
}
