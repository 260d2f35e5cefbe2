//! Client address normalization.
//!
//! Transport layers report the same client in several textual forms. A dual-stack
//! listener hands out IPv4 clients as IPv4-mapped IPv6 (`::ffff:203.0.113.5`), and
//! the loopback client may show up as `::1`. Both are rewritten here so that the
//! cache key and the lookup parameter are the same for one client.
//!
//! Key functions:
//! - `normalize_ip()` - Canonicalizes a raw address string
//! - `is_valid_ipv4()` - Strict dotted-quad check used by the mapped-address rule

use std::fmt;

use serde::Serialize;

/// Prefix of an IPv4-mapped IPv6 address in its compressed textual form
const IPV4_MAPPED_PREFIX: &str = "::ffff:";

/// Compressed IPv6 loopback literal
const IPV6_LOOPBACK: &str = "::1";

/// IPv4 loopback substituted for `::1`
const IPV4_LOOPBACK: &str = "127.0.0.1";

/// Normalizes a raw client address.
///
/// - `::ffff:a.b.c.d` becomes `a.b.c.d` when the suffix is a valid dotted quad
/// - `::1` becomes `127.0.0.1`
/// - anything else, including the empty string, is returned unchanged
///
/// The function never fails; an unrecognized format passes through and is left
/// for the lookup to reject.
///
/// # Examples
///
/// ```
/// use region_gate::normalize_ip;
///
/// assert_eq!(normalize_ip("::ffff:203.0.113.5"), "203.0.113.5");
/// assert_eq!(normalize_ip("::1"), "127.0.0.1");
/// assert_eq!(normalize_ip("2001:db8::1"), "2001:db8::1");
/// ```
pub fn normalize_ip(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    if let Some(candidate) = raw.strip_prefix(IPV4_MAPPED_PREFIX) {
        if is_valid_ipv4(candidate) {
            log::debug!("Extracted IPv4 from mapped address: {} -> {}", raw, candidate);
            return candidate.to_string();
        }
    }

    if raw == IPV6_LOOPBACK {
        log::debug!("Treating {} as loopback {}", raw, IPV4_LOOPBACK);
        return IPV4_LOOPBACK.to_string();
    }

    raw.to_string()
}

/// Checks that `s` is four dot-separated decimal octets, each in `0..=255`.
///
/// Leading zeros (`010.0.0.1`), signs and whitespace are rejected, matching what
/// `std::net::Ipv4Addr` accepts, so a rewritten address always parses.
pub fn is_valid_ipv4(s: &str) -> bool {
    let parts: Vec<&str> = s.split('.').collect();
    if parts.len() != 4 {
        return false;
    }
    parts.iter().all(|part| {
        !part.is_empty()
            && part.len() <= 3
            && part.bytes().all(|b| b.is_ascii_digit())
            && (part.len() == 1 || !part.starts_with('0'))
            && part.parse::<u16>().map(|n| n <= 255).unwrap_or(false)
    })
}

/// A client address that has been through [`normalize_ip`].
///
/// Used as the verdict cache key and as the lookup parameter. Construct with
/// [`NormalizedIp::new`]; the wrapped string is never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NormalizedIp(String);

impl NormalizedIp {
    pub fn new(raw: &str) -> Self {
        NormalizedIp(normalize_ip(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parses the address, returning `None` if it is not an IP literal.
    pub fn to_ip_addr(&self) -> Option<std::net::IpAddr> {
        self.0.parse().ok()
    }
}

impl fmt::Display for NormalizedIp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedIp {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
