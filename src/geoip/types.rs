//! Verdict data structures.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::address::NormalizedIp;
use crate::config::CHINA_REGION_CODES;

/// Resolved geolocation and proxy status for one address.
///
/// Created from a successful lookup, persisted by the verdict cache, and never
/// mutated afterwards; a refresh replaces the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeoVerdict {
    pub ip: NormalizedIp,
    /// Two-letter country code, empty when the service did not provide one
    pub country_code: String,
    pub country: String,
    pub region: String,
    pub city: String,
    pub isp: String,
    pub org: String,
    /// Proxy indicator reported by the geolocation service
    pub is_proxy_flagged: bool,
    /// Whether `country_code` is in the eligible region set
    pub is_china_region: bool,
    /// When the verdict was produced (millisecond precision)
    pub last_updated: DateTime<Utc>,
}

impl GeoVerdict {
    /// Age of the verdict relative to `now`. Clock skew into the future counts as zero.
    pub fn age(&self, now: DateTime<Utc>) -> std::time::Duration {
        (now - self.last_updated).to_std().unwrap_or_default()
    }
}

/// Whether a country code belongs to the fixed eligible set {CN, HK, MO, TW}.
///
/// Matching is exact; an empty or unknown code is never eligible.
pub fn is_china_region(country_code: &str) -> bool {
    CHINA_REGION_CODES.contains(&country_code)
}

/// Current time truncated to milliseconds, the precision the cache stores.
///
/// Verdicts are stamped with this so a stored record reads back equal to the
/// one that was written.
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_is_china_region() {
        for code in ["CN", "HK", "MO", "TW"] {
            assert!(is_china_region(code), "{} should be eligible", code);
        }
        for code in ["", "US", "JP", "cn", "C", "CNN", "XX"] {
            assert!(!is_china_region(code), "{:?} should not be eligible", code);
        }
    }

    #[test]
    fn test_now_millis_has_no_sub_millisecond_part() {
        let now = now_millis();
        assert_eq!(now.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn test_age_never_negative() {
        let stamp = now_millis();
        let verdict = GeoVerdict {
            ip: NormalizedIp::new("203.0.113.5"),
            country_code: "CN".to_string(),
            country: "中国".to_string(),
            region: String::new(),
            city: String::new(),
            isp: String::new(),
            org: String::new(),
            is_proxy_flagged: false,
            is_china_region: true,
            last_updated: stamp,
        };
        assert_eq!(
            verdict.age(stamp - Duration::seconds(30)),
            std::time::Duration::ZERO
        );
        assert_eq!(
            verdict.age(stamp + Duration::seconds(30)),
            std::time::Duration::from_secs(30)
        );
    }
}
