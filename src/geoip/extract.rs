//! Geolocation response parsing.
//!
//! Turns the JSON body returned by the geolocation service into a [`GeoVerdict`].

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::types::{is_china_region, GeoVerdict};
use crate::address::NormalizedIp;
use crate::config::GEO_SUCCESS_STATUS;
use crate::error_handling::LookupFailure;

/// Body of `GET /json/<ip>`. Every field is optional at this layer so that a
/// missing field is reported by name instead of as a generic decode error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceResponse {
    status: Option<String>,
    message: Option<String>,
    country_code: Option<String>,
    country: Option<String>,
    region_name: Option<String>,
    city: Option<String>,
    isp: Option<String>,
    org: Option<String>,
    proxy: Option<bool>,
}

/// Parses a response body into a verdict for `ip`, stamped with `now`.
///
/// # Errors
///
/// - `MalformedBody` if the body is not a JSON object of the expected shape
/// - `MissingField("status")` if there is no status at all
/// - `ServiceStatus` if the status is anything but `success`
/// - `MissingField("countryCode")` if a successful answer carries no country code
///
/// Descriptive fields (`country`, `regionName`, `city`, `isp`, `org`) only feed logs
/// and the cache record, so an absent one is stored as empty text.
pub(crate) fn parse_response(
    ip: &NormalizedIp,
    body: &str,
    now: DateTime<Utc>,
) -> Result<GeoVerdict, LookupFailure> {
    let response: ServiceResponse = serde_json::from_str(body)?;

    let status = response.status.ok_or(LookupFailure::MissingField("status"))?;
    if status != GEO_SUCCESS_STATUS {
        return Err(LookupFailure::ServiceStatus {
            status,
            message: response.message,
        });
    }

    let country_code = response
        .country_code
        .ok_or(LookupFailure::MissingField("countryCode"))?;
    let is_china_region = is_china_region(&country_code);

    Ok(GeoVerdict {
        ip: ip.clone(),
        country_code,
        country: response.country.unwrap_or_default(),
        region: response.region_name.unwrap_or_default(),
        city: response.city.unwrap_or_default(),
        isp: response.isp.unwrap_or_default(),
        org: response.org.unwrap_or_default(),
        is_proxy_flagged: response.proxy.unwrap_or(false),
        is_china_region,
        last_updated: now,
    })
}
