//! Geolocation service client.
//!
//! One `GET <base>/json/<ip>?lang=<lang>` per uncached address. The connect and read
//! timeouts configured on the HTTP client are the only latency bound; there are no
//! retries, so a slow or failing service turns into a prompt deny.

use std::sync::Arc;

use log::{debug, info, warn};
use reqwest::StatusCode;
use url::Url;

use super::extract::parse_response;
use super::types::{now_millis, GeoVerdict};
use crate::address::NormalizedIp;
use crate::config::Config;
use crate::error_handling::{InitializationError, LookupFailure};
use crate::initialization::init_client;

/// Client for the external geolocation service.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct GeoLookupClient {
    http: Arc<reqwest::Client>,
    base_url: Url,
    lang: String,
}

impl GeoLookupClient {
    /// Creates a client around an existing HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::ServiceUrlError` if `base_url` is not an absolute
    /// URL that can carry a path.
    pub fn new(
        http: Arc<reqwest::Client>,
        base_url: &str,
        lang: impl Into<String>,
    ) -> Result<Self, InitializationError> {
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|u| !u.cannot_be_a_base())
            .ok_or_else(|| InitializationError::ServiceUrlError(base_url.to_string()))?;
        Ok(Self {
            http,
            base_url,
            lang: lang.into(),
        })
    }

    /// Builds the HTTP client and the lookup client from configuration.
    pub async fn from_config(config: &Config) -> Result<Self, InitializationError> {
        let http = init_client(config).await?;
        Self::new(http, &config.geo_service_url, config.lang.clone())
    }

    /// Request URL for `ip`.
    fn request_url(&self, ip: &NormalizedIp) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("json").push(ip.as_str());
        }
        url.query_pairs_mut().clear().append_pair("lang", &self.lang);
        url
    }

    /// Looks up `ip` and returns a fresh verdict.
    ///
    /// # Errors
    ///
    /// Any `LookupFailure`: the address is not an IP literal, the request timed out
    /// or failed, the service answered non-200 or a non-success status, or the body
    /// could not be parsed.
    pub async fn lookup(&self, ip: &NormalizedIp) -> Result<GeoVerdict, LookupFailure> {
        // Never put arbitrary text into the request path
        if ip.to_ip_addr().is_none() {
            return Err(LookupFailure::InvalidAddress(ip.to_string()));
        }

        let url = self.request_url(ip);
        debug!("Geolocation request: {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(LookupFailure::from_reqwest)?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(
                "Geolocation service returned HTTP {} for {}",
                status.as_u16(),
                ip
            );
            return Err(LookupFailure::HttpStatus(status.as_u16()));
        }

        let body = response.text().await.map_err(LookupFailure::from_reqwest)?;
        let verdict = parse_response(ip, &body, now_millis())?;

        info!(
            "Geolocation for {}: {} ({}), {}, {} | ISP: {} | ORG: {} | Proxy: {}",
            ip,
            verdict.country,
            verdict.country_code,
            verdict.region,
            verdict.city,
            verdict.isp,
            verdict.org,
            verdict.is_proxy_flagged
        );

        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, read_timeout_ms: u64) -> GeoLookupClient {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(1000))
            .read_timeout(Duration::from_millis(read_timeout_ms))
            .build()
            .expect("client");
        GeoLookupClient::new(Arc::new(http), &server.uri(), "zh-CN").expect("lookup client")
    }

    #[test]
    fn test_request_url_shape() {
        let http = Arc::new(reqwest::Client::new());
        let client = GeoLookupClient::new(http, "http://ip-api.com", "zh-CN").unwrap();
        assert_eq!(
            client
                .request_url(&NormalizedIp::new("203.0.113.5"))
                .as_str(),
            "http://ip-api.com/json/203.0.113.5?lang=zh-CN"
        );
    }

    #[test]
    fn test_request_url_keeps_base_path() {
        let http = Arc::new(reqwest::Client::new());
        let client = GeoLookupClient::new(http, "http://geo.internal/api/", "zh-CN").unwrap();
        assert_eq!(
            client.request_url(&NormalizedIp::new("2001:db8::1")).path(),
            "/api/json/2001:db8::1"
        );
    }

    #[test]
    fn test_new_rejects_bad_base_url() {
        let http = Arc::new(reqwest::Client::new());
        assert!(GeoLookupClient::new(Arc::clone(&http), "not a url", "zh-CN").is_err());
        assert!(GeoLookupClient::new(http, "mailto:geo@example.com", "zh-CN").is_err());
    }

    #[tokio::test]
    async fn test_lookup_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/203.0.113.5"))
            .and(query_param("lang", "zh-CN"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"status":"success","countryCode":"CN","country":"中国","regionName":"北京","city":"北京","isp":"China Unicom","org":"","proxy":false}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, 2000);
        let verdict = client
            .lookup(&NormalizedIp::new("203.0.113.5"))
            .await
            .expect("lookup should succeed");
        assert_eq!(verdict.country_code, "CN");
        assert!(verdict.is_china_region);
        assert_eq!(verdict.isp, "China Unicom");
    }

    #[tokio::test]
    async fn test_lookup_non_200_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server, 2000);
        let result = client.lookup(&NormalizedIp::new("203.0.113.5")).await;
        assert!(matches!(result, Err(LookupFailure::HttpStatus(500))));
    }

    #[tokio::test]
    async fn test_lookup_rate_limited_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = client_for(&server, 2000);
        let result = client.lookup(&NormalizedIp::new("203.0.113.5")).await;
        assert!(matches!(result, Err(LookupFailure::HttpStatus(429))));
    }

    #[tokio::test]
    async fn test_lookup_read_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"status":"success"}"#)
                    .set_delay(Duration::from_millis(1500)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, 200);
        let result = client.lookup(&NormalizedIp::new("203.0.113.5")).await;
        // Depending on where the deadline fires, reqwest reports it as a timeout
        // or as a body/transport error wrapping one
        assert!(
            matches!(
                result,
                Err(LookupFailure::Timeout) | Err(LookupFailure::Transport(_))
            ),
            "got {:?}",
            result
        );
    }

    #[tokio::test]
    async fn test_lookup_invalid_address_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server, 2000);
        for raw in ["", "not-an-ip", "1.2.3.4/../admin", "::ffff:999.1.1.1"] {
            let result = client.lookup(&NormalizedIp::new(raw)).await;
            assert!(
                matches!(result, Err(LookupFailure::InvalidAddress(_))),
                "{:?} should be rejected before any request",
                raw
            );
        }
    }

    #[tokio::test]
    async fn test_lookup_connection_refused_is_failure() {
        // Bind then drop a listener so the port is very likely closed
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let http = Arc::new(reqwest::Client::new());
        let client =
            GeoLookupClient::new(http, &format!("http://127.0.0.1:{}", port), "zh-CN").unwrap();
        let result = client.lookup(&NormalizedIp::new("203.0.113.5")).await;
        assert!(result.is_err());
    }
}
