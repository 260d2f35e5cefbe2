// Shared helpers for integration tests: a stub geolocation service and a
// configuration pointing at it with a throwaway database.

use std::path::Path;
use std::time::Duration;

use region_gate::Config;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Configuration for a gate backed by `server` and a database at `db_path`.
/// Timeouts are short so failure scenarios finish quickly.
#[allow(dead_code)] // Not every test file uses every helper
pub fn config_for(server: &MockServer, db_path: &Path) -> Config {
    Config {
        db_path: db_path.to_path_buf(),
        policy_file: db_path.with_file_name("policy.yml"),
        geo_service_url: server.uri(),
        connect_timeout_ms: 1000,
        read_timeout_ms: 500,
        cache_ttl_secs: 0,
        ..Default::default()
    }
}

/// Serves `body` for `GET /json/<ip>?lang=zh-CN`, expecting exactly `times` calls.
#[allow(dead_code)]
pub async fn mount_geo(server: &MockServer, ip: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/json/{}", ip)))
        .and(query_param("lang", "zh-CN"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .expect(times)
        .mount(server)
        .await;
}

/// Serves `body` for `ip` only after `delay`.
#[allow(dead_code)]
pub async fn mount_slow_geo(server: &MockServer, ip: &str, body: &str, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(format!("/json/{}", ip)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body.to_string())
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Answers every request with `status` and `body`.
#[allow(dead_code)]
pub async fn mount_any(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body.to_string()))
        .mount(server)
        .await;
}
