//! Error type definitions.
//!
//! This module defines the error and outcome types used throughout the gate.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// The geolocation service base URL is not a valid absolute URL.
    #[error("Invalid geolocation service URL '{0}'")]
    ServiceUrlError(String),

    /// Error opening the verdict database.
    #[error("Verdict database initialization error: {0}")]
    DatabaseError(#[from] DatabaseError),

    /// Error starting the Tokio runtime behind a blocking adapter.
    #[error("Runtime initialization error: {0}")]
    RuntimeError(#[from] std::io::Error),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// A stored row could not be turned back into a verdict.
    #[error("Corrupt cache row for {ip}: {reason}")]
    CorruptRow { ip: String, reason: String },
}

/// Error types for loading the policy file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The policy file could not be read.
    #[error("Failed to read policy file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The policy file is not valid YAML or has the wrong shape.
    #[error("Failed to parse policy file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// A geolocation lookup that produced no usable verdict.
///
/// Every variant resolves to a deny. The detail is for operator logs only and is
/// never shown to the rejected client.
#[derive(Error, Debug)]
pub enum LookupFailure {
    /// The address is not an IP literal, so no request was sent.
    #[error("'{0}' is not an IP address")]
    InvalidAddress(String),

    /// Connect or read timeout elapsed.
    #[error("Geolocation lookup timed out")]
    Timeout,

    /// Connection, TLS, or body transfer failed.
    #[error("Geolocation request failed: {0}")]
    Transport(#[source] ReqwestError),

    /// The service answered with a non-200 HTTP status.
    #[error("Geolocation service returned HTTP {0}")]
    HttpStatus(u16),

    /// The service answered 200 but reported a failed lookup.
    #[error("Geolocation service reported status '{status}': {}", .message.as_deref().unwrap_or("no message"))]
    ServiceStatus {
        status: String,
        message: Option<String>,
    },

    /// The body is not the expected JSON object.
    #[error("Malformed geolocation response: {0}")]
    MalformedBody(#[from] serde_json::Error),

    /// A required field is absent from a successful response.
    #[error("Geolocation response is missing required field '{0}'")]
    MissingField(&'static str),
}

impl LookupFailure {
    /// Maps a transport error, separating timeouts from other failures.
    pub fn from_reqwest(error: ReqwestError) -> Self {
        if error.is_timeout() {
            LookupFailure::Timeout
        } else {
            LookupFailure::Transport(error)
        }
    }
}

/// How a single admission decision ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum DecisionOutcome {
    /// Region-eligible and not a proxy
    Allowed,
    /// The geolocation service flagged the address as a proxy
    DeniedProxyFlagged,
    /// ISP or organization name matched a proxy keyword
    DeniedProxyKeyword,
    /// Region-eligible but excluded by the operator's denied region list
    DeniedRestrictedRegion,
    /// Country outside the eligible region set
    DeniedOutsideRegion,
    /// No verdict could be obtained
    DeniedLookupFailure,
}

impl DecisionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionOutcome::Allowed => "allowed",
            DecisionOutcome::DeniedProxyFlagged => "denied: flagged as proxy by service",
            DecisionOutcome::DeniedProxyKeyword => "denied: proxy keyword in ISP/org",
            DecisionOutcome::DeniedRestrictedRegion => "denied: region restricted by operator",
            DecisionOutcome::DeniedOutsideRegion => "denied: outside eligible regions",
            DecisionOutcome::DeniedLookupFailure => "denied: lookup failed",
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, DecisionOutcome::Allowed)
    }
}

impl std::fmt::Display for DecisionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cache interactions counted per decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum CacheEvent {
    Hit,
    Miss,
    /// Entry found but older than the TTL
    Expired,
    /// Read failed; treated as a miss
    ReadFault,
    /// Write failed; decision unaffected
    WriteFault,
}

impl CacheEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheEvent::Hit => "cache hit",
            CacheEvent::Miss => "cache miss",
            CacheEvent::Expired => "cache entry expired",
            CacheEvent::ReadFault => "cache read fault",
            CacheEvent::WriteFault => "cache write fault",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_status_display_includes_message() {
        let failure = LookupFailure::ServiceStatus {
            status: "fail".to_string(),
            message: Some("reserved range".to_string()),
        };
        assert_eq!(
            failure.to_string(),
            "Geolocation service reported status 'fail': reserved range"
        );

        let failure = LookupFailure::ServiceStatus {
            status: "fail".to_string(),
            message: None,
        };
        assert!(failure.to_string().ends_with("no message"));
    }

    #[test]
    fn test_missing_field_display() {
        assert_eq!(
            LookupFailure::MissingField("countryCode").to_string(),
            "Geolocation response is missing required field 'countryCode'"
        );
    }

    #[test]
    fn test_only_allowed_outcome_is_allowed() {
        use strum::IntoEnumIterator;
        let allowed: Vec<_> = DecisionOutcome::iter().filter(|o| o.is_allowed()).collect();
        assert_eq!(allowed, vec![DecisionOutcome::Allowed]);
    }
}
