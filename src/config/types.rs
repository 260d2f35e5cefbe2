//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::constants::{
    DB_PATH, DEFAULT_CACHE_TTL_SECS, DEFAULT_GEO_SERVICE_URL, DEFAULT_USER_AGENT,
    GEO_SERVICE_LANG, LOOKUP_CONNECT_TIMEOUT_MS, LOOKUP_READ_TIMEOUT_MS, POLICY_PATH,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// Everything the gate needs at startup except the admission policy itself,
/// which lives in its own YAML file so it can be reloaded without a restart.
///
/// # Examples
///
/// ```no_run
/// use region_gate::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     db_path: PathBuf::from("/var/lib/region_gate/verdicts.db"),
///     cache_ttl_secs: 0, // keep verdicts forever
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// Policy file path (YAML)
    pub policy_file: PathBuf,

    /// Base URL of the geolocation service
    pub geo_service_url: String,

    /// Language requested from the geolocation service
    pub lang: String,

    /// Connect timeout for a lookup in milliseconds
    pub connect_timeout_ms: u64,

    /// Read timeout for a lookup in milliseconds
    pub read_timeout_ms: u64,

    /// Age after which a cached verdict is refreshed, in seconds (0 = never)
    pub cache_ttl_secs: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,
}

impl Config {
    /// Connect timeout as a `Duration`.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Read timeout as a `Duration`.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Cache TTL, or `None` when verdicts never expire.
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            db_path: PathBuf::from(DB_PATH),
            policy_file: PathBuf::from(POLICY_PATH),
            geo_service_url: DEFAULT_GEO_SERVICE_URL.to_string(),
            lang: GEO_SERVICE_LANG.to_string(),
            connect_timeout_ms: LOOKUP_CONNECT_TIMEOUT_MS,
            read_timeout_ms: LOOKUP_READ_TIMEOUT_MS,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Decide for a couple of addresses
/// region_gate check 203.0.113.5 ::ffff:198.51.100.7
///
/// # Show what the geolocation service reports, bypassing cache and policy
/// region_gate lookup 203.0.113.5
///
/// # Drop every cached verdict
/// region_gate --db-path ./custom.db cache clear
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "region_gate",
    about = "Admits or rejects connections by the geolocation and proxy status of the client IP."
)]
pub struct Opt {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Database path (SQLite file)
    #[arg(long, global = true, value_parser, default_value = DB_PATH)]
    pub db_path: PathBuf,

    /// Policy file (YAML with denied-regions, enable-region-restriction, denied-message)
    #[arg(long, global = true, value_parser, default_value = POLICY_PATH)]
    pub policy: PathBuf,

    /// Base URL of the geolocation service
    #[arg(long, global = true, default_value = DEFAULT_GEO_SERVICE_URL)]
    pub geo_service_url: String,

    /// Connect timeout for the geolocation service in milliseconds
    #[arg(long, global = true, default_value_t = LOOKUP_CONNECT_TIMEOUT_MS)]
    pub connect_timeout_ms: u64,

    /// Read timeout for the geolocation service in milliseconds
    #[arg(long, global = true, default_value_t = LOOKUP_READ_TIMEOUT_MS)]
    pub read_timeout_ms: u64,

    /// Refresh cached verdicts older than this many seconds (0 keeps them forever)
    #[arg(long, global = true, default_value_t = DEFAULT_CACHE_TTL_SECS)]
    pub cache_ttl_secs: u64,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the admission decision for each address
    Check {
        /// Raw client addresses (IPv4, IPv6, or IPv4-mapped IPv6)
        #[arg(required = true)]
        ips: Vec<String>,

        /// Exit with status 1 if any address is denied
        #[arg(long)]
        fail_on_deny: bool,
    },
    /// Query the geolocation service directly (no cache, no policy)
    Lookup {
        /// Client address
        ip: String,
    },
    /// Inspect or maintain the verdict cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

/// Cache maintenance actions.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Print the cached verdict for an address
    Show {
        /// Client address
        ip: String,
    },
    /// Remove the cached verdict for an address
    Forget {
        /// Client address
        ip: String,
    },
    /// Remove every cached verdict
    Clear,
}

impl From<&GlobalOpts> for Config {
    fn from(opts: &GlobalOpts) -> Self {
        Config {
            log_level: opts.log_level.clone(),
            log_format: opts.log_format.clone(),
            db_path: opts.db_path.clone(),
            policy_file: opts.policy.clone(),
            geo_service_url: opts.geo_service_url.clone(),
            connect_timeout_ms: opts.connect_timeout_ms,
            read_timeout_ms: opts.read_timeout_ms,
            cache_ttl_secs: opts.cache_ttl_secs,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.connect_timeout_ms, 5000);
        assert_eq!(config.read_timeout_ms, 5000);
        assert_eq!(config.lang, "zh-CN");
        assert_eq!(config.geo_service_url, "http://ip-api.com");
        assert_eq!(config.db_path, PathBuf::from("./region_gate.db"));
        assert_eq!(config.cache_ttl_secs, DEFAULT_CACHE_TTL_SECS);
    }

    #[test]
    fn test_cache_ttl_zero_disables_expiry() {
        let config = Config {
            cache_ttl_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.cache_ttl(), None);

        let config = Config {
            cache_ttl_secs: 60,
            ..Default::default()
        };
        assert_eq!(config.cache_ttl(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_opt_parses_check_with_global_flags() {
        let opt = Opt::parse_from([
            "region_gate",
            "check",
            "203.0.113.5",
            "::1",
            "--fail-on-deny",
            "--cache-ttl-secs",
            "0",
            "--db-path",
            "/tmp/gate.db",
        ]);
        match &opt.command {
            Command::Check { ips, fail_on_deny } => {
                assert_eq!(ips, &vec!["203.0.113.5".to_string(), "::1".to_string()]);
                assert!(*fail_on_deny);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let config = Config::from(&opt.global);
        assert_eq!(config.cache_ttl_secs, 0);
        assert_eq!(config.db_path, PathBuf::from("/tmp/gate.db"));
        assert_eq!(config.lang, "zh-CN");
    }

    #[test]
    fn test_opt_parses_cache_clear() {
        let opt = Opt::parse_from(["region_gate", "cache", "clear"]);
        assert!(matches!(
            opt.command,
            Command::Cache {
                action: CacheAction::Clear
            }
        ));
    }

    #[test]
    fn test_opt_check_requires_an_address() {
        let result = Opt::try_parse_from(["region_gate", "check"]);
        assert!(result.is_err());
    }
}
