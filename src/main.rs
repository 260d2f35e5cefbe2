//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `region_gate` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All decision logic is implemented in the library crate.

use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use futures::stream::{FuturesUnordered, StreamExt};

use region_gate::config::{CacheAction, Command, Opt};
use region_gate::initialization::init_logger_with;
use region_gate::{
    AdmissionDecider, Config, Decision, GeoLookupClient, NormalizedIp, PolicyConfig,
    SqliteVerdictCache, VerdictCache,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables (e.g. RUST_LOG) from .env, trying the current
    // directory first, then the executable's directory
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let opt = Opt::parse();
    let config = Config::from(&opt.global);

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    let outcome = match opt.command {
        Command::Check { ips, fail_on_deny } => run_check(&config, ips, fail_on_deny).await,
        Command::Lookup { ip } => run_lookup(&config, &ip).await,
        Command::Cache { action } => run_cache(&config, action).await,
    };

    match outcome {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("region_gate error: {:#}", e);
            process::exit(2);
        }
    }
}

async fn run_check(config: &Config, ips: Vec<String>, fail_on_deny: bool) -> Result<i32> {
    let policy = PolicyConfig::load_or_default(&config.policy_file)
        .with_context(|| format!("Failed to load policy {}", config.policy_file.display()))?;
    policy.log_effective();

    let decider = AdmissionDecider::from_config(config, policy)
        .await
        .context("Failed to initialize admission decider")?;

    let mut tasks = FuturesUnordered::new();
    for (index, raw) in ips.iter().enumerate() {
        let decider = decider.clone();
        tasks.push(async move { (index, decider.decide_detailed(raw).await) });
    }

    // Print in argument order
    let mut decisions: Vec<(usize, Decision)> = Vec::with_capacity(ips.len());
    while let Some(done) = tasks.next().await {
        decisions.push(done);
    }
    decisions.sort_by_key(|(index, _)| *index);

    let mut denied = 0usize;
    for (index, decision) in &decisions {
        print_decision(&ips[*index], decision);
        if !decision.result.allowed {
            denied += 1;
        }
    }

    decider.stats().log_summary();
    println!(
        "Checked {} address{}: {} allowed, {} denied",
        decisions.len(),
        if decisions.len() == 1 { "" } else { "es" },
        decisions.len() - denied,
        denied
    );

    Ok(if fail_on_deny && denied > 0 { 1 } else { 0 })
}

fn print_decision(raw: &str, decision: &Decision) {
    let source = decision.source.map(|s| s.as_str()).unwrap_or("none");
    let shown = if raw == decision.ip.as_str() {
        raw.to_string()
    } else {
        format!("{} ({})", raw, decision.ip)
    };
    if decision.result.allowed {
        println!("✅ {} allowed [{}]", shown, source);
    } else {
        println!(
            "❌ {} {} [{}]: {}",
            shown, decision.outcome, source, decision.result.reason_message
        );
    }
}

async fn run_lookup(config: &Config, raw: &str) -> Result<i32> {
    let client = GeoLookupClient::from_config(config)
        .await
        .context("Failed to initialize geolocation client")?;
    let verdict = client
        .lookup(&NormalizedIp::new(raw))
        .await
        .with_context(|| format!("Lookup for {} failed", raw))?;
    println!("{}", serde_json::to_string_pretty(&verdict)?);
    Ok(0)
}

async fn run_cache(config: &Config, action: CacheAction) -> Result<i32> {
    let cache = SqliteVerdictCache::open(&config.db_path)
        .await
        .with_context(|| format!("Failed to open verdict cache {}", config.db_path.display()))?;

    match action {
        CacheAction::Show { ip } => {
            let ip = NormalizedIp::new(&ip);
            match cache.get(&ip).await.context("Failed to read cache")? {
                Some(verdict) => {
                    println!("{}", serde_json::to_string_pretty(&verdict)?);
                    Ok(0)
                }
                None => {
                    println!("No cached verdict for {}", ip);
                    Ok(1)
                }
            }
        }
        CacheAction::Forget { ip } => {
            let ip = NormalizedIp::new(&ip);
            if cache.remove(&ip).await.context("Failed to update cache")? {
                println!("Removed cached verdict for {}", ip);
            } else {
                println!("No cached verdict for {}", ip);
            }
            Ok(0)
        }
        CacheAction::Clear => {
            let removed = cache.clear().await.context("Failed to clear cache")?;
            println!("Removed {} cached verdict{}", removed, if removed == 1 { "" } else { "s" });
            Ok(0)
        }
    }
}
