// src/main.rs

//! The entry point of the `docrelay` replay tool.

use anyhow::Result;
use docrelay::config::Config;
use docrelay::server;
use std::env;
use tracing::{error, info};
use tracing_subscriber::filter::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let args: Vec<String> = env::args().collect();

    if args.contains(&"--version".to_string()) {
        println!("docrelay version {VERSION}");
        return Ok(());
    }

    // The config path can be provided via --config; otherwise it defaults to "docrelay.toml".
    let config_path = flag_value(&args, "--config").unwrap_or("docrelay.toml");

    let mut config = match Config::from_file(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration from \"{config_path}\": {e:#}");
            std::process::exit(1);
        }
    };

    // Override the replay window if provided on the command line.
    if let Some(from) = parse_u64_flag(&args, "--from") {
        config.replay.from = from;
    }
    if let Some(to) = parse_u64_flag(&args, "--to") {
        config.replay.to = to;
    }
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e:#}");
        std::process::exit(1);
    }

    // Logging goes to stderr; stdout carries the replayed operations.
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .with_writer(std::io::stderr)
        .compact()
        .with_ansi(true)
        .init();

    info!("Starting docrelay {}", VERSION);

    if let Err(e) = server::run(config).await {
        error!("Runtime error: {}", e);
        return Err(e);
    }

    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

fn parse_u64_flag(args: &[String], flag: &str) -> Option<u64> {
    let value = flag_value(args, flag)?;
    match value.parse::<u64>() {
        Ok(n) => Some(n),
        Err(_) => {
            eprintln!("Invalid value for {flag}: {value}");
            std::process::exit(1);
        }
    }
}
