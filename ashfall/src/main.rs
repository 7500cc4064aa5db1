//! Ashfall MUD terminal client.
//!
//! Plays a single character in the Ashfall world over stdin/stdout:
//!
//! ```bash
//! cargo run -p ashfall -- --name Drifter
//! ASHFALL_TIME_UNIT_MS=100 cargo run -p ashfall -- --seed 7
//! ```
//!
//! Environment (also read from `.env`):
//! - `ASHFALL_CONFIG`: path to a JSON rules config
//! - `ASHFALL_TIME_UNIT_MS`: wall-clock length of one time unit (default 1000)
//! - `RUST_LOG`: log filter (default `info`)

mod play;

use anyhow::{bail, Context, Result};
use ashfall_core::GameConfig;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DEFAULT_TIME_UNIT_MS: u64 = 1000;

/// Settings gathered from arguments and environment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub player_name: String,
    pub seed: Option<u64>,
    pub time_unit: Duration,
    pub rules: GameConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let config = load_config(&args)?;
    play::run(config).await
}

fn load_config(args: &[String]) -> Result<ClientConfig> {
    let player_name = arg_value(args, "--name").unwrap_or_else(|| "Drifter".to_string());
    if player_name.trim().is_empty() {
        bail!("--name must not be empty");
    }

    let seed = arg_value(args, "--seed")
        .map(|s| s.parse::<u64>().with_context(|| format!("invalid --seed '{s}'")))
        .transpose()?;

    let time_unit_ms = match std::env::var("ASHFALL_TIME_UNIT_MS") {
        Ok(value) => value
            .parse::<u64>()
            .with_context(|| format!("invalid ASHFALL_TIME_UNIT_MS '{value}'"))?,
        Err(_) => DEFAULT_TIME_UNIT_MS,
    };
    if time_unit_ms == 0 {
        bail!("ASHFALL_TIME_UNIT_MS must be positive");
    }

    let rules = match std::env::var("ASHFALL_CONFIG") {
        Ok(path) => GameConfig::load(&path).with_context(|| format!("loading config from {path}"))?,
        Err(_) => GameConfig::default(),
    };

    Ok(ClientConfig {
        player_name,
        seed,
        time_unit: Duration::from_millis(time_unit_ms),
        rules,
    })
}

/// Value following a `--flag`, if present.
fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn print_help() {
    println!("Ashfall MUD");
    println!();
    println!("Usage: ashfall [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --name <NAME>   Character name (default: Drifter)");
    println!("  --seed <SEED>   Seed the dice for a repeatable game");
    println!("  -h, --help      Print this help");
    println!();
    println!("Environment:");
    println!("  ASHFALL_CONFIG        JSON rules config file");
    println!("  ASHFALL_TIME_UNIT_MS  Milliseconds per game time unit (default: 1000)");
    println!("  RUST_LOG              Log filter (default: info)");
}
