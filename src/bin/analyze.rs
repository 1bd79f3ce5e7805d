use anyhow::{Context, Result};
use time::format_description::well_known::Rfc3339;
use tracing_subscriber::{fmt, EnvFilter};

use idx_orderflow::config::Config;
use idx_orderflow::models::MarketSnapshot;
use idx_orderflow::strategies::{Analyzer, ScoringStrategy};

const USAGE: &str =
    "usage: analyze <snapshot.json> [--strategy six_rule|legacy|both] [--entry PRICE --atr ATR]";

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
}

/// One-shot analysis of a saved snapshot. Prints the full analysis (and an
/// exit plan when an entry price is given) as JSON.
#[tokio::main]
async fn main() -> Result<()> {
    let mut cfg = Config::from_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.log_level.to_lowercase()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_timer(fmt::time::UtcTime::new(Rfc3339))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let path = args.first().context(USAGE)?;

    if let Some(s) = flag(&args, "--strategy") {
        cfg.strategy = s
            .parse::<ScoringStrategy>()
            .map_err(anyhow::Error::msg)?;
    }
    let entry: Option<f64> = flag(&args, "--entry")
        .map(|s| s.parse::<f64>().context("--entry must be a number"))
        .transpose()?;
    let atr: f64 = flag(&args, "--atr")
        .map(|s| s.parse::<f64>().context("--atr must be a number"))
        .transpose()?
        .unwrap_or(0.0);

    let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    let snapshot: MarketSnapshot =
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path))?;

    let analyzer = Analyzer::from_config(&cfg);
    let analysis = analyzer.analyze(&snapshot, cfg.position_size as f64);

    let exit = match entry {
        Some(entry_price) => Some(analyzer.plan_exit(
            entry_price,
            snapshot.last_price,
            atr,
            cfg.position_size as f64,
        )?),
        None => None,
    };

    let out = serde_json::json!({
        "analysis": analysis,
        "exit_plan": exit,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);

    Ok(())
}
