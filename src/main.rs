use anyhow::Result;
use time::format_description::well_known::Rfc3339;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use idx_orderflow::config::Config;
use idx_orderflow::scanner::Scanner;
use idx_orderflow::source::{DatasahamClient, OrderBookSource, SnapshotDirSource};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.log_level.to_lowercase()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::new(Rfc3339))
        .init();

    let source: Box<dyn OrderBookSource> = match &cfg.snapshot_dir {
        Some(dir) => {
            info!("Replaying snapshots from {}", dir);
            Box::new(SnapshotDirSource::new(dir))
        }
        None => {
            if cfg.api_key.is_empty() {
                anyhow::bail!("DATASAHAM_API_KEY is not set (or set SNAPSHOT_DIR to replay files)");
            }
            Box::new(DatasahamClient::new(&cfg)?)
        }
    };

    let mut scanner = Scanner::new(cfg.shared(), source).await;
    scanner.run().await?;

    Ok(())
}
