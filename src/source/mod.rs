pub mod datasaham;
pub mod snapshot_dir;

pub use datasaham::DatasahamClient;
pub use snapshot_dir::SnapshotDirSource;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::MarketSnapshot;

/// Anything that can hand the analyzer a fresh ladder for a symbol.
#[async_trait]
pub trait OrderBookSource: Send + Sync {
    async fn fetch_snapshot(&mut self, symbol: &str) -> Result<MarketSnapshot>;
}
