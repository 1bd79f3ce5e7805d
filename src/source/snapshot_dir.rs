use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

use crate::models::MarketSnapshot;
use crate::source::OrderBookSource;

/// Replays `{dir}/{SYMBOL}.json` files holding serialized `MarketSnapshot`s.
pub struct SnapshotDirSource {
    dir: PathBuf,
}

impl SnapshotDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.json", symbol))
    }
}

#[async_trait]
impl OrderBookSource for SnapshotDirSource {
    async fn fetch_snapshot(&mut self, symbol: &str) -> Result<MarketSnapshot> {
        let path = self.path_for(symbol);
        let raw = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let mut snapshot: MarketSnapshot = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
        if snapshot.symbol.is_empty() {
            snapshot.symbol = symbol.to_string();
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{bullish_ladder, make_snapshot};

    #[tokio::test]
    async fn reads_snapshot_by_symbol() {
        let dir = std::env::temp_dir().join("idx-orderflow-snapshot-dir-test");
        std::fs::create_dir_all(&dir).unwrap();
        let snap = make_snapshot("GOTO", bullish_ladder());
        std::fs::write(dir.join("GOTO.json"), serde_json::to_string(&snap).unwrap()).unwrap();

        let mut source = SnapshotDirSource::new(&dir);
        let loaded = source.fetch_snapshot("GOTO").await.unwrap();
        assert_eq!(loaded.symbol, "GOTO");
        assert_eq!(loaded.ladder, snap.ladder);

        assert!(source.fetch_snapshot("MISSING").await.is_err());
    }
}
