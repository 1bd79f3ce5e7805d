use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::{Config, SharedConfig};
use crate::core::frequency::{frequency_dynamics, FrequencyDynamics};
use crate::core::sessions::SessionManager;
use crate::models::{LegacyAction, Sentiment};
use crate::source::OrderBookSource;
use crate::strategies::{Analysis, Analyzer};

pub const RESULTS_FILE: &str = "scan_results.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanCategory {
    AlertBullish,
    AlertBearish,
    Neutral,
}

/// Flat per-symbol row, the shape written to `scan_results.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    /// Alert bucket. Independent of `sentiment`, which follows the scorer thresholds.
    pub category: ScanCategory,
    pub sentiment: Sentiment,
    pub bullish_confidence: u32,
    pub bearish_confidence: u32,
    pub bullish_action: Option<LegacyAction>,
    pub bearish_action: Option<LegacyAction>,
    pub foreign_net: f64,
    /// Queue-count trend across this session's scans of the symbol.
    pub frequency: Option<FrequencyDynamics>,
    pub analysis: Analysis,
}

impl ScanResult {
    pub fn new(name: &str, foreign_net: f64, analysis: Analysis, alert_confidence: u32) -> Self {
        let bullish_confidence = analysis.bullish_confidence();
        let bearish_confidence = analysis.bearish_confidence();
        let category = if bullish_confidence > alert_confidence {
            ScanCategory::AlertBullish
        } else if bearish_confidence > alert_confidence {
            ScanCategory::AlertBearish
        } else {
            ScanCategory::Neutral
        };
        let (bullish_action, bearish_action) = match &analysis.legacy {
            Some(l) => (Some(l.accumulation.action), Some(l.distribution.action)),
            None => (None, None),
        };
        Self {
            symbol: analysis.symbol.clone(),
            name: name.to_string(),
            price: analysis.last_price,
            category,
            sentiment: analysis.sentiment(),
            bullish_confidence,
            bearish_confidence,
            bullish_action,
            bearish_action,
            foreign_net,
            frequency: None,
            analysis,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    pub timestamp: Option<DateTime<Utc>>,
    pub bullish: Vec<ScanResult>,
    pub bearish: Vec<ScanResult>,
    pub neutral: Vec<ScanResult>,
    pub failed: Vec<String>,
}

impl ScanReport {
    pub fn push(&mut self, result: ScanResult) {
        match result.category {
            ScanCategory::AlertBullish => self.bullish.push(result),
            ScanCategory::AlertBearish => self.bearish.push(result),
            ScanCategory::Neutral => self.neutral.push(result),
        }
    }

    /// Strongest first within each bucket. Neutral rows sort on bullish score.
    pub fn sort(&mut self) {
        self.bullish
            .sort_by(|a, b| b.bullish_confidence.cmp(&a.bullish_confidence));
        self.bearish
            .sort_by(|a, b| b.bearish_confidence.cmp(&a.bearish_confidence));
        self.neutral
            .sort_by(|a, b| b.bullish_confidence.cmp(&a.bullish_confidence));
    }

    pub fn scanned(&self) -> usize {
        self.bullish.len() + self.bearish.len() + self.neutral.len()
    }

    pub fn export(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(RESULTS_FILE);
        let json = serde_json::to_string_pretty(self).context("Failed to serialize scan")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn log_summary(&self) {
        let total = self.scanned() + self.failed.len();
        let pct = |n: usize| {
            if total == 0 {
                0.0
            } else {
                n as f64 / total as f64 * 100.0
            }
        };

        info!("{}", "=".repeat(60));
        info!("SCAN RESULTS");
        for r in &self.bullish {
            info!(
                "  BULLISH {:<6} {:>8.0} bull={}% fnet={}",
                r.symbol,
                r.price,
                r.bullish_confidence,
                if r.foreign_net > 0.0 { "BUY" } else { "SELL" }
            );
        }
        for r in &self.bearish {
            info!(
                "  BEARISH {:<6} {:>8.0} bear={}% fnet={}",
                r.symbol,
                r.price,
                r.bearish_confidence,
                if r.foreign_net > 0.0 { "BUY" } else { "SELL" }
            );
        }
        for r in &self.neutral {
            info!(
                "  NEUTRAL {:<6} {:>8.0} bull={}% bear={}%",
                r.symbol, r.price, r.bullish_confidence, r.bearish_confidence
            );
        }
        info!(
            "Scanned {} | bullish {} ({:.1}%) | bearish {} ({:.1}%) | neutral {} ({:.1}%) | failed {}",
            total,
            self.bullish.len(),
            pct(self.bullish.len()),
            self.bearish.len(),
            pct(self.bearish.len()),
            self.neutral.len(),
            pct(self.neutral.len()),
            self.failed.len()
        );
        info!("{}", "=".repeat(60));
    }
}

const MAX_HISTORY: usize = 60;

/// Polls a source for every configured symbol and buckets the results.
pub struct Scanner {
    config: SharedConfig,
    source: Box<dyn OrderBookSource>,
    analyzer: Analyzer,
    session: SessionManager,
    // (bid, offer) total queue counts per scan, oldest first
    queue_history: HashMap<String, (Vec<u64>, Vec<u64>)>,
}

impl Scanner {
    pub async fn new(config: SharedConfig, source: Box<dyn OrderBookSource>) -> Self {
        let cfg = config.read().await;

        info!("{}", "=".repeat(60));
        info!("IDX order-flow scanner starting up");
        info!("Strategy: {}", cfg.strategy);
        info!(
            "Thresholds: bullish>={} bearish>={} alert>{}",
            cfg.bullish_threshold, cfg.bearish_threshold, cfg.alert_confidence
        );
        info!("Symbols: {}", cfg.symbols.join(","));
        info!("{}", "=".repeat(60));

        let analyzer = Analyzer::from_config(&cfg);
        drop(cfg);

        Self {
            config,
            source,
            analyzer,
            session: SessionManager::new(),
            queue_history: HashMap::new(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let cfg = self.config.read().await.clone();
        if cfg.scan_once {
            self.scan_and_export(&cfg).await?;
            return Ok(());
        }

        info!("Scanner running every {}s. Press Ctrl+C to stop.", cfg.scan_interval);
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Scanner stopped.");
                    return Ok(());
                }
                res = self.tick() => res?,
            }
        }
    }

    async fn tick(&mut self) -> Result<()> {
        let cfg = self.config.read().await.clone();
        self.session.update(&cfg, None);

        if self.session.is_open() {
            self.scan_and_export(&cfg).await?;
        } else {
            info!("Market closed, waiting");
        }

        tokio::time::sleep(Duration::from_secs(cfg.scan_interval)).await;
        Ok(())
    }

    async fn scan_and_export(&mut self, cfg: &Config) -> Result<ScanReport> {
        let report = self.scan(cfg).await;
        report.log_summary();
        let path = report.export(Path::new(&cfg.output_dir))?;
        info!("Results exported to {}", path.display());
        Ok(report)
    }

    /// One pass over every symbol. Fetch failures are recorded, not fatal.
    pub async fn scan(&mut self, cfg: &Config) -> ScanReport {
        let mut report = ScanReport {
            timestamp: Some(Utc::now()),
            ..Default::default()
        };

        for (i, symbol) in cfg.symbols.iter().enumerate() {
            info!("[{}/{}] Analyzing {}", i + 1, cfg.symbols.len(), symbol);
            match self.source.fetch_snapshot(symbol).await {
                Ok(snapshot) => {
                    let analysis = self.analyzer.analyze(&snapshot, cfg.position_size as f64);
                    let mut result = ScanResult::new(
                        &snapshot.name,
                        snapshot.foreign_net,
                        analysis,
                        cfg.alert_confidence,
                    );
                    result.frequency = Some(self.record_queues(
                        symbol,
                        result.analysis.book.total_bid_queue,
                        result.analysis.book.total_offer_queue,
                    ));
                    report.push(result);
                }
                Err(e) => {
                    warn!("{}: {:#}", symbol, e);
                    report.failed.push(symbol.clone());
                }
            }
        }

        report.sort();
        report
    }

    fn record_queues(&mut self, symbol: &str, bid: u64, offer: u64) -> FrequencyDynamics {
        let (bids, offers) = self.queue_history.entry(symbol.to_string()).or_default();
        bids.push(bid);
        offers.push(offer);
        if bids.len() > MAX_HISTORY {
            bids.remove(0);
            offers.remove(0);
        }
        frequency_dynamics(bids, offers)
    }
}
