mod common;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

use idx_orderflow::config::Config;
use idx_orderflow::core::legacy::LegacyConfig;
use idx_orderflow::core::scorer::ScorerThresholds;
use idx_orderflow::models::{LegacyAction, MarketSnapshot, Sentiment};
use idx_orderflow::scanner::{ScanCategory, ScanReport, Scanner, RESULTS_FILE};
use idx_orderflow::source::OrderBookSource;
use idx_orderflow::strategies::{Analyzer, ScoringStrategy};

use common::{bullish_ladder, ladder, snapshot};

/// Serves canned snapshots; unknown symbols fail like a vendor 404.
struct MockSource {
    books: HashMap<String, MarketSnapshot>,
}

impl MockSource {
    fn new(snapshots: Vec<MarketSnapshot>) -> Self {
        Self {
            books: snapshots
                .into_iter()
                .map(|s| (s.symbol.clone(), s))
                .collect(),
        }
    }
}

#[async_trait]
impl OrderBookSource for MockSource {
    async fn fetch_snapshot(&mut self, symbol: &str) -> Result<MarketSnapshot> {
        self.books
            .get(symbol)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("404 for {}", symbol))
    }
}

fn test_config(symbols: &[&str], output: &str) -> Config {
    Config {
        symbols: symbols.iter().map(|s| s.to_string()).collect(),
        output_dir: std::env::temp_dir().join(output).to_string_lossy().into_owned(),
        ..Config::default()
    }
}

#[tokio::test]
async fn scanner_buckets_symbols_and_records_failures() {
    let source = MockSource::new(vec![
        snapshot("BULL", bullish_ladder()),
        snapshot("BEAR", bullish_ladder().mirrored()),
        snapshot("FLAT", ladder(&[(100, 5); 3], &[(100, 5); 3])),
    ]);
    let cfg = test_config(&["FLAT", "BULL", "NOPE", "BEAR"], "idx-orderflow-it-scan");
    let mut scanner = Scanner::new(cfg.clone().shared(), Box::new(source)).await;

    let report = scanner.scan(&cfg).await;

    assert_eq!(report.bullish.len(), 1);
    assert_eq!(report.bullish[0].symbol, "BULL");
    assert_eq!(report.bullish[0].category, ScanCategory::AlertBullish);
    assert_eq!(report.bearish.len(), 1);
    assert_eq!(report.bearish[0].bearish_confidence, 100);
    assert_eq!(report.neutral.len(), 1);
    assert_eq!(report.failed, vec!["NOPE".to_string()]);
    assert!(report.timestamp.is_some());
}

#[tokio::test]
async fn scan_report_exports_json() {
    let source = MockSource::new(vec![snapshot("BULL", bullish_ladder())]);
    let cfg = test_config(&["BULL"], "idx-orderflow-it-export");
    let mut scanner = Scanner::new(cfg.clone().shared(), Box::new(source)).await;

    let report = scanner.scan(&cfg).await;
    let path = report.export(std::path::Path::new(&cfg.output_dir)).unwrap();
    assert!(path.ends_with(RESULTS_FILE));

    let loaded: ScanReport =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(loaded.bullish.len(), 1);
    assert_eq!(loaded.bullish[0].analysis.entries.stages.len(), 3);
}

#[tokio::test]
async fn legacy_strategy_reports_actions() {
    let mut snap = snapshot(
        "BBRI",
        ladder(
            &[(515, 0), (12836, 63), (24618, 110), (50627, 138), (16426, 133)],
            &[(47079, 0), (29127, 202), (73236, 204), (82845, 377), (88305, 704)],
        ),
    );
    snap.foreign_buy = 75_000_000_000.0;
    snap.foreign_sell = 10_000_000_000.0;
    snap.foreign_net = 65_000_000_000.0;

    let mut cfg = test_config(&["BBRI"], "idx-orderflow-it-legacy");
    cfg.strategy = ScoringStrategy::Legacy;
    let mut scanner = Scanner::new(cfg.clone().shared(), Box::new(MockSource::new(vec![snap]))).await;

    let report = scanner.scan(&cfg).await;
    let row = &report.bullish[0];
    assert_eq!(row.bullish_confidence, 100);
    assert_eq!(row.bullish_action, Some(LegacyAction::BuyStrong));
    assert!(row.analysis.sentiment.is_none());
}

#[test]
fn facade_entry_points_agree_with_analysis() {
    let analyzer = Analyzer::new(
        ScoringStrategy::Both,
        ScorerThresholds::default(),
        LegacyConfig::default(),
    );
    let ladder = bullish_ladder();

    let verdict = analyzer.evaluate_sentiment(&ladder);
    assert_eq!(verdict.sentiment, Sentiment::Bullish);
    assert_eq!(verdict.rules_evaluated, 6);

    let (bull, bear) = analyzer.evaluate_legacy_patterns(&ladder, 0.0, None, &[]);
    assert!(bull.confidence <= 100);
    assert!(bear.confidence <= 100);

    let plan = analyzer.plan_entries(85, &ladder.bids, 100.0);
    assert_eq!(plan.stages.len(), 2);

    let exit = analyzer.plan_exit(872.0, 880.0, 8.0, 100.0).unwrap();
    assert!((exit.active_stop - 865.024).abs() < 1e-9);
    assert!(analyzer.plan_exit(-1.0, 880.0, 8.0, 100.0).is_err());
}

#[test]
fn verdict_serializes_typed_diagnostics() {
    let verdict = Analyzer::default().evaluate_sentiment(&bullish_ladder());
    let json = serde_json::to_value(&verdict).unwrap();
    assert_eq!(json["sentiment"], "BULLISH");
    assert_eq!(json["rules"]["direction"], "bullish");
    assert_eq!(json["rules"]["results"][2]["diagnostics"]["kind"], "evenness");
}

#[tokio::test]
async fn repeated_scans_track_queue_counts() {
    let source = MockSource::new(vec![snapshot("BULL", bullish_ladder())]);
    let cfg = test_config(&["BULL"], "idx-orderflow-it-queues");
    let mut scanner = Scanner::new(cfg.clone().shared(), Box::new(source)).await;

    scanner.scan(&cfg).await;
    let report = scanner.scan(&cfg).await;
    let dynamics = report.bullish[0].frequency.unwrap();
    // Five single-order bid levels, two scans
    assert_eq!(dynamics.bid.recent, 10);
    assert_eq!(dynamics.offer.recent, 400);
}
