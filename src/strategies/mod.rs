use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::Config;
use crate::core::book_summary::{idx_tick_size, BookSummary};
use crate::core::legacy::{LegacyConfig, LegacyPatternDetector, LegacyPatternResult};
use crate::core::scorer::{ScorerThresholds, SentimentScorer, SentimentVerdict};
use crate::models::{LadderSide, MarketSnapshot, OrderBookLadder, Sentiment};
use crate::planning::{self, ExitPlan, PlanError, StagedEntryPlan};

/// Which scoring engine(s) an `Analyzer` runs. The two scales are unrelated
/// and never blended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    SixRule,
    Legacy,
    Both,
}

impl ScoringStrategy {
    pub fn runs_six_rule(self) -> bool {
        matches!(self, ScoringStrategy::SixRule | ScoringStrategy::Both)
    }

    pub fn runs_legacy(self) -> bool {
        matches!(self, ScoringStrategy::Legacy | ScoringStrategy::Both)
    }
}

impl fmt::Display for ScoringStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringStrategy::SixRule => write!(f, "six_rule"),
            ScoringStrategy::Legacy => write!(f, "legacy"),
            ScoringStrategy::Both => write!(f, "both"),
        }
    }
}

impl FromStr for ScoringStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "six_rule" | "sixrule" | "6rule" => Ok(ScoringStrategy::SixRule),
            "legacy" => Ok(ScoringStrategy::Legacy),
            "both" => Ok(ScoringStrategy::Both),
            other => Err(format!("unknown strategy: {}", other)),
        }
    }
}

/// Aggressive-trade and net-flow inputs for the legacy detectors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyInputs {
    pub aggressive_buy: f64,
    pub aggressive_sell: Option<f64>,
    pub net_flow: Vec<f64>,
}

impl LegacyInputs {
    /// The vendor feed carries no HAKA/HAKI split, so foreign buy/sell value
    /// (millions) stands in for it, and foreign net value (billions) decayed
    /// over three days stands in for the net-flow series.
    pub fn from_snapshot(snapshot: &MarketSnapshot) -> Self {
        let fnet = snapshot.foreign_net / 1e9;
        Self {
            aggressive_buy: snapshot.foreign_buy / 1e6,
            aggressive_sell: Some(snapshot.foreign_sell / 1e6),
            net_flow: vec![fnet, fnet * 0.8, fnet * 0.6],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyVerdict {
    pub accumulation: LegacyPatternResult,
    pub distribution: LegacyPatternResult,
}

/// Everything the analyzer produced for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub symbol: String,
    pub last_price: f64,
    pub strategy: ScoringStrategy,
    pub sentiment: Option<SentimentVerdict>,
    pub legacy: Option<LegacyVerdict>,
    pub entries: StagedEntryPlan,
    pub book: BookSummary,
}

impl Analysis {
    /// Six-rule score when it ran, otherwise the accumulation score.
    pub fn bullish_confidence(&self) -> u32 {
        match (&self.sentiment, &self.legacy) {
            (Some(v), _) => v.bullish_confidence,
            (None, Some(l)) => l.accumulation.confidence,
            (None, None) => 0,
        }
    }

    pub fn bearish_confidence(&self) -> u32 {
        match (&self.sentiment, &self.legacy) {
            (Some(v), _) => v.bearish_confidence,
            (None, Some(l)) => l.distribution.confidence,
            (None, None) => 0,
        }
    }

    pub fn sentiment(&self) -> Sentiment {
        self.sentiment
            .as_ref()
            .map_or(Sentiment::Neutral, |v| v.sentiment)
    }
}

/// Entry point for collaborators. Holds the immutable scorer configuration.
#[derive(Debug, Clone)]
pub struct Analyzer {
    strategy: ScoringStrategy,
    scorer: SentimentScorer,
    legacy: LegacyPatternDetector,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(
            ScoringStrategy::SixRule,
            ScorerThresholds::default(),
            LegacyConfig::default(),
        )
    }
}

impl Analyzer {
    pub fn new(strategy: ScoringStrategy, thresholds: ScorerThresholds, legacy: LegacyConfig) -> Self {
        Self {
            strategy,
            scorer: SentimentScorer::new(thresholds),
            legacy: LegacyPatternDetector::new(legacy),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.strategy, cfg.scorer_thresholds(), cfg.legacy_config())
    }

    pub fn evaluate_sentiment(&self, ladder: &OrderBookLadder) -> SentimentVerdict {
        self.scorer.evaluate(ladder)
    }

    pub fn evaluate_legacy_patterns(
        &self,
        ladder: &OrderBookLadder,
        aggressive_buy: f64,
        aggressive_sell: Option<f64>,
        net_flow: &[f64],
    ) -> (LegacyPatternResult, LegacyPatternResult) {
        self.legacy
            .evaluate(ladder, aggressive_buy, aggressive_sell, net_flow)
    }

    pub fn plan_entries(
        &self,
        confidence: u32,
        bids: &LadderSide,
        position_size: f64,
    ) -> StagedEntryPlan {
        planning::plan_entries(confidence, bids, position_size)
    }

    pub fn plan_exit(
        &self,
        entry_price: f64,
        current_price: f64,
        atr: f64,
        position_size: f64,
    ) -> Result<ExitPlan, PlanError> {
        planning::plan_exit(entry_price, current_price, atr, position_size)
    }

    /// Run the configured strategy over a snapshot and stage entries off the
    /// bullish score.
    pub fn analyze(&self, snapshot: &MarketSnapshot, position_size: f64) -> Analysis {
        let ladder = &snapshot.ladder;

        let sentiment = self
            .strategy
            .runs_six_rule()
            .then(|| self.evaluate_sentiment(ladder));

        let legacy = self.strategy.runs_legacy().then(|| {
            let inputs = LegacyInputs::from_snapshot(snapshot);
            let (accumulation, distribution) = self.evaluate_legacy_patterns(
                ladder,
                inputs.aggressive_buy,
                inputs.aggressive_sell,
                &inputs.net_flow,
            );
            LegacyVerdict {
                accumulation,
                distribution,
            }
        });

        let mut analysis = Analysis {
            symbol: snapshot.symbol.clone(),
            last_price: snapshot.last_price,
            strategy: self.strategy,
            sentiment,
            legacy,
            entries: StagedEntryPlan::default(),
            book: BookSummary::from_ladder(ladder, idx_tick_size(snapshot.last_price)),
        };
        analysis.entries =
            self.plan_entries(analysis.bullish_confidence(), &ladder.bids, position_size);
        analysis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{bearish_ladder, bullish_ladder, make_snapshot};

    #[test]
    fn strategy_parses_from_env_strings() {
        assert_eq!("six_rule".parse::<ScoringStrategy>(), Ok(ScoringStrategy::SixRule));
        assert_eq!(" LEGACY ".parse::<ScoringStrategy>(), Ok(ScoringStrategy::Legacy));
        assert_eq!("both".parse::<ScoringStrategy>(), Ok(ScoringStrategy::Both));
        assert!("fancy".parse::<ScoringStrategy>().is_err());
    }

    #[test]
    fn six_rule_analysis_stages_entries() {
        let analyzer = Analyzer::default();
        let a = analyzer.analyze(&make_snapshot("BBCA", bullish_ladder()), 100.0);
        assert_eq!(a.sentiment(), Sentiment::Bullish);
        assert!(a.legacy.is_none());
        assert_eq!(a.bullish_confidence(), 100);
        // Five bid levels at confidence 100 -> all three stages
        assert_eq!(a.entries.stages.len(), 3);
    }

    #[test]
    fn legacy_only_analysis_has_no_six_rule_verdict() {
        let analyzer = Analyzer::new(
            ScoringStrategy::Legacy,
            ScorerThresholds::default(),
            LegacyConfig::default(),
        );
        let a = analyzer.analyze(&make_snapshot("TLKM", bearish_ladder()), 100.0);
        assert!(a.sentiment.is_none());
        let legacy = a.legacy.as_ref().unwrap();
        assert_eq!(a.bearish_confidence(), legacy.distribution.confidence);
        assert_eq!(a.sentiment(), Sentiment::Neutral);
    }

    #[test]
    fn both_strategies_report_side_by_side() {
        let analyzer = Analyzer::new(
            ScoringStrategy::Both,
            ScorerThresholds::default(),
            LegacyConfig::default(),
        );
        let a = analyzer.analyze(&make_snapshot("ASII", bearish_ladder()), 100.0);
        assert!(a.sentiment.is_some());
        assert!(a.legacy.is_some());
        assert_eq!(a.bearish_confidence(), 100);
    }

    #[test]
    fn legacy_inputs_scale_foreign_flow() {
        let mut snap = make_snapshot("BBRI", bullish_ladder());
        snap.foreign_buy = 80_000_000_000.0;
        snap.foreign_sell = 20_000_000_000.0;
        snap.foreign_net = 60_000_000_000.0;
        let inputs = LegacyInputs::from_snapshot(&snap);
        assert!((inputs.aggressive_buy - 80_000.0).abs() < 1e-6);
        assert_eq!(inputs.aggressive_sell, Some(20_000.0));
        assert!((inputs.net_flow[0] - 60.0).abs() < 1e-9);
        assert!((inputs.net_flow[2] - 36.0).abs() < 1e-9);
    }
}
