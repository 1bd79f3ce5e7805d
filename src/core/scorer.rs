use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::rules::{self, RuleSet};
use crate::models::{OrderBookLadder, RuleDirection, Sentiment};

pub const DEFAULT_BULLISH_THRESHOLD: u32 = 80;
pub const DEFAULT_BEARISH_THRESHOLD: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorerThresholds {
    pub bullish: u32,
    pub bearish: u32,
}

impl Default for ScorerThresholds {
    fn default() -> Self {
        Self {
            bullish: DEFAULT_BULLISH_THRESHOLD,
            bearish: DEFAULT_BEARISH_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentVerdict {
    pub sentiment: Sentiment,
    /// Confidence of the reported side (the larger of the two for NEUTRAL).
    pub confidence: u32,
    pub bullish_confidence: u32,
    pub bearish_confidence: u32,
    /// Rules that produced a pass/fail on the reported side. Lets callers tell a
    /// genuinely low score from a data-starved one.
    pub rules_evaluated: usize,
    pub thresholds: ScorerThresholds,
    pub rules: RuleSet,
    pub bullish_rules: RuleSet,
    pub bearish_rules: RuleSet,
}

/// Dual-direction six-rule scorer. Thresholds are fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct SentimentScorer {
    thresholds: ScorerThresholds,
}

impl SentimentScorer {
    pub fn new(thresholds: ScorerThresholds) -> Self {
        Self { thresholds }
    }

    pub fn evaluate(&self, ladder: &OrderBookLadder) -> SentimentVerdict {
        let bullish_rules = rules::evaluate_all(ladder, RuleDirection::Bullish);
        let bearish_rules = rules::evaluate_all(ladder, RuleDirection::Bearish);
        let bullish_confidence = bullish_rules.confidence();
        let bearish_confidence = bearish_rules.confidence();

        let (sentiment, confidence, rules) = if bullish_confidence >= self.thresholds.bullish {
            (Sentiment::Bullish, bullish_confidence, bullish_rules.clone())
        } else if bearish_confidence >= self.thresholds.bearish {
            (Sentiment::Bearish, bearish_confidence, bearish_rules.clone())
        } else if bullish_confidence >= bearish_confidence {
            (Sentiment::Neutral, bullish_confidence, bullish_rules.clone())
        } else {
            (Sentiment::Neutral, bearish_confidence, bearish_rules.clone())
        };

        debug!(
            "Sentiment {} ({}) | bull={} bear={} | rules evaluated {}/{}",
            sentiment,
            confidence,
            bullish_confidence,
            bearish_confidence,
            rules.evaluated_count(),
            rules.results.len()
        );

        SentimentVerdict {
            sentiment,
            confidence,
            bullish_confidence,
            bearish_confidence,
            rules_evaluated: rules.evaluated_count(),
            thresholds: self.thresholds,
            rules,
            bullish_rules,
            bearish_rules,
        }
    }
}
