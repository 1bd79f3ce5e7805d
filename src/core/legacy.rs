use serde::{Deserialize, Serialize};

use crate::models::{LegacyAction, LegacyPattern, OrderBookLadder};

const ACCUMULATION_DEPTH: usize = 5;
const DISTRIBUTION_SUM_DEPTH: usize = 10;
const DISTRIBUTION_LEVEL_DEPTH: usize = 5;
const MIN_DOMINANT_LEVELS: usize = 3;
const DISTRIBUTION_SKEW: f64 = 1.75;
/// Shortest net-flow series either detector will read.
const MIN_FLOW_SERIES: usize = 2;
const MIN_NEGATIVE_DAYS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegacyConfig {
    /// HAKA volume counted as "large" aggressive buying.
    pub large_volume: f64,
    /// Positive net-flow days needed for the accumulation flow bonus.
    pub min_multi_day: usize,
}

impl Default for LegacyConfig {
    fn default() -> Self {
        Self {
            large_volume: 50_000.0,
            min_multi_day: 2,
        }
    }
}

/// A component that fired, with the value that made it fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum LegacySignal {
    OfferVolumeHeavy { ratio: f64 },
    OfferFrequencyHeavy { ratio: f64 },
    BidVolumeThin { bid: u64, offer: u64 },
    BidFrequencyThin { bid: u64, offer: u64 },
    /// Offer beats bid on both volume and frequency.
    RedFlag,
    AggressiveBuyHigh { volume: f64 },
    /// Bearish-side fallback when no aggressive-sell figure is known.
    AggressiveBuyOnly { volume: f64 },
    PositiveNetFlow { days: usize, of: usize },
    BidVolumeLevelsDominant { levels: usize },
    BidVolumeStrength { ratio: f64 },
    BidFrequencyLevelsDominant { levels: usize },
    BidFrequencyStrength { ratio: f64 },
    AggressiveBuyDominance { ratio: f64 },
    NegativeNetFlow { days: usize, of: usize },
}

impl LegacySignal {
    pub fn points(&self) -> u32 {
        match self {
            LegacySignal::OfferVolumeHeavy { .. } => 20,
            LegacySignal::OfferFrequencyHeavy { .. } => 15,
            LegacySignal::BidVolumeThin { .. } => 20,
            LegacySignal::BidFrequencyThin { .. } => 20,
            LegacySignal::RedFlag => 25,
            LegacySignal::AggressiveBuyHigh { .. } => 15,
            LegacySignal::AggressiveBuyOnly { .. } => 10,
            LegacySignal::PositiveNetFlow { .. } => 5,
            LegacySignal::BidVolumeLevelsDominant { .. } => 20,
            LegacySignal::BidVolumeStrength { .. } => 25,
            LegacySignal::BidFrequencyLevelsDominant { .. } => 20,
            LegacySignal::BidFrequencyStrength { .. } => 25,
            LegacySignal::AggressiveBuyDominance { .. } => 15,
            LegacySignal::NegativeNetFlow { .. } => 15,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LegacySignal::OfferVolumeHeavy { .. } => "offer_volume",
            LegacySignal::OfferFrequencyHeavy { .. } => "offer_frequency",
            LegacySignal::BidVolumeThin { .. } => "bid_volume",
            LegacySignal::BidFrequencyThin { .. } => "bid_frequency",
            LegacySignal::RedFlag => "RED_FLAG",
            LegacySignal::AggressiveBuyHigh { .. } | LegacySignal::AggressiveBuyOnly { .. } => {
                "haka_activity"
            }
            LegacySignal::PositiveNetFlow { .. } => "multi_day_flow",
            LegacySignal::BidVolumeLevelsDominant { .. } => "bid_vol_per_tick",
            LegacySignal::BidVolumeStrength { .. } => "bid_vol_strength",
            LegacySignal::BidFrequencyLevelsDominant { .. } => "bid_freq_per_tick",
            LegacySignal::BidFrequencyStrength { .. } => "bid_freq_strength",
            LegacySignal::AggressiveBuyDominance { .. } => "haka_dominance",
            LegacySignal::NegativeNetFlow { .. } => "net_flow",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyPatternResult {
    pub pattern: LegacyPattern,
    /// Clamped to 100.
    pub confidence: u32,
    /// Sum of fired component points before clamping.
    pub raw_score: u32,
    pub signals: Vec<LegacySignal>,
    pub action: LegacyAction,
    pub description: String,
}

impl LegacyPatternResult {
    fn build(pattern: LegacyPattern, signals: Vec<LegacySignal>) -> Self {
        let raw_score: u32 = signals.iter().map(|s| s.points()).sum();
        let confidence = raw_score.min(100);
        let (action, description) = match pattern {
            LegacyPattern::BullishAccumulation => (
                LegacyAction::for_bullish(confidence),
                "Buyers accumulating against a thick offer - breakout up likely",
            ),
            LegacyPattern::BearishDistribution => (
                LegacyAction::for_bearish(confidence),
                "Sellers distributing into bids - strong bearish pressure",
            ),
        };
        Self {
            pattern,
            confidence,
            raw_score,
            signals,
            action,
            description: description.to_string(),
        }
    }

    pub fn has_signal(&self, name: &str) -> bool {
        self.signals.iter().any(|s| s.name() == name)
    }
}

/// Older five-pattern scoring scheme, driven by top-of-book totals, HAKA/HAKI
/// aggressive volume and a short net-flow series. Its scale is unrelated to the
/// six-rule scorer; the two results must not be mixed.
#[derive(Debug, Clone, Default)]
pub struct LegacyPatternDetector {
    config: LegacyConfig,
}

impl LegacyPatternDetector {
    pub fn new(config: LegacyConfig) -> Self {
        Self { config }
    }

    /// Run both detectors. They are independent and can both score high.
    pub fn evaluate(
        &self,
        ladder: &OrderBookLadder,
        aggressive_buy: f64,
        aggressive_sell: Option<f64>,
        net_flow: &[f64],
    ) -> (LegacyPatternResult, LegacyPatternResult) {
        (
            self.detect_accumulation(ladder, aggressive_buy, net_flow),
            self.detect_distribution(ladder, aggressive_buy, aggressive_sell, net_flow),
        )
    }

    pub fn detect_accumulation(
        &self,
        ladder: &OrderBookLadder,
        aggressive_buy: f64,
        net_flow: &[f64],
    ) -> LegacyPatternResult {
        let bid_vol = ladder.bids.volume_sum(ACCUMULATION_DEPTH);
        let offer_vol = ladder.offers.volume_sum(ACCUMULATION_DEPTH);
        let bid_freq = ladder.bids.frequency_sum(ACCUMULATION_DEPTH);
        let offer_freq = ladder.offers.frequency_sum(ACCUMULATION_DEPTH);

        let mut signals = Vec::new();

        if let Some(ratio) = ratio(offer_vol, bid_vol) {
            if ratio > 1.3 {
                signals.push(LegacySignal::OfferVolumeHeavy { ratio });
            }
        }

        if let Some(ratio) = ratio(offer_freq, bid_freq) {
            if ratio > 1.2 {
                signals.push(LegacySignal::OfferFrequencyHeavy { ratio });
            }
        }

        if (bid_vol as f64) < offer_vol as f64 * 0.8 {
            signals.push(LegacySignal::BidVolumeThin {
                bid: bid_vol,
                offer: offer_vol,
            });
        }

        if (bid_freq as f64) < offer_freq as f64 * 0.85 {
            signals.push(LegacySignal::BidFrequencyThin {
                bid: bid_freq,
                offer: offer_freq,
            });
        }

        if offer_vol > bid_vol && offer_freq > bid_freq {
            signals.push(LegacySignal::RedFlag);
        }

        if aggressive_buy > self.config.large_volume {
            signals.push(LegacySignal::AggressiveBuyHigh {
                volume: aggressive_buy,
            });
        }

        let days = net_flow.iter().filter(|&&f| f > 0.0).count();
        if net_flow.len() >= MIN_FLOW_SERIES && days >= self.config.min_multi_day {
            signals.push(LegacySignal::PositiveNetFlow {
                days,
                of: net_flow.len(),
            });
        }

        LegacyPatternResult::build(LegacyPattern::BullishAccumulation, signals)
    }

    pub fn detect_distribution(
        &self,
        ladder: &OrderBookLadder,
        aggressive_buy: f64,
        aggressive_sell: Option<f64>,
        net_flow: &[f64],
    ) -> LegacyPatternResult {
        let bids = ladder.bids.top(DISTRIBUTION_LEVEL_DEPTH);
        let offers = ladder.offers.top(DISTRIBUTION_LEVEL_DEPTH);

        let mut signals = Vec::new();

        let vol_levels = bids
            .iter()
            .zip(offers)
            .filter(|(b, o)| b.volume > o.volume)
            .count();
        if vol_levels >= MIN_DOMINANT_LEVELS {
            signals.push(LegacySignal::BidVolumeLevelsDominant { levels: vol_levels });
        }

        let bid_vol = ladder.bids.volume_sum(DISTRIBUTION_SUM_DEPTH);
        let offer_vol = ladder.offers.volume_sum(DISTRIBUTION_SUM_DEPTH);
        if let Some(ratio) = ratio(bid_vol, offer_vol) {
            if ratio > DISTRIBUTION_SKEW {
                signals.push(LegacySignal::BidVolumeStrength { ratio });
            }
        }

        let freq_levels = bids
            .iter()
            .zip(offers)
            .filter(|(b, o)| b.frequency > o.frequency)
            .count();
        if freq_levels >= MIN_DOMINANT_LEVELS {
            signals.push(LegacySignal::BidFrequencyLevelsDominant {
                levels: freq_levels,
            });
        }

        let bid_freq = ladder.bids.frequency_sum(DISTRIBUTION_SUM_DEPTH);
        let offer_freq = ladder.offers.frequency_sum(DISTRIBUTION_SUM_DEPTH);
        if let Some(ratio) = ratio(bid_freq, offer_freq) {
            if ratio > DISTRIBUTION_SKEW {
                signals.push(LegacySignal::BidFrequencyStrength { ratio });
            }
        }

        match aggressive_sell.filter(|&s| s > 0.0) {
            Some(sell) => {
                if aggressive_buy > sell {
                    signals.push(LegacySignal::AggressiveBuyDominance {
                        ratio: aggressive_buy / sell,
                    });
                }
            }
            None => {
                if aggressive_buy > self.config.large_volume {
                    signals.push(LegacySignal::AggressiveBuyOnly {
                        volume: aggressive_buy,
                    });
                }
            }
        }

        let days = net_flow.iter().filter(|&&f| f < 0.0).count();
        if net_flow.len() >= MIN_FLOW_SERIES && days >= MIN_NEGATIVE_DAYS {
            signals.push(LegacySignal::NegativeNetFlow {
                days,
                of: net_flow.len(),
            });
        }

        LegacyPatternResult::build(LegacyPattern::BearishDistribution, signals)
    }
}

/// `num / den`, or `None` when either side is empty.
fn ratio(num: u64, den: u64) -> Option<f64> {
    if num == 0 || den == 0 {
        None
    } else {
        Some(num as f64 / den as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ladder_from_levels;

    fn detector() -> LegacyPatternDetector {
        LegacyPatternDetector::default()
    }

    #[test]
    fn sample_book_accumulation() {
        let ladder = ladder_from_levels(
            &[(515, 0), (12836, 63), (24618, 110), (50627, 138), (16426, 133)],
            &[(47079, 0), (29127, 202), (73236, 204), (82845, 377), (88305, 704)],
        );
        let r = detector().detect_accumulation(&ladder, 75_000.0, &[1.5, 1.2, 0.9]);
        // Every component fires: 20+15+20+20+25+15+5 = 120, clamped
        assert_eq!(r.raw_score, 120);
        assert_eq!(r.confidence, 100);
        assert_eq!(r.action, LegacyAction::BuyStrong);
        assert!(r.has_signal("RED_FLAG"));
        assert_eq!(r.pattern, LegacyPattern::BullishAccumulation);
    }

    #[test]
    fn red_flag_requires_both_strict() {
        // Offer volume wins, frequency ties
        let ladder = ladder_from_levels(&[(100, 10)], &[(200, 10)]);
        let r = detector().detect_accumulation(&ladder, 0.0, &[]);
        assert!(!r.has_signal("RED_FLAG"));

        // Both win by a hair; ratios too small for the other components
        let ladder = ladder_from_levels(&[(100, 10)], &[(101, 11)]);
        let r = detector().detect_accumulation(&ladder, 0.0, &[]);
        assert!(r.has_signal("RED_FLAG"));
        assert_eq!(r.signals.len(), 1);
        assert_eq!(r.confidence, 25);
        assert_eq!(r.action, LegacyAction::Skip);
    }

    #[test]
    fn accumulation_ignores_levels_past_five() {
        let ladder = ladder_from_levels(
            &[(100, 10), (100, 10), (100, 10), (100, 10), (100, 10), (1_000_000, 1000)],
            &[(100, 10); 5],
        );
        let r = detector().detect_accumulation(&ladder, 0.0, &[]);
        assert_eq!(r.confidence, 0);
    }

    #[test]
    fn net_flow_needs_two_entries() {
        let ladder = ladder_from_levels(&[(100, 10)], &[(100, 10)]);
        let r = detector().detect_accumulation(&ladder, 0.0, &[5.0]);
        assert!(!r.has_signal("multi_day_flow"));
        let r = detector().detect_accumulation(&ladder, 0.0, &[5.0, -1.0, 2.0]);
        assert!(r.has_signal("multi_day_flow"));
        assert_eq!(r.confidence, 5);
    }

    #[test]
    fn single_day_flow_is_ignored_even_with_low_minimum() {
        let d = LegacyPatternDetector::new(LegacyConfig {
            min_multi_day: 1,
            ..LegacyConfig::default()
        });
        let ladder = ladder_from_levels(&[(100, 10)], &[(100, 10)]);
        assert!(!d.detect_accumulation(&ladder, 0.0, &[5.0]).has_signal("multi_day_flow"));
        let r = d.detect_accumulation(&ladder, 0.0, &[5.0, -1.0]);
        assert!(r.has_signal("multi_day_flow"));

        // The bearish side always wants two negative days
        let r = d.detect_distribution(&ladder, 0.0, None, &[-1.0, 2.0]);
        assert!(!r.has_signal("net_flow"));
        let r = d.detect_distribution(&ladder, 0.0, None, &[-1.0, -2.0]);
        assert!(r.has_signal("net_flow"));
    }

    #[test]
    fn distribution_full_house() {
        let ladder = ladder_from_levels(
            &[(5000, 50), (5000, 50), (5000, 50), (5000, 50), (5000, 50)],
            &[(1000, 10), (1000, 10), (1000, 10), (1000, 10), (1000, 10)],
        );
        let r = detector().detect_distribution(&ladder, 80_000.0, Some(40_000.0), &[-1.0, -2.0, 0.5]);
        // 20+25+20+25+15+15 = 120
        assert_eq!(r.raw_score, 120);
        assert_eq!(r.confidence, 100);
        assert_eq!(r.action, LegacyAction::ImmediateExit);
        assert!(r.has_signal("haka_dominance"));
        assert!(r.has_signal("net_flow"));
    }

    #[test]
    fn distribution_strength_is_strict() {
        // 175 / 100 = 1.75, not greater
        let ladder = ladder_from_levels(&[(175, 1)], &[(100, 1)]);
        let r = detector().detect_distribution(&ladder, 0.0, None, &[]);
        assert!(!r.has_signal("bid_vol_strength"));
        let ladder = ladder_from_levels(&[(176, 1)], &[(100, 1)]);
        let r = detector().detect_distribution(&ladder, 0.0, None, &[]);
        assert!(r.has_signal("bid_vol_strength"));
    }

    #[test]
    fn haka_fallback_has_reduced_weight() {
        let ladder = ladder_from_levels(&[(100, 1)], &[(100, 1)]);
        let r = detector().detect_distribution(&ladder, 60_000.0, None, &[]);
        assert!(r.has_signal("haka_activity"));
        assert_eq!(r.confidence, 10);
        assert_eq!(r.action, LegacyAction::Monitor);

        // A sell figure present but larger than buy awards nothing
        let r = detector().detect_distribution(&ladder, 60_000.0, Some(90_000.0), &[]);
        assert_eq!(r.confidence, 0);
    }

    #[test]
    fn detectors_are_not_exclusive() {
        // Thin offers on volume, heavy offers on frequency
        let ladder = ladder_from_levels(
            &[(9000, 1), (9000, 1), (9000, 1), (9000, 1), (9000, 1)],
            &[(1000, 90), (1000, 90), (1000, 90), (1000, 90), (1000, 90)],
        );
        let (bull, bear) = detector().evaluate(&ladder, 0.0, None, &[]);
        assert!(bull.confidence > 0);
        assert!(bear.confidence > 0);
    }
}
