use serde::{Deserialize, Serialize};

use crate::models::{BookSide, LadderSide, OrderBookLadder, RuleDirection};

/// Depth used by the "top N" aggregates.
pub const TOP_DEPTH: usize = 10;
/// Minimum levels on the tested side before the evenness rule can run.
pub const EVENNESS_MIN_LEVELS: usize = 5;
/// Levels above this fraction of the best level are treated as walls and excluded.
const WALL_FRACTION: f64 = 0.8;
const EVENNESS_PASS_RATIO: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    TopVolumeSum,
    BestLevelVolume,
    LadderEvenness,
    TopFrequencySum,
    TotalVolume,
    TotalFrequency,
}

impl RuleId {
    pub const ALL: [RuleId; 6] = [
        RuleId::TopVolumeSum,
        RuleId::BestLevelVolume,
        RuleId::LadderEvenness,
        RuleId::TopFrequencySum,
        RuleId::TotalVolume,
        RuleId::TotalFrequency,
    ];

    pub fn number(self) -> u8 {
        match self {
            RuleId::TopVolumeSum => 1,
            RuleId::BestLevelVolume => 2,
            RuleId::LadderEvenness => 3,
            RuleId::TopFrequencySum => 4,
            RuleId::TotalVolume => 5,
            RuleId::TotalFrequency => 6,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RuleId::TopVolumeSum => "Top 10 summed volume",
            RuleId::BestLevelVolume => "Best level volume",
            RuleId::LadderEvenness => "Ladder evenness",
            RuleId::TopFrequencySum => "Top 10 summed frequency",
            RuleId::TotalVolume => "All-level volume",
            RuleId::TotalFrequency => "All-level frequency",
        }
    }

    /// Points awarded when the rule passes. The six weights sum to 100.
    pub fn weight(self) -> u32 {
        match self {
            RuleId::TopVolumeSum => 15,
            RuleId::BestLevelVolume => 20,
            RuleId::LadderEvenness => 30,
            RuleId::TopFrequencySum => 15,
            RuleId::TotalVolume => 10,
            RuleId::TotalFrequency => 10,
        }
    }

    fn skew(self) -> f64 {
        match self {
            RuleId::BestLevelVolume => 1.8,
            _ => 2.0,
        }
    }

    fn aggregate_label(self) -> &'static str {
        match self {
            RuleId::TopVolumeSum => "top10_volume",
            RuleId::BestLevelVolume => "best_volume",
            RuleId::LadderEvenness => "top10_volumes",
            RuleId::TopFrequencySum => "top10_frequency",
            RuleId::TotalVolume => "all_volume",
            RuleId::TotalFrequency => "all_frequency",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOutcome {
    Passed,
    Failed,
    /// Inputs were missing or too short; contributes 0 points.
    NotEvaluated,
}

/// Explainability payload. Never read by the scoring logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleDiagnostics {
    Comparison {
        weak_side: BookSide,
        weak: u64,
        strong: u64,
        skew: f64,
        condition: String,
        calculation: String,
    },
    Evenness {
        side: BookSide,
        top_volume: u64,
        threshold: f64,
        considered: Vec<u64>,
        remaining: Vec<u64>,
        mean: f64,
        count_above_mean: usize,
        ratio: f64,
        condition: String,
    },
    Insufficient {
        side: BookSide,
        required: usize,
        available: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    pub rule: RuleId,
    pub name: String,
    pub direction: RuleDirection,
    pub outcome: RuleOutcome,
    pub points: u32,
    pub diagnostics: RuleDiagnostics,
}

impl RuleResult {
    fn new(
        rule: RuleId,
        direction: RuleDirection,
        outcome: RuleOutcome,
        diagnostics: RuleDiagnostics,
    ) -> Self {
        let points = if outcome == RuleOutcome::Passed {
            rule.weight()
        } else {
            0
        };
        Self {
            rule,
            name: rule.name().to_string(),
            direction,
            outcome,
            points,
            diagnostics,
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome == RuleOutcome::Passed
    }

    pub fn evaluated(&self) -> bool {
        self.outcome != RuleOutcome::NotEvaluated
    }
}

/// All six rule results for one direction, in rule order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub direction: RuleDirection,
    pub results: Vec<RuleResult>,
}

impl RuleSet {
    pub fn confidence(&self) -> u32 {
        self.results.iter().map(|r| r.points).sum()
    }

    pub fn evaluated_count(&self) -> usize {
        self.results.iter().filter(|r| r.evaluated()).count()
    }

    pub fn get(&self, rule: RuleId) -> Option<&RuleResult> {
        self.results.iter().find(|r| r.rule == rule)
    }
}

/// (weak, strong) sides for a direction. A rule passes when the weak side is clearly
/// dominated by the strong side.
fn sides(
    ladder: &OrderBookLadder,
    direction: RuleDirection,
) -> ((BookSide, &LadderSide), (BookSide, &LadderSide)) {
    match direction {
        RuleDirection::Bullish => (
            (BookSide::Bid, &ladder.bids),
            (BookSide::Offer, &ladder.offers),
        ),
        RuleDirection::Bearish => (
            (BookSide::Offer, &ladder.offers),
            (BookSide::Bid, &ladder.bids),
        ),
    }
}

pub fn evaluate_all(ladder: &OrderBookLadder, direction: RuleDirection) -> RuleSet {
    RuleSet {
        direction,
        results: RuleId::ALL
            .iter()
            .map(|&rule| evaluate_rule(rule, ladder, direction))
            .collect(),
    }
}

pub fn evaluate_rule(rule: RuleId, ladder: &OrderBookLadder, direction: RuleDirection) -> RuleResult {
    match rule {
        RuleId::LadderEvenness => evenness_rule(ladder, direction),
        _ => comparison_rule(rule, ladder, direction),
    }
}

fn aggregate(rule: RuleId, side: &LadderSide) -> u64 {
    match rule {
        RuleId::TopVolumeSum => side.volume_sum(TOP_DEPTH),
        RuleId::BestLevelVolume => side.best().map_or(0, |l| l.volume),
        RuleId::TopFrequencySum => side.frequency_sum(TOP_DEPTH),
        RuleId::TotalVolume => side.total_volume(),
        RuleId::TotalFrequency => side.total_frequency(),
        RuleId::LadderEvenness => 0,
    }
}

fn comparison_rule(rule: RuleId, ladder: &OrderBookLadder, direction: RuleDirection) -> RuleResult {
    let ((weak_side, weak), (strong_side, strong)) = sides(ladder, direction);

    if weak.is_empty() || strong.is_empty() {
        let (side, available) = if weak.is_empty() {
            (weak_side, weak.len())
        } else {
            (strong_side, strong.len())
        };
        return RuleResult::new(
            rule,
            direction,
            RuleOutcome::NotEvaluated,
            RuleDiagnostics::Insufficient {
                side,
                required: 1,
                available,
            },
        );
    }

    let weak_value = aggregate(rule, weak);
    let strong_value = aggregate(rule, strong);
    let skew = rule.skew();
    let scaled = weak_value as f64 * skew;
    let passed = scaled < strong_value as f64;

    let label = rule.aggregate_label();
    let condition = format!(
        "{}_{} * {} < {}_{}",
        weak_side, label, skew, strong_side, label
    );
    let calculation = format!(
        "{} * {} = {} < {}? {}",
        weak_value, skew, scaled, strong_value, passed
    );

    let outcome = if passed {
        RuleOutcome::Passed
    } else {
        RuleOutcome::Failed
    };

    RuleResult::new(
        rule,
        direction,
        outcome,
        RuleDiagnostics::Comparison {
            weak_side,
            weak: weak_value,
            strong: strong_value,
            skew,
            condition,
            calculation,
        },
    )
}

/// Rule 3: a strong side whose non-wall levels mostly sit above their own mean is an
/// evenly graduated ladder rather than one large resting order.
fn evenness_rule(ladder: &OrderBookLadder, direction: RuleDirection) -> RuleResult {
    let rule = RuleId::LadderEvenness;
    let (_, (side, strong)) = sides(ladder, direction);

    let considered: Vec<u64> = strong.top(TOP_DEPTH).iter().map(|l| l.volume).collect();
    if considered.len() < EVENNESS_MIN_LEVELS {
        return RuleResult::new(
            rule,
            direction,
            RuleOutcome::NotEvaluated,
            RuleDiagnostics::Insufficient {
                side,
                required: EVENNESS_MIN_LEVELS,
                available: considered.len(),
            },
        );
    }

    let top_volume = considered[0];
    let threshold = top_volume as f64 * WALL_FRACTION;
    let remaining: Vec<u64> = considered
        .iter()
        .copied()
        .filter(|&v| v as f64 <= threshold)
        .collect();

    let (mean, count_above_mean, ratio, outcome) = if remaining.is_empty() {
        (0.0, 0, 0.0, RuleOutcome::NotEvaluated)
    } else {
        let mean = remaining.iter().map(|&v| v as f64).sum::<f64>() / remaining.len() as f64;
        let above = remaining.iter().filter(|&&v| v as f64 > mean).count();
        let ratio = above as f64 / remaining.len() as f64;
        let outcome = if ratio >= EVENNESS_PASS_RATIO {
            RuleOutcome::Passed
        } else {
            RuleOutcome::Failed
        };
        (mean, above, ratio, outcome)
    };

    let condition = format!(
        "{}/{} = {:.2}% >= 75%? {}",
        count_above_mean,
        remaining.len(),
        ratio * 100.0,
        outcome == RuleOutcome::Passed
    );

    RuleResult::new(
        rule,
        direction,
        outcome,
        RuleDiagnostics::Evenness {
            side,
            top_volume,
            threshold,
            considered,
            remaining,
            mean,
            count_above_mean,
            ratio,
            condition,
        },
    )
}
