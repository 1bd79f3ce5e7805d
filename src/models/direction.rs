use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Bullish => write!(f, "BULLISH"),
            Sentiment::Bearish => write!(f, "BEARISH"),
            Sentiment::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookSide {
    Bid,
    Offer,
}

impl fmt::Display for BookSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookSide::Bid => write!(f, "bid"),
            BookSide::Offer => write!(f, "offer"),
        }
    }
}

/// Which way the six rules are pointed.
///
/// `Bullish` tests whether offer pressure dominates bid pressure (thin bids under a
/// thick offer wall, read as supply about to be absorbed). `Bearish` is the exact
/// mirror: bid pressure dominating offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleDirection {
    Bullish,
    Bearish,
}

impl fmt::Display for RuleDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleDirection::Bullish => write!(f, "bullish"),
            RuleDirection::Bearish => write!(f, "bearish"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegacyPattern {
    BullishAccumulation,
    BearishDistribution,
}

impl fmt::Display for LegacyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegacyPattern::BullishAccumulation => write!(f, "BULLISH_ACCUMULATION"),
            LegacyPattern::BearishDistribution => write!(f, "BEARISH_DISTRIBUTION"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegacyAction {
    BuyStrong,
    Buy,
    Watch,
    Skip,
    ImmediateExit,
    ClosePosition,
    Caution,
    Monitor,
}

impl fmt::Display for LegacyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegacyAction::BuyStrong => write!(f, "BUY_STRONG"),
            LegacyAction::Buy => write!(f, "BUY"),
            LegacyAction::Watch => write!(f, "WATCH"),
            LegacyAction::Skip => write!(f, "SKIP"),
            LegacyAction::ImmediateExit => write!(f, "IMMEDIATE_EXIT"),
            LegacyAction::ClosePosition => write!(f, "CLOSE_POSITION"),
            LegacyAction::Caution => write!(f, "CAUTION"),
            LegacyAction::Monitor => write!(f, "MONITOR"),
        }
    }
}

impl LegacyAction {
    pub fn for_bullish(confidence: u32) -> Self {
        match confidence {
            c if c >= 85 => LegacyAction::BuyStrong,
            c if c >= 75 => LegacyAction::Buy,
            c if c >= 60 => LegacyAction::Watch,
            _ => LegacyAction::Skip,
        }
    }

    pub fn for_bearish(confidence: u32) -> Self {
        match confidence {
            c if c >= 90 => LegacyAction::ImmediateExit,
            c if c >= 80 => LegacyAction::ClosePosition,
            c if c >= 60 => LegacyAction::Caution,
            _ => LegacyAction::Monitor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowTrend {
    Increasing,
    Decreasing,
    Stable,
}

impl fmt::Display for FlowTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowTrend::Increasing => write!(f, "increasing"),
            FlowTrend::Decreasing => write!(f, "decreasing"),
            FlowTrend::Stable => write!(f, "stable"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookPressure {
    SellerHeavy,
    BuyerHeavy,
    Balanced,
}

impl fmt::Display for BookPressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookPressure::SellerHeavy => write!(f, "seller_heavy"),
            BookPressure::BuyerHeavy => write!(f, "buyer_heavy"),
            BookPressure::Balanced => write!(f, "balanced"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadTightness {
    VeryTight,
    Tight,
    Wide,
}

impl fmt::Display for SpreadTightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpreadTightness::VeryTight => write!(f, "very_tight"),
            SpreadTightness::Tight => write!(f, "tight"),
            SpreadTightness::Wide => write!(f, "wide"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullish_action_breakpoints() {
        assert_eq!(LegacyAction::for_bullish(100), LegacyAction::BuyStrong);
        assert_eq!(LegacyAction::for_bullish(85), LegacyAction::BuyStrong);
        assert_eq!(LegacyAction::for_bullish(84), LegacyAction::Buy);
        assert_eq!(LegacyAction::for_bullish(75), LegacyAction::Buy);
        assert_eq!(LegacyAction::for_bullish(60), LegacyAction::Watch);
        assert_eq!(LegacyAction::for_bullish(59), LegacyAction::Skip);
    }

    #[test]
    fn bearish_action_breakpoints() {
        assert_eq!(LegacyAction::for_bearish(90), LegacyAction::ImmediateExit);
        assert_eq!(LegacyAction::for_bearish(89), LegacyAction::ClosePosition);
        assert_eq!(LegacyAction::for_bearish(80), LegacyAction::ClosePosition);
        assert_eq!(LegacyAction::for_bearish(60), LegacyAction::Caution);
        assert_eq!(LegacyAction::for_bearish(0), LegacyAction::Monitor);
    }

    #[test]
    fn serde_names_match_display() {
        let json = serde_json::to_string(&LegacyAction::ImmediateExit).unwrap();
        assert_eq!(json, "\"IMMEDIATE_EXIT\"");
        let json = serde_json::to_string(&Sentiment::Neutral).unwrap();
        assert_eq!(json, "\"NEUTRAL\"");
    }
}
