use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shares per board lot on IDX.
pub const SHARES_PER_LOT: u64 = 100;

#[derive(Debug, Error, PartialEq)]
pub enum LadderError {
    #[error("{side} side has {prices} prices, {volumes} volumes and {frequencies} frequencies")]
    LengthMismatch {
        side: &'static str,
        prices: usize,
        volumes: usize,
        frequencies: usize,
    },
    #[error("{side} level {rank} has invalid {field}: {value}")]
    InvalidValue {
        side: &'static str,
        rank: usize,
        field: &'static str,
        value: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: f64,
    pub volume: u64,
    pub frequency: u64,
}

impl PriceLevel {
    pub fn new(price: f64, volume: u64, frequency: u64) -> Self {
        Self {
            price,
            volume,
            frequency,
        }
    }
}

/// One side of the book, ordered best-to-worst. Input order is trusted, never re-sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LadderSide {
    levels: Vec<PriceLevel>,
}

impl LadderSide {
    pub fn new(levels: Vec<PriceLevel>) -> Self {
        Self { levels }
    }

    /// Build from parallel arrays, rejecting mismatched lengths, non-finite or
    /// negative values, and volumes or frequencies that do not fit in a `u64`.
    pub fn from_arrays(
        side: &'static str,
        prices: &[f64],
        volumes: &[f64],
        frequencies: &[f64],
    ) -> Result<Self, LadderError> {
        if prices.len() != volumes.len() || prices.len() != frequencies.len() {
            return Err(LadderError::LengthMismatch {
                side,
                prices: prices.len(),
                volumes: volumes.len(),
                frequencies: frequencies.len(),
            });
        }

        let check = |rank: usize, field: &'static str, value: f64| {
            if value.is_finite() && value >= 0.0 {
                Ok(value)
            } else {
                Err(LadderError::InvalidValue {
                    side,
                    rank,
                    field,
                    value,
                })
            }
        };

        // u64::MAX as f64 rounds up to 2^64, which is already out of range
        let count = |rank: usize, field: &'static str, value: f64| {
            let rounded = check(rank, field, value)?.round();
            if rounded < u64::MAX as f64 {
                Ok(rounded as u64)
            } else {
                Err(LadderError::InvalidValue {
                    side,
                    rank,
                    field,
                    value,
                })
            }
        };

        let mut levels = Vec::with_capacity(prices.len());
        for (rank, ((&p, &v), &f)) in prices.iter().zip(volumes).zip(frequencies).enumerate() {
            levels.push(PriceLevel {
                price: check(rank, "price", p)?,
                volume: count(rank, "volume", v)?,
                frequency: count(rank, "frequency", f)?,
            });
        }

        Ok(Self { levels })
    }

    pub fn levels(&self) -> &[PriceLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn best(&self) -> Option<&PriceLevel> {
        self.levels.first()
    }

    /// First `n` levels (or fewer when the side is shallower).
    pub fn top(&self, n: usize) -> &[PriceLevel] {
        &self.levels[..n.min(self.levels.len())]
    }

    /// Saturates at `u64::MAX` rather than overflowing.
    pub fn volume_sum(&self, depth: usize) -> u64 {
        self.top(depth)
            .iter()
            .fold(0u64, |acc, l| acc.saturating_add(l.volume))
    }

    pub fn frequency_sum(&self, depth: usize) -> u64 {
        self.top(depth)
            .iter()
            .fold(0u64, |acc, l| acc.saturating_add(l.frequency))
    }

    pub fn total_volume(&self) -> u64 {
        self.volume_sum(self.levels.len())
    }

    pub fn total_frequency(&self) -> u64 {
        self.frequency_sum(self.levels.len())
    }
}

/// Bid and offer ladders of one order-book snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBookLadder {
    pub bids: LadderSide,
    pub offers: LadderSide,
}

impl OrderBookLadder {
    pub fn new(bids: Vec<PriceLevel>, offers: Vec<PriceLevel>) -> Self {
        Self {
            bids: LadderSide::new(bids),
            offers: LadderSide::new(offers),
        }
    }

    pub fn from_arrays(
        bid_prices: &[f64],
        bid_volumes: &[f64],
        bid_frequencies: &[f64],
        offer_prices: &[f64],
        offer_volumes: &[f64],
        offer_frequencies: &[f64],
    ) -> Result<Self, LadderError> {
        Ok(Self {
            bids: LadderSide::from_arrays("bid", bid_prices, bid_volumes, bid_frequencies)?,
            offers: LadderSide::from_arrays(
                "offer",
                offer_prices,
                offer_volumes,
                offer_frequencies,
            )?,
        })
    }

    /// Swap bid and offer sides.
    pub fn mirrored(&self) -> Self {
        Self {
            bids: self.offers.clone(),
            offers: self.bids.clone(),
        }
    }

    /// Convert share volumes to board lots (integer division, as the exchange reports).
    pub fn to_lots(&self) -> Self {
        let convert = |side: &LadderSide| {
            LadderSide::new(
                side.levels
                    .iter()
                    .map(|l| PriceLevel {
                        volume: l.volume / SHARES_PER_LOT,
                        ..*l
                    })
                    .collect(),
            )
        };
        Self {
            bids: convert(&self.bids),
            offers: convert(&self.offers),
        }
    }

    pub fn best_bid(&self) -> Option<f64> {
        self.bids.best().map(|l| l.price)
    }

    pub fn best_offer(&self) -> Option<f64> {
        self.offers.best().map(|l| l.price)
    }

    pub fn spread(&self) -> Option<f64> {
        Some(self.best_offer()? - self.best_bid()?)
    }

    pub fn mid_price(&self) -> Option<f64> {
        Some((self.best_offer()? + self.best_bid()?) / 2.0)
    }
}

/// A ladder plus the market context the vendor feed ships alongside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub last_price: f64,
    #[serde(default)]
    pub high: f64,
    #[serde(default)]
    pub low: f64,
    #[serde(default)]
    pub volume: f64,
    pub ladder: OrderBookLadder,
    #[serde(default)]
    pub foreign_buy: f64,
    #[serde(default)]
    pub foreign_sell: f64,
    #[serde(default)]
    pub foreign_net: f64,
    pub timestamp: DateTime<Utc>,
}
