use serde::{Deserialize, Serialize};

use crate::models::{BookPressure, OrderBookLadder, SpreadTightness};

const PRESSURE_SKEW: f64 = 1.1;

/// Display-oriented overview of a ladder. Nothing in here feeds the scorers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSummary {
    pub best_bid: Option<f64>,
    pub best_offer: Option<f64>,
    pub spread: Option<f64>,
    /// Spread as a percentage of the best offer.
    pub spread_pct: Option<f64>,
    pub mid_price: Option<f64>,
    pub total_bid_volume: u64,
    pub total_offer_volume: u64,
    pub total_bid_queue: u64,
    pub total_offer_queue: u64,
    /// Offer volume over bid volume.
    pub volume_ratio: Option<f64>,
    /// Offer queue count over bid queue count.
    pub queue_ratio: Option<f64>,
    /// Best offer volume over best bid volume.
    pub top_liquidity_ratio: Option<f64>,
    pub pressure: BookPressure,
    pub tightness: Option<SpreadTightness>,
}

impl BookSummary {
    /// `tick` is the price increment used to grade the spread.
    pub fn from_ladder(ladder: &OrderBookLadder, tick: f64) -> Self {
        let best_bid = ladder.best_bid();
        let best_offer = ladder.best_offer();
        let spread = ladder.spread();
        let spread_pct = match (spread, best_offer) {
            (Some(s), Some(o)) if o > 0.0 => Some(s / o * 100.0),
            _ => None,
        };

        let total_bid_volume = ladder.bids.total_volume();
        let total_offer_volume = ladder.offers.total_volume();
        let total_bid_queue = ladder.bids.total_frequency();
        let total_offer_queue = ladder.offers.total_frequency();

        let top_liquidity_ratio = match (ladder.bids.best(), ladder.offers.best()) {
            (Some(b), Some(o)) => ratio(o.volume, b.volume),
            _ => None,
        };

        let pressure = if total_offer_volume as f64 > total_bid_volume as f64 * PRESSURE_SKEW {
            BookPressure::SellerHeavy
        } else if total_bid_volume as f64 > total_offer_volume as f64 * PRESSURE_SKEW {
            BookPressure::BuyerHeavy
        } else {
            BookPressure::Balanced
        };

        let tightness = spread.filter(|_| tick > 0.0).map(|s| {
            let ticks = s / tick;
            if ticks <= 1.0 {
                SpreadTightness::VeryTight
            } else if ticks <= 3.0 {
                SpreadTightness::Tight
            } else {
                SpreadTightness::Wide
            }
        });

        Self {
            best_bid,
            best_offer,
            spread,
            spread_pct,
            mid_price: ladder.mid_price(),
            total_bid_volume,
            total_offer_volume,
            total_bid_queue,
            total_offer_queue,
            volume_ratio: ratio(total_offer_volume, total_bid_volume),
            queue_ratio: ratio(total_offer_queue, total_bid_queue),
            top_liquidity_ratio,
            pressure,
            tightness,
        }
    }
}

/// IDX price fraction for a given price band.
pub fn idx_tick_size(price: f64) -> f64 {
    match price {
        p if p < 200.0 => 1.0,
        p if p < 500.0 => 2.0,
        p if p < 2_000.0 => 5.0,
        p if p < 5_000.0 => 10.0,
        _ => 25.0,
    }
}

fn ratio(num: u64, den: u64) -> Option<f64> {
    (den > 0).then(|| num as f64 / den as f64)
}
