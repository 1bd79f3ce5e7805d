use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::models::{MarketSnapshot, OrderBookLadder, PriceLevel};

const BASE_PRICE: f64 = 1000.0;
const TICK: f64 = 5.0;

/// Build levels from (price, volume, frequency) tuples, best first.
pub fn make_side(data: &[(f64, u64, u64)]) -> Vec<PriceLevel> {
    data.iter()
        .map(|&(p, v, f)| PriceLevel::new(p, v, f))
        .collect()
}

/// Ladder from (volume, frequency) pairs. Bids step down from just under
/// `BASE_PRICE`, offers step up from `BASE_PRICE`.
pub fn ladder_from_levels(bids: &[(u64, u64)], offers: &[(u64, u64)]) -> OrderBookLadder {
    let bids = bids
        .iter()
        .enumerate()
        .map(|(i, &(v, f))| PriceLevel::new(BASE_PRICE - TICK * (i as f64 + 1.0), v, f))
        .collect();
    let offers = offers
        .iter()
        .enumerate()
        .map(|(i, &(v, f))| PriceLevel::new(BASE_PRICE + TICK * i as f64, v, f))
        .collect();
    OrderBookLadder::new(bids, offers)
}

/// Ladder from volumes only; every level has a single order.
pub fn ladder_from_volumes(bids: &[u64], offers: &[u64]) -> OrderBookLadder {
    let bids: Vec<(u64, u64)> = bids.iter().map(|&v| (v, 1)).collect();
    let offers: Vec<(u64, u64)> = offers.iter().map(|&v| (v, 1)).collect();
    ladder_from_levels(&bids, &offers)
}

/// Thin bids under an evenly graded offer wall. Passes all six bullish rules.
pub fn bullish_ladder() -> OrderBookLadder {
    let bids = vec![(10, 1); 5];
    let mut offers = vec![(10_000, 20)];
    offers.extend(std::iter::repeat((7_000, 20)).take(7));
    offers.extend([(1_000, 20), (1_000, 20)]);
    ladder_from_levels(&bids, &offers)
}

pub fn bearish_ladder() -> OrderBookLadder {
    bullish_ladder().mirrored()
}

pub fn make_snapshot(symbol: &str, ladder: OrderBookLadder) -> MarketSnapshot {
    let timestamp = DateTime::parse_from_rfc3339("2024-01-15T03:00:00Z")
        .unwrap()
        .with_timezone(&Utc);
    MarketSnapshot {
        symbol: symbol.to_string(),
        name: String::new(),
        last_price: ladder.best_bid().unwrap_or(BASE_PRICE),
        high: 0.0,
        low: 0.0,
        volume: 0.0,
        ladder,
        foreign_buy: 0.0,
        foreign_sell: 0.0,
        foreign_net: 0.0,
        timestamp,
    }
}

/// A Config suitable for testing: no API key, fixed symbols, default sessions.
pub fn default_test_config() -> Config {
    Config {
        symbols: vec!["BBCA".to_string(), "TLKM".to_string()],
        scan_once: true,
        output_dir: std::env::temp_dir()
            .join("idx-orderflow-test")
            .to_string_lossy()
            .into_owned(),
        ..Config::default()
    }
}
