use chrono::{DateTime, Utc};
use idx_orderflow::models::{MarketSnapshot, OrderBookLadder, PriceLevel};

/// Ladder from (volume, frequency) pairs, bids stepping down from 995 and
/// offers up from 1000 in 5-rupiah ticks.
pub fn ladder(bids: &[(u64, u64)], offers: &[(u64, u64)]) -> OrderBookLadder {
    let side = |rows: &[(u64, u64)], start: f64, step: f64| -> Vec<PriceLevel> {
        rows.iter()
            .enumerate()
            .map(|(i, &(v, f))| PriceLevel::new(start + step * i as f64, v, f))
            .collect()
    };
    OrderBookLadder::new(side(bids, 995.0, -5.0), side(offers, 1000.0, 5.0))
}

/// Thin bids under an evenly graded offer wall: 100 bullish.
pub fn bullish_ladder() -> OrderBookLadder {
    let mut offers = vec![(10_000, 20)];
    offers.extend(std::iter::repeat((7_000, 20)).take(7));
    offers.extend([(1_000, 20), (1_000, 20)]);
    ladder(&[(10, 1); 5], &offers)
}

pub fn snapshot(symbol: &str, ladder: OrderBookLadder) -> MarketSnapshot {
    MarketSnapshot {
        symbol: symbol.to_string(),
        name: format!("{} Tbk", symbol),
        last_price: ladder.best_bid().unwrap_or(1000.0),
        high: 0.0,
        low: 0.0,
        volume: 0.0,
        ladder,
        foreign_buy: 0.0,
        foreign_sell: 0.0,
        foreign_net: 0.0,
        timestamp: DateTime::parse_from_rfc3339("2024-01-15T03:00:00Z")
            .unwrap()
            .with_timezone(&Utc),
    }
}
