pub mod direction;
pub mod ladder;

pub use direction::*;
pub use ladder::{LadderError, LadderSide, MarketSnapshot, OrderBookLadder, PriceLevel};
