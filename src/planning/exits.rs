use serde::{Deserialize, Serialize};
use thiserror::Error;

const STOP_LOSS_PCT: f64 = 0.8;
const ATR_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("entry price must be positive and finite, got {0}")]
    InvalidEntryPrice(f64),
    #[error("current price must be finite, got {0}")]
    InvalidCurrentPrice(f64),
    #[error("ATR must be non-negative and finite, got {0}")]
    InvalidAtr(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitTarget {
    pub price: f64,
    pub target_pct: f64,
    /// Fraction of the position released at this target.
    pub release: f64,
    pub size: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitPlan {
    pub entry_price: f64,
    pub current_price: f64,
    pub profit_pct: f64,
    pub targets: Vec<ProfitTarget>,
    pub stop_loss: f64,
    pub trailing_stop: f64,
    /// The tighter of the two stops.
    pub active_stop: f64,
}

pub fn plan_exit(
    entry_price: f64,
    current_price: f64,
    atr: f64,
    position_size: f64,
) -> Result<ExitPlan, PlanError> {
    if !entry_price.is_finite() || entry_price <= 0.0 {
        return Err(PlanError::InvalidEntryPrice(entry_price));
    }
    if !current_price.is_finite() {
        return Err(PlanError::InvalidCurrentPrice(current_price));
    }
    if !atr.is_finite() || atr < 0.0 {
        return Err(PlanError::InvalidAtr(atr));
    }

    let targets = [
        (0.5, 0.30, "First target - light profit taking"),
        (1.0, 0.40, "Second target - partial profit"),
        (1.5, 0.30, "Third target - remainder rides the trailing stop"),
    ]
    .into_iter()
    .map(|(pct, release, description)| ProfitTarget {
        price: entry_price * (1.0 + pct / 100.0),
        target_pct: pct,
        release,
        size: position_size * release,
        description: description.to_string(),
    })
    .collect();

    let stop_loss = entry_price * (1.0 - STOP_LOSS_PCT / 100.0);
    let trailing_stop = current_price - ATR_MULTIPLIER * atr;

    Ok(ExitPlan {
        entry_price,
        current_price,
        profit_pct: (current_price - entry_price) / entry_price * 100.0,
        targets,
        stop_loss,
        trailing_stop,
        active_stop: stop_loss.max(trailing_stop),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_stop_wins_when_trailing_is_lower() {
        let plan = plan_exit(872.0, 880.0, 8.0, 100.0).unwrap();
        assert!((plan.stop_loss - 865.024).abs() < 1e-9);
        assert!((plan.trailing_stop - 864.0).abs() < 1e-9);
        assert!((plan.active_stop - 865.024).abs() < 1e-9);
        assert!((plan.profit_pct - 8.0 / 872.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn trailing_stop_wins_after_a_run_up() {
        let plan = plan_exit(872.0, 900.0, 5.0, 100.0).unwrap();
        assert!((plan.active_stop - 890.0).abs() < 1e-9);
    }

    #[test]
    fn targets_release_whole_position() {
        let plan = plan_exit(1000.0, 1000.0, 10.0, 200.0).unwrap();
        let prices: Vec<f64> = plan.targets.iter().map(|t| t.price).collect();
        assert!((prices[0] - 1005.0).abs() < 1e-9);
        assert!((prices[1] - 1010.0).abs() < 1e-9);
        assert!((prices[2] - 1015.0).abs() < 1e-9);
        let released: f64 = plan.targets.iter().map(|t| t.size).sum();
        assert!((released - 200.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_bad_inputs() {
        assert_eq!(plan_exit(0.0, 100.0, 1.0, 1.0), Err(PlanError::InvalidEntryPrice(0.0)));
        assert_eq!(plan_exit(100.0, 100.0, -1.0, 1.0), Err(PlanError::InvalidAtr(-1.0)));
        assert!(plan_exit(f64::NAN, 100.0, 1.0, 1.0).is_err());
        assert!(plan_exit(100.0, f64::INFINITY, 1.0, 1.0).is_err());
    }
}
