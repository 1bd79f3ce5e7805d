use serde::{Deserialize, Serialize};

use crate::models::FlowTrend;

const WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideDynamics {
    /// Sum of the last three snapshots.
    pub recent: u64,
    pub trend: FlowTrend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyDynamics {
    pub bid: SideDynamics,
    pub offer: SideDynamics,
}

/// Queue-count dynamics across successive snapshots of one symbol.
pub fn frequency_dynamics(bid_series: &[u64], offer_series: &[u64]) -> FrequencyDynamics {
    FrequencyDynamics {
        bid: side_dynamics(bid_series),
        offer: side_dynamics(offer_series),
    }
}

fn side_dynamics(series: &[u64]) -> SideDynamics {
    let recent_start = series.len().saturating_sub(WINDOW);
    let recent = window_sum(&series[recent_start..]);

    let trend = if series.len() >= WINDOW * 2 {
        let previous = window_sum(&series[recent_start - WINDOW..recent_start]);
        match recent.cmp(&previous) {
            std::cmp::Ordering::Greater => FlowTrend::Increasing,
            std::cmp::Ordering::Less => FlowTrend::Decreasing,
            std::cmp::Ordering::Equal => FlowTrend::Stable,
        }
    } else {
        FlowTrend::Stable
    };

    SideDynamics { recent, trend }
}

fn window_sum(window: &[u64]) -> u64 {
    window.iter().fold(0u64, |acc, &v| acc.saturating_add(v))
}
