use serde::{Deserialize, Serialize};

use crate::models::LadderSide;

const STAGE_1_MIN: u32 = 70;
const STAGE_2_MIN: u32 = 80;
const STAGE_3_MIN: u32 = 90;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryStage {
    pub stage: u8,
    /// Fraction of the total position.
    pub allocation: f64,
    pub size: f64,
    pub price: f64,
    /// Resting bid volume at the stage price (averaged for two-level stages).
    pub volume_available: f64,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StagedEntryPlan {
    pub confidence: u32,
    pub position_size: f64,
    pub stages: Vec<EntryStage>,
}

impl StagedEntryPlan {
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn allocated(&self) -> f64 {
        self.stages.iter().map(|s| s.allocation).sum()
    }
}

/// Split a position into up to three bid-side entries, unlocked by confidence.
/// Stages the ladder is too shallow for are dropped.
pub fn plan_entries(confidence: u32, bids: &LadderSide, position_size: f64) -> StagedEntryPlan {
    let mut stages = Vec::new();

    if confidence >= STAGE_1_MIN {
        if let Some(level) = bids.best() {
            stages.push(EntryStage {
                stage: 1,
                allocation: 0.30,
                size: position_size * 0.30,
                price: level.price,
                volume_available: level.volume as f64,
                description: "Aggressive entry at best bid".to_string(),
            });
        }
    }

    if confidence >= STAGE_2_MIN && bids.len() >= 3 {
        let (price, volume) = average_levels(bids, 1, 2);
        stages.push(EntryStage {
            stage: 2,
            allocation: 0.40,
            size: position_size * 0.40,
            price,
            volume_available: volume,
            description: "Medium entry at bid levels 2-3".to_string(),
        });
    }

    if confidence >= STAGE_3_MIN && bids.len() >= 5 {
        let (price, volume) = average_levels(bids, 3, 4);
        stages.push(EntryStage {
            stage: 3,
            allocation: 0.30,
            size: position_size * 0.30,
            price,
            volume_available: volume,
            description: "Conservative entry at bid levels 4-5".to_string(),
        });
    }

    StagedEntryPlan {
        confidence,
        position_size,
        stages,
    }
}

fn average_levels(bids: &LadderSide, a: usize, b: usize) -> (f64, f64) {
    let levels = bids.levels();
    (
        (levels[a].price + levels[b].price) / 2.0,
        (levels[a].volume + levels[b].volume) as f64 / 2.0,
    )
}
