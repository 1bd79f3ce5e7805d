pub mod entries;
pub mod exits;

pub use entries::{plan_entries, EntryStage, StagedEntryPlan};
pub use exits::{plan_exit, ExitPlan, PlanError, ProfitTarget};
