//! Core data model: statuses, stage results, item counting.

mod items;
mod result;
mod status;

pub use items::ItemCountRule;
pub use result::StageResult;
pub use status::{RunStatus, StageStatus};
