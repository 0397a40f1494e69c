use serde::{Deserialize, Serialize};

/// Outcome of a maintenance batch. Records that failed are counted, not fatal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub processed: usize,
    pub failed: usize,
}
