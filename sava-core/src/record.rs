use serde::{Deserialize, Serialize};

/// Outcome of deleting records on one partition: the new earliest offset
/// readable on that partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedRecord {
    pub low_watermark: u64,
}
