use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A replication bandwidth cap in bytes per second.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct DataRate(u64);

impl DataRate {
    pub fn bytes_per_sec(bytes: u64) -> Self {
        DataRate(bytes)
    }

    pub fn kib_per_sec(kib: u64) -> Self {
        DataRate(kib * 1024)
    }

    pub fn mib_per_sec(mib: u64) -> Self {
        DataRate(mib * 1024 * 1024)
    }

    pub fn as_bytes_per_sec(&self) -> u64 {
        self.0
    }
}

impl Display for DataRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} B/s", self.0)
    }
}
