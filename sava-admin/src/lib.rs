mod admin;
mod errors;
mod migrator;
mod providers;
mod quota_creator;
mod rpc;
mod throttler;
mod topic_creator;

pub use admin::{Admin, AdminBuilder};
pub use errors::{AdminError, BatchFailure, ResourceKind, Result};
pub use migrator::{Destination, ReplicaMigrator};
pub use providers::MemoryCluster;
pub use quota_creator::QuotaCreator;
pub use rpc::{
    ClusterRpc, ConfigAlteration, ConfigOp, ConfigResource, QuotaFilter, ReplicaPlacement,
    TopicSpec,
};
pub use throttler::{ReplicationThrottler, ThrottleScope, ThrottleTarget};
pub use topic_creator::TopicCreator;
