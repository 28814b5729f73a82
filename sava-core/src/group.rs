use crate::topic::TopicPartition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A consumer group as described by the cluster: its members and the
/// committed offset per assigned partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerGroup {
    pub group_id: String,
    pub members: Vec<GroupMember>,
    /// Committed offset per partition assigned to this group.
    pub offsets: BTreeMap<TopicPartition, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub member_id: String,
    /// Set only for static members; used to remove them by instance id.
    pub group_instance_id: Option<String>,
    pub client_id: String,
    pub host: String,
}
