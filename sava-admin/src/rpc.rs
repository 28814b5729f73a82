use crate::errors::Result;
use async_trait::async_trait;
use sava_core::{
    AddingReplica, ConsumerGroup, DeletedRecord, Node, Partition, ProducerState, Quota,
    QuotaTarget, Replica, Topic, TopicPartition, Transaction,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::{Display, Formatter};

/// Resource a dynamic config entry is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConfigResource {
    Broker(i32),
    Topic(String),
}

impl Display for ConfigResource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigResource::Broker(id) => write!(f, "broker {}", id),
            ConfigResource::Topic(name) => write!(f, "topic {}", name),
        }
    }
}

/// One incremental change to a resource's dynamic config. Clearing a
/// throttle deletes its entry rather than writing a sentinel value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOp {
    Set { key: String, value: String },
    Delete { key: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigAlteration {
    pub resource: ConfigResource,
    pub op: ConfigOp,
}

/// Desired placement of one replica after a reassignment: the hosting broker
/// and, optionally, a specific data folder on it. `folder: None` leaves the
/// folder choice to the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaPlacement {
    pub broker: i32,
    pub folder: Option<String>,
}

/// Request to create one topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSpec {
    pub name: String,
    pub partitions: i32,
    pub replication_factor: i16,
    pub config: BTreeMap<String, String>,
}

/// Filter for quota listings. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotaFilter {
    pub target: Option<QuotaTarget>,
    pub entity: Option<String>,
}

/// Administrative protocol of the managed cluster.
///
/// This is the boundary toward the external system: every operation is one
/// round-trip, failures surface as [`AdminError`](crate::AdminError) values,
/// and nothing is cached on this side. Implementations must support
/// concurrent outstanding requests from multiple tasks.
#[async_trait]
pub trait ClusterRpc: Send + Sync + std::fmt::Debug {
    /// Topic names, including internal bookkeeping topics when
    /// `list_internal` is set.
    async fn topic_names(&self, list_internal: bool) -> Result<HashSet<String>>;

    async fn topics(&self, names: &HashSet<String>) -> Result<Vec<Topic>>;

    async fn create_topic(&self, spec: TopicSpec) -> Result<()>;

    async fn delete_topics(&self, names: &HashSet<String>) -> Result<()>;

    async fn partitions(&self, topics: &HashSet<String>) -> Result<Vec<Partition>>;

    /// Replicas of every partition of the given topics.
    async fn replicas(&self, topics: &HashSet<String>) -> Result<Vec<Replica>>;

    /// All alive brokers.
    async fn nodes(&self) -> Result<Vec<Node>>;

    async fn consumer_group_ids(&self) -> Result<HashSet<String>>;

    async fn consumer_groups(&self, ids: &HashSet<String>) -> Result<Vec<ConsumerGroup>>;

    /// Remove an empty consumer group. Errors if the group still has members.
    async fn delete_group(&self, group_id: &str) -> Result<()>;

    /// Remove members from a group: all of them when `members` is `None`,
    /// otherwise only the static members with the given instance ids.
    async fn remove_members(&self, group_id: &str, members: Option<&HashSet<String>>)
        -> Result<()>;

    async fn transaction_ids(&self) -> Result<HashSet<String>>;

    async fn transactions(&self, ids: &HashSet<String>)
        -> Result<HashMap<String, Transaction>>;

    async fn producer_states(
        &self,
        partitions: &HashSet<TopicPartition>,
    ) -> Result<Vec<ProducerState>>;

    /// Replicas still catching up after a reassignment, for the given topics.
    async fn adding_replicas(&self, topics: &HashSet<String>) -> Result<Vec<AddingReplica>>;

    /// Delete records with offsets below the given per-partition offsets.
    async fn delete_records(
        &self,
        offsets: &HashMap<TopicPartition, u64>,
    ) -> Result<HashMap<TopicPartition, DeletedRecord>>;

    /// Make the preferred (first-assigned) replica the leader of the
    /// partition. The preferred replica must be in sync.
    async fn elect_preferred_leader(&self, partition: &TopicPartition) -> Result<()>;

    /// Submit a batched replica reassignment. Returns once the cluster has
    /// accepted the request; the data movement itself is asynchronous.
    async fn reassign(
        &self,
        plan: &HashMap<TopicPartition, Vec<ReplicaPlacement>>,
    ) -> Result<()>;

    async fn describe_config(&self, resource: &ConfigResource)
        -> Result<BTreeMap<String, String>>;

    /// Apply incremental config changes in one batched call.
    async fn alter_configs(&self, alterations: &[ConfigAlteration]) -> Result<()>;

    async fn quotas(&self, filter: &QuotaFilter) -> Result<Vec<Quota>>;

    /// Create or overwrite the quota for the quota's (target, entity, limit)
    /// address. Last write wins.
    async fn alter_quota(&self, quota: &Quota) -> Result<()>;

    /// Release transport resources. Called at most once by the facade.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
