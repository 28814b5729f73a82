use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// A named log stream. Partition count and replication factor only change
/// through explicit alter calls on the cluster, never in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    pub partitions: i32,
    pub replication_factor: i16,
    /// Internal topics are bookkeeping topics owned by the cluster itself.
    pub internal: bool,
    pub config: BTreeMap<String, String>,
}

/// A (topic, partition-index) pair. The index is zero-based and always
/// smaller than the owning topic's partition count.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TopicPartition {
    pub topic: String,
    pub partition: i32,
}

impl TopicPartition {
    pub fn new(topic: impl Into<String>, partition: i32) -> Self {
        TopicPartition {
            topic: topic.into(),
            partition,
        }
    }

    /// The replica of this partition hosted on `broker`.
    pub fn replica(&self, broker: i32) -> TopicPartitionReplica {
        TopicPartitionReplica {
            topic: self.topic.clone(),
            partition: self.partition,
            broker,
        }
    }
}

impl Display for TopicPartition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.topic, self.partition)
    }
}

/// Addresses one replica log: a partition on a specific broker. Used as the
/// key for replica-scoped throttles and migration plans.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TopicPartitionReplica {
    pub topic: String,
    pub partition: i32,
    pub broker: i32,
}

impl TopicPartitionReplica {
    pub fn new(topic: impl Into<String>, partition: i32, broker: i32) -> Self {
        TopicPartitionReplica {
            topic: topic.into(),
            partition,
            broker,
        }
    }

    pub fn topic_partition(&self) -> TopicPartition {
        TopicPartition {
            topic: self.topic.clone(),
            partition: self.partition,
        }
    }
}

impl Display for TopicPartitionReplica {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}@{}", self.topic, self.partition, self.broker)
    }
}

/// Described state of one partition: offsets, leadership and the replica
/// assignment as the cluster currently reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub topic: String,
    pub partition: i32,
    pub earliest_offset: u64,
    pub latest_offset: u64,
    /// Broker currently leading this partition, if any.
    pub leader: Option<i32>,
    /// Assigned brokers, preferred leader first.
    pub replicas: Vec<i32>,
    pub in_sync: Vec<i32>,
}

impl Partition {
    pub fn topic_partition(&self) -> TopicPartition {
        TopicPartition {
            topic: self.topic.clone(),
            partition: self.partition,
        }
    }
}
