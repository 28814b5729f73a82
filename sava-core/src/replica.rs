use crate::topic::{TopicPartition, TopicPartitionReplica};
use serde::{Deserialize, Serialize};

/// One stored copy of a partition on one broker. There is exactly one
/// replica per (topic-partition, broker) pair and exactly one leader per
/// topic-partition at steady state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replica {
    pub topic: String,
    pub partition: i32,
    pub broker: i32,
    /// Data folder the log lives in on the hosting broker.
    pub folder: String,
    pub leader: bool,
    pub in_sync: bool,
    /// Log size in bytes as last reported by the broker.
    pub size: u64,
}

impl Replica {
    pub fn topic_partition(&self) -> TopicPartition {
        TopicPartition {
            topic: self.topic.clone(),
            partition: self.partition,
        }
    }

    pub fn topic_partition_replica(&self) -> TopicPartitionReplica {
        TopicPartitionReplica {
            topic: self.topic.clone(),
            partition: self.partition,
            broker: self.broker,
        }
    }
}

/// A replica still catching up on its new broker after a reassignment.
/// Reported by the cluster while the data movement is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddingReplica {
    pub topic: String,
    pub partition: i32,
    pub broker: i32,
    pub folder: String,
    /// Bytes already copied to the new log.
    pub size: u64,
    /// Size of the leader log it is catching up to.
    pub leader_size: u64,
}

impl AddingReplica {
    pub fn topic_partition(&self) -> TopicPartition {
        TopicPartition {
            topic: self.topic.clone(),
            partition: self.partition,
        }
    }
}
