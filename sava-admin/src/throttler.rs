use crate::admin::Admin;
use crate::errors::Result;
use crate::rpc::{ConfigAlteration, ConfigOp, ConfigResource};
use sava_core::{DataRate, TopicPartition, TopicPartitionReplica};
use tracing::info;

/// Broker-wide replication rates live on the broker resource; every other
/// scope lives on the owning topic resource under its own key. Scopes are
/// independent namespaces: clearing one never touches another.
pub(crate) const INGRESS_RATE_KEY: &str = "replication.throttle.ingress.rate";
pub(crate) const EGRESS_RATE_KEY: &str = "replication.throttle.egress.rate";
const TOPIC_RATE_KEY: &str = "replication.throttle.topic.rate";

fn partition_rate_key(partition: i32) -> String {
    format!("replication.throttle.partition.{}.rate", partition)
}

fn replica_rate_key(partition: i32, broker: i32, side: &str) -> String {
    format!(
        "replication.throttle.replica.{}.{}.{}.rate",
        partition, broker, side
    )
}

/// One throttleable scope. Each variant maps to exactly one dynamic-config
/// key on exactly one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThrottleScope {
    /// Cap on replication traffic entering a broker.
    BrokerIngress(i32),
    /// Cap on replication traffic leaving a broker.
    BrokerEgress(i32),
    /// Cap on replication of every partition of a topic.
    Topic(String),
    /// Cap on replication of one partition.
    Partition(TopicPartition),
    /// Cap on the leader-side traffic of one replica log.
    LeaderLog(TopicPartitionReplica),
    /// Cap on the follower-side traffic of one replica log.
    FollowerLog(TopicPartitionReplica),
}

impl ThrottleScope {
    pub(crate) fn resource(&self) -> ConfigResource {
        match self {
            ThrottleScope::BrokerIngress(id) | ThrottleScope::BrokerEgress(id) => {
                ConfigResource::Broker(*id)
            }
            ThrottleScope::Topic(name) => ConfigResource::Topic(name.clone()),
            ThrottleScope::Partition(tp) => ConfigResource::Topic(tp.topic.clone()),
            ThrottleScope::LeaderLog(log) | ThrottleScope::FollowerLog(log) => {
                ConfigResource::Topic(log.topic.clone())
            }
        }
    }

    pub(crate) fn key(&self) -> String {
        match self {
            ThrottleScope::BrokerIngress(_) => INGRESS_RATE_KEY.to_string(),
            ThrottleScope::BrokerEgress(_) => EGRESS_RATE_KEY.to_string(),
            ThrottleScope::Topic(_) => TOPIC_RATE_KEY.to_string(),
            ThrottleScope::Partition(tp) => partition_rate_key(tp.partition),
            ThrottleScope::LeaderLog(log) => {
                replica_rate_key(log.partition, log.broker, "leader")
            }
            ThrottleScope::FollowerLog(log) => {
                replica_rate_key(log.partition, log.broker, "follower")
            }
        }
    }
}

/// Target of a throttle clear on the facade. Clearing a replica log removes
/// both its leader-side and follower-side entries; the one-sided clears live
/// on [`Admin`] as separate methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThrottleTarget {
    Topic(String),
    Partition(TopicPartition),
    Replica(TopicPartitionReplica),
}

impl From<&str> for ThrottleTarget {
    fn from(topic: &str) -> Self {
        ThrottleTarget::Topic(topic.to_string())
    }
}

impl From<String> for ThrottleTarget {
    fn from(topic: String) -> Self {
        ThrottleTarget::Topic(topic)
    }
}

impl From<TopicPartition> for ThrottleTarget {
    fn from(tp: TopicPartition) -> Self {
        ThrottleTarget::Partition(tp)
    }
}

impl From<TopicPartitionReplica> for ThrottleTarget {
    fn from(log: TopicPartitionReplica) -> Self {
        ThrottleTarget::Replica(log)
    }
}

impl ThrottleTarget {
    /// Config entries owned by exactly this scope, nothing layered beneath.
    pub(crate) fn deletions(&self) -> Vec<ConfigAlteration> {
        let scopes = match self {
            ThrottleTarget::Topic(name) => vec![ThrottleScope::Topic(name.clone())],
            ThrottleTarget::Partition(tp) => vec![ThrottleScope::Partition(tp.clone())],
            ThrottleTarget::Replica(log) => vec![
                ThrottleScope::LeaderLog(log.clone()),
                ThrottleScope::FollowerLog(log.clone()),
            ],
        };
        scopes
            .into_iter()
            .map(|scope| ConfigAlteration {
                resource: scope.resource(),
                op: ConfigOp::Delete { key: scope.key() },
            })
            .collect()
    }
}

/// Accumulates bandwidth caps and applies them in one batched config call.
///
/// Re-applying a limit simply overwrites the stored value, so `apply` is
/// idempotent from the caller's perspective. A target that no longer exists
/// at apply time surfaces as `ResourceNotFound`.
#[derive(Debug)]
pub struct ReplicationThrottler {
    admin: Admin,
    pending: Vec<(ThrottleScope, DataRate)>,
}

impl ReplicationThrottler {
    pub(crate) fn new(admin: Admin) -> Self {
        ReplicationThrottler {
            admin,
            pending: Vec::new(),
        }
    }

    /// Cap replication traffic entering `broker`.
    pub fn ingress(mut self, broker: i32, rate: DataRate) -> Self {
        self.pending.push((ThrottleScope::BrokerIngress(broker), rate));
        self
    }

    /// Cap replication traffic leaving `broker`.
    pub fn egress(mut self, broker: i32, rate: DataRate) -> Self {
        self.pending.push((ThrottleScope::BrokerEgress(broker), rate));
        self
    }

    /// Cap replication of every partition of `topic`.
    pub fn topic(mut self, topic: impl Into<String>, rate: DataRate) -> Self {
        self.pending.push((ThrottleScope::Topic(topic.into()), rate));
        self
    }

    /// Cap replication of one partition.
    pub fn partition(mut self, tp: TopicPartition, rate: DataRate) -> Self {
        self.pending.push((ThrottleScope::Partition(tp), rate));
        self
    }

    /// Cap the leader-side traffic of one replica log.
    pub fn leader_log(mut self, log: TopicPartitionReplica, rate: DataRate) -> Self {
        self.pending.push((ThrottleScope::LeaderLog(log), rate));
        self
    }

    /// Cap the follower-side traffic of one replica log.
    pub fn follower_log(mut self, log: TopicPartitionReplica, rate: DataRate) -> Self {
        self.pending.push((ThrottleScope::FollowerLog(log), rate));
        self
    }

    /// Cap an arbitrary scope.
    pub fn throttle(mut self, scope: ThrottleScope, rate: DataRate) -> Self {
        self.pending.push((scope, rate));
        self
    }

    /// Submit every accumulated cap in one batched config alteration.
    pub async fn apply(self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let alterations: Vec<ConfigAlteration> = self
            .pending
            .iter()
            .map(|(scope, rate)| ConfigAlteration {
                resource: scope.resource(),
                op: ConfigOp::Set {
                    key: scope.key(),
                    value: rate.as_bytes_per_sec().to_string(),
                },
            })
            .collect();
        self.admin.submit_config_alterations(&alterations).await?;
        info!(throttles = alterations.len(), "applied replication throttles");
        Ok(())
    }
}
