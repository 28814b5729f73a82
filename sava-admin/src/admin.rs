use crate::errors::{AdminError, BatchFailure, Result};
use crate::migrator::ReplicaMigrator;
use crate::quota_creator::QuotaCreator;
use crate::rpc::{
    ClusterRpc, ConfigAlteration, ConfigOp, ConfigResource, QuotaFilter, ReplicaPlacement,
    TopicSpec,
};
use crate::throttler::{
    ReplicationThrottler, ThrottleScope, ThrottleTarget, EGRESS_RATE_KEY, INGRESS_RATE_KEY,
};
use crate::topic_creator::TopicCreator;
use futures::future::join_all;
use sava_core::{
    AddingReplica, ClusterInfo, ConsumerGroup, DeletedRecord, Node, Partition, ProducerState,
    Quota, QuotaTarget, Replica, Topic, TopicPartition, TopicPartitionReplica, Transaction,
};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// The control-plane facade for one managed cluster.
///
/// `Admin` exclusively owns the transport toward the cluster and composes
/// every operation on top of it: resource listings, the cluster snapshot,
/// replica migration, replication throttling, quota management and
/// group/transaction cleanup. It holds no cluster state of its own — every
/// query is a fresh round-trip, and the one exception, [`ClusterInfo`], is an
/// explicitly frozen value owned by the caller.
///
/// The facade is cheap to clone and safe to share across tasks; calls issued
/// concurrently are not ordered against each other.
#[derive(Debug, Clone)]
pub struct Admin {
    rpc: Arc<dyn ClusterRpc>,
    closed: Arc<AtomicBool>,
}

impl Admin {
    pub fn builder() -> AdminBuilder {
        AdminBuilder::default()
    }

    /// Open a facade over an already-connected transport.
    pub fn new(rpc: impl ClusterRpc + 'static) -> Self {
        Admin {
            rpc: Arc::new(rpc),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(AdminError::ConnectionFailure(
                "admin client is closed".to_string(),
            ));
        }
        Ok(())
    }

    /// Release the underlying transport. Safe to call any number of times;
    /// snapshots handed out earlier stay valid. Operations issued after the
    /// first close fail with `ConnectionFailure`.
    pub async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.rpc.close().await
    }

    // ---- topics ----------------------------------------------------------

    /// Topic names; pass `false` to hide the cluster's internal topics.
    pub async fn topic_names(&self, list_internal: bool) -> Result<HashSet<String>> {
        self.ensure_open()?;
        self.rpc.topic_names(list_internal).await
    }

    /// All topic names, internal topics included.
    pub async fn all_topic_names(&self) -> Result<HashSet<String>> {
        self.topic_names(true).await
    }

    pub async fn topics(&self, names: HashSet<String>) -> Result<Vec<Topic>> {
        self.ensure_open()?;
        self.rpc.topics(&names).await
    }

    pub async fn delete_topics(&self, names: HashSet<String>) -> Result<()> {
        self.ensure_open()?;
        self.rpc.delete_topics(&names).await?;
        info!(topics = names.len(), "topics deleted");
        Ok(())
    }

    /// Builder for creating a topic with its configs.
    pub fn creator(&self) -> TopicCreator {
        TopicCreator::new(self.clone())
    }

    // ---- partitions and replicas -----------------------------------------

    pub async fn partitions(&self, topics: HashSet<String>) -> Result<Vec<Partition>> {
        self.ensure_open()?;
        self.rpc.partitions(&topics).await
    }

    /// All partitions of the cluster.
    pub async fn topic_partitions(&self) -> Result<BTreeSet<TopicPartition>> {
        let names = self.all_topic_names().await?;
        self.topic_partitions_of(names).await
    }

    pub async fn topic_partitions_of(
        &self,
        topics: HashSet<String>,
    ) -> Result<BTreeSet<TopicPartition>> {
        Ok(self
            .partitions(topics)
            .await?
            .iter()
            .map(|p| p.topic_partition())
            .collect())
    }

    /// Partitions with a replica hosted on `broker`.
    pub async fn topic_partitions_on_broker(
        &self,
        broker: i32,
    ) -> Result<BTreeSet<TopicPartition>> {
        Ok(self
            .replicas()
            .await?
            .into_iter()
            .filter(|(_, replicas)| replicas.iter().any(|r| r.broker == broker))
            .map(|(tp, _)| tp)
            .collect())
    }

    /// Replica placement of every partition of the cluster.
    pub async fn replicas(&self) -> Result<HashMap<TopicPartition, Vec<Replica>>> {
        let names = self.all_topic_names().await?;
        self.replicas_of(names).await
    }

    pub async fn replicas_of(
        &self,
        topics: HashSet<String>,
    ) -> Result<HashMap<TopicPartition, Vec<Replica>>> {
        self.ensure_open()?;
        let mut out: HashMap<TopicPartition, Vec<Replica>> = HashMap::new();
        for replica in self.rpc.replicas(&topics).await? {
            out.entry(replica.topic_partition()).or_default().push(replica);
        }
        Ok(out)
    }

    /// Replicas still catching up after reassignments of the given topics.
    pub async fn adding_replicas(&self, topics: HashSet<String>) -> Result<Vec<AddingReplica>> {
        self.ensure_open()?;
        self.rpc.adding_replicas(&topics).await
    }

    // ---- brokers ----------------------------------------------------------

    /// All alive nodes.
    pub async fn nodes(&self) -> Result<Vec<Node>> {
        self.ensure_open()?;
        self.rpc.nodes().await
    }

    pub async fn broker_ids(&self) -> Result<HashSet<i32>> {
        Ok(self.nodes().await?.iter().map(|n| n.id).collect())
    }

    /// Data folders per alive broker.
    pub async fn broker_folders(&self) -> Result<HashMap<i32, BTreeSet<String>>> {
        Ok(self
            .nodes()
            .await?
            .into_iter()
            .map(|n| (n.id, n.folders))
            .collect())
    }

    // ---- snapshot ---------------------------------------------------------

    /// Snapshot of the whole cluster at this moment.
    pub async fn cluster_info(&self) -> Result<ClusterInfo> {
        let names = self.all_topic_names().await?;
        self.cluster_info_of(names).await
    }

    /// Snapshot restricted to the given topics. All-or-nothing: if replica
    /// retrieval fails, the error propagates and no partial snapshot exists.
    pub async fn cluster_info_of(&self, topics: HashSet<String>) -> Result<ClusterInfo> {
        self.ensure_open()?;
        let nodes = self.rpc.nodes().await?;
        let replicas = self.rpc.replicas(&topics).await?;
        Ok(ClusterInfo::new(nodes, replicas))
    }

    // ---- migration and leadership -----------------------------------------

    /// Service moving replicas between brokers and data folders.
    pub fn migrator(&self) -> ReplicaMigrator {
        ReplicaMigrator::new(self.clone())
    }

    /// Make the preferred (first-assigned) replica the leader of the
    /// partition. The preferred replica must be in sync, otherwise the
    /// cluster refuses the election.
    pub async fn preferred_leader_election(&self, partition: &TopicPartition) -> Result<()> {
        self.ensure_open()?;
        self.rpc.elect_preferred_leader(partition).await?;
        info!(partition = %partition, "preferred leader elected");
        Ok(())
    }

    // ---- replication throttles ---------------------------------------------

    /// Builder applying bandwidth caps in one batched call.
    pub fn replication_throttler(&self) -> ReplicationThrottler {
        ReplicationThrottler::new(self.clone())
    }

    /// Remove the throttle entries owned by exactly the given scope. Scopes
    /// are independent: clearing a topic-level throttle leaves partition- and
    /// replica-level throttles on the same topic untouched. The replica form
    /// clears both the leader and the follower side of that log.
    pub async fn clear_replication_throttle(
        &self,
        target: impl Into<ThrottleTarget>,
    ) -> Result<()> {
        self.ensure_open()?;
        let target = target.into();
        self.rpc.alter_configs(&target.deletions()).await?;
        info!(?target, "replication throttle cleared");
        Ok(())
    }

    /// Remove only the leader-side throttle of one replica log.
    pub async fn clear_leader_replication_throttle(
        &self,
        log: &TopicPartitionReplica,
    ) -> Result<()> {
        self.clear_log_side(log, ThrottleScope::LeaderLog(log.clone())).await
    }

    /// Remove only the follower-side throttle of one replica log.
    pub async fn clear_follower_replication_throttle(
        &self,
        log: &TopicPartitionReplica,
    ) -> Result<()> {
        self.clear_log_side(log, ThrottleScope::FollowerLog(log.clone())).await
    }

    async fn clear_log_side(
        &self,
        log: &TopicPartitionReplica,
        scope: ThrottleScope,
    ) -> Result<()> {
        self.ensure_open()?;
        let alteration = ConfigAlteration {
            resource: scope.resource(),
            op: ConfigOp::Delete { key: scope.key() },
        };
        self.rpc.alter_configs(&[alteration]).await?;
        info!(log = %log, "one-sided replication throttle cleared");
        Ok(())
    }

    /// Remove the ingress bandwidth cap of every given broker. Each broker is
    /// cleared independently: a failure on one never prevents the others from
    /// being attempted, and already-cleared brokers stay cleared.
    pub async fn clear_ingress_replication_throttle(
        &self,
        brokers: HashSet<i32>,
    ) -> Result<()> {
        self.clear_broker_throttles("clear ingress replication throttle", INGRESS_RATE_KEY, brokers)
            .await
    }

    /// Remove the egress bandwidth cap of every given broker, best-effort per
    /// broker like the ingress variant.
    pub async fn clear_egress_replication_throttle(&self, brokers: HashSet<i32>) -> Result<()> {
        self.clear_broker_throttles("clear egress replication throttle", EGRESS_RATE_KEY, brokers)
            .await
    }

    async fn clear_broker_throttles(
        &self,
        operation: &'static str,
        key: &'static str,
        brokers: HashSet<i32>,
    ) -> Result<()> {
        self.ensure_open()?;
        let attempts = brokers.into_iter().map(|broker| {
            let rpc = self.rpc.clone();
            async move {
                let alteration = ConfigAlteration {
                    resource: ConfigResource::Broker(broker),
                    op: ConfigOp::Delete {
                        key: key.to_string(),
                    },
                };
                (broker, rpc.alter_configs(&[alteration]).await)
            }
        });

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        for (broker, outcome) in join_all(attempts).await {
            match outcome {
                Ok(()) => succeeded.push(broker),
                Err(error) => failed.push((broker, error)),
            }
        }
        succeeded.sort_unstable();
        failed.sort_by_key(|(broker, _)| *broker);

        if failed.is_empty() {
            info!(brokers = succeeded.len(), operation, "broker throttles cleared");
            return Ok(());
        }
        warn!(
            operation,
            cleared = ?succeeded,
            failed = failed.len(),
            "broker throttle clear partially failed"
        );
        Err(AdminError::PartialBatchFailure(BatchFailure {
            operation,
            succeeded,
            failed,
        }))
    }

    // ---- quotas -------------------------------------------------------------

    /// Builder creating or updating rate quotas.
    pub fn quota_creator(&self) -> QuotaCreator {
        QuotaCreator::new(self.clone())
    }

    /// All active quotas.
    pub async fn quotas(&self) -> Result<Vec<Quota>> {
        self.ensure_open()?;
        self.rpc.quotas(&QuotaFilter::default()).await
    }

    /// Active quotas for one target kind. Empty when none match.
    pub async fn quotas_of(&self, target: QuotaTarget) -> Result<Vec<Quota>> {
        self.ensure_open()?;
        self.rpc
            .quotas(&QuotaFilter {
                target: Some(target),
                entity: None,
            })
            .await
    }

    /// Active quotas for one entity of one target kind.
    pub async fn quotas_for(&self, target: QuotaTarget, entity: &str) -> Result<Vec<Quota>> {
        self.ensure_open()?;
        self.rpc
            .quotas(&QuotaFilter {
                target: Some(target),
                entity: Some(entity.to_string()),
            })
            .await
    }

    // ---- consumer groups -----------------------------------------------------

    pub async fn consumer_group_ids(&self) -> Result<HashSet<String>> {
        self.ensure_open()?;
        self.rpc.consumer_group_ids().await
    }

    pub async fn consumer_groups(&self, ids: HashSet<String>) -> Result<Vec<ConsumerGroup>> {
        self.ensure_open()?;
        self.rpc.consumer_groups(&ids).await
    }

    /// Remove an empty group. Errors if the group still has members.
    pub async fn remove_group(&self, group_id: &str) -> Result<()> {
        self.ensure_open()?;
        self.rpc.delete_group(group_id).await?;
        info!(group = group_id, "consumer group removed");
        Ok(())
    }

    /// Kick every member, dynamic and static, out of a group.
    pub async fn remove_all_members(&self, group_id: &str) -> Result<()> {
        self.ensure_open()?;
        self.rpc.remove_members(group_id, None).await?;
        info!(group = group_id, "all group members removed");
        Ok(())
    }

    /// Kick the static members with the given instance ids out of a group.
    pub async fn remove_static_members(
        &self,
        group_id: &str,
        members: HashSet<String>,
    ) -> Result<()> {
        self.ensure_open()?;
        self.rpc.remove_members(group_id, Some(&members)).await?;
        info!(group = group_id, members = members.len(), "static members removed");
        Ok(())
    }

    // ---- transactions and producers -------------------------------------------

    pub async fn transaction_ids(&self) -> Result<HashSet<String>> {
        self.ensure_open()?;
        self.rpc.transaction_ids().await
    }

    /// States of all tracked transactional ids.
    pub async fn transactions(&self) -> Result<HashMap<String, Transaction>> {
        let ids = self.transaction_ids().await?;
        self.transactions_of(ids).await
    }

    pub async fn transactions_of(
        &self,
        ids: HashSet<String>,
    ) -> Result<HashMap<String, Transaction>> {
        self.ensure_open()?;
        self.rpc.transactions(&ids).await
    }

    /// Producer states of every partition of the cluster.
    pub async fn producer_states(&self) -> Result<Vec<ProducerState>> {
        let partitions = self.topic_partitions().await?;
        self.producer_states_of(partitions.into_iter().collect()).await
    }

    pub async fn producer_states_of(
        &self,
        partitions: HashSet<TopicPartition>,
    ) -> Result<Vec<ProducerState>> {
        self.ensure_open()?;
        self.rpc.producer_states(&partitions).await
    }

    // ---- records ----------------------------------------------------------------

    /// Delete records with offsets below the given per-partition offsets,
    /// returning the resulting low watermark per partition.
    pub async fn delete_records(
        &self,
        offsets: HashMap<TopicPartition, u64>,
    ) -> Result<HashMap<TopicPartition, DeletedRecord>> {
        self.ensure_open()?;
        let deleted = self.rpc.delete_records(&offsets).await?;
        info!(partitions = deleted.len(), "records deleted");
        Ok(deleted)
    }

    // ---- crate-internal submission points for the service builders ---------------

    pub(crate) async fn submit_config_alterations(
        &self,
        alterations: &[ConfigAlteration],
    ) -> Result<()> {
        self.ensure_open()?;
        self.rpc.alter_configs(alterations).await
    }

    pub(crate) async fn submit_reassignment(
        &self,
        plan: &HashMap<TopicPartition, Vec<ReplicaPlacement>>,
    ) -> Result<()> {
        self.ensure_open()?;
        self.rpc.reassign(plan).await
    }

    pub(crate) async fn submit_quota(&self, quota: &Quota) -> Result<()> {
        self.ensure_open()?;
        self.rpc.alter_quota(quota).await
    }

    pub(crate) async fn submit_topic(&self, spec: TopicSpec) -> Result<()> {
        self.ensure_open()?;
        self.rpc.create_topic(spec).await
    }
}

/// Builder wiring an [`Admin`] to a cluster transport.
#[derive(Debug, Default)]
pub struct AdminBuilder {
    rpc: Option<Arc<dyn ClusterRpc>>,
}

impl AdminBuilder {
    /// Use the given transport toward the cluster.
    pub fn rpc(mut self, rpc: impl ClusterRpc + 'static) -> Self {
        self.rpc = Some(Arc::new(rpc));
        self
    }

    /// Use a transport that is shared with other components.
    pub fn shared_rpc(mut self, rpc: Arc<dyn ClusterRpc>) -> Self {
        self.rpc = Some(rpc);
        self
    }

    pub fn build(self) -> Result<Admin> {
        let rpc = self.rpc.ok_or_else(|| {
            AdminError::ConnectionFailure("no cluster transport configured".to_string())
        })?;
        Ok(Admin {
            rpc,
            closed: Arc::new(AtomicBool::new(false)),
        })
    }
}
