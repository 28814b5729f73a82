use crate::errors::{AdminError, ResourceKind, Result};
use crate::rpc::{
    ClusterRpc, ConfigAlteration, ConfigOp, ConfigResource, QuotaFilter, ReplicaPlacement,
    TopicSpec,
};
use async_trait::async_trait;
use dashmap::DashMap;
use sava_core::{
    AddingReplica, ConsumerGroup, DeletedRecord, Node, Partition, ProducerState, Quota,
    QuotaLimit, QuotaTarget, Replica, Topic, TopicPartition, Transaction,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Clone)]
struct ReplicaState {
    broker: i32,
    folder: String,
    leader: bool,
    in_sync: bool,
    size: u64,
}

#[derive(Debug, Clone)]
struct PartitionState {
    earliest_offset: u64,
    latest_offset: u64,
    /// Assigned replicas, preferred leader first.
    replicas: Vec<ReplicaState>,
}

#[derive(Debug, Clone)]
struct TopicState {
    topic: Topic,
    partitions: Vec<PartitionState>,
}

type QuotaKey = (QuotaTarget, Option<String>, QuotaLimit);

/// MemoryCluster is an in-memory cluster backend that implements the
/// ClusterRpc trait. SHOULD BE USED ONLY FOR TESTING PURPOSES
///
/// Topic creation assigns replicas round-robin over the registered brokers,
/// first assignment leading. Reassignments are applied synchronously but the
/// new replicas are still reported through `adding_replicas`, the way a real
/// cluster reports in-flight movements.
#[derive(Debug, Clone, Default)]
pub struct MemoryCluster {
    brokers: Arc<DashMap<i32, Node>>,
    topics: Arc<DashMap<String, TopicState>>,
    configs: Arc<DashMap<ConfigResource, BTreeMap<String, String>>>,
    groups: Arc<DashMap<String, ConsumerGroup>>,
    txns: Arc<DashMap<String, Transaction>>,
    producers: Arc<DashMap<TopicPartition, Vec<ProducerState>>>,
    adding: Arc<DashMap<String, Vec<AddingReplica>>>,
    quotas: Arc<DashMap<QuotaKey, f64>>,
}

impl MemoryCluster {
    pub fn new() -> Self {
        MemoryCluster::default()
    }

    /// Register an alive broker.
    pub fn add_node(&self, node: Node) {
        self.brokers.insert(node.id, node);
    }

    /// Drop a broker from the alive set, as if it left the cluster.
    pub fn remove_node(&self, broker: i32) {
        self.brokers.remove(&broker);
    }

    pub fn add_group(&self, group: ConsumerGroup) {
        self.groups.insert(group.group_id.clone(), group);
    }

    pub fn add_transaction(&self, txn: Transaction) {
        self.txns.insert(txn.transaction_id.clone(), txn);
    }

    pub fn add_producer_state(&self, state: ProducerState) {
        self.producers
            .entry(state.topic_partition())
            .or_default()
            .push(state);
    }

    /// Mark a topic as cluster-internal bookkeeping. One partition,
    /// replicated on the lowest-id broker.
    pub fn add_internal_topic(&self, name: &str) {
        let placement = self.round_robin(0, 1);
        self.topics.insert(
            name.to_string(),
            TopicState {
                topic: Topic {
                    name: name.to_string(),
                    partitions: 1,
                    replication_factor: 1,
                    internal: true,
                    config: BTreeMap::new(),
                },
                partitions: vec![PartitionState {
                    earliest_offset: 0,
                    latest_offset: 0,
                    replicas: placement,
                }],
            },
        );
    }

    /// Advance the latest offset of one partition, so record deletion has
    /// something to trim.
    pub fn set_latest_offset(&self, partition: &TopicPartition, offset: u64) {
        if let Some(mut state) = self.topics.get_mut(&partition.topic) {
            if let Some(p) = state.partitions.get_mut(partition.partition as usize) {
                p.latest_offset = offset;
            }
        }
    }

    /// Flip the in-sync flag of one replica, as the cluster would when a
    /// follower falls behind.
    pub fn set_in_sync(&self, partition: &TopicPartition, broker: i32, in_sync: bool) {
        if let Some(mut state) = self.topics.get_mut(&partition.topic) {
            if let Some(p) = state.partitions.get_mut(partition.partition as usize) {
                if let Some(r) = p.replicas.iter_mut().find(|r| r.broker == broker) {
                    r.in_sync = in_sync;
                }
            }
        }
    }

    /// Report a replica size, as brokers would in their periodic metadata.
    pub fn set_replica_size(&self, partition: &TopicPartition, broker: i32, size: u64) {
        if let Some(mut state) = self.topics.get_mut(&partition.topic) {
            if let Some(p) = state.partitions.get_mut(partition.partition as usize) {
                if let Some(r) = p.replicas.iter_mut().find(|r| r.broker == broker) {
                    r.size = size;
                }
            }
        }
    }

    /// Current dynamic config of a resource, for assertions.
    pub fn config_of(&self, resource: &ConfigResource) -> BTreeMap<String, String> {
        self.configs
            .get(resource)
            .map(|entry| entry.clone())
            .unwrap_or_default()
    }

    fn round_robin(&self, partition: i32, replication_factor: i16) -> Vec<ReplicaState> {
        let mut ids: Vec<i32> = self.brokers.iter().map(|e| *e.key()).collect();
        ids.sort_unstable();
        if ids.is_empty() {
            return Vec::new();
        }
        (0..replication_factor as usize)
            .map(|i| {
                let broker = ids[(partition as usize + i) % ids.len()];
                ReplicaState {
                    broker,
                    folder: self.default_folder(broker),
                    leader: i == 0,
                    in_sync: true,
                    size: 0,
                }
            })
            .collect()
    }

    fn default_folder(&self, broker: i32) -> String {
        self.brokers
            .get(&broker)
            .and_then(|n| n.folders.iter().next().cloned())
            .unwrap_or_default()
    }

    fn topic_or_err(&self, name: &str) -> Result<dashmap::mapref::one::Ref<'_, String, TopicState>> {
        self.topics
            .get(name)
            .ok_or_else(|| AdminError::not_found(ResourceKind::Topic, name))
    }

    fn partition_exists(&self, partition: &TopicPartition) -> Result<()> {
        let state = self.topic_or_err(&partition.topic)?;
        if (partition.partition as usize) < state.partitions.len() && partition.partition >= 0 {
            Ok(())
        } else {
            Err(AdminError::not_found(
                ResourceKind::Partition,
                partition.to_string(),
            ))
        }
    }
}

#[async_trait]
impl ClusterRpc for MemoryCluster {
    async fn topic_names(&self, list_internal: bool) -> Result<HashSet<String>> {
        Ok(self
            .topics
            .iter()
            .filter(|e| list_internal || !e.value().topic.internal)
            .map(|e| e.key().clone())
            .collect())
    }

    async fn topics(&self, names: &HashSet<String>) -> Result<Vec<Topic>> {
        names
            .iter()
            .map(|name| self.topic_or_err(name).map(|s| s.topic.clone()))
            .collect()
    }

    async fn create_topic(&self, spec: TopicSpec) -> Result<()> {
        if self.topics.contains_key(&spec.name) {
            return Err(AdminError::rejected(
                "create topic",
                format!("topic {} already exists", spec.name),
            ));
        }
        if self.brokers.is_empty() {
            return Err(AdminError::rejected("create topic", "no alive brokers"));
        }
        if spec.replication_factor as usize > self.brokers.len() {
            return Err(AdminError::rejected(
                "create topic",
                format!(
                    "replication factor {} exceeds broker count {}",
                    spec.replication_factor,
                    self.brokers.len()
                ),
            ));
        }
        let partitions = (0..spec.partitions)
            .map(|p| PartitionState {
                earliest_offset: 0,
                latest_offset: 0,
                replicas: self.round_robin(p, spec.replication_factor),
            })
            .collect();
        self.topics.insert(
            spec.name.clone(),
            TopicState {
                topic: Topic {
                    name: spec.name,
                    partitions: spec.partitions,
                    replication_factor: spec.replication_factor,
                    internal: false,
                    config: spec.config,
                },
                partitions,
            },
        );
        Ok(())
    }

    async fn delete_topics(&self, names: &HashSet<String>) -> Result<()> {
        for name in names {
            self.topic_or_err(name)?;
        }
        for name in names {
            self.topics.remove(name);
            self.configs.remove(&ConfigResource::Topic(name.clone()));
            self.adding.remove(name);
        }
        Ok(())
    }

    async fn partitions(&self, topics: &HashSet<String>) -> Result<Vec<Partition>> {
        let mut out = Vec::new();
        for name in topics {
            let state = self.topic_or_err(name)?;
            for (index, p) in state.partitions.iter().enumerate() {
                out.push(Partition {
                    topic: name.clone(),
                    partition: index as i32,
                    earliest_offset: p.earliest_offset,
                    latest_offset: p.latest_offset,
                    leader: p.replicas.iter().find(|r| r.leader).map(|r| r.broker),
                    replicas: p.replicas.iter().map(|r| r.broker).collect(),
                    in_sync: p
                        .replicas
                        .iter()
                        .filter(|r| r.in_sync)
                        .map(|r| r.broker)
                        .collect(),
                });
            }
        }
        Ok(out)
    }

    async fn replicas(&self, topics: &HashSet<String>) -> Result<Vec<Replica>> {
        let mut out = Vec::new();
        for name in topics {
            let state = self.topic_or_err(name)?;
            for (index, p) in state.partitions.iter().enumerate() {
                for r in &p.replicas {
                    out.push(Replica {
                        topic: name.clone(),
                        partition: index as i32,
                        broker: r.broker,
                        folder: r.folder.clone(),
                        leader: r.leader,
                        in_sync: r.in_sync,
                        size: r.size,
                    });
                }
            }
        }
        Ok(out)
    }

    async fn nodes(&self) -> Result<Vec<Node>> {
        let mut nodes: Vec<Node> = self.brokers.iter().map(|e| e.value().clone()).collect();
        nodes.sort_by_key(|n| n.id);
        Ok(nodes)
    }

    async fn consumer_group_ids(&self) -> Result<HashSet<String>> {
        Ok(self.groups.iter().map(|e| e.key().clone()).collect())
    }

    async fn consumer_groups(&self, ids: &HashSet<String>) -> Result<Vec<ConsumerGroup>> {
        ids.iter()
            .map(|id| {
                self.groups
                    .get(id)
                    .map(|g| g.clone())
                    .ok_or_else(|| AdminError::not_found(ResourceKind::Group, id))
            })
            .collect()
    }

    async fn delete_group(&self, group_id: &str) -> Result<()> {
        let group = self
            .groups
            .get(group_id)
            .ok_or_else(|| AdminError::not_found(ResourceKind::Group, group_id))?;
        if !group.members.is_empty() {
            return Err(AdminError::rejected(
                "delete group",
                format!("group {} still has members", group_id),
            ));
        }
        drop(group);
        self.groups.remove(group_id);
        Ok(())
    }

    async fn remove_members(
        &self,
        group_id: &str,
        members: Option<&HashSet<String>>,
    ) -> Result<()> {
        let mut group = self
            .groups
            .get_mut(group_id)
            .ok_or_else(|| AdminError::not_found(ResourceKind::Group, group_id))?;
        match members {
            None => group.members.clear(),
            Some(instance_ids) => group.members.retain(|m| {
                m.group_instance_id
                    .as_ref()
                    .map(|id| !instance_ids.contains(id))
                    .unwrap_or(true)
            }),
        }
        Ok(())
    }

    async fn transaction_ids(&self) -> Result<HashSet<String>> {
        Ok(self.txns.iter().map(|e| e.key().clone()).collect())
    }

    async fn transactions(&self, ids: &HashSet<String>) -> Result<HashMap<String, Transaction>> {
        ids.iter()
            .map(|id| {
                self.txns
                    .get(id)
                    .map(|t| (id.clone(), t.clone()))
                    .ok_or_else(|| AdminError::not_found(ResourceKind::Transaction, id))
            })
            .collect()
    }

    async fn producer_states(
        &self,
        partitions: &HashSet<TopicPartition>,
    ) -> Result<Vec<ProducerState>> {
        let mut out = Vec::new();
        for tp in partitions {
            self.partition_exists(tp)?;
            if let Some(states) = self.producers.get(tp) {
                out.extend(states.iter().cloned());
            }
        }
        Ok(out)
    }

    async fn adding_replicas(&self, topics: &HashSet<String>) -> Result<Vec<AddingReplica>> {
        let mut out = Vec::new();
        for name in topics {
            self.topic_or_err(name)?;
            if let Some(entries) = self.adding.get(name) {
                out.extend(entries.iter().cloned());
            }
        }
        Ok(out)
    }

    async fn delete_records(
        &self,
        offsets: &HashMap<TopicPartition, u64>,
    ) -> Result<HashMap<TopicPartition, DeletedRecord>> {
        for tp in offsets.keys() {
            self.partition_exists(tp)?;
        }
        let mut out = HashMap::new();
        for (tp, &offset) in offsets {
            let mut state = self
                .topics
                .get_mut(&tp.topic)
                .ok_or_else(|| AdminError::not_found(ResourceKind::Topic, &tp.topic))?;
            let p = &mut state.partitions[tp.partition as usize];
            let low_watermark = p.earliest_offset.max(offset.min(p.latest_offset));
            p.earliest_offset = low_watermark;
            out.insert(tp.clone(), DeletedRecord { low_watermark });
        }
        Ok(out)
    }

    async fn elect_preferred_leader(&self, partition: &TopicPartition) -> Result<()> {
        self.partition_exists(partition)?;
        let mut state = self
            .topics
            .get_mut(&partition.topic)
            .ok_or_else(|| AdminError::not_found(ResourceKind::Topic, &partition.topic))?;
        let p = &mut state.partitions[partition.partition as usize];
        let preferred = match p.replicas.first() {
            Some(r) => r.broker,
            None => {
                return Err(AdminError::rejected(
                    "preferred leader election",
                    format!("partition {} has no replicas", partition),
                ))
            }
        };
        let in_sync = p
            .replicas
            .iter()
            .find(|r| r.broker == preferred)
            .map(|r| r.in_sync)
            .unwrap_or(false);
        if !in_sync {
            return Err(AdminError::rejected(
                "preferred leader election",
                format!("preferred replica {}@{} is not in sync", partition, preferred),
            ));
        }
        for r in p.replicas.iter_mut() {
            r.leader = r.broker == preferred;
        }
        Ok(())
    }

    async fn reassign(
        &self,
        plan: &HashMap<TopicPartition, Vec<ReplicaPlacement>>,
    ) -> Result<()> {
        // Reject the whole request before touching anything, the way a real
        // cluster validates a reassignment submission.
        for (tp, placements) in plan {
            let state = self.topics.get(&tp.topic).ok_or_else(|| {
                AdminError::rejected("reassignment", format!("unknown partition {}", tp))
            })?;
            if tp.partition < 0 || tp.partition as usize >= state.partitions.len() {
                return Err(AdminError::rejected(
                    "reassignment",
                    format!("unknown partition {}", tp),
                ));
            }
            if placements.is_empty() {
                return Err(AdminError::rejected(
                    "reassignment",
                    format!("empty placement for {}", tp),
                ));
            }
            let mut seen = HashSet::new();
            for placement in placements {
                if !self.brokers.contains_key(&placement.broker) {
                    return Err(AdminError::rejected(
                        "reassignment",
                        format!("unknown broker {}", placement.broker),
                    ));
                }
                if !seen.insert(placement.broker) {
                    return Err(AdminError::rejected(
                        "reassignment",
                        format!("duplicate broker {} in placement for {}", placement.broker, tp),
                    ));
                }
            }
        }

        for (tp, placements) in plan {
            let mut state = self.topics.get_mut(&tp.topic).ok_or_else(|| {
                AdminError::rejected("reassignment", format!("unknown partition {}", tp))
            })?;
            let p = &mut state.partitions[tp.partition as usize];
            let leader_broker = p.replicas.iter().find(|r| r.leader).map(|r| r.broker);
            let leader_size = p
                .replicas
                .iter()
                .find(|r| r.leader)
                .map(|r| r.size)
                .unwrap_or(0);

            let mut next = Vec::with_capacity(placements.len());
            for placement in placements {
                match p.replicas.iter().find(|r| r.broker == placement.broker) {
                    // An unset folder keeps an already-hosted log where it is.
                    Some(existing) => next.push(ReplicaState {
                        broker: existing.broker,
                        folder: placement
                            .folder
                            .clone()
                            .unwrap_or_else(|| existing.folder.clone()),
                        leader: existing.leader,
                        in_sync: existing.in_sync,
                        size: existing.size,
                    }),
                    None => {
                        let folder = placement
                            .folder
                            .clone()
                            .unwrap_or_else(|| self.default_folder(placement.broker));
                        next.push(ReplicaState {
                            broker: placement.broker,
                            folder: folder.clone(),
                            leader: false,
                            in_sync: false,
                            size: 0,
                        });
                        self.adding.entry(tp.topic.clone()).or_default().push(
                            AddingReplica {
                                topic: tp.topic.clone(),
                                partition: tp.partition,
                                broker: placement.broker,
                                folder,
                                size: 0,
                                leader_size,
                            },
                        );
                    }
                }
            }
            // Leadership survives the move when the old leader stays
            // assigned; otherwise the first new assignment takes over.
            let leader_survives =
                leader_broker.is_some_and(|b| next.iter().any(|r| r.broker == b));
            if !leader_survives {
                if let Some(first) = next.first_mut() {
                    first.leader = true;
                    first.in_sync = true;
                }
            }
            p.replicas = next;
        }
        Ok(())
    }

    async fn describe_config(
        &self,
        resource: &ConfigResource,
    ) -> Result<BTreeMap<String, String>> {
        match resource {
            ConfigResource::Broker(id) if !self.brokers.contains_key(id) => {
                return Err(AdminError::not_found(ResourceKind::Broker, id.to_string()))
            }
            ConfigResource::Topic(name) if !self.topics.contains_key(name) => {
                return Err(AdminError::not_found(ResourceKind::Topic, name))
            }
            _ => {}
        }
        Ok(self.config_of(resource))
    }

    async fn alter_configs(&self, alterations: &[ConfigAlteration]) -> Result<()> {
        for alteration in alterations {
            match &alteration.resource {
                ConfigResource::Broker(id) if !self.brokers.contains_key(id) => {
                    return Err(AdminError::not_found(ResourceKind::Broker, id.to_string()))
                }
                ConfigResource::Topic(name) if !self.topics.contains_key(name) => {
                    return Err(AdminError::not_found(ResourceKind::Topic, name))
                }
                _ => {}
            }
        }
        for alteration in alterations {
            let mut entries = self.configs.entry(alteration.resource.clone()).or_default();
            match &alteration.op {
                ConfigOp::Set { key, value } => {
                    entries.insert(key.clone(), value.clone());
                }
                ConfigOp::Delete { key } => {
                    entries.remove(key);
                }
            }
        }
        Ok(())
    }

    async fn quotas(&self, filter: &QuotaFilter) -> Result<Vec<Quota>> {
        Ok(self
            .quotas
            .iter()
            .filter(|e| {
                let (target, entity, _) = e.key();
                filter.target.map(|t| t == *target).unwrap_or(true)
                    && filter
                        .entity
                        .as_ref()
                        .map(|v| entity.as_deref() == Some(v.as_str()))
                        .unwrap_or(true)
            })
            .map(|e| {
                let (target, entity, limit) = e.key().clone();
                Quota::new(target, entity, limit, *e.value())
            })
            .collect())
    }

    async fn alter_quota(&self, quota: &Quota) -> Result<()> {
        self.quotas.insert(
            (quota.target, quota.entity.clone(), quota.limit),
            quota.value,
        );
        Ok(())
    }
}
