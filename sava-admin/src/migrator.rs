use crate::admin::Admin;
use crate::errors::{AdminError, ResourceKind, Result};
use crate::rpc::ReplicaPlacement;
use sava_core::{Replica, TopicPartition, TopicPartitionReplica};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Where a replica should end up: a broker and, optionally, a specific data
/// folder on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub broker: i32,
    pub folder: Option<String>,
}

impl Destination {
    /// Move to `broker`, letting it pick the folder.
    pub fn broker(broker: i32) -> Self {
        Destination {
            broker,
            folder: None,
        }
    }

    /// Move to a specific folder on `broker`. Moving a replica within its
    /// current broker is how a folder-only migration is expressed.
    pub fn folder(broker: i32, folder: impl Into<String>) -> Self {
        Destination {
            broker,
            folder: Some(folder.into()),
        }
    }
}

/// Computes and submits reassignment plans moving replicas between brokers
/// and/or data folders.
///
/// Every entry is validated against the current cluster state before
/// anything is submitted; a structurally invalid destination fails the whole
/// call with `InvalidTarget` and no mutating call reaches the cluster. The
/// submission itself is one batched request, acknowledged by the cluster
/// before the data movement completes. Nothing is retried here and no
/// ordering between entries is guaranteed beyond "submitted together".
#[derive(Debug)]
pub struct ReplicaMigrator {
    admin: Admin,
}

impl ReplicaMigrator {
    pub(crate) fn new(admin: Admin) -> Self {
        ReplicaMigrator { admin }
    }

    pub async fn move_replicas(
        &self,
        plan: HashMap<TopicPartitionReplica, Destination>,
    ) -> Result<()> {
        if plan.is_empty() {
            return Ok(());
        }

        let nodes = self.admin.nodes().await?;
        let alive: HashMap<i32, _> = nodes.iter().map(|n| (n.id, n)).collect();
        for (source, destination) in &plan {
            let node = alive.get(&destination.broker).ok_or_else(|| {
                AdminError::invalid_target(
                    "replica migration",
                    format!(
                        "destination broker {} for {} is not alive",
                        destination.broker, source
                    ),
                )
            })?;
            if let Some(folder) = &destination.folder {
                if !node.has_folder(folder) {
                    return Err(AdminError::invalid_target(
                        "replica migration",
                        format!(
                            "folder {} is not a data folder of broker {}",
                            folder, destination.broker
                        ),
                    ));
                }
            }
        }

        let topics: HashSet<String> = plan.keys().map(|log| log.topic.clone()).collect();
        let mut current: HashMap<TopicPartition, Vec<Replica>> = HashMap::new();
        for topic in topics {
            match self.admin.replicas_of(HashSet::from([topic])).await {
                Ok(placement) => current.extend(placement),
                // The cluster passes final judgment on partitions it does
                // not know; the submission below comes back rejected.
                Err(AdminError::ResourceNotFound { .. }) => {}
                Err(error) => return Err(error),
            }
        }

        let mut moves: HashMap<TopicPartition, Vec<(TopicPartitionReplica, &Destination)>> =
            HashMap::new();
        for (source, destination) in &plan {
            moves
                .entry(source.topic_partition())
                .or_default()
                .push((source.clone(), destination));
        }

        let mut submission: HashMap<TopicPartition, Vec<ReplicaPlacement>> = HashMap::new();
        for (tp, entries) in moves {
            // A partition the cluster no longer knows is submitted as-is and
            // rejected by the cluster, not second-guessed here.
            let mut placements: Vec<ReplicaPlacement> = current
                .get(&tp)
                .map(|replicas| {
                    replicas
                        .iter()
                        .map(|r| ReplicaPlacement {
                            broker: r.broker,
                            folder: None,
                        })
                        .collect()
                })
                .unwrap_or_default();
            for (source, destination) in entries {
                if placements.is_empty() {
                    placements.push(ReplicaPlacement {
                        broker: destination.broker,
                        folder: destination.folder.clone(),
                    });
                    continue;
                }
                let slot = placements
                    .iter_mut()
                    .find(|p| p.broker == source.broker)
                    .ok_or_else(|| {
                        AdminError::not_found(ResourceKind::Replica, source.to_string())
                    })?;
                slot.broker = destination.broker;
                slot.folder = destination.folder.clone();
            }
            submission.insert(tp, placements);
        }

        self.admin.submit_reassignment(&submission).await?;
        info!(
            partitions = submission.len(),
            "reassignment plan accepted by the cluster"
        );
        Ok(())
    }
}
