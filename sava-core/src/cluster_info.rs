use crate::node::Node;
use crate::replica::Replica;
use crate::topic::TopicPartition;
use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

/// A point-in-time view of cluster topology and replica placement.
///
/// Immutable after construction: every query over the same instance returns
/// identical results, with no live re-query of the cluster. Derived indices
/// (by topic, by broker, by partition) are built on first use and cached for
/// the lifetime of the snapshot. The snapshot holds no reference to the
/// facade that produced it, so it stays valid after the facade is closed.
#[derive(Debug)]
pub struct ClusterInfo {
    nodes: Vec<Node>,
    replicas: Vec<Replica>,
    by_topic: OnceLock<HashMap<String, Vec<usize>>>,
    by_broker: OnceLock<HashMap<i32, Vec<usize>>>,
    by_partition: OnceLock<HashMap<TopicPartition, Vec<usize>>>,
}

impl ClusterInfo {
    pub fn new(nodes: Vec<Node>, replicas: Vec<Replica>) -> Self {
        ClusterInfo {
            nodes,
            replicas,
            by_topic: OnceLock::new(),
            by_broker: OnceLock::new(),
            by_partition: OnceLock::new(),
        }
    }

    /// All alive nodes captured by this snapshot.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All replicas captured by this snapshot, restricted to the topic set
    /// it was built for.
    pub fn replicas(&self) -> &[Replica] {
        &self.replicas
    }

    /// Replicas of one topic. A topic outside the snapshot's topic set is
    /// simply absent: the result is empty.
    pub fn replicas_of_topic(&self, topic: &str) -> Vec<&Replica> {
        self.topic_index()
            .get(topic)
            .map(|ids| ids.iter().map(|&i| &self.replicas[i]).collect())
            .unwrap_or_default()
    }

    /// Replicas hosted on one broker.
    pub fn replicas_on_broker(&self, broker: i32) -> Vec<&Replica> {
        self.broker_index()
            .get(&broker)
            .map(|ids| ids.iter().map(|&i| &self.replicas[i]).collect())
            .unwrap_or_default()
    }

    /// Replicas of one partition.
    pub fn replicas_of_partition(&self, partition: &TopicPartition) -> Vec<&Replica> {
        self.partition_index()
            .get(partition)
            .map(|ids| ids.iter().map(|&i| &self.replicas[i]).collect())
            .unwrap_or_default()
    }

    /// The leader replica of one partition, if the snapshot captured one.
    pub fn leader(&self, partition: &TopicPartition) -> Option<&Replica> {
        self.replicas_of_partition(partition)
            .into_iter()
            .find(|r| r.leader)
    }

    /// Names of the topics present in this snapshot.
    pub fn topic_names(&self) -> BTreeSet<&str> {
        self.replicas.iter().map(|r| r.topic.as_str()).collect()
    }

    /// All partitions present in this snapshot.
    pub fn topic_partitions(&self) -> BTreeSet<TopicPartition> {
        self.replicas.iter().map(|r| r.topic_partition()).collect()
    }

    /// Data folders per broker, derived from node metadata.
    pub fn broker_folders(&self) -> HashMap<i32, BTreeSet<String>> {
        self.nodes
            .iter()
            .map(|n| (n.id, n.folders.clone()))
            .collect()
    }

    fn topic_index(&self) -> &HashMap<String, Vec<usize>> {
        self.by_topic.get_or_init(|| {
            let mut index: HashMap<String, Vec<usize>> = HashMap::new();
            for (i, replica) in self.replicas.iter().enumerate() {
                index.entry(replica.topic.clone()).or_default().push(i);
            }
            index
        })
    }

    fn broker_index(&self) -> &HashMap<i32, Vec<usize>> {
        self.by_broker.get_or_init(|| {
            let mut index: HashMap<i32, Vec<usize>> = HashMap::new();
            for (i, replica) in self.replicas.iter().enumerate() {
                index.entry(replica.broker).or_default().push(i);
            }
            index
        })
    }

    fn partition_index(&self) -> &HashMap<TopicPartition, Vec<usize>> {
        self.by_partition.get_or_init(|| {
            let mut index: HashMap<TopicPartition, Vec<usize>> = HashMap::new();
            for (i, replica) in self.replicas.iter().enumerate() {
                index.entry(replica.topic_partition()).or_default().push(i);
            }
            index
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replica(topic: &str, partition: i32, broker: i32, leader: bool) -> Replica {
        Replica {
            topic: topic.to_string(),
            partition,
            broker,
            folder: format!("/data/{}", broker),
            leader,
            in_sync: true,
            size: 0,
        }
    }

    fn two_node_snapshot() -> ClusterInfo {
        let nodes = vec![
            Node::new(1, "n1", 9092, vec!["/data/1".to_string()]),
            Node::new(2, "n2", 9092, vec!["/data/2".to_string()]),
        ];
        let replicas = vec![replica("T", 0, 1, true), replica("T", 0, 2, false)];
        ClusterInfo::new(nodes, replicas)
    }

    #[test]
    fn snapshot_reports_nodes_partitions_and_single_leader() {
        let info = two_node_snapshot();

        assert_eq!(info.nodes().len(), 2);
        assert_eq!(info.replicas().len(), 2);
        assert_eq!(info.topic_partitions().len(), 1);

        let tp = TopicPartition::new("T", 0);
        let leaders: Vec<_> = info
            .replicas_of_partition(&tp)
            .into_iter()
            .filter(|r| r.leader)
            .collect();
        assert_eq!(leaders.len(), 1);
        assert_eq!(leaders[0].broker, 1);
    }

    #[test]
    fn topic_filter_leaves_absent_topics_absent() {
        let nodes = vec![Node::new(1, "n1", 9092, vec!["/data/1".to_string()])];
        // Snapshot built for {T1} only; T2 never enters it.
        let replicas = vec![replica("T1", 0, 1, true)];
        let info = ClusterInfo::new(nodes, replicas);

        assert_eq!(info.replicas_of_topic("T1").len(), 1);
        assert!(info.replicas_of_topic("T2").is_empty());
        assert!(!info.topic_names().contains("T2"));
    }

    #[test]
    fn broker_folders_derive_from_node_metadata() {
        let info = two_node_snapshot();
        let folders = info.broker_folders();
        assert_eq!(folders[&1], BTreeSet::from(["/data/1".to_string()]));
        assert_eq!(folders[&2], BTreeSet::from(["/data/2".to_string()]));
    }

    #[test]
    fn reads_over_the_same_snapshot_are_stable() {
        let info = two_node_snapshot();
        let first = info.replicas_on_broker(1).len();
        let second = info.replicas_on_broker(1).len();
        assert_eq!(first, second);
        assert_eq!(first, 1);
    }
}
