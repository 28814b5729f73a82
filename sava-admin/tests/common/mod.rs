// Shared helpers; not every test binary uses all of them.
#![allow(dead_code)]

use sava_admin::{Admin, MemoryCluster};
use sava_core::Node;

/// A cluster of `brokers` nodes (ids 1..=brokers), each with two data
/// folders, plus an `Admin` facade over it.
pub fn cluster_with_brokers(brokers: i32) -> (MemoryCluster, Admin) {
    let cluster = MemoryCluster::new();
    for id in 1..=brokers {
        cluster.add_node(Node::new(
            id,
            format!("broker-{}", id),
            9092,
            vec![format!("/data/{}/a", id), format!("/data/{}/b", id)],
        ));
    }
    let admin = Admin::new(cluster.clone());
    (cluster, admin)
}

/// Create `name` with the given partition count and replication factor.
pub async fn create_topic(admin: &Admin, name: &str, partitions: i32, replication: i16) {
    admin
        .creator()
        .topic(name)
        .partitions(partitions)
        .replication_factor(replication)
        .create()
        .await
        .expect("topic creation");
}
