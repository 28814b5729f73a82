use sava_admin::{AdminError, ClusterRpc, ConfigResource};
use sava_core::{DataRate, TopicPartition, TopicPartitionReplica};
use std::collections::HashSet;

mod common;
use common::{cluster_with_brokers, create_topic};

/// Throttle scopes are independent namespaces: clearing the topic-level
/// throttle must leave a partition-level throttle on the same topic intact.
#[tokio::test]
async fn topic_clear_leaves_partition_scope_intact() {
    let (cluster, admin) = cluster_with_brokers(2);
    create_topic(&admin, "T", 2, 2).await;
    let tp = TopicPartition::new("T", 0);

    admin
        .replication_throttler()
        .topic("T", DataRate::mib_per_sec(10))
        .partition(tp.clone(), DataRate::mib_per_sec(1))
        .apply()
        .await
        .expect("throttle");

    admin
        .clear_replication_throttle("T")
        .await
        .expect("clear topic scope");

    let config = cluster
        .describe_config(&ConfigResource::Topic("T".to_string()))
        .await
        .expect("config");
    assert!(!config.contains_key("replication.throttle.topic.rate"));
    assert_eq!(
        config.get("replication.throttle.partition.0.rate"),
        Some(&DataRate::mib_per_sec(1).as_bytes_per_sec().to_string())
    );
}

/// Clearing the leader side of a replica log must not remove the follower
/// side set on the same log, and the other way around.
#[tokio::test]
async fn one_sided_clears_leave_the_other_side() {
    let (cluster, admin) = cluster_with_brokers(2);
    create_topic(&admin, "T", 1, 2).await;
    let log = TopicPartitionReplica::new("T", 0, 1);

    admin
        .replication_throttler()
        .leader_log(log.clone(), DataRate::kib_per_sec(500))
        .follower_log(log.clone(), DataRate::kib_per_sec(250))
        .apply()
        .await
        .expect("throttle");

    admin
        .clear_leader_replication_throttle(&log)
        .await
        .expect("clear leader side");

    let config = cluster
        .describe_config(&ConfigResource::Topic("T".to_string()))
        .await
        .expect("config");
    assert!(!config.contains_key("replication.throttle.replica.0.1.leader.rate"));
    assert!(config.contains_key("replication.throttle.replica.0.1.follower.rate"));
}

/// Clearing a whole replica log removes both sides but nothing else.
#[tokio::test]
async fn replica_clear_removes_both_sides_only() {
    let (cluster, admin) = cluster_with_brokers(2);
    create_topic(&admin, "T", 1, 2).await;
    let log = TopicPartitionReplica::new("T", 0, 1);
    let other = TopicPartitionReplica::new("T", 0, 2);

    admin
        .replication_throttler()
        .leader_log(log.clone(), DataRate::kib_per_sec(500))
        .follower_log(log.clone(), DataRate::kib_per_sec(500))
        .leader_log(other.clone(), DataRate::kib_per_sec(500))
        .apply()
        .await
        .expect("throttle");

    admin
        .clear_replication_throttle(log)
        .await
        .expect("clear replica log");

    let config = cluster
        .describe_config(&ConfigResource::Topic("T".to_string()))
        .await
        .expect("config");
    assert!(!config.contains_key("replication.throttle.replica.0.1.leader.rate"));
    assert!(!config.contains_key("replication.throttle.replica.0.1.follower.rate"));
    assert!(config.contains_key("replication.throttle.replica.0.2.leader.rate"));
}

/// Re-applying the same limit overwrites the value; the caller sees a no-op.
#[tokio::test]
async fn reapplying_a_limit_is_idempotent() {
    let (cluster, admin) = cluster_with_brokers(1);
    create_topic(&admin, "T", 1, 1).await;

    for _ in 0..2 {
        admin
            .replication_throttler()
            .topic("T", DataRate::mib_per_sec(5))
            .apply()
            .await
            .expect("throttle");
    }

    let config = cluster
        .describe_config(&ConfigResource::Topic("T".to_string()))
        .await
        .expect("config");
    assert_eq!(
        config.get("replication.throttle.topic.rate"),
        Some(&DataRate::mib_per_sec(5).as_bytes_per_sec().to_string())
    );
}

/// Broker-wide caps land on the broker resource, one key per direction.
#[tokio::test]
async fn broker_caps_set_and_clear_per_direction() {
    let (cluster, admin) = cluster_with_brokers(2);

    admin
        .replication_throttler()
        .ingress(1, DataRate::mib_per_sec(100))
        .egress(1, DataRate::mib_per_sec(50))
        .apply()
        .await
        .expect("throttle");

    admin
        .clear_ingress_replication_throttle(HashSet::from([1]))
        .await
        .expect("clear ingress");

    let config = cluster
        .describe_config(&ConfigResource::Broker(1))
        .await
        .expect("config");
    assert!(!config.contains_key("replication.throttle.ingress.rate"));
    assert!(config.contains_key("replication.throttle.egress.rate"));
}

/// Clearing brokers {1,2,3} where broker 2 is gone must clear 1 and 3 and
/// report exactly broker 2 as failed. Cleared brokers stay cleared.
#[tokio::test]
async fn broker_clear_collects_partial_failures() {
    let (cluster, admin) = cluster_with_brokers(3);

    admin
        .replication_throttler()
        .ingress(1, DataRate::mib_per_sec(10))
        .ingress(2, DataRate::mib_per_sec(10))
        .ingress(3, DataRate::mib_per_sec(10))
        .apply()
        .await
        .expect("throttle");

    cluster.remove_node(2);

    let result = admin
        .clear_ingress_replication_throttle(HashSet::from([1, 2, 3]))
        .await;

    match result {
        Err(AdminError::PartialBatchFailure(batch)) => {
            assert_eq!(batch.succeeded, vec![1, 3]);
            assert_eq!(batch.failed.len(), 1);
            assert_eq!(batch.failed[0].0, 2);
            assert!(matches!(
                batch.failed[0].1,
                AdminError::ResourceNotFound { .. }
            ));
        }
        other => panic!("expected partial batch failure, got {:?}", other),
    }

    for broker in [1, 3] {
        let config = cluster
            .describe_config(&ConfigResource::Broker(broker))
            .await
            .expect("config");
        assert!(!config.contains_key("replication.throttle.ingress.rate"));
    }
}

/// A throttle aimed at a topic the cluster no longer knows fails with
/// ResourceNotFound instead of silently materializing config entries.
#[tokio::test]
async fn throttling_a_missing_topic_errors() {
    let (_cluster, admin) = cluster_with_brokers(1);

    let result = admin
        .replication_throttler()
        .topic("ghost", DataRate::mib_per_sec(1))
        .apply()
        .await;
    assert!(matches!(result, Err(AdminError::ResourceNotFound { .. })));
}
