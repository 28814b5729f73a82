use sava_admin::AdminError;
use sava_core::{
    ConsumerGroup, GroupMember, ProducerState, TopicPartition, Transaction, TransactionState,
};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

mod common;
use common::{cluster_with_brokers, create_topic};

fn group(id: &str, members: Vec<GroupMember>) -> ConsumerGroup {
    ConsumerGroup {
        group_id: id.to_string(),
        members,
        offsets: BTreeMap::new(),
    }
}

fn static_member(instance: &str) -> GroupMember {
    GroupMember {
        member_id: format!("member-{}", instance),
        group_instance_id: Some(instance.to_string()),
        client_id: "app".to_string(),
        host: "10.0.0.1".to_string(),
    }
}

/// A created topic is visible through names, descriptions and partitions.
#[tokio::test]
async fn topic_creation_round_trip() {
    let (_cluster, admin) = cluster_with_brokers(3);

    admin
        .creator()
        .topic("orders")
        .partitions(4)
        .replication_factor(2)
        .config("retention.ms", "86400000")
        .create()
        .await
        .expect("create");

    assert!(admin
        .all_topic_names()
        .await
        .expect("names")
        .contains("orders"));

    let topics = admin
        .topics(HashSet::from(["orders".to_string()]))
        .await
        .expect("describe");
    assert_eq!(topics[0].partitions, 4);
    assert_eq!(topics[0].replication_factor, 2);
    assert_eq!(
        topics[0].config.get("retention.ms").map(String::as_str),
        Some("86400000")
    );

    let partitions = admin.topic_partitions().await.expect("partitions");
    assert_eq!(partitions.len(), 4);
}

/// Internal topics are listed only when asked for.
#[tokio::test]
async fn internal_topics_are_filterable() {
    let (cluster, admin) = cluster_with_brokers(1);
    create_topic(&admin, "visible", 1, 1).await;
    cluster.add_internal_topic("__bookkeeping");

    let all = admin.topic_names(true).await.expect("all names");
    assert!(all.contains("__bookkeeping"));

    let external = admin.topic_names(false).await.expect("external names");
    assert!(!external.contains("__bookkeeping"));
    assert!(external.contains("visible"));
}

/// Deleting a topic removes it; deleting it again reports the missing
/// resource instead of succeeding silently.
#[tokio::test]
async fn topic_deletion_is_not_silent() {
    let (_cluster, admin) = cluster_with_brokers(1);
    create_topic(&admin, "ephemeral", 1, 1).await;

    admin
        .delete_topics(HashSet::from(["ephemeral".to_string()]))
        .await
        .expect("delete");

    let again = admin
        .delete_topics(HashSet::from(["ephemeral".to_string()]))
        .await;
    assert!(matches!(again, Err(AdminError::ResourceNotFound { .. })));
}

/// The broker-scoped partition listing is a pure composition over the
/// replica listing.
#[tokio::test]
async fn partitions_on_one_broker() {
    let (_cluster, admin) = cluster_with_brokers(2);
    create_topic(&admin, "T", 2, 1).await;

    // Round-robin placement: partition 0 on broker 1, partition 1 on broker 2.
    let on_broker_1 = admin.topic_partitions_on_broker(1).await.expect("listing");
    assert_eq!(on_broker_1, BTreeSet::from([TopicPartition::new("T", 0)]));
}

/// Record deletion advances the low watermark and never exceeds the latest
/// offset; unknown partitions surface as ResourceNotFound.
#[tokio::test]
async fn record_deletion_moves_the_low_watermark() {
    let (cluster, admin) = cluster_with_brokers(1);
    create_topic(&admin, "T", 1, 1).await;
    let tp = TopicPartition::new("T", 0);
    cluster.set_latest_offset(&tp, 1000);

    let deleted = admin
        .delete_records(HashMap::from([(tp.clone(), 400)]))
        .await
        .expect("delete records");
    assert_eq!(deleted[&tp].low_watermark, 400);

    // Requests beyond the latest offset clamp to it.
    let deleted = admin
        .delete_records(HashMap::from([(tp.clone(), 5000)]))
        .await
        .expect("delete records");
    assert_eq!(deleted[&tp].low_watermark, 1000);

    let missing = admin
        .delete_records(HashMap::from([(TopicPartition::new("T", 9), 1)]))
        .await;
    assert!(matches!(missing, Err(AdminError::ResourceNotFound { .. })));
}

/// Group cleanup: a group with members refuses removal until the members
/// are gone; static members can be removed selectively.
#[tokio::test]
async fn group_cleanup_flow() {
    let (cluster, admin) = cluster_with_brokers(1);
    cluster.add_group(group(
        "analytics",
        vec![static_member("a"), static_member("b")],
    ));

    let refused = admin.remove_group("analytics").await;
    assert!(matches!(refused, Err(AdminError::RemoteRejected { .. })));

    admin
        .remove_static_members("analytics", HashSet::from(["a".to_string()]))
        .await
        .expect("remove static member");
    let groups = admin
        .consumer_groups(HashSet::from(["analytics".to_string()]))
        .await
        .expect("describe");
    assert_eq!(groups[0].members.len(), 1);

    admin
        .remove_all_members("analytics")
        .await
        .expect("remove all members");
    admin.remove_group("analytics").await.expect("remove group");

    assert!(admin
        .consumer_group_ids()
        .await
        .expect("ids")
        .is_empty());

    let missing = admin.remove_group("analytics").await;
    assert!(matches!(missing, Err(AdminError::ResourceNotFound { .. })));
}

/// Transactions and producer states are read-only listings keyed by the
/// cluster's own bookkeeping.
#[tokio::test]
async fn transaction_and_producer_listings() {
    let (cluster, admin) = cluster_with_brokers(1);
    create_topic(&admin, "T", 1, 1).await;
    let tp = TopicPartition::new("T", 0);

    cluster.add_transaction(Transaction {
        transaction_id: "txn-1".to_string(),
        state: TransactionState::Ongoing,
        partitions: BTreeSet::from([tp.clone()]),
    });
    cluster.add_producer_state(ProducerState {
        topic: "T".to_string(),
        partition: 0,
        producer_id: 9001,
        producer_epoch: 2,
        last_sequence: 41,
    });

    let txns = admin.transactions().await.expect("transactions");
    assert_eq!(txns["txn-1"].state, TransactionState::Ongoing);

    let states = admin.producer_states().await.expect("producer states");
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].producer_id, 9001);

    let missing = admin
        .transactions_of(HashSet::from(["txn-ghost".to_string()]))
        .await;
    assert!(matches!(missing, Err(AdminError::ResourceNotFound { .. })));
}

/// Preferred leader election puts the first-assigned replica back in charge
/// and refuses when that replica is out of sync.
#[tokio::test]
async fn preferred_leader_election() {
    let (cluster, admin) = cluster_with_brokers(2);
    create_topic(&admin, "T", 1, 2).await;
    let tp = TopicPartition::new("T", 0);

    admin
        .preferred_leader_election(&tp)
        .await
        .expect("election");
    let replicas = admin.replicas().await.expect("replicas");
    let leader = replicas[&tp].iter().find(|r| r.leader).expect("leader");
    assert_eq!(leader.broker, 1);

    cluster.set_in_sync(&tp, 1, false);
    let refused = admin.preferred_leader_election(&tp).await;
    assert!(matches!(refused, Err(AdminError::RemoteRejected { .. })));
}

/// close() is idempotent; operations after close fail with a connection
/// error instead of hanging or succeeding against a released transport.
#[tokio::test]
async fn close_is_idempotent_and_final() {
    let (_cluster, admin) = cluster_with_brokers(1);

    admin.close().await.expect("first close");
    admin.close().await.expect("second close");

    let result = admin.all_topic_names().await;
    assert!(matches!(result, Err(AdminError::ConnectionFailure(_))));
}
