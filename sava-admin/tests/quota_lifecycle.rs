use sava_admin::AdminError;
use sava_core::{QuotaLimit, QuotaTarget};

mod common;
use common::cluster_with_brokers;

/// Quotas are queryable by target kind, by (kind, entity), and all at once;
/// a filter with no matches yields an empty collection, not an error.
#[tokio::test]
async fn quota_queries_filter_by_target_and_entity() {
    let (_cluster, admin) = cluster_with_brokers(1);

    admin
        .quota_creator()
        .client_id("etl")
        .producer_byte_rate(1_000_000.0)
        .create()
        .await
        .expect("client quota");
    admin
        .quota_creator()
        .ip("10.0.0.7")
        .connection_creation_rate(10.0)
        .create()
        .await
        .expect("ip quota");

    assert_eq!(admin.quotas().await.expect("all").len(), 2);

    let client_quotas = admin
        .quotas_of(QuotaTarget::ClientId)
        .await
        .expect("by target");
    assert_eq!(client_quotas.len(), 1);
    assert_eq!(client_quotas[0].entity.as_deref(), Some("etl"));
    assert_eq!(client_quotas[0].limit, QuotaLimit::ProducerByteRate);

    let nothing = admin
        .quotas_for(QuotaTarget::User, "nobody")
        .await
        .expect("no match");
    assert!(nothing.is_empty());
}

/// Creating a quota for an address that already holds one overwrites it.
#[tokio::test]
async fn quota_creation_is_last_write_wins() {
    let (_cluster, admin) = cluster_with_brokers(1);

    for rate in [100.0, 250.0] {
        admin
            .quota_creator()
            .user("reporting")
            .consumer_byte_rate(rate)
            .create()
            .await
            .expect("user quota");
    }

    let quotas = admin
        .quotas_for(QuotaTarget::User, "reporting")
        .await
        .expect("quotas");
    assert_eq!(quotas.len(), 1);
    assert_eq!(quotas[0].value, 250.0);
}

/// The default quota of a target kind is addressed by leaving the entity
/// unset; it is distinct from every per-entity quota.
#[tokio::test]
async fn default_quota_is_its_own_address() {
    let (_cluster, admin) = cluster_with_brokers(1);

    admin
        .quota_creator()
        .default_for(QuotaTarget::ClientId)
        .producer_byte_rate(500.0)
        .create()
        .await
        .expect("default quota");
    admin
        .quota_creator()
        .client_id("etl")
        .producer_byte_rate(900.0)
        .create()
        .await
        .expect("entity quota");

    let quotas = admin.quotas_of(QuotaTarget::ClientId).await.expect("quotas");
    assert_eq!(quotas.len(), 2);
    assert!(quotas.iter().any(|q| q.entity.is_none() && q.value == 500.0));
}

/// Limits must be non-negative numbers; a bad limit never reaches the
/// cluster.
#[tokio::test]
async fn negative_limits_fail_validation() {
    let (_cluster, admin) = cluster_with_brokers(1);

    let result = admin
        .quota_creator()
        .client_id("etl")
        .producer_byte_rate(-1.0)
        .create()
        .await;
    assert!(matches!(result, Err(AdminError::InvalidTarget { .. })));
    assert!(admin.quotas().await.expect("quotas").is_empty());
}

/// A creator without a target entity is rejected before submission.
#[tokio::test]
async fn quota_without_target_fails_validation() {
    let (_cluster, admin) = cluster_with_brokers(1);

    let result = admin.quota_creator().producer_byte_rate(1.0).create().await;
    assert!(matches!(result, Err(AdminError::InvalidTarget { .. })));
}
