use sava_core::ClusterInfo;

/// Per-broker load vector: number of leader replicas hosted on each broker,
/// ordered by broker id. Brokers with no replicas in the snapshot score 0.
pub fn leader_counts(info: &ClusterInfo) -> Vec<f64> {
    info.nodes()
        .iter()
        .map(|node| {
            info.replicas_on_broker(node.id)
                .iter()
                .filter(|r| r.leader)
                .count() as f64
        })
        .collect()
}

/// Per-broker load vector: total replica log bytes on each broker, ordered
/// by broker id.
pub fn replica_sizes(info: &ClusterInfo) -> Vec<f64> {
    info.nodes()
        .iter()
        .map(|node| {
            info.replicas_on_broker(node.id)
                .iter()
                .map(|r| r.size as f64)
                .sum()
        })
        .collect()
}
