use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// What kind of entity a quota is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuotaTarget {
    ClientId,
    User,
    Ip,
}

impl Display for QuotaTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            QuotaTarget::ClientId => "client-id",
            QuotaTarget::User => "user",
            QuotaTarget::Ip => "ip",
        };
        write!(f, "{}", name)
    }
}

/// Which rate the quota caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuotaLimit {
    ProducerByteRate,
    ConsumerByteRate,
    ConnectionCreationRate,
}

impl Display for QuotaLimit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            QuotaLimit::ProducerByteRate => "producer-byte-rate",
            QuotaLimit::ConsumerByteRate => "consumer-byte-rate",
            QuotaLimit::ConnectionCreationRate => "connection-creation-rate",
        };
        write!(f, "{}", name)
    }
}

/// A rate limit on one entity. `entity: None` addresses the default quota
/// for the target kind. The value is never negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quota {
    pub target: QuotaTarget,
    pub entity: Option<String>,
    pub limit: QuotaLimit,
    pub value: f64,
}

impl Quota {
    pub fn new(
        target: QuotaTarget,
        entity: Option<String>,
        limit: QuotaLimit,
        value: f64,
    ) -> Self {
        Quota {
            target,
            entity,
            limit,
            value,
        }
    }
}
