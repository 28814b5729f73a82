use std::fmt::{Display, Formatter};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdminError>;

/// Kind of cluster resource an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Broker,
    Topic,
    Partition,
    Replica,
    Group,
    Transaction,
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceKind::Broker => "broker",
            ResourceKind::Topic => "topic",
            ResourceKind::Partition => "partition",
            ResourceKind::Replica => "replica",
            ResourceKind::Group => "group",
            ResourceKind::Transaction => "transaction",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Error)]
pub enum AdminError {
    /// The referenced resource no longer exists on the cluster.
    #[error("{kind} not found: {name}")]
    ResourceNotFound { kind: ResourceKind, name: String },

    /// The request is structurally invalid; detected before any mutating
    /// call reaches the cluster.
    #[error("invalid target for {operation}: {reason}")]
    InvalidTarget {
        operation: &'static str,
        reason: String,
    },

    /// The cluster understood the request but refused it.
    #[error("cluster rejected {operation}: {reason}")]
    RemoteRejected {
        operation: &'static str,
        reason: String,
    },

    /// Transport-level failure reaching the cluster.
    #[error("connection failure: {0}")]
    ConnectionFailure(String),

    /// A batched operation succeeded for some items and failed for others.
    #[error("{0}")]
    PartialBatchFailure(BatchFailure),
}

impl AdminError {
    pub fn not_found(kind: ResourceKind, name: impl Into<String>) -> Self {
        AdminError::ResourceNotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn invalid_target(operation: &'static str, reason: impl Into<String>) -> Self {
        AdminError::InvalidTarget {
            operation,
            reason: reason.into(),
        }
    }

    pub fn rejected(operation: &'static str, reason: impl Into<String>) -> Self {
        AdminError::RemoteRejected {
            operation,
            reason: reason.into(),
        }
    }
}

/// Per-broker outcome of a batched broker-wide operation. Never drops failed
/// items: every broker that was attempted shows up in exactly one list.
#[derive(Debug)]
pub struct BatchFailure {
    pub operation: &'static str,
    /// Brokers the operation committed on. Committed brokers stay committed;
    /// there is no rollback.
    pub succeeded: Vec<i32>,
    /// Brokers the operation failed on, with the reason per broker.
    pub failed: Vec<(i32, AdminError)>,
}

impl Display for BatchFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} partially failed: succeeded on brokers {:?}, failed on [",
            self.operation, self.succeeded
        )?;
        for (i, (broker, error)) in self.failed.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", broker, error)?;
        }
        write!(f, "]")
    }
}
