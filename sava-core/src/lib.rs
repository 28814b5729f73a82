pub mod cluster_info;
pub mod group;
pub mod node;
pub mod producer;
pub mod quota;
pub mod rate;
pub mod record;
pub mod replica;
pub mod topic;
pub mod transaction;

pub use cluster_info::ClusterInfo;
pub use group::{ConsumerGroup, GroupMember};
pub use node::Node;
pub use producer::ProducerState;
pub use quota::{Quota, QuotaLimit, QuotaTarget};
pub use rate::DataRate;
pub use record::DeletedRecord;
pub use replica::{AddingReplica, Replica};
pub use topic::{Partition, Topic, TopicPartition, TopicPartitionReplica};
pub use transaction::{Transaction, TransactionState};
