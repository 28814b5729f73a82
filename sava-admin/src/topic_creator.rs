use crate::admin::Admin;
use crate::errors::{AdminError, Result};
use crate::rpc::TopicSpec;
use std::collections::BTreeMap;
use tracing::info;

/// Builder for creating one topic with its configs.
#[derive(Debug)]
pub struct TopicCreator {
    admin: Admin,
    name: Option<String>,
    partitions: i32,
    replication_factor: i16,
    config: BTreeMap<String, String>,
}

impl TopicCreator {
    pub(crate) fn new(admin: Admin) -> Self {
        TopicCreator {
            admin,
            name: None,
            partitions: 1,
            replication_factor: 1,
            config: BTreeMap::new(),
        }
    }

    pub fn topic(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn partitions(mut self, partitions: i32) -> Self {
        self.partitions = partitions;
        self
    }

    pub fn replication_factor(mut self, replication_factor: i16) -> Self {
        self.replication_factor = replication_factor;
        self
    }

    pub fn config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    pub async fn create(self) -> Result<()> {
        let name = self.name.ok_or_else(|| {
            AdminError::invalid_target("topic creation", "no topic name was given")
        })?;
        if self.partitions < 1 {
            return Err(AdminError::invalid_target(
                "topic creation",
                format!("partition count must be at least 1, got {}", self.partitions),
            ));
        }
        if self.replication_factor < 1 {
            return Err(AdminError::invalid_target(
                "topic creation",
                format!(
                    "replication factor must be at least 1, got {}",
                    self.replication_factor
                ),
            ));
        }
        let spec = TopicSpec {
            name: name.clone(),
            partitions: self.partitions,
            replication_factor: self.replication_factor,
            config: self.config,
        };
        self.admin.submit_topic(spec).await?;
        info!(topic = %name, "topic created");
        Ok(())
    }
}
