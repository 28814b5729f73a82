use crate::admin::Admin;
use crate::errors::{AdminError, Result};
use sava_core::{Quota, QuotaLimit, QuotaTarget};
use tracing::info;

/// Creates or updates rate quotas for one entity.
///
/// A quota is addressed by (target kind, entity value, limit kind); creating
/// one for an address that already holds a quota overwrites it — last write
/// wins, no versioning. Leaving the entity unset addresses the default quota
/// of the target kind.
#[derive(Debug)]
pub struct QuotaCreator {
    admin: Admin,
    target: Option<QuotaTarget>,
    entity: Option<String>,
    limits: Vec<(QuotaLimit, f64)>,
}

impl QuotaCreator {
    pub(crate) fn new(admin: Admin) -> Self {
        QuotaCreator {
            admin,
            target: None,
            entity: None,
            limits: Vec::new(),
        }
    }

    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.target = Some(QuotaTarget::ClientId);
        self.entity = Some(id.into());
        self
    }

    pub fn user(mut self, name: impl Into<String>) -> Self {
        self.target = Some(QuotaTarget::User);
        self.entity = Some(name.into());
        self
    }

    pub fn ip(mut self, address: impl Into<String>) -> Self {
        self.target = Some(QuotaTarget::Ip);
        self.entity = Some(address.into());
        self
    }

    /// Address the default quota for a target kind instead of one entity.
    pub fn default_for(mut self, target: QuotaTarget) -> Self {
        self.target = Some(target);
        self.entity = None;
        self
    }

    pub fn producer_byte_rate(mut self, rate: f64) -> Self {
        self.limits.push((QuotaLimit::ProducerByteRate, rate));
        self
    }

    pub fn consumer_byte_rate(mut self, rate: f64) -> Self {
        self.limits.push((QuotaLimit::ConsumerByteRate, rate));
        self
    }

    pub fn connection_creation_rate(mut self, rate: f64) -> Self {
        self.limits.push((QuotaLimit::ConnectionCreationRate, rate));
        self
    }

    /// Submit the accumulated limits.
    pub async fn create(self) -> Result<()> {
        let target = self.target.ok_or_else(|| {
            AdminError::invalid_target("quota creation", "no target entity selected")
        })?;
        if self.limits.is_empty() {
            return Err(AdminError::invalid_target(
                "quota creation",
                "no limit was given",
            ));
        }
        for (limit, value) in &self.limits {
            if *value < 0.0 || !value.is_finite() {
                return Err(AdminError::invalid_target(
                    "quota creation",
                    format!("{} must be a non-negative number, got {}", limit, value),
                ));
            }
        }
        for (limit, value) in &self.limits {
            let quota = Quota::new(target, self.entity.clone(), *limit, *value);
            self.admin.submit_quota(&quota).await?;
        }
        info!(
            target = %target,
            entity = self.entity.as_deref().unwrap_or("<default>"),
            limits = self.limits.len(),
            "quota written"
        );
        Ok(())
    }
}
