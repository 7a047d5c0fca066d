use std::sync::Arc;

use tracing::debug;
use vellum_types::models::{GroupId, GroupStatus, Permission, TemplateId, UserId, UserStatus};

use crate::error::{DenyReason, Result, VellumError};
use crate::store::RoleDirectory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(VellumError::Forbidden(reason)),
        }
    }
}

/// Role-based check run before every template operation.
///
/// The caller's role is read at decision time and applied immediately. A
/// role change that commits after the read is not seen by that decision;
/// the next call picks it up.
pub struct AccessGate<D> {
    directory: Arc<D>,
}

impl<D: RoleDirectory> AccessGate<D> {
    pub fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }

    /// Resolve the template's owning group, then check the caller's role in it.
    pub fn authorize(&self, user: &UserId, template: &TemplateId, required: Permission) -> Result<Decision> {
        let group = self
            .directory
            .template_group(template)?
            .ok_or(VellumError::NotFound("template"))?;
        self.authorize_group(user, &group, required)
    }

    pub fn authorize_group(&self, user: &UserId, group: &GroupId, required: Permission) -> Result<Decision> {
        self.decide(user, group, required, false)
    }

    pub fn require(&self, user: &UserId, template: &TemplateId, required: Permission) -> Result<()> {
        self.authorize(user, template, required)?.into_result()
    }

    pub fn require_group(&self, user: &UserId, group: &GroupId, required: Permission) -> Result<()> {
        self.authorize_group(user, group, required)?.into_result()
    }

    /// Same as [`require_group`](Self::require_group) but still answers for
    /// groups that are not active, so an admin can reactivate one.
    pub fn require_group_any_status(&self, user: &UserId, group: &GroupId, required: Permission) -> Result<()> {
        self.decide(user, group, required, true)?.into_result()
    }

    fn decide(
        &self,
        user: &UserId,
        group: &GroupId,
        required: Permission,
        ignore_group_status: bool,
    ) -> Result<Decision> {
        let Some(standing) = self.directory.member_standing(user, group)? else {
            debug!(%user, %group, %required, "denied: no membership");
            return Ok(Decision::Deny(DenyReason::NoMembership));
        };

        let decision = if standing.user_status != UserStatus::Active {
            Decision::Deny(DenyReason::UserInactive)
        } else if !ignore_group_status && standing.group_status != GroupStatus::Active {
            Decision::Deny(DenyReason::GroupInactive)
        } else if !standing.role.allows(required) {
            Decision::Deny(DenyReason::InsufficientRole {
                role: standing.role,
                required,
            })
        } else {
            Decision::Allow
        };

        if let Decision::Deny(reason) = decision {
            debug!(%user, %group, %required, %reason, "denied");
        }
        Ok(decision)
    }
}
