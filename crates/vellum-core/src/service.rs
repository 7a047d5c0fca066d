use std::collections::HashMap;
use std::sync::Arc;

use vellum_db::Database;
use vellum_types::models::{
    BranchSummary, Group, GroupId, GroupStatus, Membership, Permission, Role, Template,
    TemplateId, TemplateStatus, TemplateVersion, User, UserId,
};

use crate::allocator::{VersionAllocator, VersionRecord, normalize_branch};
use crate::config::AllocatorConfig;
use crate::error::{Result, VellumError};
use crate::gate::AccessGate;
use crate::identity::Directory;
use crate::lifecycle::TemplateLifecycle;

/// Entry point for callers. Every template operation passes the access gate
/// before reaching the allocator or the lifecycle.
pub struct Vellum {
    db: Arc<Database>,
    gate: AccessGate<Database>,
    allocator: VersionAllocator<Database>,
    lifecycle: TemplateLifecycle,
    directory: Directory,
}

impl Vellum {
    pub fn new(db: Arc<Database>, config: AllocatorConfig) -> Self {
        Self {
            gate: AccessGate::new(db.clone()),
            allocator: VersionAllocator::new(db.clone(), config),
            lifecycle: TemplateLifecycle::new(db.clone()),
            directory: Directory::new(db.clone()),
            db,
        }
    }

    pub fn gate(&self) -> &AccessGate<Database> {
        &self.gate
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    // -- Identity & membership --

    pub fn register_user(&self, email: &str, password_hash: &str, name: &str) -> Result<User> {
        self.directory.register_user(email, password_hash, name)
    }

    pub fn create_group(&self, name: &str, description: Option<&str>, creator: &UserId) -> Result<Group> {
        self.directory.create_group(name, description, creator)
    }

    pub fn get_group(&self, group: &GroupId, acting: &UserId) -> Result<Group> {
        self.gate.require_group(acting, group, Permission::View)?;
        self.directory.get_group(group)
    }

    /// Groups `acting` belongs to, in any status.
    pub fn my_groups(&self, acting: &UserId) -> Result<Vec<Group>> {
        self.directory.list_groups_for_user(acting, None)
    }

    pub fn set_group_status(&self, group: &GroupId, status: GroupStatus, acting: &UserId) -> Result<Group> {
        self.gate
            .require_group_any_status(acting, group, Permission::Administer)?;
        self.directory.set_group_status(group, status)
    }

    pub fn add_member(&self, group: &GroupId, user: &UserId, role: Role, acting: &UserId) -> Result<Membership> {
        self.gate.require_group(acting, group, Permission::Administer)?;
        self.directory.add_member(group, user, role)
    }

    pub fn change_role(&self, group: &GroupId, user: &UserId, role: Role, acting: &UserId) -> Result<Membership> {
        self.gate.require_group(acting, group, Permission::Administer)?;
        self.directory.change_role(group, user, role)
    }

    pub fn remove_member(&self, group: &GroupId, user: &UserId, acting: &UserId) -> Result<()> {
        self.gate.require_group(acting, group, Permission::Administer)?;
        self.directory.remove_member(group, user)
    }

    pub fn list_members(&self, group: &GroupId, acting: &UserId) -> Result<Vec<Membership>> {
        self.gate.require_group(acting, group, Permission::View)?;
        self.directory.list_members(group)
    }

    // -- Templates --

    pub fn create_template(
        &self,
        group: &GroupId,
        title: &str,
        description: Option<&str>,
        acting: &UserId,
    ) -> Result<Template> {
        self.gate.require_group(acting, group, Permission::Edit)?;
        self.lifecycle.create(group, title, description, acting)
    }

    pub fn get_template(&self, id: &TemplateId, acting: &UserId) -> Result<Template> {
        self.gate.require(acting, id, Permission::View)?;
        self.lifecycle.get(id)
    }

    pub fn update_template(
        &self,
        id: &TemplateId,
        title: Option<&str>,
        description: Option<&str>,
        acting: &UserId,
    ) -> Result<Template> {
        self.gate.require(acting, id, Permission::Edit)?;
        self.lifecycle.update_metadata(id, title, description)
    }

    pub fn publish_template(&self, id: &TemplateId, acting: &UserId) -> Result<Template> {
        self.gate.require(acting, id, Permission::Administer)?;
        self.lifecycle.publish(id)
    }

    pub fn archive_template(&self, id: &TemplateId, acting: &UserId) -> Result<Template> {
        self.gate.require(acting, id, Permission::Administer)?;
        self.lifecycle.archive(id)
    }

    /// Templates matching the filters in groups where `acting` may view.
    pub fn search_templates(
        &self,
        status: Option<TemplateStatus>,
        keyword: Option<&str>,
        acting: &UserId,
    ) -> Result<Vec<Template>> {
        let mut visible: HashMap<GroupId, bool> = HashMap::new();
        let mut out = Vec::new();
        for template in self.lifecycle.search(status, keyword)? {
            let allowed = match visible.get(&template.group_id) {
                Some(allowed) => *allowed,
                None => {
                    let allowed = self
                        .gate
                        .authorize_group(acting, &template.group_id, Permission::View)?
                        .is_allowed();
                    visible.insert(template.group_id, allowed);
                    allowed
                }
            };
            if allowed {
                out.push(template);
            }
        }
        Ok(out)
    }

    // -- Versions --

    pub fn create_version(
        &self,
        template: &TemplateId,
        branch: Option<&str>,
        content: &str,
        author: &UserId,
        commit_message: Option<&str>,
    ) -> Result<VersionRecord> {
        self.gate.require(author, template, Permission::Edit)?;
        self.allocator
            .create_version(template, branch, content, author, commit_message)
    }

    /// Newest first.
    pub fn list_versions(&self, template: &TemplateId, branch: Option<&str>, acting: &UserId) -> Result<Vec<TemplateVersion>> {
        self.gate.require(acting, template, Permission::View)?;
        let branch = normalize_branch(branch)?;
        Ok(self.db.list_versions(template, branch)?)
    }

    pub fn get_latest_version(
        &self,
        template: &TemplateId,
        branch: Option<&str>,
        acting: &UserId,
    ) -> Result<TemplateVersion> {
        self.gate.require(acting, template, Permission::View)?;
        let branch = normalize_branch(branch)?;
        self.db
            .get_latest_version(template, branch)?
            .ok_or(VellumError::NotFound("version"))
    }

    pub fn get_version(
        &self,
        template: &TemplateId,
        branch: Option<&str>,
        version_number: u64,
        acting: &UserId,
    ) -> Result<TemplateVersion> {
        self.gate.require(acting, template, Permission::View)?;
        let branch = normalize_branch(branch)?;
        self.db
            .get_version(template, branch, version_number)?
            .ok_or(VellumError::NotFound("version"))
    }

    pub fn list_branches(&self, template: &TemplateId, acting: &UserId) -> Result<Vec<BranchSummary>> {
        self.gate.require(acting, template, Permission::View)?;
        Ok(self.db.list_branches(template)?)
    }

    /// Every branch, highest number first.
    pub fn list_all_versions(&self, template: &TemplateId, acting: &UserId) -> Result<Vec<TemplateVersion>> {
        self.gate.require(acting, template, Permission::View)?;
        Ok(self.db.list_all_versions(template)?)
    }
}
