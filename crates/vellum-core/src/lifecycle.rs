use std::sync::Arc;

use tracing::info;
use vellum_db::Database;
use vellum_db::queries::NewTemplate;
use vellum_types::models::{
    DEFAULT_BRANCH, GroupId, GroupStatus, Template, TemplateId, TemplateStatus, UserId,
};

use crate::error::{Result, VellumError};

pub const MAX_TITLE_LEN: usize = 200;

/// Owns the mutable template head: creation, metadata and status.
///
/// `Draft -> Published -> Archived`, with `Draft -> Archived` allowed and
/// `Archived` terminal. Status changes are compare-and-set against the
/// expected prior state, so two racing transitions cannot both apply.
pub struct TemplateLifecycle {
    db: Arc<Database>,
}

impl TemplateLifecycle {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn create(
        &self,
        group: &GroupId,
        title: &str,
        description: Option<&str>,
        author: &UserId,
    ) -> Result<Template> {
        let title = validate_title(title)?;
        let group_row = self.db.get_group(group)?.ok_or(VellumError::NotFound("group"))?;
        if group_row.status != GroupStatus::Active {
            return Err(VellumError::InvalidState("group is not active".into()));
        }

        let id = TemplateId::new();
        let template = self.db.insert_template(&NewTemplate {
            id: &id,
            group_id: group,
            title,
            description: description.and_then(trimmed_description),
            created_by: author,
            head_branch: DEFAULT_BRANCH,
        })?;
        info!(template = %id, group = %group, "Template created");
        Ok(template)
    }

    pub fn get(&self, id: &TemplateId) -> Result<Template> {
        self.db.get_template(id)?.ok_or(VellumError::NotFound("template"))
    }

    /// `None` leaves a field unchanged. A blank description clears it.
    pub fn update_metadata(
        &self,
        id: &TemplateId,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Template> {
        let title = title.map(validate_title).transpose()?;
        let description = description.map(trimmed_description);
        if !self.db.update_template_metadata(id, title, description)? {
            let current = self.get(id)?;
            if current.is_archived() {
                return Err(VellumError::archived());
            }
        }
        self.get(id)
    }

    /// `Draft -> Published`. Needs at least one committed version. Publishing
    /// an already published template is a no-op.
    pub fn publish(&self, id: &TemplateId) -> Result<Template> {
        let current = self.get(id)?;
        match current.status {
            TemplateStatus::Published => return Ok(current),
            TemplateStatus::Archived => return Err(VellumError::archived()),
            TemplateStatus::Draft => {}
        }

        // Versions are never deleted, so a count read before the CAS stays true.
        if self.db.count_versions(id)? == 0 {
            return Err(VellumError::InvalidState(
                "cannot publish a template with no versions".into(),
            ));
        }

        if self
            .db
            .transition_template_status(id, &[TemplateStatus::Draft], TemplateStatus::Published)?
        {
            info!(template = %id, "Template published");
            return self.get(id);
        }

        // Lost a race with another transition; report where it landed.
        let current = self.get(id)?;
        match current.status {
            TemplateStatus::Published => Ok(current),
            _ => Err(VellumError::archived()),
        }
    }

    /// Any state `-> Archived`. Idempotent.
    pub fn archive(&self, id: &TemplateId) -> Result<Template> {
        let current = self.get(id)?;
        if current.is_archived() {
            return Ok(current);
        }

        if self.db.transition_template_status(
            id,
            &[TemplateStatus::Draft, TemplateStatus::Published],
            TemplateStatus::Archived,
        )? {
            info!(template = %id, from = %current.status, "Template archived");
        }
        self.get(id)
    }

    pub fn search(&self, status: Option<TemplateStatus>, keyword: Option<&str>) -> Result<Vec<Template>> {
        let keyword = keyword.map(str::trim).filter(|k| !k.is_empty());
        Ok(self.db.search_templates(status, keyword)?)
    }

    pub fn list_by_status(&self, status: TemplateStatus) -> Result<Vec<Template>> {
        Ok(self.db.list_templates_by_status(status)?)
    }

    pub fn find_by_title(&self, fragment: &str) -> Result<Vec<Template>> {
        Ok(self.db.find_templates_by_title(fragment.trim())?)
    }
}

fn trimmed_description(description: &str) -> Option<&str> {
    Some(description.trim()).filter(|d| !d.is_empty())
}

fn validate_title(title: &str) -> Result<&str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(VellumError::ValidationFailed("title must not be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(VellumError::ValidationFailed(format!(
            "title longer than {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::VersionAllocator;
    use crate::config::AllocatorConfig;

    fn setup() -> (Arc<Database>, TemplateLifecycle, GroupId, UserId) {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let user = UserId::new();
        db.create_user(&user, "owner@example.com", "hash", "Owner").unwrap();
        let group = GroupId::new();
        db.create_group_with_admin(&group, "billing", None, &user).unwrap();
        (db.clone(), TemplateLifecycle::new(db), group, user)
    }

    #[test]
    fn new_template_is_draft_without_head() {
        let (_db, lifecycle, group, user) = setup();
        let t = lifecycle
            .create(&group, "  Receipt  ", Some("Order receipt"), &user)
            .unwrap();
        assert_eq!(t.title, "Receipt");
        assert_eq!(t.status, TemplateStatus::Draft);
        assert_eq!(t.head_branch, "main");
        assert!(t.latest_version_id.is_none());
        assert!(!t.is_archived());
    }

    #[test]
    fn create_validates_title_and_group() {
        let (_db, lifecycle, group, user) = setup();
        assert!(matches!(
            lifecycle.create(&group, "   ", None, &user),
            Err(VellumError::ValidationFailed(_))
        ));
        assert!(matches!(
            lifecycle.create(&group, &"x".repeat(MAX_TITLE_LEN + 1), None, &user),
            Err(VellumError::ValidationFailed(_))
        ));
        assert!(matches!(
            lifecycle.create(&GroupId::new(), "Receipt", None, &user),
            Err(VellumError::NotFound("group"))
        ));
    }

    #[test]
    fn publish_requires_a_version() {
        let (db, lifecycle, group, user) = setup();
        let t = lifecycle.create(&group, "Receipt", None, &user).unwrap();
        assert!(matches!(lifecycle.publish(&t.id), Err(VellumError::InvalidState(_))));

        VersionAllocator::new(db, AllocatorConfig::default())
            .create_version(&t.id, None, "Thanks for your order", &user, None)
            .unwrap();
        let published = lifecycle.publish(&t.id).unwrap();
        assert_eq!(published.status, TemplateStatus::Published);
        assert_eq!(lifecycle.publish(&t.id).unwrap().status, TemplateStatus::Published);
    }

    #[test]
    fn archive_is_idempotent_and_terminal() {
        let (_db, lifecycle, group, user) = setup();
        let t = lifecycle.create(&group, "Receipt", None, &user).unwrap();
        let first = lifecycle.archive(&t.id).unwrap();
        let second = lifecycle.archive(&t.id).unwrap();
        assert_eq!(first.status, TemplateStatus::Archived);
        assert_eq!(first, second);
        assert!(second.is_archived());

        assert!(matches!(lifecycle.publish(&t.id), Err(VellumError::InvalidState(_))));
        assert!(matches!(
            lifecycle.update_metadata(&t.id, Some("New"), None),
            Err(VellumError::InvalidState(_))
        ));
    }

    #[test]
    fn metadata_updates_keep_unset_fields() {
        let (_db, lifecycle, group, user) = setup();
        let t = lifecycle
            .create(&group, "Receipt", Some("Order receipt"), &user)
            .unwrap();
        let updated = lifecycle.update_metadata(&t.id, Some("Invoice"), None).unwrap();
        assert_eq!(updated.title, "Invoice");
        assert_eq!(updated.description.as_deref(), Some("Order receipt"));
        assert!(matches!(
            lifecycle.update_metadata(&TemplateId::new(), Some("x"), None),
            Err(VellumError::NotFound("template"))
        ));
    }

    #[test]
    fn blank_description_clears_it() {
        let (_db, lifecycle, group, user) = setup();
        let t = lifecycle.create(&group, "Receipt", Some("   "), &user).unwrap();
        assert_eq!(t.description, None);

        let updated = lifecycle
            .update_metadata(&t.id, None, Some("  Order receipt \n"))
            .unwrap();
        assert_eq!(updated.description.as_deref(), Some("Order receipt"));

        let cleared = lifecycle.update_metadata(&t.id, None, Some(" ")).unwrap();
        assert_eq!(cleared.description, None);
        assert_eq!(cleared.title, "Receipt");
    }

    #[test]
    fn search_by_status_and_keyword() {
        let (_db, lifecycle, group, user) = setup();
        lifecycle.create(&group, "Receipt", Some("Order receipt"), &user).unwrap();
        let t = lifecycle.create(&group, "Newsletter", None, &user).unwrap();
        lifecycle.archive(&t.id).unwrap();

        assert_eq!(lifecycle.search(None, Some("ORDER")).unwrap().len(), 1);
        assert_eq!(lifecycle.search(Some(TemplateStatus::Archived), None).unwrap().len(), 1);
        assert_eq!(lifecycle.search(None, Some("  ")).unwrap().len(), 2);
        assert_eq!(lifecycle.list_by_status(TemplateStatus::Draft).unwrap().len(), 1);
        assert_eq!(lifecycle.find_by_title("news").unwrap()[0].id, t.id);
    }
}
