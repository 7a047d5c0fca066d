//! Storage seams consumed by the core. `vellum_db::Database` implements both;
//! any backend with a transactional commit and a membership lookup can stand
//! in for it.

use vellum_db::models::{CommitOutcome, MemberStanding, NewVersion};
use vellum_db::{Database, Result};
use vellum_types::models::{GroupId, Template, TemplateId, TemplateVersion, UserId};

/// What the version allocator needs from storage.
pub trait VersionLedger: Send + Sync {
    fn template(&self, id: &TemplateId) -> Result<Option<Template>>;

    /// Highest committed number on (template, branch), 0 if none.
    fn max_version_number(&self, template: &TemplateId, branch: &str) -> Result<u64>;

    /// Atomically verify the number is still next, insert the version and
    /// advance the head pointer. Must write nothing unless it returns
    /// `Committed`.
    fn commit_version(&self, new: &NewVersion<'_>) -> Result<CommitOutcome>;

    fn fetch_version(
        &self,
        template: &TemplateId,
        branch: &str,
        version_number: u64,
    ) -> Result<Option<TemplateVersion>>;
}

/// What the access gate needs from storage.
pub trait RoleDirectory: Send + Sync {
    fn template_group(&self, template: &TemplateId) -> Result<Option<GroupId>>;

    fn member_standing(&self, user: &UserId, group: &GroupId) -> Result<Option<MemberStanding>>;
}

impl VersionLedger for Database {
    fn template(&self, id: &TemplateId) -> Result<Option<Template>> {
        self.get_template(id)
    }

    fn max_version_number(&self, template: &TemplateId, branch: &str) -> Result<u64> {
        Database::max_version_number(self, template, branch)
    }

    fn commit_version(&self, new: &NewVersion<'_>) -> Result<CommitOutcome> {
        Database::commit_version(self, new)
    }

    fn fetch_version(
        &self,
        template: &TemplateId,
        branch: &str,
        version_number: u64,
    ) -> Result<Option<TemplateVersion>> {
        self.get_version(template, branch, version_number)
    }
}

impl RoleDirectory for Database {
    fn template_group(&self, template: &TemplateId) -> Result<Option<GroupId>> {
        Database::template_group(self, template)
    }

    fn member_standing(&self, user: &UserId, group: &GroupId) -> Result<Option<MemberStanding>> {
        Database::member_standing(self, user, group)
    }
}
