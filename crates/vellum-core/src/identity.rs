use std::sync::Arc;

use tracing::info;
use vellum_db::Database;
use vellum_db::models::MembershipUpdate;
use vellum_types::models::{
    Group, GroupId, GroupStatus, Membership, Role, User, UserId, UserStatus,
};

use crate::error::{Result, VellumError};

/// Users, groups and the memberships between them. No permission checks
/// happen here; the service layer runs the gate first.
pub struct Directory {
    db: Arc<Database>,
}

impl Directory {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    // -- Users --

    /// `password_hash` is produced by the caller; this layer never sees
    /// plaintext credentials.
    pub fn register_user(&self, email: &str, password_hash: &str, name: &str) -> Result<User> {
        let email = required("email", email)?;
        let name = required("name", name)?;
        if password_hash.is_empty() {
            return Err(VellumError::ValidationFailed("credential hash must not be empty".into()));
        }

        let user = self
            .db
            .create_user(&UserId::new(), email, password_hash, name)
            .map_err(|e| match VellumError::from(e) {
                VellumError::Conflict(_) => VellumError::Conflict(format!("email {} already registered", email)),
                other => other,
            })?;
        info!(user = %user.id, "User registered");
        Ok(user)
    }

    pub fn get_user(&self, id: &UserId) -> Result<User> {
        self.db.get_user(id)?.ok_or(VellumError::NotFound("user"))
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.db.get_user_by_email(email.trim())?)
    }

    /// User and stored credential hash, for the login path.
    pub fn credentials_by_email(&self, email: &str) -> Result<Option<(User, String)>> {
        Ok(self.db.get_credentials_by_email(email.trim())?)
    }

    /// Users are never deleted; deactivation is a status change.
    pub fn set_user_status(&self, id: &UserId, status: UserStatus) -> Result<User> {
        if !self.db.set_user_status(id, status)? {
            return Err(VellumError::NotFound("user"));
        }
        info!(user = %id, %status, "User status changed");
        self.get_user(id)
    }

    // -- Groups --

    /// Creates the group with `creator` as its first ADMIN.
    pub fn create_group(&self, name: &str, description: Option<&str>, creator: &UserId) -> Result<Group> {
        let name = required("group name", name)?;
        self.get_user(creator)?;

        let group = self
            .db
            .create_group_with_admin(&GroupId::new(), name, description, creator)
            .map_err(|e| match VellumError::from(e) {
                VellumError::Conflict(_) => VellumError::Conflict(format!("group {} already exists", name)),
                other => other,
            })?;
        info!(group = %group.id, creator = %creator, "Group created");
        Ok(group)
    }

    pub fn get_group(&self, id: &GroupId) -> Result<Group> {
        self.db.get_group(id)?.ok_or(VellumError::NotFound("group"))
    }

    pub fn find_group_by_name(&self, name: &str) -> Result<Option<Group>> {
        Ok(self.db.get_group_by_name(name.trim())?)
    }

    pub fn list_groups_by_status(&self, status: GroupStatus) -> Result<Vec<Group>> {
        Ok(self.db.list_groups_by_status(status)?)
    }

    pub fn list_groups_for_user(&self, user: &UserId, status: Option<GroupStatus>) -> Result<Vec<Group>> {
        Ok(self.db.list_groups_for_user(user, status)?)
    }

    pub fn set_group_status(&self, id: &GroupId, status: GroupStatus) -> Result<Group> {
        if !self.db.set_group_status(id, status)? {
            return Err(VellumError::NotFound("group"));
        }
        info!(group = %id, %status, "Group status changed");
        self.get_group(id)
    }

    // -- Memberships --

    pub fn add_member(&self, group: &GroupId, user: &UserId, role: Role) -> Result<Membership> {
        self.get_group(group)?;
        self.get_user(user)?;

        let membership = self
            .db
            .insert_membership(group, user, role)
            .map_err(|e| match VellumError::from(e) {
                VellumError::Conflict(_) => VellumError::Conflict("user is already a member of the group".into()),
                other => other,
            })?;
        info!(group = %group, user = %user, %role, "Member added");
        Ok(membership)
    }

    pub fn change_role(&self, group: &GroupId, user: &UserId, role: Role) -> Result<Membership> {
        check_update(self.db.update_role(group, user, role)?)?;
        info!(group = %group, user = %user, %role, "Member role changed");
        self.db
            .get_membership(group, user)?
            .ok_or(VellumError::NotFound("membership"))
    }

    pub fn remove_member(&self, group: &GroupId, user: &UserId) -> Result<()> {
        check_update(self.db.delete_membership(group, user)?)?;
        info!(group = %group, user = %user, "Member removed");
        Ok(())
    }

    pub fn get_role(&self, user: &UserId, group: &GroupId) -> Result<Option<Role>> {
        Ok(self.db.get_role(user, group)?)
    }

    pub fn list_members(&self, group: &GroupId) -> Result<Vec<Membership>> {
        Ok(self.db.list_memberships(group, None)?)
    }

    pub fn list_members_with_role(&self, group: &GroupId, role: Role) -> Result<Vec<Membership>> {
        Ok(self.db.list_memberships(group, Some(role))?)
    }

    pub fn memberships_for_user(&self, user: &UserId) -> Result<Vec<Membership>> {
        Ok(self.db.memberships_for_user(user)?)
    }
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(VellumError::ValidationFailed(format!("{} must not be empty", field)));
    }
    Ok(value)
}

fn check_update(update: MembershipUpdate) -> Result<()> {
    match update {
        MembershipUpdate::Updated => Ok(()),
        MembershipUpdate::NotMember => Err(VellumError::NotFound("membership")),
        MembershipUpdate::LastAdmin => Err(VellumError::InvalidState(
            "group must keep at least one admin".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> Directory {
        Directory::new(Arc::new(Database::open_in_memory().unwrap()))
    }

    #[test]
    fn duplicate_email_is_conflict() {
        let dir = directory();
        dir.register_user("a@example.com", "hash", "A").unwrap();
        let err = dir.register_user(" a@example.com ", "hash", "A2").unwrap_err();
        assert!(matches!(err, VellumError::Conflict(_)));
        assert!(dir.find_user_by_email("a@example.com").unwrap().is_some());
    }

    #[test]
    fn registration_requires_fields() {
        let dir = directory();
        assert!(matches!(
            dir.register_user("", "hash", "A"),
            Err(VellumError::ValidationFailed(_))
        ));
        assert!(matches!(
            dir.register_user("a@example.com", "", "A"),
            Err(VellumError::ValidationFailed(_))
        ));
    }

    #[test]
    fn users_deactivate_instead_of_deleting() {
        let dir = directory();
        let user = dir.register_user("a@example.com", "hash", "A").unwrap();
        assert_eq!(user.status, UserStatus::Active);
        let user = dir.set_user_status(&user.id, UserStatus::Inactive).unwrap();
        assert_eq!(user.status, UserStatus::Inactive);
        assert!(matches!(
            dir.set_user_status(&UserId::new(), UserStatus::Active),
            Err(VellumError::NotFound("user"))
        ));
    }

    #[test]
    fn group_names_are_unique_and_creator_is_admin() {
        let dir = directory();
        let user = dir.register_user("a@example.com", "hash", "A").unwrap();
        let group = dir.create_group("design", None, &user.id).unwrap();
        assert_eq!(dir.get_role(&user.id, &group.id).unwrap(), Some(Role::Admin));
        assert!(matches!(
            dir.create_group("design", None, &user.id),
            Err(VellumError::Conflict(_))
        ));
        assert_eq!(dir.find_group_by_name("design").unwrap().unwrap().id, group.id);
    }

    #[test]
    fn membership_is_unique_per_pair() {
        let dir = directory();
        let owner = dir.register_user("a@example.com", "hash", "A").unwrap();
        let other = dir.register_user("b@example.com", "hash", "B").unwrap();
        let group = dir.create_group("design", None, &owner.id).unwrap();

        dir.add_member(&group.id, &other.id, Role::Viewer).unwrap();
        assert!(matches!(
            dir.add_member(&group.id, &other.id, Role::Editor),
            Err(VellumError::Conflict(_))
        ));
        assert!(matches!(
            dir.add_member(&group.id, &UserId::new(), Role::Editor),
            Err(VellumError::NotFound("user"))
        ));

        let changed = dir.change_role(&group.id, &other.id, Role::Editor).unwrap();
        assert_eq!(changed.role, Role::Editor);
        assert_eq!(dir.list_members(&group.id).unwrap().len(), 2);
        assert_eq!(dir.list_members_with_role(&group.id, Role::Editor).unwrap().len(), 1);
        assert_eq!(dir.memberships_for_user(&other.id).unwrap().len(), 1);

        dir.remove_member(&group.id, &other.id).unwrap();
        assert!(matches!(
            dir.remove_member(&group.id, &other.id),
            Err(VellumError::NotFound("membership"))
        ));
    }

    #[test]
    fn last_admin_is_protected() {
        let dir = directory();
        let owner = dir.register_user("a@example.com", "hash", "A").unwrap();
        let group = dir.create_group("design", None, &owner.id).unwrap();
        assert!(matches!(
            dir.change_role(&group.id, &owner.id, Role::Viewer),
            Err(VellumError::InvalidState(_))
        ));
        assert!(matches!(
            dir.remove_member(&group.id, &owner.id),
            Err(VellumError::InvalidState(_))
        ));
    }

    #[test]
    fn groups_listed_by_status() {
        let dir = directory();
        let owner = dir.register_user("a@example.com", "hash", "A").unwrap();
        let g1 = dir.create_group("alpha", None, &owner.id).unwrap();
        dir.create_group("beta", Some("second"), &owner.id).unwrap();
        dir.set_group_status(&g1.id, GroupStatus::Deleted).unwrap();

        assert_eq!(dir.list_groups_by_status(GroupStatus::Active).unwrap().len(), 1);
        assert_eq!(dir.list_groups_for_user(&owner.id, None).unwrap().len(), 2);
        assert_eq!(
            dir.list_groups_for_user(&owner.id, Some(GroupStatus::Deleted)).unwrap()[0].name,
            "alpha"
        );
    }
}
