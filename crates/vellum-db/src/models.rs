//! Database row types. These map directly to SQLite rows and convert into
//! the vellum-types models at the edge of this crate.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::str::FromStr;
use vellum_types::models::{
    Group, GroupStatus, Membership, Role, Template, TemplateStatus, TemplateVersion, User,
    UserStatus, VersionId,
};

use crate::{DbError, Result};

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct GroupRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct MembershipRow {
    pub group_id: String,
    pub user_id: String,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct TemplateRow {
    pub id: String,
    pub group_id: String,
    pub title: String,
    pub description: Option<String>,
    pub created_by: String,
    pub status: String,
    pub head_branch: String,
    pub latest_version_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub struct VersionRow {
    pub id: String,
    pub template_id: String,
    pub branch_name: String,
    pub version_number: i64,
    pub content: String,
    pub created_by: String,
    pub commit_message: Option<String>,
    pub created_at: String,
}

/// Everything the access gate needs to know about one (group, user) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberStanding {
    pub role: Role,
    pub group_status: GroupStatus,
    pub user_status: UserStatus,
}

/// Insert parameters for a new version row.
#[derive(Debug, Clone)]
pub struct NewVersion<'a> {
    pub id: &'a str,
    pub template_id: &'a str,
    pub branch: &'a str,
    pub version_number: u64,
    pub content: &'a str,
    pub created_by: &'a str,
    pub commit_message: Option<&'a str>,
}

/// Result of the commit transaction for one version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed { head_advanced: bool },
    /// Another writer already holds this number; `current_max` is what the
    /// transaction observed.
    Stale { current_max: u64 },
    TemplateArchived,
}

/// Result of a guarded membership change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipUpdate {
    Updated,
    NotMember,
    /// The change would leave the group without an administrator.
    LastAdmin,
}

impl TryFrom<UserRow> for User {
    type Error = DbError;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: parse_id(&row.id)?,
            email: row.email,
            name: row.name,
            status: parse_enum(&row.status)?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

impl TryFrom<GroupRow> for Group {
    type Error = DbError;

    fn try_from(row: GroupRow) -> Result<Self> {
        Ok(Group {
            id: parse_id(&row.id)?,
            name: row.name,
            description: row.description,
            status: parse_enum(&row.status)?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

impl TryFrom<MembershipRow> for Membership {
    type Error = DbError;

    fn try_from(row: MembershipRow) -> Result<Self> {
        Ok(Membership {
            group_id: parse_id(&row.group_id)?,
            user_id: parse_id(&row.user_id)?,
            role: parse_enum(&row.role)?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

impl TryFrom<TemplateRow> for Template {
    type Error = DbError;

    fn try_from(row: TemplateRow) -> Result<Self> {
        let status: TemplateStatus = parse_enum(&row.status)?;
        Ok(Template {
            id: parse_id(&row.id)?,
            group_id: parse_id(&row.group_id)?,
            title: row.title,
            description: row.description,
            created_by: parse_id(&row.created_by)?,
            status,
            head_branch: row.head_branch,
            latest_version_id: row
                .latest_version_id
                .as_deref()
                .map(parse_id::<VersionId>)
                .transpose()?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

impl TryFrom<VersionRow> for TemplateVersion {
    type Error = DbError;

    fn try_from(row: VersionRow) -> Result<Self> {
        let version_number = u64::try_from(row.version_number)
            .map_err(|_| DbError::Corrupt(format!("version number {}", row.version_number)))?;
        Ok(TemplateVersion {
            id: parse_id(&row.id)?,
            template_id: parse_id(&row.template_id)?,
            branch: row.branch_name,
            version_number,
            content: row.content,
            created_by: parse_id(&row.created_by)?,
            commit_message: row.commit_message,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

pub(crate) fn parse_id<T>(raw: &str) -> Result<T>
where
    T: FromStr<Err = uuid::Error>,
{
    raw.parse()
        .map_err(|e| DbError::Corrupt(format!("id '{}': {}", raw, e)))
}

pub(crate) fn parse_enum<T>(raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| DbError::Corrupt(e.to_string()))
}

/// Accepts the RFC 3339 form written by the schema defaults, and the plain
/// `datetime('now')` form for rows written by hand.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .map_err(|e| DbError::Corrupt(format!("timestamp '{}': {}", raw, e)))
}

pub(crate) fn version_to_sql(n: u64) -> Result<i64> {
    i64::try_from(n).map_err(|_| DbError::Corrupt(format!("version number {} out of range", n)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_timestamp_forms() {
        let a = parse_timestamp("2026-03-01T10:20:30.123Z").unwrap();
        let b = parse_timestamp("2026-03-01 10:20:30").unwrap();
        assert_eq!(a.timestamp(), b.timestamp());
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn negative_version_number_is_corrupt() {
        let row = VersionRow {
            id: uuid::Uuid::new_v4().to_string(),
            template_id: uuid::Uuid::new_v4().to_string(),
            branch_name: "main".into(),
            version_number: -1,
            content: "x".into(),
            created_by: uuid::Uuid::new_v4().to_string(),
            commit_message: None,
            created_at: "2026-03-01 10:20:30".into(),
        };
        assert!(matches!(TemplateVersion::try_from(row), Err(DbError::Corrupt(_))));
    }
}
