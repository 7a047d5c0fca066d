use rusqlite::{Connection, OptionalExtension, Row, params};
use vellum_types::models::{
    BranchSummary, Group, GroupId, GroupStatus, Membership, Role, Template, TemplateId,
    TemplateStatus, TemplateVersion, User, UserId, UserStatus,
};

use crate::models::{
    CommitOutcome, GroupRow, MemberStanding, MembershipRow, MembershipUpdate, NewVersion,
    TemplateRow, UserRow, VersionRow, parse_enum, version_to_sql,
};
use crate::{Database, DbError, Result};

const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

const USER_COLUMNS: &str = "id, email, password_hash, name, status, created_at, updated_at";
const GROUP_COLUMNS: &str = "id, name, description, status, created_at, updated_at";
const MEMBERSHIP_COLUMNS: &str = "group_id, user_id, role, created_at, updated_at";
const TEMPLATE_COLUMNS: &str = "id, group_id, title, description, created_by, status, head_branch, latest_version_id, created_at, updated_at";
const VERSION_COLUMNS: &str = "id, template_id, branch_name, version_number, content, created_by, commit_message, created_at";

/// Parameters for inserting a template head row.
#[derive(Debug, Clone)]
pub struct NewTemplate<'a> {
    pub id: &'a TemplateId,
    pub group_id: &'a GroupId,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub created_by: &'a UserId,
    pub head_branch: &'a str,
}

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &UserId,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<User> {
        self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO users (id, email, password_hash, name) VALUES (?1, ?2, ?3, ?4)",
                params![id.to_string(), email, password_hash, name],
            )?;
            query_user(tx, "id", &id.to_string())?.ok_or(DbError::NotFound)
        })
    }

    pub fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        self.with_conn(|conn| query_user(conn, "id", &id.to_string()))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    /// User plus stored credential hash, for the login path only.
    pub fn get_credentials_by_email(&self, email: &str) -> Result<Option<(User, String)>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS),
                    [email],
                    user_row,
                )
                .optional()?;
            row.map(|r| {
                let hash = r.password_hash.clone();
                User::try_from(r).map(|u| (u, hash))
            })
            .transpose()
        })
    }

    pub fn set_user_status(&self, id: &UserId, status: UserStatus) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                &format!("UPDATE users SET status = ?1, updated_at = {} WHERE id = ?2", NOW),
                params![status.as_str(), id.to_string()],
            )?;
            Ok(changed > 0)
        })
    }

    // -- Groups --

    /// Insert a group and make `admin` its first ADMIN in one transaction.
    pub fn create_group_with_admin(
        &self,
        id: &GroupId,
        name: &str,
        description: Option<&str>,
        admin: &UserId,
    ) -> Result<Group> {
        self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO groups (id, name, description) VALUES (?1, ?2, ?3)",
                params![id.to_string(), name, description],
            )?;
            tx.execute(
                "INSERT INTO group_users (group_id, user_id, role) VALUES (?1, ?2, ?3)",
                params![id.to_string(), admin.to_string(), Role::Admin.as_str()],
            )?;
            query_group(tx, "id", &id.to_string())?.ok_or(DbError::NotFound)
        })
    }

    pub fn get_group(&self, id: &GroupId) -> Result<Option<Group>> {
        self.with_conn(|conn| query_group(conn, "id", &id.to_string()))
    }

    pub fn get_group_by_name(&self, name: &str) -> Result<Option<Group>> {
        self.with_conn(|conn| query_group(conn, "name", name))
    }

    pub fn list_groups_by_status(&self, status: GroupStatus) -> Result<Vec<Group>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM groups WHERE status = ?1 ORDER BY name",
                GROUP_COLUMNS
            ))?;
            let rows = stmt
                .query_map([status.as_str()], group_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.into_iter().map(Group::try_from).collect()
        })
    }

    /// Groups `user` belongs to, optionally filtered by group status.
    pub fn list_groups_for_user(
        &self,
        user: &UserId,
        status: Option<GroupStatus>,
    ) -> Result<Vec<Group>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT g.id, g.name, g.description, g.status, g.created_at, g.updated_at
                 FROM groups g
                 JOIN group_users gu ON gu.group_id = g.id
                 WHERE gu.user_id = ?1 AND (?2 IS NULL OR g.status = ?2)
                 ORDER BY g.name",
            )?;
            let rows = stmt
                .query_map(
                    params![user.to_string(), status.map(|s| s.as_str())],
                    group_row,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.into_iter().map(Group::try_from).collect()
        })
    }

    pub fn set_group_status(&self, id: &GroupId, status: GroupStatus) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                &format!("UPDATE groups SET status = ?1, updated_at = {} WHERE id = ?2", NOW),
                params![status.as_str(), id.to_string()],
            )?;
            Ok(changed > 0)
        })
    }

    // -- Memberships --

    /// Fails with `Conflict` if the user already belongs to the group.
    pub fn insert_membership(&self, group: &GroupId, user: &UserId, role: Role) -> Result<Membership> {
        self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO group_users (group_id, user_id, role) VALUES (?1, ?2, ?3)",
                params![group.to_string(), user.to_string(), role.as_str()],
            )?;
            query_membership(tx, group, user)?.ok_or(DbError::NotFound)
        })
    }

    pub fn get_membership(&self, group: &GroupId, user: &UserId) -> Result<Option<Membership>> {
        self.with_conn(|conn| query_membership(conn, group, user))
    }

    pub fn get_role(&self, user: &UserId, group: &GroupId) -> Result<Option<Role>> {
        Ok(self.get_membership(group, user)?.map(|m| m.role))
    }

    pub fn member_standing(&self, user: &UserId, group: &GroupId) -> Result<Option<MemberStanding>> {
        self.with_conn(|conn| {
            let row: Option<(String, String, String)> = conn
                .query_row(
                    "SELECT gu.role, g.status, u.status
                     FROM group_users gu
                     JOIN groups g ON g.id = gu.group_id
                     JOIN users u ON u.id = gu.user_id
                     WHERE gu.group_id = ?1 AND gu.user_id = ?2",
                    params![group.to_string(), user.to_string()],
                    |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
                )
                .optional()?;

            row.map(|(role, group_status, user_status)| {
                Ok(MemberStanding {
                    role: parse_enum(&role)?,
                    group_status: parse_enum(&group_status)?,
                    user_status: parse_enum(&user_status)?,
                })
            })
            .transpose()
        })
    }

    /// Change a member's role, refusing to demote the group's last ADMIN.
    pub fn update_role(&self, group: &GroupId, user: &UserId, role: Role) -> Result<MembershipUpdate> {
        self.with_tx(|tx| {
            let Some(current) = query_membership(tx, group, user)? else {
                return Ok(MembershipUpdate::NotMember);
            };
            if current.role == Role::Admin && role != Role::Admin && count_admins(tx, group)? <= 1 {
                return Ok(MembershipUpdate::LastAdmin);
            }
            tx.execute(
                &format!(
                    "UPDATE group_users SET role = ?1, updated_at = {} WHERE group_id = ?2 AND user_id = ?3",
                    NOW
                ),
                params![role.as_str(), group.to_string(), user.to_string()],
            )?;
            Ok(MembershipUpdate::Updated)
        })
    }

    /// Remove a member, refusing to remove the group's last ADMIN.
    pub fn delete_membership(&self, group: &GroupId, user: &UserId) -> Result<MembershipUpdate> {
        self.with_tx(|tx| {
            let Some(current) = query_membership(tx, group, user)? else {
                return Ok(MembershipUpdate::NotMember);
            };
            if current.role == Role::Admin && count_admins(tx, group)? <= 1 {
                return Ok(MembershipUpdate::LastAdmin);
            }
            tx.execute(
                "DELETE FROM group_users WHERE group_id = ?1 AND user_id = ?2",
                params![group.to_string(), user.to_string()],
            )?;
            Ok(MembershipUpdate::Updated)
        })
    }

    pub fn list_memberships(&self, group: &GroupId, role: Option<Role>) -> Result<Vec<Membership>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM group_users
                 WHERE group_id = ?1 AND (?2 IS NULL OR role = ?2)
                 ORDER BY created_at, user_id",
                MEMBERSHIP_COLUMNS
            ))?;
            let rows = stmt
                .query_map(
                    params![group.to_string(), role.map(|r| r.as_str())],
                    membership_row,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.into_iter().map(Membership::try_from).collect()
        })
    }

    pub fn memberships_for_user(&self, user: &UserId) -> Result<Vec<Membership>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM group_users WHERE user_id = ?1 ORDER BY created_at, group_id",
                MEMBERSHIP_COLUMNS
            ))?;
            let rows = stmt
                .query_map([user.to_string()], membership_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.into_iter().map(Membership::try_from).collect()
        })
    }

    // -- Templates --

    pub fn insert_template(&self, new: &NewTemplate<'_>) -> Result<Template> {
        self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO templates (id, group_id, title, description, created_by, head_branch)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    new.id.to_string(),
                    new.group_id.to_string(),
                    new.title,
                    new.description,
                    new.created_by.to_string(),
                    new.head_branch,
                ],
            )?;
            query_template(tx, new.id)?.ok_or(DbError::NotFound)
        })
    }

    pub fn get_template(&self, id: &TemplateId) -> Result<Option<Template>> {
        self.with_conn(|conn| query_template(conn, id))
    }

    pub fn template_group(&self, id: &TemplateId) -> Result<Option<GroupId>> {
        self.with_conn(|conn| {
            let raw: Option<String> = conn
                .query_row(
                    "SELECT group_id FROM templates WHERE id = ?1",
                    [id.to_string()],
                    |r| r.get(0),
                )
                .optional()?;
            raw.as_deref()
                .map(crate::models::parse_id::<GroupId>)
                .transpose()
        })
    }

    /// Update title/description on a non-archived template. Returns false if
    /// no such live template exists.
    /// `description` is `None` to keep the current value and `Some(None)` to
    /// clear it.
    pub fn update_template_metadata(
        &self,
        id: &TemplateId,
        title: Option<&str>,
        description: Option<Option<&str>>,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                &format!(
                    "UPDATE templates
                     SET title = COALESCE(?1, title),
                         description = CASE WHEN ?2 THEN ?3 ELSE description END,
                         updated_at = {}
                     WHERE id = ?4 AND status != 'ARCHIVED'",
                    NOW
                ),
                params![title, description.is_some(), description.flatten(), id.to_string()],
            )?;
            Ok(changed > 0)
        })
    }

    /// Compare-and-set on template status. Returns false if the template was
    /// not in `from` when the statement ran.
    pub fn transition_template_status(
        &self,
        id: &TemplateId,
        from: &[TemplateStatus],
        to: TemplateStatus,
    ) -> Result<bool> {
        if from.is_empty() {
            return Ok(false);
        }
        self.with_conn_mut(|conn| {
            let placeholders: Vec<String> = (0..from.len()).map(|i| format!("?{}", i + 3)).collect();
            let sql = format!(
                "UPDATE templates SET status = ?1, updated_at = {} WHERE id = ?2 AND status IN ({})",
                NOW,
                placeholders.join(", ")
            );
            let mut values: Vec<String> = vec![to.as_str().to_string(), id.to_string()];
            values.extend(from.iter().map(|s| s.as_str().to_string()));
            let changed = conn.execute(&sql, rusqlite::params_from_iter(values.iter()))?;
            Ok(changed > 0)
        })
    }

    pub fn list_templates_by_status(&self, status: TemplateStatus) -> Result<Vec<Template>> {
        self.search_templates(Some(status), None)
    }

    /// Case-insensitive substring match on title.
    pub fn find_templates_by_title(&self, fragment: &str) -> Result<Vec<Template>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM templates
                 WHERE instr(lower(title), lower(?1)) > 0
                 ORDER BY updated_at DESC, id",
                TEMPLATE_COLUMNS
            ))?;
            let rows = stmt
                .query_map([fragment], template_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.into_iter().map(Template::try_from).collect()
        })
    }

    /// Optional status filter plus a case-insensitive keyword matched against
    /// title or description.
    pub fn search_templates(
        &self,
        status: Option<TemplateStatus>,
        keyword: Option<&str>,
    ) -> Result<Vec<Template>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM templates
                 WHERE (?1 IS NULL OR status = ?1)
                   AND (?2 IS NULL
                        OR instr(lower(title), lower(?2)) > 0
                        OR instr(lower(COALESCE(description, '')), lower(?2)) > 0)
                 ORDER BY updated_at DESC, id",
                TEMPLATE_COLUMNS
            ))?;
            let rows = stmt
                .query_map(params![status.map(|s| s.as_str()), keyword], template_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.into_iter().map(Template::try_from).collect()
        })
    }

    // -- Versions --

    /// Highest committed version number on (template, branch), 0 if none.
    pub fn max_version_number(&self, template: &TemplateId, branch: &str) -> Result<u64> {
        self.with_conn(|conn| query_max_version(conn, template, branch))
    }

    pub fn count_versions(&self, template: &TemplateId) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row(
                "SELECT COUNT(*) FROM template_versions WHERE template_id = ?1",
                [template.to_string()],
                |r| r.get(0),
            )?;
            Ok(n.max(0) as u64)
        })
    }

    /// Insert one version and move the template head, as a single transaction.
    ///
    /// The transaction re-reads the branch maximum and only inserts when it is
    /// exactly `version_number - 1`; otherwise it reports `Stale` and writes
    /// nothing. The head pointer moves only for the template's head branch,
    /// and only forward.
    pub fn commit_version(&self, new: &NewVersion<'_>) -> Result<CommitOutcome> {
        let number = version_to_sql(new.version_number)?;
        self.with_tx(|tx| {
            let head: Option<(String, String)> = tx
                .query_row(
                    "SELECT status, head_branch FROM templates WHERE id = ?1",
                    [new.template_id],
                    |r| Ok((r.get(0)?, r.get(1)?)),
                )
                .optional()?;
            let Some((status, head_branch)) = head else {
                return Err(DbError::NotFound);
            };
            if parse_enum::<TemplateStatus>(&status)? == TemplateStatus::Archived {
                return Ok(CommitOutcome::TemplateArchived);
            }

            let current_max: i64 = tx.query_row(
                "SELECT COALESCE(MAX(version_number), 0) FROM template_versions
                 WHERE template_id = ?1 AND branch_name = ?2",
                params![new.template_id, new.branch],
                |r| r.get(0),
            )?;
            if current_max + 1 != number {
                return Ok(CommitOutcome::Stale {
                    current_max: current_max.max(0) as u64,
                });
            }

            tx.execute(
                "INSERT INTO template_versions
                    (id, template_id, branch_name, version_number, content, created_by, commit_message)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    new.id,
                    new.template_id,
                    new.branch,
                    number,
                    new.content,
                    new.created_by,
                    new.commit_message,
                ],
            )?;

            let head_advanced = if head_branch == new.branch {
                tx.execute(
                    &format!(
                        "UPDATE templates
                         SET latest_version_id = ?1, updated_at = {}
                         WHERE id = ?2
                           AND (latest_version_id IS NULL
                                OR (SELECT version_number FROM template_versions
                                    WHERE id = templates.latest_version_id) < ?3)",
                        NOW
                    ),
                    params![new.id, new.template_id, number],
                )? > 0
            } else {
                false
            };
            if !head_advanced {
                tx.execute(
                    &format!("UPDATE templates SET updated_at = {} WHERE id = ?1", NOW),
                    [new.template_id],
                )?;
            }

            Ok(CommitOutcome::Committed { head_advanced })
        })
    }

    /// Versions on one branch, newest first.
    pub fn list_versions(&self, template: &TemplateId, branch: &str) -> Result<Vec<TemplateVersion>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM template_versions
                 WHERE template_id = ?1 AND branch_name = ?2
                 ORDER BY version_number DESC",
                VERSION_COLUMNS
            ))?;
            let rows = stmt
                .query_map(params![template.to_string(), branch], version_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.into_iter().map(TemplateVersion::try_from).collect()
        })
    }

    /// Versions on every branch, highest number first. Ties across branches
    /// order by branch name; this is not creation order.
    pub fn list_all_versions(&self, template: &TemplateId) -> Result<Vec<TemplateVersion>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM template_versions
                 WHERE template_id = ?1
                 ORDER BY version_number DESC, branch_name",
                VERSION_COLUMNS
            ))?;
            let rows = stmt
                .query_map([template.to_string()], version_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.into_iter().map(TemplateVersion::try_from).collect()
        })
    }

    pub fn get_latest_version(
        &self,
        template: &TemplateId,
        branch: &str,
    ) -> Result<Option<TemplateVersion>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!(
                        "SELECT {} FROM template_versions
                         WHERE template_id = ?1 AND branch_name = ?2
                         ORDER BY version_number DESC LIMIT 1",
                        VERSION_COLUMNS
                    ),
                    params![template.to_string(), branch],
                    version_row,
                )
                .optional()?;
            row.map(TemplateVersion::try_from).transpose()
        })
    }

    pub fn get_version(
        &self,
        template: &TemplateId,
        branch: &str,
        version_number: u64,
    ) -> Result<Option<TemplateVersion>> {
        // Numbers past the column range were never stored.
        let Ok(number) = i64::try_from(version_number) else {
            return Ok(None);
        };
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!(
                        "SELECT {} FROM template_versions
                         WHERE template_id = ?1 AND branch_name = ?2 AND version_number = ?3",
                        VERSION_COLUMNS
                    ),
                    params![template.to_string(), branch, number],
                    version_row,
                )
                .optional()?;
            row.map(TemplateVersion::try_from).transpose()
        })
    }

    pub fn list_branches(&self, template: &TemplateId) -> Result<Vec<BranchSummary>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT branch_name, MAX(version_number), COUNT(*)
                 FROM template_versions
                 WHERE template_id = ?1
                 GROUP BY branch_name
                 ORDER BY branch_name",
            )?;
            let rows = stmt
                .query_map([template.to_string()], |r| {
                    Ok(BranchSummary {
                        name: r.get(0)?,
                        latest_version: r.get::<_, i64>(1)?.max(0) as u64,
                        version_count: r.get::<_, i64>(2)?.max(0) as u64,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<User>> {
    // `column` is always a literal from this module.
    let row = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE {} = ?1", USER_COLUMNS, column),
            [value],
            user_row,
        )
        .optional()?;
    row.map(User::try_from).transpose()
}

fn query_group(conn: &Connection, column: &str, value: &str) -> Result<Option<Group>> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM groups WHERE {} = ?1", GROUP_COLUMNS, column),
            [value],
            group_row,
        )
        .optional()?;
    row.map(Group::try_from).transpose()
}

fn query_membership(conn: &Connection, group: &GroupId, user: &UserId) -> Result<Option<Membership>> {
    let row = conn
        .query_row(
            &format!(
                "SELECT {} FROM group_users WHERE group_id = ?1 AND user_id = ?2",
                MEMBERSHIP_COLUMNS
            ),
            params![group.to_string(), user.to_string()],
            membership_row,
        )
        .optional()?;
    row.map(Membership::try_from).transpose()
}

fn query_template(conn: &Connection, id: &TemplateId) -> Result<Option<Template>> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM templates WHERE id = ?1", TEMPLATE_COLUMNS),
            [id.to_string()],
            template_row,
        )
        .optional()?;
    row.map(Template::try_from).transpose()
}

fn query_max_version(conn: &Connection, template: &TemplateId, branch: &str) -> Result<u64> {
    let max: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version_number), 0) FROM template_versions
         WHERE template_id = ?1 AND branch_name = ?2",
        params![template.to_string(), branch],
        |r| r.get(0),
    )?;
    Ok(max.max(0) as u64)
}

fn count_admins(conn: &Connection, group: &GroupId) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM group_users WHERE group_id = ?1 AND role = ?2",
        params![group.to_string(), Role::Admin.as_str()],
        |r| r.get(0),
    )?)
}

fn user_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        name: row.get(3)?,
        status: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn group_row(row: &Row<'_>) -> rusqlite::Result<GroupRow> {
    Ok(GroupRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        status: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn membership_row(row: &Row<'_>) -> rusqlite::Result<MembershipRow> {
    Ok(MembershipRow {
        group_id: row.get(0)?,
        user_id: row.get(1)?,
        role: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn template_row(row: &Row<'_>) -> rusqlite::Result<TemplateRow> {
    Ok(TemplateRow {
        id: row.get(0)?,
        group_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        created_by: row.get(4)?,
        status: row.get(5)?,
        head_branch: row.get(6)?,
        latest_version_id: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn version_row(row: &Row<'_>) -> rusqlite::Result<VersionRow> {
    Ok(VersionRow {
        id: row.get(0)?,
        template_id: row.get(1)?,
        branch_name: row.get(2)?,
        version_number: row.get(3)?,
        content: row.get(4)?,
        created_by: row.get(5)?,
        commit_message: row.get(6)?,
        created_at: row.get(7)?,
    })
}
