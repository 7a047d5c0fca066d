use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Branch every template starts on, and the one its head pointer follows
/// unless told otherwise.
pub const DEFAULT_BRANCH: &str = "main";

// -- Identifiers --

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

typed_id!(
    /// User identifier.
    UserId
);
typed_id!(
    /// Group identifier.
    GroupId
);
typed_id!(
    /// Template identifier.
    TemplateId
);
typed_id!(
    /// Identifier of a single immutable template version row.
    VersionId
);

// -- Enum parsing --

/// Returned when a stored or submitted enum string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(ParseEnumError { kind: $kind, value: s.to_string() }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// -- Roles & permissions --

/// Role a user holds inside a group. Variants are declared from least to
/// most privileged so the derived ordering is the privilege lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Viewer,
    Editor,
    Admin,
}

string_enum!(Role, "role", {
    Viewer => "VIEWER",
    Editor => "EDITOR",
    Admin => "ADMIN",
});

impl Role {
    /// Highest permission level this role grants.
    pub fn permission(&self) -> Permission {
        match self {
            Role::Admin => Permission::Administer,
            Role::Editor => Permission::Edit,
            Role::Viewer => Permission::View,
        }
    }

    pub fn allows(&self, required: Permission) -> bool {
        self.permission() >= required
    }
}

/// Level an operation requires. Ordered `View < Edit < Administer`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    View,
    Edit,
    Administer,
}

string_enum!(Permission, "permission", {
    View => "VIEW",
    Edit => "EDIT",
    Administer => "ADMINISTER",
});

// -- Statuses --

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
}

string_enum!(UserStatus, "user status", {
    Active => "ACTIVE",
    Inactive => "INACTIVE",
    Suspended => "SUSPENDED",
});

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupStatus {
    Active,
    Inactive,
    Deleted,
}

string_enum!(GroupStatus, "group status", {
    Active => "ACTIVE",
    Inactive => "INACTIVE",
    Deleted => "DELETED",
});

/// Template lifecycle: `Draft -> Published -> Archived`. Archived is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateStatus {
    Draft,
    Published,
    Archived,
}

string_enum!(TemplateStatus, "template status", {
    Draft => "DRAFT",
    Published => "PUBLISHED",
    Archived => "ARCHIVED",
});

// -- Records --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub status: GroupStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Binds one user to one group with a role. At most one per (group, user).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub group_id: GroupId,
    pub user_id: UserId,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable head record of a template. Content lives in [`TemplateVersion`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub group_id: GroupId,
    pub title: String,
    pub description: Option<String>,
    pub created_by: UserId,
    pub status: TemplateStatus,
    /// Branch whose newest version `latest_version_id` follows.
    pub head_branch: String,
    pub latest_version_id: Option<VersionId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Template {
    /// Derived from `status`; there is no separate archived flag.
    pub fn is_archived(&self) -> bool {
        self.status == TemplateStatus::Archived
    }
}

/// Immutable content snapshot. Unique on (template, branch, version_number).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateVersion {
    pub id: VersionId,
    pub template_id: TemplateId,
    pub branch: String,
    pub version_number: u64,
    pub content: String,
    pub created_by: UserId,
    pub commit_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchSummary {
    pub name: String,
    pub latest_version: u64,
    pub version_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_lattice_is_ordered_by_privilege() {
        assert!(Role::Viewer < Role::Editor);
        assert!(Role::Editor < Role::Admin);
        assert!(Permission::View < Permission::Edit);
        assert!(Permission::Edit < Permission::Administer);
    }

    #[test]
    fn role_maps_to_maximum_permission() {
        assert!(Role::Admin.allows(Permission::Administer));
        assert!(Role::Editor.allows(Permission::Edit));
        assert!(Role::Editor.allows(Permission::View));
        assert!(!Role::Editor.allows(Permission::Administer));
        assert!(Role::Viewer.allows(Permission::View));
        assert!(!Role::Viewer.allows(Permission::Edit));
    }

    #[test]
    fn enum_strings_parse_back() {
        assert_eq!("EDITOR".parse::<Role>().unwrap(), Role::Editor);
        assert_eq!("ARCHIVED".parse::<TemplateStatus>().unwrap(), TemplateStatus::Archived);
        assert_eq!("DELETED".parse::<GroupStatus>().unwrap(), GroupStatus::Deleted);
        assert_eq!(UserStatus::Suspended.as_str(), "SUSPENDED");
    }

    #[test]
    fn enum_parse_is_case_sensitive() {
        let err = "editor".parse::<Role>().unwrap_err();
        assert_eq!(err.kind, "role");
        assert!(err.to_string().contains("editor"));
        assert!("".parse::<TemplateStatus>().is_err());
    }

    #[test]
    fn role_serializes_as_screaming_case() {
        let json = serde_json::to_string(&Role::Admin).unwrap();
        assert_eq!(json, "\"ADMIN\"");
    }

    #[test]
    fn archived_flag_follows_status() {
        let now = Utc::now();
        let mut template = Template {
            id: TemplateId::new(),
            group_id: GroupId::new(),
            title: "Welcome".into(),
            description: None,
            created_by: UserId::new(),
            status: TemplateStatus::Published,
            head_branch: DEFAULT_BRANCH.into(),
            latest_version_id: None,
            created_at: now,
            updated_at: now,
        };
        assert!(!template.is_archived());
        template.status = TemplateStatus::Archived;
        assert!(template.is_archived());
    }

    #[test]
    fn typed_ids_display_as_uuid() {
        let uuid = Uuid::new_v4();
        let id = TemplateId(uuid);
        assert_eq!(id.to_string(), uuid.to_string());
        assert_eq!(id.to_string().parse::<TemplateId>().unwrap(), id);
    }
}
