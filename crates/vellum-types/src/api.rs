use serde::{Deserialize, Serialize};

use crate::models::{GroupId, GroupStatus, Role, TemplateId, TemplateStatus, UserId};

// -- JWT Claims --

/// JWT claims issued by the auth handlers and checked by the API middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: UserId,
    pub email: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: UserId,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: UserId,
    pub name: String,
    pub token: String,
}

// -- Groups --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddMemberRequest {
    pub user_id: UserId,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangeRoleRequest {
    pub role: Role,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetGroupStatusRequest {
    pub status: GroupStatus,
}

// -- Templates --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTemplateRequest {
    pub group_id: GroupId,
    pub title: String,
    pub description: Option<String>,
}

/// Omitted fields keep their current value. A blank description clears it.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTemplateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TemplateSearchQuery {
    pub status: Option<TemplateStatus>,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateVersionRequest {
    /// Defaults to `main` when omitted.
    pub branch: Option<String>,
    pub content: String,
    pub commit_message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VersionCreatedResponse {
    pub template_id: TemplateId,
    pub branch: String,
    pub version_number: u64,
}

/// `?branch=` selector for version reads. Branch names may contain `/`, so
/// they travel as a query parameter rather than a path segment.
#[derive(Debug, Default, Deserialize)]
pub struct BranchQuery {
    pub branch: Option<String>,
}
