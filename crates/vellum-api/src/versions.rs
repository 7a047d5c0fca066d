use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;

use vellum_types::api::{BranchQuery, Claims, CreateVersionRequest, VersionCreatedResponse};
use vellum_types::models::TemplateId;

use crate::auth::AppState;
use crate::error::run_blocking;

pub async fn create_version(
    State(state): State<AppState>,
    Path(template_id): Path<TemplateId>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateVersionRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let record = run_blocking(&state, move |v| {
        v.create_version(
            &template_id,
            req.branch.as_deref(),
            &req.content,
            &claims.sub,
            req.commit_message.as_deref(),
        )
    })
    .await?;

    if record.attempts > 1 {
        debug!(
            template = %template_id,
            attempts = record.attempts,
            "Version committed after retries"
        );
    }

    Ok((
        StatusCode::CREATED,
        Json(VersionCreatedResponse {
            template_id,
            branch: record.version.branch,
            version_number: record.version.version_number,
        }),
    ))
}

/// Highest number first. Without `?branch=` every branch is listed.
pub async fn list_versions(
    State(state): State<AppState>,
    Path(template_id): Path<TemplateId>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<BranchQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let versions = run_blocking(&state, move |v| match query.branch {
        Some(branch) => v.list_versions(&template_id, Some(&branch), &claims.sub),
        None => v.list_all_versions(&template_id, &claims.sub),
    })
    .await?;
    Ok(Json(versions))
}

pub async fn latest_version(
    State(state): State<AppState>,
    Path(template_id): Path<TemplateId>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<BranchQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let version = run_blocking(&state, move |v| {
        v.get_latest_version(&template_id, query.branch.as_deref(), &claims.sub)
    })
    .await?;
    Ok(Json(version))
}

pub async fn get_version(
    State(state): State<AppState>,
    Path((template_id, version_number)): Path<(TemplateId, u64)>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<BranchQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let version = run_blocking(&state, move |v| {
        v.get_version(&template_id, query.branch.as_deref(), version_number, &claims.sub)
    })
    .await?;
    Ok(Json(version))
}
