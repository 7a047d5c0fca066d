use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use vellum_types::api::{Claims, CreateTemplateRequest, TemplateSearchQuery, UpdateTemplateRequest};
use vellum_types::models::TemplateId;

use crate::auth::AppState;
use crate::error::run_blocking;

pub async fn create_template(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateTemplateRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let template = run_blocking(&state, move |v| {
        v.create_template(&req.group_id, &req.title, req.description.as_deref(), &claims.sub)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(template)))
}

/// Only templates in groups the caller can view are returned.
pub async fn search_templates(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<TemplateSearchQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let templates = run_blocking(&state, move |v| {
        v.search_templates(query.status, query.q.as_deref(), &claims.sub)
    })
    .await?;
    Ok(Json(templates))
}

pub async fn get_template(
    State(state): State<AppState>,
    Path(template_id): Path<TemplateId>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let template = run_blocking(&state, move |v| v.get_template(&template_id, &claims.sub)).await?;
    Ok(Json(template))
}

pub async fn update_template(
    State(state): State<AppState>,
    Path(template_id): Path<TemplateId>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateTemplateRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let template = run_blocking(&state, move |v| {
        v.update_template(
            &template_id,
            req.title.as_deref(),
            req.description.as_deref(),
            &claims.sub,
        )
    })
    .await?;
    Ok(Json(template))
}

pub async fn publish_template(
    State(state): State<AppState>,
    Path(template_id): Path<TemplateId>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let template = run_blocking(&state, move |v| v.publish_template(&template_id, &claims.sub)).await?;
    Ok(Json(template))
}

/// Repeating the call on an archived template returns it unchanged.
pub async fn archive_template(
    State(state): State<AppState>,
    Path(template_id): Path<TemplateId>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let template = run_blocking(&state, move |v| v.archive_template(&template_id, &claims.sub)).await?;
    Ok(Json(template))
}

pub async fn list_branches(
    State(state): State<AppState>,
    Path(template_id): Path<TemplateId>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let branches = run_blocking(&state, move |v| v.list_branches(&template_id, &claims.sub)).await?;
    Ok(Json(branches))
}
