use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use vellum_types::api::{
    AddMemberRequest, ChangeRoleRequest, Claims, CreateGroupRequest, SetGroupStatusRequest,
};
use vellum_types::models::{GroupId, UserId};

use crate::auth::AppState;
use crate::error::run_blocking;

pub async fn create_group(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let group = run_blocking(&state, move |v| {
        v.create_group(&req.name, req.description.as_deref(), &claims.sub)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn my_groups(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let groups = run_blocking(&state, move |v| v.my_groups(&claims.sub)).await?;
    Ok(Json(groups))
}

pub async fn get_group(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let group = run_blocking(&state, move |v| v.get_group(&group_id, &claims.sub)).await?;
    Ok(Json(group))
}

pub async fn set_group_status(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SetGroupStatusRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let group = run_blocking(&state, move |v| {
        v.set_group_status(&group_id, req.status, &claims.sub)
    })
    .await?;
    Ok(Json(group))
}

pub async fn list_members(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let members = run_blocking(&state, move |v| v.list_members(&group_id, &claims.sub)).await?;
    Ok(Json(members))
}

pub async fn add_member(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AddMemberRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let membership = run_blocking(&state, move |v| {
        v.add_member(&group_id, &req.user_id, req.role, &claims.sub)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

pub async fn change_role(
    State(state): State<AppState>,
    Path((group_id, user_id)): Path<(GroupId, UserId)>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ChangeRoleRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let membership = run_blocking(&state, move |v| {
        v.change_role(&group_id, &user_id, req.role, &claims.sub)
    })
    .await?;
    Ok(Json(membership))
}

pub async fn remove_member(
    State(state): State<AppState>,
    Path((group_id, user_id)): Path<(GroupId, UserId)>,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode, StatusCode> {
    run_blocking(&state, move |v| v.remove_member(&group_id, &user_id, &claims.sub)).await?;
    Ok(StatusCode::NO_CONTENT)
}
