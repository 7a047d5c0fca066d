use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::{self, AppState};
use crate::middleware::require_auth;
use crate::{groups, templates, versions};

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/groups", get(groups::my_groups).post(groups::create_group))
        .route("/groups/{group_id}", get(groups::get_group))
        .route("/groups/{group_id}/status", put(groups::set_group_status))
        .route(
            "/groups/{group_id}/members",
            get(groups::list_members).post(groups::add_member),
        )
        .route(
            "/groups/{group_id}/members/{user_id}",
            put(groups::change_role).delete(groups::remove_member),
        )
        .route(
            "/templates",
            get(templates::search_templates).post(templates::create_template),
        )
        .route(
            "/templates/{template_id}",
            get(templates::get_template).patch(templates::update_template),
        )
        .route("/templates/{template_id}/publish", post(templates::publish_template))
        .route("/templates/{template_id}/archive", post(templates::archive_template))
        .route("/templates/{template_id}/branches", get(templates::list_branches))
        .route(
            "/templates/{template_id}/versions",
            get(versions::list_versions).post(versions::create_version),
        )
        .route("/templates/{template_id}/versions/latest", get(versions::latest_version))
        .route(
            "/templates/{template_id}/versions/{version_number}",
            get(versions::get_version),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}
