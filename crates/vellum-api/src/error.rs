use axum::http::StatusCode;
use tracing::{debug, error};
use vellum_core::{ErrorKind, Vellum, VellumError};

use crate::auth::AppState;

pub fn status_for(err: &VellumError) -> StatusCode {
    match err.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::InvalidState => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::ValidationFailed => StatusCode::BAD_REQUEST,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Run a core call off the async runtime and map its error to a status code.
pub async fn run_blocking<F, T>(state: &AppState, f: F) -> Result<T, StatusCode>
where
    F: FnOnce(&Vellum) -> vellum_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.vellum))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|e| {
            let status = status_for(&e);
            if status.is_server_error() {
                error!("core error: {}", e);
            } else {
                debug!("request rejected ({}): {}", status, e);
            }
            status
        })
}
