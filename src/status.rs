use axum::{debug_handler, extract::State, http::StatusCode, routing::post, Router};

use crate::{directory::Directory, identity::User, AppError, AppResult, AppState, ChatError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", post(heartbeat))
}

/// Explicit heartbeat. An unknown caller is a 404 here, unlike the message
/// endpoints which answer 422.
#[debug_handler(state = AppState)]
pub(crate) async fn heartbeat(
    State(directory): State<Directory>,
    user: User,
) -> AppResult<StatusCode> {
    let not_found = |e: ChatError| AppError::from(e).identity_status(StatusCode::NOT_FOUND);

    let name = user.name().map_err(not_found)?;
    directory.touch(name).await.map_err(not_found)?;

    Ok(StatusCode::OK)
}
