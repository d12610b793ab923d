use axum::{debug_handler, extract::{rejection::JsonRejection, State}, http::StatusCode, Json};

use crate::{directory::Directory, validate::NewParticipant, AppResult, AppState, ChatError};

#[debug_handler(state = AppState)]
pub(crate) async fn register(
    State(directory): State<Directory>,
    body: Result<Json<NewParticipant>, JsonRejection>,
) -> AppResult<StatusCode> {
    let Json(body) = body.map_err(|e| ChatError::Validation(vec![e.body_text()]))?;
    let name = body.validate()?;

    directory.register(&name).await?;

    Ok(StatusCode::CREATED)
}
