use axum::{debug_handler, extract::{rejection::JsonRejection, State}, http::StatusCode, Json};

use crate::{
    directory::Directory, identity::User, message_log::MessageLog, validate::NewMessage,
    AppResult, AppState, ChatError,
};

#[debug_handler(state = AppState)]
pub(crate) async fn send_message(
    State(directory): State<Directory>,
    State(log): State<MessageLog>,
    user: User,
    body: Result<Json<NewMessage>, JsonRejection>,
) -> AppResult<StatusCode> {
    let Json(body) = body.map_err(|e| ChatError::Validation(vec![e.body_text()]))?;
    let message = body.validate()?;

    let mut sender = directory.resolve(user.name()?).await?;

    log.append(&sender.name, &message.to, &message.text, message.kind).await?;
    if !directory.refresh(&mut sender).await? {
        tracing::debug!(name = %sender.name, "sender evicted before heartbeat, message kept");
    }

    Ok(StatusCode::CREATED)
}
