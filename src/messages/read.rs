use axum::{debug_handler, extract::{Query, State}, Json};

use crate::{
    db::Message, directory::Directory, identity::User, message_log::{Limit, MessageLog},
    AppResult, AppState,
};

#[debug_handler(state = AppState)]
pub(crate) async fn read_messages(
    State(directory): State<Directory>,
    State(log): State<MessageLog>,
    user: User,
    Query(params): Query<Vec<(String, String)>>,
) -> AppResult<Json<Vec<Message>>> {
    // pairs rather than a struct, so a repeated `limit` is not a rejection
    let limit = params
        .iter()
        .find(|(key, _)| key == "limit")
        .map(|(_, value)| value.as_str());

    let viewer = directory.resolve(user.name()?).await?;
    let messages = log.query(&viewer, Limit::parse(limit)).await?;
    Ok(Json(messages))
}
