use axum::{debug_handler, extract::State, Json};
use serde::Serialize;

use crate::{directory::Directory, AppResult, AppState};

#[derive(Serialize)]
pub(crate) struct ParticipantView {
    name: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn list_participants(
    State(directory): State<Directory>,
) -> AppResult<Json<Vec<ParticipantView>>> {
    let names = directory.list().await?;
    Ok(Json(
        names.into_iter().map(|name| ParticipantView { name }).collect()
    ))
}
