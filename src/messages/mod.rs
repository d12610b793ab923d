mod read;
mod send;

use axum::{routing::get, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/messages", get(read::read_messages).post(send::send_message))
}
