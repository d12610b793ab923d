pub mod appresult;
pub mod clock;
pub mod config;
pub mod db;
pub mod directory;
pub mod error;
pub mod identity;
pub mod message_log;
pub mod messages;
pub mod participants;
pub mod reaper;
pub mod status;
pub mod validate;

use std::sync::Arc;

use axum::{extract::FromRef, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use appresult::{AppError, AppResult};
pub use error::{ChatError, ChatResult};

use clock::Clock;
use db::Store;
use directory::Directory;
use message_log::MessageLog;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub directory: Directory,
    pub log: MessageLog,
}

impl AppState {
    /// Wires the directory and message log onto one store and clock.
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        let log = MessageLog::new(store.clone(), clock.clone());
        let directory = Directory::new(store, log.clone(), clock);
        Self { directory, log }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(participants::router())
        .merge(messages::router())
        .merge(status::router())

        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
