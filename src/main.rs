use std::sync::Arc;

use parlor::{app, clock::SystemClock, config::Config, db::Store, reaper::Reaper, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("parlor=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let store = Store::connect(&config.database_url, config.max_connections).await?;
    let clock = Arc::new(SystemClock);
    let app_state = AppState::new(store.clone(), clock.clone());

    let reaper = Reaper::new(app_state.directory.clone(), clock, config.reaper).spawn();

    let app = app(app_state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutting down");
    reaper.stop().await;
    store.close().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
