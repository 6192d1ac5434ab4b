use chrono::Local;
use std::net::SocketAddr;
use tokio::fs;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use wellness_companion::escalation::spawn_renderer;
use wellness_companion::session::Session;
use wellness_companion::storage::KvStore;
use wellness_companion::{AppState, Config, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if let Some(parent) = config.data_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let store = KvStore::open(&config.data_path).await;
    let session = Session::load(store, &config.username, Local::now().date_naive());
    if let Err(err) = session.store.persist().await {
        error!("failed to write data file: {}", err.message);
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(backend = %config.backend_url, user = %config.username, "starting wellness companion");

    let state = AppState::new(config, session);
    spawn_renderer(&state.bus, state.escalation.clone());
    let app = router(state);

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
    }
    info!("shutting down");
}
