use mindful::{handlers, router, AppState, Config, JsonStore};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    fs::create_dir_all(&config.data_dir).await?;

    let store = JsonStore::new(&config.data_dir);
    let journal = store.load_journal().await;
    info!(
        data_dir = %config.data_dir.display(),
        entries = journal.entries.len(),
        goals = journal.goals.len(),
        "journal loaded"
    );
    let state = AppState::new(store, journal);

    if let Err(err) = handlers::run_streak_check(&state).await {
        warn!("startup streak check failed: {err}");
    }

    let addr = config.addr();
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
