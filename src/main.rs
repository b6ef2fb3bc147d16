//! flyball-rings binary entrypoint wiring REST, SSE and the assignment store.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flyball_rings::{
    build_router,
    config::AppConfig,
    dao::assignment_store::{AssignmentStore, MemoryAssignmentStore},
    services::tournament_service,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let store = select_store().await?;
    let app_state = AppState::new(config, store);

    let seeded = tournament_service::seed_tournaments(&app_state, app_state.config().tournaments());
    if seeded > 0 {
        info!(count = seeded, "seeded tournaments from config");
    }

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// MongoDB when `MONGO_URI` is set, otherwise the in-process store.
#[cfg(feature = "mongo-store")]
async fn select_store() -> anyhow::Result<Arc<dyn AssignmentStore>> {
    use flyball_rings::dao::assignment_store::mongodb::{MongoAssignmentStore, MongoConfig};

    if env::var_os("MONGO_URI").is_none() {
        info!("MONGO_URI not set; using in-memory assignment store");
        return Ok(Arc::new(MemoryAssignmentStore::new()));
    }

    let config = MongoConfig::from_env()
        .await
        .context("reading MongoDB configuration")?;
    let store = MongoAssignmentStore::connect(config)
        .await
        .context("connecting to MongoDB")?;
    info!(database = store.database_name(), "using MongoDB assignment store");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "mongo-store"))]
async fn select_store() -> anyhow::Result<Arc<dyn AssignmentStore>> {
    info!("using in-memory assignment store");
    Ok(Arc::new(MemoryAssignmentStore::new()))
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
