//! Seergate API server entry point.

use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use seergate_api::state::{AppState, CloudHandle};
use seergate_core::clock::SystemClock;
use seergate_core::rng::OsRandomSource;
use seergate_core::store::SessionStore;
use seergate_divination::deck::Deck;
use seergate_engine::scripted::ScriptedStory;
use seergate_session::controller::TrialSession;
use seergate_store::{JsonFileStore, PgSessionStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Seergate API server");

    // Read configuration from environment. The database is optional: with
    // no DATABASE_URL the trial runs local-only and the session surface
    // reports cloud as unconfigured.
    let database_url = std::env::var("DATABASE_URL").ok();
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .map_err(|e| format!("PORT must be a valid u16: {e}"))?;
    let data_dir = std::env::var("SEERGATE_DATA_DIR")
        .map_or_else(|_| JsonFileStore::default_dir(), PathBuf::from);

    let clock = Arc::new(SystemClock);
    let local = Arc::new(JsonFileStore::new(data_dir));
    let deck = Deck::builtin();

    let cloud = match database_url {
        Some(url) => {
            let pool = PgPoolOptions::new().max_connections(10).connect(&url).await?;
            let store = PgSessionStore::new(pool);
            store.ensure_schema().await?;
            let store: Arc<dyn SessionStore> = Arc::new(store);
            Some(CloudHandle::new(store, clock.clone()))
        }
        None => {
            tracing::info!("DATABASE_URL not set, running without cloud sessions");
            None
        }
    };

    // Boot the trial from the local autosave (or fresh) before serving.
    let engine = ScriptedStory::demo()?;
    let mut session = TrialSession::new(Box::new(engine), deck.clone(), local.clone(), clock.clone());
    session.boot()?;
    let session = Arc::new(tokio::sync::Mutex::new(session));

    let app_state = AppState::new(
        session,
        local,
        deck,
        clock,
        Arc::new(OsRandomSource),
        cloud,
    );

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = seergate_api::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| format!("invalid HOST:PORT combination: {e}"))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
