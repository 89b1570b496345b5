//! Timetable Backend
//!
//! Persists the timetable planner's data as a single JSON document and serves the
//! front-end bundle.

mod api;
mod config;
mod errors;
mod models;
mod store;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Config, LogFormat};
use store::DocumentStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DocumentStore>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    tracing::info!("Starting Timetable Backend");
    tracing::info!("Public dir: {:?}", config.public_dir);

    if !config.public_dir.join("index.html").exists() {
        tracing::warn!(
            "No index.html in {:?}; front-end routes will return 404",
            config.public_dir
        );
    }

    // Initialize document store
    let store = Arc::new(store::init_store(&config.data_file).await?);
    tracing::info!("Database file: {:?}", store.path());

    let state = AppState {
        store,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // Unmatched paths get the asset if it exists, else the SPA entry point
    let index = state.config.public_dir.join("index.html");
    let front_end = ServeDir::new(&state.config.public_dir).fallback(ServeFile::new(index));

    let api_routes = Router::new()
        .route("/data", get(api::get_data).post(api::save_data))
        .route("/semester", post(api::create_semester))
        .route(
            "/semester/{name}",
            get(api::get_semester).delete(api::delete_semester),
        )
        .route("/health", get(api::health_check));

    let router = Router::new()
        .nest("/api", api_routes)
        .fallback_service(front_end);

    with_middleware(router, &state.config).with_state(state)
}

/// Body limit, request tracing, panic catching and CORS.
fn with_middleware<S>(router: Router<S>, config: &Config) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router.layer(DefaultBodyLimit::max(config.body_limit)).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::custom(errors::handle_panic))
            .layer(cors),
    )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
