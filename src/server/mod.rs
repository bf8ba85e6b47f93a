//! HTTP API for Link-Ripper
//!
//! Routes:
//! - `POST /api/v1/rip` rips the `target` of a JSON body
//! - `GET /api/v1/count` reports how many rips have completed
//! - everything else is served from the static UI directory

mod handlers;

pub use handlers::{
    count_handler, rip_handler, CountResponse, ErrorResponse, RipRequest, GENERIC_ERROR_MESSAGE,
    RELATIVE_URL_MESSAGE,
};

use crate::config::Config;
use crate::ripper::Ripper;
use crate::storage::FileRipCounter;
use crate::RipperError;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub ripper: Ripper,
    pub counter: FileRipCounter,
}

impl AppState {
    /// Builds the ripper and counter, with the counter observing the ripper
    pub fn new(ripper: Ripper, counter: FileRipCounter) -> Self {
        let ripper = ripper.with_observer(Arc::new(counter.clone()));
        Self { ripper, counter }
    }

    pub fn from_config(config: &Config) -> Result<Self, RipperError> {
        let ripper = Ripper::new(&config.fetcher)?;
        let counter = FileRipCounter::new(&config.server.count_file);
        Ok(Self::new(ripper, counter))
    }
}

/// Builds the Axum application router
pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/api/v1/rip", post(rip_handler))
        .route("/api/v1/count", get(count_handler))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured port and serves until the process exits
pub async fn serve(config: &Config) -> Result<(), RipperError> {
    let state = AppState::from_config(config)?;
    let app = build_router(state, Path::new(&config.server.static_dir));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Ripper listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
