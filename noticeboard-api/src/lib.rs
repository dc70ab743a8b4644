//! # Noticeboard API Server
//!
//! REST API for the noticeboard: a public feed plus token-gated admin routes.
//!
//! ## Endpoints
//!
//! - `GET /health` - Liveness, store backends and fallback-write counters
//! - `GET /api/announcements` - Public feed, most recent first
//! - `POST /api/admin/validate` - Check an admin token
//! - `POST /api/admin/announcements` - Create an announcement
//! - `PATCH /api/admin/announcements/:id` - Edit an announcement
//! - `DELETE /api/admin/announcements/:id` - Delete an announcement
//!
//! Admin routes require `Authorization: Bearer <ADMIN_TOKEN>`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use noticeboard_api::{ApiServer, ApiConfig};
//!
//! let server = ApiServer::new(ApiConfig::from_env()?)?;
//! server.run(([0, 0, 0, 0], 3000)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod auth;
mod dto;
mod error;
mod handlers;
mod routes;
mod state;

pub use auth::{AdminAuth, AdminGate};
pub use error::ApiError;
pub use routes::create_router;
pub use state::{ApiConfig, AppState};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use noticeboard_core::error::Result;

/// API server for the noticeboard.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a new API server with the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self> {
        Ok(Self::from_state(Arc::new(AppState::new(config)?)))
    }

    /// Creates a server around existing state.
    pub fn from_state(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Creates the router with all routes and layers configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(RequestBodyLimitLayer::new(self.state.config.max_body_bytes))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        if !self.state.gate.is_configured() {
            warn!("ADMIN_TOKEN is not set; admin routes will answer 500");
        }
        info!(
            backends = %self.state.store.backend_summary(),
            "Noticeboard API listening on {}", addr
        );

        axum::serve(listener, self.router()).await
    }
}
