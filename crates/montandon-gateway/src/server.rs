// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the API.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{delete, get, patch, post};
use montandon_campaign::CampaignDispatcher;
use montandon_config::model::ServerConfig;
use montandon_core::{
    MessageGateway, MontandonError, PhoneNormalizer, SearchGateway, StorageAdapter,
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn StorageAdapter>,
    pub search: Arc<dyn SearchGateway>,
    pub messaging: Arc<dyn MessageGateway>,
    pub dispatcher: CampaignDispatcher,
    /// Applied to phones submitted through the contacts endpoints.
    pub normalizer: PhoneNormalizer,
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        search: Arc<dyn SearchGateway>,
        messaging: Arc<dyn MessageGateway>,
        dispatcher: CampaignDispatcher,
        normalizer: PhoneNormalizer,
    ) -> Self {
        Self {
            storage,
            search,
            messaging,
            dispatcher,
            normalizer,
            start_time: Instant::now(),
        }
    }
}

/// Builds the application router.
///
/// Routes under `config.api_prefix`:
/// - POST /search
/// - GET, POST /contacts; PATCH, DELETE /contacts/{id}
/// - GET, POST /templates; DELETE /templates/{id}
/// - GET, POST /campaigns; GET /campaigns/logs; GET /campaigns/{id}
/// - GET /messaging/status
/// - GET /health (detailed)
///
/// Plus an unprefixed GET /health liveness check.
pub fn router(state: AppState, config: &ServerConfig) -> Result<Router, MontandonError> {
    let api = Router::new()
        .route("/search", post(handlers::search))
        .route(
            "/contacts",
            get(handlers::list_contacts).post(handlers::create_contacts),
        )
        .route(
            "/contacts/{id}",
            patch(handlers::update_contact).delete(handlers::delete_contact),
        )
        .route(
            "/templates",
            get(handlers::list_templates).post(handlers::create_template),
        )
        .route("/templates/{id}", delete(handlers::delete_template))
        .route(
            "/campaigns",
            get(handlers::list_campaigns).post(handlers::create_campaign),
        )
        .route("/campaigns/logs", get(handlers::list_campaign_logs))
        .route("/campaigns/{id}", get(handlers::get_campaign))
        .route("/messaging/status", get(handlers::messaging_status))
        .route("/health", get(handlers::detailed_health));

    let app = Router::new()
        .route("/health", get(handlers::liveness))
        .nest(&config.api_prefix, api)
        .layer(cors_layer(&config.cors_origins)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state);
    Ok(app)
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer, MontandonError> {
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|e| {
                MontandonError::Config(format!("invalid CORS origin `{origin}`: {e}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any))
}

/// Start the HTTP server and serve until `shutdown` is cancelled.
pub async fn start_server(
    config: &ServerConfig,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), MontandonError> {
    let app = router(state, config)?;

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| MontandonError::Internal(format!("failed to bind {addr}: {e}")))?;

    info!("HTTP server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| MontandonError::Internal(format!("server error: {e}")))?;

    info!("HTTP server stopped");
    Ok(())
}
