//! Leaderboard HTTP Server
//!
//! Stateless JSON API in front of the leaderboard service:
//!
//! - `GET  /api/records?circuit=N` current list
//! - `POST /api/records` signed score submission
//! - `OPTIONS /api/records` CORS pre-flight
//! - `GET  /health` liveness
//!
//! Store access is blocking file I/O, so the service runs on tokio's
//! blocking pool.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{debug, error, info, instrument};

use crate::leaderboard::service::{Leaderboard, LeaderboardError};
use crate::leaderboard::store::{FileRecordStore, RecordStore};
use crate::network::protocol::{
    to_entries, ErrorBody, ParamError, RecordsQuery, RecordsResponse, SubmitParams, SubmitResponse,
};

/// Record store shared by every request.
pub type SharedStore = Arc<dyn RecordStore>;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Directory holding `parcours{n}.txt` record files.
    pub records_dir: PathBuf,
    /// Allowed CORS origin; any origin when unset.
    pub cors_allow_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            records_dir: PathBuf::from("records"),
            cors_allow_origin: None,
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create config from a variable source; unset or unparsable values
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: lookup("BIND_ADDR")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.bind_addr),
            records_dir: lookup("RECORDS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.records_dir),
            cors_allow_origin: lookup("CORS_ALLOW_ORIGIN").filter(|v| !v.is_empty() && v != "*"),
        }
    }
}

/// Server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to address.
    #[error("Failed to bind: {0}")]
    Bind(#[source] std::io::Error),

    /// Server loop failed.
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),

    /// Configured CORS origin is not a valid header value.
    #[error("Invalid CORS origin: {0}")]
    InvalidOrigin(String),
}

// =============================================================================
// Responses
// =============================================================================

/// JSON error response.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody::new("Bad request", message),
        }
    }

    fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody::new("Internal error", "The records could not be accessed"),
        }
    }
}

impl From<ParamError> for ApiError {
    fn from(e: ParamError) -> Self {
        let error = match e {
            ParamError::Missing(_) => "Missing parameter",
            ParamError::Invalid(_) => "Invalid parameter",
        };
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody::new(error, e.message()),
        }
    }
}

impl From<LeaderboardError> for ApiError {
    fn from(e: LeaderboardError) -> Self {
        match e {
            LeaderboardError::InvalidInput(message) => ApiError::bad_request(message),
            LeaderboardError::Store(e) => {
                error!(error = %e, "record store failure");
                ApiError::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

// =============================================================================
// Router
// =============================================================================

#[derive(Clone)]
struct AppState {
    leaderboard: Arc<Leaderboard<SharedStore>>,
}

/// CORS policy for browser clients.
pub fn cors_layer(config: &ServerConfig) -> Result<CorsLayer, ServerError> {
    let origin = match &config.cors_allow_origin {
        Some(origin) => AllowOrigin::exact(
            HeaderValue::from_str(origin).map_err(|_| ServerError::InvalidOrigin(origin.clone()))?,
        ),
        None => AllowOrigin::from(Any),
    };
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]))
}

/// Build the API router.
pub fn router(leaderboard: Arc<Leaderboard<SharedStore>>, cors: CorsLayer) -> Router {
    Router::new()
        .route(
            "/api/records",
            get(get_records)
                .post(post_records)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .route("/health", get(health))
        .layer(cors)
        .with_state(AppState { leaderboard })
}

async fn health() -> &'static str {
    "ok"
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "GET, POST, OPTIONS")],
        Json(ErrorBody::new(
            "Method not allowed",
            "Only GET, POST and OPTIONS are allowed",
        )),
    )
        .into_response()
}

#[instrument(skip(state))]
async fn get_records(
    State(state): State<AppState>,
    Query(query): Query<RecordsQuery>,
) -> Result<Json<RecordsResponse>, ApiError> {
    let circuit = query.circuit()?;
    let leaderboard = state.leaderboard.clone();
    let records = tokio::task::spawn_blocking(move || leaderboard.get(circuit))
        .await
        .map_err(|e| {
            error!(error = %e, "records task failed");
            ApiError::internal()
        })??;

    Ok(Json(RecordsResponse {
        records: to_entries(&records),
    }))
}

#[instrument(skip_all)]
async fn post_records(State(state): State<AppState>, body: Bytes) -> Result<Json<SubmitResponse>, ApiError> {
    let params: SubmitParams = serde_json::from_slice(&body).map_err(|e| {
        debug!(error = %e, "undecodable submission body");
        ApiError::bad_request("Request body must be a JSON object")
    })?;
    let request = params.validate()?;

    let leaderboard = state.leaderboard.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        leaderboard.submit(
            request.circuit,
            &request.pseudo,
            request.chrono,
            &request.token,
            &request.key,
        )
    })
    .await
    .map_err(|e| {
        error!(error = %e, "submission task failed");
        ApiError::internal()
    })??;

    Ok(Json(SubmitResponse {
        success: outcome.accepted,
        new_rank: outcome.rank,
        records: to_entries(&outcome.records),
    }))
}

// =============================================================================
// Server
// =============================================================================

/// The leaderboard server.
pub struct LeaderboardServer {
    config: ServerConfig,
    leaderboard: Arc<Leaderboard<SharedStore>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl LeaderboardServer {
    /// Create a server persisting to `config.records_dir`.
    pub fn new(config: ServerConfig) -> Self {
        let store: SharedStore = Arc::new(FileRecordStore::new(config.records_dir.clone()));
        Self::with_store(config, store)
    }

    /// Create a server over an explicit store.
    pub fn with_store(config: ServerConfig, store: SharedStore) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            leaderboard: Arc::new(Leaderboard::new(store)),
            shutdown_tx,
        }
    }

    /// Server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Router serving this server's leaderboard.
    pub fn router(&self) -> Result<Router, ServerError> {
        Ok(router(self.leaderboard.clone(), cors_layer(&self.config)?))
    }

    /// Run until `shutdown` is called.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<(), ServerError> {
        let app = self.router()?;
        let listener = TcpListener::bind(self.config.bind_addr)
            .await
            .map_err(ServerError::Bind)?;
        info!("Leaderboard server listening on {}", self.config.bind_addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("Shutdown signal received");
            })
            .await
            .map_err(ServerError::Serve)
    }

    /// Stop a running server after in-flight requests complete.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}
