//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, CORS, body cap, rate limit)
//! - Validate the requested kind before anything touches the queue
//! - Hand submissions to the job queue and shape settled results

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::executor::CadExecutor;
use crate::http::request::GeneratePayload;
use crate::http::response;
use crate::observability::metrics;
use crate::queue::{JobQueue, OutputKind};
use crate::security::limits;
use crate::security::rate_limit::{self, RateLimiterState};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub queue: JobQueue,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and executor.
    ///
    /// The queue is constructed here with the executor injected, so tests
    /// can stand up a full server around a fake engine.
    pub fn new(config: ServerConfig, executor: Arc<dyn CadExecutor>) -> Self {
        let queue = JobQueue::new(executor, config.queue.execution_timeout());
        let limiter = Arc::new(RateLimiterState::new(config.rate_limit.clone()));

        let state = AppState { queue };
        let router = Self::build_router(&config, state, limiter);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(
        config: &ServerConfig,
        state: AppState,
        limiter: Arc<RateLimiterState>,
    ) -> Router {
        // Admission layers guard only submissions; liveness stays unthrottled.
        // The configured cap replaces axum's built-in extractor limit.
        let submissions = Router::new()
            .route("/{kind}", post(submit_handler))
            .layer(axum::middleware::from_fn_with_state(
                limiter,
                rate_limit::rate_limit_middleware,
            ))
            .layer(DefaultBodyLimit::disable())
            .layer(limits::body_limit_layer(config.limits.max_body_size));

        Router::new()
            .route("/test", get(liveness_handler))
            .merge(submissions)
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Liveness probe.
async fn liveness_handler() -> &'static str {
    "cad-relay is running"
}

/// Submission endpoint.
///
/// Unrecognized kinds are rejected here, before the queue is involved;
/// the queue re-checks on its own anyway.
async fn submit_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    payload: Result<Json<GeneratePayload>, JsonRejection>,
) -> Response {
    let start = Instant::now();

    if kind.parse::<OutputKind>().is_err() {
        tracing::debug!(kind = %kind, "Unrecognized endpoint");
        // Label with a fixed value; client-supplied strings would blow up
        // metric cardinality.
        metrics::record_request("POST", 400, "invalid", start);
        return response::failure(400, "Invalid endpoint");
    }

    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::debug!(kind = %kind, error = %rejection, "Malformed submission body");
            metrics::record_request("POST", 400, &kind, start);
            return response::failure(400, &rejection.body_text());
        }
    };

    match state.queue.submit(&kind, payload.code).await {
        Ok(output) => {
            metrics::record_request("POST", StatusCode::OK.as_u16(), &kind, start);
            response::success(output)
        }
        Err(err) => {
            metrics::record_request("POST", err.status(), &kind, start);
            err.into_response()
        }
    }
}
