//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, body limit, request ID)
//! - Bound each rewrite by the request deadline
//! - Bind server to listener
//! - Hand each request to the current pipeline
//! - Swap in a rebuilt pipeline when the config changes

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use arc_swap::ArcSwap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::RewriterConfig;
use crate::fetch::FetchError;
use crate::http::request::{request_id, MakeRequestUuid, X_REQUEST_ID};
use crate::observability::metrics;
use crate::pipeline::{Pipeline, PipelineError, SubscriptionRequest, SubscriptionResponse};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// The active pipeline. Replaced wholesale on config reload.
    pub pipeline: Arc<ArcSwap<Pipeline>>,
    /// Deadline for one rewrite, upstream fetches included.
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(pipeline: Pipeline, request_timeout: Duration) -> Self {
        Self {
            pipeline: Arc::new(ArcSwap::from_pointee(pipeline)),
            request_timeout,
        }
    }
}

/// HTTP server exposing the rewrite pipeline.
pub struct HttpServer {
    router: Router,
    config: RewriterConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RewriterConfig) -> Result<Self, FetchError> {
        let pipeline = Pipeline::from_config(&config)?;
        Ok(Self::with_pipeline(config, pipeline))
    }

    /// Create a server around an already-built pipeline.
    pub fn with_pipeline(config: RewriterConfig, pipeline: Pipeline) -> Self {
        let state = AppState::new(pipeline, Duration::from_secs(config.timeouts.request_secs));
        let router = build_router(&config, state.clone());
        Self {
            router,
            config,
            state,
        }
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Configurations received on `config_updates` rebuild the pipeline,
    /// keeping its node editor.
    /// Listener, timeout and body limit changes need a restart.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<RewriterConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let state = self.state.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                let current = state.pipeline.load_full();
                match current.rebuild(&config) {
                    Ok(pipeline) => {
                        state.pipeline.store(Arc::new(pipeline));
                        tracing::info!("Pipeline rebuilt from reloaded config");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to rebuild pipeline, keeping current one");
                    }
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RewriterConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(config: &RewriterConfig, state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = request_id(request).unwrap_or("unknown"),
            )
        }))
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID));

    Router::new()
        .route("/subscription", post(subscription_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.security.max_body_size))
        .layer(middleware)
}

/// Rewrite one subscription.
async fn subscription_handler(
    State(state): State<AppState>,
    payload: Result<Json<SubscriptionRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(request) => request,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Rejected malformed request");
            let body = SubscriptionResponse::Failure {
                error: format!("Invalid request: {}", rejection.body_text()),
            };
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    let pipeline = state.pipeline.load_full();
    let start = Instant::now();
    let result = match tokio::time::timeout(state.request_timeout, pipeline.execute(&request)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                url = %request.url,
                timeout_secs = state.request_timeout.as_secs(),
                "Subscription rewrite timed out"
            );
            metrics::record_pipeline("timeout", start);
            Err(PipelineError::Timeout(state.request_timeout))
        }
    };

    match result {
        Ok(url) => (StatusCode::OK, Json(SubscriptionResponse::Success { url })).into_response(),
        Err(e) => {
            let status = status_for(&e);
            (status, Json(SubscriptionResponse::from(e))).into_response()
        }
    }
}

async fn health_handler() -> &'static str {
    "ok"
}

fn status_for(error: &PipelineError) -> StatusCode {
    if let PipelineError::Timeout(_) = error {
        StatusCode::GATEWAY_TIMEOUT
    } else if error.is_invalid_request() {
        StatusCode::BAD_REQUEST
    } else if error.is_network() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    }
}
