//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (tracing)
//! - Bind server to listener with graceful shutdown
//! - Dispatch each request on the `DevServerRouter` decision
//! - Observability (metrics, structured logs)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::http::forward::UpstreamClient;
use crate::http::static_files::{serve_passthrough, serve_rewrite};
use crate::observability::metrics;
use crate::routing::{Action, DevServerRouter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<DevServerRouter>,
    pub upstream: UpstreamClient,
    pub static_root: Option<Arc<PathBuf>>,
}

/// The development server.
pub struct DevServer {
    app: Router,
    config: Arc<ServerConfig>,
}

impl DevServer {
    /// Create a new server from a validated configuration.
    ///
    /// Fails only if the upstream TLS client cannot be set up.
    pub fn new(config: ServerConfig) -> Result<Self, rustls::Error> {
        let state = AppState {
            router: Arc::new(DevServerRouter::new(&config)),
            upstream: UpstreamClient::new(&config.upstream)?,
            static_root: config.static_root.clone().map(Arc::new),
        };

        let app = Self::build_router(state);
        Ok(Self {
            app,
            config: Arc::new(config),
        })
    }

    /// Every path goes through the fallback; routing is ours, not Axum's.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            aliases = self.config.aliases.len(),
            proxy_rules = self.config.proxy_rules.len(),
            "Dev server starting"
        );

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("Dev server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Resolve the path and act on the decision.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let action = state.router.resolve(&path);
    let kind = action.kind();

    tracing::debug!(method = %method, path = %path, action = kind, "Resolved request");

    let response = match action {
        Action::Rewrite(rewrite) => serve_rewrite(&rewrite, request).await,
        Action::Forward(forward) => match state.upstream.forward(&forward, request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(
                    method = %method,
                    path = %path,
                    kind = err.kind(),
                    error = %err,
                    "Upstream request failed"
                );
                metrics::record_gateway_error(err.kind());
                err.into_response()
            }
        },
        Action::Passthrough => {
            serve_passthrough(state.static_root.as_deref().map(PathBuf::as_path), request).await
        }
    };

    metrics::record_request(kind, response.status().as_u16(), start_time);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_new_server_answers_request() {
        let server = DevServer::new(ServerConfig::new(3000)).unwrap();

        let request = Request::builder()
            .uri("/favicon.ico")
            .body(Body::empty())
            .unwrap();
        let response = server.app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
