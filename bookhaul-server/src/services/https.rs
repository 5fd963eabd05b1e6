use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::{Router, middleware};
use axum_server::tls_rustls::RustlsConfig;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;

use crate::auth::require_auth;
use crate::core::{Config, ServerState};
use crate::utils::AppError;

/// Room for multipart framing on top of the image itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// HTTP request log middleware
pub async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(crate::api::health::router())
        .merge(crate::api::auth::router())
        .merge(crate::api::books::router())
        .merge(crate::api::orders::router())
        .merge(crate::api::reviews::router())
        .merge(crate::api::chats::router())
        .merge(crate::api::admin::router())
        .merge(crate::api::upload::router())
}

/// Full application: routes, auth, state and the tower-http stack
pub fn build_router(state: ServerState) -> Router {
    let config = state.config.clone();
    build_app()
        // require_auth skips public routes itself
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes + MULTIPART_OVERHEAD))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_millis(config.request_timeout_ms)))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(log_request))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[derive(Clone)]
pub struct HttpsService {
    config: Config,
    router: Router,
}

impl HttpsService {
    pub fn new(state: ServerState) -> Self {
        Self {
            config: state.config.clone(),
            router: build_router(state),
        }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until `shutdown_signal` resolves
    ///
    /// HTTPS when `TLS_CERT_PATH`/`TLS_KEY_PATH` are set, plain HTTP otherwise.
    pub async fn start_server<F>(&self, shutdown_signal: F) -> Result<(), AppError>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let handle = axum_server::Handle::new();

        let grace = Duration::from_millis(self.config.shutdown_timeout_ms);
        let handle_clone = handle.clone();
        tokio::spawn(async move {
            shutdown_signal.await;
            handle_clone.graceful_shutdown(Some(grace));
        });

        let app = self.router.clone().into_make_service();

        let served = match &self.config.tls {
            Some(tls) => {
                let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                    .await
                    .map_err(|e| AppError::internal(format!("Failed to load TLS files: {}", e)))?;
                tracing::info!("Starting HTTPS server on {}", addr);
                axum_server::bind_rustls(addr, tls_config)
                    .handle(handle)
                    .serve(app)
                    .await
            }
            None => {
                tracing::info!("Starting HTTP server on {}", addr);
                axum_server::bind(addr).handle(handle).serve(app).await
            }
        };

        served.map_err(|e| AppError::internal(format!("Server error: {}", e)))
    }
}
