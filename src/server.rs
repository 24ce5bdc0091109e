//! Router composition and process startup.
//!
//! Global middleware wraps every route, outermost first: request id →
//! tracing → client address → panic recovery → request timeout. The
//! `/engineers` subtree sits behind the basic auth gate, and the
//! `/engineers/:username` routes also behind the resolver.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{extract::Request, middleware, routing::get, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, Span};

use crate::config::{AppConfig, SecurityConfig, StoreKind};
use crate::database::{
    seed, DatabaseManager, EngineerStore, MemoryEngineerStore, PgEngineerStore,
};
use crate::handlers::{self, engineers};
use crate::middleware::{
    basic_auth_middleware, client_ip_middleware, recover_from_panic,
    request_timeout_middleware, resolve_engineer_middleware, BasicCredentials,
};

/// Shared application state passed to handlers and middleware
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EngineerStore>,
    pub credentials: Arc<BasicCredentials>,
}

impl AppState {
    pub fn new(store: Arc<dyn EngineerStore>, security: &SecurityConfig) -> Self {
        Self {
            store,
            credentials: Arc::new(BasicCredentials::from_config(security)),
        }
    }
}

/// Build the complete application router
pub fn app(state: AppState, request_timeout: Duration) -> Router {
    let resource_routes = Router::new()
        .route(
            "/engineers/:username",
            get(engineers::engineer_show)
                .put(engineers::engineer_update)
                .delete(engineers::engineer_delete),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_engineer_middleware,
        ));

    let protected_routes = Router::new()
        .route(
            "/engineers",
            get(engineers::engineer_list).post(engineers::engineer_create),
        )
        .merge(resource_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            basic_auth_middleware,
        ));

    let router = Router::new()
        .route("/", get(handlers::welcome))
        .merge(protected_routes)
        .with_state(state);

    with_global_middleware(router, request_timeout)
}

/// Wrap a router with the process-wide middleware stack
pub fn with_global_middleware(router: Router, request_timeout: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(middleware::from_fn(client_ip_middleware))
            .layer(CatchPanicLayer::custom(recover_from_panic))
            .layer(middleware::from_fn_with_state(
                request_timeout,
                request_timeout_middleware,
            )),
    )
}

fn request_span(request: &Request) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

/// Open the configured store, seed it if asked, and serve until Ctrl-C
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    info!("Starting Engineers API in {:?} mode", config.environment);

    let mut database = None;
    let store: Arc<dyn EngineerStore> = match config.server.store {
        StoreKind::Postgres => {
            let manager = DatabaseManager::connect(&config.database)
                .await
                .context("failed to open database")?;
            let store = PgEngineerStore::new(manager.pool());
            database = Some(manager);
            Arc::new(store)
        }
        StoreKind::Memory => {
            info!("Using in-memory store; data is lost on exit");
            Arc::new(MemoryEngineerStore::new())
        }
    };

    if config.database.seed {
        seed::seed_engineers(store.as_ref(), seed::initial_engineers())
            .await
            .context("failed to seed engineer profiles")?;
    }

    let state = AppState::new(store, &config.security);
    let router = app(state, config.server.request_timeout());

    let bind_addr = config.server.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Engineers API listening on http://{}", bind_addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    if let Some(database) = database {
        database.close().await;
    }
    info!("The server has been shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request as HttpRequest, StatusCode},
    };
    use tower::ServiceExt;

    fn request(uri: &str) -> HttpRequest<Body> {
        HttpRequest::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn panicking() -> &'static str {
        panic!("boom")
    }

    async fn slow() -> &'static str {
        tokio::time::sleep(Duration::from_secs(10)).await;
        "late"
    }

    fn test_router(timeout: Duration) -> Router {
        let router = Router::new()
            .route("/panic", get(panicking))
            .route("/slow", get(slow))
            .route("/ok", get(|| async { "fine" }));
        with_global_middleware(router, timeout)
    }

    #[tokio::test]
    async fn panics_become_500() {
        let router = test_router(Duration::from_secs(5));

        let response = router.clone().oneshot(request("/panic")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = router.oneshot(request("/ok")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn slow_handlers_time_out_with_504() {
        let router = test_router(Duration::from_millis(50));
        let response = router.oneshot(request("/slow")).await.unwrap();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"\"request timed out\"");
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let router = test_router(Duration::from_secs(5));

        let response = router.clone().oneshot(request("/ok")).await.unwrap();
        assert!(response.headers().contains_key("x-request-id"));

        let tagged = HttpRequest::builder()
            .uri("/ok")
            .header("x-request-id", "trace-me")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(tagged).await.unwrap();
        assert_eq!(response.headers()["x-request-id"], "trace-me");
    }

    #[tokio::test]
    async fn welcome_is_public() {
        let state = AppState::new(
            Arc::new(MemoryEngineerStore::new()),
            &AppConfig::development().security,
        );
        let response = app(state, Duration::from_secs(5))
            .oneshot(request("/"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Welcome");
    }
}
