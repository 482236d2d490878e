//! Content API for the marketing site's blog.
//!
//! Serves the public post listing and the password-gated admin mutations
//! over a MongoDB `posts` collection. Page rendering and static assets are
//! deployed separately; this binary only answers under `/api`.
//!
//! # Endpoints
//!
//! - `GET /api/posts` — every post, most recent first
//! - `POST /api/posts` — create (admin)
//! - `PUT /api/posts/{id}` — update (admin)
//! - `DELETE /api/posts/{id}` — delete (admin)
//! - `GET /api/health` — store connectivity status
//!
//! Admin routes expect the shared secret in the `password` header.

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{HeaderName, Method, header::CONTENT_TYPE},
    middleware,
    routing::{get, post, put},
};
use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod posts;
pub mod routes;
pub mod state;

use routes::{
    create_post_handler, delete_post_handler, health_handler, list_posts_handler,
    update_post_handler,
};
use state::State;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = State::new();

    // Warm up the store connection; a dead store is tolerated and retried
    // lazily by the first request that needs it.
    if let Err(error) = state.store.ensure_connected().await {
        warn!("Document store unreachable at startup: {error}");
    }

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

/// Builds the API router. Mutating routes sit behind the admin gate.
pub fn app(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static("password")])
        .max_age(Duration::from_secs(60 * 60));

    let admin = Router::new()
        .route("/api/posts", post(create_post_handler))
        .route(
            "/api/posts/{id}",
            put(update_post_handler).delete(delete_post_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    Router::new()
        .route("/api/posts", get(list_posts_handler))
        .route("/api/health", get(health_handler))
        .merge(admin)
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
