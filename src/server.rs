//! Axum server setup, shared application state, and graceful shutdown.
//!
//! Contains [`AppState`] (the `Arc`-shared state holding the load
//! balancer, HTTP client, stats, and uptime), [`build_router`] for
//! constructing the Axum router, [`build_http_client`] for the hyper
//! client used by both forwarding and health probes, and
//! [`shutdown_signal`] for SIGTERM / Ctrl+C handling.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::routing::get;
use axum::Router;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::balancer::LoadBalancer;
use crate::proxy;
use crate::status::status_handler;

#[derive(Debug)]
pub struct Stats {
    pub forwarded: AtomicU64,
    pub failed: AtomicU64,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            forwarded: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }
}

pub type HttpsConnector =
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>;
/// Streaming client: request bodies are relayed as they arrive.
pub type HttpClient = Client<HttpsConnector, Body>;

pub struct AppState {
    pub balancer: Arc<LoadBalancer>,
    pub http_client: HttpClient,
    pub start_time: Instant,
    pub stats: Stats,
    /// Optional bound on a single backend exchange (until response headers).
    pub upstream_timeout: Option<Duration>,
}

impl AppState {
    #[must_use]
    pub fn new(balancer: Arc<LoadBalancer>, http_client: HttpClient) -> Self {
        Self {
            balancer,
            http_client,
            start_time: Instant::now(),
            stats: Stats::new(),
            upstream_timeout: None,
        }
    }

    #[must_use]
    pub const fn with_upstream_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.upstream_timeout = timeout;
        self
    }
}

#[must_use]
pub fn build_http_client() -> HttpClient {
    // Several crypto providers may be linked in; pin `ring` so rustls does
    // not have to guess.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build();
    Client::builder(TokioExecutor::new()).build(https)
}

/// Every request goes to the forwarding handler, except `GET`/`HEAD` on
/// `status_path` when one is configured.
pub fn build_router(state: Arc<AppState>, status_path: Option<&str>) -> Router {
    let router = match status_path {
        Some(path) => Router::new().route(
            path,
            get(status_handler).fallback(proxy::forward_handler),
        ),
        None => Router::new(),
    };

    router
        .fallback(proxy::forward_handler)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
