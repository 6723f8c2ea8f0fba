//! `GET {status_path}` endpoint handler.
//!
//! Returns a [`StatusResponse`] JSON payload with the server version,
//! uptime, the backend registry and each backend's last probe outcome,
//! and cumulative request statistics. Only mounted when a status path is
//! configured; otherwise every path is forwarded.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::balancer::HealthState;
use crate::server::AppState;

#[derive(Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub health_checks_enabled: bool,
    pub backends: Vec<BackendStatus>,
    pub stats: StatsResponse,
}

#[derive(Serialize, Deserialize)]
pub struct BackendStatus {
    pub id: usize,
    pub url: String,
    pub health: HealthState,
}

#[derive(Serialize, Deserialize)]
pub struct StatsResponse {
    pub requests_forwarded: u64,
    pub requests_failed: u64,
}

pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let balancer = &state.balancer;
    let health = balancer.health().snapshot();

    let backends = balancer
        .backends()
        .iter()
        .zip(health)
        .map(|(backend, health)| BackendStatus {
            id: backend.id().index(),
            url: backend.base().to_string(),
            health,
        })
        .collect();

    Json(StatusResponse {
        status: "running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        health_checks_enabled: balancer.health_check_enabled(),
        backends,
        stats: StatsResponse {
            requests_forwarded: state.stats.forwarded.load(Ordering::Relaxed),
            requests_failed: state.stats.failed.load(Ordering::Relaxed),
        },
    })
}
