//! Active health checking.
//!
//! [`HealthMonitor`] probes `GET {backend}/ping` for every backend on a
//! fixed interval and records the outcome in the balancer's
//! [`HealthTable`](crate::balancer::HealthTable). A probe counts as healthy
//! only when a success-class status comes back within the probe timeout.
//! A single probe fully decides the state; there are no thresholds.
//!
//! The loop runs until the shutdown channel fires or its sender is dropped.
//! Probe failures are recorded, never propagated.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::balancer::{Backend, HealthState, LoadBalancer};
use crate::server::HttpClient;

/// Sub-path probed on every backend.
pub const PROBE_PATH: &str = "/ping";

const PROBE_USER_AGENT: &str = concat!("rotary-health-check/", env!("CARGO_PKG_VERSION"));

pub struct HealthMonitor {
    balancer: Arc<LoadBalancer>,
    client: HttpClient,
    interval: Duration,
    probe_timeout: Duration,
}

impl HealthMonitor {
    #[must_use]
    pub fn new(
        balancer: Arc<LoadBalancer>,
        client: HttpClient,
        interval: Duration,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            balancer,
            client,
            interval,
            probe_timeout,
        }
    }

    /// Run the probe loop on its own task.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Probe every backend immediately, then once per interval.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            interval = ?self.interval,
            timeout = ?self.probe_timeout,
            backends = self.balancer.backends().len(),
            path = PROBE_PATH,
            "health monitor starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.probe_all().await,
                _ = shutdown.changed() => {
                    tracing::debug!("health monitor shutting down");
                    return;
                }
            }
        }
    }

    /// One probe round over the whole registry, in registry order.
    pub async fn probe_all(&self) {
        for backend in self.balancer.backends() {
            let healthy = self.probe(backend).await;
            let previous = self.balancer.health().record(backend.id(), healthy);
            let current = HealthState::from_probe(healthy);
            if previous != current {
                tracing::info!(
                    backend = %backend,
                    from = %previous,
                    to = %current,
                    "backend health changed"
                );
            }
        }
    }

    async fn probe(&self, backend: &Backend) -> bool {
        let url = backend.endpoint(PROBE_PATH);
        let request = match Request::builder()
            .method(Method::GET)
            .uri(&url)
            .header(header::USER_AGENT, PROBE_USER_AGENT)
            .body(Body::empty())
        {
            Ok(request) => request,
            Err(e) => {
                tracing::error!(backend = %backend, error = %e, "failed to build health check request");
                return false;
            }
        };

        match time::timeout(self.probe_timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let status = response.status();
                // Release the connection right away; the body is never read.
                drop(response);
                if !status.is_success() {
                    tracing::warn!(backend = %backend, status = %status, "health check failed: non-success status");
                }
                status.is_success()
            }
            Ok(Err(e)) => {
                tracing::warn!(backend = %backend, error = %e, "health check failed: connection error");
                false
            }
            Err(_) => {
                tracing::warn!(backend = %backend, "health check failed: timeout");
                false
            }
        }
    }
}
