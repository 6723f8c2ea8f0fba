//! Backend registry, round-robin selection, and health state.
//!
//! [`LoadBalancer`] is the aggregate built once at startup: it owns the
//! immutable backend list ([`backend`]), the rotation counter
//! ([`rotation`]), and the per-backend liveness table ([`health`]) written
//! by the [`monitor`](crate::monitor).
//!
//! Selection never consults health state: every backend stays in rotation
//! whatever its last probe said.

pub mod backend;
pub mod health;
pub mod rotation;

use std::sync::Arc;
use std::time::Duration;

pub use backend::{Backend, BackendId};
pub use health::{HealthState, HealthTable};
pub use rotation::RoundRobin;

use crate::error::RotaryError;
use crate::monitor::HealthMonitor;
use crate::server::HttpClient;

#[derive(Debug)]
pub struct LoadBalancer {
    backends: Box<[Backend]>,
    rotation: RoundRobin,
    health: HealthTable,
    health_check_enabled: bool,
}

impl LoadBalancer {
    /// Build the registry from backend base addresses, in order.
    ///
    /// Fails on an empty list or on the first malformed address; no address
    /// is ever skipped, so registry positions always match the input.
    pub fn new<S: AsRef<str>>(
        addresses: &[S],
        health_check_enabled: bool,
    ) -> Result<Self, RotaryError> {
        if addresses.is_empty() {
            return Err(RotaryError::NoBackends);
        }

        let backends = addresses
            .iter()
            .enumerate()
            .map(|(index, address)| {
                let address = address.as_ref();
                backend::parse_base_address(address)
                    .map(|url| Backend::new(index, url))
                    .map_err(|reason| RotaryError::InvalidBackend {
                        index,
                        address: address.to_string(),
                        reason,
                    })
            })
            .collect::<Result<Box<[Backend]>, _>>()?;

        let health = HealthTable::new(backends.len());
        Ok(Self {
            backends,
            rotation: RoundRobin::new(),
            health,
            health_check_enabled,
        })
    }

    /// Pick the next backend in round-robin order.
    pub fn next_backend(&self) -> &Backend {
        &self.backends[self.rotation.next_index(self.backends.len())]
    }

    #[must_use]
    pub fn backends(&self) -> &[Backend] {
        &self.backends
    }

    #[must_use]
    pub fn backend(&self, id: BackendId) -> Option<&Backend> {
        self.backends.get(id.index())
    }

    #[must_use]
    pub const fn health(&self) -> &HealthTable {
        &self.health
    }

    #[must_use]
    pub fn health_of(&self, id: BackendId) -> HealthState {
        self.health.get(id)
    }

    #[must_use]
    pub const fn health_check_enabled(&self) -> bool {
        self.health_check_enabled
    }

    /// Build the health monitor for this balancer, or `None` when health
    /// checks are disabled.
    #[must_use]
    pub fn health_monitor(
        self: &Arc<Self>,
        client: HttpClient,
        interval: Duration,
        probe_timeout: Duration,
    ) -> Option<HealthMonitor> {
        self.health_check_enabled
            .then(|| HealthMonitor::new(Arc::clone(self), client, interval, probe_timeout))
    }
}
