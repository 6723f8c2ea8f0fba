//! Per-backend liveness table.
//!
//! One atomic cell per registry slot, indexed by [`BackendId`]. Cells start
//! as [`HealthState::Unknown`] and are only written by the health monitor;
//! any task may read them concurrently.

use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

use super::backend::BackendId;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    /// Never probed.
    Unknown = 0,
    Healthy = 1,
    Unhealthy = 2,
}

impl HealthState {
    #[must_use]
    pub const fn from_probe(healthy: bool) -> Self {
        if healthy {
            Self::Healthy
        } else {
            Self::Unhealthy
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
        }
    }
}

impl From<u8> for HealthState {
    fn from(val: u8) -> Self {
        match val {
            1 => Self::Healthy,
            2 => Self::Unhealthy,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug)]
pub struct HealthTable {
    cells: Box<[AtomicU8]>,
}

impl HealthTable {
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            cells: (0..len)
                .map(|_| AtomicU8::new(HealthState::Unknown as u8))
                .collect(),
        }
    }

    /// Current state of `id`. Ids outside the table read as unknown.
    #[must_use]
    pub fn get(&self, id: BackendId) -> HealthState {
        self.cells
            .get(id.index())
            .map_or(HealthState::Unknown, |cell| {
                HealthState::from(cell.load(Ordering::Acquire))
            })
    }

    /// Record a probe outcome and return the previous state.
    pub fn record(&self, id: BackendId, healthy: bool) -> HealthState {
        let next = HealthState::from_probe(healthy);
        self.cells
            .get(id.index())
            .map_or(HealthState::Unknown, |cell| {
                HealthState::from(cell.swap(next as u8, Ordering::AcqRel))
            })
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<HealthState> {
        self.cells
            .iter()
            .map(|cell| HealthState::from(cell.load(Ordering::Acquire)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balancer::backend::Backend;

    fn id(index: usize) -> BackendId {
        Backend::new(index, url::Url::parse("http://localhost").unwrap()).id()
    }

    #[test]
    fn starts_unknown() {
        let table = HealthTable::new(2);
        assert_eq!(table.snapshot(), vec![HealthState::Unknown; 2]);
    }

    #[test]
    fn record_returns_previous_state() {
        let table = HealthTable::new(1);
        assert_eq!(table.record(id(0), true), HealthState::Unknown);
        assert_eq!(table.record(id(0), false), HealthState::Healthy);
        assert_eq!(table.get(id(0)), HealthState::Unhealthy);
    }

    #[test]
    fn single_probe_decides_state() {
        let table = HealthTable::new(1);
        table.record(id(0), false);
        table.record(id(0), true);
        assert_eq!(table.get(id(0)), HealthState::Healthy);
    }

    #[test]
    fn out_of_range_is_unknown() {
        let table = HealthTable::new(1);
        assert_eq!(table.get(id(5)), HealthState::Unknown);
        assert_eq!(table.record(id(5), true), HealthState::Unknown);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&HealthState::Unhealthy).unwrap(),
            "\"unhealthy\""
        );
    }
}
