//! Load balancer configuration.
//!
//! [`BalancerConfig`] collects the backend list, health-check settings, and
//! forwarding timeout from the command line (see
//! [`BackendArgs`](crate::cli::BackendArgs)). [`validation`] checks it
//! before anything starts.

pub mod validation;

use std::time::Duration;

use crate::cli::BackendArgs;

const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_secs(10);
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct BalancerConfig {
    /// Backend base addresses, in rotation order.
    pub backends: Vec<String>,
    pub health_check: HealthCheckConfig,
    /// `None` lets a forwarded request wait on its backend indefinitely.
    pub upstream_timeout: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthCheckConfig {
    pub enabled: bool,
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: DEFAULT_HEALTH_INTERVAL,
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

impl BalancerConfig {
    /// Config with health checks disabled and no forwarding timeout.
    #[must_use]
    pub fn new<S: Into<String>>(backends: impl IntoIterator<Item = S>) -> Self {
        Self {
            backends: backends.into_iter().map(Into::into).collect(),
            health_check: HealthCheckConfig::default(),
            upstream_timeout: None,
        }
    }
}

impl From<&BackendArgs> for BalancerConfig {
    fn from(args: &BackendArgs) -> Self {
        Self {
            // Entries stay in place even when blank so validation reports
            // them at their original position.
            backends: args.backends.iter().map(|b| b.trim().to_string()).collect(),
            health_check: HealthCheckConfig {
                enabled: args.health_check,
                interval: Duration::from_millis(args.health_interval_ms),
                timeout: Duration::from_millis(args.probe_timeout_ms),
            },
            upstream_timeout: args.upstream_timeout_ms.map(Duration::from_millis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_args_trims_and_keeps_order() {
        let args = BackendArgs {
            backends: vec![" http://a:1".into(), "http://b:2 ".into(), String::new()],
            health_check: true,
            health_interval_ms: 250,
            probe_timeout_ms: 100,
            upstream_timeout_ms: Some(3_000),
        };
        let config = BalancerConfig::from(&args);
        assert_eq!(config.backends, vec!["http://a:1", "http://b:2", ""]);
        assert_eq!(
            config.health_check,
            HealthCheckConfig {
                enabled: true,
                interval: Duration::from_millis(250),
                timeout: Duration::from_millis(100),
            }
        );
        assert_eq!(config.upstream_timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn new_uses_defaults() {
        let config = BalancerConfig::new(["http://a:1"]);
        assert!(!config.health_check.enabled);
        assert_eq!(config.health_check.interval, Duration::from_secs(10));
        assert_eq!(config.upstream_timeout, None);
    }
}
