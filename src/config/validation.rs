//! Configuration validation with detailed error reporting.
//!
//! The [`validate`] function checks a [`BalancerConfig`] for an empty
//! backend list, malformed backend addresses, and zero durations. Every
//! problem is reported at once as a [`ValidationError`] with a suggestion
//! where one helps.

use std::time::Duration;

use super::BalancerConfig;
use crate::balancer::backend::parse_base_address;
use crate::error::ValidationError;

/// Validate a single backend base address. Returns `Ok(())` or a human-readable error.
pub fn validate_backend(address: &str) -> Result<(), String> {
    if address.is_empty() {
        return Err("backend address cannot be empty".into());
    }
    parse_base_address(address)
        .map(|_| ())
        .map_err(|reason| format!("'{address}' is not a valid backend address: {reason}"))
}

/// Validate the status endpoint path. Returns `Ok(())` or a human-readable error.
pub fn validate_status_path(path: &str) -> Result<(), String> {
    if !path.starts_with('/') {
        return Err(format!(
            "path must start with '/' (did you mean '/{path}'?)"
        ));
    }
    let capture_segment = path.split('/').any(|segment| segment.starts_with(':'));
    if capture_segment || path.contains(['{', '}', '*']) {
        return Err("path must be literal, without captures or wildcards".into());
    }
    Ok(())
}

pub fn validate(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.backends.is_empty() {
        errors.push(ValidationError {
            field: "backends".into(),
            message: "at least one backend is required".into(),
            suggestion: Some("pass --backends http://host:port[,http://host:port...]".into()),
        });
    }

    for (index, address) in config.backends.iter().enumerate() {
        if let Err(message) = validate_backend(address) {
            let suggestion = (!address.is_empty() && !address.contains("://"))
                .then(|| format!("did you mean 'http://{address}'?"));
            errors.push(ValidationError {
                field: format!("backends[{index}]"),
                message,
                suggestion,
            });
        }
    }

    let health = &config.health_check;
    if health.enabled {
        if health.interval.is_zero() {
            errors.push(zero_duration("health_interval_ms"));
        }
        if health.timeout.is_zero() {
            errors.push(zero_duration("probe_timeout_ms"));
        }
    }

    if config.upstream_timeout.is_some_and(|t| t.is_zero()) {
        errors.push(ValidationError {
            field: "upstream_timeout_ms".into(),
            message: "must be greater than 0".into(),
            suggestion: Some("omit the flag to wait on backends indefinitely".into()),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn zero_duration(field: &str) -> ValidationError {
    ValidationError {
        field: field.into(),
        message: "must be greater than 0".into(),
        suggestion: None,
    }
}

/// One-paragraph summary of a valid config, for `rotary validate`.
#[must_use]
pub fn format_validation_report(config: &BalancerConfig) -> String {
    use std::fmt::Write;

    let mut report = format!("{} backends in rotation order:", config.backends.len());
    for (index, address) in config.backends.iter().enumerate() {
        let _ = write!(report, "\n    [{index}] {address}");
    }

    let health = &config.health_check;
    if health.enabled {
        let _ = write!(
            report,
            "\n  health checks: GET /ping every {}, timeout {}",
            format_duration(health.interval),
            format_duration(health.timeout)
        );
    } else {
        report.push_str("\n  health checks: disabled");
    }

    match config.upstream_timeout {
        Some(timeout) => {
            let _ = write!(report, "\n  upstream timeout: {}", format_duration(timeout));
        }
        None => report.push_str("\n  upstream timeout: none"),
    }
    report
}

fn format_duration(duration: Duration) -> String {
    let ms = duration.as_millis();
    if ms % 1000 == 0 {
        format!("{}s", ms / 1000)
    } else {
        format!("{ms}ms")
    }
}
