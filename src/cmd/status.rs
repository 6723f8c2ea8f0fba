//! `rotary status`: show the status of a running instance.
//!
//! Sends a `GET` to the instance's status path and displays the response
//! as a backend table or raw JSON.

use http_body_util::BodyExt;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::cli::StatusArgs;
use crate::error::RotaryError;
use crate::status::StatusResponse;

pub async fn execute(args: StatusArgs) -> Result<(), RotaryError> {
    let url = format!(
        "{}/{}",
        args.url.trim_end_matches('/'),
        args.status_path.trim_start_matches('/')
    );
    let uri: hyper::Uri =
        url.parse().map_err(
            |e: hyper::http::uri::InvalidUri| RotaryError::UriParse {
                source: Box::new(e),
            },
        )?;

    let connector = hyper_util::client::legacy::connect::HttpConnector::new();
    let client = Client::builder(TokioExecutor::new()).build(connector);

    let req = hyper::Request::builder()
        .uri(uri)
        .body(http_body_util::Full::new(bytes::Bytes::new()))
        .map_err(|e| RotaryError::HttpRequest {
            source: Box::new(e),
        })?;

    let response = tokio::time::timeout(std::time::Duration::from_secs(10), client.request(req))
        .await
        .map_err(|_| RotaryError::HttpRequest {
            source: "status request timed out after 10s".into(),
        })?
        .map_err(|e| RotaryError::HttpRequest {
            source: Box::new(e),
        })?;

    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .map_err(|e| RotaryError::HttpRequest {
            source: Box::new(e),
        })?
        .to_bytes();

    if !status.is_success() {
        return Err(RotaryError::StatusCheckFailed(status));
    }

    if args.json {
        println!("{}", String::from_utf8_lossy(&body));
        return Ok(());
    }

    match serde_json::from_slice::<StatusResponse>(&body) {
        Ok(report) => print!("{}", render(&args.url, &report)),
        Err(e) => {
            eprintln!("Failed to parse status response: {e}");
            println!("{}", String::from_utf8_lossy(&body));
        }
    }

    Ok(())
}

fn render(url: &str, report: &StatusResponse) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "\u{2713} rotary v{} is {} ({url})", report.version, report.status);
    let _ = writeln!(out, "  uptime:         {}", format_uptime(report.uptime_seconds));
    let _ = writeln!(
        out,
        "  health checks:  {}",
        if report.health_checks_enabled { "enabled" } else { "disabled" }
    );
    let _ = writeln!(
        out,
        "  requests:       {} forwarded, {} failed",
        report.stats.requests_forwarded, report.stats.requests_failed
    );
    let _ = writeln!(out, "  backends:");
    for backend in &report.backends {
        let _ = writeln!(out, "    [{}] {:<10} {}", backend.id, backend.health, backend.url);
    }
    out
}

fn format_uptime(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balancer::HealthState;
    use crate::status::{BackendStatus, StatsResponse};

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(42), "42s");
        assert_eq!(format_uptime(125), "2m 5s");
        assert_eq!(format_uptime(3_725), "1h 2m 5s");
    }

    #[test]
    fn render_lists_backend_health() {
        let report = StatusResponse {
            status: "running".into(),
            version: "0.1.0".into(),
            uptime_seconds: 61,
            health_checks_enabled: true,
            backends: vec![
                BackendStatus {
                    id: 0,
                    url: "http://a:1".into(),
                    health: HealthState::Healthy,
                },
                BackendStatus {
                    id: 1,
                    url: "http://b:2".into(),
                    health: HealthState::Unknown,
                },
            ],
            stats: StatsResponse {
                requests_forwarded: 10,
                requests_failed: 1,
            },
        };
        let text = render("http://lb:8080", &report);
        assert!(text.contains("rotary v0.1.0 is running (http://lb:8080)"));
        assert!(text.contains("uptime:         1m 1s"));
        assert!(text.contains("10 forwarded, 1 failed"));
        assert!(text.contains("[0] healthy    http://a:1"));
        assert!(text.contains("[1] unknown    http://b:2"));
    }
}
