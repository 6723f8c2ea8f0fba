//! Core HTTP request forwarding handler.
//!
//! [`forward_handler`] is the Axum fallback that receives every inbound
//! request. It asks the [`LoadBalancer`](crate::balancer::LoadBalancer)
//! for the next backend exactly once, rebuilds the request against that
//! backend with the body still streaming, and relays the backend's
//! status, headers, and body back through a [`RelayBody`].
//!
//! Failures never fall back to another backend: a request that cannot be
//! built answers 500, a backend that cannot be reached answers 503.

pub mod relay;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::balancer::Backend;
use crate::server::AppState;

pub use relay::RelayBody;

/// Body sent to the caller when the backend could not be reached.
pub const UNAVAILABLE_MESSAGE: &str = "backend unavailable";

const CORRELATION_HEADER: &str = "x-correlation-id";

pub async fn forward_handler(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
) -> Response {
    let request_id = request
        .headers()
        .get(CORRELATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let backend = state.balancer.next_backend();

    let upstream = match build_upstream_request(backend, request) {
        Ok(upstream) => upstream,
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                method = %method,
                path = %path,
                backend = %backend,
                error = %e,
                "failed to build upstream request"
            );
            state.stats.failed.fetch_add(1, Ordering::Relaxed);
            return construction_failure(&e);
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        backend = %backend,
        "forwarding request"
    );

    let start = Instant::now();
    let pending = state.http_client.request(upstream);
    let outcome = match state.upstream_timeout {
        Some(limit) => match tokio::time::timeout(limit, pending).await {
            Ok(result) => result.map_err(|e| error_chain(&e)),
            Err(_) => Err(format!("timed out after {}ms", limit.as_millis())),
        },
        None => pending.await.map_err(|e| error_chain(&e)),
    };
    #[allow(clippy::cast_possible_truncation)]
    let latency_ms = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(response) => {
            state.stats.forwarded.fetch_add(1, Ordering::Relaxed);
            tracing::info!(
                request_id = %request_id,
                method = %method,
                path = %path,
                backend = %backend,
                status = response.status().as_u16(),
                latency_ms,
                "backend responded"
            );
            // Parts carry the backend's status and every header field; the
            // body streams through as the caller reads it.
            let (parts, body) = response.into_parts();
            let relay = RelayBody::new(Body::new(body), backend.to_string(), request_id);
            Response::from_parts(parts, Body::new(relay))
        }
        Err(error) => {
            state.stats.failed.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                request_id = %request_id,
                method = %method,
                path = %path,
                backend = %backend,
                latency_ms,
                error = %error,
                "backend unavailable"
            );
            (StatusCode::SERVICE_UNAVAILABLE, UNAVAILABLE_MESSAGE).into_response()
        }
    }
}

/// Rebuild `request` against `backend`: same method, path and query
/// appended to the backend base address, every header field except `Host`,
/// and the original body, still unread.
///
/// `Host` is left for the client to derive from the target URI so the
/// backend sees its own authority.
pub fn build_upstream_request(
    backend: &Backend,
    request: Request<Body>,
) -> Result<Request<Body>, axum::http::Error> {
    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map_or("/", axum::http::uri::PathAndQuery::as_str);
    let uri: Uri = backend.endpoint(path_and_query).parse()?;

    let mut builder = Request::builder().method(parts.method).uri(uri);
    if let Some(headers) = builder.headers_mut() {
        *headers = parts.headers;
        headers.remove(header::HOST);
    }
    builder.body(body)
}

fn construction_failure(error: &axum::http::Error) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("failed to build upstream request: {error}"),
    )
        .into_response()
}

/// Render an error with its whole `source()` chain, `outer: inner: ...`.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
