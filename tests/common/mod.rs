//! Shared helpers: throwaway axum backends and a balancer on an ephemeral port.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use rotary::balancer::LoadBalancer;
use rotary::server::{self, AppState};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

pub async fn spawn_backend(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Backend answering every path with a fixed status and body.
pub async fn text_backend(status: StatusCode, body: &'static str) -> SocketAddr {
    spawn_backend(Router::new().fallback(move || async move { (status, body) })).await
}

/// Backend whose `/ping` answers `status`.
pub async fn ping_backend(status: StatusCode) -> SocketAddr {
    spawn_backend(Router::new().route("/ping", get(move || async move { (status, "pong") })))
        .await
}

/// Raw HTTP/1.1 backend that advertises `advertised` body bytes, sends
/// `sent`, then closes the connection.
pub async fn truncated_backend(advertised: usize, sent: &'static [u8]) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }
                let status = format!("HTTP/1.1 200 OK\r\ncontent-length: {advertised}\r\n\r\n");
                let _ = stream.write_all(status.as_bytes()).await;
                let _ = stream.write_all(sent).await;
                let _ = stream.shutdown().await;
            });
        }
    });
    addr
}

/// Base URL of a port nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    url(addr)
}

pub fn url(addr: SocketAddr) -> String {
    format!("http://{addr}")
}

pub struct Balancer {
    pub addr: SocketAddr,
    pub balancer: Arc<LoadBalancer>,
    pub shutdown: tokio::sync::oneshot::Sender<()>,
}

impl Balancer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}

pub async fn start_balancer(backends: &[String]) -> Balancer {
    let balancer = Arc::new(LoadBalancer::new(backends, false).unwrap());
    let state = AppState::new(Arc::clone(&balancer), server::build_http_client());
    start_with_state(state, None).await
}

pub async fn start_with_state(state: AppState, status_path: Option<&str>) -> Balancer {
    let balancer = Arc::clone(&state.balancer);
    let router = server::build_router(Arc::new(state), status_path);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    Balancer {
        addr,
        balancer,
        shutdown,
    }
}
