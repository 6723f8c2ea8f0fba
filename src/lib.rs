//! rotary is a round-robin HTTP reverse-proxy load balancer.
//!
//! It receives incoming HTTP requests and forwards each one to the next
//! backend of a fixed list, streaming the request body out and the
//! backend's response back unchanged. An optional health monitor probes
//! every backend's `/ping` on an interval and records the outcome for
//! reporting; selection itself never skips a backend.
//!
//! # Architecture
//!
//! - [`balancer`] -- Backend registry, lock-free round-robin rotation, and
//!   the per-backend health table.
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, validate, status).
//! - [`config`] -- Balancer configuration and validation.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`monitor`] -- Background health probes.
//! - [`proxy`] -- Core HTTP forwarding: upstream request construction and
//!   streaming response relay.
//! - [`server`] -- Axum server setup, shared application state, HTTP client, and
//!   graceful shutdown.
//! - [`status`] -- Optional JSON status endpoint.

// Binary crate: public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod balancer;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod proxy;
pub mod server;
pub mod status;
