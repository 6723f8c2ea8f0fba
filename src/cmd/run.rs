//! `rotary run`: start the load balancer.
//!
//! Validates the backend list, builds the [`LoadBalancer`], spawns the
//! health monitor when enabled, and serves every inbound request through
//! the forwarding handler until SIGTERM / Ctrl+C.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::balancer::LoadBalancer;
use crate::cli::RunArgs;
use crate::config::{validation, BalancerConfig};
use crate::error::{RotaryError, ValidationError};
use crate::logging;
use crate::server::{self, AppState};

pub async fn execute(args: RunArgs) -> Result<(), RotaryError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let config = BalancerConfig::from(&args.backends);
    check(&config, args.status_path.as_deref())?;

    let balancer = Arc::new(LoadBalancer::new(
        config.backends.as_slice(),
        config.health_check.enabled,
    )?);
    let http_client = server::build_http_client();

    // Shutdown signal: flipping the watch stops the health monitor
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let monitor_handle = balancer
        .health_monitor(
            http_client.clone(),
            config.health_check.interval,
            config.health_check.timeout,
        )
        .map(|monitor| monitor.spawn(shutdown_rx));

    let state = Arc::new(
        AppState::new(Arc::clone(&balancer), http_client)
            .with_upstream_timeout(config.upstream_timeout),
    );
    let router = server::build_router(state, args.status_path.as_deref());

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        backends = balancer.backends().len(),
        health_checks = config.health_check.enabled,
        status_path = args.status_path.as_deref().unwrap_or("-"),
        "rotary started"
    );

    let graceful_shutdown = async move {
        server::shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(graceful_shutdown)
        .await?;

    if let Some(handle) = monitor_handle {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "health monitor task failed");
        }
    }

    tracing::info!("rotary stopped");
    Ok(())
}

fn check(config: &BalancerConfig, status_path: Option<&str>) -> Result<(), RotaryError> {
    let mut errors = validation::validate(config).err().unwrap_or_default();

    if let Some(Err(message)) = status_path.map(validation::validate_status_path) {
        errors.push(ValidationError {
            field: "status_path".into(),
            message,
            suggestion: None,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(RotaryError::ConfigValidation { errors })
    }
}
