//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (run, validate, status), and their associated argument
//! structs. Every flag has an environment variable equivalent for
//! container deployments.

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "rotary",
    version,
    about = "Round-robin HTTP reverse-proxy load balancer",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        rotary run -b http://localhost:8081,http://localhost:8082\n  \
        rotary validate -b http://localhost:8081\n  \
        TARGET_SERVERS=http://a:80,http://b:80 rotary run --health-check\n\n\
        \x1b[1mEnvironment:\x1b[0m\n  \
        TARGET_SERVERS, HEALTHCHECKS_ENABLED and PORT replace GOLB_TARGET_SERVERS,\n  \
        GOLB_HEALTHCHECKS_ENABLED and GOLB_PORT; rename them when migrating."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the load balancer
    Run(Box<RunArgs>),

    /// Validate a backend list without starting
    Validate(ValidateArgs),

    /// Show the status of a running instance
    Status(StatusArgs),
}

/// Backend registry and health-check settings shared by `run` and `validate`.
#[derive(Args, Clone, Debug)]
pub struct BackendArgs {
    /// Backend base URLs, in rotation order (comma-separated)
    #[arg(
        short,
        long,
        env = "TARGET_SERVERS",
        value_delimiter = ',',
        num_args = 1..,
        required = true
    )]
    pub backends: Vec<String>,

    /// Probe every backend's /ping on an interval
    #[arg(
        long,
        env = "HEALTHCHECKS_ENABLED",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        default_value_t = false,
        num_args = 0..=1,
        default_missing_value = "true",
        help_heading = "Health Checks"
    )]
    pub health_check: bool,

    /// Interval between probe rounds in milliseconds
    #[arg(
        long,
        env = "HEALTHCHECK_INTERVAL_MS",
        default_value_t = 10_000,
        help_heading = "Health Checks"
    )]
    pub health_interval_ms: u64,

    /// Timeout for a single probe in milliseconds
    #[arg(
        long,
        env = "HEALTHCHECK_TIMEOUT_MS",
        default_value_t = 5_000,
        help_heading = "Health Checks"
    )]
    pub probe_timeout_ms: u64,

    /// Timeout for a forwarded request in milliseconds (unset: wait indefinitely)
    #[arg(long, env = "UPSTREAM_TIMEOUT_MS", help_heading = "Tuning")]
    pub upstream_timeout_ms: Option<u64>,
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        rotary run -b http://localhost:8081,http://localhost:8082          Two backends\n  \
        rotary run -b http://localhost:8081 --health-check -p 9000         With probes\n  \
        rotary run -b http://localhost:8081 --status-path /__rotary         Status endpoint")]
pub struct RunArgs {
    #[command(flatten)]
    pub backends: BackendArgs,

    /// Listen port
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Listen address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Serve load balancer status as JSON on this path instead of forwarding it
    #[arg(long, env = "STATUS_PATH")]
    pub status_path: Option<String>,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub backends: BackendArgs,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ValidateFormat,
}

#[derive(Args)]
pub struct StatusArgs {
    /// URL of the running instance
    #[arg(default_value = "http://localhost:8080")]
    pub url: String,

    /// Status path configured on the instance
    #[arg(long, env = "STATUS_PATH", default_value = "/__rotary/status")]
    pub status_path: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ValidateFormat {
    Text,
    Json,
}
