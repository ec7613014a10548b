//! Tracing subscriber setup
//!
//! The filter comes from `HOSTPRINT_LOG`, falling back to `RUST_LOG`, with
//! the usual `RUST_LOG` syntax (`debug`, `hostprint_engine::scan=trace`).
//! `HOSTPRINT_LOG_FORMAT=json` switches to one JSON object per event.
//!
//! ```bash
//! HOSTPRINT_LOG=debug hostprint scan --pretty
//! HOSTPRINT_LOG=hostprint_engine=debug HOSTPRINT_LOG_FORMAT=json hostprint scan
//! ```
//!
//! Nothing is installed when neither variable is set. Output always goes to
//! stderr so the report on stdout stays clean.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Tracing output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Flat text lines (default)
    Text,
    /// Newline-delimited JSON objects
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("HOSTPRINT_LOG_FORMAT").unwrap_or_default())
    }
}

fn build_filter() -> EnvFilter {
    match std::env::var("HOSTPRINT_LOG") {
        Ok(val) => EnvFilter::builder().parse_lossy(val),
        Err(_) => EnvFilter::from_default_env(),
    }
}

/// Install the global subscriber if logging was requested
pub fn init_tracing() {
    let requested = std::env::var("HOSTPRINT_LOG").is_ok() || std::env::var("RUST_LOG").is_ok();
    if !requested {
        return;
    }

    let filter = build_filter();
    match LogFormat::from_env() {
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
