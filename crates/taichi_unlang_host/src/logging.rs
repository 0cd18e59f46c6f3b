// SPDX-License-Identifier: MIT OR Apache-2.0
//! `tracing` subscriber bootstrap.

use crate::error::HostError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Parse filter directives such as `"info,taichi_unlang=trace"`
pub fn build_filter(directives: &str) -> Result<EnvFilter, HostError> {
    EnvFilter::try_new(directives).map_err(|e| HostError::Logging(e.to_string()))
}

/// Install the global subscriber. `RUST_LOG` wins over `directives` when set.
pub fn init(directives: &str) -> Result<(), HostError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_filter(directives)?,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| HostError::Logging(e.to_string()))
}
