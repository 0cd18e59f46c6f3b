// SPDX-License-Identifier: MIT OR Apache-2.0
//! Diagnostic output from nodes.

/// Severity of a node message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Verbose diagnostics
    Debug,
    /// Normal output
    Info,
    /// Something looks wrong
    Warn,
    /// Something failed
    Error,
}

/// Fire-and-forget sink for node messages.
///
/// The host decides where messages go; nodes never learn whether a
/// message was delivered.
pub trait LogSink {
    /// Record a message from the node tagged `source`
    fn log(&self, level: LogLevel, source: &str, message: &str);
}

/// Sink that forwards to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, source: &str, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!(node = source, "{message}"),
            LogLevel::Info => tracing::info!(node = source, "{message}"),
            LogLevel::Warn => tracing::warn!(node = source, "{message}"),
            LogLevel::Error => tracing::error!(node = source, "{message}"),
        }
    }
}
