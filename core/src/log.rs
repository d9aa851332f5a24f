//! Per-client logging side channel.
//!
//! # Design
//! Each `RpcClient` owns its logger, so enabling debug output on one client
//! never changes what another client prints. Trace lines describe the stages
//! of a call and are only emitted when the logger is enabled; error lines are
//! always emitted. Nothing returned by the client depends on the logger.

use std::sync::Arc;

use parking_lot::Mutex;

/// Label attached to every line the client writes.
pub const CLIENT_LABEL: &str = "typed-rpc";

pub trait RpcLogger: Send + Sync {
    fn trace(&self, message: &str);
    fn error(&self, message: &str);
}

/// Logger backed by `tracing` events.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    enabled: bool,
}

impl TracingLogger {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl RpcLogger for TracingLogger {
    fn trace(&self, message: &str) {
        if self.enabled {
            tracing::trace!(client = CLIENT_LABEL, "{message}");
        }
    }

    fn error(&self, message: &str) {
        tracing::error!(client = CLIENT_LABEL, "{message}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: LogLevel,
    pub message: String,
}

/// Logger that keeps lines in memory. Clones share one buffer, so a test can
/// hand a clone to the client and inspect the original afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogger {
    enabled: bool,
    lines: Arc<Mutex<Vec<LogLine>>>,
}

impl MemoryLogger {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            lines: Arc::default(),
        }
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|line| line.level == LogLevel::Error)
            .map(|line| line.message.clone())
            .collect()
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.lines.lock().push(LogLine {
            level,
            message: message.to_string(),
        });
    }
}

impl RpcLogger for MemoryLogger {
    fn trace(&self, message: &str) {
        if self.enabled {
            self.push(LogLevel::Trace, message);
        }
    }

    fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }
}
