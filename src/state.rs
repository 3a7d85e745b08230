use crate::config::AppConfig;
use portable_atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// ── Shared server state ──
// The engine itself is stateless; only the HTTP layer holds anything.

pub struct AppState {
    pub config: AppConfig,
    pub counters: RequestCounters,
}

impl AppState {
    pub fn new(config: AppConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            counters: RequestCounters::default(),
        })
    }
}

/// Lock-free request counters
#[derive(Debug, Default)]
pub struct RequestCounters {
    pub tool_calls: AtomicU64,
    pub tool_calls_rejected: AtomicU64,
    pub catalog_reads: AtomicU64,
}

impl RequestCounters {
    #[inline]
    pub fn record_call(&self, ok: bool) {
        self.tool_calls.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.tool_calls_rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            tool_calls: self.tool_calls.load(Ordering::Relaxed),
            tool_calls_rejected: self.tool_calls_rejected.load(Ordering::Relaxed),
            catalog_reads: self.catalog_reads.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CounterSnapshot {
    pub tool_calls: u64,
    pub tool_calls_rejected: u64,
    pub catalog_reads: u64,
}

#[cfg(test)]
pub fn create_test_state() -> Arc<AppState> {
    AppState::new(AppConfig {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
    })
}
