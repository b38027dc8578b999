use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Counters shared by the stages of one search run
#[derive(Debug, Clone, Default)]
pub struct SearchMetrics {
    files_attempted: Arc<AtomicU64>,
    files_parsed: Arc<AtomicU64>,
    parse_failures: Arc<AtomicU64>,
    matches_emitted: Arc<AtomicU64>,
}

/// Point-in-time copy of [`SearchMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub files_attempted: u64,
    pub files_parsed: u64,
    pub parse_failures: u64,
    pub matches: u64,
}

impl SearchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_attempt(&self) {
        self.files_attempted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parsed(&self) {
        self.files_parsed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parse_failure(&self) {
        self.parse_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_matches(&self, count: u64) {
        self.matches_emitted.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SearchStats {
        SearchStats {
            files_attempted: self.files_attempted.load(Ordering::Relaxed),
            files_parsed: self.files_parsed.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
            matches: self.matches_emitted.load(Ordering::Relaxed),
        }
    }

    /// Logs current statistics
    pub fn log_stats(&self) {
        let stats = self.snapshot();
        info!(
            "Search stats: {} files attempted, {} parsed, {} failed, {} matches",
            stats.files_attempted, stats.files_parsed, stats.parse_failures, stats.matches
        );
    }
}
