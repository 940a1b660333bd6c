// Findings from GC logs and the service wrapper log

use std::path::PathBuf;

/// One `<before>K-><after>K(<max>K)` heap transition from a GC log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapTransition {
    pub before_kb: u64,
    pub after_kb: u64,
    pub max_kb: u64,
}

/// Aggregate over one GC log file, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GcLogStats {
    pub full_gc_count: u64,
    pub concurrent_mode_failures: u64,
    pub promotion_failures: u64,
    pub allocation_failures: u64,
    /// Elapsed-time markers (seconds since JVM start).
    pub gc_times: Vec<f64>,
    pub heap_transitions: Vec<HeapTransition>,
}

impl GcLogStats {
    /// More full collections than `threshold` suggests sustained heap pressure.
    pub fn has_full_gc_pressure(&self, threshold: u64) -> bool {
        self.full_gc_count > threshold
    }
}

/// Memory-related lines from the wrapper log (most recent last, at most five each).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperLogReport {
    pub log_path: PathBuf,
    pub warnings: Vec<String>,
    pub oom_events: Vec<String>,
}

impl WrapperLogReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.oom_events.is_empty()
    }
}
