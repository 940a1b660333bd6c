// Memory samples: detailed JVM snapshots, coarse /proc readings, and the series they form

use chrono::{DateTime, Local};
use std::fmt;

/// One detailed measurement from JVM telemetry. Sizes in MB.
#[derive(Debug, Clone, PartialEq)]
pub struct MemorySnapshot {
    pub timestamp: DateTime<Local>,
    pub heap_used_mb: f64,
    pub heap_max_mb: f64,
    pub heap_committed_mb: f64,
    pub non_heap_used_mb: f64,
    pub gc_count: u64,
    pub gc_time_ms: u64,
    pub young_gc_count: u64,
    pub old_gc_count: u64,
}

impl MemorySnapshot {
    /// Heap used as a percentage of heap max; 0 when max is unknown.
    pub fn heap_percent(&self) -> f64 {
        if self.heap_max_mb > 0.0 {
            self.heap_used_mb / self.heap_max_mb * 100.0
        } else {
            0.0
        }
    }
}

/// Process-level memory from the kernel status file. Sizes in KB; a field is
/// absent when the status file had no such line.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessMemoryInfo {
    pub timestamp: DateTime<Local>,
    pub rss_kb: Option<u64>,
    pub vms_kb: Option<u64>,
    pub data_kb: Option<u64>,
    pub stack_kb: Option<u64>,
    pub peak_kb: Option<u64>,
}

impl ProcessMemoryInfo {
    pub fn rss_mb(&self) -> f64 {
        kb_to_mb(self.rss_kb)
    }

    pub fn vms_mb(&self) -> f64 {
        kb_to_mb(self.vms_kb)
    }

    pub fn data_mb(&self) -> f64 {
        kb_to_mb(self.data_kb)
    }

    pub fn peak_mb(&self) -> f64 {
        kb_to_mb(self.peak_kb)
    }
}

fn kb_to_mb(kb: Option<u64>) -> f64 {
    kb.unwrap_or(0) as f64 / 1024.0
}

/// Acquisition path a monitoring run is locked into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Generational heap and GC counters (jstat).
    Detailed,
    /// Resident/virtual size only (/proc).
    Coarse,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Detailed => f.write_str("detailed"),
            Mode::Coarse => f.write_str("coarse"),
        }
    }
}

/// What a source adapter hands back. The two shapes are never put on one numeric scale.
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    Detailed(MemorySnapshot),
    Coarse(ProcessMemoryInfo),
}

impl Sample {
    pub fn mode(&self) -> Mode {
        match self {
            Sample::Detailed(_) => Mode::Detailed,
            Sample::Coarse(_) => Mode::Coarse,
        }
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        match self {
            Sample::Detailed(s) => s.timestamp,
            Sample::Coarse(p) => p.timestamp,
        }
    }
}

/// Ordered samples of one monitoring run, all of the same mode.
#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    Detailed(Vec<MemorySnapshot>),
    Coarse(Vec<ProcessMemoryInfo>),
}

impl Series {
    pub fn new(mode: Mode) -> Self {
        match mode {
            Mode::Detailed => Series::Detailed(Vec::new()),
            Mode::Coarse => Series::Coarse(Vec::new()),
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Series::Detailed(_) => Mode::Detailed,
            Series::Coarse(_) => Mode::Coarse,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Series::Detailed(s) => s.len(),
            Series::Coarse(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends `sample` when it matches this series' mode; otherwise hands it back.
    pub fn push(&mut self, sample: Sample) -> Result<(), Sample> {
        match (self, sample) {
            (Series::Detailed(s), Sample::Detailed(snapshot)) => s.push(snapshot),
            (Series::Coarse(s), Sample::Coarse(info)) => s.push(info),
            (_, other) => return Err(other),
        }
        Ok(())
    }
}

/// Used size per heap region from a heap summary. Each region is independent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeapBreakdown {
    pub eden_used_kb: Option<u64>,
    pub survivor_used_kb: Option<u64>,
    pub tenured_used_kb: Option<u64>,
    pub metaspace_used_kb: Option<u64>,
}

impl HeapBreakdown {
    pub fn is_empty(&self) -> bool {
        self == &HeapBreakdown::default()
    }
}
