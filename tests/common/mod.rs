// Shared test helpers: scripted fetcher, fake adapters, report fixtures

#![allow(dead_code)]

use chrono::{Duration as ChronoDuration, Local};
use memwatch::fetch::{Fetch, Source, Unavailable};
use memwatch::models::{MemorySnapshot, ProcessMemoryInfo, Sample};
use memwatch::monitor::Acquire;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;

/// Answers each source (keyed by its display form) from a script. The last
/// scripted answer repeats; an unscripted source is `Missing`.
#[derive(Default)]
pub struct FakeFetcher {
    script: RefCell<HashMap<String, VecDeque<Option<String>>>>,
    calls: RefCell<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, key: impl Into<String>, body: impl Into<String>) -> Self {
        self.push(key.into(), Some(body.into()));
        self
    }

    /// Scripts a non-zero exit / transport failure.
    pub fn fail(self, key: impl Into<String>) -> Self {
        self.push(key.into(), None);
        self
    }

    fn push(&self, key: String, answer: Option<String>) {
        self.script
            .borrow_mut()
            .entry(key)
            .or_default()
            .push_back(answer);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, key: &str) -> usize {
        self.calls.borrow().iter().filter(|c| *c == key).count()
    }
}

impl Fetch for FakeFetcher {
    async fn fetch(&self, source: &Source) -> Result<String, Unavailable> {
        let key = source.to_string();
        self.calls.borrow_mut().push(key.clone());
        let mut script = self.script.borrow_mut();
        let Some(queue) = script.get_mut(&key) else {
            return Err(Unavailable::Missing(PathBuf::from(key)));
        };
        let answer = if queue.len() > 1 {
            queue.pop_front().flatten()
        } else {
            queue.front().cloned().flatten()
        };
        answer.ok_or(Unavailable::Failed {
            program: key,
            status: "exit status: 1".into(),
        })
    }
}

/// Adapter that hands out a fixed sequence of samples, then None.
pub struct ScriptedSource {
    samples: RefCell<VecDeque<Option<Sample>>>,
}

impl ScriptedSource {
    pub fn new(samples: impl IntoIterator<Item = Option<Sample>>) -> Self {
        Self {
            samples: RefCell::new(samples.into_iter().collect()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.samples.borrow().len()
    }
}

impl Acquire for ScriptedSource {
    async fn acquire(&self, _pid: u32) -> Option<Sample> {
        self.samples.borrow_mut().pop_front().flatten()
    }
}

/// `jstat -gc` output for a 256 MB heap with `heap_used_mb` in the old generation.
pub fn jstat_report(heap_used_mb: f64, ygc: u64, fgc: u64, gct_secs: f64) -> String {
    format!(
        " S0C    S1C    S0U    S1U      EC       EU        OC         OU       MC     MU    CCSC   CCSU   YGC     YGCT    FGC    FGCT     CGC    CGCT     GCT\n\
         1024.0 1024.0  0.0    0.0   30720.0   0.0     229376.0   {ou:.1}  21504.0 20480.0 2560.0 2304.0 {ygc}  0.100  {fgc}  0.050  0  0.000  {gct:.3}\n",
        ou = heap_used_mb * 1024.0,
        ygc = ygc,
        fgc = fgc,
        gct = gct_secs,
    )
}

/// Kernel status file with the given resident and virtual sizes.
pub fn proc_status(rss_kb: u64, vms_kb: u64) -> String {
    format!(
        "Name:\tjava\nState:\tS (sleeping)\nVmPeak:\t{peak} kB\nVmSize:\t{vms_kb} kB\nVmRSS:\t{rss_kb} kB\nVmData:\t{data} kB\nVmStk:\t132 kB\nThreads:\t88\n",
        peak = vms_kb + 1024,
        data = rss_kb / 2,
    )
}

pub fn snapshot(minutes_ago: i64, heap_used_mb: f64, gc_count: u64, old_gc_count: u64) -> MemorySnapshot {
    MemorySnapshot {
        timestamp: Local::now() - ChronoDuration::minutes(minutes_ago),
        heap_used_mb,
        heap_max_mb: 256.0,
        heap_committed_mb: 256.0,
        non_heap_used_mb: 20.0,
        gc_count,
        gc_time_ms: gc_count * 10,
        young_gc_count: gc_count - old_gc_count,
        old_gc_count,
    }
}

pub fn process_info(rss_kb: u64) -> ProcessMemoryInfo {
    ProcessMemoryInfo {
        timestamp: Local::now(),
        rss_kb: Some(rss_kb),
        vms_kb: Some(rss_kb * 4),
        data_kb: None,
        stack_kb: None,
        peak_kb: None,
    }
}

pub fn detailed(heap_used_mb: f64) -> Option<Sample> {
    Some(Sample::Detailed(snapshot(0, heap_used_mb, 10, 0)))
}

pub fn coarse(rss_kb: u64) -> Option<Sample> {
    Some(Sample::Coarse(process_info(rss_kb)))
}
