// Append-only CSV output for monitoring runs.

use crate::models::{Mode, Sample};
use anyhow::Context;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Header line of detailed-mode output files.
pub const DETAILED_HEADER: [&str; 9] = [
    "timestamp",
    "heap_used_mb",
    "heap_max_mb",
    "heap_committed_mb",
    "non_heap_used_mb",
    "gc_count",
    "gc_time_ms",
    "young_gc_count",
    "old_gc_count",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

#[derive(Serialize)]
struct DetailedRow {
    timestamp: String,
    heap_used_mb: f64,
    heap_max_mb: f64,
    heap_committed_mb: f64,
    non_heap_used_mb: f64,
    gc_count: u64,
    gc_time_ms: u64,
    young_gc_count: u64,
    old_gc_count: u64,
}

#[derive(Serialize)]
struct CoarseRow {
    timestamp: String,
    rss_mb: f64,
    vms_mb: f64,
}

fn format_timestamp(ts: DateTime<Local>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Scoped handle over the output file: opened at loop entry, flushed after each row and on drop.
pub struct CsvSink {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl CsvSink {
    /// Opens `path` for appending; never truncates. The detailed header is
    /// written only into an empty file.
    pub fn open(path: &Path, mode: Mode) -> anyhow::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening output file {}", path.display()))?;
        let empty = file
            .metadata()
            .with_context(|| format!("reading metadata of {}", path.display()))?
            .len()
            == 0;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if empty && mode == Mode::Detailed {
            writer.write_record(DETAILED_HEADER)?;
            writer.flush()?;
        }
        Ok(Self {
            path: path.to_path_buf(),
            writer,
        })
    }

    pub fn append(&mut self, sample: &Sample) -> anyhow::Result<()> {
        match sample {
            Sample::Detailed(s) => self.writer.serialize(DetailedRow {
                timestamp: format_timestamp(s.timestamp),
                heap_used_mb: s.heap_used_mb,
                heap_max_mb: s.heap_max_mb,
                heap_committed_mb: s.heap_committed_mb,
                non_heap_used_mb: s.non_heap_used_mb,
                gc_count: s.gc_count,
                gc_time_ms: s.gc_time_ms,
                young_gc_count: s.young_gc_count,
                old_gc_count: s.old_gc_count,
            }),
            Sample::Coarse(p) => self.writer.serialize(CoarseRow {
                timestamp: format_timestamp(p.timestamp),
                rss_mb: p.rss_mb(),
                vms_mb: p.vms_mb(),
            }),
        }
        .with_context(|| format!("writing row to {}", self.path.display()))?;
        self.writer
            .flush()
            .with_context(|| format!("flushing {}", self.path.display()))
    }
}

impl Drop for CsvSink {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!(error = %e, path = %self.path.display(), "output flush failed");
        }
    }
}
