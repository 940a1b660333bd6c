// JVM telemetry via the JDK tools (jstat, jmap)

mod jmap;
mod jstat;

pub use jmap::parse_heap_summary;
pub use jstat::parse_gc_report;

use crate::config::ToolsConfig;
use crate::fetch::{Fetch, Source};
use crate::models::{HeapBreakdown, MemorySnapshot, Sample};
use crate::monitor::Acquire;
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

pub struct JvmRepo<F> {
    fetcher: F,
    tools: ToolsConfig,
}

impl<F: Fetch> JvmRepo<F> {
    pub fn new(fetcher: F, tools: ToolsConfig) -> Self {
        Self { fetcher, tools }
    }

    /// Detailed snapshot from `jstat -gc`. None when jstat is missing, slow,
    /// fails, or prints something unexpected.
    #[instrument(skip(self), fields(repo = "jvm", operation = "gc_snapshot"))]
    pub async fn gc_snapshot(&self, pid: u32) -> Option<MemorySnapshot> {
        let source = Source::command(
            &self.tools.jstat_path,
            ["-gc".to_string(), pid.to_string()],
            self.tools.jstat_timeout(),
        );
        let report = match self.fetcher.fetch(&source).await {
            Ok(r) => r,
            Err(e) => {
                debug!(error = %e, "jstat unavailable");
                return None;
            }
        };
        let snapshot = parse_gc_report(&report, Local::now());
        if snapshot.is_none() {
            debug!(lines = report.lines().count(), "jstat report missing heap columns");
        }
        snapshot
    }

    /// Per-region heap usage from `jmap -heap`.
    #[instrument(skip(self), fields(repo = "jvm", operation = "heap_breakdown"))]
    pub async fn heap_breakdown(&self, pid: u32) -> Option<HeapBreakdown> {
        let source = Source::command(
            &self.tools.jmap_path,
            ["-heap".to_string(), pid.to_string()],
            self.tools.jmap_timeout(),
        );
        match self.fetcher.fetch(&source).await {
            Ok(summary) => Some(parse_heap_summary(&summary)),
            Err(e) => {
                debug!(error = %e, "jmap heap summary unavailable");
                None
            }
        }
    }

    /// Writes a binary heap dump into `dir` and returns its path.
    #[instrument(skip(self), fields(repo = "jvm", operation = "heap_dump"))]
    pub async fn heap_dump(&self, pid: u32, dir: &Path) -> Option<PathBuf> {
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            warn!(error = %e, dir = %dir.display(), "cannot create heap dump directory");
            return None;
        }
        let file = dir.join(format!("heap_dump_{}.hprof", chrono::Utc::now().timestamp()));
        let source = Source::command(
            &self.tools.jmap_path,
            [
                format!("-dump:format=b,file={}", file.display()),
                pid.to_string(),
            ],
            self.tools.heap_dump_timeout(),
        );
        match self.fetcher.fetch(&source).await {
            Ok(_) => Some(file),
            Err(e) => {
                warn!(error = %e, "heap dump failed");
                None
            }
        }
    }
}

impl<F: Fetch> Acquire for JvmRepo<F> {
    async fn acquire(&self, pid: u32) -> Option<Sample> {
        self.gc_snapshot(pid).await.map(Sample::Detailed)
    }
}
