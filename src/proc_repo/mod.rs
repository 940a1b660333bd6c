// Process-level memory from the kernel status file, and target discovery

mod discovery;
mod status;

pub use discovery::{Candidate, select_target};
pub use status::parse_status;

use crate::config::DiscoveryConfig;
use crate::fetch::{Fetch, Source};
use crate::models::{ProcessMemoryInfo, Sample};
use crate::monitor::Acquire;
use anyhow::Context;
use chrono::Local;
use regex::Regex;
use std::path::PathBuf;
use tracing::{debug, instrument};

pub struct ProcRepo<F> {
    fetcher: F,
    proc_root: PathBuf,
}

impl<F: Fetch> ProcRepo<F> {
    pub fn new(fetcher: F, proc_root: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            proc_root: proc_root.into(),
        }
    }

    /// Reads `<proc_root>/<pid>/status`. None when the process is gone or the file is unreadable.
    #[instrument(skip(self), fields(repo = "proc", operation = "memory_info"))]
    pub async fn memory_info(&self, pid: u32) -> Option<ProcessMemoryInfo> {
        let path = self.proc_root.join(pid.to_string()).join("status");
        match self.fetcher.fetch(&Source::file(path)).await {
            Ok(content) => Some(parse_status(&content, Local::now())),
            Err(e) => {
                debug!(error = %e, "status file unreadable");
                None
            }
        }
    }
}

impl<F: Fetch> Acquire for ProcRepo<F> {
    async fn acquire(&self, pid: u32) -> Option<Sample> {
        self.memory_info(pid).await.map(Sample::Coarse)
    }
}

/// Scans the process table for the monitored router.
#[instrument(skip(config), fields(repo = "proc", operation = "find_target_process"))]
pub async fn find_target_process(config: &DiscoveryConfig) -> anyhow::Result<Option<u32>> {
    let patterns = config
        .patterns
        .iter()
        .map(|p| Regex::new(p).with_context(|| format!("invalid discovery pattern {:?}", p)))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let candidates = tokio::task::spawn_blocking(discovery::process_table)
        .await
        .map_err(|e| anyhow::anyhow!("process table task join: {}", e))?;
    let pid = select_target(&candidates, &patterns, &config.markers);
    debug!(candidates = candidates.len(), ?pid, "process table scanned");
    Ok(pid)
}
