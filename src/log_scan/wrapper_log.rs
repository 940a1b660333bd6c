// Service wrapper log: recent memory warnings and out-of-memory events.

use crate::models::WrapperLogReport;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

const TAIL: usize = 5;
const MAX_LINE_CHARS: usize = 100;

/// Scans the first candidate that exists and can be read.
pub fn scan_wrapper_log(candidates: &[PathBuf]) -> Option<WrapperLogReport> {
    candidates.iter().find_map(|path| match std::fs::read(path) {
        Ok(bytes) => Some(classify(path, &String::from_utf8_lossy(&bytes))),
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(error = %e, path = %path.display(), operation = "scan_wrapper_log", "wrapper log unreadable");
            }
            None
        }
    })
}

fn classify(path: &Path, content: &str) -> WrapperLogReport {
    let mut warnings = VecDeque::with_capacity(TAIL);
    let mut oom_events = VecDeque::with_capacity(TAIL);
    for line in content.lines() {
        if line.contains("OutOfMemory") {
            keep_last(&mut oom_events, line);
        }
        let lower = line.to_lowercase();
        if lower.contains("memory") && (lower.contains("warning") || lower.contains("error")) {
            keep_last(&mut warnings, line);
        }
    }
    WrapperLogReport {
        log_path: path.to_path_buf(),
        warnings: warnings.into(),
        oom_events: oom_events.into(),
    }
}

fn keep_last(tail: &mut VecDeque<String>, line: &str) {
    if tail.len() == TAIL {
        tail.pop_front();
    }
    tail.push_back(line.trim().chars().take(MAX_LINE_CHARS).collect());
}
