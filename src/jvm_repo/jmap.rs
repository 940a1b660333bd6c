// Parse `jmap -heap` output into per-region used sizes.

use crate::models::HeapBreakdown;
use regex::Regex;
use std::sync::LazyLock;

static USED_KB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"used (\d+)K").expect("static regex"));

/// Each region is matched on its own line; any subset may be present.
pub fn parse_heap_summary(summary: &str) -> HeapBreakdown {
    let mut heap = HeapBreakdown::default();
    for line in summary.lines() {
        let slot = if line.contains("Eden Space") {
            &mut heap.eden_used_kb
        } else if line.contains("Survivor Space") {
            &mut heap.survivor_used_kb
        } else if line.contains("Tenured Gen") || line.contains("Old Gen") {
            &mut heap.tenured_used_kb
        } else if line.contains("Metaspace") {
            &mut heap.metaspace_used_kb
        } else {
            continue;
        };
        if let Some(kb) = USED_KB
            .captures(line)
            .and_then(|c| c[1].parse::<u64>().ok())
        {
            *slot = Some(kb);
        }
    }
    heap
}
