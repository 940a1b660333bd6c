// Parse `jstat -gc` output: one header row, one value row, sizes in KB.

use crate::models::MemorySnapshot;
use chrono::{DateTime, Local};
use std::collections::HashMap;

/// Builds a snapshot from a `jstat -gc` report. Returns None when the report
/// is shorter than two rows or any heap column is missing.
pub fn parse_gc_report(report: &str, timestamp: DateTime<Local>) -> Option<MemorySnapshot> {
    let mut rows = report.lines().filter(|l| !l.trim().is_empty());
    let headers = rows.next()?.split_whitespace();
    let values = rows.next()?.split_whitespace();

    // Columns jstat cannot fill are printed as "-" and simply drop out here.
    let columns: HashMap<&str, f64> = headers
        .zip(values)
        .filter_map(|(h, v)| v.parse::<f64>().ok().map(|v| (h, v)))
        .collect();
    let col = |name: &str| columns.get(name).copied();

    let used_kb = col("S0U")? + col("S1U")? + col("EU")? + col("OU")?;
    let capacity_kb = col("S0C")? + col("S1C")? + col("EC")? + col("OC")?;
    // Metaspace on JDK 8+, permanent generation before that.
    let non_heap_kb = col("MU").or_else(|| col("PU")).unwrap_or(0.0);

    let young_gc_count = col("YGC").unwrap_or(0.0) as u64;
    let old_gc_count = col("FGC").unwrap_or(0.0) as u64;
    let gc_time_ms = (col("GCT").unwrap_or(0.0) * 1000.0).round() as u64;

    Some(MemorySnapshot {
        timestamp,
        heap_used_mb: used_kb / 1024.0,
        heap_max_mb: capacity_kb / 1024.0,
        heap_committed_mb: capacity_kb / 1024.0,
        non_heap_used_mb: non_heap_kb / 1024.0,
        gc_count: young_gc_count + old_gc_count,
        gc_time_ms,
        young_gc_count,
        old_gc_count,
    })
}
