// GC log parsing and discovery.

use crate::models::{GcLogStats, HeapTransition};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static ELAPSED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+\.\d+)\]").expect("static regex"));
static TRANSITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)K->(\d+)K\((\d+)K\)").expect("static regex"));

/// Parses one GC log. A missing file yields empty stats; a read error keeps
/// whatever was counted before it.
pub fn parse_gc_log(path: &Path) -> GcLogStats {
    match File::open(path) {
        Ok(file) => {
            let mut stats = GcLogStats::default();
            if let Err(e) = scan_gc_lines(BufReader::new(file), &mut stats) {
                tracing::warn!(error = %e, path = %path.display(), operation = "parse_gc_log", "GC log read interrupted");
            }
            stats
        }
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(error = %e, path = %path.display(), operation = "parse_gc_log", "GC log unreadable");
            }
            GcLogStats::default()
        }
    }
}

/// Accumulates every line of `reader` into `stats`. Bytes that are not UTF-8 are replaced.
pub fn scan_gc_lines(mut reader: impl BufRead, stats: &mut GcLogStats) -> std::io::Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        scan_line(&String::from_utf8_lossy(&buf), stats);
    }
}

fn scan_line(line: &str, stats: &mut GcLogStats) {
    let lower = line.to_lowercase();
    if lower.contains("full gc") || lower.contains("pause full") {
        stats.full_gc_count += 1;
    }
    if lower.contains("concurrent mode failure") {
        stats.concurrent_mode_failures += 1;
    }
    if lower.contains("promotion failure") {
        stats.promotion_failures += 1;
    }
    if lower.contains("allocation failure") {
        stats.allocation_failures += 1;
    }
    if let Some(secs) = ELAPSED
        .captures(line)
        .and_then(|c| c[1].parse::<f64>().ok())
    {
        stats.gc_times.push(secs);
    }
    if let Some(caps) = TRANSITION.captures(line)
        && let (Ok(before_kb), Ok(after_kb), Ok(max_kb)) =
            (caps[1].parse::<u64>(), caps[2].parse::<u64>(), caps[3].parse::<u64>())
    {
        stats.heap_transitions.push(HeapTransition {
            before_kb,
            after_kb,
            max_kb,
        });
    }
}

/// Files named like GC logs (`gc` or `garbage`, any case) in each existing directory.
pub fn find_gc_logs(dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for dir in dirs {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(error = %e, dir = %dir.display(), "GC log directory skipped");
                continue;
            }
        };
        let mut logs: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .filter(|entry| {
                let name = entry.file_name().to_string_lossy().to_lowercase();
                name.contains("gc") || name.contains("garbage")
            })
            .map(|entry| entry.path())
            .collect();
        logs.sort();
        found.extend(logs);
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(text: &str) -> GcLogStats {
        let mut stats = GcLogStats::default();
        scan_gc_lines(text.as_bytes(), &mut stats).unwrap();
        stats
    }

    #[test]
    fn full_gc_counted_once_per_line() {
        let stats = scan("[Full GC (Ergonomics) Full GC]\n[gc] GC(12) Pause Full (System.gc()) 40M->12M(256M)\n");
        assert_eq!(stats.full_gc_count, 2);
    }

    #[test]
    fn one_line_can_hit_several_counters() {
        let stats = scan(
            "12.345: [Full GC (Allocation Failure) promotion failure concurrent mode failure]\n",
        );
        assert_eq!(stats.full_gc_count, 1);
        assert_eq!(stats.allocation_failures, 1);
        assert_eq!(stats.promotion_failures, 1);
        assert_eq!(stats.concurrent_mode_failures, 1);
    }

    #[test]
    fn first_time_marker_and_transition_per_line() {
        let stats = scan("[0.512] [1.024] GC 8192K->2048K(65536K) 4096K->1024K(65536K)\n");
        assert_eq!(stats.gc_times, vec![0.512]);
        assert_eq!(
            stats.heap_transitions,
            vec![HeapTransition {
                before_kb: 8192,
                after_kb: 2048,
                max_kb: 65536
            }]
        );
    }

    #[test]
    fn invalid_utf8_is_tolerated() {
        let mut stats = GcLogStats::default();
        let bytes: &[u8] = b"\xff\xfe Full GC\n";
        scan_gc_lines(bytes, &mut stats).unwrap();
        assert_eq!(stats.full_gc_count, 1);
    }
}
