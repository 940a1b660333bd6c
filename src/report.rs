// Human-readable report sections written to the operator's terminal.

use crate::diagnose::{Diagnosis, Recommendation};
use crate::models::{
    ConsoleMemory, GcLogStats, HeapBreakdown, MemorySnapshot, Mode, ProcessMemoryInfo, Sample,
    WrapperLogReport,
};
use crate::trend::{Classification, TrendReport};
use chrono::Local;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

const RULE: &str =
    "======================================================================";

fn clock() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

fn or_na(value: Option<u64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

pub fn write_fallback_notice(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "jstat unavailable - using /proc fallback (RSS memory only)")
}

pub fn write_monitor_header(
    out: &mut impl Write,
    mode: Mode,
    pid: u32,
    interval: Duration,
    count: u32,
) -> io::Result<()> {
    let secs = interval.as_secs();
    match mode {
        Mode::Detailed => {
            writeln!(out, "Monitoring PID {pid} every {secs}s for {count} iterations...")?;
            writeln!(
                out,
                "{:<12} {:<12} {:<12} {:<10} {:<10} {:<10}",
                "Time", "Heap Used", "Heap Max", "Heap %", "GC Count", "GC Time"
            )?;
            writeln!(out, "{}", "-".repeat(70))
        }
        Mode::Coarse => {
            writeln!(
                out,
                "Monitoring PID {pid} every {secs}s for {count} iterations (RSS only)..."
            )?;
            writeln!(out, "{:<12} {:<15} {:<15}", "Time", "RSS Memory", "VMS Memory")?;
            writeln!(out, "{}", "-".repeat(55))
        }
    }
}

pub fn write_sample_row(out: &mut impl Write, sample: &Sample) -> io::Result<()> {
    let time = sample.timestamp().format("%H:%M:%S").to_string();
    match sample {
        Sample::Detailed(s) => writeln!(
            out,
            "{:<12} {:>8.1} MB {:>8.1} MB {:>6.1}%   {:<10} {:>8}ms",
            time,
            s.heap_used_mb,
            s.heap_max_mb,
            s.heap_percent(),
            s.gc_count,
            s.gc_time_ms
        ),
        Sample::Coarse(p) => writeln!(
            out,
            "{:<12} {:>12.1} MB     {:>12.1} MB",
            time,
            p.rss_mb(),
            p.vms_mb()
        ),
    }
}

pub fn write_unreadable_row(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{:<12} could not read memory data", clock())
}

pub fn write_trend(out: &mut impl Write, trend: &TrendReport) -> io::Result<()> {
    let (title, label, subject) = match trend.mode {
        Mode::Detailed => ("MEMORY LEAK ANALYSIS", "Heap growth:", "heap"),
        Mode::Coarse => ("MEMORY LEAK ANALYSIS (/proc fallback)", "RSS growth:", "RSS memory"),
    };
    writeln!(out)?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "{title}")?;
    writeln!(out, "{RULE}")?;
    writeln!(
        out,
        "{:<16}{:>8.1} MB ({:>+.1}%)",
        label, trend.growth_mb, trend.growth_pct
    )?;
    if let Some(gc) = &trend.gc {
        writeln!(out, "GC count:       {:>8} total GCs", gc.gc_count_increase)?;
        writeln!(out, "GC time:        {:>8} ms", gc.gc_time_increase_ms)?;
    }
    writeln!(out)?;
    match trend.classification {
        Classification::Significant => writeln!(
            out,
            "[WARNING] Significant {subject} growth detected - possible memory leak!"
        )?,
        Classification::Moderate => writeln!(
            out,
            "[CAUTION] Moderate {subject} growth detected - monitor closely"
        )?,
        Classification::Stable => writeln!(out, "[OK] Memory usage appears stable")?,
    }
    if let Some(increase) = trend.gc.and_then(|gc| gc.old_gen_warning()) {
        writeln!(
            out,
            "[WARNING] {increase} old-generation GCs detected - heap may be filling up"
        )?;
    }
    Ok(())
}

pub fn write_process_memory(out: &mut impl Write, info: Option<&ProcessMemoryInfo>) -> io::Result<()> {
    let Some(info) = info else {
        return writeln!(out, "Could not read /proc memory info");
    };
    writeln!(out)?;
    writeln!(out, "Memory Usage (from /proc):")?;
    writeln!(out, "  RSS (Physical): {:.1} MB", info.rss_mb())?;
    writeln!(out, "  VMS (Virtual):  {:.1} MB", info.vms_mb())?;
    writeln!(out, "  Data:           {:.1} MB", info.data_mb())?;
    writeln!(out, "  Peak:           {:.1} MB", info.peak_mb())
}

pub fn write_wrapper_log(out: &mut impl Write, report: &WrapperLogReport) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Wrapper Log Analysis ({}):", report.log_path.display())?;
    if !report.warnings.is_empty() {
        writeln!(out, "  Memory Warnings:")?;
        for w in &report.warnings {
            writeln!(out, "    - {w}")?;
        }
    }
    if !report.oom_events.is_empty() {
        writeln!(out, "  OOM Events:")?;
        for o in &report.oom_events {
            writeln!(out, "    - {o}")?;
        }
    }
    if report.is_clean() {
        writeln!(out, "  No memory warnings found")?;
    }
    Ok(())
}

pub fn write_console_memory(out: &mut impl Write, memory: &ConsoleMemory) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Router Console Memory:")?;
    writeln!(out, "  Used: {} MB", or_na(memory.used_mb))?;
    writeln!(out, "  Max:  {} MB", or_na(memory.max_mb))
}

pub fn write_current_status(out: &mut impl Write, snapshot: &MemorySnapshot) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Current Memory Status:")?;
    writeln!(out, "  Heap Used:    {:.1} MB", snapshot.heap_used_mb)?;
    writeln!(out, "  Heap Max:     {:.1} MB", snapshot.heap_max_mb)?;
    writeln!(out, "  Heap Usage:   {:.1}%", snapshot.heap_percent())?;
    writeln!(out, "  Non-Heap:     {:.1} MB", snapshot.non_heap_used_mb)?;
    writeln!(out, "  GC Count:     {}", snapshot.gc_count)?;
    writeln!(out, "  GC Time:      {} ms", snapshot.gc_time_ms)
}

pub fn write_heap_breakdown(out: &mut impl Write, heap: &HeapBreakdown) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Heap Breakdown:")?;
    let regions = [
        ("Eden:", heap.eden_used_kb),
        ("Survivor:", heap.survivor_used_kb),
        ("Tenured:", heap.tenured_used_kb),
        ("Metaspace:", heap.metaspace_used_kb),
    ];
    for (name, kb) in regions {
        if let Some(kb) = kb {
            writeln!(out, "  {:<14} {:.1} MB", name, kb as f64 / 1024.0)?;
        }
    }
    Ok(())
}

pub fn write_gc_log(
    out: &mut impl Write,
    path: &Path,
    stats: &GcLogStats,
    full_gc_warning: u64,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Log: {}", path.display())?;
    writeln!(out, "  Full GC count: {}", stats.full_gc_count)?;
    writeln!(out, "  Concurrent failures: {}", stats.concurrent_mode_failures)?;
    writeln!(out, "  Promotion failures: {}", stats.promotion_failures)?;
    writeln!(out, "  Allocation failures: {}", stats.allocation_failures)?;
    if let Some(last) = stats.heap_transitions.last() {
        writeln!(
            out,
            "  Last collection: {}K->{}K ({}K)",
            last.before_kb, last.after_kb, last.max_kb
        )?;
    }
    if stats.has_full_gc_pressure(full_gc_warning) {
        writeln!(out, "  [WARNING] High number of Full GCs - possible memory pressure!")?;
    }
    Ok(())
}

pub fn write_heap_dump(out: &mut impl Write, path: &Path) -> io::Result<()> {
    writeln!(out, "Heap dump saved to: {}", path.display())?;
    writeln!(out, "Analyze with: jmap -heap <pid> or VisualVM")
}

pub fn write_diagnosis(out: &mut impl Write, diagnosis: &Diagnosis) -> io::Result<()> {
    let console = &diagnosis.console;
    writeln!(out)?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "MEMORY DIAGNOSIS")?;
    writeln!(out, "{RULE}")?;
    if let Some(error) = &console.error {
        return writeln!(out, "Error: {error}");
    }
    writeln!(
        out,
        "RAM Usage:      {} / {} MB ({}%)",
        or_na(console.ram_used_mb),
        or_na(console.ram_max_mb),
        console.ram_percent.unwrap_or(0)
    )?;
    if let (Some(current), Some(max)) = (console.transit_current, console.transit_max) {
        writeln!(out, "Transit Tunnels: {current} / {max}")?;
    }
    if let Some(service) = console.service_tunnels {
        writeln!(out, "Service Tunnels: {service}")?;
    }
    for rec in &diagnosis.recommendations {
        match rec {
            Recommendation::TransitCritical { current, .. } => {
                writeln!(
                    out,
                    "[CRITICAL] Transit tunnels extremely high! ({current}) This is likely the memory issue."
                )?;
                writeln!(out, "           Recommend: {rec}")?;
            }
            Recommendation::TransitWarning { .. } => writeln!(out, "[WARNING] {rec}")?,
            Recommendation::FloodfillLoad { .. } => writeln!(out, "{rec}")?,
            Recommendation::HeapCritical { checklist, .. } => {
                writeln!(out)?;
                writeln!(out, "[CRITICAL] {rec}")?;
                writeln!(out, " Recommendations:")?;
                for (i, item) in checklist.iter().enumerate() {
                    writeln!(out, "  {}. {item}", i + 1)?;
                }
            }
        }
    }
    Ok(())
}
