// Command-line surface and the top-level flow between modes.

use crate::config::AppConfig;
use crate::console_repo::ConsoleRepo;
use crate::diagnose;
use crate::fetch::Fetch;
use crate::jvm_repo::JvmRepo;
use crate::log_scan;
use crate::monitor::{self, MonitorConfig};
use crate::proc_repo::{self, ProcRepo};
use crate::report;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Memory leak detection for a long-running Java router
#[derive(Debug, Parser)]
#[command(name = "memwatch", version, about)]
#[command(after_help = "\
Examples:
  memwatch --monitor              Monitor memory in real time
  memwatch --pid 12345            Current status of a specific PID
  memwatch --gc-logs              Analyze GC logs
  memwatch --heap-dump            Write a heap dump
  memwatch --status               Quick status from /proc (no JVM tools needed)
  memwatch --diagnose             Diagnose memory issues from the router console")]
pub struct Cli {
    /// Java process PID (discovered from the process table when omitted)
    #[arg(long)]
    pub pid: Option<u32>,

    /// Monitor memory usage over time
    #[arg(long)]
    pub monitor: bool,

    /// Monitoring interval in seconds
    #[arg(long, default_value_t = 10)]
    pub interval: u64,

    /// Number of monitoring iterations
    #[arg(long, default_value_t = 10)]
    pub count: u32,

    /// Append monitoring data to this CSV file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Analyze GC logs
    #[arg(long)]
    pub gc_logs: bool,

    /// Write a heap dump
    #[arg(long)]
    pub heap_dump: bool,

    /// Status from /proc, the wrapper log and the console (no JVM tools needed)
    #[arg(long)]
    pub status: bool,

    /// Diagnose memory issues from the router console
    #[arg(long)]
    pub diagnose: bool,

    /// Router console URL (overrides console.base_url)
    #[arg(long)]
    pub console_url: Option<String>,

    /// Configuration file path (default: $MEMWATCH_CONFIG, then ./memwatch.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// No `--pid` and nothing matched in the process table.
    NoTarget,
}

impl Outcome {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Done => ExitCode::SUCCESS,
            Outcome::NoTarget => ExitCode::from(1),
        }
    }
}

pub async fn run<F: Fetch>(
    cli: &Cli,
    config: &AppConfig,
    fetcher: &F,
    out: &mut impl Write,
) -> anyhow::Result<Outcome> {
    if cli.monitor {
        anyhow::ensure!(cli.count >= 1, "--count must be at least 1, got {}", cli.count);
    }
    let base_url = cli.console_url.as_deref().unwrap_or(&config.console.base_url);
    let console = ConsoleRepo::with_base_url(fetcher, base_url, config.console.timeout());

    if cli.diagnose {
        let diagnosis = diagnose::run(&console, &config.console).await;
        report::write_diagnosis(out, &diagnosis)?;
        return Ok(Outcome::Done);
    }

    let pid = match cli.pid {
        Some(pid) => pid,
        None => match proc_repo::find_target_process(&config.discovery).await? {
            Some(pid) => pid,
            None => {
                writeln!(out, "Error: Could not find the router process. Specify with --pid")?;
                return Ok(Outcome::NoTarget);
            }
        },
    };
    writeln!(out, "Using PID: {pid}")?;

    let jvm = JvmRepo::new(fetcher, config.tools.clone());
    let procfs = ProcRepo::new(fetcher, &config.tools.proc_root);

    if cli.status {
        let info = procfs.memory_info(pid).await;
        report::write_process_memory(out, info.as_ref())?;
        if let Some(wrapper) = log_scan::scan_wrapper_log(&config.logs.wrapper_log_paths) {
            report::write_wrapper_log(out, &wrapper)?;
        }
        if let Some(memory) = console.memory().await
            && !memory.is_empty()
        {
            report::write_console_memory(out, &memory)?;
        }
        return Ok(Outcome::Done);
    }

    if cli.monitor {
        let monitor_config = MonitorConfig {
            pid,
            interval: Duration::from_secs(cli.interval),
            count: cli.count,
            output: cli.output.clone(),
            thresholds: config.thresholds.clone(),
        };
        monitor::run(&jvm, &procfs, &monitor_config, out).await?;
    }

    if cli.gc_logs {
        let logs = log_scan::find_gc_logs(&config.logs.gc_log_dirs);
        if logs.is_empty() {
            writeln!(out, "No GC logs found")?;
        } else {
            writeln!(out)?;
            writeln!(out, "Analyzing GC logs...")?;
            for path in &logs {
                let stats = log_scan::parse_gc_log(path);
                report::write_gc_log(out, path, &stats, config.thresholds.full_gc_warning)?;
            }
        }
    }

    if cli.heap_dump {
        writeln!(out, "Generating heap dump in {}...", config.tools.heap_dump_dir.display())?;
        match jvm.heap_dump(pid, &config.tools.heap_dump_dir).await {
            Some(path) => report::write_heap_dump(out, &path)?,
            None => writeln!(out, "Heap dump failed")?,
        }
    }

    if !(cli.monitor || cli.gc_logs || cli.heap_dump) {
        match jvm.gc_snapshot(pid).await {
            Some(snapshot) => {
                report::write_current_status(out, &snapshot)?;
                if let Some(heap) = jvm.heap_breakdown(pid).await
                    && !heap.is_empty()
                {
                    report::write_heap_breakdown(out, &heap)?;
                }
            }
            None => writeln!(out, "jstat unavailable - try --status for /proc memory")?,
        }
    }
    Ok(Outcome::Done)
}
