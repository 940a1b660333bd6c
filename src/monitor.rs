// Periodic sampling loop (same shape as a stats worker, bounded by an iteration count).
// Mode is chosen once at entry; samples feed the terminal, the CSV sink and the trend analyzer.

use crate::config::ThresholdConfig;
use crate::models::{Mode, Sample, Series};
use crate::report;
use crate::sink::CsvSink;
use crate::trend::{self, TrendReport};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::instrument;

/// A memory data source for one process.
pub trait Acquire {
    /// None when the source has nothing for `pid` right now.
    fn acquire(&self, pid: u32) -> impl Future<Output = Option<Sample>>;
}

impl<A: Acquire> Acquire for &A {
    fn acquire(&self, pid: u32) -> impl Future<Output = Option<Sample>> {
        (**self).acquire(pid)
    }
}

/// Loop timing and output.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub pid: u32,
    pub interval: Duration,
    pub count: u32,
    pub output: Option<PathBuf>,
    pub thresholds: ThresholdConfig,
}

#[derive(Debug, Clone)]
pub struct MonitorOutcome {
    pub mode: Mode,
    pub series: Series,
    /// None when fewer than two samples were collected.
    pub trend: Option<TrendReport>,
}

/// Probes `detailed` once to pick the mode, then samples `count` times,
/// sleeping `interval` between samples (not after the last).
#[instrument(skip_all, fields(pid = config.pid, count = config.count))]
pub async fn run<D: Acquire, C: Acquire, W: Write>(
    detailed: &D,
    coarse: &C,
    config: &MonitorConfig,
    out: &mut W,
) -> anyhow::Result<MonitorOutcome> {
    anyhow::ensure!(config.count >= 1, "count must be at least 1, got {}", config.count);

    let mode = match detailed.acquire(config.pid).await {
        Some(_) => Mode::Detailed,
        None => {
            report::write_fallback_notice(out)?;
            Mode::Coarse
        }
    };
    tracing::debug!(%mode, "monitoring mode selected");
    report::write_monitor_header(out, mode, config.pid, config.interval, config.count)?;
    let mut sink = config
        .output
        .as_deref()
        .map(|path| CsvSink::open(path, mode))
        .transpose()?;

    let mut series = Series::new(mode);
    for i in 0..config.count {
        let sample = match mode {
            Mode::Detailed => detailed.acquire(config.pid).await,
            Mode::Coarse => coarse.acquire(config.pid).await,
        };
        match sample {
            Some(sample) => match series.push(sample.clone()) {
                Err(other) => {
                    tracing::warn!(
                        expected = %mode,
                        got = %other.mode(),
                        "sample of the wrong mode skipped"
                    );
                }
                Ok(()) => {
                    report::write_sample_row(out, &sample)?;
                    if let Some(sink) = sink.as_mut()
                        && let Err(e) = sink.append(&sample)
                    {
                        tracing::warn!(error = %e, operation = "append_row", "output row not written");
                    }
                }
            },
            None => {
                report::write_unreadable_row(out)?;
                tracing::warn!(iteration = i, operation = "acquire", "no memory data");
            }
        }
        if i + 1 < config.count {
            tokio::time::sleep(config.interval).await;
        }
    }
    drop(sink);

    let trend = trend::analyze(&series, &config.thresholds);
    if let Some(trend) = &trend {
        tracing::debug!(
            classification = %trend.classification,
            growth_pct = trend.growth_pct,
            samples = trend.samples,
            "trend analyzed"
        );
        report::write_trend(out, trend)?;
    }
    Ok(MonitorOutcome {
        mode,
        series,
        trend,
    })
}
