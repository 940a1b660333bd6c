use clap::Parser;
use memwatch::*;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    // Diagnostics go to stderr; stdout carries the report.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    let app_config = config::AppConfig::load(cli.config.as_deref())?;
    let fetcher = fetch::SystemFetcher::new()?;
    tracing::debug!(version = version::VERSION, "starting");

    let mut stdout = std::io::stdout().lock();
    let outcome = cli::run(&cli, &app_config, &fetcher, &mut stdout).await?;
    Ok(outcome.exit_code())
}
