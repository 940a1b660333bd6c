use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the config file when `--config` is not given.
pub const CONFIG_ENV: &str = "MEMWATCH_CONFIG";

/// Picked up from the working directory when present; defaults apply otherwise.
pub const DEFAULT_CONFIG_FILE: &str = "memwatch.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

/// External JDK tools and the kernel's per-process files.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub jstat_path: String,
    pub jmap_path: String,
    pub jstat_timeout_secs: u64,
    pub jmap_timeout_secs: u64,
    pub heap_dump_timeout_secs: u64,
    pub heap_dump_dir: PathBuf,
    /// Root of the per-process status files (`<proc_root>/<pid>/status`).
    pub proc_root: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            jstat_path: "jstat".into(),
            jmap_path: "jmap".into(),
            jstat_timeout_secs: 10,
            jmap_timeout_secs: 30,
            heap_dump_timeout_secs: 120,
            heap_dump_dir: home_or_cwd(&["i2p", "heap_dumps"]),
            proc_root: PathBuf::from("/proc"),
        }
    }
}

impl ToolsConfig {
    pub fn jstat_timeout(&self) -> Duration {
        Duration::from_secs(self.jstat_timeout_secs)
    }

    pub fn jmap_timeout(&self) -> Duration {
        Duration::from_secs(self.jmap_timeout_secs)
    }

    pub fn heap_dump_timeout(&self) -> Duration {
        Duration::from_secs(self.heap_dump_timeout_secs)
    }
}

/// Trend and GC-log heuristics.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Growth above this percentage is flagged as a possible leak.
    pub significant_growth_pct: f64,
    /// Growth above this percentage is worth watching.
    pub moderate_growth_pct: f64,
    /// More full GCs than this in one log is flagged as memory pressure.
    pub full_gc_warning: u64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            significant_growth_pct: 20.0,
            moderate_growth_pct: 10.0,
            full_gc_warning: 10,
        }
    }
}

/// Router web console and the operational limits used to judge it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub transit_critical: u64,
    pub transit_warning: u64,
    pub floodfill_high: u64,
    pub ram_critical_pct: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:7657".into(),
            timeout_secs: 5,
            transit_critical: 5000,
            transit_warning: 2000,
            floodfill_high: 1000,
            ram_critical_pct: 80,
        }
    }
}

impl ConsoleConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Where to look for the wrapper log and GC logs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogsConfig {
    /// Tried in order; the first existing file is scanned.
    pub wrapper_log_paths: Vec<PathBuf>,
    pub gc_log_dirs: Vec<PathBuf>,
}

impl Default for LogsConfig {
    fn default() -> Self {
        let home = dirs::home_dir();
        let under_home = |parts: &[&str]| {
            home.as_ref()
                .map(|h| parts.iter().fold(h.clone(), |p, part| p.join(part)))
        };
        let wrapper_log_paths = [
            under_home(&["i2p", "wrapper.log"]),
            under_home(&[".i2p", "wrapper.log"]),
            Some(PathBuf::from("/var/log/i2p/wrapper.log")),
        ]
        .into_iter()
        .flatten()
        .collect();
        let gc_log_dirs = [
            under_home(&["i2p", "logs"]),
            under_home(&[".i2p", "logs"]),
            Some(PathBuf::from("/var/log/i2p/logs")),
            Some(PathBuf::from("./logs")),
        ]
        .into_iter()
        .flatten()
        .collect();
        Self {
            wrapper_log_paths,
            gc_log_dirs,
        }
    }
}

/// How the target process is recognized in the process table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Regexes over the full command line, tried in order.
    pub patterns: Vec<String>,
    /// A candidate qualifies when its command line contains any of these (case-insensitive).
    pub markers: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            patterns: vec!["i2p router".into(), r"org\.i2p\.router\.Router".into()],
            markers: vec!["i2p".into(), "router".into()],
        }
    }
}

fn home_or_cwd(parts: &[&str]) -> PathBuf {
    let base = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    parts.iter().fold(base, |p, part| p.join(part))
}

impl AppConfig {
    /// Loads `path` if given, else the file named by `MEMWATCH_CONFIG`, else
    /// `memwatch.toml` when it exists; falls back to defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        match explicit {
            Some(p) => Self::load_from_file(&p),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load_from_file(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::load_from_str(&s).with_context(|| format!("loading config {}", path.display()))
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.tools.jstat_path.is_empty(),
            "tools.jstat_path must be non-empty"
        );
        anyhow::ensure!(
            !self.tools.jmap_path.is_empty(),
            "tools.jmap_path must be non-empty"
        );
        anyhow::ensure!(
            self.tools.jstat_timeout_secs > 0,
            "tools.jstat_timeout_secs must be > 0, got {}",
            self.tools.jstat_timeout_secs
        );
        anyhow::ensure!(
            self.tools.jmap_timeout_secs > 0,
            "tools.jmap_timeout_secs must be > 0, got {}",
            self.tools.jmap_timeout_secs
        );
        anyhow::ensure!(
            self.tools.heap_dump_timeout_secs > 0,
            "tools.heap_dump_timeout_secs must be > 0, got {}",
            self.tools.heap_dump_timeout_secs
        );
        anyhow::ensure!(
            self.thresholds.moderate_growth_pct >= 0.0,
            "thresholds.moderate_growth_pct must be >= 0, got {}",
            self.thresholds.moderate_growth_pct
        );
        anyhow::ensure!(
            self.thresholds.moderate_growth_pct < self.thresholds.significant_growth_pct,
            "thresholds.moderate_growth_pct ({}) must be below significant_growth_pct ({})",
            self.thresholds.moderate_growth_pct,
            self.thresholds.significant_growth_pct
        );
        anyhow::ensure!(
            !self.console.base_url.is_empty(),
            "console.base_url must be non-empty"
        );
        anyhow::ensure!(
            self.console.timeout_secs > 0,
            "console.timeout_secs must be > 0, got {}",
            self.console.timeout_secs
        );
        anyhow::ensure!(
            self.console.transit_warning < self.console.transit_critical,
            "console.transit_warning ({}) must be below transit_critical ({})",
            self.console.transit_warning,
            self.console.transit_critical
        );
        anyhow::ensure!(
            (1..=100).contains(&self.console.ram_critical_pct),
            "console.ram_critical_pct must be between 1 and 100, got {}",
            self.console.ram_critical_pct
        );
        anyhow::ensure!(
            !self.discovery.patterns.is_empty(),
            "discovery.patterns must be non-empty"
        );
        for pattern in &self.discovery.patterns {
            regex::Regex::new(pattern)
                .with_context(|| format!("discovery.patterns: invalid regex {:?}", pattern))?;
        }
        Ok(())
    }
}
