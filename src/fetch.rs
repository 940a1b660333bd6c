// External collaborators behind one seam: commands (with timeout), files, HTTP GETs.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tracing::instrument;

use crate::version::{NAME, VERSION};

/// Where a piece of raw telemetry comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Command {
        program: String,
        args: Vec<String>,
        timeout: Duration,
    },
    File(PathBuf),
    Http {
        url: String,
        timeout: Duration,
    },
}

impl Source {
    pub fn command<I, S>(program: impl Into<String>, args: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Source::Command {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            timeout,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Source::File(path.into())
    }

    pub fn http(url: impl Into<String>, timeout: Duration) -> Self {
        Source::Http {
            url: url.into(),
            timeout,
        }
    }
}

/// Renders as the shell command line, the file path, or the URL.
impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Command { program, args, .. } => {
                write!(f, "{}", program)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                Ok(())
            }
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Http { url, .. } => write!(f, "{}", url),
        }
    }
}

/// Why a source produced no data. Callers downgrade this to "no data", never abort on it.
#[derive(Debug, Error)]
pub enum Unavailable {
    #[error("{program}: could not start: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{what}: timed out after {timeout:?}")]
    TimedOut { what: String, timeout: Duration },
    #[error("{program}: {status}")]
    Failed { program: String, status: String },
    #[error("{}: not found", .0.display())]
    Missing(PathBuf),
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Fetch the raw text behind a [`Source`].
pub trait Fetch {
    fn fetch(&self, source: &Source) -> impl Future<Output = Result<String, Unavailable>>;
}

impl<F: Fetch> Fetch for &F {
    fn fetch(&self, source: &Source) -> impl Future<Output = Result<String, Unavailable>> {
        (**self).fetch(source)
    }
}

/// Real processes, real filesystem, real network.
#[derive(Clone)]
pub struct SystemFetcher {
    http: reqwest::Client,
}

impl SystemFetcher {
    pub fn new() -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(format!("{}/{}", NAME, VERSION))
            .build()?;
        Ok(Self { http })
    }

    async fn run_command(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<String, Unavailable> {
        let child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| Unavailable::Spawn {
                program: program.to_string(),
                source,
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| Unavailable::TimedOut {
                what: program.to_string(),
                timeout,
            })?
            .map_err(|source| Unavailable::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(Unavailable::Failed {
                program: program.to_string(),
                status: output.status.to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn read_file(&self, path: &Path) -> Result<String, Unavailable> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Unavailable::Missing(path.to_path_buf()))
            }
            Err(source) => Err(Unavailable::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    async fn get(&self, url: &str, timeout: Duration) -> Result<String, Unavailable> {
        let classify = |source: reqwest::Error| {
            if source.is_timeout() {
                Unavailable::TimedOut {
                    what: url.to_string(),
                    timeout,
                }
            } else {
                Unavailable::Http {
                    url: url.to_string(),
                    source,
                }
            }
        };
        let response = self
            .http
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(classify)?;
        response.text().await.map_err(classify)
    }
}

impl Fetch for SystemFetcher {
    #[instrument(skip_all, fields(source = %source))]
    async fn fetch(&self, source: &Source) -> Result<String, Unavailable> {
        match source {
            Source::Command {
                program,
                args,
                timeout,
            } => self.run_command(program, args, *timeout).await,
            Source::File(path) => self.read_file(path).await,
            Source::Http { url, timeout } => self.get(url, *timeout).await,
        }
    }
}
