// Router web console client (home, tunnels and router pages)

mod scrape;

pub use scrape::{scrape_home, scrape_router_page, scrape_tunnels};

use crate::config::ConsoleConfig;
use crate::fetch::{Fetch, Source};
use crate::models::{ConsoleDiagnosis, ConsoleMemory};
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub struct ConsoleRepo<F> {
    fetcher: F,
    base_url: String,
    timeout: Duration,
}

impl<F: Fetch> ConsoleRepo<F> {
    pub fn new(fetcher: F, config: &ConsoleConfig) -> Self {
        Self::with_base_url(fetcher, &config.base_url, config.timeout())
    }

    pub fn with_base_url(fetcher: F, base_url: &str, timeout: Duration) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn page(&self, name: &str) -> Source {
        Source::http(format!("{}/{}", self.base_url, name), self.timeout)
    }

    /// Fetches the home and tunnels pages independently. A home-page failure
    /// lands in `error`; a tunnels-page failure leaves its fields absent.
    #[instrument(skip(self), fields(repo = "console", operation = "diagnosis", base_url = %self.base_url))]
    pub async fn diagnosis(&self) -> ConsoleDiagnosis {
        let mut diagnosis = ConsoleDiagnosis::default();
        match self.fetcher.fetch(&self.page("home")).await {
            Ok(html) => scrape_home(&html, &mut diagnosis),
            Err(e) => {
                debug!(error = %e, "home page unavailable");
                diagnosis.error = Some(e.to_string());
            }
        }
        match self.fetcher.fetch(&self.page("tunnels")).await {
            Ok(html) => scrape_tunnels(&html, &mut diagnosis),
            Err(e) => warn!(error = %e, operation = "fetch_tunnels", "tunnels page unavailable"),
        }
        diagnosis
    }

    /// JVM memory line from the router page. None when the page is unreachable.
    #[instrument(skip(self), fields(repo = "console", operation = "memory"))]
    pub async fn memory(&self) -> Option<ConsoleMemory> {
        match self.fetcher.fetch(&self.page("router.jsp")).await {
            Ok(html) => Some(scrape_router_page(&html)),
            Err(e) => {
                debug!(error = %e, "router page unavailable");
                None
            }
        }
    }
}
