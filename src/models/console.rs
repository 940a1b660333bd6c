// Metrics scraped from the router's web console

/// Whatever the console pages yielded. `None` means "not found on the page", never zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsoleDiagnosis {
    pub ram_used_mb: Option<u64>,
    pub ram_max_mb: Option<u64>,
    pub ram_percent: Option<u64>,
    pub transit_current: Option<u64>,
    pub transit_max: Option<u64>,
    pub service_tunnels: Option<u64>,
    pub floodfill_peers: Option<u64>,
    /// Transport failure on the home page fetch.
    pub error: Option<String>,
}

/// JVM memory line from the console's router page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsoleMemory {
    pub used_mb: Option<u64>,
    pub max_mb: Option<u64>,
}

impl ConsoleMemory {
    pub fn is_empty(&self) -> bool {
        self.used_mb.is_none() && self.max_mb.is_none()
    }
}
