// Extract figures from router console HTML.

use crate::models::{ConsoleDiagnosis, ConsoleMemory};
use regex::Regex;
use std::sync::LazyLock;

static RAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"RAM:\s*([\d,]+)\s*/\s*([\d,]+)\s*M").expect("static regex"));
static TRANSIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Transit.*?(\d+)\s*/\s*(\d+)").expect("static regex"));
static SERVICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Service.*?(\d+)\s*/\s*(\d+)").expect("static regex"));
static FLOODFILL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Floodfill.*?(\d+)").expect("static regex"));
static JAVA_MEMORY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Java Memory.*?(\d+)\s*MB.*?of\s*(\d+)\s*MB").expect("static regex")
});

fn number(s: &str) -> Option<u64> {
    s.replace(',', "").parse().ok()
}

/// RAM used/max from the home page; percent is floored, absent when it cannot be computed.
pub fn scrape_home(html: &str, diagnosis: &mut ConsoleDiagnosis) {
    let Some(caps) = RAM.captures(html) else {
        return;
    };
    let (used, max) = (number(&caps[1]), number(&caps[2]));
    diagnosis.ram_used_mb = used;
    diagnosis.ram_max_mb = max;
    if let (Some(used), Some(max)) = (used, max)
        && max > 0
    {
        diagnosis.ram_percent = used.checked_mul(100).map(|v| v / max);
    }
}

/// Transit, service and floodfill counts from the tunnels page. Each is independent.
pub fn scrape_tunnels(html: &str, diagnosis: &mut ConsoleDiagnosis) {
    if let Some(caps) = TRANSIT.captures(html) {
        diagnosis.transit_current = number(&caps[1]);
        diagnosis.transit_max = number(&caps[2]);
    }
    if let Some(caps) = SERVICE.captures(html) {
        diagnosis.service_tunnels = number(&caps[1]);
    }
    if let Some(caps) = FLOODFILL.captures(html) {
        diagnosis.floodfill_peers = number(&caps[1]);
    }
}

pub fn scrape_router_page(html: &str) -> ConsoleMemory {
    match JAVA_MEMORY.captures(html) {
        Some(caps) => ConsoleMemory {
            used_mb: number(&caps[1]),
            max_mb: number(&caps[2]),
        },
        None => ConsoleMemory::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_ram_with_thousands_separator() {
        let mut d = ConsoleDiagnosis::default();
        scrape_home("<b>RAM: 1,700 / 2,048 MB</b>", &mut d);
        assert_eq!(d.ram_used_mb, Some(1700));
        assert_eq!(d.ram_max_mb, Some(2048));
        assert_eq!(d.ram_percent, Some(83));
    }

    #[test]
    fn home_without_ram_line_leaves_fields_absent() {
        let mut d = ConsoleDiagnosis::default();
        scrape_home("<html>Network: OK</html>", &mut d);
        assert_eq!(d, ConsoleDiagnosis::default());
    }

    #[test]
    fn home_zero_max_has_no_percent() {
        let mut d = ConsoleDiagnosis::default();
        scrape_home("RAM: 10 / 0 MB", &mut d);
        assert_eq!(d.ram_max_mb, Some(0));
        assert_eq!(d.ram_percent, None);
    }

    #[test]
    fn home_oversized_ram_figure_has_no_percent() {
        let mut d = ConsoleDiagnosis::default();
        scrape_home("RAM: 200,000,000,000,000,000 / 1 M", &mut d);
        assert_eq!(d.ram_used_mb, Some(200_000_000_000_000_000));
        assert_eq!(d.ram_max_mb, Some(1));
        assert_eq!(d.ram_percent, None);
    }

    #[test]
    fn tunnels_page_counts() {
        let mut d = ConsoleDiagnosis::default();
        let html = "<tr><td>Transit</td><td>6000 / 8000</td></tr>\
                    <tr><td>Service</td><td>12 / 40</td></tr>\
                    <tr><td>Floodfill peers</td><td>1500</td></tr>";
        scrape_tunnels(html, &mut d);
        assert_eq!(d.transit_current, Some(6000));
        assert_eq!(d.transit_max, Some(8000));
        assert_eq!(d.service_tunnels, Some(12));
        assert_eq!(d.floodfill_peers, Some(1500));
    }

    #[test]
    fn router_page_java_memory_spans_lines() {
        let html = "<td>Java Memory</td>\n<td>512 MB used of 1024 MB</td>";
        let mem = scrape_router_page(html);
        assert_eq!(mem.used_mb, Some(512));
        assert_eq!(mem.max_mb, Some(1024));
    }
}
