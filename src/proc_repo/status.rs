// Parse /proc/<pid>/status memory lines (VmRSS, VmSize, VmData, VmStk, VmPeak).

use crate::models::ProcessMemoryInfo;
use chrono::{DateTime, Local};

/// Fixed-prefix extraction; lines that are missing leave their field absent.
pub fn parse_status(content: &str, timestamp: DateTime<Local>) -> ProcessMemoryInfo {
    let mut info = ProcessMemoryInfo {
        timestamp,
        rss_kb: None,
        vms_kb: None,
        data_kb: None,
        stack_kb: None,
        peak_kb: None,
    };
    for line in content.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let slot = match key {
            "VmRSS" => &mut info.rss_kb,
            "VmSize" => &mut info.vms_kb,
            "VmData" => &mut info.data_kb,
            "VmStk" => &mut info.stack_kb,
            "VmPeak" => &mut info.peak_kb,
            _ => continue,
        };
        *slot = rest.split_whitespace().next().and_then(|v| v.parse().ok());
    }
    info
}
