// Target-process discovery over the process table.

use regex::Regex;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};

/// A running process as seen in the process table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub pid: u32,
    pub cmdline: String,
}

/// Picks the target: patterns are tried in order, candidates in the order
/// given; the first candidate matching the pattern whose command line
/// contains a marker (case-insensitive) wins.
pub fn select_target(candidates: &[Candidate], patterns: &[Regex], markers: &[String]) -> Option<u32> {
    let markers: Vec<String> = markers.iter().map(|m| m.to_lowercase()).collect();
    patterns.iter().find_map(|pattern| {
        candidates
            .iter()
            .filter(|c| pattern.is_match(&c.cmdline))
            .find(|c| {
                let cmdline = c.cmdline.to_lowercase();
                markers.is_empty() || markers.iter().any(|m| cmdline.contains(m.as_str()))
            })
            .map(|c| c.pid)
    })
}

/// Every process with a non-empty command line except this one, by ascending pid.
pub(super) fn process_table() -> Vec<Candidate> {
    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::All,
        true,
        ProcessRefreshKind::nothing().with_cmd(UpdateKind::Always),
    );
    let own_pid = std::process::id();
    let mut candidates: Vec<Candidate> = sys
        .processes()
        .iter()
        .filter(|(pid, _)| pid.as_u32() != own_pid)
        .map(|(pid, process)| Candidate {
            pid: pid.as_u32(),
            cmdline: process
                .cmd()
                .iter()
                .map(|arg| arg.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" "),
        })
        .filter(|c| !c.cmdline.is_empty())
        .collect();
    candidates.sort_by_key(|c| c.pid);
    candidates
}
