// Console-based diagnosis: scrape the router console, then apply the operational rules.

use crate::config::ConsoleConfig;
use crate::console_repo::ConsoleRepo;
use crate::fetch::Fetch;
use crate::models::ConsoleDiagnosis;
use std::fmt;

/// Target for the transit tunnel limit when transit load is critical.
pub const TRANSIT_TARGET: u64 = 2000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recommendation {
    TransitCritical { current: u64, target: u64 },
    TransitWarning { current: u64 },
    FloodfillLoad { peers: u64 },
    HeapCritical {
        ram_percent: u64,
        threshold: u64,
        checklist: Vec<String>,
    },
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::TransitCritical { target, .. } => {
                write!(f, "Reduce transit.maxTunnels to {target} or less")
            }
            Recommendation::TransitWarning { current } => {
                write!(f, "Transit tunnels very high! ({current})")
            }
            Recommendation::FloodfillLoad { peers } => {
                write!(f, "Floodfill Peers: {peers} (high floodfill load)")
            }
            Recommendation::HeapCritical {
                ram_percent,
                threshold,
                ..
            } => {
                write!(f, "Heap usage at {ram_percent}%, above {threshold}%!")
            }
        }
    }
}

fn heap_checklist(transit_max: Option<u64>) -> Vec<String> {
    let current = transit_max.map_or_else(|| "?".to_string(), |m| m.to_string());
    vec![
        format!("Reduce transit.maxTunnels (currently {current})"),
        "Disable floodfill if not needed".to_string(),
        "Reduce router console memory display refresh rate".to_string(),
        "Consider reducing bandwidth limits to lower peer count".to_string(),
    ]
}

/// Ordered rules over a console diagnosis. Nothing is recommended when the
/// home page could not be fetched.
pub fn recommend(diagnosis: &ConsoleDiagnosis, limits: &ConsoleConfig) -> Vec<Recommendation> {
    let mut recs = Vec::new();
    if diagnosis.error.is_some() {
        return recs;
    }
    if let Some(current) = diagnosis.transit_current {
        if current > limits.transit_critical {
            recs.push(Recommendation::TransitCritical {
                current,
                target: TRANSIT_TARGET,
            });
        } else if current > limits.transit_warning {
            recs.push(Recommendation::TransitWarning { current });
        }
    }
    if let Some(peers) = diagnosis.floodfill_peers
        && peers > limits.floodfill_high
    {
        recs.push(Recommendation::FloodfillLoad { peers });
    }
    if let Some(ram_percent) = diagnosis.ram_percent
        && ram_percent > limits.ram_critical_pct
    {
        recs.push(Recommendation::HeapCritical {
            ram_percent,
            threshold: limits.ram_critical_pct,
            checklist: heap_checklist(diagnosis.transit_max),
        });
    }
    recs
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnosis {
    pub console: ConsoleDiagnosis,
    pub recommendations: Vec<Recommendation>,
}

pub async fn run<F: Fetch>(console: &ConsoleRepo<F>, limits: &ConsoleConfig) -> Diagnosis {
    let diagnosis = console.diagnosis().await;
    let recommendations = recommend(&diagnosis, limits);
    tracing::debug!(recommendations = recommendations.len(), "diagnosis complete");
    Diagnosis {
        console: diagnosis,
        recommendations,
    }
}
