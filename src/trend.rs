// Two-point growth analysis over a monitoring series.
//
// Only the first and last samples are compared, so a spike between them is
// invisible to the verdict.

use crate::config::ThresholdConfig;
use crate::models::{Mode, Series};
use std::fmt;

/// Severity of the observed growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Stable,
    Moderate,
    Significant,
}

impl Classification {
    fn from_growth(growth_pct: f64, thresholds: &ThresholdConfig) -> Self {
        if growth_pct > thresholds.significant_growth_pct {
            Classification::Significant
        } else if growth_pct > thresholds.moderate_growth_pct {
            Classification::Moderate
        } else {
            Classification::Stable
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Stable => f.write_str("stable"),
            Classification::Moderate => f.write_str("moderate"),
            Classification::Significant => f.write_str("significant"),
        }
    }
}

/// GC counter deltas between the endpoints of a detailed series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcActivity {
    pub gc_count_increase: u64,
    pub gc_time_increase_ms: u64,
    pub old_gc_increase: u64,
}

impl GcActivity {
    /// Old-generation collections happened during the run.
    pub fn old_gen_warning(&self) -> Option<u64> {
        (self.old_gc_increase > 0).then_some(self.old_gc_increase)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendReport {
    pub mode: Mode,
    pub samples: usize,
    /// Heap used (detailed) or RSS (coarse) delta in MB; negative when memory shrank.
    pub growth_mb: f64,
    pub growth_pct: f64,
    pub classification: Classification,
    /// Present for detailed series only.
    pub gc: Option<GcActivity>,
}

/// None for fewer than two samples.
pub fn analyze(series: &Series, thresholds: &ThresholdConfig) -> Option<TrendReport> {
    if series.len() < 2 {
        return None;
    }
    let (first_mb, last_mb, gc) = match series {
        Series::Detailed(s) => {
            let (first, last) = (s.first()?, s.last()?);
            let gc = GcActivity {
                gc_count_increase: last.gc_count.saturating_sub(first.gc_count),
                gc_time_increase_ms: last.gc_time_ms.saturating_sub(first.gc_time_ms),
                old_gc_increase: last.old_gc_count.saturating_sub(first.old_gc_count),
            };
            (first.heap_used_mb, last.heap_used_mb, Some(gc))
        }
        Series::Coarse(s) => {
            let (first, last) = (s.first()?, s.last()?);
            (first.rss_mb(), last.rss_mb(), None)
        }
    };
    let growth_mb = last_mb - first_mb;
    let growth_pct = if first_mb > 0.0 {
        growth_mb / first_mb * 100.0
    } else {
        0.0
    };
    Some(TrendReport {
        mode: series.mode(),
        samples: series.len(),
        growth_mb,
        growth_pct,
        classification: Classification::from_growth(growth_pct, thresholds),
        gc,
    })
}
