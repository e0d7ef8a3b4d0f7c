//! Net worth snapshots and month-over-month growth

use chrono::{DateTime, Datelike, Months, Utc};
use serde::{Deserialize, Serialize};

/// One point in the net worth series, taken after a ledger mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub at: DateTime<Utc>,
    pub total: f64,
    /// Growth versus the prior calendar month, frozen at record time.
    #[serde(default)]
    pub growth_rate: f64,
}

/// Growth between two consecutive snapshots in a window.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthPoint {
    pub at: DateTime<Utc>,
    pub total: f64,
    pub rate: f64,
}

/// Append-only snapshot series.
#[derive(Debug, Default, Clone)]
pub struct History {
    snapshots: Vec<Snapshot>,
}

impl History {
    pub fn new(snapshots: Vec<Snapshot>) -> Self {
        History { snapshots }
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Appends a snapshot for `total`, stamping it with the growth rate
    /// against the series as it stood before the append.
    pub fn record(&mut self, now: DateTime<Utc>, total: f64) {
        let growth_rate = self.monthly_growth_rate(now, total);
        self.snapshots.push(Snapshot {
            at: now,
            total,
            growth_rate,
        });
    }

    /// Percentage growth of `current_total` against the most recent snapshot
    /// taken in the calendar month exactly one month before `now`. Zero when
    /// no such snapshot exists or its total is not positive, so callers never
    /// see NaN or infinities.
    pub fn monthly_growth_rate(&self, now: DateTime<Utc>, current_total: f64) -> f64 {
        let Some(prior_month) = now.checked_sub_months(Months::new(1)) else {
            return 0.0;
        };
        let baseline = self
            .snapshots
            .iter()
            .rev()
            .find(|s| same_month(s.at, prior_month))
            .map(|s| s.total);
        match baseline {
            Some(base) if base > 0.0 => ((current_total - base) / base) * 100.0,
            _ => 0.0,
        }
    }

    /// Snapshots taken within the last `months` months, oldest first.
    pub fn window(&self, now: DateTime<Utc>, months: u32) -> Vec<Snapshot> {
        let cutoff = now.checked_sub_months(Months::new(months));
        let mut window: Vec<Snapshot> = self
            .snapshots
            .iter()
            .filter(|s| cutoff.is_none_or(|c| s.at >= c))
            .cloned()
            .collect();
        window.sort_by_key(|s| s.at);
        window
    }

    /// Pairwise growth across the window. The first snapshot only seeds the
    /// series, so a window of n snapshots yields n-1 points.
    pub fn growth_series(&self, now: DateTime<Utc>, months: u32) -> Vec<GrowthPoint> {
        self.window(now, months)
            .windows(2)
            .map(|pair| {
                let rate = if pair[0].total > 0.0 {
                    ((pair[1].total - pair[0].total) / pair[0].total) * 100.0
                } else {
                    0.0
                };
                GrowthPoint {
                    at: pair[1].at,
                    total: pair[1].total,
                    rate,
                }
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}

fn same_month(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.year() == b.year() && a.month() == b.month()
}
