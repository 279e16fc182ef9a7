//! Interval utilization computed from successive counter snapshots.
//!
//! The [`UtilizationEngine`] owns one baseline per counter row and turns
//! each new [`CounterSnapshot`] into busy and iowait percentages for the
//! interval since the previous snapshot. It never reads the clock or any
//! file itself; callers decide when to sample.

use crate::stat::CounterSnapshot;

/// Previously observed cumulative values for one counter row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct CoreBaseline {
    total: u64,
    idle: u64,
    iowait: u64,
    busy: u64,
}

/// Utilization of one counter row over the last interval.
///
/// The percentages are `None` when the row has no usable interval yet:
/// on the engine's first snapshot, or when zero ticks elapsed for the row
/// (same-instant reads, or cumulative counters that moved backwards).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoreUsage {
    /// Position in the snapshot: 0 is the all-cores aggregate, N is core N-1.
    pub index: usize,
    /// Share of non-idle ticks in the interval, 0.0 to 100.0.
    pub busy_percent: Option<f64>,
    /// Share of ticks spent waiting for I/O in the interval, 0.0 to 100.0.
    pub iowait_percent: Option<f64>,
}

impl CoreUsage {
    /// Whether this entry carries usable percentages.
    #[must_use]
    pub const fn has_data(&self) -> bool {
        self.busy_percent.is_some()
    }
}

/// The outcome of folding one snapshot into the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageReport {
    /// Per-row usage in snapshot order, aggregate first.
    pub cores: Vec<CoreUsage>,
    /// Set when this snapshot exposed more counter rows than any before it.
    pub core_count_changed: bool,
}

impl UsageReport {
    /// Whether any entry carries usable percentages.
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.cores.iter().any(CoreUsage::has_data)
    }
}

/// Computes per-core busy and iowait percentages between snapshots.
///
/// Baselines are kept per row index, so readings stay consistent as long
/// as the kernel lists rows in a stable order (it does: aggregate first,
/// then cores in ascending order). If a snapshot brings more rows than the
/// engine has baselines, the baseline table grows and the report flags the
/// change once; baselines are never discarded when a row disappears.
///
/// The engine does no locking. It is designed for exactly one polling
/// caller, which is also what keeps consecutive intervals well-defined.
#[derive(Debug)]
pub struct UtilizationEngine {
    baselines: Vec<CoreBaseline>,
    expected_cores: usize,
    primed: bool,
}

impl UtilizationEngine {
    /// Create an engine sized for `expected_cores` individual cores plus
    /// the aggregate row the kernel lists first.
    #[must_use]
    pub fn new(expected_cores: usize) -> Self {
        Self {
            baselines: vec![CoreBaseline::default(); expected_cores + 1],
            expected_cores,
            primed: false,
        }
    }

    /// Number of individual cores this engine was configured to expect.
    #[must_use]
    pub fn expected_cores(&self) -> usize {
        self.expected_cores
    }

    /// Number of counter rows currently tracked, the aggregate included.
    #[must_use]
    pub fn tracked_rows(&self) -> usize {
        self.baselines.len()
    }

    /// Fold a snapshot into the engine and compute the interval's usage.
    ///
    /// Baselines are overwritten with the snapshot's values no matter what
    /// the computation produced, so a reset or zero-width interval costs a
    /// single cycle of data and the next interval is measured from fresh
    /// values.
    pub fn compute(&mut self, snapshot: &CounterSnapshot) -> UsageReport {
        let mut core_count_changed = false;
        if snapshot.len() > self.baselines.len() {
            self.baselines
                .resize(snapshot.len(), CoreBaseline::default());
            core_count_changed = true;
        }

        let primed = self.primed;
        let mut cores = Vec::with_capacity(snapshot.len());

        for (index, counters) in snapshot.cores.iter().enumerate() {
            let current = CoreBaseline {
                total: counters.total(),
                idle: counters.idle,
                iowait: counters.iowait,
                busy: counters.busy(),
            };
            let prev = self.baselines[index];

            // saturating_sub keeps counter resets from wrapping; they
            // surface as a zero-width interval instead.
            let total_diff = current.total.saturating_sub(prev.total);
            let busy_diff = current.busy.saturating_sub(prev.busy);
            let iowait_diff = current.iowait.saturating_sub(prev.iowait);

            let (busy_percent, iowait_percent) = if primed && total_diff > 0 {
                (
                    Some(percent_of(busy_diff, total_diff)),
                    Some(percent_of(iowait_diff, total_diff)),
                )
            } else {
                (None, None)
            };

            cores.push(CoreUsage {
                index,
                busy_percent,
                iowait_percent,
            });
            self.baselines[index] = current;
        }

        self.primed = true;
        UsageReport {
            cores,
            core_count_changed,
        }
    }
}

/// Share of `delta` in `total` as a percentage, clamped to a displayable
/// range.
fn percent_of(delta: u64, total: u64) -> f64 {
    ((delta as f64) / (total as f64) * 100.0).clamp(0.0, 100.0)
}
