//! Rendering of usage reports for stdout.

use crate::config::OutputFormat;
use crate::engine::{CoreUsage, UsageReport};
use chrono::{DateTime, TimeZone};
use std::fmt;

/// Timestamp pattern shared by both output modes.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Format a wall-clock instant the way output batches are stamped.
///
/// # Examples
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use corestat_core::format;
///
/// let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 15).unwrap();
/// assert_eq!(format::timestamp(at), "2024-05-01 12:30:15.000");
/// ```
#[must_use]
pub fn timestamp<Tz: TimeZone>(at: DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Render one poll cycle's report as a printable batch.
///
/// Entries without data are skipped, and a report with no data at all
/// renders as an empty string so warm-up and zero-width cycles print
/// nothing rather than rows of placeholders.
#[must_use]
pub fn render(report: &UsageReport, timestamp: &str, format: OutputFormat) -> String {
    if !report.has_data() {
        return String::new();
    }
    match format {
        OutputFormat::Human => human_batch(report, timestamp),
        OutputFormat::Csv => csv_batch(report, timestamp),
    }
}

fn human_batch(report: &UsageReport, timestamp: &str) -> String {
    let mut out = String::with_capacity(64 * (report.cores.len() + 1));
    out.push_str(timestamp);
    out.push('\n');
    for core in &report.cores {
        if let Some(line) = human_line(core) {
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

fn csv_batch(report: &UsageReport, timestamp: &str) -> String {
    let mut out = String::with_capacity(64 * report.cores.len());
    for core in &report.cores {
        if let Some(row) = csv_row(core, timestamp) {
            out.push_str(&row);
            out.push('\n');
        }
    }
    out
}

/// One aligned human-readable line, or `None` for an entry without data.
///
/// # Examples
///
/// ```rust
/// use corestat_core::{format, CoreUsage};
///
/// let usage = CoreUsage {
///     index: 3,
///     busy_percent: Some(7.5),
///     iowait_percent: Some(0.25),
/// };
/// assert_eq!(
///     format::human_line(&usage).unwrap(),
///     "core   3: busy   7.50%, iowait   0.25%"
/// );
/// ```
#[must_use]
pub fn human_line(core: &CoreUsage) -> Option<String> {
    let busy = core.busy_percent?;
    let iowait = core.iowait_percent?;
    Some(format!(
        "core {:>3}: busy {busy:>6.2}%, iowait {iowait:>6.2}%",
        core.index
    ))
}

/// One comma-separated row, or `None` for an entry without data.
#[must_use]
pub fn csv_row(core: &CoreUsage, timestamp: &str) -> Option<String> {
    let busy = core.busy_percent?;
    let iowait = core.iowait_percent?;
    Some(format!(
        "{timestamp}, {}, {busy:.2}, {iowait:.2}",
        core.index
    ))
}
