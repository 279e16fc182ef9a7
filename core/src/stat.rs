//! CPU accounting counters from `/proc/stat`.
//!
//! This module reads the kernel's cumulative per-core tick counters and
//! turns them into [`CounterSnapshot`] values. Only the leading `cpu` rows
//! of the file are consumed; everything after them (interrupt counts,
//! context switches, boot time) is ignored.

use crate::error::{Result, StatError};
use std::fs;
use std::path::{Path, PathBuf};

/// Cumulative tick counters for one CPU row of `/proc/stat`.
///
/// Fields follow the kernel's column order. All values are in "jiffies"
/// (clock ticks) accumulated since boot and only ever grow, except across
/// a counter reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoreCounters {
    /// Time spent in user mode (normal processes)
    pub user: u64,
    /// Time spent in user mode with low priority (nice)
    pub nice: u64,
    /// Time spent in system mode (kernel)
    pub system: u64,
    /// Time spent idle
    pub idle: u64,
    /// Time waiting for I/O to complete
    pub iowait: u64,
    /// Time servicing hardware interrupts
    pub irq: u64,
    /// Time servicing software interrupts
    pub softirq: u64,
    /// Time stolen by virtualization
    pub steal: u64,
    /// Time running guest VMs
    pub guest: u64,
    /// Time running niced guest VMs
    pub guest_nice: u64,
}

impl CoreCounters {
    /// Calculate the total tick count across all states.
    ///
    /// The sum saturates, so counter values near `u64::MAX` clamp rather
    /// than wrap. Genuine kernel counters sit far below the limit, but the
    /// reader accepts arbitrary stat-shaped files.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.user
            .saturating_add(self.nice)
            .saturating_add(self.system)
            .saturating_add(self.idle)
            .saturating_add(self.iowait)
            .saturating_add(self.irq)
            .saturating_add(self.softirq)
            .saturating_add(self.steal)
            .saturating_add(self.guest)
            .saturating_add(self.guest_nice)
    }

    /// Calculate ticks spent in any non-idle state.
    #[must_use]
    pub const fn busy(&self) -> u64 {
        self.total().saturating_sub(self.idle)
    }

    /// Parse counters from a `/proc/stat` CPU row (`cpu ...` or `cpuN ...`).
    ///
    /// At least the first four fields (user, nice, system, idle) must be
    /// present. Missing trailing fields default to 0 and fields beyond the
    /// ten standard ones are ignored, so newer kernels that append columns
    /// still parse.
    ///
    /// # Errors
    ///
    /// Returns a [`StatError::Parse`] if the row is not a CPU row, contains
    /// non-numeric counter fields, or has fewer than four of them.
    pub fn parse_from_stat_line(line: &str) -> Result<Self> {
        let label = line
            .split_whitespace()
            .next()
            .ok_or_else(|| StatError::parse("Empty line"))?;
        if !label.starts_with("cpu") {
            return Err(StatError::parse(format!(
                "Line does not start with 'cpu': {label:?}"
            )));
        }

        let values: std::result::Result<Vec<u64>, _> = line
            .split_whitespace()
            .skip(1) // Skip "cpu" or "cpuN"
            .take(10) // Take up to 10 values
            .map(str::parse)
            .collect();

        let values = values
            .map_err(|e| StatError::parse_with_source("Failed to parse counter fields", e))?;

        if values.len() < 4 {
            return Err(StatError::parse(format!(
                "Insufficient counter fields: expected at least 4, got {}",
                values.len()
            )));
        }

        Ok(Self {
            user: values[0],
            nice: values[1],
            system: values[2],
            idle: values[3],
            iowait: values.get(4).copied().unwrap_or(0),
            irq: values.get(5).copied().unwrap_or(0),
            softirq: values.get(6).copied().unwrap_or(0),
            steal: values.get(7).copied().unwrap_or(0),
            guest: values.get(8).copied().unwrap_or(0),
            guest_nice: values.get(9).copied().unwrap_or(0),
        })
    }
}

/// One point-in-time reading of every CPU row.
///
/// Entries keep the kernel's order: the all-cores aggregate row first,
/// then one entry per core. Consumers index into `cores` positionally,
/// so index 0 is always the aggregate and index N is core N-1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Counter rows in file order, aggregate first.
    pub cores: Vec<CoreCounters>,
}

impl CounterSnapshot {
    /// Parse the leading CPU rows out of full `/proc/stat` content.
    ///
    /// Scanning stops at the first line that does not start with `cpu`;
    /// the kernel groups all CPU rows at the top of the file. A row with
    /// malformed counter fields is dropped and scanning continues, so one
    /// bad row does not take out the whole reading.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut cores = Vec::new();
        for line in content.lines() {
            if !line.starts_with("cpu") {
                break;
            }
            match CoreCounters::parse_from_stat_line(line) {
                Ok(counters) => cores.push(counters),
                Err(err) => tracing::debug!(%err, "dropping unparseable cpu row"),
            }
        }
        Self { cores }
    }

    /// Number of counter rows, the aggregate included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cores.len()
    }

    /// Whether the snapshot contains no rows at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }
}

impl From<Vec<CoreCounters>> for CounterSnapshot {
    fn from(cores: Vec<CoreCounters>) -> Self {
        Self { cores }
    }
}

/// Reader for the kernel's CPU accounting file.
///
/// The path defaults to [`StatReader::PROC_STAT_PATH`] but can point at
/// any file with the same layout, which keeps the parsing and delta logic
/// testable without a live kernel.
#[derive(Debug, Clone)]
pub struct StatReader {
    path: PathBuf,
}

impl StatReader {
    /// Path to the proc stat file.
    pub const PROC_STAT_PATH: &'static str = "/proc/stat";

    /// Create a reader for the standard `/proc/stat` location.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: PathBuf::from(Self::PROC_STAT_PATH),
        }
    }

    /// Create a reader for an alternate stat file (useful for testing).
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this reader polls.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the current counter snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StatError::Io`] if the file cannot be read and
    /// [`StatError::InvalidData`] if its content yields no CPU rows.
    pub fn read(&self) -> Result<CounterSnapshot> {
        let content = fs::read_to_string(&self.path)?;
        let snapshot = CounterSnapshot::parse(&content);
        if snapshot.is_empty() {
            return Err(StatError::invalid_data(format!(
                "No cpu rows found in {}",
                self.path.display()
            )));
        }
        Ok(snapshot)
    }

    /// Check that the accounting file exists and is readable.
    ///
    /// # Errors
    ///
    /// Returns [`StatError::Unavailable`] when the file is missing and
    /// [`StatError::PermissionDenied`] when it exists but cannot be read.
    pub fn check_availability(&self) -> Result<()> {
        if !self.path.exists() {
            return Err(StatError::unavailable(format!(
                "{} does not exist (not a Linux system?)",
                self.path.display()
            )));
        }

        // Try to read it to make sure we have permission
        self.read().map_err(|e| match e {
            StatError::Io(io_err) if io_err.kind() == std::io::ErrorKind::PermissionDenied => {
                StatError::permission_denied(self.path.display().to_string())
            }
            other => other,
        })?;

        Ok(())
    }
}

impl Default for StatReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_STAT: &str = "\
cpu  4705 356 584 3699 23 23 0 0 0 0
cpu0 1200 100 150 900 10 5 0 0 0 0
cpu1 1150 90 140 950 8 6 0 0 0 0
intr 114930548 113199788 3 0 5 263 0 4 [...]
ctxt 1990473
btime 1062191376
";

    #[test]
    fn test_counters_parsing_full_row() {
        let line = "cpu  1234 5678 9012 3456 7890 1234 5678 9012 111 222";
        let counters = CoreCounters::parse_from_stat_line(line).unwrap();

        assert_eq!(counters.user, 1234);
        assert_eq!(counters.nice, 5678);
        assert_eq!(counters.system, 9012);
        assert_eq!(counters.idle, 3456);
        assert_eq!(counters.iowait, 7890);
        assert_eq!(counters.irq, 1234);
        assert_eq!(counters.softirq, 5678);
        assert_eq!(counters.steal, 9012);
        assert_eq!(counters.guest, 111);
        assert_eq!(counters.guest_nice, 222);
    }

    #[test]
    fn test_counters_parsing_minimal_row() {
        let line = "cpu0 100 200 300 400";
        let counters = CoreCounters::parse_from_stat_line(line).unwrap();

        assert_eq!(counters.user, 100);
        assert_eq!(counters.nice, 200);
        assert_eq!(counters.system, 300);
        assert_eq!(counters.idle, 400);
        assert_eq!(counters.iowait, 0);
        assert_eq!(counters.guest_nice, 0);
    }

    #[test]
    fn test_counters_parsing_extra_fields_ignored() {
        // Kernels are free to append columns; the first ten still win.
        let line = "cpu  1 2 3 4 5 6 7 8 9 10 999 888";
        let counters = CoreCounters::parse_from_stat_line(line).unwrap();

        assert_eq!(counters.guest_nice, 10);
        assert_eq!(counters.total(), 55);
    }

    #[test]
    fn test_counters_parsing_rejects_garbage() {
        assert!(CoreCounters::parse_from_stat_line("intr 1 2 3 4").is_err());
        assert!(CoreCounters::parse_from_stat_line("cpu0 1 2 x 4").is_err());
        assert!(CoreCounters::parse_from_stat_line("cpu0 1 2 3").is_err());
        assert!(CoreCounters::parse_from_stat_line("").is_err());
    }

    #[test]
    fn test_total_and_busy() {
        let counters = CoreCounters {
            user: 100,
            nice: 10,
            system: 50,
            idle: 800,
            iowait: 30,
            irq: 5,
            softirq: 3,
            steal: 2,
            guest: 0,
            guest_nice: 0,
        };

        assert_eq!(counters.total(), 1000);
        assert_eq!(counters.busy(), 200);
    }

    #[test]
    fn test_total_saturates_on_implausible_counters() {
        // with_path accepts arbitrary stat-shaped files, so sums must not
        // overflow even when fields sit at the integer limit.
        let line = format!("cpu0 {} {} {} 1", u64::MAX, u64::MAX, u64::MAX);
        let counters = CoreCounters::parse_from_stat_line(&line).unwrap();

        assert_eq!(counters.total(), u64::MAX);
        assert_eq!(counters.busy(), u64::MAX - 1);
    }

    #[test]
    fn test_snapshot_parsing_stops_at_first_non_cpu_line() {
        let snapshot = CounterSnapshot::parse(SAMPLE_STAT);

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.cores[0].user, 4705);
        assert_eq!(snapshot.cores[1].user, 1200);
        assert_eq!(snapshot.cores[2].user, 1150);

        // Parsing the same content again yields the same snapshot.
        assert_eq!(snapshot, CounterSnapshot::parse(SAMPLE_STAT));
    }

    #[test]
    fn test_snapshot_parsing_drops_malformed_row() {
        let content = "\
cpu  100 0 0 800 50 0 0 0 0 0
cpu0 garbage fields here
cpu1 60 0 0 400 25 0 0 0 0 0
intr 12345
";
        let snapshot = CounterSnapshot::parse(content);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.cores[1].user, 60);
    }

    #[test]
    fn test_snapshot_parsing_empty_content() {
        assert!(CounterSnapshot::parse("").is_empty());
        assert!(CounterSnapshot::parse("intr 1 2 3\nctxt 99\n").is_empty());
    }

    #[test]
    fn test_reader_reads_snapshot_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_STAT.as_bytes()).unwrap();

        let reader = StatReader::with_path(file.path());
        let snapshot = reader.read().unwrap();

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.cores[0].total(), 4705 + 356 + 584 + 3699 + 23 + 23);
    }

    #[test]
    fn test_reader_missing_file_is_io_error() {
        let reader = StatReader::with_path("/nonexistent/proc/stat");
        assert!(matches!(reader.read(), Err(StatError::Io(_))));
    }

    #[test]
    fn test_reader_rejects_file_without_cpu_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"intr 1 2 3\nctxt 99\n").unwrap();

        let reader = StatReader::with_path(file.path());
        assert!(matches!(reader.read(), Err(StatError::InvalidData { .. })));
    }

    #[test]
    fn test_check_availability_missing_file() {
        let reader = StatReader::with_path("/nonexistent/proc/stat");
        assert!(matches!(
            reader.check_availability(),
            Err(StatError::Unavailable { .. })
        ));
    }

    #[test]
    fn test_check_availability_readable_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_STAT.as_bytes()).unwrap();

        let reader = StatReader::with_path(file.path());
        assert!(reader.check_availability().is_ok());
    }
}
