//! # corestat-core
//!
//! Core library for corestat providing per-core CPU utilization tracking
//! from the kernel's cumulative accounting counters.
//!
//! ## Features
//!
//! - **Snapshot reading** - `/proc/stat` parsing with positional core indexing
//! - **Interval deltas** - Busy and iowait percentages between snapshots
//! - **Counter safety** - Resets and zero-width intervals degrade to "no data"
//! - **Configuration management** - RON-based config file with validation
//! - **Error handling** - Comprehensive error types with context
//!
//! ## Quick Start
//!
//! ```rust
//! use corestat_core::{CounterSnapshot, UtilizationEngine};
//!
//! let baseline = CounterSnapshot::parse("cpu  100 0 0 800 50 0 0 0 0 0\n");
//! let next = CounterSnapshot::parse("cpu  150 0 0 850 60 0 0 0 0 0\n");
//!
//! let mut engine = UtilizationEngine::new(0);
//! engine.compute(&baseline); // first snapshot only establishes baselines
//! let report = engine.compute(&next);
//!
//! let aggregate = &report.cores[0];
//! assert!((aggregate.busy_percent.unwrap() - 54.55).abs() < 0.01);
//! assert!((aggregate.iowait_percent.unwrap() - 9.09).abs() < 0.01);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod stat;

pub use config::{GlobalConfig, OutputFormat, OutputFormatParseError};
pub use engine::{CoreUsage, UsageReport, UtilizationEngine};
pub use error::{Result, StatError};
pub use stat::{CoreCounters, CounterSnapshot, StatReader};
