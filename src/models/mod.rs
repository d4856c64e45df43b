//! Data models module
//!
//! Run results and the running statistic shared by the benchmarks.

pub mod result;
pub mod stats;

// Re-export commonly used types
pub use result::{IopsReport, RunSummary};
pub use stats::RunningStatistic;
