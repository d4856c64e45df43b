//! Benchmark result models

use std::fmt;
use std::time::Duration;

use crate::models::RunningStatistic;
use crate::util::units::calculate_whole_second_iops;

/// Outcome of a random I/O run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IopsReport {
    /// Operations issued, including failed ones
    pub operations: u64,
    /// Operations whose seek, read or write failed or came up short
    pub failures: u64,
    /// Time from the first operation until the device was closed
    pub elapsed: Duration,
}

impl IopsReport {
    /// Operations per whole elapsed second
    pub fn iops(&self) -> u64 {
        calculate_whole_second_iops(self.operations, self.elapsed)
    }
}

impl fmt::Display for IopsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} iops/sec", self.iops())
    }
}

/// Outcome of a micro benchmark run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Iterations completed
    pub iterations: u64,
    /// Running statistic, kept only when averages were requested
    pub average: Option<RunningStatistic>,
}
