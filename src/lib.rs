//! devbench - device characterization benchmarks
//!
//! Library behind two standalone tools: `rand_io_perf`, a random-offset
//! raw block-device IOPS tester, and `micro_bench`, which times sleep,
//! CPU spinning and memory set/copy/read bandwidth.

use std::fmt;
use std::time::Duration;

pub mod args;
pub mod bench;
pub mod config;
pub mod io;
pub mod logger;
pub mod models;
pub mod sched;
pub mod util;

// Common error types
#[derive(Debug)]
pub enum BenchError {
    /// I/O operation failed
    IoError(std::io::Error),
    /// Bad or missing arguments, or a value that fails validation
    ConfigError(String),
    /// Permission denied opening the device or changing scheduling
    PermissionDenied(String),
    /// Raising the process priority failed
    PriorityError(String),
    /// Querying or setting the CPU affinity failed
    AffinityError(String),
    /// A benchmark buffer could not be allocated
    AllocationError(String),
}

impl fmt::Display for BenchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenchError::IoError(err) => write!(f, "I/O error: {}", err),
            BenchError::ConfigError(msg) => write!(f, "{}", msg),
            BenchError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            BenchError::PriorityError(msg) => write!(f, "Unable to raise priority: {}", msg),
            BenchError::AffinityError(msg) => write!(f, "CPU affinity error: {}", msg),
            BenchError::AllocationError(msg) => write!(f, "Allocation failed: {}", msg),
        }
    }
}

impl std::error::Error for BenchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BenchError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BenchError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                BenchError::PermissionDenied(format!("Access denied: {}", err))
            }
            _ => BenchError::IoError(err),
        }
    }
}

impl BenchError {
    /// Whether this error stems from the command line rather than the environment
    pub fn is_usage(&self) -> bool {
        matches!(self, BenchError::ConfigError(_))
    }
}

/// Result type alias for benchmark operations
pub type Result<T> = std::result::Result<T, BenchError>;

/// Size of every random I/O operation
pub const IO_BLOCK_SIZE: u64 = 4096;
/// Wall-clock length of a random I/O run
pub const IO_TEST_DURATION: Duration = Duration::from_secs(10);
/// Default bytes touched per memory benchmark iteration
pub const DEFAULT_DATA_SIZE: u64 = 1_000_000_000;
/// Counter bound of the cpu spin loop
pub const CPU_SPIN_BOUND: u32 = 100_000_000;
/// Nice value requested before running micro benchmarks
pub const BENCH_PRIORITY: i32 = -20;
