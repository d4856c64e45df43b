//! Benchmark configuration
//!
//! Validated, immutable run parameters for both tools. The command line
//! is turned into these structures by [`crate::args`].

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::{BenchError, Result, DEFAULT_DATA_SIZE, IO_BLOCK_SIZE, IO_TEST_DURATION};

/// Random I/O run options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Block device (or file) under test
    pub device: PathBuf,
    /// Read or write operations
    pub mode: IoMode,
    /// Open the device with `O_SYNC`; only honoured in write mode
    pub sync_writes: bool,
    /// Region of the device exercised, in megabytes
    pub size_mb: u64,
    /// Wall-clock length of the run
    pub duration: Duration,
}

/// Operation issued at every random offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IoMode {
    #[default]
    Read,
    Write,
}

impl RunOptions {
    /// Create read-mode options for `size_mb` megabytes of `device`
    pub fn new(device: PathBuf, size_mb: u64) -> Self {
        Self {
            device,
            mode: IoMode::Read,
            sync_writes: false,
            size_mb,
            duration: IO_TEST_DURATION,
        }
    }

    /// Set the operation mode
    pub fn with_mode(mut self, mode: IoMode) -> Self {
        self.mode = mode;
        self
    }

    /// Request synchronous writes
    pub fn with_sync_writes(mut self, sync: bool) -> Self {
        self.sync_writes = sync;
        self
    }

    /// Set the run duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Whether the device is opened with synchronous writes.
    ///
    /// Synchronous writes are meaningless for reads, so the flag is
    /// ignored outside write mode.
    pub fn uses_sync_writes(&self) -> bool {
        self.sync_writes && self.mode == IoMode::Write
    }

    /// Number of `IO_BLOCK_SIZE` blocks in the exercised region
    pub fn block_count(&self) -> u64 {
        self.size_mb * (1024 * 1024) / IO_BLOCK_SIZE
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.size_mb == 0 {
            return Err(BenchError::ConfigError(
                "Size must be at least 1 MB".to_string(),
            ));
        }

        if self.size_mb.checked_mul(1024 * 1024).is_none() {
            return Err(BenchError::ConfigError(format!(
                "Size too large: {} MB",
                self.size_mb
            )));
        }

        if self.duration.is_zero() {
            return Err(BenchError::ConfigError(
                "Duration must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Micro benchmark selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BenchmarkKind {
    Sleep,
    Cpu,
    Memset,
    Memcpy,
    Memread,
}

impl BenchmarkKind {
    /// Name as given on the command line
    pub fn name(&self) -> &'static str {
        match self {
            BenchmarkKind::Sleep => "sleep",
            BenchmarkKind::Cpu => "cpu",
            BenchmarkKind::Memset => "memset",
            BenchmarkKind::Memcpy => "memcpy",
            BenchmarkKind::Memread => "memread",
        }
    }

    /// Whether the first argument is a buffer size in bytes
    pub fn uses_buffer(&self) -> bool {
        matches!(
            self,
            BenchmarkKind::Memset | BenchmarkKind::Memcpy | BenchmarkKind::Memread
        )
    }
}

impl fmt::Display for BenchmarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Micro benchmark configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkConfig {
    /// Selected benchmark
    pub kind: BenchmarkKind,
    /// First argument: sleep seconds, unused for cpu, buffer size otherwise
    pub arg: i64,
    /// Iteration count, `None` runs forever
    pub iterations: Option<u64>,
    /// Destination buffer alignment, 0 for allocator default
    pub dst_align: usize,
    /// Source buffer alignment, 0 for allocator default
    pub src_align: usize,
    /// Bytes touched per iteration by the memory benchmarks
    pub data_size: u64,
    /// Core to pin to, `None` for the highest allowed core
    pub lock_to_cpu: Option<usize>,
    /// Print mean and standard deviation at the end
    pub print_average: bool,
    /// Print a line per iteration
    pub print_each_iter: bool,
}

impl BenchmarkConfig {
    /// Create a configuration with default options
    pub fn new(kind: BenchmarkKind, arg: i64) -> Self {
        Self {
            kind,
            arg,
            iterations: None,
            dst_align: 0,
            src_align: 0,
            data_size: DEFAULT_DATA_SIZE,
            lock_to_cpu: None,
            print_average: false,
            print_each_iter: true,
        }
    }

    pub fn with_iterations(mut self, iterations: Option<u64>) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_dst_align(mut self, align: usize) -> Self {
        self.dst_align = align;
        self
    }

    pub fn with_src_align(mut self, align: usize) -> Self {
        self.src_align = align;
        self
    }

    pub fn with_data_size(mut self, data_size: u64) -> Self {
        self.data_size = data_size;
        self
    }

    pub fn with_lock_to_cpu(mut self, cpu: Option<usize>) -> Self {
        self.lock_to_cpu = cpu;
        self
    }

    pub fn with_print_average(mut self, print: bool) -> Self {
        self.print_average = print;
        self
    }

    pub fn with_print_each_iter(mut self, print: bool) -> Self {
        self.print_each_iter = print;
        self
    }

    /// Buffer size for the memory benchmarks. Only meaningful after `validate`.
    pub fn buffer_size(&self) -> usize {
        self.arg.max(0) as usize
    }

    /// Seconds slept per iteration. Only meaningful after `validate`.
    pub fn sleep_secs(&self) -> u64 {
        self.arg.max(0) as u64
    }

    /// Buffer repeats per iteration; a remainder of `data_size` is dropped
    pub fn copies(&self) -> u64 {
        match self.buffer_size() {
            0 => 0,
            size => self.data_size / size as u64,
        }
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.data_size == 0 {
            return Err(BenchError::ConfigError(
                "The --data_size option must be a positive number.".to_string(),
            ));
        }

        if !is_valid_alignment(self.dst_align) {
            return Err(BenchError::ConfigError(
                "The --dst_align option must be a power of 2.".to_string(),
            ));
        }

        if !is_valid_alignment(self.src_align) {
            return Err(BenchError::ConfigError(
                "The --src_align option must be a power of 2.".to_string(),
            ));
        }

        match self.kind {
            BenchmarkKind::Sleep if self.arg < 0 => Err(BenchError::ConfigError(
                "The sleep time must be greater than or equal to 0.".to_string(),
            )),
            kind if kind.uses_buffer() && self.arg <= 0 => Err(BenchError::ConfigError(
                format!("The {} buffer size must be a positive number.", kind),
            )),
            _ => Ok(()),
        }
    }
}

/// Alignments are either 0 (no constraint) or a power of two
pub fn is_valid_alignment(align: usize) -> bool {
    align == 0 || align.is_power_of_two()
}
