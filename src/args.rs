//! Command line arguments
//!
//! Both tools parse with `clap` and convert into a validated configuration
//! through `TryFrom`, so option spelling lives here and value checks live
//! in [`crate::config`].

use std::path::PathBuf;

use crate::config::{BenchmarkConfig, BenchmarkKind, IoMode, RunOptions};
use crate::{BenchError, Result, DEFAULT_DATA_SIZE};

/// Arguments of `rand_io_perf`
#[derive(Debug, clap::Parser)]
#[command(
    name = "rand_io_perf",
    about = "Random 4 KiB read/write IOPS against a raw block device",
    override_usage = "rand_io_perf [ -r | -w ] [-o] <size_in_mb> <block_dev>",
    args_override_self = true
)]
pub struct RandIoArgs {
    /// Read mode (default)
    #[arg(short = 'r')]
    pub read: bool,

    /// Write mode
    #[arg(short = 'w')]
    pub write: bool,

    /// Open the device with synchronous writes (write mode only)
    #[arg(short = 'o')]
    pub sync: bool,

    /// Size of the region to exercise, in megabytes
    pub size_in_mb: u64,

    /// Block device to test
    pub block_dev: PathBuf,
}

impl TryFrom<RandIoArgs> for RunOptions {
    type Error = BenchError;

    fn try_from(args: RandIoArgs) -> Result<Self> {
        let mode = if args.write { IoMode::Write } else { IoMode::Read };

        // Can only sync in write mode; clear it rather than complain
        let sync = args.sync && mode == IoMode::Write;
        if args.sync && !sync {
            tracing::debug!("ignoring -o outside of write mode");
        }

        let options = RunOptions::new(args.block_dev, args.size_in_mb)
            .with_mode(mode)
            .with_sync_writes(sync);
        options.validate()?;
        Ok(options)
    }
}

/// Arguments of `micro_bench`
#[derive(Debug, clap::Parser)]
#[command(
    name = "micro_bench",
    about = "Micro-benchmarks of sleep, cpu speed, memcpy, memset and memory reads",
    allow_negative_numbers = true,
    args_override_self = true,
    after_help = BENCHMARK_HELP
)]
pub struct MicroBenchArgs {
    /// For memcpy/memset/memread, the approximate number of bytes
    /// manipulated in each iteration
    #[arg(
        long = "data_size",
        value_name = "DATA_BYTES",
        default_value_t = DEFAULT_DATA_SIZE as i64
    )]
    pub data_size: i64,

    /// Print the average and standard deviation of all iterations
    #[arg(long = "print_average")]
    pub print_average: bool,

    /// Do not print any values in each iteration
    #[arg(long = "no_print_each_iter")]
    pub no_print_each_iter: bool,

    /// Lock to the specified core. The default is the last core found
    #[arg(long = "lock_to_cpu", value_name = "CORE")]
    pub lock_to_cpu: Option<i64>,

    /// Align the destination pointer to ALIGN. The default is the allocator's
    #[arg(long = "dst_align", value_name = "ALIGN", default_value_t = 0)]
    pub dst_align: i64,

    /// Align the source pointer to ALIGN. The default is the allocator's
    #[arg(long = "src_align", value_name = "ALIGN", default_value_t = 0)]
    pub src_align: i64,

    /// Benchmark to run
    #[arg(value_enum)]
    pub benchmark: BenchmarkKind,

    /// Seconds to sleep (sleep), unused (cpu) or buffer bytes (memset, memcpy, memread)
    #[arg(value_name = "ARG")]
    pub arg: i64,

    /// Number of iterations. Runs forever when omitted or -1
    #[arg(value_name = "ITERS")]
    pub iterations: Option<i64>,
}

/// ITERS value asking for an endless run
const UNBOUNDED_ITERATIONS: i64 = -1;

const BENCHMARK_HELP: &str = "\
Benchmarks:
  micro_bench sleep TIME_TO_SLEEP [ITERS]
  micro_bench cpu UNUSED [ITERS]
  micro_bench [--dst_align ALIGN] memset NUM_BYTES [ITERS]
  micro_bench [--src_align ALIGN] [--dst_align ALIGN] memcpy NUM_BYTES [ITERS]
  micro_bench [--src_align ALIGN] memread NUM_BYTES [ITERS]";

impl TryFrom<MicroBenchArgs> for BenchmarkConfig {
    type Error = BenchError;

    fn try_from(args: MicroBenchArgs) -> Result<Self> {
        let dst_align = non_negative(args.dst_align, "--dst_align")?;
        let src_align = non_negative(args.src_align, "--src_align")?;
        if args.data_size <= 0 {
            return Err(BenchError::ConfigError(
                "The --data_size option must be a positive number.".to_string(),
            ));
        }

        let config = BenchmarkConfig::new(args.benchmark, args.arg)
            .with_iterations(iteration_limit(args.iterations)?)
            .with_dst_align(dst_align)
            .with_src_align(src_align)
            .with_data_size(args.data_size as u64)
            .with_lock_to_cpu(args.lock_to_cpu.and_then(|cpu| usize::try_from(cpu).ok()))
            .with_print_average(args.print_average)
            .with_print_each_iter(!args.no_print_each_iter);
        config.validate()?;
        Ok(config)
    }
}

/// Iteration bound; an omitted count or -1 runs forever
fn iteration_limit(iterations: Option<i64>) -> Result<Option<u64>> {
    match iterations {
        None | Some(UNBOUNDED_ITERATIONS) => Ok(None),
        Some(iters) => u64::try_from(iters).map(Some).map_err(|_| {
            BenchError::ConfigError(format!(
                "The iteration count must be {} or greater than or equal to 0.",
                UNBOUNDED_ITERATIONS
            ))
        }),
    }
}

fn non_negative(value: i64, option: &str) -> Result<usize> {
    usize::try_from(value).map_err(|_| {
        BenchError::ConfigError(format!(
            "The {} option must be greater than or equal to 0.",
            option
        ))
    })
}
