//! Sleep, cpu and memory micro benchmarks
//!
//! Every routine times a fixed unit of work per iteration, optionally
//! printing each result and a final mean and standard deviation.

use std::hint::black_box;
use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::{BenchmarkConfig, BenchmarkKind};
use crate::io::AlignedBuffer;
use crate::models::{RunSummary, RunningStatistic};
use crate::util::units::{calculate_kib_per_sec, kib_to_mib};
use crate::{Result, CPU_SPIN_BOUND};

/// What a single iteration reports
#[derive(Debug, Clone, Copy)]
enum Measure {
    /// Elapsed seconds
    Seconds,
    /// Bandwidth over `bytes` touched, accumulated in KiB/s
    Bandwidth { bytes: u64 },
}

impl Measure {
    fn value(&self, elapsed: Duration) -> f64 {
        match self {
            Measure::Seconds => elapsed.as_secs_f64(),
            Measure::Bandwidth { bytes } => calculate_kib_per_sec(*bytes, elapsed),
        }
    }

    fn write_iteration<W: Write>(
        &self,
        out: &mut W,
        label: &str,
        elapsed: Duration,
        value: f64,
    ) -> std::io::Result<()> {
        match self {
            Measure::Seconds => writeln!(out, "{} took {:.6} seconds", label, value),
            Measure::Bandwidth { .. } => writeln!(
                out,
                "{} took {:.6} seconds ({:.6} MB/s)",
                label,
                elapsed.as_secs_f64(),
                kib_to_mib(value)
            ),
        }
    }

    fn write_average<W: Write>(
        &self,
        out: &mut W,
        label: &str,
        stat: &RunningStatistic,
    ) -> std::io::Result<()> {
        match self {
            Measure::Seconds => writeln!(
                out,
                "  {} average {:.6} seconds std dev {:.6}",
                label,
                stat.mean(),
                stat.std_dev()
            ),
            Measure::Bandwidth { .. } => writeln!(
                out,
                "  {} average {:.2} MB/s std dev {:.4}",
                label,
                kib_to_mib(stat.mean()),
                kib_to_mib(stat.std_dev())
            ),
        }
    }
}

/// Micro benchmark executor
pub struct MicroBenchmark {
    config: BenchmarkConfig,
    spin_bound: u32,
}

impl MicroBenchmark {
    /// Create a new micro benchmark executor
    pub fn new(config: BenchmarkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            spin_bound: CPU_SPIN_BOUND,
        })
    }

    /// Override the counter bound of the cpu benchmark
    pub fn with_spin_bound(mut self, bound: u32) -> Self {
        self.spin_bound = bound;
        self
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Print the benchmark name and run it, writing results to `out`
    pub fn run<W: Write>(&self, out: &mut W) -> Result<RunSummary> {
        writeln!(out, "{}", self.config.kind)?;

        match self.config.kind {
            BenchmarkKind::Sleep => self.run_sleep(out),
            BenchmarkKind::Cpu => self.run_cpu(out),
            BenchmarkKind::Memset => self.run_memset(out),
            BenchmarkKind::Memcpy => self.run_memcpy(out),
            BenchmarkKind::Memread => self.run_memread(out),
        }
    }

    fn run_sleep<W: Write>(&self, out: &mut W) -> Result<RunSummary> {
        let secs = self.config.sleep_secs();
        let delay = Duration::from_secs(secs);
        let label = format!("sleep({})", secs);

        self.time_iterations(out, &label, Measure::Seconds, || thread::sleep(delay))
    }

    fn run_cpu<W: Write>(&self, out: &mut W) -> Result<RunSummary> {
        let bound = self.spin_bound;

        self.time_iterations(out, "cpu", Measure::Seconds, || {
            for counter in 0..bound {
                black_box(counter);
            }
        })
    }

    fn run_memset<W: Write>(&self, out: &mut W) -> Result<RunSummary> {
        let size = self.config.buffer_size();
        let copies = self.config.copies();
        let mut dst = AlignedBuffer::new(size, self.config.dst_align)?;
        let measure = Measure::Bandwidth {
            bytes: copies * size as u64,
        };
        let label = format!("memset {}x{} bytes", copies, size);

        self.time_iterations(out, &label, measure, || {
            let dst = dst.as_mut_slice();
            for _ in 0..copies {
                dst.fill(0);
                black_box(&mut *dst);
            }
        })
    }

    fn run_memcpy<W: Write>(&self, out: &mut W) -> Result<RunSummary> {
        let size = self.config.buffer_size();
        let copies = self.config.copies();
        let src = AlignedBuffer::new(size, self.config.src_align)?;
        let mut dst = AlignedBuffer::new(size, self.config.dst_align)?;
        let measure = Measure::Bandwidth {
            bytes: copies * size as u64,
        };
        let label = format!("memcpy {}x{} bytes", copies, size);

        self.time_iterations(out, &label, measure, || {
            let src = src.as_slice();
            let dst = dst.as_mut_slice();
            for _ in 0..copies {
                dst.copy_from_slice(black_box(src));
                black_box(&mut *dst);
            }
        })
    }

    fn run_memread<W: Write>(&self, out: &mut W) -> Result<RunSummary> {
        let size = self.config.buffer_size();
        let copies = self.config.copies();
        let src = AlignedBuffer::new(size, self.config.src_align)?;
        let measure = Measure::Bandwidth {
            bytes: copies * size as u64,
        };
        let label = format!("read {}x{} bytes", copies, size);

        self.time_iterations(out, &label, measure, || {
            for _ in 0..copies {
                for word in src.as_slice().chunks_exact(4) {
                    black_box(u32::from_ne_bytes([word[0], word[1], word[2], word[3]]));
                }
            }
        })
    }

    /// Time `work` once per iteration until the configured count is
    /// reached, or forever without one
    fn time_iterations<W: Write>(
        &self,
        out: &mut W,
        label: &str,
        measure: Measure,
        mut work: impl FnMut(),
    ) -> Result<RunSummary> {
        let print_average = self.config.print_average;
        let print_each_iter = self.config.print_each_iter;
        let mut average = RunningStatistic::new();
        let mut iterations = 0u64;

        while self.config.iterations.map_or(true, |limit| iterations < limit) {
            let start = Instant::now();
            work();
            let elapsed = start.elapsed();

            let value = measure.value(elapsed);
            if print_average {
                average.add(value);
            }
            if print_each_iter {
                measure.write_iteration(out, label, elapsed, value)?;
            }
            iterations += 1;
        }

        if print_average {
            measure.write_average(out, label, &average)?;
        }

        Ok(RunSummary {
            iterations,
            average: print_average.then_some(average),
        })
    }
}
