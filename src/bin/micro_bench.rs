//! Micro-benchmarks of sleep, cpu speed, memset, memcpy and memory reads.

use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use devbench::args::MicroBenchArgs;
use devbench::bench::MicroBenchmark;
use devbench::config::BenchmarkConfig;
use devbench::logger;
use devbench::sched::SchedulingLock;

/// Status reported for every failure; the shell sees -1 as 255
const EXIT_FAILURE: u8 = 255;

fn main() -> ExitCode {
    logger::init();

    let args = match MicroBenchArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    tracing::debug!(?args, "parsed arguments");

    let bench = match BenchmarkConfig::try_from(args).and_then(MicroBenchmark::new) {
        Ok(bench) => bench,
        Err(err) => {
            eprintln!("{}", err);
            if err.is_usage() {
                eprintln!("{}", MicroBenchArgs::command().render_help());
            }
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    let lock = match SchedulingLock::acquire(bench.config().lock_to_cpu) {
        Ok(lock) => lock,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    tracing::debug!(cpu = lock.cpu(), benchmark = %bench.config().kind, "running");

    match bench.run(&mut io::stdout().lock()) {
        Ok(summary) => {
            tracing::debug!(iterations = summary.iterations, "finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
