//! Random read/write IOPS of a raw block device.
//!
//! Without `-o`, closing the device after writes blocks until dirty
//! buffers are flushed; the reported rate includes that time. Run write
//! tests both with and without `-o` to see the difference.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use devbench::args::RandIoArgs;
use devbench::bench::RandomBenchmark;
use devbench::config::RunOptions;
use devbench::logger;

fn main() -> ExitCode {
    logger::init();

    let args = match RandIoArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    tracing::debug!(?args, "parsed arguments");

    let bench = match RunOptions::try_from(args).and_then(RandomBenchmark::new) {
        Ok(bench) => bench,
        Err(err) => {
            eprintln!("{}", err);
            if err.is_usage() {
                eprintln!("{}", RandIoArgs::command().render_usage());
            }
            return ExitCode::FAILURE;
        }
    };

    let device = match bench.open() {
        Ok(device) => device,
        Err(err) => {
            tracing::debug!(error = %err, "open failed");
            eprintln!("Cannot open block device {}", bench.options().device.display());
            return ExitCode::FAILURE;
        }
    };

    let mut rng = bench.seeded_rng();
    let report = bench.run_on(device, &mut rng);
    println!("{}", report);

    ExitCode::SUCCESS
}
