//! Benchmark engine module
//!
//! The random block I/O loop and the micro benchmark routines.

pub mod micro;
pub mod random;

// Re-export commonly used types
pub use micro::MicroBenchmark;
pub use random::{random_offset, OpFailure, RandomBenchmark};
