//! I/O operations module
//!
//! Raw device access for the random I/O benchmark, the entropy-backed
//! seed, and aligned heap buffers for the memory benchmarks.

pub mod buffer;
pub mod disk;
pub mod entropy;

pub use buffer::AlignedBuffer;
pub use disk::{open_device, DirectFile, RawDevice};
pub use entropy::{read_seed, seed_or_default, ENTROPY_SOURCE};
