//! Utility functions module
//!
//! Unit conversions for throughput and rate reporting.

pub mod units;

pub use units::{calculate_kib_per_sec, calculate_whole_second_iops, format_bytes, kib_to_mib};
