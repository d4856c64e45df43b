//! Units formatting and conversion utilities
//!
//! Rate calculations shared by the benchmarks' report lines.

use std::time::Duration;

const KIB: f64 = 1024.0;

/// Format bytes into human-readable size with appropriate units
///
/// # Examples
/// ```
/// use devbench::util::units::format_bytes;
///
/// assert_eq!(format_bytes(4096), "4.0 KiB");
/// assert_eq!(format_bytes(1048576), "1.0 MiB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];

    let mut size = bytes as f64;
    let mut unit_index = 0;
    while size >= KIB && unit_index < UNITS.len() - 1 {
        size /= KIB;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Bandwidth in KiB per second.
///
/// Working in KiB keeps large byte counts well inside `f64` precision.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use devbench::util::units::calculate_kib_per_sec;
///
/// let kib = calculate_kib_per_sec(2048, Duration::from_secs(2));
/// assert!((kib - 1.0).abs() < 1e-9);
/// ```
pub fn calculate_kib_per_sec(bytes: u64, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 0.0;
    }

    (bytes as f64 / KIB) / duration.as_secs_f64()
}

pub fn kib_to_mib(kib: f64) -> f64 {
    kib / KIB
}

/// Operations per whole elapsed second.
///
/// Sub-second remainders are dropped; a run shorter than one second is
/// divided by 1.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use devbench::util::units::calculate_whole_second_iops;
///
/// assert_eq!(calculate_whole_second_iops(1999, Duration::from_millis(1999)), 1999);
/// assert_eq!(calculate_whole_second_iops(3000, Duration::from_millis(2500)), 1500);
/// ```
pub fn calculate_whole_second_iops(operations: u64, duration: Duration) -> u64 {
    operations / duration.as_secs().max(1)
}
