//! Process priority and CPU pinning
//!
//! Micro benchmark timings are only meaningful on an uncontended core, so
//! the process raises its priority and pins itself to a single CPU before
//! any routine runs.

use crate::{BenchError, Result, BENCH_PRIORITY};

/// Raised priority and single-core affinity, held for the rest of the
/// process.
///
/// There is intentionally no release: both settings are process-wide and
/// the process exits as soon as the benchmark ends, which is when the
/// kernel discards them.
#[derive(Debug)]
pub struct SchedulingLock {
    cpu: usize,
}

impl SchedulingLock {
    /// Raise the priority, then pin to `cpu_to_lock` or to the highest
    /// core in the current affinity set
    pub fn acquire(cpu_to_lock: Option<usize>) -> Result<Self> {
        raise_priority(BENCH_PRIORITY)?;

        let allowed = allowed_cpus()?;
        let cpu = select_cpu(&allowed, cpu_to_lock)?;
        pin_to_cpu(cpu)?;

        tracing::debug!(cpu, priority = BENCH_PRIORITY, "scheduling locked");
        Ok(Self { cpu })
    }

    /// Core the process is pinned to
    pub fn cpu(&self) -> usize {
        self.cpu
    }
}

/// Pick the core to lock to from the allowed set
pub fn select_cpu(allowed: &[usize], requested: Option<usize>) -> Result<usize> {
    match requested {
        Some(cpu) if allowed.contains(&cpu) => Ok(cpu),
        Some(cpu) => Err(BenchError::AffinityError(format!(
            "Cpu {} does not exist.",
            cpu
        ))),
        None => allowed.iter().max().copied().ok_or_else(|| {
            BenchError::AffinityError("Cannot find any valid cpu to lock.".to_string())
        }),
    }
}

#[cfg(target_os = "linux")]
mod linux_impl {
    use super::*;
    use std::{io, mem};

    pub fn raise_priority(nice: i32) -> Result<()> {
        // SAFETY: setpriority only reads its scalar arguments.
        let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS, 0, nice) };
        if rc != 0 {
            return Err(BenchError::PriorityError(
                io::Error::last_os_error().to_string(),
            ));
        }
        Ok(())
    }

    pub fn allowed_cpus() -> Result<Vec<usize>> {
        // SAFETY: an all-zero cpu_set_t is a valid empty set, and the
        // kernel writes at most `size_of::<cpu_set_t>()` bytes into it.
        let set = unsafe {
            let mut set: libc::cpu_set_t = mem::zeroed();
            if libc::sched_getaffinity(0, mem::size_of::<libc::cpu_set_t>(), &mut set) != 0 {
                return Err(BenchError::AffinityError(format!(
                    "sched_getaffinity failed: {}",
                    io::Error::last_os_error()
                )));
            }
            set
        };

        let cpus = (0..libc::CPU_SETSIZE as usize)
            // SAFETY: `cpu` is below CPU_SETSIZE.
            .filter(|&cpu| unsafe { libc::CPU_ISSET(cpu, &set) })
            .collect();
        Ok(cpus)
    }

    pub fn pin_to_cpu(cpu: usize) -> Result<()> {
        // SAFETY: `cpu` comes from the allowed set, so it is below
        // CPU_SETSIZE, and the set outlives the call.
        let rc = unsafe {
            let mut set: libc::cpu_set_t = mem::zeroed();
            libc::CPU_ZERO(&mut set);
            libc::CPU_SET(cpu, &mut set);
            libc::sched_setaffinity(0, mem::size_of::<libc::cpu_set_t>(), &set)
        };
        if rc != 0 {
            return Err(BenchError::AffinityError(format!(
                "sched_setaffinity failed: {}",
                io::Error::last_os_error()
            )));
        }
        Ok(())
    }
}

#[cfg(not(target_os = "linux"))]
mod fallback_impl {
    use super::*;

    pub fn raise_priority(_nice: i32) -> Result<()> {
        Err(BenchError::PriorityError(
            "not supported on this platform".to_string(),
        ))
    }

    pub fn allowed_cpus() -> Result<Vec<usize>> {
        Err(BenchError::AffinityError(
            "not supported on this platform".to_string(),
        ))
    }

    pub fn pin_to_cpu(_cpu: usize) -> Result<()> {
        Err(BenchError::AffinityError(
            "not supported on this platform".to_string(),
        ))
    }
}

#[cfg(target_os = "linux")]
pub use linux_impl::{allowed_cpus, pin_to_cpu, raise_priority};

#[cfg(not(target_os = "linux"))]
pub use fallback_impl::{allowed_cpus, pin_to_cpu, raise_priority};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_last_allowed_cpu() {
        assert_eq!(select_cpu(&[0, 1, 3], None).unwrap(), 3);
        assert_eq!(select_cpu(&[2], None).unwrap(), 2);
    }

    #[test]
    fn test_select_requested_cpu() {
        assert_eq!(select_cpu(&[0, 1, 3], Some(1)).unwrap(), 1);

        let err = select_cpu(&[0, 1, 3], Some(2)).unwrap_err();
        assert!(matches!(err, BenchError::AffinityError(_)));
        assert_eq!(err.to_string(), "CPU affinity error: Cpu 2 does not exist.");
    }

    #[test]
    fn test_select_from_empty_set() {
        assert!(select_cpu(&[], None).is_err());
        assert!(select_cpu(&[], Some(0)).is_err());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_allowed_cpus_not_empty() {
        let cpus = allowed_cpus().unwrap();
        assert!(!cpus.is_empty());
        assert!(cpus.windows(2).all(|w| w[0] < w[1]));
    }
}
