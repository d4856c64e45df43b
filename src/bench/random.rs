//! Random-offset block I/O benchmark
//!
//! Issues 4 KiB reads or writes at uniformly random block-aligned offsets
//! for a fixed wall-clock duration and reports operations per second.

use std::fmt;
use std::io::SeekFrom;
use std::path::Path;
use std::time::Instant;

use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::{
    config::{IoMode, RunOptions},
    io::{disk::open_device, entropy::seed_or_default, DirectFile, RawDevice, ENTROPY_SOURCE},
    models::IopsReport,
    util::units::format_bytes,
    Result, IO_BLOCK_SIZE,
};

/// A single operation that did not go through in full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpFailure {
    Seek,
    ShortWrite,
    ShortRead,
}

impl fmt::Display for OpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpFailure::Seek => write!(f, "lseek failed"),
            OpFailure::ShortWrite => write!(f, "Short write"),
            OpFailure::ShortRead => write!(f, "Short read"),
        }
    }
}

/// Random I/O benchmark executor
pub struct RandomBenchmark {
    options: RunOptions,
}

impl RandomBenchmark {
    /// Create a new random benchmark executor
    pub fn new(options: RunOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Open the device under test
    pub fn open(&self) -> Result<RawDevice> {
        let device = open_device(&self.options.device, self.options.uses_sync_writes())?;
        Ok(device)
    }

    /// Offset generator seeded from the OS entropy source
    pub fn seeded_rng(&self) -> SmallRng {
        let seed = seed_or_default(Path::new(ENTROPY_SOURCE));
        SmallRng::seed_from_u64(u64::from(seed))
    }

    /// Open the device, seed the generator and run
    pub fn run(&self) -> Result<IopsReport> {
        let device = self.open()?;
        let mut rng = self.seeded_rng();
        Ok(self.run_on(device, &mut rng))
    }

    /// Run against an already opened device.
    ///
    /// Failed or short operations are reported on stderr and still
    /// counted; the run always lasts the configured duration. The device is dropped before
    /// the final clock sample so a flush on close is part of the elapsed
    /// time.
    pub fn run_on<F: DirectFile, R: Rng>(&self, mut device: F, rng: &mut R) -> IopsReport {
        let block_count = self.options.block_count();
        let mut buf = vec![0u8; IO_BLOCK_SIZE as usize];
        let mut operations = 0u64;
        let mut failures = 0u64;

        tracing::debug!(
            device = %self.options.device.display(),
            mode = ?self.options.mode,
            sync = self.options.uses_sync_writes(),
            region = %format_bytes(block_count * IO_BLOCK_SIZE),
            "starting random I/O run"
        );

        let start_time = Instant::now();
        loop {
            let offset = random_offset(rng, block_count);
            let failed = self.issue(&mut device, offset, &mut buf);
            for failure in &failed {
                eprintln!("{}", failure);
            }
            if !failed.is_empty() {
                failures += 1;
            }
            operations += 1;

            if start_time.elapsed() >= self.options.duration {
                break;
            }
        }

        drop(device);
        let elapsed = start_time.elapsed();

        if failures > 0 {
            tracing::info!(failures, operations, "run finished with failed operations");
        }

        IopsReport {
            operations,
            failures,
            elapsed,
        }
    }

    /// Seek to `offset` and perform one operation. A failed seek does not
    /// skip the transfer, so both can fail for the same offset.
    fn issue<F: DirectFile>(
        &self,
        device: &mut F,
        offset: u64,
        buf: &mut [u8],
    ) -> Vec<OpFailure> {
        let mut failed = Vec::new();
        if let Err(err) = device.seek_direct(SeekFrom::Start(offset)) {
            tracing::debug!(offset, error = %err, "seek failed");
            failed.push(OpFailure::Seek);
        }

        let (transferred, failure) = match self.options.mode {
            IoMode::Write => (device.write_direct(buf), OpFailure::ShortWrite),
            IoMode::Read => (device.read_direct(buf), OpFailure::ShortRead),
        };
        match transferred {
            Ok(len) if len == buf.len() => {}
            Ok(len) => {
                tracing::debug!(offset, len, "partial transfer");
                failed.push(failure);
            }
            Err(err) => {
                tracing::debug!(offset, error = %err, "transfer failed");
                failed.push(failure);
            }
        }

        failed
    }
}

/// Uniformly random block-aligned offset in `[0, block_count * IO_BLOCK_SIZE)`
pub fn random_offset<R: Rng>(rng: &mut R, block_count: u64) -> u64 {
    rng.gen_range(0..block_count) * IO_BLOCK_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    /// Device that records offsets and can be told to fail
    #[derive(Default)]
    struct MockDevice {
        position: u64,
        offsets: Vec<u64>,
        reads: u64,
        writes: u64,
        fail_seeks: bool,
        short_by: usize,
    }

    impl DirectFile for MockDevice {
        fn seek_direct(&mut self, pos: SeekFrom) -> io::Result<u64> {
            if self.fail_seeks {
                return Err(io::Error::new(io::ErrorKind::InvalidInput, "bad seek"));
            }
            if let SeekFrom::Start(offset) = pos {
                self.position = offset;
                self.offsets.push(offset);
            }
            Ok(self.position)
        }

        fn read_direct(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            Ok(buf.len() - self.short_by)
        }

        fn write_direct(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes += 1;
            Ok(buf.len() - self.short_by)
        }
    }

    fn bench(size_mb: u64, mode: IoMode, duration: Duration) -> RandomBenchmark {
        let options = RunOptions::new(PathBuf::from("mock"), size_mb)
            .with_mode(mode)
            .with_duration(duration);
        RandomBenchmark::new(options).unwrap()
    }

    #[test]
    fn test_random_offsets_are_aligned_and_bounded() {
        let mut rng = SmallRng::seed_from_u64(7);
        let block_count = 256;
        for _ in 0..10_000 {
            let offset = random_offset(&mut rng, block_count);
            assert_eq!(offset % IO_BLOCK_SIZE, 0);
            assert!(offset < block_count * IO_BLOCK_SIZE);
        }
    }

    #[test]
    fn test_run_issues_offsets_within_region() {
        let bench = bench(2, IoMode::Read, Duration::from_millis(50));
        let mut device = MockDevice::default();
        let mut rng = SmallRng::seed_from_u64(42);

        let report = bench.run_on(&mut device, &mut rng);
        assert!(report.operations > 0);
        assert_eq!(report.failures, 0);
        assert_eq!(device.offsets.len() as u64, report.operations);
        assert_eq!(device.reads, report.operations);
        assert_eq!(device.writes, 0);
        assert!(report.elapsed >= Duration::from_millis(50));

        let limit = 2 * 1_048_576;
        assert!(device.offsets.iter().all(|&o| o % 4096 == 0 && o < limit));
    }

    #[test]
    fn test_failures_do_not_stop_the_run() {
        let bench = bench(1, IoMode::Write, Duration::from_millis(30));
        let mut device = MockDevice {
            fail_seeks: true,
            short_by: 1,
            ..Default::default()
        };
        let mut rng = SmallRng::seed_from_u64(1);

        let report = bench.run_on(&mut device, &mut rng);
        assert!(report.operations > 1);
        assert_eq!(report.failures, report.operations);
        assert_eq!(device.writes, report.operations);
        assert!(report.elapsed >= Duration::from_millis(30));
    }

    #[test]
    fn test_issue_reports_each_failure() {
        let mut device = MockDevice {
            fail_seeks: true,
            short_by: 1,
            ..Default::default()
        };
        let mut buf = vec![0u8; IO_BLOCK_SIZE as usize];

        let write = bench(1, IoMode::Write, Duration::from_millis(1));
        let failed = write.issue(&mut device, 4096, &mut buf);
        assert_eq!(failed, vec![OpFailure::Seek, OpFailure::ShortWrite]);

        let read = bench(1, IoMode::Read, Duration::from_millis(1));
        device.fail_seeks = false;
        let failed = read.issue(&mut device, 4096, &mut buf);
        assert_eq!(failed, vec![OpFailure::ShortRead]);

        device.short_by = 0;
        assert!(read.issue(&mut device, 4096, &mut buf).is_empty());
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(OpFailure::Seek.to_string(), "lseek failed");
        assert_eq!(OpFailure::ShortWrite.to_string(), "Short write");
        assert_eq!(OpFailure::ShortRead.to_string(), "Short read");
    }

    #[test]
    fn test_run_against_file() {
        let temp = NamedTempFile::new().unwrap();
        temp.as_file().set_len(1_048_576).unwrap();

        let options = RunOptions::new(temp.path().to_path_buf(), 1)
            .with_mode(IoMode::Write)
            .with_duration(Duration::from_millis(100));
        let report = RandomBenchmark::new(options).unwrap().run().unwrap();

        assert!(report.operations > 0);
        assert_eq!(report.failures, 0);
        assert_eq!(report.iops(), report.operations);
        assert_eq!(temp.as_file().metadata().unwrap().len(), 1_048_576);
    }

    #[test]
    fn test_open_failure() {
        let dir = tempfile::tempdir().unwrap();
        let options = RunOptions::new(dir.path().join("missing"), 1);
        let bench = RandomBenchmark::new(options).unwrap();
        assert!(bench.open().is_err());
        assert!(bench.run().is_err());
    }
}
