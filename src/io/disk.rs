use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Positioned block operations issued by the random I/O benchmark
pub trait DirectFile {
    /// Seek to position
    fn seek_direct(&mut self, pos: SeekFrom) -> io::Result<u64>;

    /// Read at the current position
    fn read_direct(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write at the current position
    fn write_direct(&mut self, buf: &[u8]) -> io::Result<usize>;
}

impl<T: DirectFile + ?Sized> DirectFile for &mut T {
    fn seek_direct(&mut self, pos: SeekFrom) -> io::Result<u64> {
        (**self).seek_direct(pos)
    }

    fn read_direct(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_direct(buf)
    }

    fn write_direct(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).write_direct(buf)
    }
}

/// A block device (or any seekable file) opened for read/write
#[derive(Debug)]
pub struct RawDevice {
    file: File,
}

impl RawDevice {
    pub fn new(file: File) -> Self {
        Self { file }
    }
}

impl DirectFile for RawDevice {
    fn seek_direct(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }

    fn read_direct(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn write_direct(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }
}

/// Open `path` read/write, with synchronous writes if requested.
///
/// The device is never created or truncated; it must already exist.
#[cfg(unix)]
pub fn open_device(path: &Path, sync_writes: bool) -> io::Result<RawDevice> {
    use std::os::unix::fs::OpenOptionsExt;

    let mut options = OpenOptions::new();
    options.read(true).write(true);
    if sync_writes {
        options.custom_flags(libc::O_SYNC);
    }

    let file = options.open(path)?;
    Ok(RawDevice::new(file))
}

#[cfg(not(unix))]
pub fn open_device(path: &Path, _sync_writes: bool) -> io::Result<RawDevice> {
    let file = OpenOptions::new().read(true).write(true).open(path)?;
    Ok(RawDevice::new(file))
}
