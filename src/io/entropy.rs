use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// OS entropy source used to seed the offset generator
pub const ENTROPY_SOURCE: &str = "/dev/urandom";

/// Why a seed could not be obtained
#[derive(Debug)]
pub enum SeedError {
    Open(PathBuf, io::Error),
    Read(PathBuf, io::Error),
}

impl fmt::Display for SeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedError::Open(path, _) => write!(f, "Cannot open {}", path.display()),
            SeedError::Read(path, _) => write!(f, "Cannot read {}", path.display()),
        }
    }
}

impl std::error::Error for SeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SeedError::Open(_, err) | SeedError::Read(_, err) => Some(err),
        }
    }
}

/// Read one `u32` worth of bytes from `path`
pub fn read_seed(path: &Path) -> Result<u32, SeedError> {
    let mut file = File::open(path).map_err(|err| SeedError::Open(path.to_path_buf(), err))?;
    let mut bytes = [0u8; 4];
    file.read_exact(&mut bytes)
        .map_err(|err| SeedError::Read(path.to_path_buf(), err))?;
    Ok(u32::from_ne_bytes(bytes))
}

/// Read a seed from `path`, falling back to 0 after a message on stderr.
///
/// A bad entropy source only weakens the offset distribution, so it is
/// never fatal.
pub fn seed_or_default(path: &Path) -> u32 {
    match read_seed(path) {
        Ok(seed) => {
            tracing::debug!(source = %path.display(), "seeded offset generator");
            seed
        }
        Err(err) => {
            tracing::debug!(error = ?err, "falling back to seed 0");
            eprintln!("{}", err);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_seed_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seed");
        std::fs::write(&path, 0xdead_beef_u32.to_ne_bytes()).unwrap();
        assert_eq!(read_seed(&path).unwrap(), 0xdead_beef);
        assert_eq!(seed_or_default(&path), 0xdead_beef);
    }

    #[test]
    fn test_seed_failures_fall_back() {
        let dir = tempdir().unwrap();

        let missing = dir.path().join("missing");
        assert!(matches!(read_seed(&missing), Err(SeedError::Open(..))));
        assert_eq!(seed_or_default(&missing), 0);

        let short = dir.path().join("short");
        std::fs::write(&short, [1u8, 2]).unwrap();
        assert!(matches!(read_seed(&short), Err(SeedError::Read(..))));
        assert_eq!(seed_or_default(&short), 0);
    }

    #[test]
    fn test_seed_error_messages() {
        let dir = tempdir().unwrap();

        let missing = dir.path().join("missing");
        let err = read_seed(&missing).unwrap_err();
        assert_eq!(err.to_string(), format!("Cannot open {}", missing.display()));
        assert!(std::error::Error::source(&err).is_some());

        let empty = dir.path().join("empty");
        std::fs::write(&empty, b"").unwrap();
        let err = read_seed(&empty).unwrap_err();
        assert_eq!(err.to_string(), format!("Cannot read {}", empty.display()));
    }

    #[cfg(unix)]
    #[test]
    fn test_urandom_seed() {
        assert!(read_seed(Path::new(ENTROPY_SOURCE)).is_ok());
    }
}
