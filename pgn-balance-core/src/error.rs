//! Error types for PGN balancing

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for PGN balancing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for PGN balancing operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error outside of a scan or a split write
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A configured source file does not exist
    #[error("Input file not found: {}", path.display())]
    InputMissing {
        /// The missing path
        path: PathBuf,
    },

    /// Mapping or searching a source file failed
    #[error("Failed to scan {}: {source}", path.display())]
    Scan {
        /// The file being scanned
        path: PathBuf,
        /// Underlying IO error
        source: io::Error,
    },

    /// Reading a span or writing a destination file failed
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        /// The destination file being assembled
        path: PathBuf,
        /// Underlying IO error
        source: io::Error,
    },

    /// A span does not fit inside its source file
    #[error("Span {offset}+{length} out of bounds for file of {size} bytes")]
    SpanOutOfBounds {
        /// Span offset
        offset: u64,
        /// Span length
        length: u64,
        /// Size of the file the span refers to
        size: u64,
    },

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be decoded
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    /// Re-classify an error raised while scanning `path`.
    pub fn scan(path: &Path, err: Error) -> Self {
        match err {
            Error::Io(source) => Error::Scan {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        }
    }

    /// Re-classify an error raised while assembling the output file `path`.
    pub fn write(path: &Path, err: Error) -> Self {
        match err {
            Error::Io(source) => Error::Write {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_wraps_io_only() {
        let path = Path::new("games.pgn");
        let err = Error::scan(path, Error::Io(io::Error::new(io::ErrorKind::Other, "boom")));
        assert!(matches!(err, Error::Scan { ref path, .. } if path == Path::new("games.pgn")));

        let passthrough = Error::scan(path, Error::InvalidConfig("x".into()));
        assert!(matches!(passthrough, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_write_wraps_io_with_destination() {
        let err = Error::write(
            Path::new("train.pgn"),
            Error::Io(io::Error::new(io::ErrorKind::UnexpectedEof, "short read")),
        );
        assert!(matches!(err, Error::Write { .. }));
        assert!(err.to_string().contains("train.pgn"));
    }
}
