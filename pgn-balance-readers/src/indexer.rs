//! Record indexer
//!
//! Scans a memory-mapped PGN file once and builds a [`ClassPool`] of
//! `(offset, length)` spans per outcome class. Indexing is best-effort: a
//! missing or unreadable file yields an empty pool and a log entry, never an
//! error for the caller, because sampling already tolerates short pools.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, error, info, warn};

use pgn_balance_core::config::DEFAULT_SCAN_WINDOW;
use pgn_balance_core::io::MemoryMappedFile;
use pgn_balance_core::{ClassPool, Error, OutcomeLabel, Result, SourceFile, SourceSet};

use crate::format::{OutcomeClassifier, RecordFormat};

/// Builds per-class span pools from record files
pub struct RecordIndexer {
    format: RecordFormat,
    classifier: OutcomeClassifier,
}

impl RecordIndexer {
    /// Create an indexer that inspects `scan_window` header bytes per record
    pub fn new(scan_window: usize) -> Self {
        Self::with_format(RecordFormat::PGN, scan_window)
    }

    /// Create an indexer for a specific record format
    pub fn with_format(format: RecordFormat, scan_window: usize) -> Self {
        Self {
            format,
            classifier: OutcomeClassifier::new(scan_window),
        }
    }

    /// Index an in-memory view of a whole file
    #[allow(clippy::cast_possible_truncation)]
    pub fn index_bytes(&self, bytes: &[u8]) -> ClassPool {
        let mut pool = ClassPool::new(bytes.len() as u64);
        let boundaries = self.format.boundaries(bytes);

        if let Some(first) = boundaries.first_start().filter(|&first| first > 0) {
            debug!(bytes = first, "skipping bytes before the first record");
        }

        for span in boundaries {
            // Spans come from the iterator over `bytes`, so they are in bounds.
            let start = span.offset as usize;
            let record = &bytes[start..start + span.length as usize];
            match self.classifier.classify(record) {
                Some(label) => pool.push(label, span),
                None => pool.record_unclassified(),
            }
        }

        pool
    }

    /// Index a file, reporting why it could not be scanned
    pub fn try_index_file<P: AsRef<Path>>(&self, path: P) -> Result<ClassPool> {
        let mapped = Self::map_file(path)?;
        Ok(self.index_bytes(mapped.as_slice()))
    }

    /// Map an input file read-only, classifying failures as
    /// [`Error::InputMissing`] or [`Error::Scan`].
    pub fn map_file<P: AsRef<Path>>(path: P) -> Result<MemoryMappedFile> {
        let path = path.as_ref();
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(Error::InputMissing {
                    path: path.to_path_buf(),
                })
            }
            Err(source) => {
                return Err(Error::Scan {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        if !metadata.is_file() {
            return Err(Error::Scan {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            });
        }

        MemoryMappedFile::open(path).map_err(|err| Error::scan(path, err))
    }

    /// Index a file, degrading any failure to an empty pool
    #[allow(clippy::cast_precision_loss)]
    #[tracing::instrument(
        level = "info",
        skip(self, path),
        fields(path = %path.as_ref().display())
    )]
    pub fn index_file<P: AsRef<Path>>(&self, path: P) -> ClassPool {
        let path = path.as_ref();
        match self.try_index_file(path) {
            Ok(pool) => {
                info!(
                    size_mb = pool.file_size() as f64 / (1024.0 * 1024.0),
                    white = pool.len(OutcomeLabel::WhiteWin),
                    black = pool.len(OutcomeLabel::BlackWin),
                    draw = pool.len(OutcomeLabel::Draw),
                    "indexed"
                );
                if pool.unclassified() > 0 {
                    debug!(count = pool.unclassified(), "records without an outcome tag dropped");
                }
                pool
            }
            Err(err @ Error::InputMissing { .. }) => {
                warn!("{err}; treating as an empty pool");
                ClassPool::default()
            }
            Err(err) => {
                error!("{err}; treating as an empty pool");
                ClassPool::default()
            }
        }
    }

    /// Index the decisive and draw inputs
    ///
    /// With the `parallel` feature both files are scanned concurrently; the
    /// pools are independent so the result is the same either way.
    pub fn index_sources(&self, sources: &SourceSet) -> [ClassPool; SourceFile::COUNT] {
        let decisive = sources.path(SourceFile::Decisive);
        let draws = sources.path(SourceFile::Draws);

        #[cfg(feature = "parallel")]
        let (decisive, draws) =
            rayon::join(|| self.index_file(decisive), || self.index_file(draws));

        #[cfg(not(feature = "parallel"))]
        let (decisive, draws) = (self.index_file(decisive), self.index_file(draws));

        [decisive, draws]
    }
}

impl Default for RecordIndexer {
    fn default() -> Self {
        Self::new(DEFAULT_SCAN_WINDOW)
    }
}
