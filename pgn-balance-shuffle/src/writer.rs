//! Dataset writer
//!
//! Rebuilds a split file by copying exact byte ranges out of the source
//! files. Every record leaves the writer followed by exactly one blank line,
//! since downstream readers delimit records by blank-line separation.
//!
//! Unlike indexing, writing is strict: any failure to read a span or to
//! write the destination aborts the split with an error.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use pgn_balance_core::config::DEFAULT_WRITE_BUFFER_SIZE;
use pgn_balance_core::io::{OpenOptions, SpanReader};
use pgn_balance_core::{Error, RecordSpan, Result, SourceFile, SourceSet, SplitName, TaggedSpan};

/// Bytes to append after `record` so that it ends with exactly one blank line.
///
/// A record ending in `\r\n` keeps its CRLF line endings.
pub fn separator_suffix(record: &[u8]) -> &'static [u8] {
    if record.ends_with(b"\n\n") || record.ends_with(b"\r\n\r\n") {
        b""
    } else if record.ends_with(b"\r\n") {
        b"\r\n"
    } else if record.ends_with(b"\n") {
        b"\n"
    } else {
        b"\n\n"
    }
}

/// Counters for one assembled output file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Records written
    pub records: u64,
    /// Record bytes copied verbatim
    pub bytes: u64,
    /// Separator bytes appended after records
    pub separator_bytes: u64,
    /// Source files opened to read spans
    pub sources_opened: u64,
}

/// Streams records into one destination file
pub struct RecordCopier<W: Write> {
    out: W,
    path: PathBuf,
    buf: Vec<u8>,
    summary: WriteSummary,
}

impl RecordCopier<BufWriter<File>> {
    /// Create (truncating) the destination file behind a write buffer
    pub fn create<P: AsRef<Path>>(path: P, buffer_size: usize) -> Result<Self> {
        let path = path.as_ref();
        let out = OpenOptions::new()
            .buffer_size(buffer_size)
            .create(path)
            .map_err(|err| Error::write(path, err))?;
        Ok(Self::new(out, path))
    }
}

impl<W: Write> RecordCopier<W> {
    /// Wrap an already opened writer; `path` is only used in errors
    pub fn new<P: AsRef<Path>>(out: W, path: P) -> Self {
        Self {
            out,
            path: path.as_ref().to_path_buf(),
            buf: Vec::new(),
            summary: WriteSummary::default(),
        }
    }

    /// Copy one span from `reader` into the destination
    pub fn copy_from(&mut self, reader: &mut SpanReader, span: RecordSpan) -> Result<()> {
        reader
            .read_span(span, &mut self.buf)
            .map_err(|err| Error::write(&self.path, err))?;
        Self::emit(&mut self.out, &mut self.summary, &self.buf)
            .map_err(|err| Error::write(&self.path, err))
    }

    /// Write one record held in memory
    pub fn write_record(&mut self, record: &[u8]) -> Result<()> {
        Self::emit(&mut self.out, &mut self.summary, record)
            .map_err(|err| Error::write(&self.path, err))
    }

    fn emit(out: &mut W, summary: &mut WriteSummary, record: &[u8]) -> Result<()> {
        out.write_all(record)?;
        let suffix = separator_suffix(record);
        out.write_all(suffix)?;

        summary.records += 1;
        summary.bytes += record.len() as u64;
        summary.separator_bytes += suffix.len() as u64;
        Ok(())
    }

    /// Counters so far
    pub fn summary(&self) -> WriteSummary {
        self.summary
    }

    /// Flush the destination and return the final counters
    pub fn finish(mut self) -> Result<WriteSummary> {
        self.out
            .flush()
            .map_err(|err| Error::write(&self.path, err.into()))?;
        Ok(self.summary)
    }
}

/// Writes shuffled split files from tagged spans
pub struct DatasetWriter<'a> {
    sources: &'a SourceSet,
    buffer_size: usize,
}

impl<'a> DatasetWriter<'a> {
    /// Create a writer resolving span tags through `sources`
    pub fn new(sources: &'a SourceSet) -> Self {
        Self {
            sources,
            buffer_size: DEFAULT_WRITE_BUFFER_SIZE,
        }
    }

    /// Set the destination write buffer capacity
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Shuffle `spans` in place and write them to `dest`.
    ///
    /// Each referenced source file is opened once for the whole split.
    #[tracing::instrument(
        level = "info",
        skip(self, spans, dest, rng),
        fields(records = spans.len())
    )]
    pub fn write_split<R: Rng + ?Sized>(
        &self,
        split: SplitName,
        spans: &mut [TaggedSpan],
        dest: &Path,
        rng: &mut R,
    ) -> Result<WriteSummary> {
        spans.shuffle(rng);

        let mut readers: [Option<SpanReader>; SourceFile::COUNT] = Default::default();
        let mut copier = RecordCopier::create(dest, self.buffer_size)?;
        let mut opened = 0;

        for tagged in spans.iter() {
            let reader = match &mut readers[tagged.source.index()] {
                Some(reader) => reader,
                slot @ None => {
                    let path = self.sources.path(tagged.source);
                    debug!(source = %tagged.source, path = %path.display(), "opening source");
                    let reader = SpanReader::open(path).map_err(|err| Error::write(dest, err))?;
                    opened += 1;
                    slot.insert(reader)
                }
            };
            copier.copy_from(reader, tagged.span)?;
        }

        let summary = WriteSummary {
            sources_opened: opened,
            ..copier.finish()?
        };
        info!(
            path = %dest.display(),
            records = summary.records,
            bytes = summary.bytes + summary.separator_bytes,
            "split written"
        );
        Ok(summary)
    }
}
