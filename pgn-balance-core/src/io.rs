//! I/O utilities for zero-copy scanning and span extraction

use std::fs::File;
use std::io::{BufWriter, Read, Seek, SeekFrom};
use std::path::Path;

use memmap2::{Mmap, MmapOptions};
use tracing::trace;

use crate::config::DEFAULT_WRITE_BUFFER_SIZE;
use crate::error::{Error, Result};
use crate::record::RecordSpan;

/// Memory-mapped file for zero-copy reading
///
/// Zero-length files are represented without a mapping, since mapping an
/// empty file is rejected on several platforms.
pub struct MemoryMappedFile {
    /// The memory map, absent for empty files
    mmap: Option<Mmap>,

    /// The size of the file in bytes
    size: u64,
}

impl MemoryMappedFile {
    /// Open a file for memory-mapped reading
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let size = file.metadata()?.len();

        let mmap = if size == 0 {
            None
        } else {
            // The map is read-only; concurrent truncation of the source is
            // outside what the pipeline supports.
            #[allow(unsafe_code)]
            let mmap = unsafe { MmapOptions::new().map(&file)? };
            Some(mmap)
        };

        trace!(path = %path.display(), size, mapped = mmap.is_some(), "opened input");
        Ok(Self { mmap, size })
    }

    /// Get the whole file as a byte slice
    pub fn as_slice(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    /// Get the bytes of one span
    pub fn slice(&self, span: RecordSpan) -> Result<&[u8]> {
        if span.end() > self.size {
            return Err(Error::SpanOutOfBounds {
                offset: span.offset,
                length: span.length,
                size: self.size,
            });
        }
        let start = usize::try_from(span.offset).map_err(|_| out_of_range(span, self.size))?;
        let end = usize::try_from(span.end()).map_err(|_| out_of_range(span, self.size))?;
        Ok(&self.as_slice()[start..end])
    }

    /// Get the size of the file
    pub fn size(&self) -> u64 {
        self.size
    }
}

fn out_of_range(span: RecordSpan, size: u64) -> Error {
    Error::SpanOutOfBounds {
        offset: span.offset,
        length: span.length,
        size,
    }
}

/// Seeking reader that copies individual spans out of one source file
pub struct SpanReader {
    /// Open source file
    file: File,
}

impl SpanReader {
    /// Open a source file for span reads
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self { file })
    }

    /// Read exactly the bytes of `span` into `buf`, replacing its contents.
    ///
    /// A span reaching past the end of the file fails with
    /// `UnexpectedEof` rather than returning a short record.
    pub fn read_span(&mut self, span: RecordSpan, buf: &mut Vec<u8>) -> Result<()> {
        let length = usize::try_from(span.length).map_err(|_| Error::SpanOutOfBounds {
            offset: span.offset,
            length: span.length,
            size: u64::MAX,
        })?;

        buf.clear();
        buf.resize(length, 0);
        self.file.seek(SeekFrom::Start(span.offset))?;
        self.file.read_exact(buf)?;
        Ok(())
    }
}

/// Options for opening destination files
#[derive(Debug, Clone)]
pub struct OpenOptions {
    /// Buffer size for buffered writes
    buffer_size: usize,
}

impl OpenOptions {
    /// Create a new set of options
    pub fn new() -> Self {
        Self {
            buffer_size: DEFAULT_WRITE_BUFFER_SIZE,
        }
    }

    /// Set buffer size for buffered writes
    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    /// Create (truncating) a destination file behind a write buffer
    pub fn create<P: AsRef<Path>>(&self, path: P) -> Result<BufWriter<File>> {
        let file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path.as_ref())?;
        Ok(BufWriter::with_capacity(self.buffer_size, file))
    }
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_mmap_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mapped = MemoryMappedFile::open(file.path()).unwrap();
        assert_eq!(mapped.size(), 0);
        assert!(mapped.as_slice().is_empty());
    }

    #[test]
    fn test_mmap_slice_bounds() {
        let contents: &[u8] = b"[Event \"a\"]\n\n1. e4 1-0\n\n";
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();

        let mapped = MemoryMappedFile::open(file.path()).unwrap();
        let size = contents.len() as u64;
        assert_eq!(mapped.size(), size);
        assert_eq!(mapped.slice(RecordSpan::new(0, 6)).unwrap(), b"[Event");
        assert_eq!(mapped.slice(RecordSpan::new(0, size)).unwrap(), contents);
        let err = mapped.slice(RecordSpan::new(20, 10)).unwrap_err();
        assert!(matches!(err, Error::SpanOutOfBounds { size: s, .. } if s == size));
    }

    #[test]
    fn test_mmap_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = MemoryMappedFile::open(dir.path().join("nope.pgn")).err().unwrap();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_span_reader_reuses_buffer() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"0123456789").unwrap();
        file.flush().unwrap();

        let mut reader = SpanReader::open(file.path()).unwrap();
        let mut buf = Vec::new();
        reader.read_span(RecordSpan::new(2, 5), &mut buf).unwrap();
        assert_eq!(buf, b"23456");
        reader.read_span(RecordSpan::new(8, 2), &mut buf).unwrap();
        assert_eq!(buf, b"89");

        let err = reader.read_span(RecordSpan::new(8, 5), &mut buf).unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == std::io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn test_open_options_truncate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pgn");

        let mut out = OpenOptions::new().buffer_size(16).create(&path).unwrap();
        out.write_all(b"first and longer").unwrap();
        out.flush().unwrap();
        drop(out);
        assert_eq!(std::fs::read(&path).unwrap(), b"first and longer");

        let mut out = OpenOptions::new().create(&path).unwrap();
        out.write_all(b"fresh").unwrap();
        drop(out);
        assert_eq!(std::fs::read(&path).unwrap(), b"fresh");
    }
}
