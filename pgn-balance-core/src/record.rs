//! Record spans, outcome classes and source identities

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Outcome class of one game record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OutcomeLabel {
    /// `1-0`
    WhiteWin,
    /// `0-1`
    BlackWin,
    /// `1/2-1/2`
    Draw,
}

impl OutcomeLabel {
    /// All labels, in classification priority order.
    pub const ALL: [OutcomeLabel; 3] = [Self::WhiteWin, Self::BlackWin, Self::Draw];

    /// Number of outcome classes
    pub const COUNT: usize = Self::ALL.len();

    /// The result string carried in the record header.
    pub fn result_str(self) -> &'static str {
        match self {
            Self::WhiteWin => "1-0",
            Self::BlackWin => "0-1",
            Self::Draw => "1/2-1/2",
        }
    }

    /// Header tag that marks a record of this class.
    pub fn header_tag(self) -> &'static [u8] {
        match self {
            Self::WhiteWin => b"[Result \"1-0\"]",
            Self::BlackWin => b"[Result \"0-1\"]",
            Self::Draw => b"[Result \"1/2-1/2\"]",
        }
    }

    /// Dense index into per-label arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Parse a result string such as `1-0` or a label name such as `draw`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1-0" | "white" | "white-win" | "whitewin" => Some(Self::WhiteWin),
            "0-1" | "black" | "black-win" | "blackwin" => Some(Self::BlackWin),
            "1/2-1/2" | "draw" | "draws" => Some(Self::Draw),
            _ => None,
        }
    }
}

impl fmt::Display for OutcomeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::WhiteWin => "white-win",
            Self::BlackWin => "black-win",
            Self::Draw => "draw",
        };
        f.write_str(name)
    }
}

/// Exact byte range of one complete record within a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordSpan {
    /// Byte offset of the record start marker
    pub offset: u64,
    /// Length of the record in bytes
    pub length: u64,
}

impl RecordSpan {
    /// Create a new span
    pub fn new(offset: u64, length: u64) -> Self {
        Self { offset, length }
    }

    /// Offset one past the last byte of the record
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }

    /// Attach the identity of the file this span was found in
    pub fn tagged(self, source: SourceFile) -> TaggedSpan {
        TaggedSpan { span: self, source }
    }
}

/// The closed set of input files a span may come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceFile {
    /// File of decisive games (white and black wins)
    Decisive,
    /// File of drawn games
    Draws,
}

impl SourceFile {
    /// Both sources, in scan order
    pub const ALL: [SourceFile; 2] = [Self::Decisive, Self::Draws];

    /// Number of sources
    pub const COUNT: usize = Self::ALL.len();

    /// Dense index into per-source arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The source whose pool supplies `label`.
    pub fn for_label(label: OutcomeLabel) -> Self {
        match label {
            OutcomeLabel::WhiteWin | OutcomeLabel::BlackWin => Self::Decisive,
            OutcomeLabel::Draw => Self::Draws,
        }
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decisive => f.write_str("decisive"),
            Self::Draws => f.write_str("draws"),
        }
    }
}

/// Resolves [`SourceFile`] tags back to paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSet {
    paths: [PathBuf; SourceFile::COUNT],
}

impl SourceSet {
    /// Create a source set from the decisive and draw file paths
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(decisive: P, draws: Q) -> Self {
        Self {
            paths: [decisive.into(), draws.into()],
        }
    }

    /// Path of the given source
    pub fn path(&self, source: SourceFile) -> &Path {
        &self.paths[source.index()]
    }

    /// Iterate over `(source, path)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (SourceFile, &Path)> {
        SourceFile::ALL.into_iter().map(move |source| (source, self.path(source)))
    }
}

/// A record span tagged with the file it must be copied from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaggedSpan {
    /// Location of the record
    pub span: RecordSpan,
    /// File containing the record
    pub source: SourceFile,
}

/// Per-label span lists discovered in one scan of one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassPool {
    pools: [Vec<RecordSpan>; OutcomeLabel::COUNT],
    unclassified: u64,
    file_size: u64,
}

impl ClassPool {
    /// Create an empty pool for a file of `file_size` bytes
    pub fn new(file_size: u64) -> Self {
        Self {
            file_size,
            ..Self::default()
        }
    }

    /// Append a classified span
    pub fn push(&mut self, label: OutcomeLabel, span: RecordSpan) {
        self.pools[label.index()].push(span);
    }

    /// Count a record that matched no outcome tag
    pub fn record_unclassified(&mut self) {
        self.unclassified += 1;
    }

    /// Spans of one label in scan order
    pub fn get(&self, label: OutcomeLabel) -> &[RecordSpan] {
        &self.pools[label.index()]
    }

    /// Move the spans of one label out of the pool
    pub fn take(&mut self, label: OutcomeLabel) -> Vec<RecordSpan> {
        std::mem::take(&mut self.pools[label.index()])
    }

    /// Number of spans of one label
    pub fn len(&self, label: OutcomeLabel) -> usize {
        self.pools[label.index()].len()
    }

    /// Number of classified records across all labels
    pub fn total(&self) -> usize {
        self.pools.iter().map(Vec::len).sum()
    }

    /// Whether no record was classified
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Records dropped because no outcome tag matched
    pub fn unclassified(&self) -> u64 {
        self.unclassified
    }

    /// Size of the scanned file in bytes
    pub fn file_size(&self) -> u64 {
        self.file_size
    }
}

/// A class held fewer records than the requested quota
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolShortfall {
    /// The under-populated class
    pub label: OutcomeLabel,
    /// Records available in the pool
    pub available: u64,
    /// Records requested
    pub requested: u64,
}

impl fmt::Display for PoolShortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pool has only {} records ({} requested), taking all",
            self.label, self.available, self.requested
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("1-0", Some(OutcomeLabel::WhiteWin) ; "white result")]
    #[test_case("0-1", Some(OutcomeLabel::BlackWin) ; "black result")]
    #[test_case("1/2-1/2", Some(OutcomeLabel::Draw) ; "draw result")]
    #[test_case("Draw", Some(OutcomeLabel::Draw) ; "draw name")]
    #[test_case("*", None ; "unfinished")]
    fn test_parse_label(input: &str, expected: Option<OutcomeLabel>) {
        assert_eq!(OutcomeLabel::parse(input), expected);
    }

    #[test]
    fn test_header_tag_contains_result() {
        for label in OutcomeLabel::ALL {
            let tag = std::str::from_utf8(label.header_tag()).unwrap();
            assert!(tag.contains(label.result_str()));
        }
    }

    #[test]
    fn test_source_for_label() {
        assert_eq!(SourceFile::for_label(OutcomeLabel::WhiteWin), SourceFile::Decisive);
        assert_eq!(SourceFile::for_label(OutcomeLabel::BlackWin), SourceFile::Decisive);
        assert_eq!(SourceFile::for_label(OutcomeLabel::Draw), SourceFile::Draws);
    }

    #[test]
    fn test_source_set_resolves_by_tag() {
        let sources = SourceSet::new("a/games.pgn", "b/games.pgn");
        assert_eq!(sources.path(SourceFile::Decisive), Path::new("a/games.pgn"));
        assert_eq!(sources.path(SourceFile::Draws), Path::new("b/games.pgn"));
        assert_eq!(sources.iter().count(), 2);
    }

    #[test]
    fn test_class_pool_take() {
        let mut pool = ClassPool::new(100);
        pool.push(OutcomeLabel::WhiteWin, RecordSpan::new(0, 40));
        pool.push(OutcomeLabel::Draw, RecordSpan::new(40, 60));
        pool.record_unclassified();

        assert_eq!(pool.total(), 2);
        assert_eq!(pool.unclassified(), 1);
        assert_eq!(pool.take(OutcomeLabel::WhiteWin), vec![RecordSpan::new(0, 40)]);
        assert_eq!(pool.len(OutcomeLabel::WhiteWin), 0);
        assert_eq!(pool.get(OutcomeLabel::Draw)[0].end(), 100);
    }
}
