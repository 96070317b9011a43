//! Record boundary and outcome tag detection
//!
//! Records are never parsed. A record starts wherever the start marker
//! appears at the beginning of a line, and its class is decided by the first
//! outcome tag found in a bounded header window.

use memchr::memmem::Finder;

use pgn_balance_core::{OutcomeLabel, RecordSpan};

/// UTF-8 byte order mark some exporters put in front of the first record
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Byte-level description of the record format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordFormat {
    /// Sequence that opens every record, matched at line starts only
    pub start_marker: &'static [u8],
}

impl RecordFormat {
    /// PGN: every game opens with its `Event` tag pair
    pub const PGN: RecordFormat = RecordFormat {
        start_marker: b"[Event \"",
    };

    /// Iterate over the records of `bytes` in scan order
    pub fn boundaries<'a>(&self, bytes: &'a [u8]) -> RecordBoundaries<'a> {
        RecordBoundaries::new(bytes, self.start_marker)
    }
}

impl Default for RecordFormat {
    fn default() -> Self {
        Self::PGN
    }
}

/// Iterator over consecutive record spans of a byte slice
///
/// Each span runs from one start marker to the next (or to the end of the
/// input), so spans are contiguous from the first marker onward.
pub struct RecordBoundaries<'a> {
    bytes: &'a [u8],
    finder: Finder<'static>,
    next_start: Option<usize>,
}

impl<'a> RecordBoundaries<'a> {
    fn new(bytes: &'a [u8], marker: &'static [u8]) -> Self {
        let mut boundaries = Self {
            bytes,
            finder: Finder::new(marker),
            next_start: None,
        };
        boundaries.next_start = boundaries.find_marker(0);
        boundaries
    }

    /// Offset of the first record, if any
    pub fn first_start(&self) -> Option<usize> {
        self.next_start
    }

    fn find_marker(&self, from: usize) -> Option<usize> {
        let mut pos = from;
        while pos < self.bytes.len() {
            let hit = pos + self.finder.find(&self.bytes[pos..])?;
            if is_line_start(self.bytes, hit) {
                return Some(hit);
            }
            pos = hit + 1;
        }
        None
    }
}

impl Iterator for RecordBoundaries<'_> {
    type Item = RecordSpan;

    fn next(&mut self) -> Option<RecordSpan> {
        let start = self.next_start?;
        let next = self.find_marker(start + 1);
        let end = next.unwrap_or(self.bytes.len());
        self.next_start = next;
        Some(RecordSpan::new(start as u64, (end - start) as u64))
    }
}

fn is_line_start(bytes: &[u8], pos: usize) -> bool {
    pos == 0 || bytes[pos - 1] == b'\n' || (pos == UTF8_BOM.len() && bytes.starts_with(UTF8_BOM))
}

/// Decides the outcome class of a record from its header window
pub struct OutcomeClassifier {
    finders: [(OutcomeLabel, Finder<'static>); OutcomeLabel::COUNT],
    window: usize,
}

impl OutcomeClassifier {
    /// Create a classifier inspecting the first `window` bytes of a record
    pub fn new(window: usize) -> Self {
        Self {
            finders: OutcomeLabel::ALL.map(|label| (label, Finder::new(label.header_tag()))),
            window,
        }
    }

    /// Class of `record`, or `None` when no outcome tag appears in its header
    /// window. Tags are tried white, black, draw; the first hit wins.
    pub fn classify(&self, record: &[u8]) -> Option<OutcomeLabel> {
        let head = &record[..record.len().min(self.window)];
        self.finders
            .iter()
            .find(|(_, finder)| finder.find(head).is_some())
            .map(|(label, _)| *label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn spans(bytes: &[u8]) -> Vec<(u64, u64)> {
        RecordFormat::PGN
            .boundaries(bytes)
            .map(|s| (s.offset, s.length))
            .collect()
    }

    #[test]
    fn test_boundaries_basic() {
        let data = b"[Event \"a\"]\n1-0\n\n[Event \"b\"]\n0-1\n\n";
        assert_eq!(spans(data), vec![(0, 17), (17, 17)]);
    }

    #[test]
    fn test_event_date_is_not_a_boundary() {
        let data = b"[Event \"a\"]\n[EventDate \"2020.01.01\"]\n\n1. e4 *\n\n";
        assert_eq!(spans(data), vec![(0, data.len() as u64)]);
    }

    #[test]
    fn test_marker_inside_line_is_ignored() {
        let data = b"[Event \"a\"]\n{ see [Event \"b\"] }\n\n[Event \"c\"]\n";
        let found = spans(data);
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].0, 33);
    }

    #[test]
    fn test_leading_bytes_and_bom() {
        let data = b"junk\n[Event \"a\"]\n";
        let boundaries = RecordFormat::PGN.boundaries(data);
        assert_eq!(boundaries.first_start(), Some(5));

        let bom = b"\xEF\xBB\xBF[Event \"a\"]\n";
        assert_eq!(spans(bom), vec![(3, bom.len() as u64 - 3)]);
    }

    #[test]
    fn test_no_markers() {
        assert!(spans(b"").is_empty());
        assert!(spans(b"1. e4 e5 *\n").is_empty());
    }

    #[test_case(b"[Result \"1-0\"]", Some(OutcomeLabel::WhiteWin) ; "white")]
    #[test_case(b"[Result \"0-1\"]", Some(OutcomeLabel::BlackWin) ; "black")]
    #[test_case(b"[Result \"1/2-1/2\"]", Some(OutcomeLabel::Draw) ; "draw")]
    #[test_case(b"[Result \"*\"]", None ; "unfinished")]
    fn test_classify(tag: &[u8], expected: Option<OutcomeLabel>) {
        let mut record = b"[Event \"x\"]\n".to_vec();
        record.extend_from_slice(tag);
        record.extend_from_slice(b"\n\n1. e4 *\n\n");
        assert_eq!(OutcomeClassifier::new(2048).classify(&record), expected);
    }

    #[test]
    fn test_classify_respects_window() {
        let mut record = b"[Event \"x\"]\n".to_vec();
        record.extend(std::iter::repeat(b' ').take(100));
        record.extend_from_slice(b"[Result \"1-0\"]\n");

        assert_eq!(OutcomeClassifier::new(64).classify(&record), None);
        assert_eq!(
            OutcomeClassifier::new(4096).classify(&record),
            Some(OutcomeLabel::WhiteWin)
        );
    }
}
