//! Record scanning for PGN corpora
//!
//! This crate locates record boundaries and outcome labels in large PGN files
//! through a read-only memory map, producing per-class span pools without
//! parsing record bodies.

#![warn(missing_docs)]

pub mod format;
pub mod indexer;

pub use format::{OutcomeClassifier, RecordBoundaries, RecordFormat};
pub use indexer::RecordIndexer;

// Re-export core types
pub use pgn_balance_core::{ClassPool, OutcomeLabel, RecordSpan};
