//! Core types, configuration and I/O primitives for balanced PGN extraction
//!
//! This crate provides the foundational pieces the indexing, sampling and
//! writing stages build upon: record spans and the outcome classes they belong
//! to, split names and ratios, the pipeline configuration, the shared error
//! type, and the memory-mapped / buffered file access used to move record
//! bytes without materializing whole files.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod io;
pub mod record;
pub mod split;

// Re-export key types for convenience
pub use config::BalanceConfig;
pub use error::{Error, Result};
pub use record::{
    ClassPool, OutcomeLabel, PoolShortfall, RecordSpan, SourceFile, SourceSet, TaggedSpan,
};
pub use split::{SplitName, SplitRatios};
