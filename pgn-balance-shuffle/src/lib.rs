//! Sampling, partitioning and writing of balanced record sets
//!
//! The stages here never touch record bytes until the final write: sampling
//! and partitioning work on index vectors into the per-class span pools, and
//! the writer streams one record at a time from its source file.

#![warn(missing_docs)]

pub mod partition;
pub mod sampler;
pub mod writer;

pub use partition::{partition, split_sizes, Partition};
pub use sampler::{sample_class, sample_indices, seeded_rng, ClassSample};
pub use writer::{separator_suffix, DatasetWriter, RecordCopier, WriteSummary};
