//! Class-balanced train/validation/test splits from PGN game collections
//!
//! Ties the indexing, sampling and writing crates together: [`run_balance`]
//! drives one balancing run from a [`BalanceConfig`](pgn_balance_core::BalanceConfig),
//! and [`extract_outcome`] gathers one outcome class from many files into
//! a single input for it.

#![warn(missing_docs)]

pub mod extract;
pub mod pipeline;
pub mod report;

pub use extract::{discover_inputs, extract_outcome, ExtractOptions, ExtractSummary};
pub use pipeline::run_balance;
pub use report::{BalanceReport, SplitReport};
