//! Pipeline configuration

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::record::SourceSet;
use crate::split::{SplitName, SplitRatios};

/// Default number of header bytes inspected for an outcome tag
pub const DEFAULT_SCAN_WINDOW: usize = 2048;

/// Default capacity of the destination write buffer
pub const DEFAULT_WRITE_BUFFER_SIZE: usize = 1024 * 1024;

/// Default quota per outcome class
pub const DEFAULT_TARGET_PER_CLASS: u64 = 100_000;

/// Configuration for one balancing run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    /// Records sampled per outcome class
    pub target_per_class: u64,

    /// Train/validation/test proportions
    pub split_ratios: SplitRatios,

    /// File of decisive games
    pub decisive_path: PathBuf,

    /// File of drawn games
    pub draw_path: PathBuf,

    /// Directory receiving the split files
    pub output_dir: PathBuf,

    /// Seed for reproducible sampling and shuffling
    pub random_seed: Option<u64>,

    /// Header bytes inspected when classifying a record
    pub scan_window: usize,

    /// Capacity of the destination write buffer
    pub write_buffer_size: usize,

    /// Extension of the split files
    pub output_extension: String,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            target_per_class: DEFAULT_TARGET_PER_CLASS,
            split_ratios: SplitRatios::default(),
            decisive_path: PathBuf::from("decisive.pgn"),
            draw_path: PathBuf::from("draws.pgn"),
            output_dir: PathBuf::from("balanced"),
            random_seed: None,
            scan_window: DEFAULT_SCAN_WINDOW,
            write_buffer_size: DEFAULT_WRITE_BUFFER_SIZE,
            output_extension: "pgn".to_string(),
        }
    }
}

impl BalanceConfig {
    /// Create a configuration for the given inputs and output directory
    pub fn new<P, Q, R>(decisive_path: P, draw_path: Q, output_dir: R) -> Self
    where
        P: Into<PathBuf>,
        Q: Into<PathBuf>,
        R: Into<PathBuf>,
    {
        Self {
            decisive_path: decisive_path.into(),
            draw_path: draw_path.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        debug!(path = %path.display(), "loading configuration");
        Self::from_json_str(&text)
    }

    /// Parse a configuration from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Check the configuration before any work starts
    pub fn validate(&self) -> Result<()> {
        self.split_ratios.normalized()?;

        if self.scan_window == 0 {
            return Err(Error::InvalidConfig("scan_window must be positive".into()));
        }
        if self.write_buffer_size == 0 {
            return Err(Error::InvalidConfig(
                "write_buffer_size must be positive".into(),
            ));
        }
        if self.decisive_path == self.draw_path {
            return Err(Error::InvalidConfig(format!(
                "decisive and draw inputs are the same file: {}",
                self.decisive_path.display()
            )));
        }
        Ok(())
    }

    /// Input files keyed by source identity
    pub fn sources(&self) -> SourceSet {
        SourceSet::new(&self.decisive_path, &self.draw_path)
    }

    /// Destination path of one split
    pub fn output_path(&self, split: SplitName) -> PathBuf {
        self.output_dir.join(split.file_name(&self.output_extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = BalanceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scan_window, 2048);
        assert_eq!(config.write_buffer_size, 1 << 20);
    }

    #[test]
    fn test_same_inputs_rejected() {
        let config = BalanceConfig::new("games.pgn", "games.pgn", "out");
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = BalanceConfig::from_json_str(
            r#"{
                "target_per_class": 3,
                "random_seed": 7,
                "split_ratios": { "train": 0.6, "validation": 0.2, "test": 0.2 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.target_per_class, 3);
        assert_eq!(config.random_seed, Some(7));
        assert_eq!(config.split_ratios, SplitRatios::new(0.6, 0.2, 0.2));
        assert_eq!(config.scan_window, DEFAULT_SCAN_WINDOW);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "output_dir": "splits", "output_extension": "txt" }}"#).unwrap();

        let config = BalanceConfig::from_json_file(file.path()).unwrap();
        assert_eq!(
            config.output_path(SplitName::Validation),
            PathBuf::from("splits/validation.txt")
        );
    }

    #[test]
    fn test_malformed_json() {
        let err = BalanceConfig::from_json_str("{ target_per_class: }").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
