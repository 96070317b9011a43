//! Output split names and ratio configuration

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One of the three output partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SplitName {
    /// Training split
    Train,
    /// Validation split
    Validation,
    /// Test split
    Test,
}

impl SplitName {
    /// All splits in write order
    pub const ALL: [SplitName; 3] = [Self::Train, Self::Validation, Self::Test];

    /// File stem of the split
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Validation => "validation",
            Self::Test => "test",
        }
    }

    /// File name of the split with the given extension
    pub fn file_name(self, extension: &str) -> String {
        if extension.is_empty() {
            self.as_str().to_string()
        } else {
            format!("{}.{}", self.as_str(), extension.trim_start_matches('.'))
        }
    }
}

impl fmt::Display for SplitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ratio configuration for train/validation/test assignment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitRatios {
    /// Fraction assigned to train
    pub train: f64,
    /// Fraction assigned to validation
    pub validation: f64,
    /// Fraction assigned to test
    pub test: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: 0.8,
            validation: 0.1,
            test: 0.1,
        }
    }
}

impl SplitRatios {
    /// Create ratios from a `(train, validation, test)` tuple
    pub fn new(train: f64, validation: f64, test: f64) -> Self {
        Self {
            train,
            validation,
            test,
        }
    }

    /// Validate that ratios are non-negative and sum to `1.0` (within epsilon).
    pub fn normalized(self) -> Result<Self> {
        let parts = [self.train, self.validation, self.test];
        if parts.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(Error::InvalidConfig(format!(
                "split ratios must be non-negative, got {self}"
            )));
        }
        let sum: f64 = parts.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(Error::InvalidConfig(format!(
                "split ratios must sum to 1.0, got {self} (sum {sum})"
            )));
        }
        Ok(self)
    }

    /// Ratio for one split
    pub fn get(&self, split: SplitName) -> f64 {
        match split {
            SplitName::Train => self.train,
            SplitName::Validation => self.validation,
            SplitName::Test => self.test,
        }
    }
}

impl fmt::Display for SplitRatios {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.train, self.validation, self.test)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0.8, 0.1, 0.1, true ; "default ratios")]
    #[test_case(1.0, 0.0, 0.0, true ; "train only")]
    #[test_case(0.7, 0.2, 0.2, false ; "sum above one")]
    #[test_case(1.2, -0.1, -0.1, false ; "negative part")]
    #[test_case(f64::NAN, 0.5, 0.5, false ; "nan part")]
    fn test_normalized(train: f64, validation: f64, test: f64, ok: bool) {
        assert_eq!(SplitRatios::new(train, validation, test).normalized().is_ok(), ok);
    }

    #[test]
    fn test_file_names() {
        assert_eq!(SplitName::Train.file_name("pgn"), "train.pgn");
        assert_eq!(SplitName::Validation.file_name(".pgn"), "validation.pgn");
        assert_eq!(SplitName::Test.file_name(""), "test");
    }
}
