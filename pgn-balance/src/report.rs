//! Run summaries

use std::fmt;
use std::path::PathBuf;

use pgn_balance_core::{OutcomeLabel, PoolShortfall, SourceFile, SplitName};
use pgn_balance_shuffle::WriteSummary;

/// What one split file received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitReport {
    /// Which split
    pub split: SplitName,
    /// Destination file
    pub path: PathBuf,
    /// Records per outcome class, indexed by [`OutcomeLabel::index`]
    pub per_class: [usize; OutcomeLabel::COUNT],
    /// Counters from the writer
    pub written: WriteSummary,
}

impl SplitReport {
    /// Records in this split across all classes
    pub fn total(&self) -> usize {
        self.per_class.iter().sum()
    }
}

/// Outcome of a balancing run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceReport {
    /// Pool sizes per outcome class, indexed by [`OutcomeLabel::index`]
    pub pool_sizes: [usize; OutcomeLabel::COUNT],
    /// Records per source that carried no outcome tag
    pub unclassified: [u64; SourceFile::COUNT],
    /// Classes that could not fill their quota
    pub shortfalls: Vec<PoolShortfall>,
    /// Sampled records per outcome class
    pub sampled: [usize; OutcomeLabel::COUNT],
    /// One entry per written split, in write order
    pub splits: Vec<SplitReport>,
}

impl BalanceReport {
    /// Records written across all splits
    pub fn total_records(&self) -> usize {
        self.splits.iter().map(SplitReport::total).sum()
    }
}

impl fmt::Display for BalanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pools:")?;
        for label in OutcomeLabel::ALL {
            writeln!(
                f,
                "  {:<10} {:>10} available, {:>10} sampled",
                label.to_string(),
                self.pool_sizes[label.index()],
                self.sampled[label.index()]
            )?;
        }
        for shortfall in &self.shortfalls {
            writeln!(f, "  warning: {shortfall}")?;
        }

        writeln!(f, "Splits:")?;
        for report in &self.splits {
            writeln!(
                f,
                "  {:<10} {:>10} ({} W / {} B / {} D) -> {}",
                report.split.as_str(),
                report.total(),
                report.per_class[OutcomeLabel::WhiteWin.index()],
                report.per_class[OutcomeLabel::BlackWin.index()],
                report.per_class[OutcomeLabel::Draw.index()],
                report.path.display()
            )?;
        }
        write!(f, "Total: {} records", self.total_records())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_every_split() {
        let report = BalanceReport {
            pool_sizes: [5, 3, 4],
            sampled: [3, 3, 3],
            splits: SplitName::ALL
                .iter()
                .map(|&split| SplitReport {
                    split,
                    path: PathBuf::from(split.file_name("pgn")),
                    per_class: [1, 1, 1],
                    written: WriteSummary::default(),
                })
                .collect(),
            ..BalanceReport::default()
        };

        let text = report.to_string();
        assert!(text.contains("train.pgn"));
        assert!(text.contains("validation.pgn"));
        assert!(text.contains("(1 W / 1 B / 1 D)"));
        assert!(text.ends_with("Total: 9 records"));
        assert_eq!(report.total_records(), 9);
    }
}
