//! Balanced extraction pipeline
//!
//! Indexer → sampler → partitioner → writer, run once per configuration.
//! Index failures shrink the affected pools; write failures abort the run.

use std::fs;

use tracing::info;

use pgn_balance_core::{
    BalanceConfig, OutcomeLabel, RecordSpan, Result, SourceFile, SplitName, TaggedSpan,
};
use pgn_balance_readers::RecordIndexer;
use pgn_balance_shuffle::{partition, sample_class, seeded_rng, DatasetWriter, Partition};

use crate::report::{BalanceReport, SplitReport};

/// Run the whole pipeline for `config`.
///
/// With `random_seed` set, unchanged inputs produce byte-identical outputs.
pub fn run_balance(config: &BalanceConfig) -> Result<BalanceReport> {
    config.validate()?;

    let sources = config.sources();
    let indexer = RecordIndexer::new(config.scan_window);
    let mut rng = seeded_rng(config.random_seed);
    let mut report = BalanceReport::default();

    let mut scanned = indexer.index_sources(&sources);
    for source in SourceFile::ALL {
        report.unclassified[source.index()] = scanned[source.index()].unclassified();
    }
    let pools: [Vec<RecordSpan>; OutcomeLabel::COUNT] = OutcomeLabel::ALL
        .map(|label| scanned[SourceFile::for_label(label).index()].take(label));
    // Draws found in the decisive file, and decisive games in the draw file, are not sampled.
    drop(scanned);

    for label in OutcomeLabel::ALL {
        report.pool_sizes[label.index()] = pools[label.index()].len();
    }
    info!(
        white = report.pool_sizes[OutcomeLabel::WhiteWin.index()],
        black = report.pool_sizes[OutcomeLabel::BlackWin.index()],
        draw = report.pool_sizes[OutcomeLabel::Draw.index()],
        "pools ready"
    );

    let samples = OutcomeLabel::ALL
        .map(|label| sample_class(label, &pools[label.index()], config.target_per_class, &mut rng));
    for sample in &samples {
        report.sampled[sample.label.index()] = sample.len();
        report.shortfalls.extend(sample.shortfall);
    }

    let partitions: [Partition<'_, usize>; OutcomeLabel::COUNT] =
        std::array::from_fn(|i| partition(&samples[i].indices, &config.split_ratios));

    fs::create_dir_all(&config.output_dir)?;
    let writer = DatasetWriter::new(&sources).with_buffer_size(config.write_buffer_size);

    let largest = SplitName::ALL
        .iter()
        .map(|&split| partitions.iter().map(|p| p.get(split).len()).sum::<usize>())
        .max()
        .unwrap_or(0);
    let mut buffer: Vec<TaggedSpan> = Vec::with_capacity(largest);

    for split in SplitName::ALL {
        buffer.clear();
        let mut per_class = [0; OutcomeLabel::COUNT];
        for label in OutcomeLabel::ALL {
            let pool = &pools[label.index()];
            let source = SourceFile::for_label(label);
            let chosen = partitions[label.index()].get(split);
            per_class[label.index()] = chosen.len();
            buffer.extend(chosen.iter().map(|&i| pool[i].tagged(source)));
        }

        info!(
            split = %split,
            total = buffer.len(),
            white = per_class[OutcomeLabel::WhiteWin.index()],
            black = per_class[OutcomeLabel::BlackWin.index()],
            draw = per_class[OutcomeLabel::Draw.index()],
            "assembling split"
        );

        let path = config.output_path(split);
        let written = writer.write_split(split, &mut buffer, &path, &mut rng)?;
        report.splits.push(SplitReport {
            split,
            path,
            per_class,
            written,
        });
    }

    info!(
        records = report.total_records(),
        shortfalls = report.shortfalls.len(),
        output = %config.output_dir.display(),
        "balanced dataset complete"
    );
    Ok(report)
}
