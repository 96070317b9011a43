//! Single-class extraction
//!
//! Collects every record of one outcome class from several PGN files into a
//! combined file, e.g. to build the draw corpus consumed by the balancer.
//! Inputs follow the indexing policy (missing or unreadable files are skipped
//! with a log entry); the output follows the writing policy (fail-fast).

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use pgn_balance_core::config::{DEFAULT_SCAN_WINDOW, DEFAULT_WRITE_BUFFER_SIZE};
use pgn_balance_core::{Error, OutcomeLabel, Result};
use pgn_balance_readers::RecordIndexer;
use pgn_balance_shuffle::{RecordCopier, WriteSummary};

/// Options for one extraction run
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Files to read, in order
    pub inputs: Vec<PathBuf>,
    /// Class to keep
    pub label: OutcomeLabel,
    /// Combined output file, recreated on every run
    pub output: PathBuf,
    /// Header bytes inspected when classifying a record
    pub scan_window: usize,
    /// Capacity of the output write buffer
    pub write_buffer_size: usize,
}

impl ExtractOptions {
    /// Extract `label` records from `inputs` into `output` with default buffers
    pub fn new(inputs: Vec<PathBuf>, label: OutcomeLabel, output: PathBuf) -> Self {
        Self {
            inputs,
            label,
            output,
            scan_window: DEFAULT_SCAN_WINDOW,
            write_buffer_size: DEFAULT_WRITE_BUFFER_SIZE,
        }
    }
}

/// Result of an extraction run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Records taken from each input that could be read
    pub per_file: Vec<(PathBuf, u64)>,
    /// Inputs that were missing or could not be scanned
    pub skipped: Vec<PathBuf>,
    /// Counters from the writer
    pub written: WriteSummary,
}

impl ExtractSummary {
    /// Records extracted across all inputs
    pub fn total(&self) -> u64 {
        self.written.records
    }
}

/// List the files in `dir` with the given extension, sorted by name.
///
/// `exclude` keeps a previous output living in the same directory out of the
/// list; `limit` keeps only the first files after sorting.
pub fn discover_inputs(
    dir: &Path,
    extension: &str,
    exclude: Option<&Path>,
    limit: Option<usize>,
) -> Result<Vec<PathBuf>> {
    let extension = extension.trim_start_matches('.');
    let excluded = exclude.and_then(|path| path.file_name().map(ToOwned::to_owned));

    let mut inputs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let matches_ext = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        let is_excluded = excluded.is_some() && path.file_name() == excluded.as_deref();
        if path.is_file() && matches_ext && !is_excluded {
            inputs.push(path);
        }
    }
    inputs.sort();

    if let Some(limit) = limit {
        inputs.truncate(limit);
    }
    Ok(inputs)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Copy every `options.label` record of every input into `options.output`.
pub fn extract_outcome(options: &ExtractOptions) -> Result<ExtractSummary> {
    if let Some(input) = options.inputs.iter().find(|input| same_file(input, &options.output)) {
        return Err(Error::InvalidConfig(format!(
            "output {} is also an input",
            input.display()
        )));
    }
    if options.output.exists() {
        info!(path = %options.output.display(), "replacing previous output");
    }

    let indexer = RecordIndexer::new(options.scan_window);
    let mut copier = RecordCopier::create(&options.output, options.write_buffer_size)?;
    let mut summary = ExtractSummary::default();

    for input in &options.inputs {
        let mapped = match RecordIndexer::map_file(input) {
            Ok(mapped) => mapped,
            Err(err @ Error::InputMissing { .. }) => {
                warn!("{err}; skipping");
                summary.skipped.push(input.clone());
                continue;
            }
            Err(err) => {
                error!("{err}; skipping");
                summary.skipped.push(input.clone());
                continue;
            }
        };

        let pool = indexer.index_bytes(mapped.as_slice());
        let spans = pool.get(options.label);
        for &span in spans {
            let record = mapped
                .slice(span)
                .map_err(|err| Error::write(&options.output, err))?;
            copier.write_record(record)?;
        }

        info!(
            file = %input.display(),
            label = %options.label,
            records = spans.len(),
            scanned = pool.total() as u64 + pool.unclassified(),
            "extracted"
        );
        summary.per_file.push((input.clone(), spans.len() as u64));
    }

    summary.written = copier.finish()?;
    info!(
        total = summary.total(),
        path = %options.output.display(),
        "extraction complete"
    );
    Ok(summary)
}
