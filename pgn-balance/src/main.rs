//! Command line entry point

use std::path::PathBuf;

use anyhow::{bail, Context as _};
use clap::{Args, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use pgn_balance::{discover_inputs, extract_outcome, run_balance, ExtractOptions};
use pgn_balance_core::config::DEFAULT_SCAN_WINDOW;
use pgn_balance_core::{BalanceConfig, OutcomeLabel, SplitRatios};
use pgn_balance_readers::RecordIndexer;

#[derive(Debug, Parser)]
#[command(
    name = "pgn-balance",
    version,
    about = "Build class-balanced train/validation/test PGN files"
)]
struct Cli {
    /// More log output (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sample an equal number of white wins, black wins and draws into split files
    Balance(BalanceArgs),
    /// Copy every record of one outcome from several files into one file
    Extract(ExtractArgs),
    /// Count the records of each outcome in one file
    Index(IndexArgs),
}

#[derive(Debug, Args)]
struct BalanceArgs {
    /// JSON configuration file; flags below override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// File holding the decisive games
    #[arg(long, value_name = "FILE")]
    decisive: Option<PathBuf>,

    /// File holding the drawn games
    #[arg(long, value_name = "FILE")]
    draws: Option<PathBuf>,

    /// Directory receiving train/validation/test files
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Records per outcome class
    #[arg(long, value_name = "N")]
    target: Option<u64>,

    /// Split proportions as TRAIN,VALIDATION,TEST
    #[arg(long, value_name = "T,V,T", value_parser = parse_ratios)]
    ratios: Option<SplitRatios>,

    /// Seed for reproducible output
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Header bytes inspected for the Result tag
    #[arg(long, value_name = "BYTES")]
    scan_window: Option<usize>,

    /// Output write buffer capacity
    #[arg(long, value_name = "BYTES")]
    buffer_size: Option<usize>,

    /// Extension of the split files
    #[arg(long, value_name = "EXT")]
    extension: Option<String>,
}

impl BalanceArgs {
    fn into_config(self) -> anyhow::Result<BalanceConfig> {
        let mut config = match &self.config {
            Some(path) => BalanceConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => BalanceConfig::default(),
        };

        if let Some(path) = self.decisive {
            config.decisive_path = path;
        }
        if let Some(path) = self.draws {
            config.draw_path = path;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(target) = self.target {
            config.target_per_class = target;
        }
        if let Some(ratios) = self.ratios {
            config.split_ratios = ratios;
        }
        if self.seed.is_some() {
            config.random_seed = self.seed;
        }
        if let Some(window) = self.scan_window {
            config.scan_window = window;
        }
        if let Some(size) = self.buffer_size {
            config.write_buffer_size = size;
        }
        if let Some(ext) = self.extension {
            config.output_extension = ext;
        }
        Ok(config)
    }
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Input files, read in the order given
    #[arg(value_name = "FILE", conflicts_with = "dir")]
    files: Vec<PathBuf>,

    /// Read the first --limit files of this directory instead, sorted by name
    #[arg(long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Number of directory files to read
    #[arg(long, value_name = "N", default_value_t = 3, requires = "dir")]
    limit: usize,

    /// Extension of directory files to read
    #[arg(long, value_name = "EXT", default_value = "pgn")]
    extension: String,

    /// Combined output file, overwritten if present
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Outcome to keep: white-win, black-win or draw (or 1-0, 0-1, 1/2-1/2)
    #[arg(long, value_name = "OUTCOME", default_value = "draw", value_parser = parse_label)]
    label: OutcomeLabel,

    /// Header bytes inspected for the Result tag
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_SCAN_WINDOW)]
    scan_window: usize,
}

#[derive(Debug, Args)]
struct IndexArgs {
    /// File to scan
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Header bytes inspected for the Result tag
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_SCAN_WINDOW)]
    scan_window: usize,
}

fn parse_ratios(s: &str) -> Result<SplitRatios, String> {
    let parts = s
        .split(',')
        .map(|part| part.trim().parse::<f64>().map_err(|err| format!("{part:?}: {err}")))
        .collect::<Result<Vec<_>, _>>()?;
    match parts[..] {
        [train, validation, test] => Ok(SplitRatios::new(train, validation, test)),
        _ => Err(format!("expected three comma-separated ratios, got {}", parts.len())),
    }
}

fn parse_label(s: &str) -> Result<OutcomeLabel, String> {
    OutcomeLabel::parse(s).ok_or_else(|| format!("unknown outcome {s:?}"))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn balance(args: BalanceArgs) -> anyhow::Result<()> {
    let config = args.into_config()?;
    let report = run_balance(&config).with_context(|| {
        format!(
            "balancing {} and {} into {}",
            config.decisive_path.display(),
            config.draw_path.display(),
            config.output_dir.display()
        )
    })?;
    println!("{report}");
    Ok(())
}

fn extract(args: ExtractArgs) -> anyhow::Result<()> {
    let inputs = match &args.dir {
        Some(dir) => {
            let exclude = Some(args.output.as_path());
            discover_inputs(dir, &args.extension, exclude, Some(args.limit))
                .with_context(|| format!("listing {}", dir.display()))?
        }
        None => args.files,
    };
    if inputs.is_empty() {
        bail!("no input files");
    }

    let options = ExtractOptions {
        scan_window: args.scan_window,
        ..ExtractOptions::new(inputs, args.label, args.output)
    };
    let summary = extract_outcome(&options)
        .with_context(|| format!("extracting into {}", options.output.display()))?;

    for (path, count) in &summary.per_file {
        println!("{:>10}  {}", count, path.display());
    }
    for path in &summary.skipped {
        println!("{:>10}  {} (skipped)", "-", path.display());
    }
    println!(
        "Total: {} {} records -> {}",
        summary.total(),
        options.label,
        options.output.display()
    );
    Ok(())
}

fn index(args: &IndexArgs) -> anyhow::Result<()> {
    let pool = RecordIndexer::new(args.scan_window)
        .try_index_file(&args.file)
        .with_context(|| format!("indexing {}", args.file.display()))?;

    println!("{} ({} bytes)", args.file.display(), pool.file_size());
    for label in OutcomeLabel::ALL {
        println!(
            "  {:<12} {:>8} {:>10}",
            label.to_string(),
            label.result_str(),
            pool.len(label)
        );
    }
    println!("  {:<12} {:>8} {:>10}", "unclassified", "", pool.unclassified());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Balance(args) => balance(args),
        Command::Extract(args) => extract(args),
        Command::Index(args) => index(&args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use test_case::test_case;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test_case("0.8,0.1,0.1", Some((0.8, 0.1, 0.1)) ; "default split")]
    #[test_case(" 0.7 , 0.2 ,0.1", Some((0.7, 0.2, 0.1)) ; "spaces")]
    #[test_case("0.5,0.5", None ; "two values")]
    #[test_case("a,b,c", None ; "not numbers")]
    fn test_parse_ratios(input: &str, expected: Option<(f64, f64, f64)>) {
        let parsed = parse_ratios(input).ok().map(|r| (r.train, r.validation, r.test));
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("balance.json");
        std::fs::write(&path, r#"{"target_per_class": 10, "random_seed": 3}"#).unwrap();

        let cli = Cli::try_parse_from([
            "pgn-balance",
            "balance",
            "--config",
            path.to_str().unwrap(),
            "--target",
            "25",
            "--ratios",
            "0.6,0.2,0.2",
        ])
        .unwrap();
        let Command::Balance(args) = cli.command else {
            panic!("expected balance subcommand");
        };
        let config = args.into_config().unwrap();

        assert_eq!(config.target_per_class, 25);
        assert_eq!(config.random_seed, Some(3));
        assert_eq!(config.split_ratios, SplitRatios::new(0.6, 0.2, 0.2));
    }

    #[test]
    fn test_extract_label_aliases() {
        let cli = Cli::try_parse_from([
            "pgn-balance",
            "extract",
            "a.pgn",
            "-o",
            "out.pgn",
            "--label",
            "1-0",
        ])
        .unwrap();
        let Command::Extract(args) = cli.command else {
            panic!("expected extract subcommand");
        };
        assert_eq!(args.label, OutcomeLabel::WhiteWin);
        assert_eq!(args.files, vec![PathBuf::from("a.pgn")]);
    }
}
