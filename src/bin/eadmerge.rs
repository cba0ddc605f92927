//! eadmerge CLI: merge accepted authority names into EAD finding aids.
//!
//! Usage:
//!   eadmerge <dump> <ead-dir> [--config merge.yaml] [--output-folder MERGED] [--strict]

use clap::{CommandFactory, Parser};
use eadmerge::{MergeConfig, MergeRun};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "eadmerge",
    version,
    about = "Merge disambiguated authority names into EAD finding aids"
)]
struct Cli {
    /// Record batch: a JSON array or one JSON record per line
    dump: Option<String>,
    /// Directory holding the source finding aids
    ead_dir: Option<String>,
    /// YAML file overriding tag names, parents and language settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Name of the output subfolder inside the finding-aid directory
    #[arg(long)]
    output_folder: Option<String>,
    /// Exit with status 2 when any record or document failed
    #[arg(long)]
    strict: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn non_blank(arg: Option<String>) -> Option<PathBuf> {
    arg.filter(|a| !a.trim().is_empty()).map(PathBuf::from)
}

fn load_config(cli: &Cli) -> Result<MergeConfig, String> {
    let config = match &cli.config {
        Some(path) => MergeConfig::load(path).map_err(|e| e.to_string())?,
        None => MergeConfig::default(),
    };
    let config = match &cli.output_folder {
        Some(folder) => config.with_output_folder(folder),
        None => config,
    };
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let (Some(dump), Some(ead_dir)) = (non_blank(cli.dump.clone()), non_blank(cli.ead_dir.clone())) else {
        tracing::error!("missing arguments");
        let _ = Cli::command().print_help();
        return;
    };

    if !dump.is_file() {
        eprintln!("Error: record batch {} does not exist", dump.display());
        std::process::exit(1);
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let run = match MergeRun::from_paths(config, &dump, &ead_dir) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let report = run.run();
    println!(
        "{} records: {} merged ({} new, {} refreshed), {} skipped, {} failed; {} documents written",
        report.records,
        report.merged.len(),
        report.created(),
        report.refreshed(),
        report.skipped.len(),
        report.failures.len(),
        report.written.len(),
    );
    if cli.strict && report.has_failures() {
        std::process::exit(2);
    }
}
