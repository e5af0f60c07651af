use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use mta_rust_importblock_core::{format_output, ImportBlockScanner, OutputFormat, ScanConfig};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "importblock")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Detect and categorize import blocks in Swift and Objective-C/C sources")]
#[command(long_about = "Scans source files for their block of import/include declarations \
    and classifies each declaration by dialect category (framework, testable, module, global, \
    local). Declarations inside #if/#ifdef blocks and clang diagnostic push/pop regions are \
    skipped.\n\n\
    Dialects default to the built-in Swift and Objective-C/C groups; use --config to load \
    groups from a TOML or JSON file.")]
pub struct Args {
    /// Files or directories to scan
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormatArg::Json)]
    pub format: OutputFormatArg,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Dialect config file (TOML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Only scan files with these extensions
    #[arg(long = "ext", action = clap::ArgAction::Append)]
    pub extensions: Vec<String>,

    /// Additional ignore patterns (glob style)
    #[arg(long, action = clap::ArgAction::Append)]
    pub ignore: Vec<String>,

    /// Ignore file path (defaults to .gitignore)
    #[arg(long)]
    pub ignore_file: Option<PathBuf>,

    /// Only report files that have an import block
    #[arg(long)]
    pub blocks_only: bool,

    /// Show progress and debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Parallel threads (0 = auto)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Summary,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Yaml => OutputFormat::Yaml,
            OutputFormatArg::Summary => OutputFormat::Summary,
        }
    }
}

impl Args {
    fn scan_config(&self) -> ScanConfig {
        let mut config = ScanConfig::new(self.paths.clone())
            .with_ignore_patterns(self.ignore.clone())
            .with_threads(self.threads);

        if !self.extensions.is_empty() {
            config = config.with_extensions(self.extensions.clone());
        }

        if let Some(ref ignore_file) = self.ignore_file {
            config = config.with_ignore_file(ignore_file.clone());
        }

        if let Some(ref path) = self.config {
            config = config.with_detector_config(path.clone());
        }

        config
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let spinner = if args.verbose {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Scanning for import blocks...");
        Some(pb)
    } else {
        None
    };

    let scanner = ImportBlockScanner::new(args.scan_config())?;
    let report = scanner.scan()?;

    if let Some(ref pb) = spinner {
        pb.finish_with_message(format!(
            "Scanned {} files in {}ms",
            report.stats.total_files, report.metadata.scan_duration_ms
        ));
    }

    let report = if args.blocks_only {
        report.filter_to_blocks()
    } else {
        report
    };

    let output = format_output(&report, args.format.clone().into())?;

    if let Some(path) = args.output {
        fs::write(&path, &output)?;
        tracing::info!("Output written to: {}", path.display());
    } else {
        println!("{}", output);
    }

    Ok(())
}
