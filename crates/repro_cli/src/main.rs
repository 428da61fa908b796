//! REPRO CLI
//!
//! Runs a repro blob against one backend version, or against every
//! registered version with `--regress`.

#![warn(missing_docs)]
#![warn(clippy::all)]

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use repro_backend::{BackendRegistry, bundled_lib_dir};
use repro_core::{HarnessConfig, HarnessError, HarnessResult};
use repro_regress::{BlockOptions, Outcome, RegressionReport, RegressionRunner};
use repro_render::{ReportFormatter, formatter};
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "repro=warn";

#[derive(Parser, Debug)]
#[command(name = "repro")]
#[command(about = "REPRO - Compiler backend regression harness", long_about = None)]
struct Cli {
    /// Repro file; the clipboard is read when neither a file nor --stdin is given
    file: Option<PathBuf>,
    /// Read the repro from standard input
    #[arg(short, long, conflicts_with = "file")]
    stdin: bool,
    /// Backend version to load
    #[arg(short, long)]
    version: Option<String>,
    /// Generate a Markdown report
    #[arg(short, long)]
    markdown: bool,
    /// Print diagnostics only
    #[arg(short, long)]
    errors: bool,
    /// Run every registered version and compare
    #[arg(short, long)]
    regress: bool,
    /// With --regress, print only the lines that changed between adjacent versions
    #[arg(short, long, requires = "regress")]
    diff: bool,
    /// Directory holding the backend library files
    #[arg(long)]
    lib_dir: Option<PathBuf>,
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the registered version keys and exit
    #[arg(long)]
    list_versions: bool,
}

/// Where the repro text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
enum InputSource {
    File(PathBuf),
    Stdin,
    Clipboard,
}

impl InputSource {
    fn from_cli(cli: &Cli) -> Self {
        match (&cli.file, cli.stdin) {
            (_, true) => Self::Stdin,
            (Some(path), false) => Self::File(path.clone()),
            (None, false) => Self::Clipboard,
        }
    }

    /// File name given to text before any `@filename` directive
    fn file_name(&self, fallback: &str) -> String {
        match self {
            Self::File(path) => path
                .file_name()
                .map_or_else(|| fallback.to_string(), |name| name.to_string_lossy().into_owned()),
            Self::Stdin => "stdin.ts".to_string(),
            Self::Clipboard => "clipboard.ts".to_string(),
        }
    }

    /// Read the whole input; `None` when the clipboard holds no text
    fn read(&self) -> HarnessResult<Option<String>> {
        match self {
            Self::File(path) => std::fs::read_to_string(path)
                .map(Some)
                .map_err(|e| HarnessError::Input {
                    reason: format!("{}: {}", path.display(), e),
                }),
            Self::Stdin => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .map_err(|e| HarnessError::Input {
                        reason: format!("stdin: {e}"),
                    })?;
                Ok(Some(text))
            }
            Self::Clipboard => {
                let text = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.get_text());
                match text {
                    Ok(text) if !text.is_empty() => Ok(Some(text)),
                    Ok(_) => Ok(None),
                    Err(e) => {
                        debug!(error = %e, "clipboard unavailable");
                        Ok(None)
                    }
                }
            }
        }
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Merge the configuration file with flags; flags win
fn resolve_config(cli: &Cli) -> HarnessResult<HarnessConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = HarnessConfig::load(path)?;
            // Unset in the file
            if config.lib_dir == HarnessConfig::default().lib_dir {
                config.lib_dir = bundled_lib_dir();
            }
            config
        }
        None => HarnessConfig::new(bundled_lib_dir()),
    };
    if let Some(dir) = &cli.lib_dir {
        config.lib_dir = dir.clone();
    }
    if let Some(version) = &cli.version {
        config.default_version = version.clone();
    }
    Ok(config)
}

/// Format a finished run for stdout
fn render_report(
    report: &RegressionReport,
    formatter: &dyn ReportFormatter,
    changes_only: bool,
) -> Result<String> {
    if report.regression && changes_only {
        return Ok(report.render_changes(formatter));
    }
    if report.regression {
        return Ok(report.render(formatter));
    }
    let Some(entry) = report.entries.first() else {
        return Ok(String::new());
    };
    if let Outcome::Failed { error } = &entry.outcome {
        return Err(eyre!("{error}"));
    }
    Ok(formatter.literal(&entry.block))
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();
    let cli = Cli::parse();

    let config = resolve_config(&cli)?;
    let registry = BackendRegistry::with_reference_backends(&config.lib_dir);

    if cli.list_versions {
        for version in registry.versions() {
            println!("{version}");
        }
        return Ok(());
    }

    let input = InputSource::from_cli(&cli);
    let Some(text) = input.read()? else {
        println!("No input specified");
        return Ok(());
    };

    let factories = registry.sweep_from(&config.default_version)?;
    let block = BlockOptions::default()
        .with_max_diagnostics(Some(config.max_rendered_diagnostics))
        .with_outputs(!cli.errors);
    let runner = RegressionRunner::new(factories)
        .with_force(cli.regress)
        .with_default_file_name(input.file_name(&config.default_file_name))
        .with_block_options(block);

    let report = runner.run(&text);
    let output = render_report(&report, formatter(cli.markdown), cli.diff)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
