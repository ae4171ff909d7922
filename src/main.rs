/// Anonymity Checker - scans notebooks for identifying information
///
/// The main entry point for the checker. It parses command-line arguments,
/// runs the scan and writes the compliance report. Exits 0 when every
/// notebook is compliant and 1 otherwise.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use colored::Colorize;
use log::{error, info, warn, LevelFilter};

use anonymity_checker::app::{self, CheckError, NotebookReport};
use anonymity_checker::config;
use anonymity_checker::core::patterns::load_patterns;
use anonymity_checker::utils::file_utils::{self, LoadError};
use anonymity_checker::utils::output_formatter;

const USAGE: &str = "Usage: anonymity_checker <notebook_path>\nExample: anonymity_checker model.ipynb";

/// Command line argument structure
#[derive(Parser, Debug)]
#[command(
    name = "anonymity_checker",
    version,
    about = "Scans notebooks for information that would break anonymous review",
    long_about = "This tool scans notebook code cells and cell outputs for:
- Home directory paths (Unix, macOS, Windows)
- Personal names and usernames
- Course and research project identifiers"
)]
struct Args {
    /// Path(s) to the notebook(s) to check
    notebook_paths: Vec<String>,

    /// Check all notebooks in directory (recursively)
    #[arg(long = "dir")]
    dir: Option<String>,

    /// Text report path (default: ANONYMITY_REPORT.txt)
    #[arg(long = "report")]
    report: Option<String>,

    /// Export results to JSON file
    #[arg(long = "json")]
    json: Option<String>,

    /// Export results to HTML report
    #[arg(long = "html")]
    html: Option<String>,

    /// Export results to CSV file
    #[arg(long = "csv")]
    csv: Option<String>,

    /// Path to configuration file
    #[arg(long = "config")]
    config: Option<String>,

    /// Suppress terminal output
    #[arg(long = "quiet", action = ArgAction::SetTrue)]
    quiet: bool,

    /// Set logging level (default: WARN)
    #[arg(long = "log-level", default_value = "warn")]
    log_level: LevelFilter,

    /// Log file path (default: stderr)
    #[arg(long = "log-file")]
    log_file: Option<String>,
}

/// Main entry point function
fn main() -> Result<()> {
    let start_time = Instant::now();

    let args = Args::parse();

    setup_logging(&args);

    let config = config::load_config(args.config.as_deref().map(Path::new))?;
    let rules = load_patterns(&config.extra_patterns).context("Invalid pattern in configuration")?;

    let notebooks = get_notebooks_to_check(&args)?;

    let reports = match app::run_checker(&notebooks, &rules) {
        Ok(reports) => reports,
        Err(CheckError::NoInput) => {
            eprintln!("{}", USAGE);
            process::exit(1);
        }
        Err(CheckError::Load(LoadError::NotFound { path })) => {
            eprintln!("{}", format!("❌ Error: {} not found", path.display()).red());
            process::exit(1);
        }
        Err(e) => {
            error!("Check aborted: {}", e);
            return Err(e.into());
        }
    };

    if !args.quiet {
        print!("{}", output_formatter::format_header());
        print_reports(&reports);
        print!("{}", output_formatter::format_summary(&reports, start_time.elapsed()));
    }

    let report_path = args
        .report
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| config.report_path());
    export_all_results(&reports, &report_path, &args)?;

    if !args.quiet {
        println!("\n📋 Report saved to: {}", report_path.display());
    }

    process::exit(app::overall_compliance(&reports).exit_code());
}

/// Set up logging with file or console output
fn setup_logging(args: &Args) {
    let mut builder = env_logger::Builder::new();

    builder.filter_level(args.log_level);

    builder.format(|buf, record| {
        use chrono::Local;
        use std::io::Write;
        writeln!(
            buf,
            "{} - {} - {} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    if let Some(log_file) = &args.log_file {
        match File::create(log_file) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("Could not open log file {}: {}", log_file, e),
        }
    }

    builder.init();
}

/// Get list of notebooks to check based on command line arguments
fn get_notebooks_to_check(args: &Args) -> Result<Vec<PathBuf>> {
    let mut notebooks: Vec<PathBuf> = args.notebook_paths.iter().map(PathBuf::from).collect();

    if let Some(dir) = &args.dir {
        let found = match file_utils::find_notebooks(Path::new(dir)) {
            Ok(found) => found,
            Err(LoadError::NotFound { path }) => {
                eprintln!("{}", format!("❌ Error: {} not found", path.display()).red());
                process::exit(1);
            }
            Err(e) => return Err(e.into()),
        };
        if found.is_empty() {
            warn!("No notebooks found under {}", dir);
        } else {
            info!("Found {} notebooks under {}", found.len(), dir);
        }
        notebooks.extend(found);
    }

    Ok(notebooks)
}

/// Print per-notebook results to the console
fn print_reports(reports: &[NotebookReport]) {
    for report in reports {
        if reports.len() > 1 {
            println!("{} {}\n", "Results for:".cyan(), report.notebook.display());
        }
        println!("{}", output_formatter::format_violations(&report.violations));
    }
}

/// Write the text report and any requested exports
fn export_all_results(reports: &[NotebookReport], report_path: &Path, args: &Args) -> Result<()> {
    output_formatter::write_text_report(reports, report_path)?;

    if let Some(json_path) = &args.json {
        output_formatter::export_results_json(reports, Path::new(json_path))?;
    }

    if let Some(html_path) = &args.html {
        output_formatter::create_html_report(reports, Path::new(html_path))?;
    }

    if let Some(csv_path) = &args.csv {
        output_formatter::create_csv_report(reports, Path::new(csv_path))?;
    }

    Ok(())
}
