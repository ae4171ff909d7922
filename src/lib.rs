/// Anonymity Checker - scans notebooks for identifying information
///
/// This library scans notebook documents for substrings that would break
/// anonymity: home directory paths, personal names and project identifiers.
/// Each match is reported with its cell, line and surrounding context.

// Re-export core modules
pub mod core;
pub mod utils;

// Re-export main types for convenience
pub use crate::core::notebook::{extract, DocumentFormatError, Notebook, TextOrigin, TextUnit};
pub use crate::core::patterns::{
    load_patterns, CompiledRule, PatternCompileError, PatternRule, DEFAULT_PATTERNS,
};
pub use crate::core::scanner::{scan, Compliance, Violation};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Check a single notebook against the built-in patterns
///
/// This is a convenience function for simple use cases.
pub fn check_notebook<P: AsRef<std::path::Path>>(
    notebook_path: P,
) -> Result<app::NotebookReport, app::CheckError> {
    let mut reports = app::run_checker(&[notebook_path], &crate::core::patterns::DEFAULT_COMPILED_RULES)?;
    Ok(reports.remove(0))
}

/// Library configuration
pub mod config {
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result};
    use log::info;
    use serde::Deserialize;

    use crate::core::patterns::PatternRule;

    /// Default location of the text report
    pub const DEFAULT_REPORT_PATH: &str = "ANONYMITY_REPORT.txt";

    /// Settings read from an optional JSON configuration file
    #[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
    #[serde(default)]
    pub struct Config {
        /// Rules checked after the built-in ones
        pub extra_patterns: Vec<PatternRule>,
        /// Where the text report is written, unless overridden on the command line
        pub report_path: Option<PathBuf>,
    }

    impl Config {
        pub fn report_path(&self) -> PathBuf {
            self.report_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_PATH))
        }
    }

    /// Load configuration from file if provided
    pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
        let Some(path) = config_path else {
            return Ok(Config::default());
        };

        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&config_str)
            .with_context(|| format!("Invalid JSON in configuration file: {}", path.display()))?;

        info!(
            "Loaded configuration from {} ({} extra patterns)",
            path.display(),
            config.extra_patterns.len()
        );
        Ok(config)
    }

}

/// Checking pipeline: load, extract, scan
pub mod app {
    use std::path::{Path, PathBuf};

    use log::{info, warn};
    use serde::Serialize;

    use crate::core::notebook::{extract, DocumentFormatError};
    use crate::core::patterns::CompiledRule;
    use crate::core::scanner::{scan, Compliance, Violation};
    use crate::utils::file_utils::{self, LoadError};

    /// Errors that stop a run before any report is produced
    #[derive(Debug, thiserror::Error)]
    pub enum CheckError {
        #[error("no notebook path supplied")]
        NoInput,

        #[error(transparent)]
        Load(#[from] LoadError),

        #[error("{}: {source}", path.display())]
        Format {
            path: PathBuf,
            #[source]
            source: DocumentFormatError,
        },
    }

    /// Scan result for one notebook
    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    pub struct NotebookReport {
        pub notebook: PathBuf,
        pub fingerprint: String,
        pub violations: Vec<Violation>,
    }

    impl NotebookReport {
        pub fn compliance(&self) -> Compliance {
            Compliance::from_violations(&self.violations)
        }
    }

    /// Combined classification of several notebook reports
    pub fn overall_compliance(reports: &[NotebookReport]) -> Compliance {
        if reports.iter().all(|r| r.compliance().is_compliant()) {
            Compliance::Compliant
        } else {
            Compliance::ViolationsFound
        }
    }

    /// Run the checker on multiple notebooks
    ///
    /// # Arguments
    ///
    /// * `notebook_paths` - Notebooks to check, in report order
    /// * `rules` - Compiled pattern rules
    ///
    /// # Returns
    ///
    /// One report per notebook. Every path is checked for existence before
    /// anything is scanned; any load or format error aborts the whole run.
    pub fn run_checker<P: AsRef<Path>>(
        notebook_paths: &[P],
        rules: &[CompiledRule],
    ) -> Result<Vec<NotebookReport>, CheckError> {
        if notebook_paths.is_empty() {
            return Err(CheckError::NoInput);
        }

        for path in notebook_paths {
            file_utils::ensure_exists(path.as_ref())?;
        }

        let mut reports = Vec::with_capacity(notebook_paths.len());

        for path in notebook_paths {
            let path = path.as_ref();
            info!("Checking notebook: {}", path.display());

            let loaded = file_utils::load_notebook(path)?;
            let units = extract(&loaded.document).map_err(|source| CheckError::Format {
                path: path.to_path_buf(),
                source,
            })?;
            let violations = scan(&units, rules);

            if violations.is_empty() {
                info!("{}: no violations", path.display());
            } else {
                warn!("{}: {} violations", path.display(), violations.len());
            }

            reports.push(NotebookReport {
                notebook: loaded.path,
                fingerprint: loaded.fingerprint,
                violations,
            });
        }

        Ok(reports)
    }
}
