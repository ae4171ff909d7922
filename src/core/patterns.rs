/// Pattern definitions for the anonymity checker
///
/// This module contains the disclosure-risk patterns a notebook is scanned for:
/// home directory paths, personal identifiers and project names. The built-in
/// list is fixed and ordered; its order decides report ordering.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Built-in (regex, description) pairs, in report order.
pub const DEFAULT_PATTERNS: &[(&str, &str)] = &[
    (r"/home/[a-zA-Z0-9_-]+/", "Unix home directory"),
    (r"/Users/[a-zA-Z0-9_-]+/", "macOS home directory"),
    (r"C:\\Users\\[a-zA-Z0-9_-]+\\", "Windows home directory"),
    (r"adetayo", "Personal username"),
    (r"Adetayo", "Personal name"),
    (r"CSCI Forms", "Course/context identifier"),
    (r"Cancer Screening", "Research project identifier"),
];

/// A single disclosure-risk signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRule {
    /// Regular expression source
    pub pattern: String,
    /// Human-readable label shown in reports
    pub description: String,
}

impl PatternRule {
    pub fn new(pattern: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            description: description.into(),
        }
    }
}

/// Error when a pattern does not compile
#[derive(Debug, thiserror::Error)]
#[error("invalid pattern '{pattern}' ({description}): {source}")]
pub struct PatternCompileError {
    pub pattern: String,
    pub description: String,
    #[source]
    pub source: regex::Error,
}

/// A pattern rule paired with its compiled regex
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub rule: PatternRule,
    pub regex: Regex,
}

impl CompiledRule {
    pub fn pattern(&self) -> &str {
        &self.rule.pattern
    }

    pub fn description(&self) -> &str {
        &self.rule.description
    }
}

/// Get the built-in rules as owned records.
pub fn default_rules() -> Vec<PatternRule> {
    DEFAULT_PATTERNS
        .iter()
        .map(|(pattern, description)| PatternRule::new(*pattern, *description))
        .collect()
}

/// Compile rules in declaration order, failing on the first invalid regex.
pub fn compile_rules(rules: &[PatternRule]) -> Result<Vec<CompiledRule>, PatternCompileError> {
    let mut compiled = Vec::with_capacity(rules.len());

    for rule in rules {
        let regex = Regex::new(&rule.pattern).map_err(|source| PatternCompileError {
            pattern: rule.pattern.clone(),
            description: rule.description.clone(),
            source,
        })?;
        debug!("Compiled pattern '{}' ({})", rule.pattern, rule.description);
        compiled.push(CompiledRule {
            rule: rule.clone(),
            regex,
        });
    }

    Ok(compiled)
}

lazy_static! {
    /// Built-in rules, compiled once per process
    pub static ref DEFAULT_COMPILED_RULES: Vec<CompiledRule> =
        compile_rules(&default_rules()).expect("built-in patterns must compile");
}

/// Load the built-in rules followed by any extra rules.
///
/// # Arguments
///
/// * `extra` - Additional rules, appended after the built-in ones
///
/// # Returns
///
/// The full compiled rule set, or the first compile error
pub fn load_patterns(extra: &[PatternRule]) -> Result<Vec<CompiledRule>, PatternCompileError> {
    let mut rules = DEFAULT_COMPILED_RULES.clone();
    rules.extend(compile_rules(extra)?);
    Ok(rules)
}
