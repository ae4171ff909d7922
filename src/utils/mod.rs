/// Utility modules for the anonymity checker
///
/// This module contains notebook loading and report formatting helpers.

pub mod file_utils;
pub mod output_formatter;
