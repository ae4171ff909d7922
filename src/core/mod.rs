/// Core module for anonymity checking
///
/// This module contains the scanning engine: pattern rules, notebook text
/// extraction and violation location.

pub mod notebook;
pub mod patterns;
pub mod scanner;
