/// Notebook document model and text extraction
///
/// A notebook is parsed into a typed cell/output structure and flattened into
/// text units: one per code cell source and one per textual output block.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a piece of scanned text came from inside a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextOrigin {
    /// The cell's source lines
    Source,
    /// A captured output block
    Output,
}

/// Text extracted from a single cell, ready to be scanned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUnit {
    /// 1-indexed cell position
    pub cell_index: usize,
    pub origin: TextOrigin,
    pub text: String,
}

/// Error when the parsed document does not have the notebook shape
#[derive(Debug, thiserror::Error)]
#[error("invalid notebook structure: {source}")]
pub struct DocumentFormatError {
    #[from]
    source: serde_json::Error,
}

/// Multiline text as stored in a notebook: a list of lines carrying their own
/// newlines, or a single string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MultilineText {
    Lines(Vec<String>),
    Text(String),
}

impl Default for MultilineText {
    fn default() -> Self {
        MultilineText::Lines(Vec::new())
    }
}

impl MultilineText {
    /// Concatenate the stored lines with no separator.
    pub fn joined(&self) -> String {
        match self {
            MultilineText::Lines(lines) => lines.concat(),
            MultilineText::Text(text) => text.clone(),
        }
    }
}

/// Captured execution result attached to a cell
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<MultilineText>,
}

/// One notebook cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub cell_type: String,
    #[serde(default)]
    pub source: MultilineText,
    #[serde(default)]
    pub outputs: Vec<Output>,
}

impl Cell {
    pub fn is_code(&self) -> bool {
        self.cell_type == "code"
    }
}

/// A parsed notebook document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,
}

impl Notebook {
    /// Interpret a parsed JSON value as a notebook.
    pub fn from_value(value: &Value) -> Result<Self, DocumentFormatError> {
        Ok(Notebook::deserialize(value)?)
    }

    /// Flatten the notebook into text units in document order.
    ///
    /// Code cells contribute their source. Every output carrying a `text`
    /// field contributes a unit, whatever the cell type.
    pub fn text_units(&self) -> Vec<TextUnit> {
        let mut units = Vec::new();

        for (idx, cell) in self.cells.iter().enumerate() {
            let cell_index = idx + 1;

            if cell.is_code() {
                units.push(TextUnit {
                    cell_index,
                    origin: TextOrigin::Source,
                    text: cell.source.joined(),
                });
            }

            for output in &cell.outputs {
                if let Some(text) = &output.text {
                    units.push(TextUnit {
                        cell_index,
                        origin: TextOrigin::Output,
                        text: text.joined(),
                    });
                }
            }
        }

        debug!("Extracted {} text units from {} cells", units.len(), self.cells.len());
        units
    }
}

/// Extract all scannable text units from a parsed notebook value.
pub fn extract(document: &Value) -> Result<Vec<TextUnit>, DocumentFormatError> {
    Ok(Notebook::from_value(document)?.text_units())
}
