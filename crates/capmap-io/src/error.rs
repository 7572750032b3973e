//! Error types for the I/O boundary
//!
//! - Stream errors (YAML text ↔ documents)
//! - CSV errors (resource sheet import)
//!
//! CSV messages are user-facing and kept in Japanese to match the sheet.

use capmap_dsl::{DocKind, ModelError};

/// Errors while reading or writing a YAML document stream
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Malformed YAML text
    #[error("YAML parse error: {0}")]
    Syntax(#[from] serde_yaml::Error),

    /// A block with a `kind` failed structural validation
    #[error("invalid {kind} document: {}", errors.join("; "))]
    InvalidDocument { kind: String, errors: Vec<String> },

    /// A block passed validation but did not fit its typed shape
    #[error("failed to decode {kind} document: {source}")]
    Decode {
        kind: DocKind,
        #[source]
        source: serde_yaml::Error,
    },

    /// A document could not be rendered
    #[error("failed to serialize {kind} document: {source}")]
    Serialize {
        kind: DocKind,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Errors while importing a resource CSV
///
/// All of these abort the import before any document changes.
#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    /// No content (after the BOM)
    #[error("CSVファイルが空です")]
    Empty,

    /// Header does not have the nine fixed columns
    #[error("CSVのカラム数が不正です。9列必要です。")]
    HeaderColumnCount { found: usize },

    /// A data row does not have nine columns
    #[error("CSVの{row}行目のカラム数が不正です。9列必要です。")]
    RowColumnCount { row: usize, found: usize },

    /// A quoted field runs to end of input
    #[error("CSVの引用符が閉じられていません（{row}行目）")]
    UnterminatedQuote { row: usize },

    /// Editing command rejected during reconciliation
    #[error("import failed: {0}")]
    Model(#[from] ModelError),
}

impl StreamError {
    /// Create invalid-document error
    pub fn invalid(kind: impl Into<String>, errors: Vec<String>) -> Self {
        Self::InvalidDocument {
            kind: kind.into(),
            errors,
        }
    }
}
