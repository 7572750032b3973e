//! capmap I/O Boundary
//!
//! Text formats in and out of a [`capmap_dsl::DocumentSet`].
//!
//! # Overview
//!
//! - **stream**: the four documents as one `---`-separated YAML stream
//! - **csv**: the flattened resource sheet, with idempotent import
//!
//! Nothing here touches the filesystem; callers pass and receive strings.
//!
//! # Example
//!
//! ```rust
//! use capmap_io::{import_csv, serialize_stream, parse_stream};
//! use capmap_dsl::DocumentSet;
//!
//! let sheet = "CSF,CJMフェーズ,CJMアクション,SBPレーン,SBPタスク,必要な行動,リソースタイプ,リソース,URL\n\
//!              ,UAT,動きを確認する,開発チーム,UATの準備,テストを設計する,ツール,JIRA,https://jira.local\n";
//! let imported = import_csv(&DocumentSet::new(), sheet).unwrap();
//! assert_eq!(imported.report.tools_created, 1);
//!
//! let yaml = serialize_stream(&imported.documents).unwrap();
//! assert_eq!(parse_stream(&yaml).unwrap(), imported.documents);
//! ```

#![warn(missing_docs)]

pub mod csv;
pub mod error;
pub mod stream;

// Re-exports
pub use csv::{
    export_csv, export_filename, export_rows, import_csv, parse_rows, CsvRow, ImportOutcome,
    ImportReport, ResourceType, CSV_COLUMNS,
};
pub use error::{CsvError, StreamError};
pub use stream::{parse_stream, serialize_stream};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for stream and CSV handling
    pub use crate::{
        export_csv, export_filename, import_csv, parse_stream, serialize_stream, CsvError,
        ImportReport, StreamError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
