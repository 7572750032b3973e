//! Resource CSV
//!
//! The resource sheet flattens the model into one row per EM resource:
//!
//! ```text
//! CSF,CJMフェーズ,CJMアクション,SBPレーン,SBPタスク,必要な行動,リソースタイプ,リソース,URL
//! ```
//!
//! [`export_csv`] writes it and [`import_csv`] reconciles an edited sheet
//! back into the documents by name.

mod export;
mod import;
pub mod tokenizer;

pub use export::{export_csv, export_filename, export_rows, quote_field};
pub use import::{import_csv, parse_rows, ImportOutcome, ImportReport};
pub use tokenizer::{tokenize, BOM};

use std::fmt;
use std::str::FromStr;

/// Fixed header, in column order
pub const CSV_COLUMNS: [&str; 9] = [
    "CSF",
    "CJMフェーズ",
    "CJMアクション",
    "SBPレーン",
    "SBPタスク",
    "必要な行動",
    "リソースタイプ",
    "リソース",
    "URL",
];

/// Marker written in the CSF column for the CSF task
pub const CSF_MARK: &str = "○";

/// Kind of resource named by the リソースタイプ column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    /// Skill without a learning
    Skill,
    /// Skill with a learning, written `skill/title`
    SkillLearning,
    /// Knowledge document with a URL
    Knowledge,
    /// Tool with a URL
    Tool,
}

impl ResourceType {
    /// Column label
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ResourceType::Skill => "スキル",
            ResourceType::SkillLearning => "スキル/学習コンテンツ",
            ResourceType::Knowledge => "ナレッジ",
            ResourceType::Tool => "ツール",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "スキル" => Ok(ResourceType::Skill),
            "スキル/学習コンテンツ" => Ok(ResourceType::SkillLearning),
            "ナレッジ" => Ok(ResourceType::Knowledge),
            "ツール" => Ok(ResourceType::Tool),
            other => Err(other.to_string()),
        }
    }
}

/// One sheet row, fields in column order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    pub csf: String,
    pub phase: String,
    pub cjm_action: String,
    pub lane: String,
    pub task: String,
    pub em_action: String,
    pub resource_type: String,
    pub resource: String,
    pub url: String,
}

impl CsvRow {
    /// Build from exactly nine fields
    #[must_use]
    pub fn from_fields(fields: [String; 9]) -> Self {
        let [csf, phase, cjm_action, lane, task, em_action, resource_type, resource, url] = fields;
        Self {
            csf,
            phase,
            cjm_action,
            lane,
            task,
            em_action,
            resource_type,
            resource,
            url,
        }
    }

    /// Fields in column order
    #[must_use]
    pub fn fields(&self) -> [&str; 9] {
        [
            &self.csf,
            &self.phase,
            &self.cjm_action,
            &self.lane,
            &self.task,
            &self.em_action,
            &self.resource_type,
            &self.resource,
            &self.url,
        ]
    }
}
