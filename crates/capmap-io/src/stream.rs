//! Multi-document YAML streams
//!
//! A model file holds up to four YAML documents separated by `---` lines.
//! Each block is validated structurally before it is turned into a typed
//! document, so a bad file reports every violation of the offending block
//! instead of the first serde error.

use crate::error::StreamError;
use capmap_dsl::validate::kind_of;
use capmap_dsl::{validate_dsl, Document, DocumentSet};
use serde::Deserialize;
use serde_yaml::Value;

/// Separator written between documents
pub const DOCUMENT_SEPARATOR: &str = "---\n";

/// Parse a YAML stream into a document set
///
/// Blocks without a `kind` field (including empty blocks) are skipped. A
/// block whose `kind` is present but unknown, or whose content fails
/// validation, aborts the parse. When the same kind appears twice the later
/// block wins.
pub fn parse_stream(text: &str) -> Result<DocumentSet, StreamError> {
    let mut set = DocumentSet::new();

    for (index, block) in serde_yaml::Deserializer::from_str(text).enumerate() {
        let value = Value::deserialize(block)?;
        let Some(kind) = value.get("kind") else {
            tracing::debug!("skipping block {} without kind", index);
            continue;
        };

        let result = validate_dsl(&value);
        let Some(kind) = kind_of(&value).filter(|_| result.valid) else {
            let kind = kind
                .as_str()
                .map_or_else(|| format!("{kind:?}"), str::to_string);
            return Err(StreamError::invalid(kind, result.errors));
        };

        let doc: Document = serde_yaml::from_value(value)
            .map_err(|source| StreamError::Decode { kind, source })?;
        if let Some(previous) = set.insert(doc) {
            tracing::warn!(
                "{} document repeated in stream (block {}); keeping the later one",
                previous.kind(),
                index
            );
        }
    }

    tracing::debug!("parsed stream with {} documents", set.len());
    Ok(set)
}

/// Render a document set as a YAML stream
///
/// Present documents are written in the order cjm, sbp, outcome, em and
/// joined with `---` lines. An empty set renders as an empty string.
pub fn serialize_stream(set: &DocumentSet) -> Result<String, StreamError> {
    let blocks = set
        .to_documents()
        .iter()
        .map(|doc| {
            serde_yaml::to_string(doc).map_err(|source| StreamError::Serialize {
                kind: doc.kind(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(blocks.join(DOCUMENT_SEPARATOR))
}
