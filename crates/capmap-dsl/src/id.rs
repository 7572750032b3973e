//! Typed entity identifiers
//!
//! Every entity carries an id of the form `{kind}:{type}:{uuid}`, for example
//! `cjm:phase:4f1c...`. Ids are plain strings on the documents; this module
//! mints and splits them.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Document kind discriminator (first id segment, and the `kind` field)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DocKind {
    /// Customer Journey Map
    Cjm,
    /// Service Blueprint
    Sbp,
    /// KGI / CSF / KPI definition
    Outcome,
    /// Enablement Map
    Em,
}

impl DocKind {
    /// All kinds in stream order
    pub const ALL: [DocKind; 4] = [DocKind::Cjm, DocKind::Sbp, DocKind::Outcome, DocKind::Em];

    /// Wire name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DocKind::Cjm => "cjm",
            DocKind::Sbp => "sbp",
            DocKind::Outcome => "outcome",
            DocKind::Em => "em",
        }
    }
}

impl Display for DocKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocKind {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cjm" => Ok(DocKind::Cjm),
            "sbp" => Ok(DocKind::Sbp),
            "outcome" => Ok(DocKind::Outcome),
            "em" => Ok(DocKind::Em),
            other => Err(IdError::UnknownKind(other.to_string())),
        }
    }
}

/// Entity class (second id segment)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityType {
    Phase,
    Action,
    Lane,
    Task,
    Kgi,
    Csf,
    Kpi,
    Outcome,
    Skill,
    Knowledge,
    Tool,
}

impl EntityType {
    /// Wire name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Phase => "phase",
            EntityType::Action => "action",
            EntityType::Lane => "lane",
            EntityType::Task => "task",
            EntityType::Kgi => "kgi",
            EntityType::Csf => "csf",
            EntityType::Kpi => "kpi",
            EntityType::Outcome => "outcome",
            EntityType::Skill => "skill",
            EntityType::Knowledge => "knowledge",
            EntityType::Tool => "tool",
        }
    }
}

impl Display for EntityType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "phase" => EntityType::Phase,
            "action" => EntityType::Action,
            "lane" => EntityType::Lane,
            "task" => EntityType::Task,
            "kgi" => EntityType::Kgi,
            "csf" => EntityType::Csf,
            "kpi" => EntityType::Kpi,
            "outcome" => EntityType::Outcome,
            "skill" => EntityType::Skill,
            "knowledge" => EntityType::Knowledge,
            "tool" => EntityType::Tool,
            other => return Err(IdError::UnknownType(other.to_string())),
        })
    }
}

/// Errors from converting id segments into typed enums
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("unknown document kind: '{0}'")]
    UnknownKind(String),

    #[error("unknown entity type: '{0}'")]
    UnknownType(String),
}

/// Mint a fresh id `"{kind}:{type}:{uuid-v4}"`
#[must_use]
pub fn generate(kind: DocKind, entity: EntityType) -> String {
    format!("{}:{}:{}", kind, entity, Uuid::new_v4())
}

/// The three segments of an id
///
/// Segments are not checked against the known kinds/types; callers probing
/// untrusted strings get the raw parts back.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedId {
    pub kind: String,
    pub entity_type: String,
    pub uuid: String,
}

impl ParsedId {
    /// Typed kind, if the first segment is a known kind
    #[inline]
    pub fn doc_kind(&self) -> Result<DocKind, IdError> {
        self.kind.parse()
    }

    /// Typed entity class, if the second segment is a known type
    #[inline]
    pub fn entity(&self) -> Result<EntityType, IdError> {
        self.entity_type.parse()
    }
}

/// Split an id into its segments
///
/// Returns `None` unless the string has exactly three `:`-separated parts.
#[must_use]
pub fn parse(id: &str) -> Option<ParsedId> {
    let mut parts = id.split(':');
    let kind = parts.next()?;
    let entity_type = parts.next()?;
    let uuid = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some(ParsedId {
        kind: kind.to_string(),
        entity_type: entity_type.to_string(),
        uuid: uuid.to_string(),
    })
}
