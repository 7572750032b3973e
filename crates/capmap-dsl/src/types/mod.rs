//! Concrete document types
//!
//! One module per document kind. All shapes are plain serde records; the
//! `kind` discriminator lives on [`crate::Document`], not on these structs.

mod cjm;
mod em;
mod outcome;
mod sbp;

use serde::{Deserialize, Deserializer};

pub use cjm::{CjmAction, CjmDsl, CjmPhase, Persona, EMOTION_MAX, EMOTION_MIN};
pub use em::{EmAction, EmDsl, EmOutcome, Knowledge, Learning, Skill, Tool};
pub use outcome::{Csf, Kgi, Kpi, OutcomeDsl};
pub use sbp::{Connection, LaneKind, Position, SbpDsl, SbpLane, SbpTask};

/// Format version written on new documents
pub const DSL_VERSION: &str = "1.0";

pub(crate) fn default_version() -> String {
    DSL_VERSION.to_string()
}

/// `version: ~` reads as the default version
pub(crate) fn version_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_version))
}

/// Explicit null reads as the type's default
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}
