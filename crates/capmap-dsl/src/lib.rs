//! capmap DSL
//!
//! The four capability documents and their identity scheme.
//!
//! # Core Concepts
//!
//! - [`CjmDsl`]: Customer Journey Map (persona, phases, actions)
//! - [`SbpDsl`]: Service Blueprint (lanes, tasks, connections)
//! - [`OutcomeDsl`]: one KGI / CSF / KPI triple
//! - [`EmDsl`]: Enablement Map (actions with skills, knowledge, tools)
//! - [`Document`] / [`DocumentSet`]: tagged union and the working set
//! - [`id`]: `kind:type:uuid` identifiers
//! - [`validate`]: structural validators over raw YAML values
//!
//! Cross-document references are plain id strings and are never enforced on
//! construction; see the `capmap-graph` crate for the checker.
//!
//! # Example
//!
//! ```rust
//! use capmap_dsl::{CjmDsl, DocumentSet, LaneKind, SbpDsl};
//!
//! let mut cjm = CjmDsl::new();
//! let phase = cjm.add_phase("UAT");
//! let action = cjm.add_action(&phase, "動きを確認する").unwrap();
//!
//! let mut sbp = SbpDsl::new();
//! let lane = sbp.add_lane("開発チーム", LaneKind::Team).unwrap();
//! let task = sbp.add_task(&lane, "UATの準備").unwrap();
//! sbp.set_task_source(&task, Some(action)).unwrap();
//!
//! let docs = DocumentSet::new().with_cjm(cjm).with_sbp(sbp);
//! assert_eq!(docs.len(), 2);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod document;
pub mod error;
pub mod id;
pub mod mirror;
pub mod types;
pub mod validate;

// Re-exports
pub use document::{Document, DocumentSet};
pub use error::{ModelError, ModelResult};
pub use id::{DocKind, EntityType, IdError, ParsedId};
pub use mirror::{sync_cjm_lane, CJM_LANE_NAME};
pub use types::{
    CjmAction, CjmDsl, CjmPhase, Connection, Csf, EmAction, EmDsl, EmOutcome, Kgi, Knowledge, Kpi,
    LaneKind, Learning, OutcomeDsl, Persona, Position, SbpDsl, SbpLane, SbpTask, Skill, Tool,
    DSL_VERSION,
};
pub use validate::{validate_dsl, ValidationResult};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with documents
    pub use crate::{
        CjmDsl, DocKind, Document, DocumentSet, EmDsl, EntityType, LaneKind, OutcomeDsl, SbpDsl,
        ValidationResult,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
