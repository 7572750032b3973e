//! capmap Graph Analyses
//!
//! Read-only analyses over a [`capmap_dsl::DocumentSet`].
//!
//! # Overview
//!
//! - **references**: dangling-id detection across and within documents
//! - **hierarchy**: KPI → SBP task → CJM action → CJM phase chain
//! - **connectivity**: undirected reachability over SBP connections
//! - **scope**: CSF / phase / lane view filters built on connectivity
//!
//! Every function here is pure: documents in, results out.
//!
//! # Example
//!
//! ```rust
//! use capmap_dsl::{Connection};
//! use capmap_graph::reachable_tasks;
//!
//! let edges = vec![Connection::new("a", "b"), Connection::new("c", "b")];
//! let related = reachable_tasks(["a"], &edges);
//! assert!(related.contains("c"));
//! ```

#![warn(missing_docs)]

pub mod connectivity;
pub mod hierarchy;
pub mod references;
pub mod scope;

// Re-exports
pub use connectivity::reachable_tasks;
pub use hierarchy::{build_chain, Chain};
pub use references::{check, check_all, check_internal, CheckResult, ReferenceError, ReferenceErrorKind};
pub use scope::{
    csf_scope, phase_scope, visible_em_actions, visible_lanes, visible_tasks, TaskFilter, VisibleTasks,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for graph analyses
    pub use crate::{
        build_chain, check, check_all, reachable_tasks, visible_tasks, Chain, CheckResult,
        ReferenceError, TaskFilter, VisibleTasks,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
