//! Outcome definition
//!
//! Exactly one KGI, one primary CSF and one primary KPI per document. The CSF
//! anchors business value to a single SBP task.

use super::{default_version, null_as_default, version_or_default};
use crate::id::{generate, DocKind, EntityType};
use serde::{Deserialize, Serialize};

/// Outcome document body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeDsl {
    #[serde(default = "default_version", deserialize_with = "version_or_default")]
    pub version: String,
    pub kgi: Kgi,
    pub primary_csf: Csf,
    pub primary_kpi: Kpi,
}

/// Key Goal Indicator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kgi {
    pub id: String,
    pub name: String,
}

/// Critical Success Factor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Csf {
    pub id: String,
    pub kgi_id: String,
    /// SBP task carrying the CSF
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rationale: String,
}

/// Key Performance Indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub id: String,
    pub csf_id: String,
    pub name: String,
    pub target: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}

impl OutcomeDsl {
    /// Fresh KGI/CSF/KPI triple with linked ids and no CSF task
    #[must_use]
    pub fn new(kgi_name: impl Into<String>, kpi_name: impl Into<String>, target: f64) -> Self {
        let kgi_id = generate(DocKind::Outcome, EntityType::Kgi);
        let csf_id = generate(DocKind::Outcome, EntityType::Csf);
        Self {
            version: default_version(),
            kgi: Kgi {
                id: kgi_id.clone(),
                name: kgi_name.into(),
            },
            primary_csf: Csf {
                id: csf_id.clone(),
                kgi_id,
                source_id: None,
                rationale: String::new(),
            },
            primary_kpi: Kpi {
                id: generate(DocKind::Outcome, EntityType::Kpi),
                csf_id,
                name: kpi_name.into(),
                target,
                unit: None,
                definition: None,
            },
        }
    }

    /// SBP task id the CSF points at, ignoring empty strings
    #[inline]
    #[must_use]
    pub fn csf_task_id(&self) -> Option<&str> {
        self.primary_csf.source_id.as_deref().filter(|s| !s.is_empty())
    }

    /// Point the CSF at a task (or unlink it)
    #[inline]
    pub fn set_csf_task(&mut self, task_id: Option<String>) {
        self.primary_csf.source_id = task_id;
    }
}
