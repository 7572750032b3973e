//! Reference integrity checking
//!
//! Cross-document links are plain id strings that edits are free to break.
//! [`check`] verifies them in one pass and reports every dangling link;
//! [`check_internal`] does the same for links inside a single document.
//!
//! Each link is checked independently and only when both documents are
//! present. An unset (`None` or empty) `source_id` means "not linked yet" and
//! is never an error.

use capmap_dsl::DocumentSet;
use serde::Serialize;
use std::collections::HashSet;

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceErrorKind {
    MissingReference,
}

/// One dangling reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceError {
    #[serde(rename = "type")]
    pub kind: ReferenceErrorKind,
    /// `"<doc>:<entity>"` holding the reference
    pub source: String,
    /// Id of the entity holding the reference
    pub source_id: String,
    /// `"<doc>:<entity>"` the reference should resolve to
    pub target_kind: String,
    /// The unresolved id
    pub target_id: String,
    pub message: String,
}

impl ReferenceError {
    /// Build a missing-reference record
    #[must_use]
    pub fn missing(
        source: &str,
        source_id: impl Into<String>,
        target_kind: &str,
        target_id: impl Into<String>,
    ) -> Self {
        let source_id = source_id.into();
        let target_id = target_id.into();
        let message = format!(
            "{} '{}' references {} '{}' which does not exist",
            source, source_id, target_kind, target_id
        );
        Self {
            kind: ReferenceErrorKind::MissingReference,
            source: source.to_string(),
            source_id,
            target_kind: target_kind.to_string(),
            target_id,
            message,
        }
    }
}

/// Result of a checking pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<ReferenceError>,
}

impl CheckResult {
    fn from_errors(errors: Vec<ReferenceError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

fn linked(id: Option<&String>) -> Option<&str> {
    id.map(String::as_str).filter(|s| !s.is_empty())
}

/// Verify every cross-document reference
///
/// Links checked: SBP task → CJM action, Outcome CSF → SBP task,
/// EM action → SBP task, EM outcome → Outcome KPI.
#[must_use]
pub fn check(docs: &DocumentSet) -> CheckResult {
    let mut errors = Vec::new();

    if let (Some(sbp), Some(cjm)) = (&docs.sbp, &docs.cjm) {
        let actions: HashSet<&str> = cjm.actions.iter().map(|a| a.id.as_str()).collect();
        for task in &sbp.tasks {
            if let Some(target) = linked(task.source_id.as_ref()) {
                if !actions.contains(target) {
                    errors.push(ReferenceError::missing("sbp:task", &task.id, "cjm:action", target));
                }
            }
        }
    }

    if let (Some(outcome), Some(sbp)) = (&docs.outcome, &docs.sbp) {
        if let Some(target) = linked(outcome.primary_csf.source_id.as_ref()) {
            if sbp.task(target).is_none() {
                errors.push(ReferenceError::missing(
                    "outcome:csf",
                    &outcome.primary_csf.id,
                    "sbp:task",
                    target,
                ));
            }
        }
    }

    if let (Some(em), Some(sbp)) = (&docs.em, &docs.sbp) {
        let tasks: HashSet<&str> = sbp.tasks.iter().map(|t| t.id.as_str()).collect();
        for action in &em.actions {
            if let Some(target) = linked(action.source_id.as_ref()) {
                if !tasks.contains(target) {
                    errors.push(ReferenceError::missing("em:action", &action.id, "sbp:task", target));
                }
            }
        }
    }

    if let (Some(em), Some(outcome)) = (&docs.em, &docs.outcome) {
        let kpi = outcome.primary_kpi.id.as_str();
        for entry in &em.outcomes {
            if let Some(target) = linked(entry.source_id.as_ref()) {
                if target != kpi {
                    errors.push(ReferenceError::missing("em:outcome", &entry.id, "outcome:kpi", target));
                }
            }
        }
    }

    CheckResult::from_errors(errors)
}

/// Verify references that stay inside one document
///
/// CJM action → phase, SBP task → lane, SBP connection endpoints → tasks,
/// CSF → KGI, KPI → CSF, EM resources → EM action.
#[must_use]
pub fn check_internal(docs: &DocumentSet) -> CheckResult {
    let mut errors = Vec::new();

    if let Some(cjm) = &docs.cjm {
        let phases: HashSet<&str> = cjm.phases.iter().map(|p| p.id.as_str()).collect();
        for action in &cjm.actions {
            if !phases.contains(action.phase.as_str()) {
                errors.push(ReferenceError::missing("cjm:action", &action.id, "cjm:phase", &action.phase));
            }
        }
    }

    if let Some(sbp) = &docs.sbp {
        let lanes: HashSet<&str> = sbp.lanes.iter().map(|l| l.id.as_str()).collect();
        let tasks: HashSet<&str> = sbp.tasks.iter().map(|t| t.id.as_str()).collect();
        for task in &sbp.tasks {
            if !lanes.contains(task.lane.as_str()) {
                errors.push(ReferenceError::missing("sbp:task", &task.id, "sbp:lane", &task.lane));
            }
        }
        for conn in &sbp.connections {
            let edge = format!("{}->{}", conn.source, conn.target);
            for end in [&conn.source, &conn.target] {
                if !tasks.contains(end.as_str()) {
                    errors.push(ReferenceError::missing("sbp:connection", edge.clone(), "sbp:task", end));
                }
            }
        }
    }

    if let Some(outcome) = &docs.outcome {
        let csf = &outcome.primary_csf;
        if csf.kgi_id != outcome.kgi.id {
            errors.push(ReferenceError::missing("outcome:csf", &csf.id, "outcome:kgi", &csf.kgi_id));
        }
        let kpi = &outcome.primary_kpi;
        if kpi.csf_id != csf.id {
            errors.push(ReferenceError::missing("outcome:kpi", &kpi.id, "outcome:csf", &kpi.csf_id));
        }
    }

    if let Some(em) = &docs.em {
        let actions: HashSet<&str> = em.actions.iter().map(|a| a.id.as_str()).collect();
        let resources = em
            .skills
            .iter()
            .map(|s| ("em:skill", &s.id, &s.action_id))
            .chain(em.knowledge.iter().map(|k| ("em:knowledge", &k.id, &k.action_id)))
            .chain(em.tools.iter().map(|t| ("em:tool", &t.id, &t.action_id)));
        for (source, id, action_id) in resources {
            if !actions.contains(action_id.as_str()) {
                errors.push(ReferenceError::missing(source, id, "em:action", action_id));
            }
        }
    }

    CheckResult::from_errors(errors)
}

/// Cross-document and internal checks together
#[must_use]
pub fn check_all(docs: &DocumentSet) -> CheckResult {
    let mut errors = check(docs).errors;
    errors.extend(check_internal(docs).errors);
    CheckResult::from_errors(errors)
}
