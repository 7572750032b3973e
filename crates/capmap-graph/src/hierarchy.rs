//! Hierarchy chain builder
//!
//! Walks the fixed dependency chain for a KPI:
//! KPI → CSF task (SBP) → CJM action → CJM phase, plus the EM actions bound
//! to that task. Any missing hop yields `None`; there are no partial chains.

use capmap_dsl::{CjmAction, CjmPhase, DocumentSet, EmAction, Kpi, SbpTask};
use serde::Serialize;

/// A fully resolved chain, borrowing from the document set
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chain<'a> {
    pub kpi: &'a Kpi,
    pub sbp_task: &'a SbpTask,
    pub cjm_action: &'a CjmAction,
    pub cjm_phase: &'a CjmPhase,
    /// EM actions bound to `sbp_task`, in document order (callers re-order)
    pub em_actions: Vec<&'a EmAction>,
}

/// Resolve the chain for `kpi_id`
///
/// Requires all four documents and that `kpi_id` is the document's single
/// primary KPI.
#[must_use]
pub fn build_chain<'a>(docs: &'a DocumentSet, kpi_id: &str) -> Option<Chain<'a>> {
    let cjm = docs.cjm.as_ref()?;
    let sbp = docs.sbp.as_ref()?;
    let outcome = docs.outcome.as_ref()?;
    let em = docs.em.as_ref()?;

    let kpi = &outcome.primary_kpi;
    if kpi.id != kpi_id {
        return None;
    }

    let sbp_task = sbp.task(outcome.csf_task_id()?)?;
    let cjm_action = cjm.action(sbp_task.cjm_action_id()?)?;
    let cjm_phase = cjm.phase(&cjm_action.phase)?;
    let em_actions = em.actions_for_task(&sbp_task.id).collect();

    Some(Chain {
        kpi,
        sbp_task,
        cjm_action,
        cjm_phase,
        em_actions,
    })
}
