//! Filtered views over the blueprint
//!
//! A view filter narrows which SBP tasks (and therefore which lanes and EM
//! actions) are shown. "No filter" is represented explicitly by
//! [`VisibleTasks::Unfiltered`] and is never the same thing as an empty set.

use crate::connectivity::reachable_tasks;
use capmap_dsl::{DocumentSet, EmAction, EmDsl, SbpDsl, SbpLane};
use std::collections::HashSet;

/// Which tasks a view shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibleTasks {
    /// No filter active: everything is visible
    Unfiltered,
    /// Exactly these task ids (possibly none)
    Only(HashSet<String>),
}

impl VisibleTasks {
    /// Whether `task_id` is shown
    #[inline]
    #[must_use]
    pub fn contains(&self, task_id: &str) -> bool {
        match self {
            VisibleTasks::Unfiltered => true,
            VisibleTasks::Only(set) => set.contains(task_id),
        }
    }

    /// True for the unfiltered sentinel
    #[inline]
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        matches!(self, VisibleTasks::Unfiltered)
    }
}

/// Active view filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Restrict to tasks connected to the CSF task
    pub csf: bool,
    /// Restrict to tasks connected to the phase's actions
    pub phase: Option<String>,
    /// Restrict to one lane, applied after traversal
    pub lane: Option<String>,
}

impl TaskFilter {
    /// No filters
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With CSF scope
    #[inline]
    #[must_use]
    pub fn with_csf(mut self) -> Self {
        self.csf = true;
        self
    }

    /// With phase scope
    #[inline]
    #[must_use]
    pub fn with_phase(mut self, phase_id: impl Into<String>) -> Self {
        self.phase = Some(phase_id.into());
        self
    }

    /// With lane filter
    #[inline]
    #[must_use]
    pub fn with_lane(mut self, lane_id: impl Into<String>) -> Self {
        self.lane = Some(lane_id.into());
        self
    }

    /// Whether any filter is set
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.csf || self.phase.is_some() || self.lane.is_some()
    }
}

/// Tasks connected to the CSF task
///
/// Empty when there is no SBP, no Outcome, or the CSF is unlinked.
#[must_use]
pub fn csf_scope(docs: &DocumentSet) -> HashSet<String> {
    match (&docs.sbp, &docs.outcome) {
        (Some(sbp), Some(outcome)) => match outcome.csf_task_id() {
            Some(task) => reachable_tasks([task], &sbp.connections),
            None => HashSet::new(),
        },
        _ => HashSet::new(),
    }
}

/// Tasks connected to any task serving an action of `phase_id`
///
/// Seeds are tasks whose resolved CJM action (via `source_id`, or the task
/// itself when readonly) belongs to the phase.
#[must_use]
pub fn phase_scope(docs: &DocumentSet, phase_id: &str) -> HashSet<String> {
    let (Some(cjm), Some(sbp)) = (&docs.cjm, &docs.sbp) else {
        return HashSet::new();
    };
    let actions: HashSet<&str> = cjm
        .actions_in_phase(phase_id)
        .map(|a| a.id.as_str())
        .collect();
    let seeds = sbp
        .tasks
        .iter()
        .filter(|t| t.cjm_action_id().is_some_and(|a| actions.contains(a)))
        .map(|t| t.id.as_str());
    reachable_tasks(seeds, &sbp.connections)
}

/// Compute the visible task set for a filter
///
/// CSF and phase scopes intersect when both are set. The lane filter keeps
/// only tasks in that lane and is applied after any traversal; on its own it
/// selects the lane's tasks.
#[must_use]
pub fn visible_tasks(docs: &DocumentSet, filter: &TaskFilter) -> VisibleTasks {
    if !filter.is_active() {
        return VisibleTasks::Unfiltered;
    }

    let mut scoped: Option<HashSet<String>> = None;
    if filter.csf {
        scoped = Some(csf_scope(docs));
    }
    if let Some(phase) = &filter.phase {
        let by_phase = phase_scope(docs, phase);
        scoped = Some(match scoped {
            Some(csf) => csf.intersection(&by_phase).cloned().collect(),
            None => by_phase,
        });
    }

    if let Some(lane) = &filter.lane {
        let in_lane: HashSet<String> = docs
            .sbp
            .as_ref()
            .map(|sbp| sbp.tasks_in_lane(lane).map(|t| t.id.clone()).collect())
            .unwrap_or_default();
        scoped = Some(match scoped {
            Some(set) => set.into_iter().filter(|t| in_lane.contains(t)).collect(),
            None => in_lane,
        });
    }

    VisibleTasks::Only(scoped.unwrap_or_default())
}

/// EM actions bound to a visible task
#[must_use]
pub fn visible_em_actions<'a>(em: &'a EmDsl, visible: &VisibleTasks) -> Vec<&'a EmAction> {
    em.actions
        .iter()
        .filter(|a| match visible {
            VisibleTasks::Unfiltered => true,
            VisibleTasks::Only(set) => a.source_id.as_deref().is_some_and(|t| set.contains(t)),
        })
        .collect()
}

/// Lanes holding at least one visible task
#[must_use]
pub fn visible_lanes<'a>(sbp: &'a SbpDsl, visible: &VisibleTasks) -> Vec<&'a SbpLane> {
    if visible.is_unfiltered() {
        return sbp.lanes.iter().collect();
    }
    sbp.lanes
        .iter()
        .filter(|lane| sbp.tasks_in_lane(&lane.id).any(|t| visible.contains(&t.id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use capmap_dsl::LaneKind;
    use capmap_test_utils::uat_model;

    fn only(ids: &[&String]) -> VisibleTasks {
        VisibleTasks::Only(ids.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn no_filter_is_unfiltered_not_empty() {
        let (docs, _) = uat_model();
        let visible = visible_tasks(&docs, &TaskFilter::new());
        assert_eq!(visible, VisibleTasks::Unfiltered);
        assert_ne!(visible, VisibleTasks::Only(HashSet::new()));
    }

    #[test]
    fn csf_scope_follows_connections() {
        let (docs, ids) = uat_model();
        let visible = visible_tasks(&docs, &TaskFilter::new().with_csf());
        assert_eq!(visible, only(&[&ids.task, &ids.downstream_task]));
        assert!(!visible.contains(&ids.isolated_task));
    }

    #[test]
    fn unlinked_csf_scope_is_empty() {
        let (mut docs, _) = uat_model();
        docs.outcome.as_mut().unwrap().set_csf_task(None);
        let visible = visible_tasks(&docs, &TaskFilter::new().with_csf());
        assert_eq!(visible, VisibleTasks::Only(HashSet::new()));
    }

    #[test]
    fn phase_scope_seeds_from_source_and_readonly_tasks() {
        let (docs, ids) = uat_model();
        let visible = visible_tasks(&docs, &TaskFilter::new().with_phase(&ids.phase));
        // The mirrored task (id == action id) and the linked team task seed
        assert_eq!(
            visible,
            only(&[&ids.cjm_action, &ids.task, &ids.downstream_task])
        );
    }

    #[test]
    fn lane_filter_applies_after_traversal() {
        let (mut docs, ids) = uat_model();
        let sbp = docs.sbp.as_mut().unwrap();
        let ops = sbp.add_lane("運用", LaneKind::System).unwrap();
        let deploy = sbp.add_task(&ops, "デプロイ").unwrap();
        sbp.connect(&ids.downstream_task, &deploy);

        let filter = TaskFilter::new().with_phase(&ids.phase).with_lane(&ops);
        assert_eq!(visible_tasks(&docs, &filter), only(&[&deploy]));

        let lane_only = TaskFilter::new().with_lane(&ids.lane);
        assert_eq!(
            visible_tasks(&docs, &lane_only),
            only(&[&ids.task, &ids.downstream_task, &ids.isolated_task])
        );
    }

    #[test]
    fn csf_and_phase_intersect() {
        let (docs, ids) = uat_model();
        let filter = TaskFilter::new().with_csf().with_phase(&ids.phase);
        assert_eq!(
            visible_tasks(&docs, &filter),
            only(&[&ids.task, &ids.downstream_task])
        );
    }

    #[test]
    fn projections() {
        let (docs, ids) = uat_model();
        let em = docs.em.as_ref().unwrap();
        let sbp = docs.sbp.as_ref().unwrap();

        let visible = only(&[&ids.isolated_task]);
        assert!(visible_em_actions(em, &visible).is_empty());
        let lanes: Vec<_> = visible_lanes(sbp, &visible).iter().map(|l| l.id.clone()).collect();
        assert_eq!(lanes, vec![ids.lane.clone()]);

        assert_eq!(visible_em_actions(em, &VisibleTasks::Unfiltered).len(), 1);
        assert_eq!(visible_lanes(sbp, &VisibleTasks::Unfiltered).len(), 2);
        assert!(visible_lanes(sbp, &VisibleTasks::Only(HashSet::new())).is_empty());
    }
}
