//! CJM lane mirroring
//!
//! The SBP shows the customer journey as its own lane: one readonly task per
//! CJM action, sharing the action's id. This module keeps that lane in step
//! with the CJM.

use crate::id::{generate, DocKind, EntityType};
use crate::types::{CjmDsl, LaneKind, SbpDsl, SbpLane, SbpTask};
use std::collections::HashSet;

/// Default name of a freshly created CJM lane
pub const CJM_LANE_NAME: &str = "CJM";

/// Bring the SBP's CJM lane in line with the CJM actions
///
/// Ensures exactly one `cjm` lane exists, one readonly task per action (id
/// equal to the action id, name synced, placed in the CJM lane), and drops
/// readonly tasks whose action is gone together with their connections.
/// Returns the input unchanged when there is no CJM.
#[must_use]
pub fn sync_cjm_lane(cjm: Option<&CjmDsl>, sbp: &SbpDsl) -> SbpDsl {
    let mut sbp = sbp.clone();
    let Some(cjm) = cjm else {
        return sbp;
    };

    let lane_id = match sbp.cjm_lane() {
        Some(lane) => lane.id.clone(),
        None => {
            let id = generate(DocKind::Sbp, EntityType::Lane);
            sbp.lanes.insert(
                0,
                SbpLane {
                    id: id.clone(),
                    name: CJM_LANE_NAME.to_string(),
                    kind: LaneKind::Cjm,
                },
            );
            id
        }
    };

    let action_ids: HashSet<&str> = cjm.actions.iter().map(|a| a.id.as_str()).collect();
    let stale: Vec<String> = sbp
        .tasks
        .iter()
        .filter(|t| t.readonly && !action_ids.contains(t.id.as_str()))
        .map(|t| t.id.clone())
        .collect();
    sbp.tasks.retain(|t| !stale.contains(&t.id));
    sbp.connections
        .retain(|c| !stale.iter().any(|id| c.touches(id)));

    for action in &cjm.actions {
        match sbp.tasks.iter_mut().find(|t| t.id == action.id) {
            Some(task) => {
                task.name.clone_from(&action.name);
                task.lane.clone_from(&lane_id);
                task.readonly = true;
                task.source_id = None;
            }
            None => sbp.tasks.push(SbpTask {
                id: action.id.clone(),
                lane: lane_id.clone(),
                name: action.name.clone(),
                source_id: None,
                readonly: true,
                position: None,
            }),
        }
    }

    sbp
}
