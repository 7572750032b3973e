//! Service Blueprint
//!
//! Swimlanes holding tasks, joined by a flat list of directed connections.
//! The connection list is the only graph representation; adjacency is
//! derived on demand by the graph crate.

use super::{default_version, is_false, version_or_default};
use crate::error::{ModelError, ModelResult};
use crate::id::{generate, DocKind, EntityType};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// SBP document body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SbpDsl {
    #[serde(default = "default_version", deserialize_with = "version_or_default")]
    pub version: String,

    #[serde(default)]
    pub lanes: Vec<SbpLane>,

    #[serde(default)]
    pub tasks: Vec<SbpTask>,

    #[serde(default)]
    pub connections: Vec<Connection>,
}

/// Swimlane category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneKind {
    /// Mirror of the CJM (at most one per document)
    Cjm,
    Human,
    Team,
    System,
}

impl LaneKind {
    /// Wire names accepted by the validator
    pub const NAMES: [&'static str; 4] = ["cjm", "human", "team", "system"];

    /// Wire name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LaneKind::Cjm => "cjm",
            LaneKind::Human => "human",
            LaneKind::Team => "team",
            LaneKind::System => "system",
        }
    }
}

impl Display for LaneKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Swimlane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SbpLane {
    pub id: String,
    pub name: String,
    pub kind: LaneKind,
}

/// Canvas position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Blueprint task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SbpTask {
    pub id: String,
    /// Owning lane id
    pub lane: String,
    pub name: String,
    /// CJM action this task serves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    /// Mirrors a CJM action; the task id is the action id
    #[serde(default, skip_serializing_if = "is_false")]
    pub readonly: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl SbpTask {
    /// CJM action id this task resolves to
    ///
    /// Readonly tasks are the action itself; other tasks go through
    /// `source_id`.
    #[must_use]
    pub fn cjm_action_id(&self) -> Option<&str> {
        if self.readonly {
            Some(self.id.as_str())
        } else {
            self.source_id.as_deref().filter(|s| !s.is_empty())
        }
    }
}

/// Directed edge between two task ids
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub source: String,
    pub target: String,
    #[serde(rename = "sourceHandle", default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(rename = "targetHandle", default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

impl Connection {
    /// Plain edge without handles
    #[inline]
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }

    /// Whether the edge touches `task_id` at either end
    #[inline]
    #[must_use]
    pub fn touches(&self, task_id: &str) -> bool {
        self.source == task_id || self.target == task_id
    }
}

impl Default for SbpDsl {
    fn default() -> Self {
        Self::new()
    }
}

impl SbpDsl {
    /// Empty blueprint
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: default_version(),
            lanes: Vec::new(),
            tasks: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Lane by id
    #[must_use]
    pub fn lane(&self, id: &str) -> Option<&SbpLane> {
        self.lanes.iter().find(|l| l.id == id)
    }

    /// Task by id
    #[must_use]
    pub fn task(&self, id: &str) -> Option<&SbpTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// The CJM lane, if present
    #[must_use]
    pub fn cjm_lane(&self) -> Option<&SbpLane> {
        self.lanes.iter().find(|l| l.kind == LaneKind::Cjm)
    }

    /// First lane whose name equals `name`
    #[must_use]
    pub fn lane_by_name(&self, name: &str) -> Option<&SbpLane> {
        self.lanes.iter().find(|l| l.name == name)
    }

    /// First editable (non-readonly) task whose name equals `name`
    #[must_use]
    pub fn task_by_name(&self, name: &str) -> Option<&SbpTask> {
        self.tasks.iter().find(|t| !t.readonly && t.name == name)
    }

    /// Tasks of one lane
    pub fn tasks_in_lane<'a>(&'a self, lane_id: &'a str) -> impl Iterator<Item = &'a SbpTask> + 'a {
        self.tasks.iter().filter(move |t| t.lane == lane_id)
    }

    /// Append a lane, returning its id
    pub fn add_lane(&mut self, name: impl Into<String>, kind: LaneKind) -> ModelResult<String> {
        if kind == LaneKind::Cjm && self.cjm_lane().is_some() {
            return Err(ModelError::DuplicateCjmLane);
        }
        let id = generate(DocKind::Sbp, EntityType::Lane);
        self.lanes.push(SbpLane {
            id: id.clone(),
            name: name.into(),
            kind,
        });
        Ok(id)
    }

    /// Append an editable task to a lane, returning its id
    pub fn add_task(&mut self, lane_id: &str, name: impl Into<String>) -> ModelResult<String> {
        match self.lane(lane_id) {
            None => return Err(ModelError::not_found("lane", lane_id)),
            Some(lane) if lane.kind == LaneKind::Cjm => {
                return Err(ModelError::ManagedLane(lane_id.to_string()))
            }
            Some(_) => {}
        }
        let id = generate(DocKind::Sbp, EntityType::Task);
        self.tasks.push(SbpTask {
            id: id.clone(),
            lane: lane_id.to_string(),
            name: name.into(),
            source_id: None,
            readonly: false,
            position: None,
        });
        Ok(id)
    }

    /// Link a task to the CJM action it serves
    pub fn set_task_source(&mut self, task_id: &str, source_id: Option<String>) -> ModelResult<()> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| ModelError::not_found("task", task_id))?;
        if task.readonly {
            return Err(ModelError::ReadonlyTask(task_id.to_string()));
        }
        task.source_id = source_id;
        Ok(())
    }

    /// Add a directed edge
    ///
    /// Self edges and exact duplicates are ignored; returns whether an edge
    /// was added. Endpoints are not checked, so edges may point at CJM
    /// action ids before their mirrored tasks exist.
    pub fn connect(&mut self, source: &str, target: &str) -> bool {
        if source == target
            || self
                .connections
                .iter()
                .any(|c| c.source == source && c.target == target)
        {
            return false;
        }
        self.connections.push(Connection::new(source, target));
        true
    }

    /// Remove a directed edge; returns whether one was removed
    pub fn disconnect(&mut self, source: &str, target: &str) -> bool {
        let before = self.connections.len();
        self.connections
            .retain(|c| !(c.source == source && c.target == target));
        self.connections.len() != before
    }

    /// Remove a lane, its tasks and their connections
    ///
    /// Returns the removed task ids.
    pub fn remove_lane(&mut self, id: &str) -> ModelResult<Vec<String>> {
        let lane = self.lane(id).ok_or_else(|| ModelError::not_found("lane", id))?;
        if lane.kind == LaneKind::Cjm {
            return Err(ModelError::ManagedLane(id.to_string()));
        }
        self.lanes.retain(|l| l.id != id);

        let removed: Vec<String> = self
            .tasks
            .iter()
            .filter(|t| t.lane == id)
            .map(|t| t.id.clone())
            .collect();
        self.tasks.retain(|t| t.lane != id);
        self.connections
            .retain(|c| !removed.iter().any(|t| c.touches(t)));
        Ok(removed)
    }

    /// Remove an editable task and its connections
    pub fn remove_task(&mut self, id: &str) -> ModelResult<()> {
        let task = self.task(id).ok_or_else(|| ModelError::not_found("task", id))?;
        if task.readonly {
            return Err(ModelError::ReadonlyTask(id.to_string()));
        }
        self.tasks.retain(|t| t.id != id);
        self.connections.retain(|c| !c.touches(id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blueprint() -> (SbpDsl, String, String, String) {
        let mut sbp = SbpDsl::new();
        let lane = sbp.add_lane("開発チーム", LaneKind::Team).unwrap();
        let t1 = sbp.add_task(&lane, "設計").unwrap();
        let t2 = sbp.add_task(&lane, "実装").unwrap();
        sbp.connect(&t1, &t2);
        (sbp, lane, t1, t2)
    }

    #[test]
    fn remove_lane_cascades() {
        let (mut sbp, lane, t1, t2) = blueprint();
        let other = sbp.add_lane("QA", LaneKind::Human).unwrap();
        let t3 = sbp.add_task(&other, "検証").unwrap();
        sbp.connect(&t2, &t3);

        let removed = sbp.remove_lane(&lane).unwrap();

        assert_eq!(removed, vec![t1, t2]);
        assert_eq!(sbp.tasks.len(), 1);
        assert!(sbp.connections.is_empty());
        assert!(sbp.task(&t3).is_some());
    }

    #[test]
    fn remove_task_drops_incident_connections() {
        let (mut sbp, _, t1, t2) = blueprint();
        sbp.remove_task(&t2).unwrap();
        assert!(sbp.connections.is_empty());
        assert!(sbp.task(&t1).is_some());
    }

    #[test]
    fn readonly_task_cannot_be_removed() {
        let mut sbp = SbpDsl::new();
        let lane = sbp.add_lane("CJM", LaneKind::Cjm).unwrap();
        sbp.tasks.push(SbpTask {
            id: "cjm:action:1".into(),
            lane,
            name: "mirror".into(),
            source_id: None,
            readonly: true,
            position: None,
        });
        assert_eq!(
            sbp.remove_task("cjm:action:1"),
            Err(ModelError::ReadonlyTask("cjm:action:1".into()))
        );
    }

    #[test]
    fn single_cjm_lane() {
        let mut sbp = SbpDsl::new();
        sbp.add_lane("CJM", LaneKind::Cjm).unwrap();
        assert_eq!(sbp.add_lane("CJM2", LaneKind::Cjm), Err(ModelError::DuplicateCjmLane));
    }

    #[test]
    fn connect_ignores_duplicates_and_self_edges() {
        let (mut sbp, _, t1, t2) = blueprint();
        assert!(!sbp.connect(&t1, &t2));
        assert!(!sbp.connect(&t1, &t1));
        assert!(sbp.connect(&t2, &t1));
        assert_eq!(sbp.connections.len(), 2);
        assert!(sbp.disconnect(&t2, &t1));
        assert!(!sbp.disconnect(&t2, &t1));
    }

    #[test]
    fn cjm_action_id_resolution() {
        let mut task = SbpTask {
            id: "sbp:task:1".into(),
            lane: "l".into(),
            name: "n".into(),
            source_id: Some(String::new()),
            readonly: false,
            position: None,
        };
        assert_eq!(task.cjm_action_id(), None);
        task.source_id = Some("cjm:action:9".into());
        assert_eq!(task.cjm_action_id(), Some("cjm:action:9"));
        task.readonly = true;
        assert_eq!(task.cjm_action_id(), Some("sbp:task:1"));
    }

    #[test]
    fn connection_handles_use_camel_case() {
        let mut c = Connection::new("a", "b");
        c.source_handle = Some("right".into());
        let yaml = serde_yaml::to_string(&c).unwrap();
        assert!(yaml.contains("sourceHandle: right"));
        assert!(!yaml.contains("targetHandle"));
    }
}
