//! Enablement Map
//!
//! Actions tied to SBP tasks, each carrying the skills, knowledge and tools
//! needed to perform it. Resources point at their action via `action_id`.

use super::{default_version, null_as_default, version_or_default};
use crate::error::{ModelError, ModelResult};
use crate::id::{generate, DocKind, EntityType};
use serde::{Deserialize, Serialize};

/// EM document body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmDsl {
    #[serde(default = "default_version", deserialize_with = "version_or_default")]
    pub version: String,
    #[serde(default)]
    pub outcomes: Vec<EmOutcome>,
    #[serde(default)]
    pub actions: Vec<EmAction>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub knowledge: Vec<Knowledge>,
    #[serde(default)]
    pub tools: Vec<Tool>,
}

/// Link from the map to the Outcome KPI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmOutcome {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
}

/// Required behaviour for an SBP task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmAction {
    pub id: String,
    pub name: String,
    /// SBP task id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
}

/// Learning content attached to a skill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Learning {
    pub title: String,
    pub url: String,
}

/// Skill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub action_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub learnings: Vec<Learning>,
}

/// Knowledge resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Knowledge {
    pub id: String,
    pub name: String,
    pub action_id: String,
    pub url: String,
}

/// Tool resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    pub id: String,
    pub name: String,
    pub action_id: String,
    pub url: String,
}

impl Default for EmDsl {
    fn default() -> Self {
        Self::new()
    }
}

impl EmDsl {
    /// Empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: default_version(),
            outcomes: Vec::new(),
            actions: Vec::new(),
            skills: Vec::new(),
            knowledge: Vec::new(),
            tools: Vec::new(),
        }
    }

    /// Action by id
    #[must_use]
    pub fn action(&self, id: &str) -> Option<&EmAction> {
        self.actions.iter().find(|a| a.id == id)
    }

    /// First action whose name equals `name`
    #[must_use]
    pub fn action_by_name(&self, name: &str) -> Option<&EmAction> {
        self.actions.iter().find(|a| a.name == name)
    }

    /// Actions bound to one SBP task
    pub fn actions_for_task<'a>(&'a self, task_id: &'a str) -> impl Iterator<Item = &'a EmAction> + 'a {
        self.actions
            .iter()
            .filter(move |a| a.source_id.as_deref() == Some(task_id))
    }

    /// Skill of an action by name
    #[must_use]
    pub fn skill(&self, action_id: &str, name: &str) -> Option<&Skill> {
        self.skills
            .iter()
            .find(|s| s.action_id == action_id && s.name == name)
    }

    /// Mutable skill of an action by name
    pub fn skill_mut(&mut self, action_id: &str, name: &str) -> Option<&mut Skill> {
        self.skills
            .iter_mut()
            .find(|s| s.action_id == action_id && s.name == name)
    }

    /// Mutable knowledge of an action by name
    pub fn knowledge_mut(&mut self, action_id: &str, name: &str) -> Option<&mut Knowledge> {
        self.knowledge
            .iter_mut()
            .find(|k| k.action_id == action_id && k.name == name)
    }

    /// Mutable tool of an action by name
    pub fn tool_mut(&mut self, action_id: &str, name: &str) -> Option<&mut Tool> {
        self.tools
            .iter_mut()
            .find(|t| t.action_id == action_id && t.name == name)
    }

    /// Link the map to a KPI, returning the outcome entry id
    pub fn add_outcome(&mut self, kpi_id: impl Into<String>) -> String {
        let id = generate(DocKind::Em, EntityType::Outcome);
        self.outcomes.push(EmOutcome {
            id: id.clone(),
            source_id: Some(kpi_id.into()),
        });
        id
    }

    /// Append an action, returning its id
    pub fn add_action(&mut self, name: impl Into<String>, task_id: Option<String>) -> String {
        let id = generate(DocKind::Em, EntityType::Action);
        self.actions.push(EmAction {
            id: id.clone(),
            name: name.into(),
            source_id: task_id,
        });
        id
    }

    /// Append a skill without learnings
    pub fn add_skill(&mut self, action_id: &str, name: impl Into<String>) -> ModelResult<String> {
        self.require_action(action_id)?;
        let id = generate(DocKind::Em, EntityType::Skill);
        self.skills.push(Skill {
            id: id.clone(),
            name: name.into(),
            action_id: action_id.to_string(),
            learnings: Vec::new(),
        });
        Ok(id)
    }

    /// Append a knowledge resource
    pub fn add_knowledge(
        &mut self,
        action_id: &str,
        name: impl Into<String>,
        url: impl Into<String>,
    ) -> ModelResult<String> {
        self.require_action(action_id)?;
        let id = generate(DocKind::Em, EntityType::Knowledge);
        self.knowledge.push(Knowledge {
            id: id.clone(),
            name: name.into(),
            action_id: action_id.to_string(),
            url: url.into(),
        });
        Ok(id)
    }

    /// Append a tool resource
    pub fn add_tool(
        &mut self,
        action_id: &str,
        name: impl Into<String>,
        url: impl Into<String>,
    ) -> ModelResult<String> {
        self.require_action(action_id)?;
        let id = generate(DocKind::Em, EntityType::Tool);
        self.tools.push(Tool {
            id: id.clone(),
            name: name.into(),
            action_id: action_id.to_string(),
            url: url.into(),
        });
        Ok(id)
    }

    /// Remove an action together with its skills, knowledge and tools
    pub fn remove_action(&mut self, id: &str) -> ModelResult<()> {
        let before = self.actions.len();
        self.actions.retain(|a| a.id != id);
        if self.actions.len() == before {
            return Err(ModelError::not_found("action", id));
        }
        self.skills.retain(|s| s.action_id != id);
        self.knowledge.retain(|k| k.action_id != id);
        self.tools.retain(|t| t.action_id != id);
        Ok(())
    }

    /// Total resources (skills, knowledge, tools) across all actions
    #[inline]
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.skills.len() + self.knowledge.len() + self.tools.len()
    }

    fn require_action(&self, action_id: &str) -> ModelResult<()> {
        self.action(action_id)
            .map(|_| ())
            .ok_or_else(|| ModelError::not_found("action", action_id))
    }
}
