//! Customer Journey Map
//!
//! A persona walking through ordered phases, each holding ordered actions
//! scored by emotion.

use super::{default_version, version_or_default};
use crate::error::{ModelError, ModelResult};
use crate::id::{generate, DocKind, EntityType};
use serde::{Deserialize, Serialize};

/// Lowest emotion score
pub const EMOTION_MIN: i64 = -2;
/// Highest emotion score
pub const EMOTION_MAX: i64 = 2;

/// CJM document body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CjmDsl {
    #[serde(default = "default_version", deserialize_with = "version_or_default")]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<Persona>,

    #[serde(default)]
    pub phases: Vec<CjmPhase>,

    /// Actions in display order; order within a phase is significant
    #[serde(default)]
    pub actions: Vec<CjmAction>,
}

/// Journey persona
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Journey phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CjmPhase {
    pub id: String,
    pub name: String,
}

/// Customer action inside a phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CjmAction {
    pub id: String,
    pub name: String,
    /// Owning phase id
    pub phase: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub touchpoints: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thoughts_feelings: Option<Vec<String>>,
    pub emotion_score: i64,
}

impl Default for CjmDsl {
    fn default() -> Self {
        Self::new()
    }
}

impl CjmDsl {
    /// Empty journey
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: default_version(),
            persona: None,
            phases: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Phase by id
    #[must_use]
    pub fn phase(&self, id: &str) -> Option<&CjmPhase> {
        self.phases.iter().find(|p| p.id == id)
    }

    /// Action by id
    #[must_use]
    pub fn action(&self, id: &str) -> Option<&CjmAction> {
        self.actions.iter().find(|a| a.id == id)
    }

    /// First phase whose name equals `name`
    #[must_use]
    pub fn phase_by_name(&self, name: &str) -> Option<&CjmPhase> {
        self.phases.iter().find(|p| p.name == name)
    }

    /// First action whose name equals `name`, across all phases
    #[must_use]
    pub fn action_by_name(&self, name: &str) -> Option<&CjmAction> {
        self.actions.iter().find(|a| a.name == name)
    }

    /// Actions of one phase, in order
    pub fn actions_in_phase<'a>(&'a self, phase_id: &'a str) -> impl Iterator<Item = &'a CjmAction> + 'a {
        self.actions.iter().filter(move |a| a.phase == phase_id)
    }

    /// Append a phase, returning its id
    pub fn add_phase(&mut self, name: impl Into<String>) -> String {
        let id = generate(DocKind::Cjm, EntityType::Phase);
        self.phases.push(CjmPhase {
            id: id.clone(),
            name: name.into(),
        });
        id
    }

    /// Append a neutral action to an existing phase, returning its id
    pub fn add_action(&mut self, phase_id: &str, name: impl Into<String>) -> ModelResult<String> {
        if self.phase(phase_id).is_none() {
            return Err(ModelError::not_found("phase", phase_id));
        }
        let id = generate(DocKind::Cjm, EntityType::Action);
        self.actions.push(CjmAction {
            id: id.clone(),
            name: name.into(),
            phase: phase_id.to_string(),
            touchpoints: None,
            thoughts_feelings: None,
            emotion_score: 0,
        });
        Ok(id)
    }

    /// Rename a phase
    pub fn rename_phase(&mut self, id: &str, name: impl Into<String>) -> ModelResult<()> {
        let phase = self
            .phases
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ModelError::not_found("phase", id))?;
        phase.name = name.into();
        Ok(())
    }

    /// Rename an action
    pub fn rename_action(&mut self, id: &str, name: impl Into<String>) -> ModelResult<()> {
        self.action_mut(id)?.name = name.into();
        Ok(())
    }

    /// Set an action's emotion score
    pub fn set_emotion_score(&mut self, id: &str, score: i64) -> ModelResult<()> {
        if !(EMOTION_MIN..=EMOTION_MAX).contains(&score) {
            return Err(ModelError::EmotionOutOfRange(score));
        }
        self.action_mut(id)?.emotion_score = score;
        Ok(())
    }

    /// Remove a phase and every action in it
    ///
    /// Returns the removed action ids. SBP tasks pointing at them are left
    /// dangling until the reference checker reports them.
    pub fn remove_phase(&mut self, id: &str) -> ModelResult<Vec<String>> {
        let before = self.phases.len();
        self.phases.retain(|p| p.id != id);
        if self.phases.len() == before {
            return Err(ModelError::not_found("phase", id));
        }

        let mut removed = Vec::new();
        self.actions.retain(|a| {
            if a.phase == id {
                removed.push(a.id.clone());
                false
            } else {
                true
            }
        });
        Ok(removed)
    }

    /// Remove one action
    pub fn remove_action(&mut self, id: &str) -> ModelResult<()> {
        let before = self.actions.len();
        self.actions.retain(|a| a.id != id);
        if self.actions.len() == before {
            return Err(ModelError::not_found("action", id));
        }
        Ok(())
    }

    fn action_mut(&mut self, id: &str) -> ModelResult<&mut CjmAction> {
        self.actions
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| ModelError::not_found("action", id))
    }
}
