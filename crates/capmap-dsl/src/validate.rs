//! Structural validators
//!
//! Each validator walks an untyped YAML value and reports every violation it
//! finds as `"<path>: <reason>"`. Nothing is thrown; callers show the whole
//! list at once. [`validate_dsl`] dispatches on the `kind` field.

use crate::id::DocKind;
use crate::types::{LaneKind, EMOTION_MAX, EMOTION_MIN};
use serde::Serialize;
use serde_yaml::{Mapping, Sequence, Value};
use std::collections::HashSet;

/// Outcome of a structural validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Passing result
    #[inline]
    #[must_use]
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// Result from a list of violations; empty means valid
    #[inline]
    #[must_use]
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Single-violation failure
    #[inline]
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::from_errors(vec![message.into()])
    }
}

/// Read the `kind` discriminator of a raw document
///
/// Returns `None` for non-mappings, missing kinds and unknown kinds.
#[must_use]
pub fn kind_of(value: &Value) -> Option<DocKind> {
    value.get("kind")?.as_str()?.parse().ok()
}

/// Validate any document, routing on its `kind`
#[must_use]
pub fn validate_dsl(value: &Value) -> ValidationResult {
    let Some(map) = value.as_mapping() else {
        return ValidationResult::error("Data must be an object");
    };
    let kind = map.get("kind");
    match kind.and_then(Value::as_str).and_then(|k| k.parse::<DocKind>().ok()) {
        Some(DocKind::Cjm) => validate_cjm(value),
        Some(DocKind::Sbp) => validate_sbp(value),
        Some(DocKind::Outcome) => validate_outcome(value),
        Some(DocKind::Em) => validate_em(value),
        None => ValidationResult::error(format!(
            "Unknown DSL kind: {}",
            kind.map_or_else(|| "undefined".to_string(), describe)
        )),
    }
}

/// Validate a CJM document
#[must_use]
pub fn validate_cjm(value: &Value) -> ValidationResult {
    run(value, DocKind::Cjm, |root, v| {
        if let Some(persona) = v.optional_object(root, "", "persona") {
            v.string(persona, "persona", "name", Need::Required);
            v.string(persona, "persona", "description", Need::Optional);
        }

        let mut phase_ids = HashSet::new();
        for (path, phase) in v.objects(root, "phases") {
            v.id(phase, &path, &mut phase_ids);
            v.string(phase, &path, "name", Need::Required);
        }

        let mut action_ids = HashSet::new();
        for (path, action) in v.objects(root, "actions") {
            v.id(action, &path, &mut action_ids);
            v.string(action, &path, "name", Need::Required);
            v.string(action, &path, "phase", Need::NonEmpty);
            v.string_list(action, &path, "touchpoints");
            v.string_list(action, &path, "thoughts_feelings");
            v.emotion_score(action, &path);
        }
    })
}

/// Validate an SBP document
#[must_use]
pub fn validate_sbp(value: &Value) -> ValidationResult {
    run(value, DocKind::Sbp, |root, v| {
        let mut lane_ids = HashSet::new();
        let mut cjm_lanes = 0usize;
        for (path, lane) in v.objects(root, "lanes") {
            v.id(lane, &path, &mut lane_ids);
            v.string(lane, &path, "name", Need::Required);
            if let Some(kind) = v.string(lane, &path, "kind", Need::Required) {
                if !LaneKind::NAMES.contains(&kind) {
                    v.push(
                        &join(&path, "kind"),
                        format!("must be one of {}", LaneKind::NAMES.join(", ")),
                    );
                } else if kind == "cjm" {
                    cjm_lanes += 1;
                }
            }
        }
        if cjm_lanes > 1 {
            v.push("lanes", "at most one lane may have kind cjm");
        }

        let mut task_ids = HashSet::new();
        for (path, task) in v.objects(root, "tasks") {
            v.id(task, &path, &mut task_ids);
            v.string(task, &path, "lane", Need::NonEmpty);
            v.string(task, &path, "name", Need::Required);
            v.string(task, &path, "source_id", Need::Optional);
            if let Some(readonly) = task.get("readonly") {
                if !readonly.is_bool() {
                    v.push(&join(&path, "readonly"), "must be a boolean");
                }
            }
            if let Some(position) = v.optional_object(task, &path, "position") {
                let pos_path = join(&path, "position");
                v.number(position, &pos_path, "x");
                v.number(position, &pos_path, "y");
            }
        }

        for (path, conn) in v.objects(root, "connections") {
            v.string(conn, &path, "source", Need::NonEmpty);
            v.string(conn, &path, "target", Need::NonEmpty);
            v.string(conn, &path, "sourceHandle", Need::Optional);
            v.string(conn, &path, "targetHandle", Need::Optional);
        }
    })
}

/// Validate an Outcome document
#[must_use]
pub fn validate_outcome(value: &Value) -> ValidationResult {
    run(value, DocKind::Outcome, |root, v| {
        if let Some(kgi) = v.object(root, "", "kgi") {
            v.string(kgi, "kgi", "id", Need::NonEmpty);
            v.string(kgi, "kgi", "name", Need::Required);
        }
        if let Some(csf) = v.object(root, "", "primary_csf") {
            v.string(csf, "primary_csf", "id", Need::NonEmpty);
            v.string(csf, "primary_csf", "kgi_id", Need::NonEmpty);
            v.string(csf, "primary_csf", "source_id", Need::Optional);
            v.string(csf, "primary_csf", "rationale", Need::Optional);
        }
        if let Some(kpi) = v.object(root, "", "primary_kpi") {
            v.string(kpi, "primary_kpi", "id", Need::NonEmpty);
            v.string(kpi, "primary_kpi", "csf_id", Need::NonEmpty);
            v.string(kpi, "primary_kpi", "name", Need::Required);
            v.number(kpi, "primary_kpi", "target");
            v.string(kpi, "primary_kpi", "unit", Need::Optional);
            v.string(kpi, "primary_kpi", "definition", Need::Optional);
        }
    })
}

/// Validate an EM document
#[must_use]
pub fn validate_em(value: &Value) -> ValidationResult {
    run(value, DocKind::Em, |root, v| {
        let mut ids = HashSet::new();
        for (path, outcome) in v.objects(root, "outcomes") {
            v.id(outcome, &path, &mut ids);
            v.string(outcome, &path, "source_id", Need::Optional);
        }
        for (path, action) in v.objects(root, "actions") {
            v.id(action, &path, &mut ids);
            v.string(action, &path, "name", Need::Required);
            v.string(action, &path, "source_id", Need::Optional);
        }
        for (path, skill) in v.objects(root, "skills") {
            v.id(skill, &path, &mut ids);
            v.string(skill, &path, "name", Need::Required);
            v.string(skill, &path, "action_id", Need::NonEmpty);
            if skill.get("learnings").is_some_and(|l| !l.is_null()) {
                for (lpath, learning) in v.objects_at(skill, &path, "learnings") {
                    v.string(learning, &lpath, "title", Need::Required);
                    v.string(learning, &lpath, "url", Need::Required);
                }
            }
        }
        for key in ["knowledge", "tools"] {
            for (path, resource) in v.objects(root, key) {
                v.id(resource, &path, &mut ids);
                v.string(resource, &path, "name", Need::Required);
                v.string(resource, &path, "action_id", Need::NonEmpty);
                v.string(resource, &path, "url", Need::Required);
            }
        }
    })
}

/// Field requirement level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Need {
    Optional,
    Required,
    NonEmpty,
}

/// Error collector shared by the validators
#[derive(Debug, Default)]
struct Violations {
    errors: Vec<String>,
}

fn run(value: &Value, kind: DocKind, body: impl FnOnce(&Mapping, &mut Violations)) -> ValidationResult {
    let Some(root) = value.as_mapping() else {
        return ValidationResult::error("Data must be an object");
    };
    let mut v = Violations::default();
    match root.get("kind").and_then(Value::as_str) {
        Some(k) if k == kind.as_str() => {}
        _ => v.push("kind", format!("must be '{}'", kind)),
    }
    v.string(root, "", "version", Need::Optional);
    body(root, &mut v);
    ValidationResult::from_errors(v.errors)
}

impl Violations {
    fn push(&mut self, path: &str, reason: impl AsRef<str>) {
        self.errors.push(format!("{}: {}", path, reason.as_ref()));
    }

    fn string<'v>(&mut self, obj: &'v Mapping, parent: &str, key: &str, need: Need) -> Option<&'v str> {
        let path = join(parent, key);
        match obj.get(key) {
            None | Some(Value::Null) => {
                if need != Need::Optional {
                    self.push(&path, "is required");
                }
                None
            }
            Some(Value::String(s)) => {
                if need == Need::NonEmpty && s.trim().is_empty() {
                    self.push(&path, "must not be empty");
                }
                Some(s.as_str())
            }
            Some(_) => {
                self.push(&path, "must be a string");
                None
            }
        }
    }

    fn id(&mut self, obj: &Mapping, parent: &str, seen: &mut HashSet<String>) {
        if let Some(id) = self.string(obj, parent, "id", Need::NonEmpty) {
            if !id.is_empty() && !seen.insert(id.to_string()) {
                self.push(&join(parent, "id"), format!("duplicate id '{}'", id));
            }
        }
    }

    fn number(&mut self, obj: &Mapping, parent: &str, key: &str) {
        let path = join(parent, key);
        match obj.get(key) {
            None | Some(Value::Null) => self.push(&path, "is required"),
            Some(Value::Number(_)) => {}
            Some(_) => self.push(&path, "must be a number"),
        }
    }

    fn emotion_score(&mut self, obj: &Mapping, parent: &str) {
        let path = join(parent, "emotion_score");
        match obj.get("emotion_score") {
            None | Some(Value::Null) => self.push(&path, "is required"),
            Some(Value::Number(n)) => match n.as_i64() {
                Some(score) if (EMOTION_MIN..=EMOTION_MAX).contains(&score) => {}
                Some(_) => self.push(
                    &path,
                    format!("must be between {} and {}", EMOTION_MIN, EMOTION_MAX),
                ),
                None => self.push(&path, "must be an integer"),
            },
            Some(_) => self.push(&path, "must be a number"),
        }
    }

    fn string_list(&mut self, obj: &Mapping, parent: &str, key: &str) {
        let path = join(parent, key);
        match obj.get(key) {
            None | Some(Value::Null) => {}
            Some(Value::Sequence(items)) => {
                for (i, item) in items.iter().enumerate() {
                    if !item.is_string() {
                        self.push(&format!("{}[{}]", path, i), "must be a string");
                    }
                }
            }
            Some(_) => self.push(&path, "must be an array of strings"),
        }
    }

    fn object<'v>(&mut self, obj: &'v Mapping, parent: &str, key: &str) -> Option<&'v Mapping> {
        let path = join(parent, key);
        match obj.get(key) {
            None | Some(Value::Null) => {
                self.push(&path, "is required");
                None
            }
            Some(Value::Mapping(m)) => Some(m),
            Some(_) => {
                self.push(&path, "must be an object");
                None
            }
        }
    }

    fn optional_object<'v>(&mut self, obj: &'v Mapping, parent: &str, key: &str) -> Option<&'v Mapping> {
        match obj.get(key) {
            None | Some(Value::Null) => None,
            Some(_) => self.object(obj, parent, key),
        }
    }

    /// Required top-level array of objects
    fn objects<'v>(&mut self, root: &'v Mapping, key: &str) -> Vec<(String, &'v Mapping)> {
        self.objects_at(root, "", key)
    }

    fn objects_at<'v>(&mut self, obj: &'v Mapping, parent: &str, key: &str) -> Vec<(String, &'v Mapping)> {
        let path = join(parent, key);
        let items: &Sequence = match obj.get(key) {
            None | Some(Value::Null) => {
                self.push(&path, "is required");
                return Vec::new();
            }
            Some(Value::Sequence(items)) => items,
            Some(_) => {
                self.push(&path, "must be an array");
                return Vec::new();
            }
        };

        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let item_path = format!("{}[{}]", path, i);
            match item.as_mapping() {
                Some(m) => out.push((item_path, m)),
                None => self.push(&item_path, "must be an object"),
            }
        }
        out
    }
}

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .unwrap_or_default()
            .trim()
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn yaml(src: &str) -> Value {
        serde_yaml::from_str(src).unwrap()
    }

    #[test]
    fn dispatcher_rejects_non_objects() {
        for v in [Value::Null, yaml("[1, 2]"), yaml("42"), yaml("text")] {
            assert_eq!(
                validate_dsl(&v),
                ValidationResult::error("Data must be an object")
            );
        }
    }

    #[test]
    fn dispatcher_rejects_unknown_kind() {
        assert_eq!(
            validate_dsl(&yaml("kind: roadmap")).errors,
            vec!["Unknown DSL kind: roadmap".to_string()]
        );
        assert_eq!(
            validate_dsl(&yaml("name: x")).errors,
            vec!["Unknown DSL kind: undefined".to_string()]
        );
    }

    #[test]
    fn valid_cjm() {
        let v = yaml(
            r#"
kind: cjm
version: "1.0"
persona: { name: 田中 }
phases:
  - { id: "cjm:phase:1", name: 認知 }
actions:
  - id: "cjm:action:1"
    name: 広告を見る
    phase: "cjm:phase:1"
    touchpoints: [Web]
    emotion_score: 1
"#,
        );
        assert_eq!(validate_dsl(&v), ValidationResult::ok());
    }

    #[test]
    fn cjm_reports_every_violation() {
        let v = yaml(
            r#"
kind: cjm
phases:
  - { id: "cjm:phase:1" }
  - { id: "cjm:phase:1", name: dup }
actions:
  - { id: "cjm:action:1", name: a, phase: "cjm:phase:1", emotion_score: 3 }
  - { id: "cjm:action:2", name: b, phase: "cjm:phase:1", emotion_score: 0.5 }
  - { id: "cjm:action:3", name: c, emotion_score: "high", touchpoints: "Web" }
"#,
        );
        let result = validate_cjm(&v);
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec![
                "phases[0].name: is required",
                "phases[1].id: duplicate id 'cjm:phase:1'",
                "actions[0].emotion_score: must be between -2 and 2",
                "actions[1].emotion_score: must be an integer",
                "actions[2].phase: is required",
                "actions[2].touchpoints: must be an array of strings",
                "actions[2].emotion_score: must be a number",
            ]
        );
    }

    #[test]
    fn sbp_lane_rules() {
        let v = yaml(
            r#"
kind: sbp
lanes:
  - { id: l1, name: CJM, kind: cjm }
  - { id: l2, name: CJM2, kind: cjm }
  - { id: l3, name: Ops, kind: robot }
tasks:
  - { id: t1, lane: l3, name: x, readonly: "yes", position: { x: 1 } }
connections:
  - { source: t1 }
"#,
        );
        assert_eq!(
            validate_sbp(&v).errors,
            vec![
                "lanes[2].kind: must be one of cjm, human, team, system",
                "lanes: at most one lane may have kind cjm",
                "tasks[0].readonly: must be a boolean",
                "tasks[0].position.y: is required",
                "connections[0].target: is required",
            ]
        );
    }

    #[test]
    fn outcome_requires_singletons() {
        let v = yaml(
            r#"
kind: outcome
kgi: { id: k, name: 売上 }
primary_kpi: { id: p, csf_id: c, name: 率, target: "high" }
"#,
        );
        assert_eq!(
            validate_outcome(&v).errors,
            vec!["primary_csf: is required", "primary_kpi.target: must be a number"]
        );
    }

    #[test]
    fn em_nested_learnings() {
        let v = yaml(
            r#"
kind: em
outcomes: []
actions: [{ id: a, name: act, source_id: t }]
skills:
  - { id: s, name: skill, action_id: a, learnings: [{ title: t }] }
knowledge: [{ id: k, name: doc, action_id: a, url: "https://x" }]
tools: [{ id: k, name: tool, action_id: "", url: "https://y" }]
"#,
        );
        assert_eq!(
            validate_em(&v).errors,
            vec![
                "skills[0].learnings[0].url: is required",
                "tools[0].id: duplicate id 'k'",
                "tools[0].action_id: must not be empty",
            ]
        );
    }

    #[test]
    fn validator_checks_its_own_kind() {
        let v = yaml("kind: em\noutcomes: []\nactions: []\nskills: []\nknowledge: []\ntools: []");
        assert!(validate_em(&v).valid);
        assert_eq!(validate_cjm(&v).errors[0], "kind: must be 'cjm'");
    }

    #[test]
    fn kind_of_reads_discriminator() {
        assert_eq!(kind_of(&yaml("kind: outcome")), Some(DocKind::Outcome));
        assert_eq!(kind_of(&yaml("kind: nope")), None);
        assert_eq!(kind_of(&yaml("- kind")), None);
    }

    #[test]
    fn null_optional_fields_are_accepted() {
        let em = yaml(
            r#"
kind: em
version: ~
outcomes: []
actions: [{ id: a, name: act }]
skills: [{ id: s, name: skill, action_id: a, learnings: ~ }]
knowledge: []
tools: []
"#,
        );
        assert_eq!(validate_em(&em), ValidationResult::ok());

        let outcome = yaml(
            r#"
kind: outcome
version: ~
kgi: { id: k, name: 売上 }
primary_csf: { id: c, kgi_id: k, rationale: ~ }
primary_kpi: { id: p, csf_id: c, name: 率, target: 90 }
"#,
        );
        assert_eq!(validate_outcome(&outcome), ValidationResult::ok());
    }
}
