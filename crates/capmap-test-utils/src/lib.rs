//! Testing utilities for capmap workspace
//!
//! Shared document fixtures. [`uat_model`] builds a small, fully linked
//! four-document graph around a UAT preparation task.

#![allow(missing_docs)]

use capmap_dsl::{sync_cjm_lane, CjmDsl, DocumentSet, EmDsl, LaneKind, Learning, OutcomeDsl, SbpDsl};

/// Ids of the entities in [`uat_model`]
#[derive(Debug, Clone)]
pub struct UatIds {
    pub phase: String,
    pub cjm_action: String,
    pub lane: String,
    pub task: String,
    pub downstream_task: String,
    pub isolated_task: String,
    pub kpi: String,
    pub em_action: String,
}

/// Header line of the resource CSV
pub const CSV_HEADER: &str = "CSF,CJMフェーズ,CJMアクション,SBPレーン,SBPタスク,必要な行動,リソースタイプ,リソース,URL";

/// Four linked documents:
///
/// - CJM phase `UAT` with action `動きを確認する`
/// - SBP lane `開発チーム` with task `UATの準備` (linked to the action and
///   carrying the CSF), a connected task `リリース判定`, and an unconnected
///   task `議事録作成`; the CJM lane mirrors the action
/// - Outcome whose CSF points at `UATの準備`
/// - EM action `UATシナリオに基づきテストケースを設計する` with tool `JIRA`,
///   knowledge `テスト手順書`, and skill `テスト設計` with one learning
pub fn uat_model() -> (DocumentSet, UatIds) {
    let mut cjm = CjmDsl::new();
    let phase = cjm.add_phase("UAT");
    let cjm_action = cjm.add_action(&phase, "動きを確認する").unwrap();

    let mut sbp = sync_cjm_lane(Some(&cjm), &SbpDsl::new());
    let lane = sbp.add_lane("開発チーム", LaneKind::Team).unwrap();
    let task = sbp.add_task(&lane, "UATの準備").unwrap();
    sbp.set_task_source(&task, Some(cjm_action.clone())).unwrap();
    let downstream_task = sbp.add_task(&lane, "リリース判定").unwrap();
    let isolated_task = sbp.add_task(&lane, "議事録作成").unwrap();
    sbp.connect(&task, &downstream_task);

    let mut outcome = OutcomeDsl::new("顧客満足度の向上", "UAT合格率", 95.0);
    outcome.set_csf_task(Some(task.clone()));
    let kpi = outcome.primary_kpi.id.clone();

    let mut em = EmDsl::new();
    em.add_outcome(kpi.clone());
    let em_action = em.add_action("UATシナリオに基づきテストケースを設計する", Some(task.clone()));
    em.add_tool(&em_action, "JIRA", "https://jira.local").unwrap();
    em.add_knowledge(&em_action, "テスト手順書", "https://wiki.local/uat").unwrap();
    let skill = em.add_skill(&em_action, "テスト設計").unwrap();
    if let Some(s) = em.skills.iter_mut().find(|s| s.id == skill) {
        s.learnings.push(Learning {
            title: "境界値分析入門".to_string(),
            url: "https://learn.local/bva".to_string(),
        });
    }

    let docs = DocumentSet::new()
        .with_cjm(cjm)
        .with_sbp(sbp)
        .with_outcome(outcome)
        .with_em(em);

    let ids = UatIds {
        phase,
        cjm_action,
        lane,
        task,
        downstream_task,
        isolated_task,
        kpi,
        em_action,
    };
    (docs, ids)
}

/// Join a header and data rows into CSV text (no BOM)
pub fn csv_text(rows: &[&str]) -> String {
    let mut out = String::from(CSV_HEADER);
    for row in rows {
        out.push('\n');
        out.push_str(row);
    }
    out.push('\n');
    out
}

/// Entity counts across all documents, for idempotence checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityCounts {
    pub phases: usize,
    pub cjm_actions: usize,
    pub lanes: usize,
    pub tasks: usize,
    pub em_actions: usize,
    pub skills: usize,
    pub learnings: usize,
    pub knowledge: usize,
    pub tools: usize,
}

/// Count every entity in a set
pub fn entity_counts(docs: &DocumentSet) -> EntityCounts {
    let cjm = docs.cjm.as_ref();
    let sbp = docs.sbp.as_ref();
    let em = docs.em.as_ref();
    EntityCounts {
        phases: cjm.map_or(0, |c| c.phases.len()),
        cjm_actions: cjm.map_or(0, |c| c.actions.len()),
        lanes: sbp.map_or(0, |s| s.lanes.len()),
        tasks: sbp.map_or(0, |s| s.tasks.len()),
        em_actions: em.map_or(0, |e| e.actions.len()),
        skills: em.map_or(0, |e| e.skills.len()),
        learnings: em.map_or(0, |e| e.skills.iter().map(|s| s.learnings.len()).sum()),
        knowledge: em.map_or(0, |e| e.knowledge.len()),
        tools: em.map_or(0, |e| e.tools.len()),
    }
}
