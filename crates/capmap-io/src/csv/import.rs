//! Resource CSV import
//!
//! Rows are folded into the CJM, SBP and EM documents one after another.
//! Every step is find-or-create by exact trimmed name, so importing the same
//! sheet twice leaves the entity counts unchanged. Later rows see entities
//! created by earlier rows.
//!
//! CJM phases and actions are reconciled for the whole sheet before any lane,
//! task or EM step runs, and the CJM lane is re-mirrored in between. A row
//! routed through the CJM lane therefore finds the mirrored task of an action
//! introduced anywhere in the sheet.

use super::tokenizer::tokenize;
use super::{CsvRow, ResourceType, CSV_COLUMNS};
use crate::error::CsvError;
use capmap_dsl::{
    sync_cjm_lane, CjmDsl, DocumentSet, EmDsl, LaneKind, Learning, ModelResult, SbpDsl, CJM_LANE_NAME,
};
use serde::Serialize;

/// Counts of what an import did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Data rows read (header excluded)
    pub rows: usize,
    /// Rows with a blank resource name
    pub skipped_rows: usize,
    /// Rows that never reached an EM action (no lane, task or action name)
    pub unlinked_rows: usize,
    /// Resources whose type column was not recognised
    pub unknown_resource_types: usize,
    pub phases_created: usize,
    pub cjm_actions_created: usize,
    pub lanes_created: usize,
    pub tasks_created: usize,
    pub em_actions_created: usize,
    pub skills_created: usize,
    pub learnings_created: usize,
    pub knowledge_created: usize,
    pub tools_created: usize,
    /// Existing knowledge, tools or learnings whose URL changed
    pub urls_updated: usize,
}

impl ImportReport {
    /// Entities created across all documents
    #[must_use]
    pub fn created(&self) -> usize {
        self.phases_created
            + self.cjm_actions_created
            + self.lanes_created
            + self.tasks_created
            + self.em_actions_created
            + self.skills_created
            + self.learnings_created
            + self.knowledge_created
            + self.tools_created
    }
}

/// Documents after an import, plus what changed
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    /// Input set with CJM, SBP and EM replaced; Outcome untouched
    pub documents: DocumentSet,
    pub report: ImportReport,
}

/// Tokenize and shape-check a sheet
///
/// The header must have nine columns; its labels are not compared. Every
/// data row must also have nine columns.
pub fn parse_rows(text: &str) -> Result<Vec<CsvRow>, CsvError> {
    let mut rows = tokenize(text)?.into_iter();
    let header = rows.next().ok_or(CsvError::Empty)?;
    if header.len() != CSV_COLUMNS.len() {
        return Err(CsvError::HeaderColumnCount {
            found: header.len(),
        });
    }

    rows.enumerate()
        .map(|(i, fields)| {
            <[String; 9]>::try_from(fields)
                .map(CsvRow::from_fields)
                .map_err(|fields| CsvError::RowColumnCount {
                    // header is row 1
                    row: i + 2,
                    found: fields.len(),
                })
        })
        .collect()
}

/// Reconcile a sheet into a document set
///
/// Absent CJM, SBP or EM documents start empty. The input set is never
/// modified; on error nothing is returned but the error.
pub fn import_csv(docs: &DocumentSet, text: &str) -> Result<ImportOutcome, CsvError> {
    let rows = parse_rows(text)?;

    let mut fold = Reconciler {
        cjm: docs.cjm.clone().unwrap_or_default(),
        sbp: docs.sbp.clone().unwrap_or_default(),
        em: docs.em.clone().unwrap_or_default(),
        report: ImportReport {
            rows: rows.len(),
            ..ImportReport::default()
        },
    };
    let actions = rows
        .iter()
        .map(|row| fold.journey(row))
        .collect::<ModelResult<Vec<_>>>()?;
    if !fold.cjm.actions.is_empty() || fold.sbp.cjm_lane().is_some() {
        fold.sync_mirror();
    }
    for (row, action) in rows.iter().zip(actions) {
        fold.apply(row, action)?;
    }

    let Reconciler { cjm, sbp, em, report } = fold;

    tracing::debug!(
        "csv import: {} rows, {} skipped, {} unlinked, {} created, {} urls updated",
        report.rows,
        report.skipped_rows,
        report.unlinked_rows,
        report.created(),
        report.urls_updated
    );

    let mut documents = docs.clone();
    documents.cjm = Some(cjm);
    documents.sbp = Some(sbp);
    documents.em = Some(em);
    Ok(ImportOutcome { documents, report })
}

/// Documents threaded through the fold
struct Reconciler {
    cjm: CjmDsl,
    sbp: SbpDsl,
    em: EmDsl,
    report: ImportReport,
}

impl Reconciler {
    /// Phase and CJM action steps; returns the row's action id
    fn journey(&mut self, row: &CsvRow) -> ModelResult<Option<String>> {
        if row.resource.trim().is_empty() {
            return Ok(None);
        }
        match self.phase(row.phase.trim()) {
            Some(phase) => self.cjm_action(&phase, row.cjm_action.trim()),
            None => Ok(None),
        }
    }

    /// Lane, task, EM action and resource steps
    fn apply(&mut self, row: &CsvRow, action: Option<String>) -> ModelResult<()> {
        let resource = row.resource.trim();
        if resource.is_empty() {
            self.report.skipped_rows += 1;
            return Ok(());
        }

        let task = match self.lane(row.lane.trim())? {
            Some(lane) => self.task(&lane, row.task.trim(), action)?,
            None => None,
        };
        let em_action = task.and_then(|task| self.em_action(row.em_action.trim(), task));
        let Some(em_action) = em_action else {
            self.report.unlinked_rows += 1;
            return Ok(());
        };

        match row.resource_type.trim().parse::<ResourceType>() {
            Ok(ResourceType::Skill) => {
                self.skill(&em_action, resource)?;
            }
            Ok(ResourceType::SkillLearning) => match resource.split_once('/') {
                Some((skill, title)) if !title.trim().is_empty() => {
                    let skill = self.skill(&em_action, skill.trim())?;
                    self.learning(&skill, title.trim(), row.url.trim());
                }
                _ => {
                    self.skill(&em_action, resource.trim_end_matches('/').trim())?;
                }
            },
            Ok(ResourceType::Knowledge) => self.knowledge(&em_action, resource, row.url.trim())?,
            Ok(ResourceType::Tool) => self.tool(&em_action, resource, row.url.trim())?,
            Err(other) => {
                tracing::warn!("skipping resource '{}' with unknown type '{}'", resource, other);
                self.report.unknown_resource_types += 1;
            }
        }
        Ok(())
    }

    fn sync_mirror(&mut self) {
        self.sbp = sync_cjm_lane(Some(&self.cjm), &self.sbp);
    }

    fn phase(&mut self, name: &str) -> Option<String> {
        if name.is_empty() {
            return None;
        }
        if let Some(phase) = self.cjm.phase_by_name(name) {
            return Some(phase.id.clone());
        }
        self.report.phases_created += 1;
        Some(self.cjm.add_phase(name))
    }

    fn cjm_action(&mut self, phase: &str, name: &str) -> ModelResult<Option<String>> {
        if name.is_empty() {
            return Ok(None);
        }
        if let Some(action) = self.cjm.action_by_name(name) {
            return Ok(Some(action.id.clone()));
        }
        let id = self.cjm.add_action(phase, name)?;
        self.report.cjm_actions_created += 1;
        Ok(Some(id))
    }

    fn lane(&mut self, name: &str) -> ModelResult<Option<String>> {
        if name.is_empty() {
            return Ok(None);
        }
        if let Some(lane) = self.sbp.lane_by_name(name) {
            return Ok(Some(lane.id.clone()));
        }
        if name == CJM_LANE_NAME {
            // managed lane; never a team lane of the same name
            self.sync_mirror();
            return Ok(self.sbp.cjm_lane().map(|lane| lane.id.clone()));
        }
        let id = self.sbp.add_lane(name, LaneKind::Team)?;
        self.report.lanes_created += 1;
        Ok(Some(id))
    }

    /// The CJM lane only resolves to its mirrored tasks and never gains new
    /// ones. Other lanes find editable tasks by name anywhere.
    fn task(&mut self, lane: &str, name: &str, action: Option<String>) -> ModelResult<Option<String>> {
        if name.is_empty() {
            return Ok(None);
        }
        if self.sbp.lane(lane).is_some_and(|l| l.kind == LaneKind::Cjm) {
            let mirrored = self
                .sbp
                .tasks_in_lane(lane)
                .find(|t| t.readonly && t.name == name)
                .map(|t| t.id.clone());
            if mirrored.is_none() {
                tracing::warn!("task '{}' is not a mirrored CJM action; row left unlinked", name);
            }
            return Ok(mirrored);
        }
        if let Some(task) = self.sbp.task_by_name(name) {
            return Ok(Some(task.id.clone()));
        }

        let id = self.sbp.add_task(lane, name)?;
        if action.is_some() {
            self.sbp.set_task_source(&id, action)?;
        }
        self.report.tasks_created += 1;
        Ok(Some(id))
    }

    fn em_action(&mut self, name: &str, task: String) -> Option<String> {
        if name.is_empty() {
            return None;
        }
        if let Some(action) = self.em.action_by_name(name) {
            return Some(action.id.clone());
        }
        self.report.em_actions_created += 1;
        Some(self.em.add_action(name, Some(task)))
    }

    fn skill(&mut self, action: &str, name: &str) -> ModelResult<String> {
        if let Some(skill) = self.em.skill(action, name) {
            return Ok(skill.id.clone());
        }
        let id = self.em.add_skill(action, name)?;
        self.report.skills_created += 1;
        Ok(id)
    }

    fn learning(&mut self, skill: &str, title: &str, url: &str) {
        let Some(skill) = self.em.skills.iter_mut().find(|s| s.id == skill) else {
            return;
        };
        match skill.learnings.iter_mut().find(|l| l.title == title) {
            Some(learning) => {
                if learning.url != url {
                    learning.url = url.to_string();
                    self.report.urls_updated += 1;
                }
            }
            None => {
                skill.learnings.push(Learning {
                    title: title.to_string(),
                    url: url.to_string(),
                });
                self.report.learnings_created += 1;
            }
        }
    }

    fn knowledge(&mut self, action: &str, name: &str, url: &str) -> ModelResult<()> {
        match self.em.knowledge_mut(action, name) {
            Some(existing) => {
                if existing.url != url {
                    existing.url = url.to_string();
                    self.report.urls_updated += 1;
                }
            }
            None => {
                self.em.add_knowledge(action, name, url)?;
                self.report.knowledge_created += 1;
            }
        }
        Ok(())
    }

    fn tool(&mut self, action: &str, name: &str, url: &str) -> ModelResult<()> {
        match self.em.tool_mut(action, name) {
            Some(existing) => {
                if existing.url != url {
                    existing.url = url.to_string();
                    self.report.urls_updated += 1;
                }
            }
            None => {
                self.em.add_tool(action, name, url)?;
                self.report.tools_created += 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capmap_test_utils::{csv_text, entity_counts, uat_model};
    use pretty_assertions::assert_eq;

    const JIRA_ROW: &str = "○,UAT,動きを確認する,開発チーム,UATの準備,UATシナリオに基づきテストケースを設計する,ツール,JIRA,https://jira.local/updated";

    #[test]
    fn empty_file_is_rejected() {
        let err = import_csv(&DocumentSet::new(), "").unwrap_err();
        assert_eq!(err.to_string(), "CSVファイルが空です");
        let err = import_csv(&DocumentSet::new(), "\u{feff}\r\n").unwrap_err();
        assert_eq!(err.to_string(), "CSVファイルが空です");
    }

    #[test]
    fn three_column_header_is_rejected() {
        let err = import_csv(&DocumentSet::new(), "CSF,CJMフェーズ,CJMアクション\n,a,b\n").unwrap_err();
        assert_eq!(err.to_string(), "CSVのカラム数が不正です。9列必要です。");
    }

    #[test]
    fn short_data_row_is_rejected_with_row_number() {
        let text = csv_text(&[",UAT,a,lane,task,act,ツール,JIRA,https://x", ",UAT,a"]);
        let err = parse_rows(&text).unwrap_err();
        assert!(matches!(err, CsvError::RowColumnCount { row: 3, found: 3 }));
    }

    #[test]
    fn jira_url_update_changes_only_that_tool() {
        let (docs, ids) = uat_model();
        let before = entity_counts(&docs);

        let outcome = import_csv(&docs, &csv_text(&[JIRA_ROW])).unwrap();
        assert_eq!(entity_counts(&outcome.documents), before);
        assert_eq!(outcome.report.created(), 0);
        assert_eq!(outcome.report.urls_updated, 1);

        let em = outcome.documents.em.as_ref().unwrap();
        let jira: Vec<_> = em.tools.iter().filter(|t| t.name == "JIRA").collect();
        assert_eq!(jira.len(), 1);
        assert_eq!(jira[0].url, "https://jira.local/updated");
        assert_eq!(jira[0].action_id, ids.em_action);

        // Nothing else moved
        let mut expected = docs.clone();
        expected.em.as_mut().unwrap().tool_mut(&ids.em_action, "JIRA").unwrap().url =
            "https://jira.local/updated".to_string();
        assert_eq!(outcome.documents, expected);
    }

    #[test]
    fn fresh_import_builds_linked_graph() {
        let text = csv_text(&[
            ",要件定義,要望を伝える,営業,ヒアリング,課題を整理する,スキル,傾聴,",
            ",要件定義,要望を伝える,営業,ヒアリング,課題を整理する,ナレッジ,ヒアリングシート,https://wiki.local/h",
            ",,,営業,見積作成,概算を出す,ツール,Excel,https://office.local",
        ]);
        let outcome = import_csv(&DocumentSet::new(), &text).unwrap();
        let report = &outcome.report;
        assert_eq!(report.rows, 3);
        assert_eq!(report.phases_created, 1);
        assert_eq!(report.cjm_actions_created, 1);
        assert_eq!(report.lanes_created, 1);
        assert_eq!(report.tasks_created, 2);
        assert_eq!(report.em_actions_created, 2);
        assert_eq!(report.skills_created, 1);
        assert_eq!(report.knowledge_created, 1);
        assert_eq!(report.tools_created, 1);

        let docs = &outcome.documents;
        let cjm = docs.cjm.as_ref().unwrap();
        let sbp = docs.sbp.as_ref().unwrap();
        let em = docs.em.as_ref().unwrap();
        let action = cjm.action_by_name("要望を伝える").unwrap();

        let hearing = sbp.task_by_name("ヒアリング").unwrap();
        assert_eq!(hearing.source_id.as_deref(), Some(action.id.as_str()));
        let estimate = sbp.task_by_name("見積作成").unwrap();
        assert_eq!(estimate.source_id, None);
        assert_eq!(
            em.action_by_name("概算を出す").unwrap().source_id.as_deref(),
            Some(estimate.id.as_str())
        );

        // The created action is mirrored into the CJM lane
        assert!(sbp.cjm_lane().is_some());
        assert!(sbp.task(&action.id).is_some_and(|t| t.readonly));
        assert!(docs.outcome.is_none());
    }

    #[test]
    fn later_rows_see_earlier_entities() {
        let text = csv_text(&[
            ",P,A,L,T,E,ツール,t1,https://1",
            ",P,A,L,T,E,ツール,t2,https://2",
        ]);
        let outcome = import_csv(&DocumentSet::new(), &text).unwrap();
        let counts = entity_counts(&outcome.documents);
        assert_eq!(counts.phases, 1);
        assert_eq!(counts.em_actions, 1);
        assert_eq!(counts.tools, 2);
    }

    #[test]
    fn import_is_idempotent() {
        let text = csv_text(&[
            ",P,A,L,T,E,スキル/学習コンテンツ,設計/入門,https://learn",
            ",P,A,L,T,E,スキル,設計,",
            ",Q,B,L,U,F,ナレッジ,手順書,https://wiki",
        ]);
        let first = import_csv(&DocumentSet::new(), &text).unwrap();
        let second = import_csv(&first.documents, &text).unwrap();
        assert_eq!(entity_counts(&second.documents), entity_counts(&first.documents));
        assert_eq!(second.report.created(), 0);
        assert_eq!(second.report.urls_updated, 0);
        assert_eq!(second.documents, first.documents);
    }

    #[test]
    fn blank_resource_skips_whole_row() {
        let text = csv_text(&[",P,A,L,T,E,ツール,  ,https://x"]);
        let outcome = import_csv(&DocumentSet::new(), &text).unwrap();
        assert_eq!(outcome.report.skipped_rows, 1);
        assert_eq!(outcome.report.created(), 0);
        assert!(outcome.documents.cjm.unwrap().phases.is_empty());
    }

    #[test]
    fn missing_phase_drops_cjm_link_only() {
        let text = csv_text(&[",,A,L,T,E,ツール,x,https://x"]);
        let outcome = import_csv(&DocumentSet::new(), &text).unwrap();
        assert_eq!(outcome.report.cjm_actions_created, 0);
        assert_eq!(outcome.report.tasks_created, 1);
        assert_eq!(outcome.report.tools_created, 1);
    }

    #[test]
    fn missing_lane_leaves_row_unlinked() {
        let text = csv_text(&[",P,A,,T,E,ツール,x,https://x"]);
        let outcome = import_csv(&DocumentSet::new(), &text).unwrap();
        assert_eq!(outcome.report.unlinked_rows, 1);
        assert_eq!(outcome.report.phases_created, 1);
        assert_eq!(outcome.report.tools_created, 0);
    }

    #[test]
    fn learning_splits_on_first_slash() {
        let text = csv_text(&[",P,A,L,T,E,スキル/学習コンテンツ, 設計 / CI/CD入門 ,https://l"]);
        let outcome = import_csv(&DocumentSet::new(), &text).unwrap();
        let em = outcome.documents.em.unwrap();
        assert_eq!(em.skills.len(), 1);
        assert_eq!(em.skills[0].name, "設計");
        assert_eq!(em.skills[0].learnings[0].title, "CI/CD入門");
        assert_eq!(em.skills[0].learnings[0].url, "https://l");
    }

    #[test]
    fn learning_url_is_updated_in_place() {
        let (docs, ids) = uat_model();
        let text = csv_text(&[
            ",UAT,動きを確認する,開発チーム,UATの準備,UATシナリオに基づきテストケースを設計する,スキル/学習コンテンツ,テスト設計/境界値分析入門,https://learn.local/v2",
        ]);
        let outcome = import_csv(&docs, &text).unwrap();
        assert_eq!(outcome.report.urls_updated, 1);
        let em = outcome.documents.em.unwrap();
        let skill = em.skill(&ids.em_action, "テスト設計").unwrap();
        assert_eq!(skill.learnings.len(), 1);
        assert_eq!(skill.learnings[0].url, "https://learn.local/v2");
    }

    #[test]
    fn unknown_resource_type_is_counted() {
        let text = csv_text(&[",P,A,L,T,E,動画,intro,https://v"]);
        let outcome = import_csv(&DocumentSet::new(), &text).unwrap();
        assert_eq!(outcome.report.unknown_resource_types, 1);
        assert_eq!(outcome.documents.em.unwrap().resource_count(), 0);
    }

    #[test]
    fn readonly_tasks_are_not_matched_by_name() {
        let (docs, _) = uat_model();
        // The mirrored task carries the action name; a team lane row with the
        // same task name gets its own editable task.
        let text = csv_text(&[",UAT,動きを確認する,開発チーム,動きを確認する,確認する,ツール,x,https://x"]);
        let outcome = import_csv(&docs, &text).unwrap();
        assert_eq!(outcome.report.tasks_created, 1);
        let sbp = outcome.documents.sbp.unwrap();
        let task = sbp.task_by_name("動きを確認する").unwrap();
        assert!(!task.readonly);
    }

    #[test]
    fn cjm_lane_rows_resolve_to_mirrored_tasks() {
        let (docs, ids) = uat_model();
        let text = csv_text(&[",UAT,動きを確認する,CJM,動きを確認する,顧客対応,ツール,x,https://x"]);
        let outcome = import_csv(&docs, &text).unwrap();
        assert_eq!(outcome.report.tasks_created, 0);
        let em = outcome.documents.em.unwrap();
        assert_eq!(
            em.action_by_name("顧客対応").unwrap().source_id.as_deref(),
            Some(ids.cjm_action.as_str())
        );
    }

    #[test]
    fn cjm_lane_row_links_action_created_by_same_import() {
        let (docs, _) = uat_model();
        let text = csv_text(&[",UAT,新しい行動,CJM,新しい行動,対応する,ツール,Slack,https://s"]);

        let first = import_csv(&docs, &text).unwrap();
        assert_eq!(first.report.unlinked_rows, 0);
        assert_eq!(first.report.cjm_actions_created, 1);
        assert_eq!(first.report.em_actions_created, 1);
        assert_eq!(first.report.tools_created, 1);

        let cjm = first.documents.cjm.as_ref().unwrap();
        let action = cjm.action_by_name("新しい行動").unwrap();
        let em = first.documents.em.as_ref().unwrap();
        assert_eq!(
            em.action_by_name("対応する").unwrap().source_id.as_deref(),
            Some(action.id.as_str())
        );

        let second = import_csv(&first.documents, &text).unwrap();
        assert_eq!(second.report.created(), 0);
        assert_eq!(entity_counts(&second.documents), entity_counts(&first.documents));
        assert_eq!(second.documents, first.documents);
    }

    #[test]
    fn cjm_lane_row_sees_action_from_later_row() {
        let text = csv_text(&[
            ",,,CJM,申し込む,受け付ける,ツール,フォーム,https://form",
            ",申込,申し込む,営業,申込確認,内容を確かめる,ツール,CRM,https://crm",
        ]);
        let first = import_csv(&DocumentSet::new(), &text).unwrap();
        assert_eq!(first.report.unlinked_rows, 0);
        assert_eq!(first.report.em_actions_created, 2);

        let second = import_csv(&first.documents, &text).unwrap();
        assert_eq!(second.report.created(), 0);
        assert_eq!(second.documents, first.documents);
    }

    #[test]
    fn cjm_lane_row_ignores_editable_task_of_same_name() {
        let text = csv_text(&[
            ",,,CJM,調整,連絡する,ツール,Slack,https://s",
            ",,,営業,調整,日程を決める,ツール,カレンダー,https://c",
        ]);
        let first = import_csv(&DocumentSet::new(), &text).unwrap();
        assert_eq!(first.report.unlinked_rows, 1);

        let second = import_csv(&first.documents, &text).unwrap();
        assert_eq!(second.report.unlinked_rows, 1);
        assert_eq!(second.report.created(), 0);
    }

    #[test]
    fn cjm_lane_name_never_becomes_team_lane() {
        let text = csv_text(&[",,,CJM,何か,する,ツール,x,https://x"]);
        let outcome = import_csv(&DocumentSet::new(), &text).unwrap();
        assert_eq!(outcome.report.lanes_created, 0);
        let sbp = outcome.documents.sbp.unwrap();
        assert_eq!(sbp.lanes.len(), 1);
        assert_eq!(sbp.lanes[0].kind, LaneKind::Cjm);
    }
}
