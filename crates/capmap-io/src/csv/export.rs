//! Resource CSV export

use super::tokenizer::BOM;
use super::{CsvRow, ResourceType, CSF_MARK, CSV_COLUMNS};
use capmap_dsl::{DocumentSet, OutcomeDsl};
use chrono::{DateTime, TimeZone};
use std::borrow::Cow;
use std::fmt::Display;

/// Flatten the model into sheet rows
///
/// One row per resource of every EM action whose task exists in the SBP.
/// A skill yields one row when it has no learnings and one row per learning
/// otherwise. Phase and CJM action columns are empty when the task does not
/// resolve to a CJM action.
#[must_use]
pub fn export_rows(docs: &DocumentSet) -> Vec<CsvRow> {
    let (Some(sbp), Some(em)) = (&docs.sbp, &docs.em) else {
        return Vec::new();
    };
    let csf_task = docs.outcome.as_ref().and_then(OutcomeDsl::csf_task_id);

    let mut rows = Vec::new();
    for action in &em.actions {
        let Some(task) = action.source_id.as_deref().and_then(|id| sbp.task(id)) else {
            continue;
        };
        let cjm_action = task
            .cjm_action_id()
            .and_then(|id| docs.cjm.as_ref()?.action(id));
        let phase = cjm_action.and_then(|a| docs.cjm.as_ref()?.phase(&a.phase));

        let base = CsvRow {
            csf: if csf_task == Some(task.id.as_str()) {
                CSF_MARK.to_string()
            } else {
                String::new()
            },
            phase: phase.map(|p| p.name.clone()).unwrap_or_default(),
            cjm_action: cjm_action.map(|a| a.name.clone()).unwrap_or_default(),
            lane: sbp.lane(&task.lane).map(|l| l.name.clone()).unwrap_or_default(),
            task: task.name.clone(),
            em_action: action.name.clone(),
            ..CsvRow::default()
        };
        let row = |ty: ResourceType, resource: String, url: &str| CsvRow {
            resource_type: ty.label().to_string(),
            resource,
            url: url.to_string(),
            ..base.clone()
        };

        for skill in em.skills.iter().filter(|s| s.action_id == action.id) {
            if skill.learnings.is_empty() {
                rows.push(row(ResourceType::Skill, skill.name.clone(), ""));
            }
            for learning in &skill.learnings {
                rows.push(row(
                    ResourceType::SkillLearning,
                    format!("{}/{}", skill.name, learning.title),
                    &learning.url,
                ));
            }
        }
        for k in em.knowledge.iter().filter(|k| k.action_id == action.id) {
            rows.push(row(ResourceType::Knowledge, k.name.clone(), &k.url));
        }
        for t in em.tools.iter().filter(|t| t.action_id == action.id) {
            rows.push(row(ResourceType::Tool, t.name.clone(), &t.url));
        }
    }
    rows
}

/// Render the sheet: BOM, header, then one line per row
pub fn export_csv(docs: &DocumentSet) -> String {
    let mut lines = vec![CSV_COLUMNS.join(",")];
    lines.extend(export_rows(docs).iter().map(|row| {
        row.fields()
            .iter()
            .map(|f| quote_field(f))
            .collect::<Vec<_>>()
            .join(",")
    }));

    let mut out = String::from(BOM);
    out.push_str(&lines.join("\n"));
    out
}

/// Quote a field when it holds a comma, quote or line break
#[must_use]
pub fn quote_field(field: &str) -> Cow<'_, str> {
    if field.contains(|c| matches!(c, ',' | '"' | '\n' | '\r')) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// File name for an export taken at `at`
pub fn export_filename<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.format("リソース一覧_%Y%m%d_%H%M%S.csv").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::{import_csv, tokenize};
    use capmap_test_utils::{entity_counts, uat_model, CSV_HEADER};
    use chrono::{FixedOffset, Utc};
    use pretty_assertions::assert_eq;

    #[test]
    fn quoting() {
        assert_eq!(quote_field("plain"), "plain");
        assert_eq!(quote_field("a,b"), "\"a,b\"");
        assert_eq!(quote_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(quote_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn uat_model_rows() {
        let (docs, _) = uat_model();
        let text = export_csv(&docs);
        assert!(text.starts_with(BOM));

        let lines: Vec<&str> = text.trim_start_matches(BOM).split('\n').collect();
        assert_eq!(
            lines,
            vec![
                CSV_HEADER,
                "○,UAT,動きを確認する,開発チーム,UATの準備,UATシナリオに基づきテストケースを設計する,スキル/学習コンテンツ,テスト設計/境界値分析入門,https://learn.local/bva",
                "○,UAT,動きを確認する,開発チーム,UATの準備,UATシナリオに基づきテストケースを設計する,ナレッジ,テスト手順書,https://wiki.local/uat",
                "○,UAT,動きを確認する,開発チーム,UATの準備,UATシナリオに基づきテストケースを設計する,ツール,JIRA,https://jira.local",
            ]
        );
    }

    #[test]
    fn bare_skill_and_unbound_actions() {
        let (mut docs, ids) = uat_model();
        let em = docs.em.as_mut().unwrap();
        em.add_skill(&ids.em_action, "傾聴").unwrap();
        let orphan = em.add_action("宙に浮いた行動", None);
        em.add_tool(&orphan, "Slack", "https://slack.local").unwrap();
        docs.outcome.as_mut().unwrap().set_csf_task(None);

        let rows = export_rows(&docs);
        assert_eq!(rows.len(), 4);
        let bare = rows.iter().find(|r| r.resource == "傾聴").unwrap();
        assert_eq!(bare.resource_type, "スキル");
        assert_eq!(bare.url, "");
        assert!(rows.iter().all(|r| r.csf.is_empty()));
        assert!(rows.iter().all(|r| r.resource != "Slack"));
    }

    #[test]
    fn quoted_names_survive_tokenizing() {
        let (mut docs, ids) = uat_model();
        docs.em
            .as_mut()
            .unwrap()
            .add_tool(&ids.em_action, "Sheets, \"v2\"", "https://x")
            .unwrap();
        let parsed = tokenize(&export_csv(&docs)).unwrap();
        assert!(parsed.iter().any(|r| r[7] == "Sheets, \"v2\""));
        assert!(parsed.iter().all(|r| r.len() == 9));
    }

    #[test]
    fn export_then_import_changes_nothing() {
        let (docs, _) = uat_model();
        let outcome = import_csv(&docs, &export_csv(&docs)).unwrap();
        assert_eq!(entity_counts(&outcome.documents), entity_counts(&docs));
        assert_eq!(outcome.report.created(), 0);
        assert_eq!(outcome.report.urls_updated, 0);
        assert_eq!(outcome.documents, docs);
    }

    #[test]
    fn empty_model_exports_header_only() {
        let text = export_csv(&DocumentSet::new());
        assert_eq!(text.trim_start_matches(BOM), CSV_HEADER);
    }

    #[test]
    fn filename_uses_local_timestamp() {
        let jst = FixedOffset::east_opt(9 * 3600).unwrap();
        let at = jst.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        assert_eq!(export_filename(&at), "リソース一覧_20240305_140709.csv");

        let utc = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 0).unwrap();
        assert_eq!(export_filename(&utc), "リソース一覧_20241231_235900.csv");
    }
}
