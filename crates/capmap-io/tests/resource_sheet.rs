//! Resource sheet scenarios through the YAML stream boundary.

use capmap_graph::{check_all, visible_tasks, TaskFilter};
use capmap_io::{export_csv, import_csv, parse_stream, serialize_stream, CsvError};
use capmap_test_utils::{csv_text, entity_counts, uat_model};
use pretty_assertions::assert_eq;

#[test]
fn imported_graph_passes_reference_checks() {
    let text = csv_text(&[
        ",受付,問い合わせる,窓口,一次対応,内容を聞き取る,スキル/学習コンテンツ,傾聴/基礎講座,https://learn.local/1",
        ",受付,問い合わせる,窓口,一次対応,内容を聞き取る,ナレッジ,FAQ,https://wiki.local/faq",
        ",解決,回答を受け取る,技術サポート,調査,ログを読む,ツール,Kibana,https://kibana.local",
    ]);
    let outcome = import_csv(&Default::default(), &text).unwrap();
    let result = check_all(&outcome.documents);
    assert!(result.valid, "{:?}", result.errors);
}

#[test]
fn stream_survives_import_cycle() {
    let (docs, ids) = uat_model();
    let yaml = serialize_stream(&docs).unwrap();

    let loaded = parse_stream(&yaml).unwrap();
    let sheet = export_csv(&loaded);
    let imported = import_csv(&loaded, &sheet).unwrap();
    let reloaded = parse_stream(&serialize_stream(&imported.documents).unwrap()).unwrap();

    assert_eq!(reloaded, docs);
    assert_eq!(entity_counts(&reloaded), entity_counts(&docs));

    // Scope analysis still sees the same CSF neighbourhood
    let visible = visible_tasks(&reloaded, &TaskFilter::new().with_csf());
    assert!(visible.contains(&ids.task));
    assert!(visible.contains(&ids.downstream_task));
    assert!(!visible.contains(&ids.isolated_task));
}

#[test]
fn unterminated_quote_reports_its_row() {
    let (docs, _) = uat_model();
    let text = csv_text(&[
        ",新フェーズ,新アクション,新レーン,新タスク,新行動,ツール,x,https://x",
        "\"unterminated",
    ]);
    let err = import_csv(&docs, &text).unwrap_err();
    assert!(matches!(err, CsvError::UnterminatedQuote { row: 3 }), "{err:?}");
    assert_eq!(err.to_string(), "CSVの引用符が閉じられていません（3行目）");
}
