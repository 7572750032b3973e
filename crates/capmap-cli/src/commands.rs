//! Subcommand handlers
//!
//! Each handler does its own file I/O and returns the text for stdout, so
//! `main` only decides where it goes and which exit code to use.

use anyhow::Context;
use capmap_dsl::id::generate;
use capmap_dsl::{sync_cjm_lane, DocKind, DocumentSet, EntityType};
use capmap_graph::{
    build_chain, check, check_all, visible_em_actions, visible_lanes, visible_tasks, TaskFilter,
};
use capmap_io::{export_csv, export_filename, export_rows, import_csv, parse_stream, serialize_stream};
use chrono::{DateTime, TimeZone};
use std::fmt::{Display, Write as _};
use std::fs;
use std::path::Path;

/// Text for stdout plus whether the command succeeded
#[derive(Debug)]
pub(crate) struct CommandOutput {
    pub(crate) text: String,
    pub(crate) success: bool,
}

impl CommandOutput {
    fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            success: true,
        }
    }

    fn failed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            success: false,
        }
    }
}

/// View filter arguments as given on the command line
#[derive(Debug, Default)]
pub(crate) struct ScopeArgs<'a> {
    pub(crate) csf: bool,
    /// Phase id or name
    pub(crate) phase: Option<&'a str>,
    /// Lane id or name
    pub(crate) lane: Option<&'a str>,
}

fn load_stream(path: &Path) -> anyhow::Result<DocumentSet> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_stream(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn load_stream_or_empty(path: &Path) -> anyhow::Result<DocumentSet> {
    if path.exists() {
        load_stream(path)
    } else {
        tracing::info!("{} does not exist; starting from an empty model", path.display());
        Ok(DocumentSet::new())
    }
}

/// Write the stream to `output`, or return it as stdout text
fn emit_stream(docs: &DocumentSet, output: Option<&Path>) -> anyhow::Result<CommandOutput> {
    let yaml = serialize_stream(docs)?;
    match output {
        Some(path) => {
            fs::write(path, yaml).with_context(|| format!("failed to write {}", path.display()))?;
            Ok(CommandOutput::ok(format!("wrote {}\n", path.display())))
        }
        None => Ok(CommandOutput::ok(yaml)),
    }
}

/// Reference check; `internal` adds within-document checks
pub(crate) fn check_stream(stream: &Path, internal: bool, json: bool) -> anyhow::Result<CommandOutput> {
    let docs = load_stream(stream)?;
    let result = if internal { check_all(&docs) } else { check(&docs) };

    let mut text = String::new();
    if json {
        text = serde_json::to_string_pretty(&result)?;
        text.push('\n');
    } else if result.valid {
        writeln!(text, "OK: {} documents, no broken references", docs.len())?;
    } else {
        for err in &result.errors {
            writeln!(text, "{} {}: {}", err.source, err.source_id, err.message)?;
        }
        writeln!(text, "{} broken references", result.errors.len())?;
    }

    Ok(if result.valid {
        CommandOutput::ok(text)
    } else {
        CommandOutput::failed(text)
    })
}

/// KPI → task → action → phase chain
pub(crate) fn chain(stream: &Path, kpi: &str, json: bool) -> anyhow::Result<CommandOutput> {
    let docs = load_stream(stream)?;
    let Some(chain) = build_chain(&docs, kpi) else {
        return Ok(CommandOutput::failed(format!("no complete chain for KPI {kpi}\n")));
    };

    if json {
        let mut text = serde_json::to_string_pretty(&chain)?;
        text.push('\n');
        return Ok(CommandOutput::ok(text));
    }

    let mut text = String::new();
    writeln!(text, "KPI     {} ({})", chain.kpi.name, chain.kpi.id)?;
    writeln!(text, "Task    {} ({})", chain.sbp_task.name, chain.sbp_task.id)?;
    writeln!(text, "Action  {} ({})", chain.cjm_action.name, chain.cjm_action.id)?;
    writeln!(text, "Phase   {} ({})", chain.cjm_phase.name, chain.cjm_phase.id)?;
    for action in &chain.em_actions {
        writeln!(text, "EM      {} ({})", action.name, action.id)?;
    }
    Ok(CommandOutput::ok(text))
}

/// Lanes, tasks and EM actions visible under a filter
pub(crate) fn scope(stream: &Path, args: &ScopeArgs<'_>) -> anyhow::Result<CommandOutput> {
    let docs = load_stream(stream)?;

    let mut filter = TaskFilter::new();
    if args.csf {
        filter = filter.with_csf();
    }
    if let Some(phase) = args.phase {
        let cjm = docs.cjm.as_ref().context("--phase needs a cjm document")?;
        let id = cjm
            .phase(phase)
            .or_else(|| cjm.phase_by_name(phase))
            .map(|p| p.id.clone())
            .with_context(|| format!("unknown phase '{phase}'"))?;
        filter = filter.with_phase(id);
    }
    if let Some(lane) = args.lane {
        let sbp = docs.sbp.as_ref().context("--lane needs an sbp document")?;
        let id = sbp
            .lane(lane)
            .or_else(|| sbp.lane_by_name(lane))
            .map(|l| l.id.clone())
            .with_context(|| format!("unknown lane '{lane}'"))?;
        filter = filter.with_lane(id);
    }

    let visible = visible_tasks(&docs, &filter);
    let mut text = String::new();
    if visible.is_unfiltered() {
        writeln!(text, "(no filter)")?;
    }
    if let Some(sbp) = &docs.sbp {
        for lane in visible_lanes(sbp, &visible) {
            writeln!(text, "{}", lane.name)?;
            for task in sbp.tasks_in_lane(&lane.id).filter(|t| visible.contains(&t.id)) {
                writeln!(text, "  {}  {}", task.name, task.id)?;
            }
        }
    }
    if let Some(em) = &docs.em {
        writeln!(text, "EM actions")?;
        for action in visible_em_actions(em, &visible) {
            writeln!(text, "  {}  {}", action.name, action.id)?;
        }
    }
    Ok(CommandOutput::ok(text))
}

/// Reconcile a resource sheet into the stream
pub(crate) fn import(stream: &Path, sheet: &Path, output: Option<&Path>) -> anyhow::Result<CommandOutput> {
    let docs = load_stream_or_empty(stream)?;
    let text = fs::read_to_string(sheet)
        .with_context(|| format!("failed to read {}", sheet.display()))?;
    let outcome =
        import_csv(&docs, &text).with_context(|| format!("failed to import {}", sheet.display()))?;

    let report = &outcome.report;
    tracing::info!(
        "imported {}: {} rows, {} created, {} urls updated, {} skipped",
        sheet.display(),
        report.rows,
        report.created(),
        report.urls_updated,
        report.skipped_rows + report.unlinked_rows + report.unknown_resource_types
    );
    emit_stream(&outcome.documents, output)
}

/// Write the resource sheet into `out_dir`, named after `at`
pub(crate) fn export<Tz>(stream: &Path, out_dir: &Path, at: &DateTime<Tz>) -> anyhow::Result<CommandOutput>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let docs = load_stream(stream)?;
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let path = out_dir.join(export_filename(at));
    fs::write(&path, export_csv(&docs))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(CommandOutput::ok(format!(
        "wrote {} ({} rows)\n",
        path.display(),
        export_rows(&docs).len()
    )))
}

/// Rebuild the SBP's CJM lane from the CJM
pub(crate) fn sync(stream: &Path, output: Option<&Path>) -> anyhow::Result<CommandOutput> {
    let mut docs = load_stream(stream)?;
    match &docs.cjm {
        Some(cjm) => {
            let sbp = docs.sbp.clone().unwrap_or_default();
            docs.sbp = Some(sync_cjm_lane(Some(cjm), &sbp));
        }
        None => tracing::warn!("{} has no cjm document; nothing to mirror", stream.display()),
    }
    emit_stream(&docs, output)
}

/// Mint a fresh id
pub(crate) fn new_id(kind: &str, entity: &str) -> anyhow::Result<CommandOutput> {
    let kind: DocKind = kind.parse()?;
    let entity: EntityType = entity.parse()?;
    Ok(CommandOutput::ok(format!("{}\n", generate(kind, entity))))
}
