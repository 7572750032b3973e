//! `capmap` command line tool
//!
//! Works on model files holding the CJM, SBP, Outcome and EM documents as one
//! YAML stream.

mod commands;
mod config;
mod logging;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use commands::{CommandOutput, ScopeArgs};
use config::{CapmapConfig, LogFormat};
use std::path::{Path, PathBuf};

fn stream_arg() -> Arg {
    Arg::new("stream")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Model file (multi-document YAML)")
}

fn output_arg() -> Arg {
    Arg::new("output")
        .long("output")
        .short('o')
        .value_parser(value_parser!(PathBuf))
        .help("Write the resulting stream here instead of stdout")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

fn cli() -> Command {
    Command::new("capmap")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Capability map tooling: CJM, SBP, Outcome and EM documents")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file (default: ./capmap.toml when present)"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .value_parser(["text", "json"])
                .help("Log output format"),
        )
        .subcommand(
            Command::new("check")
                .about("Report broken references between documents")
                .arg(stream_arg())
                .arg(json_arg())
                .arg(
                    Arg::new("internal")
                        .long("internal")
                        .action(ArgAction::SetTrue)
                        .help("Also check references inside each document"),
                ),
        )
        .subcommand(
            Command::new("chain")
                .about("Show the KPI → task → action → phase chain")
                .arg(stream_arg())
                .arg(
                    Arg::new("kpi")
                        .long("kpi")
                        .required(true)
                        .help("KPI id"),
                )
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("scope")
                .about("List lanes, tasks and EM actions visible under a filter")
                .arg(stream_arg())
                .arg(
                    Arg::new("csf")
                        .long("csf")
                        .action(ArgAction::SetTrue)
                        .help("Only tasks connected to the CSF task"),
                )
                .arg(
                    Arg::new("phase")
                        .long("phase")
                        .help("Only tasks connected to this phase (id or name)"),
                )
                .arg(
                    Arg::new("lane")
                        .long("lane")
                        .help("Only tasks in this lane (id or name)"),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Reconcile a resource CSV into the model")
                .arg(stream_arg())
                .arg(
                    Arg::new("csv")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Resource sheet"),
                )
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("export")
                .about("Write the resource CSV for the model")
                .arg(stream_arg())
                .arg(
                    Arg::new("out-dir")
                        .long("out-dir")
                        .value_parser(value_parser!(PathBuf))
                        .help("Target directory (default from config, else .)"),
                ),
        )
        .subcommand(
            Command::new("sync")
                .about("Rebuild the SBP's CJM lane from the CJM actions")
                .arg(stream_arg())
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("new-id")
                .about("Mint a fresh id")
                .arg(Arg::new("kind").required(true).help("cjm, sbp, outcome or em"))
                .arg(Arg::new("type").required(true).help("Entity type, e.g. task")),
        )
}

fn path<'a>(args: &'a ArgMatches, name: &str) -> anyhow::Result<&'a Path> {
    args.get_one::<PathBuf>(name)
        .map(PathBuf::as_path)
        .with_context(|| format!("missing <{name}>"))
}

fn string<'a>(args: &'a ArgMatches, name: &str) -> anyhow::Result<&'a str> {
    args.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing <{name}>"))
}

/// Config file values with command line overrides applied
fn load_config(matches: &ArgMatches) -> anyhow::Result<CapmapConfig> {
    let cwd = std::env::current_dir().context("failed to read working directory")?;
    let explicit = matches.get_one::<PathBuf>("config").map(PathBuf::as_path);
    let mut config = CapmapConfig::load(explicit, &cwd)?;
    if let Some(format) = matches.get_one::<String>("log-format") {
        let format: LogFormat = format.parse().map_err(anyhow::Error::msg)?;
        config = config.with_log_format(format);
    }
    Ok(config)
}

fn run(matches: &ArgMatches, config: &CapmapConfig) -> anyhow::Result<CommandOutput> {
    match matches.subcommand() {
        Some(("check", args)) => commands::check_stream(
            path(args, "stream")?,
            args.get_flag("internal"),
            args.get_flag("json"),
        ),
        Some(("chain", args)) => {
            commands::chain(path(args, "stream")?, string(args, "kpi")?, args.get_flag("json"))
        }
        Some(("scope", args)) => {
            let scope = ScopeArgs {
                csf: args.get_flag("csf"),
                phase: args.get_one::<String>("phase").map(String::as_str),
                lane: args.get_one::<String>("lane").map(String::as_str),
            };
            commands::scope(path(args, "stream")?, &scope)
        }
        Some(("import", args)) => commands::import(
            path(args, "stream")?,
            path(args, "csv")?,
            args.get_one::<PathBuf>("output").map(PathBuf::as_path),
        ),
        Some(("export", args)) => {
            let config = match args.get_one::<PathBuf>("out-dir") {
                Some(dir) => config.clone().with_out_dir(dir),
                None => config.clone(),
            };
            commands::export(path(args, "stream")?, &config.export.out_dir, &chrono::Local::now())
        }
        Some(("sync", args)) => commands::sync(
            path(args, "stream")?,
            args.get_one::<PathBuf>("output").map(PathBuf::as_path),
        ),
        Some(("new-id", args)) => commands::new_id(string(args, "kind")?, string(args, "type")?),
        Some((other, _)) => anyhow::bail!("unknown command '{other}'"),
        None => anyhow::bail!("no command given"),
    }
}

/// The one line printed to stderr for a failed command
fn error_line(err: &anyhow::Error) -> String {
    format!("error: {err:#}")
}

fn main() {
    let matches = cli().get_matches();
    let result = load_config(&matches).and_then(|config| {
        logging::init(&config.log);
        run(&matches, &config)
    });

    let code = match result {
        Ok(output) => {
            print!("{}", output.text);
            i32::from(!output.success)
        }
        Err(err) => {
            eprintln!("{}", error_line(&err));
            1
        }
    };
    std::process::exit(code);
}
