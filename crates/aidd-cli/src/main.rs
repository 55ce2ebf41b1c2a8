//! `aidd-trace`: AIDD traceability checker and fixer

mod console;

use aidd_core::{
    run_check, ExitStatus, FixMode, FixSession, TraceConfig, TraceError, WriteMode,
};
use aidd_corpus::CorpusLayer;
use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use console::{render_check, render_fix_summary, ConsoleObserver, PromptOperator};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("aidd-trace")
        .version(env!("CARGO_PKG_VERSION"))
        .about("AIDD Traceability Checker & Fixer")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("repo-root")
                .long("repo-root")
                .global(true)
                .default_value(".")
                .value_parser(value_parser!(PathBuf))
                .help("Repository root; relative paths resolve against it"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log progress to stderr (RUST_LOG overrides)"),
        )
        .subcommand(
            Command::new("check")
                .about("Verify cross-document traceability")
                .arg(
                    Arg::new("dirs")
                        .long("dirs")
                        .required(true)
                        .num_args(1..)
                        .value_parser(value_parser!(PathBuf))
                        .help("Directories or files to scan"),
                )
                .arg(
                    Arg::new("report-out")
                        .long("report-out")
                        .value_parser(value_parser!(PathBuf))
                        .help("Write the JSON report to this file"),
                )
                .arg(
                    Arg::new("warn-orphan")
                        .long("warn-orphan")
                        .action(ArgAction::SetTrue)
                        .help("List identifiers nothing refers to"),
                ),
        )
        .subcommand(
            Command::new("fix")
                .about("Resolve pending derived_from fields")
                .arg(
                    Arg::new("dirs")
                        .long("dirs")
                        .required(true)
                        .num_args(1..)
                        .value_parser(value_parser!(PathBuf))
                        .help("Directories or files to build the identifier registry from"),
                )
                .arg(
                    Arg::new("target")
                        .long("target")
                        .required(true)
                        .num_args(1..)
                        .value_parser(value_parser!(PathBuf))
                        .help("Directories or files to fix"),
                )
                .arg(
                    Arg::new("set-derived-from")
                        .long("set-derived-from")
                        .value_name("ID")
                        .help("Set every pending field to ID without prompting"),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Show what would change without writing files"),
                )
                .arg(
                    Arg::new("show-all-ids")
                        .long("show-all-ids")
                        .action(ArgAction::SetTrue)
                        .help("Offer identifiers outside the preferred prefix too"),
                ),
        )
}

fn init_tracing(verbose: bool) {
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn paths(args: &ArgMatches, name: &str) -> Vec<PathBuf> {
    args.get_many::<PathBuf>(name)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<TraceConfig> {
    let repo_root = matches
        .get_one::<PathBuf>("repo-root")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));
    let repo_root = std::fs::canonicalize(&repo_root)
        .with_context(|| format!("repository root {} not found", repo_root.display()))?;
    Ok(TraceConfig::load(repo_root)?)
}

fn cmd_check(config: &TraceConfig, args: &ArgMatches) -> anyhow::Result<ExitStatus> {
    let layer = CorpusLayer::new(config.repo_root());
    let report = run_check(&layer, &paths(args, "dirs"))?;

    print!(
        "{}",
        render_check(&report, args.get_flag("warn-orphan"), config.orphan_limit)
    );

    if let Some(out) = args.get_one::<PathBuf>("report-out") {
        report.write_to(out)?;
        println!();
        println!("  Report: {}", out.display());
    }

    Ok(report.status())
}

fn cmd_fix(config: TraceConfig, args: &ArgMatches) -> anyhow::Result<ExitStatus> {
    let mode = match args.get_one::<String>("set-derived-from") {
        Some(raw) => FixMode::automatic(raw)?,
        None => FixMode::Interactive,
    };
    let write_mode = WriteMode::from_dry_run(args.get_flag("dry-run"));
    let config = if args.get_flag("show-all-ids") {
        config.with_show_all_ids(true)
    } else {
        config
    };

    let layer = CorpusLayer::new(config.repo_root());
    let mut session = FixSession::prepare(
        &layer,
        &config,
        &paths(args, "dirs"),
        &paths(args, "target"),
        mode,
        write_mode,
    )?;

    if session.queue().is_empty() {
        println!("TRACEABILITY FIX: Nothing to fix, no pending derived_from found.");
        return Ok(ExitStatus::Pass);
    }

    println!("Found {} pending derived_from field(s).", session.queue().len());
    if !write_mode.persists() {
        println!("  [DRY-RUN mode: files will not be modified]");
    }
    println!();

    let stdin = std::io::stdin();
    let mut operator = PromptOperator::new(
        stdin.lock(),
        std::io::stdout(),
        session.registry().clone(),
        config.abort_token.clone(),
    );
    let mut observer = ConsoleObserver::new(std::io::stdout(), write_mode);
    let summary = session.run(&mut operator, &mut observer);

    print!("{}", render_fix_summary(&summary));
    Ok(summary.exit_status())
}

fn run(matches: &ArgMatches) -> anyhow::Result<ExitStatus> {
    let config = load_config(matches)?;
    tracing::debug!(repo_root = %config.repo_root().display(), "configuration resolved");

    match matches.subcommand() {
        Some(("check", args)) => cmd_check(&config, args),
        Some(("fix", args)) => cmd_fix(config, args),
        _ => Ok(ExitStatus::Usage),
    }
}

fn main() {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    let status = match run(&matches) {
        Ok(status) => status,
        Err(err) => {
            eprintln!("TRACEABILITY: error: {err:#}");
            err.downcast_ref::<TraceError>()
                .map_or(ExitStatus::Usage, ExitStatus::from)
        }
    };

    std::process::exit(status.code());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn fix_requires_target() {
        let result = cli().try_get_matches_from(["aidd-trace", "fix", "--dirs", "docs"]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let matches = cli()
            .try_get_matches_from([
                "aidd-trace", "check", "--dirs", "a", "b", "--repo-root", "/repo", "--verbose",
            ])
            .unwrap();
        assert!(matches.get_flag("verbose"));
        assert_eq!(
            matches.get_one::<PathBuf>("repo-root"),
            Some(&PathBuf::from("/repo"))
        );
        let (_, args) = matches.subcommand().unwrap();
        assert_eq!(paths(args, "dirs"), [PathBuf::from("a"), PathBuf::from("b")]);
    }
}
