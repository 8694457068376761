///
/// This module implements the CLI interface for draft-issues: command parsing, argument
/// validation and the async entrypoint used by both `main()` and integration tests.
///
/// All parsing and pipeline logic lives in the [`draft-issues-core`] crate; this module is
/// strictly CLI glue: it resolves configuration, builds the `gh` tracker and prints results.
///
/// ## How To Use
/// - For command-line users: use the installed `draft-issues` binary with `--help`.
/// - For programmatic/integration use: call [`run`] (or [`run_with_output`]) with a
///   constructed [`Cli`].
///
/// [`draft-issues-core`]: ../../draft-issues-core/
use crate::gh::GhCli;
use crate::load_config::{load_config, resolve_config, CliConfig, ConfigOverrides};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use draft_issues_core::draft::load_draft;
use draft_issues_core::publish::{preflight, publish, write_dry_run_banner};
use draft_issues_core::selection::Selection;
use std::io::Write;
use std::path::PathBuf;

/// CLI for draft-issues: create GitHub issues from a markdown draft.
#[derive(Parser)]
#[clap(
    name = "draft-issues",
    version,
    about = "Create GitHub issues from a markdown draft (ISSUES_DRAFT.md) using the GitHub CLI"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the issues described in the draft file
    Create(CreateArgs),
    /// Parse the draft file and print its issues as JSON, without contacting GitHub
    Parse(DraftArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct DraftArgs {
    /// Path to the draft file [default: ISSUES_DRAFT.md]
    #[clap(long)]
    pub draft: Option<PathBuf>,
    /// Path to an optional YAML config file
    #[clap(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    #[clap(flatten)]
    pub draft: DraftArgs,
    /// Target repository as OWNER/NAME (falls back to GH_REPO, then the config file)
    #[clap(long)]
    pub repo: Option<String>,
    /// Show what would be created without actually creating issues
    #[clap(long)]
    pub dry_run: bool,
    /// Start from issue N (1-indexed)
    #[clap(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub start: u64,
    /// End at issue N (1-indexed, inclusive)
    #[clap(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub end: Option<u64>,
    /// Write labels into the issue body instead of attaching them
    #[clap(long)]
    pub labels_in_body: bool,
    /// Milliseconds to wait between issues [default: 1000]
    #[clap(long)]
    pub delay_ms: Option<u64>,
    /// GitHub CLI executable to run
    #[clap(long = "gh")]
    pub gh_program: Option<PathBuf>,
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    let mut stdout = std::io::stdout();
    run_with_output(cli, &mut stdout).await
}

/// Same as [`run`], writing user-facing output to `out`.
pub async fn run_with_output<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Create(args) => create(args, out).await,
        Commands::Parse(args) => parse(args, out),
    }
}

fn resolve(draft: &DraftArgs, overrides: ConfigOverrides) -> Result<CliConfig> {
    let file = draft.config.as_ref().map(|p| load_config(p)).transpose()?;
    Ok(resolve_config(file, &overrides))
}

async fn create<W: Write>(args: CreateArgs, out: &mut W) -> Result<()> {
    let config = resolve(
        &args.draft,
        ConfigOverrides {
            repo: args.repo.clone(),
            draft_file: args.draft.draft.clone(),
            delay_ms: args.delay_ms,
            gh_program: args.gh_program.clone(),
            labels_in_body: args.labels_in_body,
            dry_run: args.dry_run,
        },
    )?;
    tracing::info!(command = "create", "Starting issue creation");

    let tracker = GhCli::new(config.gh_program.clone(), config.repo.clone());
    if config.publish.dry_run {
        write_dry_run_banner(out)?;
    }
    preflight(&tracker, config.publish.dry_run, out).await?;

    writeln!(
        out,
        "Creating issues for {} from {}",
        config.repo.as_deref().unwrap_or("the current repository"),
        config.draft_file.display()
    )?;
    writeln!(out)?;

    let records = load_draft(&config.draft_file, &config.default_labels)
        .context("Error parsing draft file")?;
    writeln!(out, "Found {} issues in draft file", records.len())?;
    writeln!(out)?;

    let selection = Selection::new(args.start as usize, args.end.map(|e| e as usize));
    let report = publish(&records, selection, &config.publish, &tracker, out).await?;

    if report.is_success() {
        tracing::info!(command = "create", created = report.created(), "Issue creation complete");
        Ok(())
    } else {
        tracing::error!(command = "create", failed = report.failed(), "Issue creation had failures");
        anyhow::bail!(
            "{} of {} selected issues failed",
            report.failed(),
            report.outcomes.len()
        )
    }
}

fn parse<W: Write>(args: DraftArgs, out: &mut W) -> Result<()> {
    let config = resolve(
        &args,
        ConfigOverrides {
            draft_file: args.draft.clone(),
            ..ConfigOverrides::default()
        },
    )?;
    let records = load_draft(&config.draft_file, &config.default_labels)
        .context("Error parsing draft file")?;
    tracing::info!(command = "parse", issues = records.len(), "Draft parsed");
    serde_json::to_writer_pretty(&mut *out, &records)?;
    writeln!(out)?;
    Ok(())
}
