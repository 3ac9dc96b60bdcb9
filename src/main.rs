use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bump::build_info;
use bump::config::{self, CliOverrides, Config};
use bump::git::Git2Backend;
use bump::release::{ReleaseOrchestrator, ReleaseReport};
use bump::ui::{self, InquirePrompter};

/// Environment variable holding an EnvFilter directive that overrides `--verbose`
const LOG_ENV: &str = "BUMP_LOG";

#[derive(Parser)]
#[command(
    name = "bump",
    about = "Compute the next semantic version from the latest git tag, then tag and push it"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Bump kind for a quick release (patch, minor, major); omit for interactive mode
    bump: Option<String>,

    #[arg(long, global = true, help = "Preview what would happen without making changes")]
    dry_run: bool,

    #[arg(short, long, global = true, help = "Print progress details and debug logs")]
    verbose: bool,

    #[arg(long = "nobranch", global = true, help = "Skip branch handling after tagging")]
    no_branch: bool,

    #[arg(long, global = true, help = "Create or update the release branch without asking")]
    create_branch: bool,

    #[arg(long, global = true, help = "Branch the release branch is created from")]
    source_branch: Option<String>,

    #[arg(long, global = true, help = "Release branch name (default: tag without 'v')")]
    branch_name: Option<String>,

    #[arg(long, global = true, help = "Merge the source branch into an existing release branch")]
    auto_merge: bool,

    #[arg(long, global = true, help = "Push the release branch to the remote")]
    auto_push: bool,

    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Print version information
    Version {
        #[arg(long, help = "Print build metadata", conflicts_with = "repo")]
        build_info: bool,

        #[arg(long, help = "Print the repository's current version")]
        repo: bool,
    },
    /// Release without prompts
    Quick {
        /// patch, minor or major
        kind: String,
    },
    /// Release with prompts, prerequisite checks and branch handling
    Interactive,
    /// Show the current version and repository state
    Status,
    /// List tags, newest first
    Tags,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            dry_run: self.dry_run,
            verbose: self.verbose,
            no_branch: self.no_branch,
            create_branch: self.create_branch,
            source_branch: self.source_branch.clone(),
            branch_name: self.branch_name.clone(),
            auto_merge: self.auto_merge,
            auto_push: self.auto_push,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "bump=debug" } else { "bump=warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    if let Some(Command::Version {
        build_info: false,
        repo: false,
    }) = &cli.command
    {
        println!("bump {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = config::load_config(cli.config.as_deref())
        .context("Error loading config")?
        .apply(cli.overrides());
    tracing::debug!(?config, "effective configuration");

    if config.dry_run {
        ui::display_status("Dry run: no tags or branches will be created or pushed");
    }

    match cli.command {
        Some(Command::Version {
            build_info: true, ..
        }) => {
            ui::display_build_info(&build_info::get());
            Ok(())
        }
        Some(Command::Version { .. }) => print_repo_version(&config),
        Some(Command::Quick { kind }) => quick(&config, &kind),
        Some(Command::Interactive) => interactive(&config),
        Some(Command::Status) => status(&config),
        Some(Command::Tags) => tags(&config),
        None => match cli.bump {
            Some(kind) => quick(&config, &kind),
            None => interactive(&config),
        },
    }
}

fn quick(config: &Config, kind: &str) -> Result<()> {
    let backend = Git2Backend::discover(".", config);
    let orchestrator = ReleaseOrchestrator::new(config, &backend, &InquirePrompter);

    let report = orchestrator.run_quick(kind)?;
    summarize(&report)
}

fn interactive(config: &Config) -> Result<()> {
    let backend = Git2Backend::discover(".", config);
    let orchestrator = ReleaseOrchestrator::new(config, &backend, &InquirePrompter);

    let report = orchestrator.run_interactive()?;
    summarize(&report)
}

fn status(config: &Config) -> Result<()> {
    let backend = Git2Backend::discover(".", config);
    let orchestrator = ReleaseOrchestrator::new(config, &backend, &InquirePrompter);

    ui::display_repository_status(&orchestrator.status()?);
    Ok(())
}

fn tags(config: &Config) -> Result<()> {
    let backend = Git2Backend::discover(".", config);
    let orchestrator = ReleaseOrchestrator::new(config, &backend, &InquirePrompter);

    ui::display_tags(&orchestrator.list_tags()?);
    Ok(())
}

fn print_repo_version(config: &Config) -> Result<()> {
    let backend = Git2Backend::discover(".", config);
    let orchestrator = ReleaseOrchestrator::new(config, &backend, &InquirePrompter);

    let (_, current) = orchestrator.resolve_current_version();
    println!("{}", current);
    Ok(())
}

/// A cancelled release exits non-zero like any other unfinished one
fn summarize(report: &ReleaseReport) -> Result<()> {
    if report.is_cancelled() {
        bail!("release cancelled");
    }

    if let Some(tag) = &report.tag {
        println!("\nReleased {} (previous version {})", tag, report.previous);
    }
    Ok(())
}
