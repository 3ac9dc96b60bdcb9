//! Release workflow orchestration
//!
//! Sequences one release attempt against a [VersionControl] backend:
//! preflight, version selection, tag collision check, prerequisite checks,
//! tag creation and publication, then optional branch handling.
//!
//! Two entry points:
//! - [ReleaseOrchestrator::run_quick]: bump kind given up front, no prompts,
//!   no checks, no branch handling
//! - [ReleaseOrchestrator::run_interactive]: asks for everything, runs the
//!   prerequisite checks, handles the release branch

pub mod branch;
pub mod context;

pub use branch::{BranchOutcome, BranchReport};
pub use context::{ReleaseContext, ReleaseReport, ReleaseState};

use crate::checks::{CheckReport, Checker};
use crate::config::Config;
use crate::domain::{release_message, validate_tag_name, BranchMode, BumpKind, Version, ZERO_TAG};
use crate::error::{BumpError, Result};
use crate::git::VersionControl;
use crate::ui::formatter::{
    bump_choice_label, display_commit_preview, display_status, display_success,
    display_version_transition, display_warning,
};
use crate::ui::Prompter;
use crate::warning::ReleaseWarning;

/// Snapshot shown by the `status` command
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryStatus {
    pub current: Version,
    pub latest_tag: Option<String>,
    pub current_branch: Option<String>,
    pub default_branch: String,
    pub clean: bool,
    /// `None` when the history could not be read
    pub commits: Option<Vec<String>>,
}

/// Drives release attempts; borrows everything it needs for one invocation
pub struct ReleaseOrchestrator<'a, B: VersionControl, P: Prompter> {
    config: &'a Config,
    backend: &'a B,
    prompter: &'a P,
}

impl<'a, B: VersionControl, P: Prompter> ReleaseOrchestrator<'a, B, P> {
    pub fn new(config: &'a Config, backend: &'a B, prompter: &'a P) -> Self {
        ReleaseOrchestrator {
            config,
            backend,
            prompter,
        }
    }

    /// Latest tag and the version it names.
    ///
    /// The one place a parse failure is swallowed: no tag, or a tag that is
    /// not a version, resolves to `v0.0.0`.
    pub fn resolve_current_version(&self) -> (Option<String>, Version) {
        match self.backend.latest_tag() {
            Ok(tag) => {
                if tag != ZERO_TAG && Version::parse(&tag).is_err() {
                    display_warning(&ReleaseWarning::UnparsableTag { tag: tag.clone() });
                }
                let version = Version::from_str_or_zero(&tag);
                (Some(tag), version)
            }
            Err(e) => {
                tracing::debug!(error = %e, "no latest tag, starting from {}", ZERO_TAG);
                (None, Version::zero())
            }
        }
    }

    /// Fail with [BumpError::InvalidTagFormat] or [BumpError::TagAlreadyExists]
    /// unless `tag` is safe and unused. Validation happens before the backend
    /// is consulted.
    pub fn ensure_tag_available(&self, tag: &str) -> Result<()> {
        validate_tag_name(tag)?;

        if self.backend.tag_exists(tag) {
            return Err(BumpError::TagAlreadyExists(tag.to_string()));
        }

        Ok(())
    }

    /// Create the annotated tag, then push it
    pub fn publish_tag(&self, tag: &str, message: &str) -> Result<()> {
        validate_tag_name(tag)?;

        display_status(&format!("Creating tag {}...", tag));
        self.backend.create_tag(tag, message)?;

        display_status(&format!("Pushing tag {}...", tag));
        self.backend.push_tag(tag)?;

        display_success(&format!("Successfully created and pushed tag {}", tag));
        Ok(())
    }

    /// Release without prompts. `kind` is "patch", "minor" or "major" in any case.
    pub fn run_quick(&self, kind: &str) -> Result<ReleaseReport> {
        let mut ctx = ReleaseContext::new(self.config, BranchMode::Disabled);
        let result = self.quick(&mut ctx, kind);
        finish(ctx, result)
    }

    /// Release with prompts, prerequisite checks and branch handling
    pub fn run_interactive(&self) -> Result<ReleaseReport> {
        let mut ctx = ReleaseContext::new(self.config, BranchMode::resolve(self.config, true));
        let result = self.interactive(&mut ctx);
        finish(ctx, result)
    }

    /// Tags newest first
    pub fn list_tags(&self) -> Result<Vec<String>> {
        self.require_repository()?;
        self.backend.all_tags()
    }

    pub fn status(&self) -> Result<RepositoryStatus> {
        self.require_repository()?;

        let (latest_tag, current) = self.resolve_current_version();
        let clean = self.backend.is_working_tree_clean()?;
        let commits = self
            .backend
            .commits_since(history_base(latest_tag.as_deref(), &current), None)
            .map_err(|e| tracing::debug!(error = %e, "commit history unavailable"))
            .ok();

        Ok(RepositoryStatus {
            current,
            latest_tag,
            current_branch: self.backend.current_branch().ok(),
            default_branch: self.backend.default_branch(),
            clean,
            commits,
        })
    }

    fn require_repository(&self) -> Result<()> {
        if self.backend.is_repository() {
            Ok(())
        } else {
            Err(BumpError::NotARepository)
        }
    }

    fn preflight(&self, ctx: &mut ReleaseContext) -> Result<()> {
        self.require_repository()?;
        ctx.advance(ReleaseState::PreflightChecked);
        Ok(())
    }

    fn load_current(&self, ctx: &mut ReleaseContext) {
        let (tag, version) = self.resolve_current_version();
        ctx.previous_tag = tag;
        ctx.current = version;
    }

    fn quick(&self, ctx: &mut ReleaseContext, kind: &str) -> Result<()> {
        self.preflight(ctx)?;
        self.load_current(ctx);

        let kind: BumpKind = kind.parse()?;
        let candidate = ctx.current.bump(kind)?;
        ctx.select(candidate);

        let tag = candidate.to_string();
        self.ensure_tag_available(&tag)?;

        display_version_transition(kind, &ctx.current, &candidate);
        self.publish_tag(&tag, &release_message(&tag))?;
        ctx.advance(ReleaseState::TagCreated);

        ctx.advance(ReleaseState::Done);
        Ok(())
    }

    fn interactive(&self, ctx: &mut ReleaseContext) -> Result<()> {
        display_status("Interactive Release Mode");
        self.preflight(ctx)?;

        if !self.backend.is_working_tree_clean()? {
            display_warning(&ReleaseWarning::DirtyWorkingTree);
            if !self.prompter.confirm("Continue anyway?", false)? {
                return cancel(ctx);
            }
        }

        self.load_current(ctx);
        display_status(&format!("Current version: {}", ctx.current));
        self.show_commits(ctx);

        let kind = self.select_bump_kind(&ctx.current)?;
        let candidate = ctx.current.bump(kind)?;
        ctx.select(candidate);
        display_status(&format!("New version will be: {}", candidate));

        let tag = candidate.to_string();
        self.ensure_tag_available(&tag)?;

        ctx.checks = Some(self.run_checks());
        ctx.advance(ReleaseState::ChecksRun);

        let message = self
            .prompter
            .input("Release message", &release_message(&tag))?;
        if !self
            .prompter
            .confirm(&format!("Create and push tag {}?", tag), false)?
        {
            return cancel(ctx);
        }

        self.publish_tag(&tag, &message)?;
        ctx.advance(ReleaseState::TagCreated);

        ctx.branch = Some(self.handle_branch(ctx.branch_mode, &tag));
        ctx.advance(ReleaseState::BranchHandled);

        ctx.advance(ReleaseState::Done);
        Ok(())
    }

    /// Informational only: a failure here never stops the release
    fn show_commits(&self, ctx: &ReleaseContext) {
        let since = history_base(ctx.previous_tag.as_deref(), &ctx.current);
        match self.backend.commits_since(since, None) {
            Ok(commits) => display_commit_preview(&commits),
            Err(e) => display_warning(&ReleaseWarning::CommitsUnavailable {
                reason: e.to_string(),
            }),
        }
    }

    fn select_bump_kind(&self, current: &Version) -> Result<BumpKind> {
        let options: Vec<String> = BumpKind::ALL
            .iter()
            .map(|kind| bump_choice_label(*kind, current))
            .collect();

        let index = self.prompter.select("Select version type", &options)?;
        BumpKind::ALL
            .get(index)
            .copied()
            .ok_or_else(|| BumpError::PromptAborted(format!("no version type at index {}", index)))
    }

    fn run_checks(&self) -> CheckReport {
        display_status("Running pre-release checks...");
        let report = Checker::new(self.config).run_all();

        if report.all_passed() {
            display_success("All checks passed");
        } else {
            display_status(&format!(
                "{} of {} checks failed, continuing with release",
                report.failure_count(),
                report.results.len()
            ));
        }

        report
    }
}

/// Tag to list commits from. A missing, zero or unparsable tag lists the
/// most recent commits instead of a range.
fn history_base<'t>(latest_tag: Option<&'t str>, current: &Version) -> &'t str {
    match latest_tag {
        Some(tag) if !current.is_zero() => tag,
        _ => ZERO_TAG,
    }
}

fn cancel(ctx: &mut ReleaseContext) -> Result<()> {
    ctx.advance(ReleaseState::Cancelled);
    Ok(())
}

/// An operator "no" and a failed prompt both end as `Cancelled`; every other
/// error ends as `Failed` and is returned.
fn finish(mut ctx: ReleaseContext, result: Result<()>) -> Result<ReleaseReport> {
    match result {
        Ok(()) => Ok(ctx.into_report()),
        Err(BumpError::PromptAborted(reason)) => {
            tracing::debug!(reason = %reason, "prompt aborted");
            ctx.advance(ReleaseState::Cancelled);
            Ok(ctx.into_report())
        }
        Err(e) => {
            ctx.advance(ReleaseState::Failed);
            tracing::debug!(error = %e, "release failed");
            Err(e)
        }
    }
}
