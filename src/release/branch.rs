//! Release branch handling after the tag is published.
//!
//! Nothing here can undo the tag: failures become a warning and a
//! [BranchOutcome::Failed].

use crate::domain::{branch_name_for_tag, validate_branch_name, BranchMode};
use crate::error::Result;
use crate::git::VersionControl;
use crate::release::ReleaseOrchestrator;
use crate::ui::formatter::{display_status, display_success, display_warning};
use crate::ui::Prompter;
use crate::warning::ReleaseWarning;

/// Branch operations that actually ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchReport {
    pub source: String,
    pub target: String,
    pub created: bool,
    pub merged: bool,
    pub pushed: bool,
}

impl BranchReport {
    fn new(source: String, target: String) -> Self {
        BranchReport {
            source,
            target,
            created: false,
            merged: false,
            pushed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchOutcome {
    /// Mode or operator said no branch work
    Skipped,
    Completed(BranchReport),
    Failed(String),
}

impl<B: VersionControl, P: Prompter> ReleaseOrchestrator<'_, B, P> {
    pub(super) fn handle_branch(&self, mode: BranchMode, tag: &str) -> BranchOutcome {
        let result = match mode {
            BranchMode::Skip => {
                display_status("Skipping branch creation (--nobranch flag set)");
                return BranchOutcome::Skipped;
            }
            BranchMode::Disabled => return BranchOutcome::Skipped,
            BranchMode::Explicit => self.branch_from_flags(tag),
            BranchMode::Interactive => self.branch_with_prompts(tag),
        };

        result.unwrap_or_else(|e| {
            display_warning(&ReleaseWarning::BranchOperationFailed {
                reason: e.to_string(),
            });
            BranchOutcome::Failed(e.to_string())
        })
    }

    fn branch_from_flags(&self, tag: &str) -> Result<BranchOutcome> {
        let source = match &self.config.source_branch {
            Some(source) => source.clone(),
            None => self.backend.default_branch(),
        };
        let target = self
            .config
            .branch_name
            .clone()
            .unwrap_or_else(|| branch_name_for_tag(tag));
        validate_branch_name(&source)?;
        validate_branch_name(&target)?;

        display_status(&format!("Creating branch {} from {}...", target, source));
        let mut report = BranchReport::new(source, target);

        if self.backend.branch_exists(&report.target) {
            display_warning(&ReleaseWarning::BranchExists {
                branch: report.target.clone(),
            });
            if self.config.auto_merge {
                display_status(&format!(
                    "Auto-merging {} into {}...",
                    report.source, report.target
                ));
                self.merge(&mut report)?;
            } else {
                display_status("Skipping merge (use --auto-merge to merge automatically)");
            }
        } else {
            self.create(&mut report)?;
        }

        if self.config.auto_push {
            display_status(&format!(
                "Pushing branch {} to {}...",
                report.target, self.config.remote
            ));
            self.push(&mut report)?;
        } else {
            display_status("Branch not pushed (use --auto-push to push automatically)");
        }

        Ok(BranchOutcome::Completed(report))
    }

    fn branch_with_prompts(&self, tag: &str) -> Result<BranchOutcome> {
        if !self
            .prompter
            .confirm("Do you want to create a branch for this tag?", false)?
        {
            return Ok(BranchOutcome::Skipped);
        }

        let source = self
            .prompter
            .input("Source branch", &self.backend.default_branch())?;
        let target = self
            .prompter
            .input("Target branch name", &branch_name_for_tag(tag))?;
        validate_branch_name(&source)?;
        validate_branch_name(&target)?;
        let mut report = BranchReport::new(source, target);

        if self.backend.branch_exists(&report.target) {
            display_warning(&ReleaseWarning::BranchExists {
                branch: report.target.clone(),
            });
            let question = format!(
                "Do you want to merge {} into {}?",
                report.source, report.target
            );
            if self.prompter.confirm(&question, false)? {
                self.merge(&mut report)?;
            }
        } else {
            self.create(&mut report)?;
        }

        let question = format!(
            "Do you want to push branch {} to {}?",
            report.target, self.config.remote
        );
        if self.prompter.confirm(&question, false)? {
            self.push(&mut report)?;
        }

        Ok(BranchOutcome::Completed(report))
    }

    fn create(&self, report: &mut BranchReport) -> Result<()> {
        self.backend.create_branch(&report.target, &report.source)?;
        report.created = true;
        display_success(&format!(
            "Successfully created branch {} from {}",
            report.target, report.source
        ));
        Ok(())
    }

    fn merge(&self, report: &mut BranchReport) -> Result<()> {
        self.backend.merge_branch(&report.source, &report.target)?;
        report.merged = true;
        display_success(&format!(
            "Successfully merged {} into {}",
            report.source, report.target
        ));
        Ok(())
    }

    fn push(&self, report: &mut BranchReport) -> Result<()> {
        self.backend.push_branch(&report.target)?;
        report.pushed = true;
        display_success(&format!("Successfully pushed branch {}", report.target));
        Ok(())
    }
}
