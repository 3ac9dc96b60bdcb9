//! Per-invocation release state.

use crate::checks::CheckReport;
use crate::config::Config;
use crate::domain::{BranchMode, Version};
use crate::release::branch::BranchOutcome;

/// Where a release attempt currently stands.
///
/// States only move forward; `Done`, `Cancelled` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReleaseState {
    Idle,
    PreflightChecked,
    VersionSelected,
    ChecksRun,
    TagCreated,
    BranchHandled,
    Done,
    Cancelled,
    Failed,
}

impl ReleaseState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReleaseState::Done | ReleaseState::Cancelled | ReleaseState::Failed
        )
    }
}

/// Transient state of one release attempt. Lives for a single command.
#[derive(Debug, Clone)]
pub struct ReleaseContext {
    pub current: Version,
    pub previous_tag: Option<String>,
    pub candidate: Option<Version>,
    pub dry_run: bool,
    pub verbose: bool,
    pub branch_mode: BranchMode,
    pub checks: Option<CheckReport>,
    pub branch: Option<BranchOutcome>,
    state: ReleaseState,
}

impl ReleaseContext {
    pub fn new(config: &Config, branch_mode: BranchMode) -> Self {
        ReleaseContext {
            current: Version::zero(),
            previous_tag: None,
            candidate: None,
            dry_run: config.dry_run,
            verbose: config.verbose,
            branch_mode,
            checks: None,
            branch: None,
            state: ReleaseState::Idle,
        }
    }

    pub fn state(&self) -> ReleaseState {
        self.state
    }

    /// Move to `next`. Ignored once a terminal state is reached.
    pub fn advance(&mut self, next: ReleaseState) {
        if self.state.is_terminal() {
            tracing::debug!(state = ?self.state, ignored = ?next, "release already finished");
            return;
        }

        debug_assert!(next > self.state, "{:?} -> {:?}", self.state, next);
        tracing::debug!(from = ?self.state, to = ?next, "release state");
        self.state = next;
    }

    /// Record the chosen version and move to `VersionSelected`
    pub fn select(&mut self, candidate: Version) {
        self.candidate = Some(candidate);
        self.advance(ReleaseState::VersionSelected);
    }

    pub fn candidate_tag(&self) -> Option<String> {
        self.candidate.map(|v| v.to_string())
    }

    pub fn into_report(self) -> ReleaseReport {
        ReleaseReport {
            state: self.state,
            tag: self.candidate_tag(),
            previous: self.current,
            checks: self.checks,
            branch: self.branch,
        }
    }
}

/// What a finished release attempt did
#[derive(Debug, Clone)]
pub struct ReleaseReport {
    pub state: ReleaseState,
    /// The candidate tag; only published when `state` is `Done`
    pub tag: Option<String>,
    pub previous: Version,
    pub checks: Option<CheckReport>,
    pub branch: Option<BranchOutcome>,
}

impl ReleaseReport {
    pub fn is_done(&self) -> bool {
        self.state == ReleaseState::Done
    }

    pub fn is_cancelled(&self) -> bool {
        self.state == ReleaseState::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_moves_forward() {
        let mut ctx = ReleaseContext::new(&Config::default(), BranchMode::Disabled);
        assert_eq!(ctx.state(), ReleaseState::Idle);

        ctx.advance(ReleaseState::PreflightChecked);
        ctx.select(Version::new(1, 0, 0));
        assert_eq!(ctx.state(), ReleaseState::VersionSelected);
        assert_eq!(ctx.candidate_tag().as_deref(), Some("v1.0.0"));
    }

    #[test]
    fn test_terminal_state_is_sticky() {
        let mut ctx = ReleaseContext::new(&Config::default(), BranchMode::Disabled);
        ctx.advance(ReleaseState::Cancelled);
        ctx.advance(ReleaseState::Failed);
        assert_eq!(ctx.state(), ReleaseState::Cancelled);
        assert!(ctx.into_report().is_cancelled());
    }
}
