use crate::error::{BumpError, Result};
use crate::git::{VersionControl, DEFAULT_LOG_LIMIT};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// A backend call as seen by [MockBackend], in the order it was made
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    IsRepository,
    IsWorkingTreeClean,
    LatestTag,
    TagExists(String),
    AllTags,
    CommitsSince(String),
    CreateTag { tag: String, message: String },
    PushTag(String),
    DefaultBranch,
    CurrentBranch,
    BranchExists(String),
    CreateBranch { name: String, from: String },
    MergeBranch { source: String, target: String },
    PushBranch(String),
}

impl BackendCall {
    /// Whether this call changes the repository or the remote
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            BackendCall::CreateTag { .. }
                | BackendCall::PushTag(_)
                | BackendCall::CreateBranch { .. }
                | BackendCall::MergeBranch { .. }
                | BackendCall::PushBranch(_)
        )
    }
}

/// Mock backend for testing without actual git operations
///
/// Holds tags and branches in memory, records every call, and can be told to
/// fail selected operations.
pub struct MockBackend {
    repository: bool,
    clean: bool,
    latest_tag: Option<String>,
    commits: Option<Vec<String>>,
    default_branch: String,
    current_branch: String,
    failing: HashSet<&'static str>,
    tags: Mutex<Vec<String>>,
    branches: Mutex<Vec<String>>,
    calls: Mutex<Vec<BackendCall>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockBackend {
    /// A clean, untagged repository whose default branch is "main"
    pub fn new() -> Self {
        MockBackend {
            repository: true,
            clean: true,
            latest_tag: None,
            commits: Some(Vec::new()),
            default_branch: "main".to_string(),
            current_branch: "main".to_string(),
            failing: HashSet::new(),
            tags: Mutex::new(Vec::new()),
            branches: Mutex::new(vec!["main".to_string()]),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Pretend the working directory is not under version control
    pub fn not_a_repository(mut self) -> Self {
        self.repository = false;
        self
    }

    pub fn dirty(mut self) -> Self {
        self.clean = false;
        self
    }

    /// Add a tag and make it the latest one
    pub fn with_latest_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        lock(&self.tags).push(tag.clone());
        self.latest_tag = Some(tag);
        self
    }

    /// Add a tag without changing the latest one
    pub fn with_tag(self, tag: impl Into<String>) -> Self {
        lock(&self.tags).push(tag.into());
        self
    }

    pub fn with_branch(self, name: impl Into<String>) -> Self {
        lock(&self.branches).push(name.into());
        self
    }

    pub fn with_default_branch(mut self, name: impl Into<String>) -> Self {
        self.default_branch = name.into();
        self
    }

    /// One-line summaries returned by `commits_since`, newest first
    pub fn with_commits<I, S>(mut self, commits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commits = Some(commits.into_iter().map(Into::into).collect());
        self
    }

    /// Make `commits_since` fail
    pub fn without_commit_history(mut self) -> Self {
        self.commits = None;
        self
    }

    /// Make a mutating operation fail: "create_tag", "push_tag",
    /// "create_branch", "merge_branch" or "push_branch"
    pub fn fail_on(mut self, operation: &'static str) -> Self {
        self.failing.insert(operation);
        self
    }

    /// Every call made so far
    pub fn calls(&self) -> Vec<BackendCall> {
        lock(&self.calls).clone()
    }

    /// Only the calls that would have changed something
    pub fn mutations(&self) -> Vec<BackendCall> {
        self.calls()
            .into_iter()
            .filter(BackendCall::is_mutation)
            .collect()
    }

    pub fn tags(&self) -> Vec<String> {
        lock(&self.tags).clone()
    }

    pub fn branches(&self) -> Vec<String> {
        lock(&self.branches).clone()
    }

    fn record(&self, call: BackendCall) {
        lock(&self.calls).push(call);
    }

    fn check_failure(&self, operation: &'static str) -> Result<()> {
        if self.failing.contains(operation) {
            Err(BumpError::backend(operation, "simulated failure"))
        } else {
            Ok(())
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionControl for MockBackend {
    fn is_repository(&self) -> bool {
        self.record(BackendCall::IsRepository);
        self.repository
    }

    fn is_working_tree_clean(&self) -> Result<bool> {
        self.record(BackendCall::IsWorkingTreeClean);
        Ok(self.clean)
    }

    fn latest_tag(&self) -> Result<String> {
        self.record(BackendCall::LatestTag);
        self.latest_tag
            .clone()
            .ok_or_else(|| BumpError::backend("find latest tag", "no tags found"))
    }

    fn tag_exists(&self, tag: &str) -> bool {
        self.record(BackendCall::TagExists(tag.to_string()));
        lock(&self.tags).iter().any(|t| t == tag)
    }

    fn all_tags(&self) -> Result<Vec<String>> {
        self.record(BackendCall::AllTags);
        Ok(lock(&self.tags)
            .iter()
            .rev()
            .map(|tag| format!("{} 2024-01-01 00:00:00 +0000", tag))
            .collect())
    }

    fn commits_since(&self, tag: &str, limit: Option<usize>) -> Result<Vec<String>> {
        self.record(BackendCall::CommitsSince(tag.to_string()));
        let commits = self
            .commits
            .clone()
            .ok_or_else(|| BumpError::backend("list commits", "simulated failure"))?;

        if tag.is_empty() || tag == crate::domain::ZERO_TAG {
            Ok(commits
                .into_iter()
                .take(limit.unwrap_or(DEFAULT_LOG_LIMIT))
                .collect())
        } else {
            Ok(commits.into_iter().take(limit.unwrap_or(usize::MAX)).collect())
        }
    }

    fn create_tag(&self, tag: &str, message: &str) -> Result<()> {
        self.record(BackendCall::CreateTag {
            tag: tag.to_string(),
            message: message.to_string(),
        });
        self.check_failure("create_tag")?;
        lock(&self.tags).push(tag.to_string());
        Ok(())
    }

    fn push_tag(&self, tag: &str) -> Result<()> {
        self.record(BackendCall::PushTag(tag.to_string()));
        self.check_failure("push_tag")
    }

    fn default_branch(&self) -> String {
        self.record(BackendCall::DefaultBranch);
        self.default_branch.clone()
    }

    fn current_branch(&self) -> Result<String> {
        self.record(BackendCall::CurrentBranch);
        Ok(self.current_branch.clone())
    }

    fn branch_exists(&self, name: &str) -> bool {
        self.record(BackendCall::BranchExists(name.to_string()));
        lock(&self.branches).iter().any(|b| b == name)
    }

    fn create_branch(&self, name: &str, from: &str) -> Result<()> {
        self.record(BackendCall::CreateBranch {
            name: name.to_string(),
            from: from.to_string(),
        });
        self.check_failure("create_branch")?;
        lock(&self.branches).push(name.to_string());
        Ok(())
    }

    fn merge_branch(&self, source: &str, target: &str) -> Result<()> {
        self.record(BackendCall::MergeBranch {
            source: source.to_string(),
            target: target.to_string(),
        });
        self.check_failure("merge_branch")
    }

    fn push_branch(&self, name: &str) -> Result<()> {
        self.record(BackendCall::PushBranch(name.to_string()));
        self.check_failure("push_branch")
    }
}
