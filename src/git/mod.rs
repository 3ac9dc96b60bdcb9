//! Version-control backend abstraction
//!
//! The release workflow only talks to git through the [VersionControl]
//! trait, so the state machine can be driven against a real repository or an
//! in-memory fake.
//!
//! - [repository::Git2Backend]: real implementation using the `git2` crate
//! - [mock::MockBackend]: recorded fake for tests
//!
//! ```rust
//! # use bump::git::VersionControl;
//! # fn example<B: VersionControl>(backend: &B) -> bump::Result<()> {
//! if backend.is_repository() && !backend.tag_exists("v1.0.0") {
//!     backend.create_tag("v1.0.0", "Release v1.0.0")?;
//!     backend.push_tag("v1.0.0")?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::{BackendCall, MockBackend};
pub use repository::Git2Backend;

use crate::error::Result;

/// Commits listed when there is no previous tag to diff against
pub const DEFAULT_LOG_LIMIT: usize = 10;

/// Branch assumed when the default branch cannot be detected
pub const FALLBACK_DEFAULT_BRANCH: &str = "main";

/// Capabilities the release workflow needs from version control.
///
/// ## Dry run
///
/// Mutating operations (`create_tag`, `push_tag`, `create_branch`,
/// `merge_branch`, `push_branch`) must honor dry-run mode: log the intended
/// action and return `Ok(())` without side effects.
///
/// ## Errors
///
/// Failures are reported as [crate::error::BumpError::Backend] naming the
/// operation. Nothing is retried.
pub trait VersionControl {
    /// Whether the working directory belongs to a repository
    fn is_repository(&self) -> bool;

    /// Whether there are no staged, unstaged or untracked changes
    fn is_working_tree_clean(&self) -> Result<bool>;

    /// Most recent tag reachable from HEAD
    ///
    /// # Returns
    /// * `Ok(String)` - Tag name, e.g. "v1.4.2"
    /// * `Err` - "no tags found" when nothing is tagged
    fn latest_tag(&self) -> Result<String>;

    /// Whether a tag with this exact name exists locally
    fn tag_exists(&self, tag: &str) -> bool;

    /// All tags as `"{name} {creation date}"`, newest first
    fn all_tags(&self) -> Result<Vec<String>>;

    /// One-line summaries of commits after `tag`, newest first.
    ///
    /// An empty tag or `v0.0.0` lists the last `limit` commits instead
    /// (10 when `limit` is `None`).
    fn commits_since(&self, tag: &str, limit: Option<usize>) -> Result<Vec<String>>;

    /// Create an annotated tag on HEAD
    fn create_tag(&self, tag: &str, message: &str) -> Result<()>;

    /// Publish a tag to the configured remote
    fn push_tag(&self, tag: &str) -> Result<()>;

    /// The repository's primary branch; best effort, falls back to "main"
    fn default_branch(&self) -> String;

    /// Name of the checked-out branch
    fn current_branch(&self) -> Result<String>;

    /// Whether a local branch with this name exists
    fn branch_exists(&self, name: &str) -> bool;

    /// Create local branch `name` pointing at `from`
    fn create_branch(&self, name: &str, from: &str) -> Result<()>;

    /// Merge `source` into the local branch `target`
    fn merge_branch(&self, source: &str, target: &str) -> Result<()>;

    /// Publish a local branch to the configured remote
    fn push_branch(&self, name: &str) -> Result<()>;
}
