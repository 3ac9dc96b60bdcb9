use crate::config::Config;
use crate::domain::{validate_branch_name, validate_tag_name, ZERO_TAG};
use crate::error::{BumpError, Result};
use crate::git::{VersionControl, DEFAULT_LOG_LIMIT, FALLBACK_DEFAULT_BRANCH};
use crate::ui::formatter::display_dry_run;
use chrono::{FixedOffset, Offset, TimeZone, Utc};
use git2::build::CheckoutBuilder;
use git2::{
    BranchType, Cred, CredentialType, DescribeFormatOptions, DescribeOptions, Oid, PushOptions,
    Reference, RemoteCallbacks, Repository as Git2Repo, Sort, StatusOptions, Time,
};
use std::path::{Path, PathBuf};

/// Give up on authentication after this many credential requests
const MAX_CREDENTIAL_ATTEMPTS: usize = 5;

/// [VersionControl] over a libgit2 repository
pub struct Git2Backend {
    repo: Option<Git2Repo>,
    remote: String,
    dry_run: bool,
}

impl Git2Backend {
    /// Discover the repository containing `path`.
    ///
    /// Never fails: outside a repository the backend reports
    /// `is_repository() == false` and every other operation errors.
    pub fn discover<P: AsRef<Path>>(path: P, config: &Config) -> Self {
        let repo = match Git2Repo::discover(path.as_ref()) {
            Ok(repo) => Some(repo),
            Err(e) => {
                tracing::debug!(path = %path.as_ref().display(), error = %e, "no repository found");
                None
            }
        };

        Git2Backend {
            repo,
            remote: config.remote.clone(),
            dry_run: config.dry_run,
        }
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo, config: &Config) -> Self {
        Git2Backend {
            repo: Some(repo),
            remote: config.remote.clone(),
            dry_run: config.dry_run,
        }
    }

    fn repo(&self) -> Result<&Git2Repo> {
        self.repo.as_ref().ok_or(BumpError::NotARepository)
    }

    fn push_refspec(&self, refspec: &str, operation: &str) -> Result<()> {
        let repo = self.repo()?;
        let mut remote = repo.find_remote(&self.remote).map_err(|_| {
            BumpError::backend(operation, format!("no remote named '{}' found", self.remote))
        })?;

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(remote_callbacks());

        tracing::debug!(remote = %self.remote, refspec, "pushing");
        remote
            .push(&[refspec], Some(&mut push_options))
            .map_err(|e| {
                let reason = match e.class() {
                    git2::ErrorClass::Net => format!("network error: {}", e.message()),
                    git2::ErrorClass::Reference => format!("reference error: {}", e.message()),
                    _ => e.message().to_string(),
                };
                BumpError::backend(operation, reason)
            })
    }
}

fn ssh_key_paths() -> Vec<PathBuf> {
    let Some(home) = dirs::home_dir() else {
        return Vec::new();
    };

    ["id_ed25519", "id_rsa", "id_ecdsa"]
        .iter()
        .map(|key| home.join(".ssh").join(key))
        .filter(|path| path.exists())
        .collect()
}

/// SSH agent first, then key files from ~/.ssh, then git credential helpers.
fn remote_callbacks() -> RemoteCallbacks<'static> {
    let mut callbacks = RemoteCallbacks::new();
    let mut attempts = 0;

    callbacks.credentials(move |url, username_from_url, allowed_types| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str("authentication failed"));
        }

        let username = username_from_url.unwrap_or("git");

        if allowed_types.contains(CredentialType::SSH_KEY) {
            if attempts == 1 {
                if let Ok(cred) = Cred::ssh_key_from_agent(username) {
                    return Ok(cred);
                }
            }
            if let Some(key) = ssh_key_paths().get(attempts.saturating_sub(2)) {
                return Cred::ssh_key(username, None, key, None);
            }
        }

        if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
            if let Ok(config) = git2::Config::open_default() {
                if let Ok(cred) = Cred::credential_helper(&config, url, username_from_url) {
                    return Ok(cred);
                }
            }
        }

        Cred::default()
    });

    // A rejected ref does not fail `push` by itself
    callbacks.push_update_reference(|refname, status| match status {
        Some(message) => Err(git2::Error::from_str(&format!(
            "remote rejected {}: {}",
            refname, message
        ))),
        None => Ok(()),
    });

    callbacks
}

/// Tagger date for annotated tags, commit date for lightweight ones
fn tag_time(reference: &Reference<'_>) -> Option<Time> {
    if let Ok(tag) = reference.peel_to_tag() {
        if let Some(tagger) = tag.tagger() {
            return Some(tagger.when());
        }
    }

    reference.peel_to_commit().ok().map(|commit| commit.time())
}

/// `2024-03-01 14:05:09 +0100`, the layout of git's `iso` date format
fn format_git_time(time: Time) -> String {
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60).unwrap_or(Utc.fix());
    match offset.timestamp_opt(time.seconds(), 0).single() {
        Some(date) => date.format("%Y-%m-%d %H:%M:%S %z").to_string(),
        None => time.seconds().to_string(),
    }
}

fn short_id(oid: Oid) -> String {
    let mut id = oid.to_string();
    id.truncate(7);
    id
}

impl VersionControl for Git2Backend {
    fn is_repository(&self) -> bool {
        self.repo.is_some()
    }

    fn is_working_tree_clean(&self) -> Result<bool> {
        let repo = self.repo()?;

        let mut options = StatusOptions::new();
        options.include_untracked(true).include_ignored(false);

        let statuses = repo
            .statuses(Some(&mut options))
            .map_err(|e| BumpError::backend("check git status", e))?;

        Ok(statuses.is_empty())
    }

    fn latest_tag(&self) -> Result<String> {
        let repo = self.repo()?;

        let mut describe_options = DescribeOptions::new();
        describe_options.describe_tags();

        let describe = repo
            .describe(&describe_options)
            .map_err(|_| BumpError::backend("find latest tag", "no tags found"))?;

        let mut format_options = DescribeFormatOptions::new();
        format_options.abbreviated_size(0);

        describe
            .format(Some(&format_options))
            .map_err(|e| BumpError::backend("find latest tag", e))
    }

    fn tag_exists(&self, tag: &str) -> bool {
        let Ok(repo) = self.repo() else {
            return false;
        };

        validate_tag_name(tag).is_ok() && repo.find_reference(&format!("refs/tags/{}", tag)).is_ok()
    }

    fn all_tags(&self) -> Result<Vec<String>> {
        let repo = self.repo()?;
        let names = repo
            .tag_names(None)
            .map_err(|e| BumpError::backend("list tags", e))?;

        let mut entries: Vec<(String, Time)> = Vec::new();
        for name in names.iter().flatten() {
            let Ok(reference) = repo.find_reference(&format!("refs/tags/{}", name)) else {
                continue;
            };
            if let Some(when) = tag_time(&reference) {
                entries.push((name.to_string(), when));
            }
        }

        entries.sort_by(|a, b| {
            b.1.seconds()
                .cmp(&a.1.seconds())
                .then_with(|| a.0.cmp(&b.0))
        });

        Ok(entries
            .into_iter()
            .map(|(name, when)| format!("{} {}", name, format_git_time(when)))
            .collect())
    }

    fn commits_since(&self, tag: &str, limit: Option<usize>) -> Result<Vec<String>> {
        let repo = self.repo()?;
        let operation = "list commits";
        let fail = |e: git2::Error| BumpError::backend(operation, e);

        let mut revwalk = repo.revwalk().map_err(fail)?;
        revwalk.set_sorting(Sort::TIME).map_err(fail)?;
        revwalk.push_head().map_err(fail)?;

        let limit = if tag.is_empty() || tag == ZERO_TAG {
            limit.unwrap_or(DEFAULT_LOG_LIMIT)
        } else {
            validate_tag_name(tag)?;
            let tagged = repo
                .revparse_single(&format!("refs/tags/{}", tag))
                .and_then(|object| object.peel_to_commit())
                .map_err(fail)?;
            revwalk.hide(tagged.id()).map_err(fail)?;
            limit.unwrap_or(usize::MAX)
        };

        let mut commits = Vec::new();
        for oid in revwalk.take(limit) {
            let oid = oid.map_err(fail)?;
            let commit = repo.find_commit(oid).map_err(fail)?;
            commits.push(format!(
                "{} {}",
                short_id(oid),
                commit.summary().unwrap_or("(empty message)")
            ));
        }

        Ok(commits)
    }

    fn create_tag(&self, tag: &str, message: &str) -> Result<()> {
        validate_tag_name(tag)?;

        if self.dry_run {
            display_dry_run(&format!("create tag: {} with message: {}", tag, message));
            return Ok(());
        }

        let repo = self.repo()?;
        let operation = format!("create tag {}", tag);
        let fail = |e: git2::Error| BumpError::backend(&operation, e);

        let head = repo.head().and_then(|h| h.peel_to_commit()).map_err(fail)?;
        let signature = repo.signature().map_err(fail)?;
        repo.tag(tag, head.as_object(), &signature, message, false)
            .map_err(fail)?;

        tracing::debug!(tag, commit = %head.id(), "created annotated tag");
        Ok(())
    }

    fn push_tag(&self, tag: &str) -> Result<()> {
        validate_tag_name(tag)?;

        if self.dry_run {
            display_dry_run(&format!("push tag: {}", tag));
            return Ok(());
        }

        self.push_refspec(
            &format!("refs/tags/{}:refs/tags/{}", tag, tag),
            &format!("push tag {}", tag),
        )
    }

    fn default_branch(&self) -> String {
        let Some(repo) = self.repo.as_ref() else {
            return FALLBACK_DEFAULT_BRANCH.to_string();
        };

        let remote_prefix = format!("refs/remotes/{}/", self.remote);
        if let Ok(reference) = repo.find_reference(&format!("{}HEAD", remote_prefix)) {
            if let Some(name) = reference
                .symbolic_target()
                .and_then(|target| target.strip_prefix(remote_prefix.as_str()))
            {
                return name.to_string();
            }
        }

        for candidate in ["main", "master"] {
            if repo.find_branch(candidate, BranchType::Local).is_ok() {
                return candidate.to_string();
            }
        }

        FALLBACK_DEFAULT_BRANCH.to_string()
    }

    fn current_branch(&self) -> Result<String> {
        let repo = self.repo()?;
        let head = repo
            .head()
            .map_err(|e| BumpError::backend("get current branch", e))?;

        if !head.is_branch() {
            return Err(BumpError::backend("get current branch", "HEAD is detached"));
        }

        head.shorthand()
            .map(str::to_string)
            .ok_or_else(|| BumpError::backend("get current branch", "branch name is not UTF-8"))
    }

    fn branch_exists(&self, name: &str) -> bool {
        let Ok(repo) = self.repo() else {
            return false;
        };

        validate_branch_name(name).is_ok() && repo.find_branch(name, BranchType::Local).is_ok()
    }

    fn create_branch(&self, name: &str, from: &str) -> Result<()> {
        validate_branch_name(name)?;
        validate_branch_name(from)?;

        if self.dry_run {
            display_dry_run(&format!("create branch: {} from {}", name, from));
            return Ok(());
        }

        let repo = self.repo()?;
        let operation = format!("create branch {} from {}", name, from);
        let fail = |e: git2::Error| BumpError::backend(&operation, e);

        let commit = repo
            .revparse_single(from)
            .and_then(|object| object.peel_to_commit())
            .map_err(fail)?;
        repo.branch(name, &commit, false).map_err(fail)?;

        Ok(())
    }

    fn merge_branch(&self, source: &str, target: &str) -> Result<()> {
        validate_branch_name(source)?;
        validate_branch_name(target)?;

        if self.dry_run {
            display_dry_run(&format!("merge branch: {} into {}", source, target));
            return Ok(());
        }

        let repo = self.repo()?;
        let operation = format!("merge {} into {}", source, target);
        let fail = |e: git2::Error| BumpError::backend(&operation, e);

        let source_commit = repo
            .revparse_single(source)
            .and_then(|object| object.peel_to_commit())
            .map_err(fail)?;
        let target_branch = repo
            .find_branch(target, BranchType::Local)
            .map_err(fail)?;
        let target_ref = target_branch
            .get()
            .name()
            .map(str::to_string)
            .ok_or_else(|| BumpError::backend(&operation, "branch name is not UTF-8"))?;
        let target_commit = target_branch.get().peel_to_commit().map_err(fail)?;

        let (source_id, target_id) = (source_commit.id(), target_commit.id());
        if source_id == target_id || repo.graph_descendant_of(target_id, source_id).map_err(fail)? {
            tracing::debug!(source, target, "already up to date");
            return Ok(());
        }

        let checked_out = target_branch.is_head();
        if checked_out && !self.is_working_tree_clean()? {
            return Err(BumpError::backend(
                &operation,
                "working tree has uncommitted changes",
            ));
        }

        if repo.graph_descendant_of(source_id, target_id).map_err(fail)? {
            let mut reference = repo.find_reference(&target_ref).map_err(fail)?;
            reference
                .set_target(source_id, &format!("merge {}: Fast-forward", source))
                .map_err(fail)?;
        } else {
            let mut index = repo
                .merge_commits(&target_commit, &source_commit, None)
                .map_err(fail)?;
            if index.has_conflicts() {
                return Err(BumpError::backend(
                    &operation,
                    "merge has conflicts, resolve them manually",
                ));
            }

            let tree_id = index.write_tree_to(repo).map_err(fail)?;
            let tree = repo.find_tree(tree_id).map_err(fail)?;
            let signature = repo.signature().map_err(fail)?;
            repo.commit(
                Some(&target_ref),
                &signature,
                &signature,
                &format!("Merge branch '{}' into {}", source, target),
                &tree,
                &[&target_commit, &source_commit],
            )
            .map_err(fail)?;
        }

        if checked_out {
            repo.checkout_head(Some(CheckoutBuilder::new().force()))
                .map_err(fail)?;
        }

        Ok(())
    }

    fn push_branch(&self, name: &str) -> Result<()> {
        validate_branch_name(name)?;

        if self.dry_run {
            display_dry_run(&format!("push branch: {}", name));
            return Ok(());
        }

        self.push_refspec(
            &format!("refs/heads/{}:refs/heads/{}", name, name),
            &format!("push branch {}", name),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_git_time() {
        let time = Time::new(1_700_000_000, 60);
        assert_eq!(format_git_time(time), "2023-11-14 23:13:20 +0100");
    }

    #[test]
    fn test_outside_repository() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Git2Backend::discover(dir.path(), &Config::default());

        assert!(!backend.is_repository());
        assert!(!backend.tag_exists("v1.0.0"));
        assert_eq!(backend.default_branch(), FALLBACK_DEFAULT_BRANCH);
        assert!(matches!(backend.latest_tag(), Err(BumpError::NotARepository)));
    }

    #[test]
    fn test_dry_run_validates_before_skipping() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            dry_run: true,
            ..Config::default()
        };
        let backend = Git2Backend::discover(dir.path(), &config);

        assert!(backend.create_tag("v1.0.0", "Release v1.0.0").is_ok());
        assert!(matches!(
            backend.push_tag("v1.0.0 && reboot"),
            Err(BumpError::InvalidTagFormat(_))
        ));
    }
}
