// tests/git_backend_test.rs
use bump::config::Config;
use bump::git::{Git2Backend, VersionControl};
use bump::BumpError;
use git2::{BranchType, Commit, Oid, Repository, RepositoryInitOptions, Signature, Time};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

struct TestRepo {
    dir: TempDir,
    repo: Repository,
}

impl TestRepo {
    /// Repository on `main` with one commit
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let mut options = RepositoryInitOptions::new();
        options.initial_head("main");
        let repo = Repository::init_opts(dir.path(), &options).unwrap();

        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();

        let test_repo = TestRepo { dir, repo };
        test_repo.commit_file("README.md", "hello\n", "initial commit");
        test_repo
    }

    fn backend(&self) -> Git2Backend {
        Git2Backend::discover(self.dir.path(), &Config::default())
    }

    fn backend_with(&self, config: &Config) -> Git2Backend {
        Git2Backend::discover(self.dir.path(), config)
    }

    /// Commit a file on the checked-out branch
    fn commit_file(&self, name: &str, content: &str, message: &str) -> Oid {
        fs::write(self.dir.path().join(name), content).unwrap();

        let mut index = self.repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();

        let signature = self.repo.signature().unwrap();
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&Commit> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .unwrap()
    }

    /// Commit a file on a branch that is not checked out
    fn commit_on_branch(&self, branch: &str, name: &str, content: &str, message: &str) -> Oid {
        let parent = self
            .repo
            .find_branch(branch, BranchType::Local)
            .unwrap()
            .get()
            .peel_to_commit()
            .unwrap();
        let blob = self.repo.blob(content.as_bytes()).unwrap();
        let mut builder = self.repo.treebuilder(Some(&parent.tree().unwrap())).unwrap();
        builder.insert(name, blob, 0o100644).unwrap();
        let tree = self.repo.find_tree(builder.write().unwrap()).unwrap();

        let signature = self.repo.signature().unwrap();
        self.repo
            .commit(
                Some(&format!("refs/heads/{}", branch)),
                &signature,
                &signature,
                message,
                &tree,
                &[&parent],
            )
            .unwrap()
    }

    fn branch_head(&self, branch: &str) -> Commit<'_> {
        self.repo
            .find_branch(branch, BranchType::Local)
            .unwrap()
            .get()
            .peel_to_commit()
            .unwrap()
    }

    /// Add a bare repository as `origin`
    fn add_bare_remote(&self) -> (TempDir, Repository) {
        let remote_dir = TempDir::new().unwrap();
        let bare = Repository::init_bare(remote_dir.path()).unwrap();
        self.repo
            .remote("origin", remote_dir.path().to_str().unwrap())
            .unwrap();
        (remote_dir, bare)
    }
}

#[test]
fn test_untagged_repository() {
    let test_repo = TestRepo::new();
    let backend = test_repo.backend();

    assert!(backend.is_repository());
    assert!(backend.is_working_tree_clean().unwrap());
    assert!(backend.latest_tag().is_err());
    assert!(backend.all_tags().unwrap().is_empty());
    assert_eq!(backend.current_branch().unwrap(), "main");
    assert_eq!(backend.default_branch(), "main");
}

#[test]
fn test_untracked_file_makes_tree_dirty() {
    let test_repo = TestRepo::new();
    fs::write(test_repo.dir.path().join("scratch.txt"), "wip").unwrap();

    assert!(!test_repo.backend().is_working_tree_clean().unwrap());
}

#[test]
fn test_create_tag_is_annotated() {
    let test_repo = TestRepo::new();
    let backend = test_repo.backend();

    backend.create_tag("v1.0.0", "Release v1.0.0").unwrap();

    assert!(backend.tag_exists("v1.0.0"));
    assert!(!backend.tag_exists("v1.0.1"));
    let tag = test_repo
        .repo
        .find_reference("refs/tags/v1.0.0")
        .unwrap()
        .peel_to_tag()
        .unwrap();
    assert_eq!(tag.message(), Some("Release v1.0.0"));
    assert_eq!(tag.tagger().unwrap().name(), Some("Test User"));
}

#[test]
fn test_latest_tag_and_commits_since() {
    let test_repo = TestRepo::new();
    let backend = test_repo.backend();
    backend.create_tag("v1.4.2", "Release v1.4.2").unwrap();

    test_repo.commit_file("a.txt", "a", "feat: add a");
    test_repo.commit_file("b.txt", "b", "fix: repair b");

    assert_eq!(backend.latest_tag().unwrap(), "v1.4.2");

    let commits = backend.commits_since("v1.4.2", None).unwrap();
    assert_eq!(commits.len(), 2);
    assert!(commits.iter().any(|c| c.ends_with(" feat: add a")));
    assert!(commits.iter().any(|c| c.ends_with(" fix: repair b")));
    assert!(commits.iter().all(|c| c.split(' ').next().unwrap().len() == 7));

    assert_eq!(backend.commits_since("v1.4.2", Some(1)).unwrap().len(), 1);
}

#[test]
fn test_commits_since_zero_tag_lists_recent_history() {
    let test_repo = TestRepo::new();
    for i in 0..12 {
        test_repo.commit_file("counter.txt", &i.to_string(), &format!("commit {}", i));
    }
    let backend = test_repo.backend();

    assert_eq!(backend.commits_since("v0.0.0", None).unwrap().len(), 10);
    assert_eq!(backend.commits_since("", Some(3)).unwrap().len(), 3);
}

#[test]
fn test_commits_since_unknown_tag_fails() {
    let test_repo = TestRepo::new();
    let backend = test_repo.backend();

    assert!(matches!(
        backend.commits_since("v9.9.9", None),
        Err(BumpError::Backend { .. })
    ));
    assert!(matches!(
        backend.commits_since("v1.0.0|cat", None),
        Err(BumpError::InvalidTagFormat(_))
    ));
}

#[test]
fn test_all_tags_newest_first() {
    let test_repo = TestRepo::new();
    let head = test_repo.repo.head().unwrap().peel_to_commit().unwrap();

    let old = Signature::new("Test User", "test@example.com", &Time::new(1_600_000_000, 0)).unwrap();
    let newer =
        Signature::new("Test User", "test@example.com", &Time::new(1_700_000_000, 0)).unwrap();
    test_repo
        .repo
        .tag("v1.0.0", head.as_object(), &old, "Release v1.0.0", false)
        .unwrap();
    test_repo
        .repo
        .tag("v2.0.0", head.as_object(), &newer, "Release v2.0.0", false)
        .unwrap();

    let tags = test_repo.backend().all_tags().unwrap();

    assert_eq!(
        tags,
        vec![
            "v2.0.0 2023-11-14 22:13:20 +0000",
            "v1.0.0 2020-09-13 12:26:40 +0000",
        ]
    );
}

#[test]
fn test_push_tag_to_remote() {
    let test_repo = TestRepo::new();
    let (_remote_dir, bare) = test_repo.add_bare_remote();
    let backend = test_repo.backend();

    backend.create_tag("v0.1.0", "Release v0.1.0").unwrap();
    backend.push_tag("v0.1.0").unwrap();

    assert!(bare.find_reference("refs/tags/v0.1.0").is_ok());
}

#[test]
fn test_push_without_remote_fails() {
    let test_repo = TestRepo::new();
    let backend = test_repo.backend();
    backend.create_tag("v0.1.0", "Release v0.1.0").unwrap();

    let result = backend.push_tag("v0.1.0");
    assert!(
        matches!(result, Err(BumpError::Backend { ref message, .. }) if message.contains("origin"))
    );
}

#[test]
fn test_create_and_push_branch() {
    let test_repo = TestRepo::new();
    let (_remote_dir, bare) = test_repo.add_bare_remote();
    let backend = test_repo.backend();

    assert!(!backend.branch_exists("1.0.0"));
    backend.create_branch("1.0.0", "main").unwrap();
    assert!(backend.branch_exists("1.0.0"));
    assert_eq!(
        test_repo.branch_head("1.0.0").id(),
        test_repo.branch_head("main").id()
    );

    backend.push_branch("1.0.0").unwrap();
    assert!(bare.find_reference("refs/heads/1.0.0").is_ok());
}

#[test]
fn test_merge_fast_forward() {
    let test_repo = TestRepo::new();
    let backend = test_repo.backend();
    backend.create_branch("release", "main").unwrap();

    let newest = test_repo.commit_file("a.txt", "a", "feat: a");
    backend.merge_branch("main", "release").unwrap();

    assert_eq!(test_repo.branch_head("release").id(), newest);
}

#[test]
fn test_merge_up_to_date_is_noop() {
    let test_repo = TestRepo::new();
    let backend = test_repo.backend();
    backend.create_branch("release", "main").unwrap();
    let before = test_repo.branch_head("release").id();

    backend.merge_branch("main", "release").unwrap();

    assert_eq!(test_repo.branch_head("release").id(), before);
}

#[test]
fn test_merge_diverged_branches_creates_merge_commit() {
    let test_repo = TestRepo::new();
    let backend = test_repo.backend();
    backend.create_branch("release", "main").unwrap();

    let release_tip = test_repo.commit_on_branch("release", "notes.txt", "hotfix", "fix: hotfix");
    let main_tip = test_repo.commit_file("a.txt", "a", "feat: a");
    backend.merge_branch("main", "release").unwrap();

    let merged = test_repo.branch_head("release");
    let parents: Vec<Oid> = merged.parent_ids().collect();
    assert_eq!(parents, vec![release_tip, main_tip]);
    assert_eq!(merged.summary(), Some("Merge branch 'main' into release"));
}

#[test]
fn test_merge_conflict_fails() {
    let test_repo = TestRepo::new();
    let backend = test_repo.backend();
    backend.create_branch("release", "main").unwrap();

    let release_tip = test_repo.commit_on_branch("release", "README.md", "release\n", "docs: release");
    test_repo.commit_file("README.md", "main\n", "docs: main");

    assert!(matches!(
        backend.merge_branch("main", "release"),
        Err(BumpError::Backend { .. })
    ));
    assert_eq!(test_repo.branch_head("release").id(), release_tip);
}

#[test]
fn test_dry_run_has_no_side_effects() {
    let test_repo = TestRepo::new();
    let config = Config {
        dry_run: true,
        ..Config::default()
    };
    let backend = test_repo.backend_with(&config);

    backend.create_tag("v1.0.0", "Release v1.0.0").unwrap();
    backend.push_tag("v1.0.0").unwrap();
    backend.create_branch("1.0.0", "main").unwrap();
    backend.merge_branch("main", "1.0.0").unwrap();
    backend.push_branch("1.0.0").unwrap();

    assert!(!backend.tag_exists("v1.0.0"));
    assert!(!backend.branch_exists("1.0.0"));
    assert!(test_repo.repo.tag_names(None).unwrap().is_empty());
}

#[test]
fn test_unsafe_names_rejected() {
    let test_repo = TestRepo::new();
    let backend = test_repo.backend();

    assert!(matches!(
        backend.create_tag("v1.0.0; rm -rf /", "Release"),
        Err(BumpError::InvalidTagFormat(_))
    ));
    assert!(matches!(
        backend.create_branch("release`id`", "main"),
        Err(BumpError::InvalidBranchName(_))
    ));
    assert!(!backend.tag_exists("v1.0.0 v2"));
    assert!(test_repo.repo.tag_names(None).unwrap().is_empty());
}
