//! Pure formatting functions for UI output.
//!
//! `*_lines`/`*_label` helpers build text without printing so they can be
//! tested; the `display_*` functions print it.

use console::style;

use crate::build_info::BuildInfo;
use crate::domain::{BumpKind, Version};
use crate::release::RepositoryStatus;
use crate::warning::ReleaseWarning;

/// Commits shown before collapsing the rest into a summary line
pub const COMMIT_PREVIEW_LIMIT: usize = 5;

/// Tags shown by the `tags` command before collapsing the rest
pub const TAG_PREVIEW_LIMIT: usize = 20;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a non-fatal warning to the user.
pub fn display_warning(warning: &ReleaseWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Announce a mutating action that dry-run mode skipped.
pub fn display_dry_run(action: &str) {
    println!("{} Would {}", style("[DRY RUN]").cyan(), action);
}

/// Preview lines for a commit list: the first `limit` entries, then a
/// summary of how many were left out.
pub fn preview_lines(items: &[String], limit: usize) -> Vec<String> {
    let mut lines: Vec<String> = items
        .iter()
        .take(limit)
        .map(|item| format!("  {}", item))
        .collect();

    if items.len() > limit {
        lines.push(format!("  ... and {} more", items.len() - limit));
    }

    lines
}

/// Display the commits made since the previous tag.
pub fn display_commit_preview(commits: &[String]) {
    if commits.is_empty() {
        return;
    }

    display_status("Recent commits:");
    for line in preview_lines(commits, COMMIT_PREVIEW_LIMIT) {
        println!("{}", line);
    }
}

/// Selection label for bumping `current`, e.g. `minor (v1.5.0) - new features`.
pub fn bump_choice_label(kind: BumpKind, current: &Version) -> String {
    match current.bump(kind) {
        Ok(candidate) => format!("{} ({}) - {}", kind, candidate, kind.description()),
        Err(_) => format!("{} (out of range) - {}", kind, kind.description()),
    }
}

/// Display the version change about to be tagged.
pub fn display_version_transition(kind: BumpKind, current: &Version, candidate: &Version) {
    println!(
        "\n{} {} release: {} → {}",
        style("Creating").bold(),
        kind,
        style(current).red(),
        style(candidate).green()
    );
}

/// Display tags newest first.
pub fn display_tags(tags: &[String]) {
    if tags.is_empty() {
        display_status("No tags found in this repository");
        return;
    }

    display_status(&format!(
        "Found {} tags (sorted by creation date, newest first):",
        tags.len()
    ));
    for line in preview_lines(tags, TAG_PREVIEW_LIMIT) {
        println!("{}", line);
    }
}

/// Display compile-time build information.
pub fn display_build_info(info: &BuildInfo) {
    println!("Bump Version: {}", info.version);
    println!("Git Commit: {}", info.git_commit);
    println!("Build Date: {}", info.build_date);
    println!("Rust Version: {}", info.rustc_version);
}

/// Display the `status` report.
pub fn display_repository_status(status: &RepositoryStatus) {
    println!("{}", style("Repository status").bold());
    println!("  Current version: {}", style(status.current).green());
    println!(
        "  Latest tag:      {}",
        status.latest_tag.as_deref().unwrap_or("(none)")
    );
    println!(
        "  Current branch:  {}",
        status.current_branch.as_deref().unwrap_or("(detached)")
    );
    println!("  Default branch:  {}", status.default_branch);
    println!(
        "  Working tree:    {}",
        if status.clean {
            style("clean").green()
        } else {
            style("dirty").yellow()
        }
    );

    match &status.commits {
        Some(commits) => {
            match status.latest_tag {
                Some(_) => println!("  Commits since latest tag: {}", commits.len()),
                None => println!("  Recent commits: {}", commits.len()),
            }
            for line in preview_lines(commits, COMMIT_PREVIEW_LIMIT) {
                println!("  {}", line);
            }
        }
        None => println!("  Commits since latest tag: unavailable"),
    }

    println!("\n{}", style("Next versions").bold());
    for kind in BumpKind::ALL {
        println!("  {}", bump_choice_label(kind, &status.current));
    }
}
