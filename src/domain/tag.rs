use crate::error::{BumpError, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Longest tag or branch name accepted in a backend query
pub const MAX_REF_NAME_LEN: usize = 100;

const FORBIDDEN_CHARS: &[char] = &[
    ';', '&', '|', '`', '$', '(', ')', '{', '}', '[', ']', '<', '>', '\\', '"', '\'', ' ',
];

fn allowed_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9._/-]+$").expect("ref name regex is valid"))
}

/// Whether a name is safe to interpolate into a ref name, refspec or revision range.
///
/// Safe names are at most 100 bytes, use only `A-Z a-z 0-9 . _ / -`, and
/// contain no shell metacharacters.
pub fn is_safe_ref_name(name: &str) -> bool {
    if name.len() > MAX_REF_NAME_LEN {
        return false;
    }

    if name.contains(FORBIDDEN_CHARS) {
        return false;
    }

    allowed_pattern().is_match(name)
}

/// Reject a tag that fails [`is_safe_ref_name`]
pub fn validate_tag_name(tag: &str) -> Result<()> {
    if is_safe_ref_name(tag) {
        Ok(())
    } else {
        Err(BumpError::InvalidTagFormat(tag.to_string()))
    }
}

/// Reject a branch name that fails [`is_safe_ref_name`]
pub fn validate_branch_name(name: &str) -> Result<()> {
    if is_safe_ref_name(name) {
        Ok(())
    } else {
        Err(BumpError::InvalidBranchName(name.to_string()))
    }
}

/// Default annotation for a release tag
pub fn release_message(tag: &str) -> String {
    format!("Release {}", tag)
}
