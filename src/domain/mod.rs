//! Domain logic - pure business rules independent of git operations

pub mod branch;
pub mod tag;
pub mod version;

pub use branch::{branch_name_for_tag, BranchMode};
pub use tag::{release_message, validate_branch_name, validate_tag_name};
pub use version::{BumpKind, Version, ZERO_TAG};
