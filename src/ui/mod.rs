//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - `prompt` - Interactive prompts behind the [`Prompter`] trait

pub mod formatter;
pub mod prompt;

// Re-export for convenience
pub use formatter::{
    display_build_info, display_commit_preview, display_dry_run, display_error,
    display_repository_status, display_status, display_success, display_tags,
    display_version_transition, display_warning,
};
pub use prompt::{Answer, InquirePrompter, Prompter, ScriptedPrompter};
