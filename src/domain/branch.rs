use crate::config::Config;

/// How the release branch is handled once the tag is published
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchMode {
    /// `--nobranch`: no branch operations at all
    Skip,
    /// `--create-branch`: act on flags and config without asking
    Explicit,
    /// Ask the operator before every branch action
    Interactive,
    /// No flags and nobody to ask
    Disabled,
}

impl BranchMode {
    /// Pick the mode for one invocation. `--nobranch` wins over `--create-branch`.
    pub fn resolve(config: &Config, interactive: bool) -> Self {
        if config.no_branch {
            BranchMode::Skip
        } else if config.create_branch {
            BranchMode::Explicit
        } else if interactive {
            BranchMode::Interactive
        } else {
            BranchMode::Disabled
        }
    }
}

/// Default release branch name for a tag: the tag without its leading `v`
pub fn branch_name_for_tag(tag: &str) -> String {
    tag.strip_prefix('v').unwrap_or(tag).to_string()
}
