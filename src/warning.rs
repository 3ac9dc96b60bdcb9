use std::fmt;

/// Non-fatal conditions met during a release.
/// These are reported to the operator and the release carries on.
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseWarning {
    /// Uncommitted or untracked changes in the working tree
    DirtyWorkingTree,
    /// Commit listing since the previous tag could not be produced
    CommitsUnavailable { reason: String },
    /// Latest tag exists but is not a version; counting from v0.0.0
    UnparsableTag { tag: String },
    /// A prerequisite check failed
    CheckFailed { name: String, reason: String },
    /// Target release branch is already present
    BranchExists { branch: String },
    /// Branch handling failed after the tag was published
    BranchOperationFailed { reason: String },
}

impl fmt::Display for ReleaseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseWarning::DirtyWorkingTree => write!(f, "Working directory is not clean"),
            ReleaseWarning::CommitsUnavailable { reason } => {
                write!(f, "Could not get commits since last tag: {}", reason)
            }
            ReleaseWarning::UnparsableTag { tag } => {
                write!(f, "Cannot parse tag '{}', starting from v0.0.0", tag)
            }
            ReleaseWarning::CheckFailed { name, reason } => {
                write!(f, "{} check failed: {}", name, reason)
            }
            ReleaseWarning::BranchExists { branch } => {
                write!(f, "Branch {} already exists", branch)
            }
            ReleaseWarning::BranchOperationFailed { reason } => {
                write!(f, "Failed to create/manage branch: {}", reason)
            }
        }
    }
}
