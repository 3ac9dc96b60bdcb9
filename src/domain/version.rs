use crate::error::{BumpError, ParseErrorKind, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Tag recorded when a repository has no usable release tag yet
pub const ZERO_TAG: &str = "v0.0.0";

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^v?([0-9]+)\.([0-9]+)\.([0-9]+)").expect("version regex is valid"))
}

/// Semantic version representation
///
/// Always renders as `v<major>.<minor>.<patch>`. Anything after the three
/// numeric components of a parsed tag (pre-release, build metadata) is
/// discarded, so `v1.2.3-rc1` formats back as `v1.2.3`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// The `0.0.0` version used before the first release
    pub fn zero() -> Self {
        Version::default()
    }

    /// Parse version from a tag string (e.g., "v1.2.3" -> Version(1,2,3))
    pub fn parse(text: &str) -> Result<Self> {
        let captures = version_pattern()
            .captures(text)
            .ok_or_else(|| BumpError::parse(ParseErrorKind::InvalidFormat, text))?;

        let component = |index: usize| -> Result<u64> {
            captures[index]
                .parse::<u64>()
                .map_err(|_| BumpError::parse(ParseErrorKind::InvalidComponent, text))
        };

        Ok(Version {
            major: component(1)?,
            minor: component(2)?,
            patch: component(3)?,
        })
    }

    /// Parse a tag, falling back to `0.0.0` when it is empty, the zero tag,
    /// or unparsable. Never fails.
    pub fn from_str_or_zero(text: &str) -> Self {
        if text.is_empty() || text == ZERO_TAG {
            return Version::zero();
        }

        Version::parse(text).unwrap_or_default()
    }

    /// Bump version according to bump kind.
    ///
    /// Fails with [BumpError::VersionOutOfRange] when the incremented
    /// component would not fit in a `u64`.
    pub fn bump(&self, kind: BumpKind) -> Result<Self> {
        let out_of_range =
            || BumpError::VersionOutOfRange(format!("{} bump to {}", kind, self));

        Ok(match kind {
            BumpKind::Major => Version {
                major: self.major.checked_add(1).ok_or_else(out_of_range)?,
                minor: 0,
                patch: 0,
            },
            BumpKind::Minor => Version {
                major: self.major,
                minor: self.minor.checked_add(1).ok_or_else(out_of_range)?,
                patch: 0,
            },
            BumpKind::Patch => Version {
                major: self.major,
                minor: self.minor,
                patch: self.patch.checked_add(1).ok_or_else(out_of_range)?,
            },
        })
    }

    pub fn is_zero(&self) -> bool {
        *self == Version::zero()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = BumpError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

/// Which component of the version to increment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpKind {
    Patch,
    Minor,
    Major,
}

impl BumpKind {
    /// All kinds, in the order they are offered to the operator
    pub const ALL: [BumpKind; 3] = [BumpKind::Patch, BumpKind::Minor, BumpKind::Major];

    pub fn as_str(&self) -> &'static str {
        match self {
            BumpKind::Patch => "patch",
            BumpKind::Minor => "minor",
            BumpKind::Major => "major",
        }
    }

    /// Short explanation shown next to the kind in the selection prompt
    pub fn description(&self) -> &'static str {
        match self {
            BumpKind::Patch => "bug fixes",
            BumpKind::Minor => "new features",
            BumpKind::Major => "breaking changes",
        }
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BumpKind {
    type Err = BumpError;

    /// Case-insensitive: "patch", "Minor", "MAJOR"
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "patch" => Ok(BumpKind::Patch),
            "minor" => Ok(BumpKind::Minor),
            "major" => Ok(BumpKind::Major),
            _ => Err(BumpError::InvalidBumpKind(s.to_string())),
        }
    }
}
