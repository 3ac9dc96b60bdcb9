/// Build metadata stamped in at compile time.
///
/// Release builds set `BUMP_GIT_COMMIT`, `BUMP_BUILD_DATE` and
/// `BUMP_RUSTC_VERSION` in the environment of `cargo build`; local builds
/// report `unknown`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_commit: &'static str,
    pub build_date: &'static str,
    pub rustc_version: &'static str,
}

const UNKNOWN: &str = "unknown";

pub fn get() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        git_commit: option_env!("BUMP_GIT_COMMIT").unwrap_or(UNKNOWN),
        build_date: option_env!("BUMP_BUILD_DATE").unwrap_or(UNKNOWN),
        rustc_version: option_env!("BUMP_RUSTC_VERSION").unwrap_or(UNKNOWN),
    }
}
