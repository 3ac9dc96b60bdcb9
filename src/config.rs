use crate::checks::{default_checks, CheckSpec};
use crate::error::{BumpError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the current directory
pub const LOCAL_CONFIG_FILE: &str = "bump.toml";

/// Represents the complete configuration for one bump invocation.
///
/// Built once from the optional config file plus command-line flags, then
/// passed by reference to everything that needs it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub dry_run: bool,
    pub verbose: bool,
    pub no_branch: bool,
    pub create_branch: bool,
    pub source_branch: Option<String>,
    pub branch_name: Option<String>,
    pub auto_merge: bool,
    pub auto_push: bool,

    /// Remote that tags and branches are pushed to
    pub remote: String,

    /// Prerequisite checks run before an interactive release
    pub checks: Vec<CheckSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            dry_run: false,
            verbose: false,
            no_branch: false,
            create_branch: false,
            source_branch: None,
            branch_name: None,
            auto_merge: false,
            auto_push: false,
            remote: "origin".to_string(),
            checks: default_checks(),
        }
    }
}

/// Command-line flags layered on top of the loaded configuration.
///
/// Decoupled from clap so the merge can be tested and driven programmatically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub dry_run: bool,
    pub verbose: bool,
    pub no_branch: bool,
    pub create_branch: bool,
    pub source_branch: Option<String>,
    pub branch_name: Option<String>,
    pub auto_merge: bool,
    pub auto_push: bool,
}

impl Config {
    /// Apply command-line flags. Flags only switch options on; empty branch
    /// names are treated as unset.
    pub fn apply(mut self, overrides: CliOverrides) -> Self {
        self.dry_run |= overrides.dry_run;
        self.verbose |= overrides.verbose;
        self.no_branch |= overrides.no_branch;
        self.create_branch |= overrides.create_branch;
        self.auto_merge |= overrides.auto_merge;
        self.auto_push |= overrides.auto_push;

        if let Some(source) = non_empty(overrides.source_branch) {
            self.source_branch = Some(source);
        }
        if let Some(name) = non_empty(overrides.branch_name) {
            self.branch_name = Some(name);
        }

        self.source_branch = non_empty(self.source_branch);
        self.branch_name = non_empty(self.branch_name);
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Path of the per-user configuration file, if a config directory exists
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("bump").join("config.toml"))
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `bump.toml` in current directory
/// 3. `bump/config.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    if let Some(path) = config_path {
        return load_config_file(Path::new(path));
    }

    let local = Path::new(LOCAL_CONFIG_FILE);
    if local.exists() {
        return load_config_file(local);
    }

    match user_config_path() {
        Some(path) if path.exists() => load_config_file(&path),
        _ => Ok(Config::default()),
    }
}

fn load_config_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| BumpError::config(format!("{}: {}", path.display(), e)))?;
    tracing::debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}
