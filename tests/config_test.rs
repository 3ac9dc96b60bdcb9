// tests/config_test.rs
use bump::config::{load_config, CliOverrides, Config};
use bump::BumpError;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(contents.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_default_config() {
    let config = Config::default();
    assert!(!config.dry_run);
    assert!(!config.no_branch);
    assert!(!config.create_branch);
    assert_eq!(config.remote, "origin");

    let names: Vec<&str> = config.checks.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Build", "Tests", "Lint", "Dependency tidiness"]);
}

#[test]
fn test_load_from_file() {
    let temp_file = write_config(
        r#"
create_branch = true
auto_merge = true
source_branch = "develop"
remote = "upstream"

[[checks]]
name = "Format"
command = ["cargo", "fmt", "--check"]

[[checks]]
name = "Audit"
command = ["cargo", "audit"]
allow_missing = true
"#,
    );

    let config = load_config(temp_file.path().to_str()).unwrap();
    assert!(config.create_branch);
    assert!(config.auto_merge);
    assert!(!config.auto_push);
    assert_eq!(config.source_branch.as_deref(), Some("develop"));
    assert_eq!(config.remote, "upstream");

    assert_eq!(config.checks.len(), 2);
    assert_eq!(config.checks[0].command_line(), "cargo fmt --check");
    assert!(!config.checks[0].allow_missing);
    assert!(config.checks[1].allow_missing);
}

#[test]
fn test_empty_checks_disable_prerequisites() {
    let temp_file = write_config("checks = []\n");
    let config = load_config(temp_file.path().to_str()).unwrap();
    assert!(config.checks.is_empty());
}

#[test]
fn test_invalid_toml_is_config_error() {
    let temp_file = write_config("auto_push = \"sometimes\"\n");
    let result = load_config(temp_file.path().to_str());
    assert!(matches!(result, Err(BumpError::Config(_))));
}

#[test]
fn test_cli_flags_layer_on_file() {
    let temp_file = write_config("branch_name = \"release\"\nauto_push = true\n");
    let config = load_config(temp_file.path().to_str())
        .unwrap()
        .apply(CliOverrides {
            dry_run: true,
            no_branch: true,
            source_branch: Some(String::new()),
            ..CliOverrides::default()
        });

    assert!(config.dry_run);
    assert!(config.no_branch);
    assert!(config.auto_push);
    assert_eq!(config.branch_name.as_deref(), Some("release"));
    assert_eq!(config.source_branch, None);
}
