//! Prerequisite checks run before an interactive release.
//!
//! Checks are a soft gate: a failing check is reported and the next one runs
//! anyway. Nothing here can stop a release.

use crate::config::Config;
use crate::ui::formatter::{display_dry_run, display_status, display_success, display_warning};
use crate::warning::ReleaseWarning;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::process::Command;

/// Lines of command output kept in a failure reason
const FAILURE_OUTPUT_LINES: usize = 10;

/// One external command to run before tagging
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CheckSpec {
    pub name: String,

    /// Program followed by its arguments
    pub command: Vec<String>,

    /// Treat a program that cannot be found as a pass
    #[serde(default)]
    pub allow_missing: bool,

    /// Treat a failing run whose output contains this text as a pass
    #[serde(default)]
    pub pass_if_output_contains: Option<String>,
}

impl CheckSpec {
    pub fn new<I, S>(name: impl Into<String>, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CheckSpec {
            name: name.into(),
            command: command.into_iter().map(Into::into).collect(),
            allow_missing: false,
            pass_if_output_contains: None,
        }
    }

    pub fn allow_missing(mut self) -> Self {
        self.allow_missing = true;
        self
    }

    pub fn pass_if_output_contains(mut self, text: impl Into<String>) -> Self {
        self.pass_if_output_contains = Some(text.into());
        self
    }

    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

/// Build, test, lint and dependency-tidiness checks for a cargo project
pub fn default_checks() -> Vec<CheckSpec> {
    vec![
        CheckSpec::new("Build", ["cargo", "build", "--all-targets"]),
        CheckSpec::new("Tests", ["cargo", "test"]),
        CheckSpec::new(
            "Lint",
            ["cargo", "clippy", "--all-targets", "--", "-D", "warnings"],
        )
        .allow_missing()
        .pass_if_output_contains("no such command"),
        CheckSpec::new(
            "Dependency tidiness",
            ["cargo", "metadata", "--locked", "--format-version", "1"],
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Passed,
    Failed(String),
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: String,
    pub outcome: CheckOutcome,
}

/// Outcome of every configured check, in run order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub results: Vec<CheckResult>,
}

impl CheckReport {
    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, CheckOutcome::Failed(_)))
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn all_passed(&self) -> bool {
        self.failure_count() == 0
    }
}

/// Runs the configured prerequisite checks
pub struct Checker<'a> {
    config: &'a Config,
}

impl<'a> Checker<'a> {
    pub fn new(config: &'a Config) -> Self {
        Checker { config }
    }

    /// Run every check regardless of earlier failures
    pub fn run_all(&self) -> CheckReport {
        let mut report = CheckReport::default();

        for spec in &self.config.checks {
            if self.config.verbose {
                display_status(&format!("Running {} check...", spec.name));
            }

            let outcome = self.run_one(spec);
            match &outcome {
                CheckOutcome::Passed if self.config.verbose => {
                    display_success(&format!("{} check passed", spec.name));
                }
                CheckOutcome::Failed(reason) => {
                    display_warning(&ReleaseWarning::CheckFailed {
                        name: spec.name.clone(),
                        reason: reason.clone(),
                    });
                }
                _ => {}
            }
            tracing::debug!(check = %spec.name, ?outcome, "prerequisite check finished");

            report.results.push(CheckResult {
                name: spec.name.clone(),
                outcome,
            });
        }

        report
    }

    fn run_one(&self, spec: &CheckSpec) -> CheckOutcome {
        let Some((program, args)) = spec.command.split_first() else {
            return CheckOutcome::Failed("no command configured".to_string());
        };

        if self.config.dry_run {
            display_dry_run(&format!("run: {}", spec.command_line()));
            return CheckOutcome::Skipped("dry run".to_string());
        }

        let output = match Command::new(program).args(args).output() {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound && spec.allow_missing => {
                return CheckOutcome::Skipped(format!("{} not installed", program));
            }
            Err(e) => return CheckOutcome::Failed(format!("cannot run {}: {}", program, e)),
        };

        if output.status.success() {
            return CheckOutcome::Passed;
        }

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if let Some(marker) = &spec.pass_if_output_contains {
            if combined.contains(marker.as_str()) {
                return CheckOutcome::Passed;
            }
        }

        CheckOutcome::Failed(failure_reason(&combined, output.status.code()))
    }
}

fn failure_reason(output: &str, code: Option<i32>) -> String {
    let lines: Vec<&str> = output.trim().lines().collect();
    if lines.is_empty() {
        return match code {
            Some(code) => format!("exited with status {}", code),
            None => "terminated by signal".to_string(),
        };
    }

    let start = lines.len().saturating_sub(FAILURE_OUTPUT_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(checks: Vec<CheckSpec>) -> Config {
        Config {
            checks,
            ..Config::default()
        }
    }

    #[test]
    fn test_missing_program_fails_unless_allowed() {
        let config = config_with(vec![
            CheckSpec::new("Strict", ["bump-test-no-such-program"]),
            CheckSpec::new("Lenient", ["bump-test-no-such-program"]).allow_missing(),
        ]);

        let report = Checker::new(&config).run_all();
        assert_eq!(report.results.len(), 2);
        assert!(matches!(report.results[0].outcome, CheckOutcome::Failed(_)));
        assert!(matches!(report.results[1].outcome, CheckOutcome::Skipped(_)));
        assert_eq!(report.failure_count(), 1);
    }

    #[test]
    fn test_failure_does_not_stop_later_checks() {
        let config = config_with(vec![
            CheckSpec::new("First", ["bump-test-no-such-program"]),
            CheckSpec::new("Empty", Vec::<String>::new()),
            CheckSpec::new("Third", ["bump-test-no-such-program"]),
        ]);

        let report = Checker::new(&config).run_all();
        let names: Vec<_> = report.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Empty", "Third"]);
        assert_eq!(report.failure_count(), 3);
        assert!(!report.all_passed());
    }

    #[test]
    fn test_dry_run_skips_everything() {
        let config = Config {
            dry_run: true,
            ..config_with(vec![CheckSpec::new("Build", ["bump-test-no-such-program"])])
        };

        let report = Checker::new(&config).run_all();
        assert_eq!(
            report.results[0].outcome,
            CheckOutcome::Skipped("dry run".to_string())
        );
        assert!(report.all_passed());
    }

    #[test]
    fn test_failure_reason_keeps_tail() {
        let output: String = (1..=15).map(|i| format!("line {}\n", i)).collect();
        let reason = failure_reason(&output, Some(1));
        assert!(reason.starts_with("line 6"));
        assert!(reason.ends_with("line 15"));
        assert_eq!(failure_reason("", Some(2)), "exited with status 2");
    }

    #[test]
    fn test_default_checks_parse_from_toml() {
        let toml_str = r#"
name = "Format"
command = ["cargo", "fmt", "--check"]
"#;
        let spec: CheckSpec = toml::from_str(toml_str).unwrap();
        assert_eq!(spec.command_line(), "cargo fmt --check");
        assert!(!spec.allow_missing);
        assert_eq!(default_checks()[2].name, "Lint");
    }
}
