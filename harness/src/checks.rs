//! Static-analysis checks run as external processes.
//!
//! Each check wraps one tool invocation. The runner only cares about the
//! exit status and the captured output: a non-zero exit turns into a failed
//! report carrying the tool's diagnostics verbatim, with no retry.

use serde::Serialize;
use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;
use tracing::{debug, info};

/// Errors from running checks
#[derive(Error, Debug)]
pub enum CheckError {
    /// The tool process could not be spawned at all
    #[error("failed to spawn '{program}' for check '{name}': {source}")]
    Spawn {
        name: String,
        program: String,
        #[source]
        source: std::io::Error,
    },
}

pub type CheckResult<T> = Result<T, CheckError>;

/// A named external tool invocation.
#[derive(Debug, Clone)]
pub struct CheckCommand {
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
}

impl CheckCommand {
    pub fn new(name: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Formatting check: fails when any file needs reformatting.
    pub fn formatter() -> Self {
        Self::new("fmt", "cargo").args(["fmt", "--all", "--", "--check"])
    }

    /// Type and lint check: warnings are failures.
    pub fn type_checker() -> Self {
        Self::new("clippy", "cargo").args(["clippy", "--all-targets", "--", "-D", "warnings"])
    }

    /// The full command line, for display.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Run the tool to completion, capturing stdout and stderr.
    pub fn run(&self) -> CheckResult<CheckReport> {
        debug!(check = %self.name, command = %self.command_line(), "running check");

        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        let output = command.output().map_err(|source| CheckError::Spawn {
            name: self.name.clone(),
            program: self.program.clone(),
            source,
        })?;

        let passed = output.status.success();
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&stderr);
        }

        info!(check = %self.name, passed, "check finished");
        Ok(CheckReport {
            name: self.name.clone(),
            passed,
            output: text,
        })
    }
}

/// Outcome of one check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub name: String,
    pub passed: bool,
    /// Combined stdout and stderr of the tool, verbatim.
    pub output: String,
}

impl CheckReport {
    /// The tool's diagnostics when the check failed.
    pub fn failure_reason(&self) -> Option<&str> {
        (!self.passed).then_some(self.output.as_str())
    }
}

/// Run every check once, in order, collecting all reports.
pub fn run_all(checks: &[CheckCommand]) -> CheckResult<Vec<CheckReport>> {
    checks.iter().map(CheckCommand::run).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell(name: &str, script: &str) -> CheckCommand {
        CheckCommand::new(name, "sh").args(["-c", script])
    }

    #[test]
    fn test_passing_check() {
        let report = shell("echo", "echo hello").run().unwrap();
        assert!(report.passed);
        assert!(report.output.contains("hello"));
        assert!(report.failure_reason().is_none());
    }

    #[test]
    fn test_failing_check_captures_output() {
        let report = shell("boom", "echo diagnostics >&2; exit 3").run().unwrap();
        assert!(!report.passed);
        assert!(report.output.contains("diagnostics"));
        assert_eq!(report.failure_reason(), Some(report.output.as_str()));
    }

    #[test]
    fn test_stdout_and_stderr_combined() {
        let report = shell("both", "echo out; echo err >&2; exit 1")
            .run()
            .unwrap();
        assert!(report.output.contains("out"));
        assert!(report.output.contains("err"));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let err = CheckCommand::new("ghost", "definitely-not-a-real-tool-9f2c")
            .run()
            .unwrap_err();
        assert!(matches!(err, CheckError::Spawn { ref name, .. } if name == "ghost"));
    }

    #[test]
    fn test_current_dir_applies() {
        let dir = tempfile::tempdir().unwrap();
        let report = shell("pwd", "pwd")
            .current_dir(dir.path())
            .run()
            .unwrap();
        assert!(report.passed);
        let canonical = dir.path().canonicalize().unwrap();
        assert!(report.output.contains(canonical.to_str().unwrap()));
    }

    #[test]
    fn test_run_all_collects_reports() {
        let checks = [shell("ok", "true"), shell("bad", "false")];
        let reports = run_all(&checks).unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports[0].passed);
        assert!(!reports[1].passed);
    }

    #[test]
    fn test_default_check_command_lines() {
        assert_eq!(
            CheckCommand::formatter().command_line(),
            "cargo fmt --all -- --check"
        );
        assert_eq!(
            CheckCommand::type_checker().command_line(),
            "cargo clippy --all-targets -- -D warnings"
        );
    }
}
