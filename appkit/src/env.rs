//! Process environment snapshot.
//!
//! All environment access in the workspace goes through [`EnvSnapshot`]: the
//! environment is read once at the call site and treated as immutable
//! afterwards. Core logic never reads or mutates the process environment
//! directly, so any number of threads may share a `&EnvSnapshot` without
//! locking.

use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Variables whose mere presence (non-empty) signals a CI environment.
pub const CI_INDICATOR_VARS: [&str; 5] = ["CI", "GITHUB_ACTIONS", "JENKINS", "TRAVIS", "CIRCLECI"];

/// Variable holding the CI timeout multiplier, parsed as a float.
pub const CI_MULTIPLIER_VAR: &str = "CI_TIMEOUT_MULTIPLIER";

const DEFAULT_CI_MULTIPLIER: f64 = 5.0;

/// Errors from interpreting snapshot values
#[derive(Error, Debug)]
pub enum EnvError {
    /// CI_TIMEOUT_MULTIPLIER is set but does not parse as a float
    #[error("invalid CI_TIMEOUT_MULTIPLIER value '{value}': expected a float")]
    InvalidMultiplier { value: String },
}

pub type EnvResult<T> = Result<T, EnvError>;

/// Immutable snapshot of environment variables, captured once.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the current process environment.
    pub fn capture() -> Self {
        let snapshot = Self {
            vars: std::env::vars().collect(),
        };
        debug!(count = snapshot.vars.len(), "captured environment snapshot");
        snapshot
    }

    /// Build a snapshot from explicit pairs, without touching the process
    /// environment. Intended for tests and embedding hosts.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// True if the variable is present with a non-empty value.
    pub fn is_set_nonempty(&self, name: &str) -> bool {
        self.get(name).is_some_and(|value| !value.is_empty())
    }

    /// True if any recognized CI indicator variable is present and non-empty.
    pub fn ci_detected(&self) -> bool {
        CI_INDICATOR_VARS
            .iter()
            .any(|name| self.is_set_nonempty(name))
    }

    /// CI timeout multiplier: defaults to 5.0 when unset, otherwise parsed
    /// as a float. A present but unparseable value is an error, never a
    /// silent fallback.
    pub fn ci_timeout_multiplier(&self) -> EnvResult<f64> {
        match self.get(CI_MULTIPLIER_VAR) {
            None => Ok(DEFAULT_CI_MULTIPLIER),
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .map_err(|_| EnvError::InvalidMultiplier {
                    value: raw.to_string(),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_ci_detected_with_indicator() {
        let env = EnvSnapshot::from_pairs([("GITHUB_ACTIONS", "true")]);
        assert!(env.ci_detected());
    }

    #[test]
    fn test_ci_not_detected_without_indicators() {
        let env = EnvSnapshot::from_pairs([("HOME", "/home/user")]);
        assert!(!env.ci_detected());
    }

    #[test]
    fn test_empty_indicator_does_not_count() {
        let env = EnvSnapshot::from_pairs([("CI", "")]);
        assert!(!env.ci_detected());
    }

    #[test]
    fn test_multiplier_defaults_when_unset() {
        let env = EnvSnapshot::default();
        assert_eq!(env.ci_timeout_multiplier().unwrap(), 5.0);
    }

    #[test]
    fn test_multiplier_parses_float() {
        let env = EnvSnapshot::from_pairs([(CI_MULTIPLIER_VAR, "2.5")]);
        assert_eq!(env.ci_timeout_multiplier().unwrap(), 2.5);
    }

    #[test]
    fn test_multiplier_rejects_garbage() {
        let env = EnvSnapshot::from_pairs([(CI_MULTIPLIER_VAR, "abc")]);
        let err = env.ci_timeout_multiplier().unwrap_err();
        assert!(matches!(err, EnvError::InvalidMultiplier { ref value } if value == "abc"));
    }

    #[test]
    #[serial]
    fn test_capture_sees_process_environment() {
        std::env::set_var("APPKIT_CAPTURE_PROBE", "probe-value");
        let env = EnvSnapshot::capture();
        std::env::remove_var("APPKIT_CAPTURE_PROBE");
        assert_eq!(env.get("APPKIT_CAPTURE_PROBE"), Some("probe-value"));
        // The snapshot is a copy; removing the variable does not affect it.
        assert_eq!(env.get("APPKIT_CAPTURE_PROBE"), Some("probe-value"));
    }
}
