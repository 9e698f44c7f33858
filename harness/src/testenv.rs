//! Test-environment guard.
//!
//! Tests run with telemetry disabled and the environment named "test". The
//! guard records every variable it touches and restores the previous state
//! on drop, so a test cannot leak environment changes into the next one.

use appkit::config::{DISABLE_TELEMETRY_VAR, ENVIRONMENT_VAR};
use tracing::debug;

/// RAII guard over process environment variables.
///
/// Dropping the guard restores every touched variable to its prior value,
/// removing variables that did not exist before.
#[derive(Debug, Default)]
pub struct TestEnv {
    saved: Vec<(String, Option<String>)>,
}

impl TestEnv {
    /// Install the standard test environment: telemetry off, env = "test".
    pub fn install() -> Self {
        let mut guard = Self::default();
        guard.set(DISABLE_TELEMETRY_VAR, "1");
        guard.set(ENVIRONMENT_VAR, "test");
        debug!("test environment installed");
        guard
    }

    /// Set a variable, remembering its prior value for restoration.
    pub fn set(&mut self, name: &str, value: &str) {
        self.save(name);
        std::env::set_var(name, value);
    }

    /// Remove a variable, remembering its prior value for restoration.
    pub fn remove(&mut self, name: &str) {
        self.save(name);
        std::env::remove_var(name);
    }

    fn save(&mut self, name: &str) {
        // Only the first touch of a variable records its original value.
        if !self.saved.iter().any(|(saved, _)| saved == name) {
            self.saved.push((name.to_string(), std::env::var(name).ok()));
        }
    }
}

impl Drop for TestEnv {
    fn drop(&mut self) {
        for (name, previous) in self.saved.drain(..).rev() {
            match previous {
                Some(value) => std::env::set_var(&name, value),
                None => std::env::remove_var(&name),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_install_sets_expected_variables() {
        let _guard = TestEnv::install();
        assert_eq!(std::env::var(DISABLE_TELEMETRY_VAR).as_deref(), Ok("1"));
        assert_eq!(std::env::var(ENVIRONMENT_VAR).as_deref(), Ok("test"));
    }

    #[test]
    #[serial]
    fn test_drop_removes_introduced_variables() {
        std::env::remove_var(DISABLE_TELEMETRY_VAR);
        std::env::remove_var(ENVIRONMENT_VAR);
        {
            let _guard = TestEnv::install();
            assert!(std::env::var(DISABLE_TELEMETRY_VAR).is_ok());
        }
        assert!(std::env::var(DISABLE_TELEMETRY_VAR).is_err());
        assert!(std::env::var(ENVIRONMENT_VAR).is_err());
    }

    #[test]
    #[serial]
    fn test_drop_restores_overwritten_value() {
        std::env::set_var("TESTENV_PROBE", "original");
        {
            let mut guard = TestEnv::default();
            guard.set("TESTENV_PROBE", "changed");
            guard.set("TESTENV_PROBE", "changed-again");
            assert_eq!(std::env::var("TESTENV_PROBE").as_deref(), Ok("changed-again"));
        }
        assert_eq!(std::env::var("TESTENV_PROBE").as_deref(), Ok("original"));
        std::env::remove_var("TESTENV_PROBE");
    }

    #[test]
    #[serial]
    fn test_remove_restores_on_drop() {
        std::env::set_var("TESTENV_REMOVED", "kept");
        {
            let mut guard = TestEnv::default();
            guard.remove("TESTENV_REMOVED");
            assert!(std::env::var("TESTENV_REMOVED").is_err());
        }
        assert_eq!(std::env::var("TESTENV_REMOVED").as_deref(), Ok("kept"));
        std::env::remove_var("TESTENV_REMOVED");
    }
}
