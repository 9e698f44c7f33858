//! Application configuration.
//!
//! Separates immutable static configuration ([`AppConfig`]) from mutable
//! per-invocation options ([`RuntimeOptions`]). An `AppConfig` never changes
//! after construction; "modifying" one always produces a new instance via
//! [`AppConfig::with_overrides`].

use crate::env::EnvSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

const DEFAULT_APP_NAME: &str = "scaffold";

/// Set to "true" (case-insensitive) to enable debug mode.
pub const DEBUG_VAR: &str = "SCAFFOLD_DEBUG";
/// Set by the test-environment guard to disable telemetry during tests.
pub const DISABLE_TELEMETRY_VAR: &str = "SCAFFOLD_DISABLE_TELEMETRY";
/// Names the active environment ("test" under the test-environment guard).
pub const ENVIRONMENT_VAR: &str = "SCAFFOLD_ENV";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Override names a field the configuration does not declare
    #[error("unknown configuration field '{name}'")]
    UnknownField { name: String },

    /// Override value has the wrong type for the field
    #[error("invalid value for field '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Immutable application configuration.
///
/// Fields are private so a constructed value cannot be mutated; use
/// [`AppConfig::with_overrides`] to derive a modified copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    app_name: String,
    version: String,
    debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            debug: false,
        }
    }
}

impl AppConfig {
    /// Declared field names, the allow-list for [`AppConfig::with_overrides`].
    pub const FIELD_NAMES: [&'static str; 3] = ["app_name", "version", "debug"];

    /// Create configuration from an environment snapshot.
    ///
    /// Only `SCAFFOLD_DEBUG` is consulted: the exact value `"true"`
    /// (case-insensitive) enables debug mode; absent, empty, or any other
    /// value resolves to `false`. Feature flags fail safe rather than strict,
    /// so this never errors.
    pub fn from_env(env: &EnvSnapshot) -> Self {
        let debug = env
            .get(DEBUG_VAR)
            .is_some_and(|value| value.eq_ignore_ascii_case("true"));
        if debug {
            debug!("debug mode enabled via {DEBUG_VAR}");
        }
        Self {
            debug,
            ..Self::default()
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Derive a new configuration with the named fields overridden.
    ///
    /// `self` is never touched: a returned error means no configuration was
    /// produced, and the base remains valid as-is. A key outside
    /// [`AppConfig::FIELD_NAMES`] is rejected with
    /// [`ConfigError::UnknownField`]; a value of the wrong JSON type with
    /// [`ConfigError::InvalidValue`].
    pub fn with_overrides(&self, changes: &Map<String, Value>) -> ConfigResult<AppConfig> {
        let mut next = self.clone();
        for (key, value) in changes {
            match key.as_str() {
                "app_name" => next.app_name = expect_string(key, value)?,
                "version" => next.version = expect_string(key, value)?,
                "debug" => next.debug = expect_bool(key, value)?,
                other => {
                    return Err(ConfigError::UnknownField {
                        name: other.to_string(),
                    })
                }
            }
        }
        Ok(next)
    }
}

fn expect_string(field: &str, value: &Value) -> ConfigResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected a string, got {value}"),
        })
}

fn expect_bool(field: &str, value: &Value) -> ConfigResult<bool> {
    value.as_bool().ok_or_else(|| ConfigError::InvalidValue {
        field: field.to_string(),
        reason: format!("expected a boolean, got {value}"),
    })
}

/// Load configuration from the environment snapshot.
///
/// Main entry point for application configuration.
pub fn load_config(env: &EnvSnapshot) -> AppConfig {
    AppConfig::from_env(env)
}

/// Mutable runtime options controlling application behavior.
///
/// Created per invocation, mutated freely by the owning process, discarded
/// at process end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeOptions {
    pub verbose: bool,
    pub quiet: bool,
    pub dry_run: bool,
}

impl RuntimeOptions {
    pub fn new(verbose: bool, quiet: bool, dry_run: bool) -> Self {
        Self {
            verbose,
            quiet,
            dry_run,
        }
    }
}
