//! Per-category timeout policy.
//!
//! Each category carries a base timeout reflecting how long its tests are
//! allowed to take; CI machines are slower and shared, so a multiplier
//! stretches every base timeout when a CI environment is detected. An item
//! with an explicit timeout override is never touched by the policy.

use crate::classifier::{Category, TestItem};
use appkit::env::{EnvResult, EnvSnapshot};
use tracing::debug;

/// Base timeout in seconds for a category, before any CI multiplier.
///
/// `Other` has no timeout budget and gets none assigned.
pub fn base_timeout(category: Category) -> Option<f64> {
    match category {
        Category::Unit => Some(0.1),
        Category::Integration => Some(0.5),
        Category::E2e => Some(30.0),
        Category::Static => Some(60.0),
        Category::Other => None,
    }
}

/// Timeout assignment policy for a test run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeoutPolicy {
    pub ci_detected: bool,
    pub ci_multiplier: f64,
}

impl TimeoutPolicy {
    pub fn new(ci_detected: bool, ci_multiplier: f64) -> Self {
        Self {
            ci_detected,
            ci_multiplier,
        }
    }

    /// Build the policy from an environment snapshot.
    ///
    /// Fails if `CI_TIMEOUT_MULTIPLIER` is present but not a valid float;
    /// a policy is never constructed with a half-read environment.
    pub fn from_env(env: &EnvSnapshot) -> EnvResult<Self> {
        let policy = Self {
            ci_detected: env.ci_detected(),
            ci_multiplier: env.ci_timeout_multiplier()?,
        };
        debug!(
            ci_detected = policy.ci_detected,
            ci_multiplier = policy.ci_multiplier,
            "timeout policy loaded"
        );
        Ok(policy)
    }

    /// Multiplier actually applied: `ci_multiplier` inside CI, otherwise 1.0.
    pub fn effective_multiplier(&self) -> f64 {
        if self.ci_detected {
            self.ci_multiplier
        } else {
            1.0
        }
    }

    /// Assign a timeout to the item and return it.
    ///
    /// An explicit override wins unconditionally and the item is left
    /// unchanged. Otherwise the category's base timeout is scaled by the
    /// effective multiplier and stored on the item; `Other` and
    /// unclassified items get no timeout.
    pub fn assign_timeout(&self, item: &mut TestItem) -> Option<f64> {
        if let Some(seconds) = item.timeout_override {
            return Some(seconds);
        }

        let assigned = item
            .category
            .and_then(base_timeout)
            .map(|base| base * self.effective_multiplier());
        item.timeout = assigned;
        assigned
    }
}
