//! Harness hook seams.
//!
//! A test-discovery harness calls [`CollectionHook::on_collect`] once with
//! the full discovered collection before any test runs, and
//! [`SetupHook::on_setup`] per item right before that item runs. Both are
//! plain trait methods wired up by the host; there is no registration
//! mechanism beyond handing an implementation to the harness adapter.

use crate::classifier::{classify_and_order, TestItem};
use crate::timeout::TimeoutPolicy;
use appkit::env::{EnvResult, EnvSnapshot};

/// Invoked once after discovery, before any test runs.
pub trait CollectionHook {
    /// Transform the discovered collection into the collection to execute.
    fn on_collect(&self, items: Vec<TestItem>) -> Vec<TestItem>;
}

/// Invoked per item, immediately before the item runs.
pub trait SetupHook {
    fn on_setup(&self, item: &mut TestItem);
}

/// The production hook implementation: classification plus timeout policy.
#[derive(Debug, Clone, Copy)]
pub struct PolicyHooks {
    policy: TimeoutPolicy,
}

impl PolicyHooks {
    pub fn new(policy: TimeoutPolicy) -> Self {
        Self { policy }
    }

    /// Build hooks from an environment snapshot; fails if the snapshot
    /// carries an invalid CI multiplier.
    pub fn from_env(env: &EnvSnapshot) -> EnvResult<Self> {
        Ok(Self {
            policy: TimeoutPolicy::from_env(env)?,
        })
    }

    pub fn policy(&self) -> TimeoutPolicy {
        self.policy
    }
}

impl CollectionHook for PolicyHooks {
    fn on_collect(&self, items: Vec<TestItem>) -> Vec<TestItem> {
        classify_and_order(items)
    }
}

impl SetupHook for PolicyHooks {
    fn on_setup(&self, item: &mut TestItem) {
        self.policy.assign_timeout(item);
    }
}
