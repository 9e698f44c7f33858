//! Test classification and collection ordering.
//!
//! Discovered tests are assigned exactly one primary category derived from
//! their file path, then the collection is reordered into a stable partition:
//! static analysis first, then unit, integration, e2e, and finally anything
//! unrecognized. Items within a category keep their original relative order.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Marker applied to every classified item.
pub const ALL_LABEL: &str = "all";
/// Marker for the check suite (static + unit + integration).
pub const CHECK_LABEL: &str = "check";

/// Primary test category, derived once from the item's file path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Static,
    Unit,
    Integration,
    E2e,
    Other,
}

impl Category {
    /// Categories in execution order.
    pub const ORDERED: [Category; 5] = [
        Category::Static,
        Category::Unit,
        Category::Integration,
        Category::E2e,
        Category::Other,
    ];

    /// Fixed ordering used to partition collections.
    pub fn rank(self) -> usize {
        match self {
            Category::Static => 0,
            Category::Unit => 1,
            Category::Integration => 2,
            Category::E2e => 3,
            Category::Other => 4,
        }
    }

    /// Marker label for this category.
    pub fn label(self) -> &'static str {
        match self {
            Category::Static => "static",
            Category::Unit => "unit",
            Category::Integration => "integration",
            Category::E2e => "e2e",
            Category::Other => "other",
        }
    }

    /// Whether items of this category belong to the check suite.
    pub fn in_check_suite(self) -> bool {
        matches!(
            self,
            Category::Static | Category::Unit | Category::Integration
        )
    }

    /// Derive the category from whole path segments.
    ///
    /// Categories are tried in priority order over the entire path, so an
    /// item under both `static` and `unit` directories is `Static` no matter
    /// how the directories nest. No matching segment yields `Other`.
    pub fn from_path(path: &Path) -> Category {
        for category in [
            Category::Static,
            Category::Unit,
            Category::Integration,
            Category::E2e,
        ] {
            let matched = path
                .components()
                .filter_map(|component| component.as_os_str().to_str())
                .any(|segment| segment == category.label());
            if matched {
                return category;
            }
        }
        Category::Other
    }
}

/// Handle to a discovered test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestItem {
    /// Test name, unique within a collection.
    pub name: String,
    /// Source file the test was discovered in.
    pub path: PathBuf,
    /// Marker labels accumulated during classification.
    pub labels: Vec<String>,
    /// Primary category, set exactly once by [`classify_and_order`].
    pub category: Option<Category>,
    /// Explicit per-item timeout; the policy never touches items carrying one.
    pub timeout_override: Option<f64>,
    /// Timeout assigned by the policy, in seconds.
    pub timeout: Option<f64>,
}

impl TestItem {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            labels: Vec::new(),
            category: None,
            timeout_override: None,
            timeout: None,
        }
    }

    pub fn with_timeout_override(mut self, seconds: f64) -> Self {
        self.timeout_override = Some(seconds);
        self
    }

    pub fn add_label(&mut self, label: &str) {
        if !self.has_label(label) {
            self.labels.push(label.to_string());
        }
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|existing| existing == label)
    }
}

/// Classify each item by path, apply marker labels, and return the collection
/// reordered as a stable partition by category rank.
///
/// The output is a permutation of the input: same length, same items, with
/// original relative order preserved inside each category.
pub fn classify_and_order(items: Vec<TestItem>) -> Vec<TestItem> {
    let mut buckets: [Vec<TestItem>; 5] = Default::default();

    for mut item in items {
        let category = Category::from_path(&item.path);
        item.category = Some(category);
        if category != Category::Other {
            item.add_label(category.label());
        }
        if category.in_check_suite() {
            item.add_label(CHECK_LABEL);
        }
        item.add_label(ALL_LABEL);
        buckets[category.rank()].push(item);
    }

    for (category, bucket) in Category::ORDERED.iter().zip(&buckets) {
        debug!(
            category = category.label(),
            count = bucket.len(),
            "classified tests"
        );
    }

    buckets.into_iter().flatten().collect()
}
