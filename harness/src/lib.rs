pub mod checks;
pub mod classifier;
pub mod hooks;
pub mod testenv;
pub mod timeout;

pub use checks::{run_all, CheckCommand, CheckError, CheckReport, CheckResult};
pub use classifier::{classify_and_order, Category, TestItem, ALL_LABEL, CHECK_LABEL};
pub use hooks::{CollectionHook, PolicyHooks, SetupHook};
pub use testenv::TestEnv;
pub use timeout::{base_timeout, TimeoutPolicy};
