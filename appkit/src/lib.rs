pub mod config;
pub mod env;

pub use config::{load_config, AppConfig, ConfigError, ConfigResult, RuntimeOptions};
pub use env::{EnvError, EnvResult, EnvSnapshot};

pub mod prelude {
    pub use crate::config::*;
    pub use crate::env::*;
}
