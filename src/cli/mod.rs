//! CLI command handlers.
//!
//! Handlers are invoked by main.rs and return the process exit code, so they
//! stay testable without spawning the binary.

mod config;
mod validate;

pub use config::{run_config_init, run_config_path, run_config_show, run_schema};
pub use validate::run_validate;

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Configuration is valid / command succeeded
    pub const SUCCESS: i32 = 0;
    /// Configuration was rejected
    pub const INVALID_CONFIG: i32 = 1;
}
