//! docqa core library
//!
//! Foundational pieces shared by every docqa crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging initialisation
//! - Application configuration (env, YAML, CLI overrides)

pub mod config;
pub mod error;
pub mod logging;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
