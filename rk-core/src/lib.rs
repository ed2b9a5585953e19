//! Restkit Core - Foundation types, error handling, configuration, and logging.
//!
//! This crate provides the shared foundation used by the other Restkit crates:
//! - Client configuration (base URI, token, identity headers)
//! - A unified error type for construction, transport, and parsing failures
//! - Structured logging with tracing
//! - Platform directory lookup and common constants

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod platform;

// Re-export commonly used items at the crate root
pub use config::AppConfig;
pub use error::{RkError, RkResult};
pub use logging::init_logging;
pub use platform::Platform;
