//! Logging utilities.
//!
//! Centralizes logger initialization. Intentionally small; everything else
//! goes through the standard `log` facade.

mod init;

pub use init::{LoggingConfig, init_logging};
