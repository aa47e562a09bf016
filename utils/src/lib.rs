//! Shared utilities for walletkit.

pub mod logging;

pub use logging::{init_tracing_with, LogFormat, LoggingError};
