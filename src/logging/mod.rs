//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Configurable log levels, overridable through `RUST_LOG`
//! - Console output on stderr
//! - JSON log files with daily or hourly rotation
//!
//! # Example
//!
//! ```no_run
//! use keepsake::logging::init_logging;
//! use keepsake::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(project_id = "proj-2024-sw", "Starting export");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use keepsake::log_retry_attempt;
///
/// log_retry_attempt!(2, 4, "connection reset");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying operation"
        );
    };
}

/// Log a failure with context
///
/// # Example
///
/// ```no_run
/// use keepsake::log_error_with_context;
/// use keepsake::domain::KeepsakeError;
///
/// let error = KeepsakeError::Configuration("storage.blob_root is missing".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = %$context,
            "Error occurred"
        );
    };
}
