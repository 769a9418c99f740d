//! Error handling for TradePilot
//!
//! This module defines the main error type used throughout the dispatcher
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for TradePilot
#[derive(Error, Debug)]
pub enum TradePilotError {
    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid plugin value: {0}")]
    InvalidPluginValue(String),

    #[error("Callback prefix already registered: {0}")]
    DuplicatePrefix(String),

    #[error("Callback data too long: {len} bytes (limit {limit})")]
    CallbackTooLong { len: usize, limit: usize },

    #[error("Executor error: {0}")]
    Executor(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for TradePilot operations
pub type Result<T> = std::result::Result<T, TradePilotError>;

impl TradePilotError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            TradePilotError::Telegram(_) => true,
            TradePilotError::Config(_) => false,
            TradePilotError::InvalidPluginValue(_) => true,
            TradePilotError::DuplicatePrefix(_) => false,
            TradePilotError::CallbackTooLong { .. } => true,
            TradePilotError::Executor(_) => true,
            TradePilotError::InvalidInput(_) => true,
            TradePilotError::PermissionDenied(_) => true,
            TradePilotError::Io(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TradePilotError::Config(_) => ErrorSeverity::Critical,
            TradePilotError::DuplicatePrefix(_) => ErrorSeverity::Critical,
            TradePilotError::PermissionDenied(_) => ErrorSeverity::Warning,
            TradePilotError::CallbackTooLong { .. } => ErrorSeverity::Warning,
            TradePilotError::InvalidPluginValue(_) => ErrorSeverity::Info,
            TradePilotError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
