//! Error handling for EventDesk
//!
//! This module defines the main error type used throughout the application
//! and the coarse error taxonomy exposed to callers.

use serde::Serialize;
use thiserror::Error;

/// Main error type for EventDesk
#[derive(Error, Debug)]
pub enum EventDeskError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: i64 },

    #[error("Registration not found: {registration_id}")]
    RegistrationNotFound { registration_id: i64 },

    #[error("Validation failed: {message}")]
    Validation { message: String, fields: Vec<String> },

    #[error("Event {event_id} is full ({max_participants} participants)")]
    CapacityExceeded { event_id: i64, max_participants: i32 },

    #[error("Invalid status value: {0}")]
    InvalidStatus(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for EventDesk operations
pub type Result<T> = std::result::Result<T, EventDeskError>;

/// Machine-readable error kind reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Validation,
    CapacityExceeded,
    Internal,
}

impl EventDeskError {
    /// Build a validation error from a message without field details
    pub fn validation(message: impl Into<String>) -> Self {
        EventDeskError::Validation {
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Build a validation error naming every offending field
    pub fn invalid_fields(message: impl Into<String>, fields: Vec<String>) -> Self {
        EventDeskError::Validation {
            message: message.into(),
            fields,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EventDeskError::EventNotFound { .. } => ErrorKind::NotFound,
            EventDeskError::RegistrationNotFound { .. } => ErrorKind::NotFound,
            EventDeskError::Validation { .. } => ErrorKind::Validation,
            EventDeskError::InvalidStatus(_) => ErrorKind::Validation,
            EventDeskError::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            EventDeskError::Database(_)
            | EventDeskError::Migration(_)
            | EventDeskError::Config(_)
            | EventDeskError::Storage(_)
            | EventDeskError::Serialization(_)
            | EventDeskError::Io(_) => ErrorKind::Internal,
        }
    }

    /// Offending field labels for validation errors, empty otherwise
    pub fn fields(&self) -> &[String] {
        match self {
            EventDeskError::Validation { fields, .. } => fields,
            _ => &[],
        }
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            EventDeskError::Database(_) => false,
            EventDeskError::Migration(_) => false,
            EventDeskError::Config(_) => false,
            EventDeskError::EventNotFound { .. } => false,
            EventDeskError::RegistrationNotFound { .. } => false,
            EventDeskError::Validation { .. } => false,
            EventDeskError::CapacityExceeded { .. } => true,
            EventDeskError::InvalidStatus(_) => false,
            EventDeskError::Storage(_) => true,
            EventDeskError::Serialization(_) => false,
            EventDeskError::Io(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EventDeskError::Database(_) => ErrorSeverity::Critical,
            EventDeskError::Migration(_) => ErrorSeverity::Critical,
            EventDeskError::Config(_) => ErrorSeverity::Critical,
            EventDeskError::Validation { .. } => ErrorSeverity::Info,
            EventDeskError::InvalidStatus(_) => ErrorSeverity::Info,
            EventDeskError::EventNotFound { .. } => ErrorSeverity::Info,
            EventDeskError::RegistrationNotFound { .. } => ErrorSeverity::Info,
            EventDeskError::CapacityExceeded { .. } => ErrorSeverity::Warning,
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
