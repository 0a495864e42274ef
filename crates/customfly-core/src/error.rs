//! Error types for the Customfly action engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire engine.
///
/// The first five variants form the action taxonomy surfaced to callers.
/// Only [`CustomflyError::Executor`] implies that something was written;
/// every other variant leaves stores and action records untouched.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum CustomflyError {
    /// Malformed proposal (unknown kind, missing payload, empty target list)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Operation not allowed from the action's current status
    #[error("Invalid state for action '{action_id}': {message}")]
    InvalidState { action_id: String, message: String },

    /// No executor registered for the action kind
    #[error("No executor registered for action kind '{0}'")]
    UnknownKind(String),

    /// The executor failed mid-apply; the action has been marked failed
    #[error("Executor failed for action '{action_id}': {message}")]
    Executor { action_id: String, message: String },

    /// Data access error (repository/storage layer)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON"
        message: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CustomflyError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an InvalidState error
    pub fn invalid_state(action_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidState {
            action_id: action_id.into(),
            message: message.into(),
        }
    }

    /// Creates an Executor error
    pub fn executor(action_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Executor {
            action_id: action_id.into(),
            message: message.into(),
        }
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an InvalidState error
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }

    /// Check if this is an UnknownKind error
    pub fn is_unknown_kind(&self) -> bool {
        matches!(self, Self::UnknownKind(_))
    }

    /// Check if this is an Executor error
    pub fn is_executor(&self) -> bool {
        matches!(self, Self::Executor { .. })
    }

    /// Returns true when the failure was recorded against an action and may
    /// require cleanup. All other variants mean nothing happened.
    pub fn has_side_effects(&self) -> bool {
        self.is_executor()
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for CustomflyError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for CustomflyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for CustomflyError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for CustomflyError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, CustomflyError>`.
pub type Result<T> = std::result::Result<T, CustomflyError>;
