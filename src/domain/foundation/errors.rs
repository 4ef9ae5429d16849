//! Error types for the domain layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be at most {max} characters, got {actual}")]
    TooLong {
        field: String,
        max: usize,
        actual: usize,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates a too-long validation error.
    pub fn too_long(field: impl Into<String>, max: usize, actual: usize) -> Self {
        ValidationError::TooLong {
            field: field.into(),
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error categories surfaced to callers.
///
/// Serialized in snake_case inside [`ErrorInfo`]; displayed as upper-case
/// codes in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad command, malformed chain, or unresolved parameter. Never executed.
    ValidationError,
    /// Several candidates matched; recoverable through clarification.
    AmbiguousMatch,
    /// No candidates at all.
    NotFound,
    /// A downstream store or API call failed.
    ToolExecutionError,
    /// Vector search unavailable or sparse; absorbed locally.
    RetrievalDegraded,
    /// Plan longer than the allowed maximum.
    ChainLengthExceeded,
    /// The same tool planned twice in a row.
    DuplicateTool,
    /// An I/O call exceeded its deadline.
    Timeout,
    /// The planning model failed or produced unusable output.
    PlanningError,
}

impl ErrorKind {
    /// Returns true for errors detected before any tool executes.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::ValidationError | Self::ChainLengthExceeded | Self::DuplicateTool
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::ValidationError => "VALIDATION_ERROR",
            ErrorKind::AmbiguousMatch => "AMBIGUOUS_MATCH",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::ToolExecutionError => "TOOL_EXECUTION_ERROR",
            ErrorKind::RetrievalDegraded => "RETRIEVAL_DEGRADED",
            ErrorKind::ChainLengthExceeded => "CHAIN_LENGTH_EXCEEDED",
            ErrorKind::DuplicateTool => "DUPLICATE_TOOL",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::PlanningError => "PLANNING_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// User-facing error description: a short message plus an optional hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error description.
    pub fn new(code: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Creates a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Creates a tool execution error.
    pub fn tool_execution(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ToolExecutionError, message)
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, message)
    }

    /// Attaches a suggestion for the user.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ErrorInfo {}
