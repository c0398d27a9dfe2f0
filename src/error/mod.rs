//! Error handling for cms-search.
//!
//! This module provides:
//! - [`SearchError`]: The main error enum for all search and indexing operations
//! - [`ErrorCode`]: Standardized error codes for machine parsing

mod codes;

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use codes::ErrorCode;

/// Main error type for cms-search operations.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error(
        "Cannot resolve schema for index '{index}': provide an explicit schema or at least one record"
    )]
    SchemaUnresolved { index: String },

    #[error("Unknown search driver: {0}")]
    UnknownDriver(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Content error in {path}: {reason}")]
    Content { path: String, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Lock failed: {0}")]
    LockFailed(String),
}

impl SearchError {
    /// Get the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::SerializationError,
            Self::Config(_) => ErrorCode::ConfigInvalid,
            Self::SchemaUnresolved { .. } => ErrorCode::SchemaUnresolved,
            Self::UnknownDriver(_) => ErrorCode::DriverUnknown,
            Self::Unsupported(_) => ErrorCode::EngineUnsupported,
            Self::Content { .. } => ErrorCode::ContentInvalid,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::LockFailed(_) => ErrorCode::LockFailed,
        }
    }

    /// Get context information for this error as JSON.
    #[must_use]
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::SchemaUnresolved { index } => Some(serde_json::json!({ "index": index })),
            Self::Content { path, reason } => {
                Some(serde_json::json!({ "path": path, "reason": reason }))
            }
            Self::UnknownDriver(driver) => Some(serde_json::json!({ "driver": driver })),
            _ => None,
        }
    }

    /// Convert this error to a structured error.
    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError {
            code: self.code(),
            numeric_code: self.code().numeric(),
            message: self.to_string(),
            context: self.context(),
        }
    }
}

/// A structured error with machine-readable code and context.
///
/// Emitted by the CLI in robot mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// The error code (e.g., "SCHEMA_UNRESOLVED")
    pub code: ErrorCode,

    /// The numeric error code (e.g., 201)
    pub numeric_code: u16,

    /// Human-readable error message
    pub message: String,

    /// Additional context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

pub type Result<T> = std::result::Result<T, SearchError>;
