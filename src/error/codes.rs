//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 1xx: Config errors
//! - 2xx: Index errors
//! - 3xx: Search errors
//! - 4xx: Storage errors
//! - 9xx: Internal errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for robot mode output.
///
/// Each variant maps to a numeric code (e.g., `SchemaUnresolved` -> E201).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Config errors (1xx)
    // ========================================
    /// E101: Config file has invalid syntax or values
    ConfigInvalid,
    /// E102: The configured search driver is not known
    DriverUnknown,

    // ========================================
    // Index errors (2xx)
    // ========================================
    /// E201: Neither an explicit schema nor a sample record is available
    SchemaUnresolved,
    /// E202: A content file could not be read or parsed
    ContentInvalid,
    /// E203: The store lock could not be acquired
    LockFailed,

    // ========================================
    // Search errors (3xx)
    // ========================================
    /// E301: The engine does not support the requested operation
    EngineUnsupported,

    // ========================================
    // Storage errors (4xx)
    // ========================================
    /// E401: Database operation failed
    DatabaseError,
    /// E402: IO operation failed
    IoError,
    /// E403: Serialization/deserialization failed
    SerializationError,

    // ========================================
    // Internal errors (9xx)
    // ========================================
    /// E901: Generic not found (catch-all)
    NotFound,
}

impl ErrorCode {
    /// Get the numeric error code (e.g., `SchemaUnresolved` -> 201).
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::ConfigInvalid => 101,
            Self::DriverUnknown => 102,

            Self::SchemaUnresolved => 201,
            Self::ContentInvalid => 202,
            Self::LockFailed => 203,

            Self::EngineUnsupported => 301,

            Self::DatabaseError => 401,
            Self::IoError => 402,
            Self::SerializationError => 403,

            Self::NotFound => 901,
        }
    }

    /// Get the error code as a string (e.g., "E201").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{}", self.numeric())
    }

    /// Get the category name for this error code.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.numeric() / 100 {
            1 => "config",
            2 => "index",
            3 => "search",
            4 => "storage",
            _ => "internal",
        }
    }

    /// Returns an iterator over all error codes.
    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::ConfigInvalid,
            Self::DriverUnknown,
            Self::SchemaUnresolved,
            Self::ContentInvalid,
            Self::LockFailed,
            Self::EngineUnsupported,
            Self::DatabaseError,
            Self::IoError,
            Self::SerializationError,
            Self::NotFound,
        ]
        .into_iter()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code_string())
    }
}
