//! Error types for dialect resolution and SQL generation.

use thiserror::Error;

/// Exit code for configuration errors.
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code when no dialect matches the connection identity.
pub const EXIT_UNSUPPORTED_DIALECT: u8 = 2;
/// Exit code for metadata probe failures.
pub const EXIT_CONNECTION_ERROR: u8 = 3;
/// Exit code for inline-table and literal contract violations.
pub const EXIT_INPUT_ERROR: u8 = 4;
/// Exit code for registry validation failures.
pub const EXIT_VALIDATION_ERROR: u8 = 5;
/// Exit code for IO errors (missing files, etc.).
pub const EXIT_IO_ERROR: u8 = 7;

/// Main error type for dialect operations.
#[derive(Error, Debug)]
pub enum DialectError {
    /// No registered factory accepts the connection identity.
    #[error("Unsupported dialect: no registered dialect matches product '{product}' (version '{version}')")]
    UnsupportedDialect { product: String, version: String },

    /// Metadata probe against the live connection failed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Column/value arity mismatch when generating an inline table.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A descriptor chain is undefined or self-contradictory.
    #[error("Capability validation failed for '{tag}': {message}")]
    CapabilityValidation { tag: String, message: String },

    /// A literal value cannot be rendered as its declared logical type.
    #[error("Invalid {logical_type} literal: {value:?}")]
    InvalidLiteral { value: String, logical_type: String },

    /// Column index outside the result description.
    #[error("Column index {index} out of range (result has {count} columns)")]
    ColumnIndex { index: usize, count: usize },

    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DialectError {
    /// Create an UnsupportedDialect error.
    pub fn unsupported(product: impl Into<String>, version: impl Into<String>) -> Self {
        DialectError::UnsupportedDialect {
            product: product.into(),
            version: version.into(),
        }
    }

    /// Create a CapabilityValidation error.
    pub fn validation(tag: impl Into<String>, message: impl Into<String>) -> Self {
        DialectError::CapabilityValidation {
            tag: tag.into(),
            message: message.into(),
        }
    }

    /// Create an InvalidLiteral error.
    pub fn invalid_literal(value: impl Into<String>, logical_type: impl ToString) -> Self {
        DialectError::InvalidLiteral {
            value: value.into(),
            logical_type: logical_type.to_string(),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            DialectError::Config(_) | DialectError::Yaml(_) | DialectError::Json(_) => {
                EXIT_CONFIG_ERROR
            }
            DialectError::UnsupportedDialect { .. } => EXIT_UNSUPPORTED_DIALECT,
            DialectError::Connection(_) => EXIT_CONNECTION_ERROR,
            DialectError::SchemaMismatch(_)
            | DialectError::InvalidLiteral { .. }
            | DialectError::ColumnIndex { .. } => EXIT_INPUT_ERROR,
            DialectError::CapabilityValidation { .. } => EXIT_VALIDATION_ERROR,
            DialectError::Io(_) => EXIT_IO_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for dialect operations.
pub type Result<T> = std::result::Result<T, DialectError>;
