//! Error handling for the trajectory safety auditor
//!
//! Every fallible library operation returns [`TrajSafeResult`]. Audit findings
//! are data, not errors, and live in `consistency_check`.

use thiserror::Error;

/// Main error type for trajsafe
#[derive(Error, Debug)]
pub enum TrajSafeError {
    #[error("Data error: {message}")]
    Data { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("External service call failed: {operation} - {source}")]
    ExternalService {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O operation failed: {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

/// Type alias for Result with TrajSafeError
pub type TrajSafeResult<T> = Result<T, TrajSafeError>;

impl TrajSafeError {
    /// Create a data error for a malformed or empty trajectory
    pub fn data(message: impl Into<String>) -> Self {
        Self::Data {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an external service error
    pub fn external_service(
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ExternalService {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Create a serialization error
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data { .. })
    }

    pub fn is_external_service(&self) -> bool {
        matches!(self, Self::ExternalService { .. })
    }
}

/// Convert from serde_json errors
impl From<serde_json::Error> for TrajSafeError {
    fn from(err: serde_json::Error) -> Self {
        TrajSafeError::serialization("json_operation", err)
    }
}

/// Convert from std::io errors
impl From<std::io::Error> for TrajSafeError {
    fn from(err: std::io::Error) -> Self {
        TrajSafeError::io("io_operation", err)
    }
}

/// CSV failures are input problems, so they surface as data errors
impl From<csv::Error> for TrajSafeError {
    fn from(err: csv::Error) -> Self {
        TrajSafeError::data(format!("invalid trajectory table: {err}"))
    }
}

/// Convert from figment errors
impl From<figment::Error> for TrajSafeError {
    fn from(err: figment::Error) -> Self {
        TrajSafeError::config(err.to_string())
    }
}
