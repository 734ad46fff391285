//! Error types for the SOLIDserver provider
//!
//! Two kinds of failure matter to callers: transport errors (the HTTP call
//! itself failed) which are surfaced verbatim, and application errors (the
//! appliance answered, but not with what the operation needed) which carry
//! the object name and the remote `errmsg` when one was returned.

use thiserror::Error;

/// Result type alias for provider operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the SOLIDserver provider
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP layer failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// The appliance rejected the request or answered with something unusable
    #[error("Unable to {action} {object}: {name}{}", remote_suffix(.message))]
    Application {
        /// Lifecycle action ("create", "update", "delete")
        action: &'static str,
        /// Human object label (e.g. "DNS forward zone")
        object: &'static str,
        /// User-facing name of the object
        name: String,
        /// Remote `errmsg`, when the appliance returned one
        message: Option<String>,
    },

    /// Read could not resolve the object
    #[error("Unable to find {object}: {name}")]
    NotFound {
        /// Human object label
        object: &'static str,
        /// User-facing name (or oid when no name is known)
        name: String,
    },

    /// Import could not resolve the object
    #[error("Unable to find and import {object} (oid): {id}")]
    Import {
        /// Human object label
        object: &'static str,
        /// The oid that was requested
        id: String,
    },

    /// The connected appliance is too old for this object type
    #[error("{object} is not supported in this SOLIDserver version ({actual} < {required})")]
    Unsupported {
        /// Human object label
        object: &'static str,
        /// Minimum version (e.g. 710 for 7.1.0)
        required: u32,
        /// Version reported by the appliance
        actual: u32,
    },

    /// The resource type does not implement this lifecycle operation
    #[error("{object} does not support {operation}")]
    UnsupportedOperation {
        /// Human object label
        object: &'static str,
        /// Lifecycle operation ("update", "import")
        operation: &'static str,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid resource input (schema validation)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource type lookup failures
    #[error("Registry error: {0}")]
    Registry(String),

    /// State store-related errors
    #[error("State store error: {0}")]
    StateStore(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

fn remote_suffix(message: &Option<String>) -> String {
    match message {
        Some(msg) => format!(" ({})", msg),
        None => String::new(),
    }
}

impl Error {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an application error
    pub fn application(
        action: &'static str,
        object: &'static str,
        name: impl Into<String>,
        message: Option<String>,
    ) -> Self {
        Self::Application {
            action,
            object,
            name: name.into(),
            message,
        }
    }

    /// Create a "not found" error
    pub fn not_found(object: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            object,
            name: name.into(),
        }
    }

    /// Create an import error
    pub fn import(object: &'static str, id: impl Into<String>) -> Self {
        Self::Import {
            object,
            id: id.into(),
        }
    }

    /// Create an unsupported operation error
    pub fn unsupported_operation(object: &'static str, operation: &'static str) -> Self {
        Self::UnsupportedOperation { object, operation }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a registry error
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }

    /// Create a state store error
    pub fn state_store(msg: impl Into<String>) -> Self {
        Self::StateStore(msg.into())
    }

    /// Whether this error means the remote object could not be found
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Import { .. })
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
