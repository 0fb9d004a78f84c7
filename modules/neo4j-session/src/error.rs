use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    /// Anything the driver or server reported: connection, auth, query syntax,
    /// transient failures. Passed through untouched.
    #[error(transparent)]
    Driver(#[from] neo4rs::Error),

    #[error("No answer from {uri} within {timeout:?}")]
    ConnectTimeout { uri: String, timeout: Duration },

    #[error("Invalid {kind} identifier: {value:?}")]
    InvalidIdentifier { kind: &'static str, value: String },

    #[error("Refusing to delete every :{label} node: no match properties given")]
    EmptyMatch { label: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session already closed")]
    SessionClosed,
}

pub type Result<T, E = GraphError> = std::result::Result<T, E>;
