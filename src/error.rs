//! Error types for incremental join operations

use thiserror::Error;

use crate::stream::operators::JoinSide;

/// Result type alias for Tributary operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Tributary
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// An upstream row source failed. The joined output fails with it.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// A term could not be parsed from its N-Triples form
    #[error("Invalid term: {0}")]
    InvalidTerm(String),

    /// A variable name is not a valid SPARQL variable
    #[error("Invalid variable: {0}")]
    InvalidVariable(String),

    /// A join could not be configured
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Wraps an upstream failure with the side it came from.
    pub fn upstream(side: JoinSide, message: impl std::fmt::Display) -> Self {
        Error::Upstream(format!("{} source: {}", side, message))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<oxigraph::model::TermParseError> for Error {
    fn from(err: oxigraph::model::TermParseError) -> Self {
        Error::InvalidTerm(err.to_string())
    }
}

impl From<oxigraph::model::VariableNameParseError> for Error {
    fn from(err: oxigraph::model::VariableNameParseError) -> Self {
        Error::InvalidVariable(err.to_string())
    }
}
