//! Error types for CLI operations

use dpop_proof::{DpopError, ErrorKind};
use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Proof or key rejected by the validation core
    #[error("{0}")]
    Dpop(#[from] DpopError),

    /// JWK argument is not JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading stdin or writing output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid command arguments
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

impl CliError {
    /// Hints for resolving the error
    #[must_use]
    pub fn suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::Dpop(e) => match e.kind() {
                ErrorKind::Claim => vec![
                    "Pass --now with the proof's iat to inspect an old proof",
                    "Widen the window with --max-age / --max-future",
                ],
                ErrorKind::MalformedProof | ErrorKind::MalformedEncoding => vec![
                    "Pass the raw DPoP header value, without a `DPoP ` prefix or quotes",
                ],
                ErrorKind::HttpBindingMismatch => vec![
                    "Strip the query, fragment and any ingress prefix from --htu",
                ],
                _ => vec![],
            },
            Self::Json(_) => vec!["The JWK must be a JSON object, e.g. '{\"kty\":\"EC\",...}'"],
            Self::InvalidArguments(_) => vec!["Use `-` to read the value from stdin"],
            Self::Io(_) => vec![],
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = std::result::Result<T, CliError>;
