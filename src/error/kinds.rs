use std::{fmt, io, path::PathBuf};

/// Crate-wide `Result` type using [`ExportError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Top-level error type for export operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum ExportError {
    /// Invalid or missing user-supplied configuration.
    Config(ConfigError),

    /// Backend call failed or returned a non-success status.
    Transport(TransportError),

    /// I/O errors while writing the destination.
    Io(io::Error),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// No API token supplied via flag or environment.
    MissingToken,

    /// API token cannot be sent as a request header.
    InvalidToken,

    /// Output format selector not recognized.
    UnknownFormat(String),

    /// Output path already exists as a file.
    OutputExists(PathBuf),

    /// Output path exists but is not a file.
    OutputNotAFile(PathBuf),

    /// Raw query supplied on stdin could not be parsed.
    InvalidQuery(String),
}

/// Transport-specific errors. Never retried.
#[derive(Debug)]
pub enum TransportError {
    /// Request could not be executed at all.
    Request(reqwest::Error),

    /// Backend answered with a non-success status. The body is the
    /// backend's own error payload, surfaced verbatim.
    Status { status: u16, body: String },

    /// Response body did not match the scroll envelope.
    MalformedResponse(String),
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Config(e) => write!(f, "Configuration error: {e}"),
            ExportError::Transport(e) => write!(f, "Transport error: {e}"),
            ExportError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingToken => write!(
                f,
                "API token not provided, please provide one via cli flag --api-token or envvar LOGZIO_API_TOKEN"
            ),
            ConfigError::InvalidToken => {
                write!(f, "API token is not a valid header value")
            }
            ConfigError::UnknownFormat(format) => {
                write!(f, "Unrecognized format: {format}")
            }
            ConfigError::OutputExists(path) => {
                write!(f, "File exists: {}", path.display())
            }
            ConfigError::OutputNotAFile(path) => write!(
                f,
                "Directory not a valid output, needs to be a file: {}",
                path.display()
            ),
            ConfigError::InvalidQuery(msg) => write!(
                f,
                "Can't parse JSON query from stdin ({msg}). Either provide a query or use --search"
            ),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Request(e) => write!(f, "Request failed: {e}"),
            TransportError::Status { status, body } => {
                write!(f, "Unexpected status code received: {status}: {body}")
            }
            TransportError::MalformedResponse(msg) => {
                write!(f, "Malformed scroll response: {msg}")
            }
        }
    }
}

impl std::error::Error for ExportError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for TransportError {}

/* ========================= Conversions to ExportError ========================= */

impl From<ConfigError> for ExportError {
    fn from(err: ConfigError) -> Self {
        ExportError::Config(err)
    }
}

impl From<TransportError> for ExportError {
    fn from(err: TransportError) -> Self {
        ExportError::Transport(err)
    }
}

impl From<io::Error> for ExportError {
    fn from(err: io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl From<reqwest::Error> for ExportError {
    fn from(err: reqwest::Error) -> Self {
        ExportError::Transport(TransportError::Request(err))
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Io(err.into())
    }
}
