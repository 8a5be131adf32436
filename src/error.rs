use thiserror::Error;

/// Failures raised by the in-memory page model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    #[error("invalid xpath: {0}")]
    InvalidXPath(String),

    /// The frame's document lives on another origin and cannot be read.
    #[error("blocked a frame with origin {parent_origin} from accessing cross-origin frame {frame_url}")]
    CrossOrigin {
        parent_origin: String,
        frame_url: String,
    },

    #[error("unknown document {0}")]
    UnknownDocument(usize),

    #[error("node {0} is not an element")]
    NotAnElement(usize),
}

/// Failures while building, parsing or serializing Zest statements and scripts.
#[derive(Debug, Error)]
pub enum ZestError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid {element_type} statement: {reason}")]
    InvalidStatement {
        element_type: &'static str,
        reason: String,
    },
}

/// Failures on the in-page → background channel or the background → ZAP hop.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ZAP rejected {action} with status {status}")]
    Status { action: String, status: u16 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Script(#[from] ZestError),

    #[error("channel closed: {0}")]
    Closed(String),
}

/// Failures while loading or replaying a recorded session file.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("session has no document named '{0}'")]
    UnknownDocument(String),

    #[error("no element matches '{selector}' in document '{document}'")]
    TargetNotFound { document: String, selector: String },

    #[error(transparent)]
    Dom(#[from] DomError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("background did not return a script")]
    MissingScript,
}

pub type DomResult<T> = std::result::Result<T, DomError>;
pub type ZestResult<T> = std::result::Result<T, ZestError>;
pub type TransportResult<T> = std::result::Result<T, TransportError>;
pub type SessionResult<T> = std::result::Result<T, SessionError>;
