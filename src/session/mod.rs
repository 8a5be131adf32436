pub mod runner;
pub mod session_model;

pub use runner::{LoadedPage, SessionOutcome, SessionRunner, build_page};
pub use session_model::{DocumentSpec, NodeSpec, RecordingSession, SessionEvent};

use crate::error::{SessionError, SessionResult};

/// Reads a session from a YAML file.
pub fn load_session(path: &str) -> SessionResult<RecordingSession> {
    let content = std::fs::read_to_string(path).map_err(|source| SessionError::Read {
        path: path.to_string(),
        source,
    })?;
    Ok(serde_yaml::from_str(&content)?)
}
