pub mod script;
pub mod statement;

pub use script::{ScriptEnvelope, ScriptMessage, ScriptParameters, ZestScript};
pub use statement::{DEFAULT_WINDOW_HANDLE, ElementAction, Statement};
