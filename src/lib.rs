pub mod cli;
pub mod dom;
pub mod error;
pub mod locator;
pub mod recorder;
pub mod report;
pub mod session;
pub mod settings;
pub mod transport;
pub mod zest;

pub use error::{DomError, SessionError, TransportError, ZestError};
pub use locator::{ElementLocator, LocatorType};
pub use recorder::Recorder;
pub use report::ReportCache;
pub use zest::{Statement, ZestScript};
