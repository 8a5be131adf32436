pub mod background;
pub mod logger;
pub mod memory;
pub mod message;
pub mod zap;

pub use background::{Background, LocalChannel};
pub use logger::JsonlForwarder;
pub use memory::{MemoryForwarder, MemoryTransport};
pub use message::{Message, MessageKind, Reply, Transport, send_logged};
pub use zap::{ApiAction, Forwarder, ZapClient, zap_api_url};
