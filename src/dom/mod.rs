pub mod page;
pub mod selector;
pub mod tree;
pub mod xpath;

pub use page::Page;
pub use tree::{Document, DocumentId, Element, NodeId, NodeKind};
