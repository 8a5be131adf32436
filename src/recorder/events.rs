use serde::{Deserialize, Serialize};

use crate::dom::{DocumentId, NodeId};

/// Raw UI event as delivered by the browser to a document listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiEvent {
    pub document: DocumentId,
    pub target: NodeId,
    pub kind: UiEventKind,
    /// Event timestamp as reported by the browser. Repeated Enter keydowns
    /// share it.
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEventKind {
    Click,
    /// The target's value changed; the new value is read from the page.
    Change,
    KeyDown { key: String },
    Scroll,
}

impl UiEvent {
    pub fn click(document: DocumentId, target: NodeId, timestamp: u64) -> Self {
        Self {
            document,
            target,
            kind: UiEventKind::Click,
            timestamp,
        }
    }

    pub fn change(document: DocumentId, target: NodeId, timestamp: u64) -> Self {
        Self {
            document,
            target,
            kind: UiEventKind::Change,
            timestamp,
        }
    }

    pub fn key_down(document: DocumentId, target: NodeId, key: &str, timestamp: u64) -> Self {
        Self {
            document,
            target,
            kind: UiEventKind::KeyDown {
                key: key.to_string(),
            },
            timestamp,
        }
    }

    pub fn scroll(document: DocumentId, target: NodeId, timestamp: u64) -> Self {
        Self {
            document,
            target,
            kind: UiEventKind::Scroll,
            timestamp,
        }
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            UiEventKind::Click => "click",
            UiEventKind::Change => "change",
            UiEventKind::KeyDown { .. } => "keydown",
            UiEventKind::Scroll => "scroll",
        }
    }
}
