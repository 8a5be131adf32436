use std::cell::RefCell;

use crate::error::TransportResult;
use crate::transport::message::{Message, MessageKind, Reply, Transport};
use crate::transport::zap::{ApiAction, Forwarder};

/// Transport that only records what was sent.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    sent: RefCell<Vec<Message>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Message> {
        self.sent.borrow().clone()
    }

    pub fn sent_of(&self, kind: MessageKind) -> Vec<Message> {
        self.sent
            .borrow()
            .iter()
            .filter(|m| m.kind == kind)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.sent.borrow_mut().clear();
    }
}

impl Transport for MemoryTransport {
    fn send(&self, message: Message) -> TransportResult<Reply> {
        self.sent.borrow_mut().push(message);
        Ok(Reply::Ack)
    }
}

/// Forwarder that records `(action, payload)` pairs.
#[derive(Debug, Default)]
pub struct MemoryForwarder {
    calls: RefCell<Vec<(ApiAction, String)>>,
}

impl MemoryForwarder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(ApiAction, String)> {
        self.calls.borrow().clone()
    }

    pub fn payloads(&self, action: ApiAction) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|(a, _)| *a == action)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

impl Forwarder for MemoryForwarder {
    fn forward(&self, action: ApiAction, payload: &str) -> TransportResult<()> {
        self.calls.borrow_mut().push((action, payload.to_string()));
        Ok(())
    }
}
