use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;

use crate::error::TransportResult;
use crate::zest::ScriptMessage;

/// Kinds of message the in-page half sends to the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageKind {
    ReportObject,
    ReportEvent,
    ZestScript,
    SaveZestScript,
    ResetZestScript,
    StopRecording,
    StartRecording,
    SetSaveScriptEnable,
    ZapDetails,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReportObject => "reportObject",
            Self::ReportEvent => "reportEvent",
            Self::ZestScript => "zestScript",
            Self::SaveZestScript => "saveZestScript",
            Self::ResetZestScript => "resetZestScript",
            Self::StopRecording => "stopRecording",
            Self::StartRecording => "startRecording",
            Self::SetSaveScriptEnable => "setSaveScriptEnable",
            Self::ZapDetails => "zapDetails",
        }
    }
}

/// `{type, data}` envelope. `data` is usually a JSON document encoded as a
/// string; `zapDetails` carries an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(default)]
    pub data: Value,
}

impl Message {
    pub fn new(kind: MessageKind, data: Value) -> Self {
        Self { kind, data }
    }

    pub fn text(kind: MessageKind, data: impl Into<String>) -> Self {
        Self::new(kind, Value::String(data.into()))
    }

    pub fn signal(kind: MessageKind) -> Self {
        Self::new(kind, Value::Null)
    }

    pub fn zap_details(zap_url: &str, zap_key: &str) -> Self {
        Self::new(
            MessageKind::ZapDetails,
            json!({ "zapurl": zap_url, "zapkey": zap_key }),
        )
    }

    /// `data` as text: strings verbatim, anything else as compact JSON.
    pub fn data_text(&self) -> String {
        match &self.data {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Ack,
    /// The indexed form of a statement that was appended.
    Statement(String),
    Script(ScriptMessage),
}

/// In-page → background channel. Delivery is FIFO per channel.
pub trait Transport {
    fn send(&self, message: Message) -> TransportResult<Reply>;
}

/// Fire-and-forget send: failures are logged and dropped.
pub fn send_logged(transport: &dyn Transport, message: Message) -> Option<Reply> {
    let kind = message.kind;
    match transport.send(message) {
        Ok(reply) => Some(reply),
        Err(e) => {
            warn!(kind = kind.as_str(), error = %e, "message not delivered");
            None
        }
    }
}
