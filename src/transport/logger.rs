use std::{fs::OpenOptions, io::Write, sync::Mutex};

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::TransportResult;
use crate::transport::zap::{ApiAction, Forwarder};

/// One forwarded payload as written to the JSONL log.
#[derive(Debug, Serialize)]
struct ForwardRecord<'a> {
    action: &'a str,
    field: &'a str,
    payload: Value,
}

/// Appends every forwarded payload to a JSONL file instead of calling ZAP.
/// An unopenable file disables logging rather than failing the recorder.
pub struct JsonlForwarder {
    file: Option<Mutex<std::fs::File>>,
}

impl JsonlForwarder {
    pub fn new(path: &str) -> Self {
        let file = OpenOptions::new().create(true).append(true).open(path);

        match file {
            Ok(f) => Self {
                file: Some(Mutex::new(f)),
            },
            Err(e) => {
                warn!(path, error = %e, "could not open forward log");
                Self { file: None }
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }
}

impl Forwarder for JsonlForwarder {
    fn forward(&self, action: ApiAction, payload: &str) -> TransportResult<()> {
        let file_mutex = match &self.file {
            Some(f) => f,
            None => return Ok(()),
        };

        // Payloads are JSON documents; keep anything else as a plain string.
        let payload = serde_json::from_str(payload)
            .unwrap_or_else(|_| Value::String(payload.to_string()));
        let json = serde_json::to_string(&ForwardRecord {
            action: action.as_str(),
            field: action.field(),
            payload,
        })?;

        let mut file = match file_mutex.lock() {
            Ok(f) => f,
            Err(e) => {
                warn!(error = %e, "forward log lock poisoned");
                return Ok(());
            }
        };

        writeln!(file, "{}", json)?;
        Ok(())
    }
}
