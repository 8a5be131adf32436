use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::error::{TransportError, TransportResult};
use crate::settings::{
    SettingsStore, ZAP_ENABLE, ZAP_KEY, ZAP_RECORDING_ACTIVE, ZAP_URL,
};
use crate::transport::message::{Message, MessageKind, Reply, Transport};
use crate::transport::zap::{ApiAction, Forwarder};
use crate::zest::ZestScript;

/// Privileged half of the extension: owns the script being recorded and
/// forwards reports to ZAP.
pub struct Background {
    script: ZestScript,
    forwarder: Rc<dyn Forwarder>,
    settings: Rc<dyn SettingsStore>,
    save_script_enabled: bool,
}

impl Background {
    pub fn new(forwarder: Rc<dyn Forwarder>, settings: Rc<dyn SettingsStore>) -> Self {
        Self {
            script: ZestScript::new(""),
            forwarder,
            settings,
            save_script_enabled: false,
        }
    }

    pub fn script(&self) -> &ZestScript {
        &self.script
    }

    pub fn save_script_enabled(&self) -> bool {
        self.save_script_enabled
    }

    pub fn handle(&mut self, message: Message) -> TransportResult<Reply> {
        debug!(kind = message.kind.as_str(), "background received message");
        match message.kind {
            MessageKind::ReportObject => {
                self.forward_report(ApiAction::ReportObject, &message);
                Ok(Reply::Ack)
            }
            MessageKind::ReportEvent => {
                self.forward_report(ApiAction::ReportEvent, &message);
                Ok(Reply::Ack)
            }
            MessageKind::ZestScript => {
                let annotated = self.script.add_statement(&message.data_text())?;
                self.forward(ApiAction::ReportZestStatement, &annotated);
                Ok(Reply::Statement(annotated))
            }
            MessageKind::SaveZestScript => {
                let saved = self.script.script_message(self.settings.as_ref())?;
                Ok(Reply::Script(saved))
            }
            MessageKind::ResetZestScript => {
                self.script.reset();
                info!("script reset");
                Ok(Reply::Ack)
            }
            MessageKind::StartRecording => {
                self.settings.set(ZAP_RECORDING_ACTIVE, json!(true));
                info!("recording started");
                Ok(Reply::Ack)
            }
            MessageKind::StopRecording => {
                self.settings.set(ZAP_RECORDING_ACTIVE, json!(false));
                info!(statements = self.script.statement_count(), "recording stopped");
                Ok(Reply::Ack)
            }
            MessageKind::SetSaveScriptEnable => {
                self.save_script_enabled = match &message.data {
                    Value::Bool(enabled) => *enabled,
                    _ => self.script.statement_count() > 0,
                };
                Ok(Reply::Ack)
            }
            MessageKind::ZapDetails => {
                self.update_zap_details(&message.data);
                Ok(Reply::Ack)
            }
        }
    }

    fn forward_report(&self, action: ApiAction, message: &Message) {
        if !self.settings.get_bool(ZAP_ENABLE, true) {
            debug!(action = action.as_str(), "reporting disabled, dropping");
            return;
        }
        self.forward(action, &message.data_text());
    }

    fn forward(&self, action: ApiAction, payload: &str) {
        if let Err(e) = self.forwarder.forward(action, payload) {
            warn!(action = action.as_str(), error = %e, "forwarding to ZAP failed");
        }
    }

    fn update_zap_details(&self, data: &Value) {
        let Some(url) = data.get("zapurl").and_then(Value::as_str) else {
            warn!("zapDetails without zapurl ignored");
            return;
        };
        let key = data.get("zapkey").and_then(Value::as_str).unwrap_or("");
        info!(url, "updating ZAP details");
        self.settings.set(ZAP_URL, json!(url));
        self.settings.set(ZAP_KEY, json!(key));
    }
}

/// Same-process channel to a shared `Background`.
#[derive(Clone)]
pub struct LocalChannel {
    background: Rc<RefCell<Background>>,
}

impl LocalChannel {
    pub fn new(background: Rc<RefCell<Background>>) -> Self {
        Self { background }
    }

    pub fn background(&self) -> Rc<RefCell<Background>> {
        Rc::clone(&self.background)
    }
}

impl Transport for LocalChannel {
    fn send(&self, message: Message) -> TransportResult<Reply> {
        let mut background = self
            .background
            .try_borrow_mut()
            .map_err(|_| TransportError::Closed("background is busy".to_string()))?;
        background.handle(message)
    }
}
