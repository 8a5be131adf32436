use std::rc::Rc;

use reqwest::blocking::Client;
use tracing::debug;

use crate::error::{TransportError, TransportResult};
use crate::settings::{DEFAULT_ZAP_KEY, DEFAULT_ZAP_URL, SettingsStore, ZAP_KEY, ZAP_URL};

/// Marker of a callback URL handed out by ZAP when it launches the browser.
pub const CALLBACK_URL_MARKER: &str = "/zapCallBackUrl/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiAction {
    ReportObject,
    ReportEvent,
    ReportZestStatement,
}

impl ApiAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReportObject => "reportObject",
            Self::ReportEvent => "reportEvent",
            Self::ReportZestStatement => "reportZestStatement",
        }
    }

    /// Form field carrying the JSON payload.
    pub fn field(&self) -> &'static str {
        match self {
            Self::ReportObject => "objectJson",
            Self::ReportEvent => "eventJson",
            Self::ReportZestStatement => "statementJson",
        }
    }
}

/// Endpoint for `action`. A callback URL already identifies the endpoint and
/// is used as is.
pub fn zap_api_url(base: &str, action: ApiAction) -> String {
    if base.contains(CALLBACK_URL_MARKER) {
        return base.to_string();
    }
    format!("{}JSON/client/action/{}/", base, action.as_str())
}

/// Background → ZAP hop.
pub trait Forwarder {
    fn forward(&self, action: ApiAction, payload: &str) -> TransportResult<()>;
}

/// Posts payloads to the ZAP client API. URL and key are read from settings
/// on every call so that `zapDetails` updates apply immediately.
pub struct ZapClient {
    client: Client,
    settings: Rc<dyn SettingsStore>,
}

impl ZapClient {
    pub fn new(settings: Rc<dyn SettingsStore>) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }
}

impl Forwarder for ZapClient {
    fn forward(&self, action: ApiAction, payload: &str) -> TransportResult<()> {
        let base = self.settings.get_str(ZAP_URL, DEFAULT_ZAP_URL);
        let key = self.settings.get_str(ZAP_KEY, DEFAULT_ZAP_KEY);
        let url = zap_api_url(&base, action);
        debug!(url = %url, action = action.as_str(), "forwarding to ZAP");

        let response = self
            .client
            .post(&url)
            .form(&[(action.field(), payload), ("apikey", key.as_str())])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                action: action.as_str().to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
