use std::cell::RefCell;
use std::collections::BTreeMap;

use serde_json::Value;

// ============================================================================
// Setting keys
// ============================================================================

pub const ZAP_URL: &str = "zapurl";
pub const ZAP_KEY: &str = "zapkey";
pub const ZAP_ENABLE: &str = "zapenable";
pub const ZAP_RECORDING_ACTIVE: &str = "zaprecordingactive";
pub const ZAP_SCRIPT_NAME: &str = "zapscriptname";
pub const ZAP_CLOSE_WINDOW_HANDLE: &str = "zapclosewindowhandle";
pub const DOWNLOAD_SCRIPT: &str = "downloadScript";
pub const INIT_SCRIPT: &str = "initScript";
pub const LOGIN_URL: &str = "loginUrl";
pub const START_TIME: &str = "startTime";

pub const DEFAULT_ZAP_URL: &str = "http://zap/";
pub const DEFAULT_ZAP_KEY: &str = "not set";

// ============================================================================
// Store
// ============================================================================

/// Key/value settings shared by the in-page and background halves.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&self, key: &str, value: Value);

    fn get_str(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            Some(Value::String(s)) => s,
            _ => default.to_string(),
        }
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
    }

    fn get_i64(&self, key: &str, default: i64) -> i64 {
        self.get(key).and_then(|v| v.as_i64()).unwrap_or(default)
    }
}

#[derive(Debug, Default)]
pub struct MemorySettings {
    values: RefCell<BTreeMap<String, Value>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        self.values.borrow_mut().insert(key.to_string(), value);
    }
}
