use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::settings::{
    SettingsStore, ZAP_CLOSE_WINDOW_HANDLE, ZAP_ENABLE, ZAP_KEY, ZAP_SCRIPT_NAME, ZAP_URL,
};

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "zest-recorder",
    version,
    about = "Record page interactions as ZAP Zest scripts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: zest-recorder.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a recorded session file and save the resulting Zest script
    Record {
        /// Path to the session YAML file
        #[arg(long)]
        session: String,

        /// Output script path (default: zap-rec-<host><timestamp>.zst)
        #[arg(short, long)]
        output: Option<String>,

        /// ZAP base URL, e.g. http://localhost:8080/
        #[arg(long)]
        zap_url: Option<String>,

        /// ZAP API key
        #[arg(long)]
        api_key: Option<String>,

        /// Append forwarded payloads to this JSONL file instead of calling ZAP
        #[arg(long)]
        log_file: Option<String>,
    },

    /// Summarize a saved Zest script
    Inspect {
        /// Path to the .zst script
        #[arg(long)]
        script: String,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `zest-recorder.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub zap: ZapConfig,
    #[serde(default)]
    pub recorder: RecorderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZapConfig {
    pub url: Option<String>,

    pub api_key: Option<String>,

    /// Forward passive reports (objects and events)
    #[serde(default = "default_true")]
    pub enable: bool,
}

impl Default for ZapConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            enable: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderConfig {
    pub script_name: Option<String>,

    #[serde(default)]
    pub close_window_on_stop: bool,

    /// Used when a session file does not name its user agent
    pub user_agent: Option<String>,

    #[serde(default = "default_product")]
    pub product: String,

    #[serde(default = "default_version")]
    pub version: String,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            script_name: None,
            close_window_on_stop: false,
            user_agent: None,
            product: default_product(),
            version: default_version(),
        }
    }
}

// Serde default helpers
fn default_true() -> bool { true }
fn default_product() -> String { "ZAP Browser Extension".to_string() }
fn default_version() -> String { env!("CARGO_PKG_VERSION").to_string() }

impl AppConfig {
    /// Copies config values into the settings store. Unset values leave the
    /// store's defaults in place.
    pub fn seed_settings(&self, settings: &dyn SettingsStore) {
        if let Some(url) = &self.zap.url {
            settings.set(ZAP_URL, json!(url));
        }
        if let Some(key) = &self.zap.api_key {
            settings.set(ZAP_KEY, json!(key));
        }
        settings.set(ZAP_ENABLE, json!(self.zap.enable));
        if let Some(name) = &self.recorder.script_name {
            settings.set(ZAP_SCRIPT_NAME, json!(name));
        }
        settings.set(ZAP_CLOSE_WINDOW_HANDLE, json!(self.recorder.close_window_on_stop));
    }
}

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("zest-recorder.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}
