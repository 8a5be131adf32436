use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::report::PageStorage;

/// A page and the interactions to replay against it, loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordingSession {
    /// Script title used when no `zapscriptname` is configured
    pub name: String,

    /// User agent the recorder reports; decides the launch browser
    #[serde(default)]
    pub user_agent: String,

    /// Open the script with a comment and a browser launch
    #[serde(default = "default_true")]
    pub init_script: bool,

    /// URL for the launch statement (defaults to the top document's URL)
    #[serde(default)]
    pub login_url: String,

    /// Epoch millis the session clock starts at
    #[serde(default = "default_clock_start")]
    pub clock_start: i64,

    /// Report page structure and storage alongside recording
    #[serde(default = "default_true")]
    pub report_page: bool,

    /// Documents of the page; the first one is the top-level document
    pub documents: Vec<DocumentSpec>,

    #[serde(default)]
    pub storage: PageStorage,

    /// Ordered interactions
    #[serde(default)]
    pub events: Vec<SessionEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentSpec {
    pub name: String,
    pub url: String,
    /// Children of `body`
    #[serde(default)]
    pub body: Vec<NodeSpec>,
}

/// One element and its subtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NodeSpec {
    pub tag: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Initial live value of a form control
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// For `frame` / `iframe`: name of the document it shows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

/// A single replayed interaction. `document` defaults to the top document
/// and `target` is a CSS selector within it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SessionEvent {
    Click {
        #[serde(default)]
        document: Option<String>,
        target: String,
    },

    /// Sets the target's value, then fires `change`
    Change {
        #[serde(default)]
        document: Option<String>,
        target: String,
        value: String,
    },

    Keydown {
        #[serde(default)]
        document: Option<String>,
        target: String,
        key: String,
        /// Event timestamp; repeat it to model a duplicate keydown
        #[serde(default)]
        timestamp: Option<u64>,
    },

    Scroll {
        #[serde(default)]
        document: Option<String>,
        #[serde(default)]
        target: Option<String>,
    },

    /// Advance the session clock
    Wait { millis: i64 },

    /// Insert nodes under `parent`, as a script on the page would
    Append {
        #[serde(default)]
        document: Option<String>,
        parent: String,
        nodes: Vec<NodeSpec>,
    },

    /// Stop recording before the end of the session
    Stop,
}

// Serde default helpers
fn default_true() -> bool { true }
fn default_clock_start() -> i64 { 1_700_000_000_000 }
