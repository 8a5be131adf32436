use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ZestResult;
use crate::settings::{SettingsStore, ZAP_SCRIPT_NAME};
use crate::zest::statement::Statement;

pub const ZEST_ABOUT: &str =
    "This is a Zest script. For more details about Zest visit https://github.com/zaproxy/zest/";
pub const ZEST_VERSION: &str = "0.3";

/// Saved script plus the title it should be stored under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptMessage {
    pub script: String,
    pub title: String,
}

/// Ordered, indexed statements of the current recording session.
#[derive(Debug, Clone)]
pub struct ZestScript {
    statements: Vec<Statement>,
    next_index: i64,
    title: String,
}

impl Default for ZestScript {
    fn default() -> Self {
        Self::new("")
    }
}

impl ZestScript {
    pub fn new(title: &str) -> Self {
        Self {
            statements: Vec::new(),
            next_index: 1,
            title: title.to_string(),
        }
    }

    /// Parses a raw statement payload, indexes and stores it, and returns the
    /// annotated JSON.
    pub fn add_statement(&mut self, raw: &str) -> ZestResult<String> {
        let statement: Statement = serde_json::from_str(raw)?;
        let stored = self.push(statement)?;
        Ok(serde_json::to_string(&stored)?)
    }

    pub fn push(&mut self, mut statement: Statement) -> ZestResult<Statement> {
        statement.validate()?;
        statement.set_index(self.next_index);
        self.next_index += 1;
        debug!(
            index = statement.index(),
            element_type = statement.element_type(),
            "statement added"
        );
        self.statements.push(statement.clone());
        Ok(statement)
    }

    pub fn reset(&mut self) {
        self.statements.clear();
        self.next_index = 1;
    }

    pub fn statement_count(&self) -> usize {
        self.statements.len()
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn next_index(&self) -> i64 {
        self.next_index
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn to_envelope(&self) -> ScriptEnvelope {
        ScriptEnvelope {
            about: ZEST_ABOUT.to_string(),
            zest_version: ZEST_VERSION.to_string(),
            title: self.title.clone(),
            description: String::new(),
            prefix: String::new(),
            script_type: "StandAlone".to_string(),
            parameters: ScriptParameters::default(),
            statements: self.statements.clone(),
            authentication: Vec::new(),
            index: 0,
            enabled: true,
            element_type: "ZestScript".to_string(),
        }
    }

    /// Envelope as 2-space indented JSON.
    pub fn to_json(&self) -> ZestResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_envelope())?)
    }

    /// Refreshes the title from `zapscriptname` and returns the saved form.
    pub fn script_message(&mut self, settings: &dyn SettingsStore) -> ZestResult<ScriptMessage> {
        self.title = settings.get_str(ZAP_SCRIPT_NAME, &self.title);
        Ok(ScriptMessage {
            script: self.to_json()?,
            title: self.title.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptEnvelope {
    pub about: String,
    pub zest_version: String,
    pub title: String,
    pub description: String,
    pub prefix: String,
    #[serde(rename = "type")]
    pub script_type: String,
    pub parameters: ScriptParameters,
    pub statements: Vec<Statement>,
    pub authentication: Vec<serde_json::Value>,
    pub index: i64,
    pub enabled: bool,
    pub element_type: String,
}

impl ScriptEnvelope {
    pub fn from_json(json: &str) -> ZestResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptParameters {
    pub token_start: String,
    pub token_end: String,
    pub tokens: BTreeMap<String, String>,
    pub element_type: String,
}

impl Default for ScriptParameters {
    fn default() -> Self {
        Self {
            token_start: "{{".to_string(),
            token_end: "}}".to_string(),
            tokens: BTreeMap::new(),
            element_type: "ZestVariables".to_string(),
        }
    }
}
