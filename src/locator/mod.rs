pub mod resolver;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use resolver::{css_path, resolve, xpath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocatorType {
    #[serde(rename = "id")]
    Id,
    #[serde(rename = "className")]
    ClassName,
    #[serde(rename = "cssSelector")]
    CssSelector,
    #[serde(rename = "xpath")]
    Xpath,
    /// Nothing unique was found; replay falls back to best effort.
    #[serde(rename = "")]
    Unresolved,
}

impl LocatorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::ClassName => "className",
            Self::CssSelector => "cssSelector",
            Self::Xpath => "xpath",
            Self::Unresolved => "",
        }
    }
}

impl fmt::Display for LocatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serializable descriptor that re-identifies an element at replay time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementLocator {
    #[serde(rename = "type")]
    pub locator_type: LocatorType,
    pub element: String,
}

impl ElementLocator {
    pub fn new(locator_type: LocatorType, element: impl Into<String>) -> Self {
        Self {
            locator_type,
            element: element.into(),
        }
    }

    pub fn unresolved() -> Self {
        Self::new(LocatorType::Unresolved, "")
    }

    pub fn is_unresolved(&self) -> bool {
        self.locator_type == LocatorType::Unresolved
    }
}

impl fmt::Display for ElementLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.locator_type, self.element)
    }
}
