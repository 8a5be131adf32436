use serde::{Deserialize, Serialize};

use crate::error::{ZestError, ZestResult};
use crate::locator::ElementLocator;

/// Window handle used for every statement of a recording.
pub const DEFAULT_WINDOW_HANDLE: &str = "windowHandle1";

/// Index carried by a statement that has not been added to a script yet.
pub const UNASSIGNED_INDEX: i64 = -1;

/// One replayable Zest statement, discriminated on the wire by `elementType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "elementType")]
pub enum Statement {
    #[serde(rename = "ZestClientLaunch")]
    LaunchBrowser(LaunchBrowser),

    #[serde(rename = "ZestComment")]
    Comment(Comment),

    #[serde(rename = "ZestClientElementClick")]
    Click(ElementAction),

    #[serde(rename = "ZestClientElementScrollTo")]
    ScrollTo(ElementAction),

    #[serde(rename = "ZestClientElementSendKeys")]
    SendKeys(SendKeys),

    #[serde(rename = "ZestClientElementSubmit")]
    Submit(ElementAction),

    #[serde(rename = "ZestClientElementClear")]
    Clear(ElementAction),

    #[serde(rename = "ZestClientSwitchToFrame")]
    SwitchToFrame(SwitchToFrame),

    #[serde(rename = "ZestClientWindowClose")]
    WindowClose(WindowClose),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchBrowser {
    pub window_handle: String,
    pub browser_type: String,
    pub url: String,
    pub capabilities: String,
    pub headless: bool,
    pub index: i64,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub comment: String,
    pub index: i64,
    pub enabled: bool,
}

/// Shared shape of the statements that act on a located element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementAction {
    pub window_handle: String,
    #[serde(flatten)]
    pub locator: ElementLocator,
    pub index: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for_msec: Option<u64>,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendKeys {
    pub value: String,
    #[serde(flatten)]
    pub action: ElementAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchToFrame {
    pub window_handle: String,
    /// `-1` switches back to the parent context.
    pub frame_index: i64,
    pub frame_name: String,
    pub parent: bool,
    pub index: i64,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowClose {
    pub window_handle: String,
    pub index: i64,
    pub sleep_in_seconds: u64,
    pub enabled: bool,
}

impl ElementAction {
    fn new(locator: ElementLocator, wait_for_msec: Option<u64>) -> Self {
        Self {
            window_handle: DEFAULT_WINDOW_HANDLE.to_string(),
            locator,
            index: UNASSIGNED_INDEX,
            wait_for_msec,
            enabled: true,
        }
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl Statement {
    pub fn launch_browser(browser_type: &str, url: &str) -> Self {
        Statement::LaunchBrowser(LaunchBrowser {
            window_handle: DEFAULT_WINDOW_HANDLE.to_string(),
            browser_type: browser_type.to_string(),
            url: url.to_string(),
            capabilities: String::new(),
            headless: false,
            index: UNASSIGNED_INDEX,
            enabled: true,
        })
    }

    pub fn comment(text: &str) -> Self {
        Statement::Comment(Comment {
            comment: text.to_string(),
            index: UNASSIGNED_INDEX,
            enabled: true,
        })
    }

    pub fn click(locator: ElementLocator, waited: u64) -> Self {
        Statement::Click(ElementAction::new(locator, Some(waited)))
    }

    pub fn scroll_to(locator: ElementLocator, waited: u64) -> Self {
        Statement::ScrollTo(ElementAction::new(locator, Some(waited)))
    }

    pub fn send_keys(locator: ElementLocator, value: &str, waited: u64) -> Self {
        Statement::SendKeys(SendKeys {
            value: value.to_string(),
            action: ElementAction::new(locator, Some(waited)),
        })
    }

    pub fn submit(locator: ElementLocator, waited: u64) -> Self {
        Statement::Submit(ElementAction::new(locator, Some(waited)))
    }

    pub fn clear(locator: ElementLocator) -> Self {
        Statement::Clear(ElementAction::new(locator, None))
    }

    /// `frame_index == -1` targets the parent context.
    pub fn switch_to_frame(frame_index: i64) -> Self {
        Statement::SwitchToFrame(SwitchToFrame {
            window_handle: DEFAULT_WINDOW_HANDLE.to_string(),
            frame_index,
            frame_name: String::new(),
            parent: frame_index == -1,
            index: UNASSIGNED_INDEX,
            enabled: true,
        })
    }

    pub fn window_close(sleep_in_seconds: u64) -> Self {
        Statement::WindowClose(WindowClose {
            window_handle: DEFAULT_WINDOW_HANDLE.to_string(),
            index: UNASSIGNED_INDEX,
            sleep_in_seconds,
            enabled: true,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn element_type(&self) -> &'static str {
        match self {
            Statement::LaunchBrowser(_) => "ZestClientLaunch",
            Statement::Comment(_) => "ZestComment",
            Statement::Click(_) => "ZestClientElementClick",
            Statement::ScrollTo(_) => "ZestClientElementScrollTo",
            Statement::SendKeys(_) => "ZestClientElementSendKeys",
            Statement::Submit(_) => "ZestClientElementSubmit",
            Statement::Clear(_) => "ZestClientElementClear",
            Statement::SwitchToFrame(_) => "ZestClientSwitchToFrame",
            Statement::WindowClose(_) => "ZestClientWindowClose",
        }
    }

    pub fn index(&self) -> i64 {
        match self {
            Statement::LaunchBrowser(s) => s.index,
            Statement::Comment(s) => s.index,
            Statement::Click(s)
            | Statement::ScrollTo(s)
            | Statement::Submit(s)
            | Statement::Clear(s) => s.index,
            Statement::SendKeys(s) => s.action.index,
            Statement::SwitchToFrame(s) => s.index,
            Statement::WindowClose(s) => s.index,
        }
    }

    /// Assigns the script position; an indexed statement is always enabled.
    pub fn set_index(&mut self, index: i64) {
        let (slot, enabled) = match self {
            Statement::LaunchBrowser(s) => (&mut s.index, &mut s.enabled),
            Statement::Comment(s) => (&mut s.index, &mut s.enabled),
            Statement::Click(s)
            | Statement::ScrollTo(s)
            | Statement::Submit(s)
            | Statement::Clear(s) => (&mut s.index, &mut s.enabled),
            Statement::SendKeys(s) => (&mut s.action.index, &mut s.action.enabled),
            Statement::SwitchToFrame(s) => (&mut s.index, &mut s.enabled),
            Statement::WindowClose(s) => (&mut s.index, &mut s.enabled),
        };
        *slot = index;
        *enabled = true;
    }

    pub fn locator(&self) -> Option<&ElementLocator> {
        self.element_action().map(|a| &a.locator)
    }

    pub fn wait_for_msec(&self) -> Option<u64> {
        self.element_action().and_then(|a| a.wait_for_msec)
    }

    fn element_action(&self) -> Option<&ElementAction> {
        match self {
            Statement::Click(a)
            | Statement::ScrollTo(a)
            | Statement::Submit(a)
            | Statement::Clear(a) => Some(a),
            Statement::SendKeys(s) => Some(&s.action),
            _ => None,
        }
    }

    // ========================================================================
    // Validation
    // ========================================================================

    pub fn validate(&self) -> ZestResult<()> {
        let invalid = |reason: &str| ZestError::InvalidStatement {
            element_type: self.element_type(),
            reason: reason.to_string(),
        };

        match self {
            Statement::LaunchBrowser(s) => {
                if s.browser_type.is_empty() {
                    return Err(invalid("browserType is empty"));
                }
                if s.url.is_empty() {
                    return Err(invalid("url is empty"));
                }
            }
            Statement::SwitchToFrame(s) => {
                if s.frame_index < -1 {
                    return Err(invalid("frameIndex must be -1 or a frame slot"));
                }
                if s.parent != (s.frame_index == -1) {
                    return Err(invalid("parent must be set exactly when frameIndex is -1"));
                }
            }
            Statement::Comment(_) | Statement::WindowClose(_) => {}
            _ => {
                if let Some(locator) = self.locator() {
                    if locator.is_unresolved() != locator.element.is_empty() {
                        return Err(invalid("locator type and element disagree"));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::LocatorType;

    #[test]
    fn switch_to_parent_sets_parent_flag() {
        match Statement::switch_to_frame(-1) {
            Statement::SwitchToFrame(s) => {
                assert!(s.parent);
                assert_eq!(s.frame_name, "");
            }
            other => panic!("unexpected {:?}", other),
        }
        match Statement::switch_to_frame(2) {
            Statement::SwitchToFrame(s) => assert!(!s.parent),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn set_index_reaches_send_keys() {
        let mut stmt = Statement::send_keys(
            ElementLocator::new(LocatorType::Id, "q"),
            "hello",
            5000,
        );
        assert_eq!(stmt.index(), UNASSIGNED_INDEX);
        stmt.set_index(4);
        assert_eq!(stmt.index(), 4);
    }

    #[test]
    fn validate_rejects_inconsistent_locator() {
        let bad = Statement::click(ElementLocator::new(LocatorType::Unresolved, "x"), 5000);
        assert!(bad.validate().is_err());
        let ok = Statement::click(ElementLocator::unresolved(), 5000);
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn clear_has_no_wait() {
        let stmt = Statement::clear(ElementLocator::new(LocatorType::Id, "q"));
        assert_eq!(stmt.wait_for_msec(), None);
        let json = serde_json::to_value(&stmt).unwrap();
        assert!(json.get("waitForMsec").is_none());
    }
}
