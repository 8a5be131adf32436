use std::cell::RefCell;

use serde::{Deserialize, Serialize};

use crate::zest::Statement;

/// Short message shown by the recording overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    fn new(title: &str, message: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            message: message.into(),
        }
    }
}

pub fn notification_for(statement: &Statement) -> Option<Notification> {
    match statement {
        Statement::Click(a) => Some(Notification::new("Click", a.locator.element.clone())),
        Statement::ScrollTo(a) => Some(Notification::new("Scroll To", a.locator.element.clone())),
        Statement::SendKeys(s) => Some(Notification::new(
            "Send Keys",
            format!("{}: {}", s.action.locator.element, s.value),
        )),
        Statement::Submit(a) => Some(Notification::new("Submit", a.locator.element.clone())),
        Statement::LaunchBrowser(l) => Some(Notification::new("Launch Browser", l.browser_type.clone())),
        Statement::SwitchToFrame(f) => Some(Notification::new("Switch To Frame", f.frame_index.to_string())),
        _ => None,
    }
}

/// Told about every statement the recorder sends.
pub trait StatementObserver {
    fn statement_recorded(&self, statement: &Statement);
}

/// Keeps the notifications an overlay would have shown.
#[derive(Debug, Default)]
pub struct NotificationLog {
    shown: RefCell<Vec<Notification>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<Notification> {
        self.shown.borrow().clone()
    }
}

impl StatementObserver for NotificationLog {
    fn statement_recorded(&self, statement: &Statement) {
        if let Some(notification) = notification_for(statement) {
            self.shown.borrow_mut().push(notification);
        }
    }
}
