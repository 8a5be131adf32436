use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::dom::{Document, NodeId};
use crate::locator;

/// Type given to cookie observations.
pub const COOKIES_TYPE: &str = "cookies";

/// Where an observation came from; decides which fields are volatile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectCategory {
    #[default]
    Generic,
    Element,
    Storage,
}

/// A timestamped observation of a DOM node, storage entry or cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedObject {
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub object_type: String,
    pub tag_name: String,
    pub id: String,
    pub node_name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpath: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_id: Option<usize>,
    #[serde(skip)]
    pub category: ObjectCategory,
}

impl ReportedObject {
    pub fn new(
        object_type: &str,
        tag_name: &str,
        id: &str,
        node_name: &str,
        text: Option<&str>,
        url: &str,
        timestamp: i64,
    ) -> Self {
        Self {
            timestamp,
            object_type: object_type.to_string(),
            tag_name: tag_name.to_string(),
            id: id.to_string(),
            node_name: node_name.to_string(),
            url: url.to_string(),
            xpath: None,
            href: None,
            text: text.map(str::to_string),
            tag_type: None,
            form_id: None,
            category: ObjectCategory::Generic,
        }
    }

    /// `nodeAdded` observation of an element. `None` for non-element nodes.
    pub fn from_element(doc: &Document, node: NodeId, timestamp: i64) -> Option<Self> {
        let element = doc.element(node)?;
        let node_name = element.node_name();
        let text_content = doc.text_content(node);

        let mut obj = Self::new(
            "nodeAdded",
            &node_name,
            element.id(),
            &node_name,
            Some(&text_content),
            doc.url(),
            timestamp,
        );
        obj.category = ObjectCategory::Element;
        obj.xpath = locator::xpath(doc, node);

        match element.tag_name.as_str() {
            "a" => {
                obj.href = element.attr("href").map(|href| absolute_href(doc.url(), href));
            }
            "form" => {
                obj.form_id = doc.forms().iter().position(|f| *f == node);
            }
            "input" => {
                obj.tag_type = Some(element.attr("type").unwrap_or("text").to_ascii_lowercase());
                obj.text = Some(element.value.clone());
                obj.form_id = doc
                    .form_of(node)
                    .and_then(|form| doc.forms().iter().position(|f| *f == form));
            }
            _ => {
                obj.href = element.attr("href").map(str::to_string);
            }
        }
        Some(obj)
    }

    /// One `localStorage` / `sessionStorage` entry.
    pub fn storage(storage_name: &str, key: &str, value: &str, url: &str, timestamp: i64) -> Self {
        let mut obj = Self::new(storage_name, "", key, "", Some(value), url, timestamp);
        obj.category = ObjectCategory::Storage;
        obj
    }

    pub fn cookie(name: &str, value: &str, url: &str, timestamp: i64) -> Self {
        Self::storage(COOKIES_TYPE, name, value, url, timestamp)
    }

    /// JSON form without the fields that change between otherwise identical
    /// observations.
    pub fn short_key(&self) -> String {
        let mut value = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => return String::new(),
        };
        value.remove("xpath");
        match self.category {
            ObjectCategory::Generic => {}
            ObjectCategory::Element => {
                value.remove("timestamp");
            }
            ObjectCategory::Storage => {
                value.remove("href");
                value.remove("timestamp");
                if self.object_type != COOKIES_TYPE {
                    value.remove("url");
                }
            }
        }
        Value::Object(value).to_string()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

fn absolute_href(base: &str, href: &str) -> String {
    Url::parse(base)
        .and_then(|b| b.join(href))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Coalesced occurrence counter for one named event at one URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedEvent {
    pub timestamp: i64,
    pub event_name: String,
    pub url: String,
    pub count: u64,
}

impl ReportedEvent {
    pub fn new(event_name: &str, url: &str, timestamp: i64) -> Self {
        Self {
            timestamp,
            event_name: event_name.to_string(),
            url: url.to_string(),
            count: 1,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_href_is_absolute() {
        let mut doc = Document::new("http://localhost/app/index.html");
        let body = doc.body().unwrap();
        let a = doc.create_element(body, "a");
        doc.set_attribute(a, "href", "../login");
        doc.append_text(a, "Login");

        let obj = ReportedObject::from_element(&doc, a, 1).unwrap();
        assert_eq!(obj.tag_name, "A");
        assert_eq!(obj.href.as_deref(), Some("http://localhost/login"));
        assert_eq!(obj.text.as_deref(), Some("Login"));
    }

    #[test]
    fn input_reports_type_value_and_form() {
        let mut doc = Document::new("http://localhost/");
        let body = doc.body().unwrap();
        doc.create_element(body, "form");
        let form = doc.create_element(body, "form");
        let input = doc.create_element(form, "input");
        doc.set_attribute(input, "type", "Password");
        doc.set_value(input, "secret");

        let obj = ReportedObject::from_element(&doc, input, 1).unwrap();
        assert_eq!(obj.tag_type.as_deref(), Some("password"));
        assert_eq!(obj.text.as_deref(), Some("secret"));
        assert_eq!(obj.form_id, Some(1));

        let form_obj = ReportedObject::from_element(&doc, form, 1).unwrap();
        assert_eq!(form_obj.form_id, Some(1));
    }

    #[test]
    fn other_elements_keep_raw_href() {
        let mut doc = Document::new("http://localhost/");
        let body = doc.body().unwrap();
        let link = doc.create_element(body, "link");
        doc.set_attribute(link, "href", "style.css");
        let obj = ReportedObject::from_element(&doc, link, 1).unwrap();
        assert_eq!(obj.href.as_deref(), Some("style.css"));
    }
}
