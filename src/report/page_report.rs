use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dom::{Document, NodeId};
use crate::report::cache::ReportCache;
use crate::report::report_model::{ReportedEvent, ReportedObject};
use crate::transport::{Message, MessageKind, zap::CALLBACK_URL_MARKER};

pub const LOCAL_STORAGE: &str = "localStorage";
pub const SESSION_STORAGE: &str = "sessionStorage";

/// Web storage and cookies visible to the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageStorage {
    #[serde(default)]
    pub local: BTreeMap<String, String>,
    #[serde(default)]
    pub session: BTreeMap<String, String>,
    /// Raw `document.cookie` string, `name=value` pairs separated by `;`.
    #[serde(default)]
    pub cookies: String,
}

impl PageStorage {
    pub fn cookie_pairs(&self) -> Vec<(String, String)> {
        self.cookies
            .split(';')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| match c.split_once('=') {
                Some((name, value)) => (name.trim().to_string(), value.trim().to_string()),
                None => (String::new(), c.to_string()),
            })
            .collect()
    }
}

impl ReportCache {
    /// Reports what a freshly loaded page exposes. A ZAP callback URL is
    /// handed to the background as connection details instead.
    pub fn report_page_loaded(&mut self, doc: &Document, storage: &PageStorage) {
        let url = doc.url();
        if url.contains(CALLBACK_URL_MARKER) {
            info!(url, "page loaded from ZAP callback URL");
            self.send(Message::zap_details(url, ""));
            return;
        }

        // Page loads are forwarded as-is, never counted.
        let event = ReportedEvent::new("pageLoad", url, self.now());
        self.send(Message::text(MessageKind::ReportEvent, event.to_json()));

        self.report_links(doc);
        self.report_forms(doc);
        let root = doc.root();
        self.report_tagged(doc, root, "input");
        self.report_tagged(doc, root, "button");
        self.report_storage(url, storage);
    }

    /// Reports a batch of DOM mutations whose added nodes hang off `targets`.
    pub fn report_dom_mutation(&mut self, doc: &Document, targets: &[NodeId]) {
        let event = ReportedEvent::new("domMutation", doc.url(), self.now());
        self.report_event(event);
        self.report_links(doc);
        self.report_forms(doc);
        for target in targets {
            if doc.element(*target).is_none() {
                continue;
            }
            self.report_tagged(doc, *target, "input");
            self.report_tagged(doc, *target, "button");
        }
    }

    pub fn report_page_unloaded(&mut self, url: &str, storage: &PageStorage) {
        let event = ReportedEvent::new("pageUnload", url, self.now());
        self.send(Message::text(MessageKind::ReportEvent, event.to_json()));
        self.flush_events();
        self.report_storage(url, storage);
    }

    fn report_links(&mut self, doc: &Document) {
        for link in doc.links() {
            self.report_node(doc, link);
        }
    }

    fn report_forms(&mut self, doc: &Document) {
        for form in doc.forms() {
            self.report_node(doc, form);
        }
    }

    fn report_tagged(&mut self, doc: &Document, root: NodeId, tag_name: &str) {
        for node in doc.elements_by_tag(root, tag_name) {
            self.report_node(doc, node);
        }
    }

    fn report_node(&mut self, doc: &Document, node: NodeId) {
        if let Some(obj) = ReportedObject::from_element(doc, node, self.now()) {
            self.report_object(&obj);
        }
    }

    fn report_storage(&mut self, url: &str, storage: &PageStorage) {
        let now = self.now();
        for (name, entries) in [(LOCAL_STORAGE, &storage.local), (SESSION_STORAGE, &storage.session)] {
            for (key, value) in entries {
                self.report_object(&ReportedObject::storage(name, key, value, url, now));
            }
        }
        for (name, value) in storage.cookie_pairs() {
            self.report_object(&ReportedObject::cookie(&name, &value, url, now));
        }
    }
}
