use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::dom::{selector, xpath};
use crate::error::DomResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub usize);

#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct Element {
    /// Always stored lower-cased.
    pub tag_name: String,
    pub attrs: BTreeMap<String, String>,
    /// Live value of form controls, independent of the `value` attribute.
    pub value: String,
    /// Nested browsing context of a `frame` / `iframe`, once loaded.
    pub content_document: Option<DocumentId>,
}

impl Element {
    fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            value: String::new(),
            content_document: None,
        }
    }

    pub fn id(&self) -> &str {
        self.attrs.get("id").map(String::as_str).unwrap_or("")
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attrs
            .get("class")
            .map(String::as_str)
            .unwrap_or("")
            .split_whitespace()
    }

    pub fn has_class(&self, class_name: &str) -> bool {
        self.classes().any(|c| c == class_name)
    }

    pub fn is_frame(&self) -> bool {
        self.tag_name == "iframe" || self.tag_name == "frame"
    }

    /// Upper-cased tag, as `Element.tagName` reports it for HTML documents.
    pub fn node_name(&self) -> String {
        self.tag_name.to_ascii_uppercase()
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// One HTML document: an arena of nodes rooted at the document node.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    url: String,
    origin: String,
}

impl Document {
    /// A document with the usual `html`, `head` and `body` skeleton.
    pub fn new(url: &str) -> Self {
        let mut doc = Self::blank(url);
        let html = doc.create_element(doc.root(), "html");
        doc.create_element(html, "head");
        doc.create_element(html, "body");
        doc
    }

    /// A document holding only the document node.
    pub fn blank(url: &str) -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            url: url.to_string(),
            origin: origin_of(url),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// `about:blank` and `about:srcdoc` documents take the origin of the
    /// document embedding them.
    pub fn inherits_origin(&self) -> bool {
        Url::parse(&self.url).is_ok_and(|u| u.scheme() == "about")
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    // ---- Tree construction ----

    /// Appends a new element under `parent`. An unknown parent leaves the
    /// element detached.
    pub fn create_element(&mut self, parent: NodeId, tag_name: &str) -> NodeId {
        self.push_node(parent, NodeKind::Element(Element::new(tag_name)))
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push_node(parent, NodeKind::Text(text.to_string()))
    }

    fn push_node(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent = self.nodes.get_mut(parent.0).map(|p| {
            p.children.push(id);
            parent
        });
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            kind,
        });
        id
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(node) {
            if name == "value" {
                el.value = value.to_string();
            }
            el.attrs.insert(name.to_string(), value.to_string());
        }
    }

    pub fn set_value(&mut self, node: NodeId, value: &str) {
        if let Some(el) = self.element_mut(node) {
            el.value = value.to_string();
        }
    }

    pub fn set_content_document(&mut self, node: NodeId, content: Option<DocumentId>) {
        if let Some(el) = self.element_mut(node) {
            el.content_document = content;
        }
    }

    // ---- Accessors ----

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(node.0)?.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|el| el.tag_name.as_str())
    }

    pub fn value(&self, node: NodeId) -> &str {
        self.element(node).map(|el| el.value.as_str()).unwrap_or("")
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    pub fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node).filter(|p| self.element(*p).is_some())
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn element_children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(node)
            .iter()
            .copied()
            .filter(|c| self.element(*c).is_some())
    }

    /// First element child of the document node.
    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(self.root()).next()
    }

    /// The `body` (or `frameset`) child of the document element.
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.element_children(html)
            .find(|c| matches!(self.tag_name(*c), Some("body") | Some("frameset")))
    }

    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match self.nodes.get(node.0).map(|n| &n.kind) {
            Some(NodeKind::Text(text)) => out.push_str(text),
            Some(_) => {
                for child in self.children(node) {
                    self.collect_text(*child, out);
                }
            }
            None => {}
        }
    }

    /// Pre-order descendants of `node`, excluding `node` itself.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Every element in document order.
    pub fn elements(&self) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|n| self.element(*n).is_some())
            .collect()
    }

    pub(crate) fn document_order(&self) -> HashMap<NodeId, usize> {
        std::iter::once(self.root())
            .chain(self.descendants(self.root()))
            .enumerate()
            .map(|(i, n)| (n, i))
            .collect()
    }

    /// `getElementsByTagName` scoped to the descendants of `root`.
    pub fn elements_by_tag(&self, root: NodeId, tag_name: &str) -> Vec<NodeId> {
        let tag = tag_name.to_ascii_lowercase();
        self.descendants(root)
            .into_iter()
            .filter(|n| self.tag_name(*n) == Some(tag.as_str()))
            .collect()
    }

    pub fn forms(&self) -> Vec<NodeId> {
        self.elements_by_tag(self.root(), "form")
    }

    /// `a` and `area` elements carrying an `href`, like `document.links`.
    pub fn links(&self) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|n| {
                self.element(*n).is_some_and(|el| {
                    (el.tag_name == "a" || el.tag_name == "area") && el.attrs.contains_key("href")
                })
            })
            .collect()
    }

    pub fn frames(&self) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|n| self.element(*n).is_some_and(Element::is_frame))
            .collect()
    }

    /// Nearest `form` ancestor of `node`.
    pub fn form_of(&self, node: NodeId) -> Option<NodeId> {
        let mut cursor = self.parent_element(node);
        while let Some(current) = cursor {
            if self.tag_name(current) == Some("form") {
                return Some(current);
            }
            cursor = self.parent_element(current);
        }
        None
    }

    // ---- Queries ----

    pub fn query_selector_all(&self, selector: &str) -> DomResult<Vec<NodeId>> {
        let parsed = selector::parse(selector)?;
        Ok(self
            .elements()
            .into_iter()
            .filter(|n| parsed.matches(self, *n))
            .collect())
    }

    pub fn query_selector(&self, selector: &str) -> DomResult<Option<NodeId>> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    pub fn evaluate_xpath(&self, expression: &str) -> DomResult<Vec<NodeId>> {
        Ok(xpath::parse(expression)?.evaluate(self))
    }
}

fn origin_of(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.origin().ascii_serialization())
        .unwrap_or_else(|_| url.to_string())
}
