use tracing::debug;

use crate::dom::{Document, NodeId};
use crate::locator::{ElementLocator, LocatorType};

/// Picks the most stable descriptor for `node` that identifies exactly one
/// element of `doc`: id, then single class, then CSS path, then XPath.
pub fn resolve(doc: &Document, node: NodeId) -> ElementLocator {
    let Some(element) = doc.element(node) else {
        return ElementLocator::unresolved();
    };

    // Ids are taken as authoritative.
    if !element.id().is_empty() {
        return ElementLocator::new(LocatorType::Id, element.id());
    }

    let classes: Vec<&str> = element.classes().collect();
    if let [class_name] = classes.as_slice() {
        if selector_is_unique(doc, &format!(".{}", class_name)) {
            return ElementLocator::new(LocatorType::ClassName, *class_name);
        }
    }

    if let Some(selector) = css_path(doc, node) {
        if selector_is_unique(doc, &selector) {
            return ElementLocator::new(LocatorType::CssSelector, selector);
        }
    }

    if let Some(path) = xpath(doc, node) {
        if xpath_is_unique(doc, &path) {
            return ElementLocator::new(LocatorType::Xpath, path);
        }
    }

    debug!(node = node.0, url = doc.url(), "no unique locator found");
    ElementLocator::unresolved()
}

/// Chain of lower-cased tag names joined by `" > "`. `html` and the body
/// both collapse to `body`, which ends the walk.
pub fn css_path(doc: &Document, node: NodeId) -> Option<String> {
    let mut parts = Vec::new();
    let mut cursor = Some(node);
    while let Some(current) = cursor {
        let tag = doc.tag_name(current)?;
        if tag == "html" || Some(current) == doc.body() {
            parts.push("body".to_string());
            break;
        }
        parts.push(tag.to_string());
        cursor = doc.parent_element(current);
    }
    parts.reverse();
    Some(parts.join(" > "))
}

/// Absolute XPath for `node`. An ancestor whose id is unique for its tag
/// anchors the path as `//tag[@id="..."]`.
pub fn xpath(doc: &Document, node: NodeId) -> Option<String> {
    let mut steps = Vec::new();
    let mut cursor = Some(node);
    let mut anchored = false;

    while let Some(current) = cursor {
        let element = doc.element(current)?;
        let tag = element.tag_name.as_str();

        let id = element.id();
        if !id.is_empty() && !id.contains('"') {
            let anchor = format!("//{}[@id=\"{}\"]", tag, id);
            if xpath_is_unique(doc, &anchor) {
                steps.push(anchor);
                anchored = true;
                break;
            }
        }

        steps.push(sibling_step(doc, current, tag));
        cursor = doc.parent_element(current);
    }

    steps.reverse();
    let joined = steps.join("/");
    Some(if anchored { joined } else { format!("/{}", joined) })
}

/// `tag` or `tag[n]`, where `n` is the 1-based position among same-tag
/// element siblings. The qualifier is dropped when the tag is unique among
/// its siblings.
fn sibling_step(doc: &Document, node: NodeId, tag: &str) -> String {
    let Some(parent) = doc.parent(node) else {
        return tag.to_string();
    };

    let mut index = 1;
    let mut seen_self = false;
    let mut unique = true;
    for sibling in doc.element_children(parent) {
        if sibling == node {
            seen_self = true;
            continue;
        }
        if doc.tag_name(sibling) != Some(tag) {
            continue;
        }
        unique = false;
        if !seen_self {
            index += 1;
        }
    }

    if unique {
        tag.to_string()
    } else {
        format!("{}[{}]", tag, index)
    }
}

fn selector_is_unique(doc: &Document, selector: &str) -> bool {
    doc.query_selector_all(selector)
        .map(|found| found.len() == 1)
        .unwrap_or(false)
}

fn xpath_is_unique(doc: &Document, expression: &str) -> bool {
    doc.evaluate_xpath(expression)
        .map(|found| found.len() == 1)
        .unwrap_or(false)
}
