//! XPath subset used by element locators: absolute location paths built from
//! `/` and `//` steps over element names (or `*`), each with an optional
//! `[n]` position or `[@attr="value"]` predicate.

use std::collections::HashSet;

use crate::dom::tree::{Document, NodeId};
use crate::error::{DomError, DomResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    /// `//`, i.e. `descendant-or-self::node()/child::`.
    Descendant,
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    Position(usize),
    AttrEquals(String, String),
}

#[derive(Debug, Clone, PartialEq)]
struct Step {
    axis: Axis,
    /// `None` for `*`.
    name: Option<String>,
    predicate: Option<Predicate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct XPath {
    steps: Vec<Step>,
}

impl XPath {
    pub fn evaluate(&self, doc: &Document) -> Vec<NodeId> {
        let mut context = vec![doc.root()];
        for step in &self.steps {
            let mut next = Vec::new();
            let mut seen = HashSet::new();
            for ctx in &context {
                let parents: Vec<NodeId> = match step.axis {
                    Axis::Child => vec![*ctx],
                    Axis::Descendant => std::iter::once(*ctx)
                        .chain(doc.descendants(*ctx))
                        .collect(),
                };
                for parent in parents {
                    for node in step.select_children(doc, parent) {
                        if seen.insert(node) {
                            next.push(node);
                        }
                    }
                }
            }
            context = next;
            if context.is_empty() {
                break;
            }
        }

        let order = doc.document_order();
        context.sort_by_key(|n| order.get(n).copied().unwrap_or(usize::MAX));
        context
    }
}

impl Step {
    fn select_children(&self, doc: &Document, parent: NodeId) -> Vec<NodeId> {
        let named: Vec<NodeId> = doc
            .element_children(parent)
            .filter(|c| match &self.name {
                Some(name) => doc.tag_name(*c) == Some(name.as_str()),
                None => true,
            })
            .collect();

        match &self.predicate {
            None => named,
            Some(Predicate::Position(n)) => named.get(n - 1).copied().into_iter().collect(),
            Some(Predicate::AttrEquals(attr, value)) => named
                .into_iter()
                .filter(|c| {
                    doc.element(*c)
                        .and_then(|el| el.attr(attr))
                        .is_some_and(|v| v == value)
                })
                .collect(),
        }
    }
}

pub fn parse(input: &str) -> DomResult<XPath> {
    let invalid = || DomError::InvalidXPath(input.to_string());
    let chars: Vec<char> = input.trim().chars().collect();
    if chars.first() != Some(&'/') {
        return Err(invalid());
    }

    let mut pos = 0;
    let mut steps = Vec::new();
    while pos < chars.len() {
        // Every step starts with `/` or `//`.
        if chars[pos] != '/' {
            return Err(invalid());
        }
        pos += 1;
        let axis = if chars.get(pos) == Some(&'/') {
            pos += 1;
            Axis::Descendant
        } else {
            Axis::Child
        };

        let name = if chars.get(pos) == Some(&'*') {
            pos += 1;
            None
        } else {
            let start = pos;
            while chars
                .get(pos)
                .is_some_and(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
            {
                pos += 1;
            }
            if pos == start {
                return Err(invalid());
            }
            Some(chars[start..pos].iter().collect::<String>().to_ascii_lowercase())
        };

        let predicate = if chars.get(pos) == Some(&'[') {
            let close = chars[pos..]
                .iter()
                .position(|c| *c == ']')
                .map(|offset| pos + offset)
                .ok_or_else(invalid)?;
            let body: String = chars[pos + 1..close].iter().collect();
            pos = close + 1;
            Some(parse_predicate(body.trim()).ok_or_else(invalid)?)
        } else {
            None
        };

        steps.push(Step {
            axis,
            name,
            predicate,
        });
    }

    Ok(XPath { steps })
}

fn parse_predicate(body: &str) -> Option<Predicate> {
    if let Some(rest) = body.strip_prefix('@') {
        let (attr, value) = rest.split_once('=')?;
        let value = value.trim();
        let unquoted = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))?;
        let attr = attr.trim();
        if attr.is_empty() {
            return None;
        }
        return Some(Predicate::AttrEquals(attr.to_string(), unquoted.to_string()));
    }
    match body.parse::<usize>() {
        Ok(n) if n >= 1 => Some(Predicate::Position(n)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_buttons() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new("http://localhost/");
        let body = doc.body().unwrap();
        let div = doc.create_element(body, "div");
        doc.set_attribute(div, "id", "panel");
        let first = doc.create_element(div, "button");
        let second = doc.create_element(div, "button");
        (doc, div, first, second)
    }

    #[test]
    fn absolute_path_with_positions() {
        let (doc, _, first, second) = two_buttons();
        assert_eq!(
            doc.evaluate_xpath("/html/body/div/button[1]").unwrap(),
            vec![first]
        );
        assert_eq!(
            doc.evaluate_xpath("/html/body/div/button[2]").unwrap(),
            vec![second]
        );
        assert_eq!(
            doc.evaluate_xpath("/html/body/div/button").unwrap(),
            vec![first, second]
        );
        assert!(doc.evaluate_xpath("/html/body/div/button[3]").unwrap().is_empty());
    }

    #[test]
    fn descendant_step_with_attribute_predicate() {
        let (doc, div, _, second) = two_buttons();
        assert_eq!(
            doc.evaluate_xpath(r#"//div[@id="panel"]"#).unwrap(),
            vec![div]
        );
        assert_eq!(
            doc.evaluate_xpath(r#"//div[@id="panel"]/button[2]"#).unwrap(),
            vec![second]
        );
    }

    #[test]
    fn position_is_relative_to_each_parent() {
        let mut doc = Document::new("http://localhost/");
        let body = doc.body().unwrap();
        let a = doc.create_element(body, "p");
        let b = doc.create_element(body, "p");
        let a_span = doc.create_element(a, "span");
        let b_span = doc.create_element(b, "span");
        assert_eq!(doc.evaluate_xpath("//p/span[1]").unwrap(), vec![a_span, b_span]);
    }

    #[test]
    fn rejects_unsupported_syntax() {
        let (doc, _, _, _) = two_buttons();
        for bad in ["", "html/body", "/html/", "/html[0]", "/html[text()]", "/div[@id=x]"] {
            assert!(
                matches!(doc.evaluate_xpath(bad), Err(DomError::InvalidXPath(_))),
                "expected '{}' to be rejected",
                bad
            );
        }
    }
}
