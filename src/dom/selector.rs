//! CSS selector subset: type, `.class` and `#id` compounds joined by the
//! child (`>`) and descendant (whitespace) combinators, with `,` groups.

use crate::dom::tree::{Document, NodeId};
use crate::error::{DomError, DomResult};

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
}

impl Compound {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(el) = doc.element(node) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if &el.tag_name != tag {
                return false;
            }
        }
        self.ids.iter().all(|id| el.id() == id) && self.classes.iter().all(|c| el.has_class(c))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq)]
struct Chain {
    compounds: Vec<Compound>,
    /// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`.
    combinators: Vec<Combinator>,
}

impl Chain {
    fn matches_at(&self, doc: &Document, node: NodeId, idx: usize) -> bool {
        if !self.compounds[idx].matches(doc, node) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match self.combinators[idx - 1] {
            Combinator::Child => doc
                .parent_element(node)
                .is_some_and(|p| self.matches_at(doc, p, idx - 1)),
            Combinator::Descendant => {
                let mut cursor = doc.parent_element(node);
                while let Some(ancestor) = cursor {
                    if self.matches_at(doc, ancestor, idx - 1) {
                        return true;
                    }
                    cursor = doc.parent_element(ancestor);
                }
                false
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    groups: Vec<Chain>,
}

impl Selector {
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.groups
            .iter()
            .any(|chain| chain.matches_at(doc, node, chain.compounds.len() - 1))
    }
}

pub fn parse(input: &str) -> DomResult<Selector> {
    let groups = input
        .split(',')
        .map(|group| parse_chain(group, input))
        .collect::<DomResult<Vec<_>>>()?;
    Ok(Selector { groups })
}

fn parse_chain(group: &str, whole: &str) -> DomResult<Chain> {
    let chars: Vec<char> = group.trim().chars().collect();
    let invalid = || DomError::InvalidSelector(whole.to_string());
    if chars.is_empty() {
        return Err(invalid());
    }

    let mut pos = 0;
    let mut compounds = Vec::new();
    let mut combinators = Vec::new();
    loop {
        compounds.push(parse_compound(&chars, &mut pos).ok_or_else(invalid)?);

        let had_space = skip_whitespace(&chars, &mut pos);
        if pos >= chars.len() {
            break;
        }
        if chars[pos] == '>' {
            pos += 1;
            skip_whitespace(&chars, &mut pos);
            combinators.push(Combinator::Child);
        } else if had_space {
            combinators.push(Combinator::Descendant);
        } else {
            return Err(invalid());
        }
    }

    Ok(Chain {
        compounds,
        combinators,
    })
}

fn parse_compound(chars: &[char], pos: &mut usize) -> Option<Compound> {
    let start = *pos;
    let mut compound = Compound::default();

    if chars.get(*pos) == Some(&'*') {
        *pos += 1;
    } else if let Some(tag) = read_ident(chars, pos) {
        compound.tag = Some(tag.to_ascii_lowercase());
    }

    loop {
        match chars.get(*pos) {
            Some('.') => {
                *pos += 1;
                compound.classes.push(read_ident(chars, pos)?);
            }
            Some('#') => {
                *pos += 1;
                compound.ids.push(read_ident(chars, pos)?);
            }
            _ => break,
        }
    }

    (*pos > start).then_some(compound)
}

fn read_ident(chars: &[char], pos: &mut usize) -> Option<String> {
    let start = *pos;
    while chars.get(*pos).is_some_and(|c| is_ident_char(*c)) {
        *pos += 1;
    }
    (*pos > start).then(|| chars[start..*pos].iter().collect())
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

fn skip_whitespace(chars: &[char], pos: &mut usize) -> bool {
    let start = *pos;
    while chars.get(*pos).is_some_and(|c| c.is_whitespace()) {
        *pos += 1;
    }
    *pos > start
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new("http://localhost/");
        let body = doc.body().unwrap();
        let div = doc.create_element(body, "div");
        doc.set_attribute(div, "class", "outer box");
        let span = doc.create_element(div, "span");
        let button = doc.create_element(span, "button");
        doc.set_attribute(button, "id", "go");
        (doc, div, button)
    }

    #[test]
    fn child_combinator_requires_direct_parent() {
        let (doc, _, button) = sample();
        assert_eq!(
            doc.query_selector_all("body > div > span > button").unwrap(),
            vec![button]
        );
        assert!(doc.query_selector_all("body > span > button").unwrap().is_empty());
    }

    #[test]
    fn descendant_combinator_skips_levels() {
        let (doc, _, button) = sample();
        assert_eq!(doc.query_selector_all("body button").unwrap(), vec![button]);
        assert_eq!(doc.query_selector_all("div.outer #go").unwrap(), vec![button]);
    }

    #[test]
    fn class_and_group_selectors() {
        let (doc, div, button) = sample();
        assert_eq!(doc.query_selector_all(".box").unwrap(), vec![div]);
        assert_eq!(
            doc.query_selector_all("button, div").unwrap(),
            vec![div, button]
        );
    }

    #[test]
    fn malformed_selectors_are_rejected() {
        let (doc, _, _) = sample();
        for bad in ["", "div >", ".", "a[href]", "div,"] {
            assert!(
                matches!(doc.query_selector_all(bad), Err(DomError::InvalidSelector(_))),
                "expected '{}' to be rejected",
                bad
            );
        }
    }
}
