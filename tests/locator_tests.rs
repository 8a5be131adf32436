use zest_recorder::dom::{Document, NodeId};
use zest_recorder::error::DomError;
use zest_recorder::locator::{ElementLocator, LocatorType, css_path, resolve, xpath};

// =========================================================================
// Helpers
// =========================================================================

/// body > button.btn, body > div > button.btn, body > div > button,
/// body > div#panel > (button, button)
struct Fixture {
    doc: Document,
    top_button: NodeId,
    nested_button: NodeId,
    second_plain: NodeId,
    panel_second: NodeId,
}

fn fixture() -> Fixture {
    let mut doc = Document::new("http://localhost/app");
    let body = doc.body().expect("body");

    let top_button = doc.create_element(body, "button");
    doc.set_attribute(top_button, "class", "btn");

    let first_div = doc.create_element(body, "div");
    let nested_button = doc.create_element(first_div, "button");
    doc.set_attribute(nested_button, "class", "btn");

    let second_div = doc.create_element(body, "div");
    let second_plain = doc.create_element(second_div, "button");

    let panel = doc.create_element(body, "div");
    doc.set_attribute(panel, "id", "panel");
    doc.create_element(panel, "button");
    let panel_second = doc.create_element(panel, "button");

    Fixture {
        doc,
        top_button,
        nested_button,
        second_plain,
        panel_second,
    }
}

/// Every match of `locator` in `doc`.
fn lookup(doc: &Document, locator: &ElementLocator) -> Vec<NodeId> {
    let found = match locator.locator_type {
        LocatorType::Id => doc.query_selector_all(&format!("#{}", locator.element)),
        LocatorType::ClassName => doc.query_selector_all(&format!(".{}", locator.element)),
        LocatorType::CssSelector => doc.query_selector_all(&locator.element),
        LocatorType::Xpath => doc.evaluate_xpath(&locator.element),
        LocatorType::Unresolved => Ok(Vec::new()),
    };
    found.expect("locator should be valid")
}

// =========================================================================
// Resolution order
// =========================================================================

#[test]
fn id_is_preferred() {
    let mut doc = Document::new("http://localhost/");
    let body = doc.body().expect("body");
    let input = doc.create_element(body, "input");
    doc.set_attribute(input, "id", "email");
    doc.set_attribute(input, "class", "field");

    assert_eq!(
        resolve(&doc, input),
        ElementLocator::new(LocatorType::Id, "email")
    );
}

#[test]
fn sibling_buttons_sharing_a_class_get_indexed_xpaths() {
    let mut doc = Document::new("http://localhost/");
    let body = doc.body().expect("body");
    let div = doc.create_element(body, "div");
    let first = doc.create_element(div, "button");
    doc.set_attribute(first, "class", "btn");
    let second = doc.create_element(div, "button");
    doc.set_attribute(second, "class", "btn");

    assert_eq!(
        resolve(&doc, first),
        ElementLocator::new(LocatorType::Xpath, "/html/body/div/button[1]")
    );
    assert_eq!(
        resolve(&doc, second),
        ElementLocator::new(LocatorType::Xpath, "/html/body/div/button[2]")
    );
}

#[test]
fn nested_element_without_id_or_class_gets_css_path() {
    let mut doc = Document::new("http://localhost/");
    let body = doc.body().expect("body");
    let div = doc.create_element(body, "div");
    let span = doc.create_element(div, "span");
    let button = doc.create_element(span, "button");

    assert_eq!(
        resolve(&doc, button),
        ElementLocator::new(LocatorType::CssSelector, "body > div > span > button")
    );
}

#[test]
fn shared_class_falls_back_to_css_path() {
    let f = fixture();
    assert_eq!(
        resolve(&f.doc, f.nested_button),
        ElementLocator::new(LocatorType::CssSelector, "body > div > button")
    );
}

#[test]
fn element_with_several_classes_skips_class_strategy() {
    let mut doc = Document::new("http://localhost/");
    let body = doc.body().expect("body");
    let link = doc.create_element(body, "a");
    doc.set_attribute(link, "class", "nav active");

    assert_eq!(
        resolve(&doc, link),
        ElementLocator::new(LocatorType::CssSelector, "body > a")
    );
}

#[test]
fn ambiguous_css_falls_back_to_xpath() {
    let f = fixture();
    assert_eq!(
        resolve(&f.doc, f.second_plain),
        ElementLocator::new(LocatorType::Xpath, "/html/body/div[2]/button")
    );
}

#[test]
fn xpath_is_anchored_at_unique_ancestor_id() {
    let f = fixture();
    assert_eq!(
        xpath(&f.doc, f.panel_second).as_deref(),
        Some(r#"//div[@id="panel"]/button[2]"#)
    );
    assert_eq!(
        resolve(&f.doc, f.panel_second).locator_type,
        LocatorType::Xpath
    );
}

#[test]
fn css_path_collapses_body() {
    let f = fixture();
    assert_eq!(css_path(&f.doc, f.top_button).as_deref(), Some("body > button"));
    let body = f.doc.body().expect("body");
    assert_eq!(css_path(&f.doc, body).as_deref(), Some("body"));
}

#[test]
fn non_elements_are_unresolved() {
    let mut doc = Document::new("http://localhost/");
    let body = doc.body().expect("body");
    let text = doc.append_text(body, "hello");

    let locator = resolve(&doc, text);
    assert!(locator.is_unresolved());
    assert_eq!(locator.element, "");
    assert_eq!(
        serde_json::to_value(&locator).expect("json"),
        serde_json::json!({"type": "", "element": ""})
    );
}

#[test]
fn every_resolved_locator_finds_exactly_its_element() {
    let f = fixture();
    let body = f.doc.body().expect("body");
    for node in f.doc.descendants(body) {
        let locator = resolve(&f.doc, node);
        if locator.is_unresolved() {
            continue;
        }
        assert_eq!(
            lookup(&f.doc, &locator),
            vec![node],
            "locator {} does not identify node {:?}",
            locator,
            node
        );
    }
}

// =========================================================================
// Selector and XPath queries
// =========================================================================

#[test]
fn selector_groups_return_document_order() {
    let f = fixture();
    let found = f
        .doc
        .query_selector_all("div#panel > button, .btn")
        .expect("valid selector");
    assert_eq!(found.len(), 4);
    assert_eq!(found[0], f.top_button);
    assert_eq!(found[3], f.panel_second);
}

#[test]
fn invalid_selector_is_an_error() {
    let f = fixture();
    assert!(matches!(
        f.doc.query_selector_all("div >"),
        Err(DomError::InvalidSelector(_))
    ));
}

#[test]
fn invalid_xpath_is_an_error() {
    let f = fixture();
    assert!(matches!(
        f.doc.evaluate_xpath("//div[contains(@id, 'p')]"),
        Err(DomError::InvalidXPath(_))
    ));
}

#[test]
fn locator_display_and_wire_names() {
    let locator = ElementLocator::new(LocatorType::CssSelector, "body > a");
    assert_eq!(locator.to_string(), "cssSelector=body > a");
    assert_eq!(
        serde_json::to_value(&locator).expect("json"),
        serde_json::json!({"type": "cssSelector", "element": "body > a"})
    );
    assert_eq!(LocatorType::ClassName.as_str(), "className");
    assert_eq!(LocatorType::Xpath.as_str(), "xpath");
}
