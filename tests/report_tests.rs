use std::rc::Rc;

use serde_json::Value;

use zest_recorder::dom::Document;
use zest_recorder::recorder::ManualClock;
use zest_recorder::report::{PageStorage, ReportCache, ReportedEvent, ReportedObject};
use zest_recorder::transport::{MemoryTransport, Message, MessageKind};

// =========================================================================
// Helpers
// =========================================================================

fn cache() -> (ReportCache, Rc<MemoryTransport>, Rc<ManualClock>) {
    let transport = Rc::new(MemoryTransport::new());
    let clock = Rc::new(ManualClock::new(1_000));
    let cache = ReportCache::new(transport.clone(), clock.clone());
    (cache, transport, clock)
}

fn payloads(transport: &MemoryTransport, kind: MessageKind) -> Vec<Value> {
    transport
        .sent_of(kind)
        .iter()
        .map(|m| serde_json::from_str(&m.data_text()).expect("payload json"))
        .collect()
}

fn shop_page() -> Document {
    let mut doc = Document::new("http://localhost:3000/shop/index.html");
    let body = doc.body().expect("body");
    let nav = doc.create_element(body, "a");
    doc.set_attribute(nav, "href", "cart");
    doc.append_text(nav, "Cart");
    let form = doc.create_element(body, "form");
    doc.set_attribute(form, "id", "search");
    let query = doc.create_element(form, "input");
    doc.set_attribute(query, "id", "q");
    doc.set_attribute(query, "type", "Search");
    doc.set_value(query, "boots");
    let go = doc.create_element(form, "button");
    doc.append_text(go, "Go");
    doc
}

// =========================================================================
// Object dedup
// =========================================================================

#[test]
fn element_seen_twice_is_reported_once() {
    let (mut cache, transport, _) = cache();
    let doc = shop_page();
    let link = doc.links()[0];

    let first = ReportedObject::from_element(&doc, link, 1).expect("element");
    let later = ReportedObject::from_element(&doc, link, 99).expect("element");
    assert!(cache.report_object(&first));
    assert!(!cache.report_object(&later));

    assert_eq!(transport.sent_of(MessageKind::ReportObject).len(), 1);
    assert_eq!(cache.reported_object_count(), 1);
}

#[test]
fn observations_differing_only_in_xpath_are_reported_once() {
    let (mut cache, transport, _) = cache();
    let doc = shop_page();
    let link = doc.links()[0];

    let mut first = ReportedObject::from_element(&doc, link, 1).expect("element");
    first.xpath = Some("/html/body/a".to_string());
    let mut second = first.clone();
    second.xpath = Some("//div[@id=\"nav\"]/a".to_string());
    assert_eq!(first.short_key(), second.short_key());

    assert!(cache.report_object(&first));
    assert!(!cache.report_object(&second));
    assert_eq!(transport.sent_of(MessageKind::ReportObject).len(), 1);
}

#[test]
fn generic_objects_keep_timestamp_in_key() {
    let (mut cache, _, _) = cache();
    let a = ReportedObject::new("custom", "", "x", "", None, "http://localhost/", 1);
    let b = ReportedObject::new("custom", "", "x", "", None, "http://localhost/", 2);

    assert!(cache.report_object(&a));
    assert!(cache.report_object(&b));
    assert!(!cache.report_object(&a));
}

#[test]
fn storage_entries_ignore_url_but_cookies_do_not() {
    let (mut cache, _, _) = cache();

    assert!(cache.report_object(&ReportedObject::storage("localStorage", "token", "abc", "http://localhost/a", 1)));
    assert!(!cache.report_object(&ReportedObject::storage("localStorage", "token", "abc", "http://localhost/b", 2)));
    assert!(cache.report_object(&ReportedObject::storage("localStorage", "token", "xyz", "http://localhost/b", 3)));

    assert!(cache.report_object(&ReportedObject::cookie("sid", "1", "http://localhost/a", 1)));
    assert!(cache.report_object(&ReportedObject::cookie("sid", "1", "http://localhost/b", 2)));
    assert!(!cache.report_object(&ReportedObject::cookie("sid", "1", "http://localhost/b", 3)));
}

#[test]
fn input_observation_carries_type_value_and_form() {
    let doc = shop_page();
    let input = doc.query_selector("#q").expect("selector").expect("input");

    let obj = ReportedObject::from_element(&doc, input, 5).expect("element");
    assert_eq!(obj.object_type, "nodeAdded");
    assert_eq!(obj.tag_name, "INPUT");
    assert_eq!(obj.node_name, "INPUT");
    assert_eq!(obj.tag_type.as_deref(), Some("search"));
    assert_eq!(obj.text.as_deref(), Some("boots"));
    assert_eq!(obj.form_id, Some(0));
    assert_eq!(obj.xpath.as_deref(), Some(r#"//input[@id="q"]"#));

    let json: Value = serde_json::from_str(&obj.to_json()).expect("json");
    assert_eq!(json["type"], "nodeAdded");
    assert_eq!(json["tagType"], "search");
    assert_eq!(json["formId"], 0);
    assert!(json.get("href").is_none());
}

// =========================================================================
// Event counters
// =========================================================================

#[test]
fn repeated_event_only_counts() {
    let (mut cache, transport, _) = cache();

    cache.report_event(ReportedEvent::new("domMutation", "http://localhost/a", 1));
    cache.report_event(ReportedEvent::new("domMutation", "http://localhost/a", 2));
    cache.report_event(ReportedEvent::new("domMutation", "http://localhost/a", 3));

    assert_eq!(transport.sent_of(MessageKind::ReportEvent).len(), 1);
    assert_eq!(cache.open_event("domMutation").expect("open").count, 3);
}

#[test]
fn url_change_sends_old_counter_then_new_event() {
    let (mut cache, transport, _) = cache();

    cache.report_event(ReportedEvent::new("domMutation", "http://localhost/a", 1));
    cache.report_event(ReportedEvent::new("domMutation", "http://localhost/a", 2));
    cache.report_event(ReportedEvent::new("domMutation", "http://localhost/b", 3));

    let events = payloads(&transport, MessageKind::ReportEvent);
    assert_eq!(events.len(), 3);
    assert_eq!(events[1]["url"], "http://localhost/a");
    assert_eq!(events[1]["count"], 2);
    assert_eq!(events[2]["url"], "http://localhost/b");
    assert_eq!(events[2]["count"], 1);
    assert_eq!(events[2]["eventName"], "domMutation");
    assert_eq!(cache.open_event("domMutation").expect("open").url, "http://localhost/b");
}

#[test]
fn flush_sends_open_counters() {
    let (mut cache, transport, _) = cache();
    cache.report_event(ReportedEvent::new("domMutation", "http://localhost/", 1));
    cache.report_event(ReportedEvent::new("domMutation", "http://localhost/", 2));
    transport.clear();

    cache.flush_events();

    let events = payloads(&transport, MessageKind::ReportEvent);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["count"], 2);
}

// =========================================================================
// Page lifecycle
// =========================================================================

#[test]
fn page_load_reports_event_then_structure_and_storage() {
    let (mut cache, transport, _) = cache();
    let doc = shop_page();
    let storage = PageStorage {
        local: [("theme".to_string(), "dark".to_string())].into_iter().collect(),
        session: Default::default(),
        cookies: "sid=42; lang=en".to_string(),
    };

    cache.report_page_loaded(&doc, &storage);

    let sent = transport.sent();
    assert_eq!(sent[0].kind, MessageKind::ReportEvent);
    let load: Value = serde_json::from_str(&sent[0].data_text()).expect("json");
    assert_eq!(load["eventName"], "pageLoad");

    let objects = payloads(&transport, MessageKind::ReportObject);
    let types: Vec<(&str, &str)> = objects
        .iter()
        .map(|o| (o["type"].as_str().unwrap_or(""), o["tagName"].as_str().unwrap_or("")))
        .collect();
    assert_eq!(
        types,
        vec![
            ("nodeAdded", "A"),
            ("nodeAdded", "FORM"),
            ("nodeAdded", "INPUT"),
            ("nodeAdded", "BUTTON"),
            ("localStorage", ""),
            ("cookies", ""),
            ("cookies", ""),
        ]
    );
    assert_eq!(objects[0]["href"], "http://localhost:3000/shop/cart");
    assert_eq!(objects[5]["id"], "sid");
    assert_eq!(objects[5]["text"], "42");
}

#[test]
fn reloading_same_page_only_reports_load_event() {
    let (mut cache, transport, clock) = cache();
    let doc = shop_page();
    cache.report_page_loaded(&doc, &PageStorage::default());
    transport.clear();

    clock.advance(60_000);
    cache.report_page_loaded(&doc, &PageStorage::default());

    assert_eq!(transport.sent().len(), 1);
    assert_eq!(transport.sent()[0].kind, MessageKind::ReportEvent);
}

#[test]
fn callback_url_sends_zap_details_only() {
    let (mut cache, transport, _) = cache();
    let doc = Document::new("http://localhost:8080/zapCallBackUrl/123456");

    cache.report_page_loaded(&doc, &PageStorage::default());

    assert_eq!(
        transport.sent(),
        vec![Message::zap_details("http://localhost:8080/zapCallBackUrl/123456", "")]
    );
}

#[test]
fn dom_mutation_reports_new_controls_under_target() {
    let (mut cache, transport, _) = cache();
    let mut doc = shop_page();
    cache.report_page_loaded(&doc, &PageStorage::default());
    transport.clear();

    let body = doc.body().expect("body");
    let dialog = doc.create_element(body, "div");
    let email = doc.create_element(dialog, "input");
    doc.set_attribute(email, "id", "email");
    cache.report_dom_mutation(&doc, &[dialog]);

    let events = payloads(&transport, MessageKind::ReportEvent);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["eventName"], "domMutation");
    let objects = payloads(&transport, MessageKind::ReportObject);
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0]["id"], "email");
}

#[test]
fn page_unload_flushes_counters() {
    let (mut cache, transport, _) = cache();
    let doc = shop_page();
    cache.report_dom_mutation(&doc, &[]);
    cache.report_dom_mutation(&doc, &[]);
    transport.clear();

    cache.report_page_unloaded(doc.url(), &PageStorage::default());

    let events = payloads(&transport, MessageKind::ReportEvent);
    assert_eq!(events[0]["eventName"], "pageUnload");
    assert_eq!(events[1]["eventName"], "domMutation");
    assert_eq!(events[1]["count"], 2);
}
