#![allow(dead_code)]

use std::rc::Rc;

use zest_recorder::dom::{Document, DocumentId, NodeId, Page};
use zest_recorder::recorder::{ManualClock, Recorder, RecorderIdentity, StartOptions};
use zest_recorder::settings::MemorySettings;
use zest_recorder::transport::{MemoryTransport, MessageKind};
use zest_recorder::zest::Statement;

pub const CLOCK_START: i64 = 1_700_000_000_000;

/// Login form on the top document: `#user`, `#pass` and a submit button.
pub struct LoginPage {
    pub page: Page,
    pub form: NodeId,
    pub user: NodeId,
    pub pass: NodeId,
    pub submit: NodeId,
}

pub fn login_page() -> LoginPage {
    let mut doc = Document::new("http://localhost:3000/login");
    let body = doc.body().expect("body");
    let form = doc.create_element(body, "form");
    doc.set_attribute(form, "id", "login");
    let user = doc.create_element(form, "input");
    doc.set_attribute(user, "id", "user");
    let pass = doc.create_element(form, "input");
    doc.set_attribute(pass, "id", "pass");
    doc.set_attribute(pass, "type", "password");
    let submit = doc.create_element(form, "button");
    doc.set_attribute(submit, "class", "primary");
    doc.append_text(submit, "Sign in");

    LoginPage {
        page: Page::new(doc),
        form,
        user,
        pass,
        submit,
    }
}

/// Top document with one same-origin iframe holding a button `#inner`.
pub struct FramedPage {
    pub page: Page,
    pub top_button: NodeId,
    pub frame: NodeId,
    pub child: DocumentId,
    pub inner_button: NodeId,
}

pub fn framed_page(frame_origin: &str) -> FramedPage {
    let mut top = Document::new("http://localhost:3000/index.html");
    let body = top.body().expect("body");
    let top_button = top.create_element(body, "button");
    top.set_attribute(top_button, "id", "outer");

    let mut inner = Document::new(&format!("{}/frame.html", frame_origin));
    let inner_body = inner.body().expect("body");
    let inner_button = inner.create_element(inner_body, "button");
    inner.set_attribute(inner_button, "id", "inner");

    let mut page = Page::new(top);
    let child = page.add_document(inner);
    let frame = page
        .attach_frame(page.top(), body, "iframe", Some(child))
        .expect("attach frame");

    FramedPage {
        page,
        top_button,
        frame,
        child,
        inner_button,
    }
}

pub struct Harness {
    pub recorder: Recorder,
    pub transport: Rc<MemoryTransport>,
    pub settings: Rc<MemorySettings>,
    pub clock: Rc<ManualClock>,
}

pub fn harness() -> Harness {
    let transport = Rc::new(MemoryTransport::new());
    let settings = Rc::new(MemorySettings::new());
    let clock = Rc::new(ManualClock::new(CLOCK_START));
    let recorder = Recorder::new(
        transport.clone(),
        settings.clone(),
        clock.clone(),
        RecorderIdentity {
            product: "ZAP Browser Extension".to_string(),
            version: "1.2.3".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) Chrome/120.0".to_string(),
        },
    );
    Harness {
        recorder,
        transport,
        settings,
        clock,
    }
}

/// Starts recording without the opening comment and launch.
pub fn start_plain(h: &mut Harness, page: &Page) {
    h.recorder.start(
        page,
        &StartOptions {
            init_script: false,
            login_url: String::new(),
            start_time: 0,
        },
    );
}

/// Statements the recorder sent, in order.
pub fn sent_statements(transport: &MemoryTransport) -> Vec<Statement> {
    transport
        .sent_of(MessageKind::ZestScript)
        .iter()
        .map(|m| serde_json::from_str(&m.data_text()).expect("statement json"))
        .collect()
}

pub fn element_types(statements: &[Statement]) -> Vec<&'static str> {
    statements.iter().map(Statement::element_type).collect()
}
