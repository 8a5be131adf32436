use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::json;
use tracing::info;

use crate::dom::{Document, DocumentId, NodeId, Page};
use crate::error::{SessionError, SessionResult};
use crate::recorder::{
    Clock, ManualClock, Notification, NotificationLog, Recorder, RecorderIdentity, StartOptions,
    UiEvent,
};
use crate::report::ReportCache;
use crate::session::session_model::{NodeSpec, RecordingSession, SessionEvent};
use crate::settings::{INIT_SCRIPT, LOGIN_URL, START_TIME, SettingsStore, ZAP_SCRIPT_NAME};
use crate::transport::{Background, Forwarder, LocalChannel, Message, MessageKind, Reply, Transport};
use crate::zest::ScriptMessage;

/// Result of replaying a session.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub script: ScriptMessage,
    pub statement_count: usize,
    pub notifications: Vec<Notification>,
}

/// The page built from a session, with its documents addressable by name.
pub struct LoadedPage {
    pub page: Page,
    names: HashMap<String, DocumentId>,
}

impl LoadedPage {
    pub fn document_id(&self, name: Option<&str>) -> SessionResult<DocumentId> {
        match name {
            None => Ok(self.page.top()),
            Some(name) => self
                .names
                .get(name)
                .copied()
                .ok_or_else(|| SessionError::UnknownDocument(name.to_string())),
        }
    }

    /// First element of `doc` matching `selector`.
    pub fn target(&self, doc: DocumentId, selector: &str) -> SessionResult<NodeId> {
        self.page
            .document(doc)?
            .query_selector(selector)?
            .ok_or_else(|| SessionError::TargetNotFound {
                document: self.page.document(doc).map(|d| d.url().to_string()).unwrap_or_default(),
                selector: selector.to_string(),
            })
    }
}

/// Replays a `RecordingSession` through the recorder, the report cache and
/// a background that forwards to `forwarder`.
pub struct SessionRunner {
    settings: Rc<dyn SettingsStore>,
    forwarder: Rc<dyn Forwarder>,
    identity: RecorderIdentity,
}

impl SessionRunner {
    pub fn new(settings: Rc<dyn SettingsStore>, forwarder: Rc<dyn Forwarder>) -> Self {
        Self {
            settings,
            forwarder,
            identity: RecorderIdentity::default(),
        }
    }

    /// Product name and version for the opening comment.
    pub fn with_product(mut self, product: &str, version: &str) -> Self {
        self.identity.product = product.to_string();
        self.identity.version = version.to_string();
        self
    }

    pub fn run(&self, session: &RecordingSession) -> SessionResult<SessionOutcome> {
        let mut loaded = build_page(session)?;
        let clock = Rc::new(ManualClock::new(session.clock_start));

        if self.settings.get(ZAP_SCRIPT_NAME).is_none() {
            self.settings.set(ZAP_SCRIPT_NAME, json!(session.name));
        }

        let background = Rc::new(RefCell::new(Background::new(
            Rc::clone(&self.forwarder),
            Rc::clone(&self.settings),
        )));
        let channel = Rc::new(LocalChannel::new(background));

        let mut cache = ReportCache::new(channel.clone(), clock.clone());
        let top = loaded.page.top();
        if session.report_page {
            cache.report_page_loaded(loaded.page.document(top)?, &session.storage);
        }

        let identity = RecorderIdentity {
            user_agent: session.user_agent.clone(),
            ..self.identity.clone()
        };
        let notifications = Rc::new(NotificationLog::new());
        let mut recorder = Recorder::new(
            channel.clone(),
            Rc::clone(&self.settings),
            clock.clone(),
            identity,
        );
        recorder.set_observer(notifications.clone());

        // The popup leaves these for the page to pick up on start.
        self.settings.set(INIT_SCRIPT, json!(session.init_script));
        self.settings.set(LOGIN_URL, json!(session.login_url));
        let start_time = if session.init_script { clock.now_millis() } else { 0 };
        self.settings.set(START_TIME, json!(start_time));

        channel.send(Message::signal(MessageKind::StartRecording))?;
        let options = StartOptions::from_settings(self.settings.as_ref());
        recorder.start(&loaded.page, &options);
        info!(name = %session.name, events = session.events.len(), "replaying session");

        for event in &session.events {
            self.replay_event(event, &mut loaded, &mut recorder, &mut cache, &clock, session)?;
        }
        if recorder.is_active() {
            recorder.stop();
        }

        if session.report_page {
            let url = loaded.page.document(top)?.url().to_string();
            cache.report_page_unloaded(&url, &session.storage);
        }

        let script = match channel.send(Message::signal(MessageKind::SaveZestScript))? {
            Reply::Script(script) => script,
            _ => return Err(SessionError::MissingScript),
        };
        Ok(SessionOutcome {
            script,
            statement_count: recorder.statements_sent(),
            notifications: notifications.shown(),
        })
    }

    fn replay_event(
        &self,
        event: &SessionEvent,
        loaded: &mut LoadedPage,
        recorder: &mut Recorder,
        cache: &mut ReportCache,
        clock: &ManualClock,
        session: &RecordingSession,
    ) -> SessionResult<()> {
        let now = clock.now_millis().max(0) as u64;
        match event {
            SessionEvent::Click { document, target } => {
                let doc = loaded.document_id(document.as_deref())?;
                let node = loaded.target(doc, target)?;
                recorder.handle_event(&loaded.page, &UiEvent::click(doc, node, now));
            }
            SessionEvent::Change {
                document,
                target,
                value,
            } => {
                let doc = loaded.document_id(document.as_deref())?;
                let node = loaded.target(doc, target)?;
                loaded.page.document_mut(doc)?.set_value(node, value);
                recorder.handle_event(&loaded.page, &UiEvent::change(doc, node, now));
            }
            SessionEvent::Keydown {
                document,
                target,
                key,
                timestamp,
            } => {
                let doc = loaded.document_id(document.as_deref())?;
                let node = loaded.target(doc, target)?;
                let stamp = timestamp.unwrap_or(now);
                recorder.handle_event(&loaded.page, &UiEvent::key_down(doc, node, key, stamp));
            }
            SessionEvent::Scroll { document, target } => {
                let doc = loaded.document_id(document.as_deref())?;
                let node = match target {
                    Some(selector) => loaded.target(doc, selector)?,
                    None => loaded.page.document(doc)?.root(),
                };
                recorder.handle_event(&loaded.page, &UiEvent::scroll(doc, node, now));
            }
            SessionEvent::Wait { millis } => clock.advance(*millis),
            SessionEvent::Append {
                document,
                parent,
                nodes,
            } => {
                let doc = loaded.document_id(document.as_deref())?;
                let parent_node = loaded.target(doc, parent)?;
                for node in nodes {
                    build_node(&mut loaded.page, &loaded.names, doc, parent_node, node)?;
                }
                recorder.dom_mutated(&loaded.page, doc, parent_node);
                if session.report_page {
                    cache.report_dom_mutation(loaded.page.document(doc)?, &[parent_node]);
                }
            }
            SessionEvent::Stop => recorder.stop(),
        }
        Ok(())
    }
}

/// Builds every document first so frames can point at any of them.
pub fn build_page(session: &RecordingSession) -> SessionResult<LoadedPage> {
    let mut specs = session.documents.iter();
    let top = specs
        .next()
        .ok_or_else(|| SessionError::UnknownDocument("<top>".to_string()))?;

    let mut page = Page::new(Document::new(&top.url));
    let mut names = HashMap::new();
    names.insert(top.name.clone(), page.top());
    for spec in specs {
        let id = page.add_document(Document::new(&spec.url));
        names.insert(spec.name.clone(), id);
    }

    for spec in &session.documents {
        let doc = names
            .get(&spec.name)
            .copied()
            .ok_or_else(|| SessionError::UnknownDocument(spec.name.clone()))?;
        let body = page
            .document(doc)?
            .body()
            .ok_or_else(|| SessionError::UnknownDocument(spec.name.clone()))?;
        for node in &spec.body {
            build_node(&mut page, &names, doc, body, node)?;
        }
    }

    Ok(LoadedPage { page, names })
}

fn build_node(
    page: &mut Page,
    names: &HashMap<String, DocumentId>,
    doc: DocumentId,
    parent: NodeId,
    spec: &NodeSpec,
) -> SessionResult<NodeId> {
    let node = match &spec.frame {
        Some(frame_doc) => {
            let content = names
                .get(frame_doc)
                .copied()
                .ok_or_else(|| SessionError::UnknownDocument(frame_doc.clone()))?;
            page.attach_frame(doc, parent, &spec.tag, Some(content))?
        }
        None => page.document_mut(doc)?.create_element(parent, &spec.tag),
    };

    let document = page.document_mut(doc)?;
    if let Some(id) = &spec.id {
        document.set_attribute(node, "id", id);
    }
    if let Some(class) = &spec.class {
        document.set_attribute(node, "class", class);
    }
    for (name, value) in &spec.attrs {
        document.set_attribute(node, name, value);
    }
    if let Some(value) = &spec.value {
        document.set_value(node, value);
    }
    if let Some(text) = &spec.text {
        document.append_text(node, text);
    }

    for child in &spec.children {
        build_node(page, names, doc, node, child)?;
    }
    Ok(node)
}
