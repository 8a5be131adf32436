use std::rc::Rc;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::dom::{DocumentId, NodeId, Page};
use crate::recorder::events::{UiEvent, UiEventKind};
use crate::recorder::listeners::ListenerRegistry;
use crate::recorder::notify::StatementObserver;
use crate::recorder::translator::Translator;
use crate::recorder::wait::Clock;
use crate::settings::{
    DOWNLOAD_SCRIPT, INIT_SCRIPT, LOGIN_URL, START_TIME, SettingsStore, ZAP_CLOSE_WINDOW_HANDLE,
    ZAP_RECORDING_ACTIVE,
};
use crate::transport::{Message, MessageKind, Transport, send_logged};
use crate::zest::Statement;

/// Class carried by every element of the recording overlay.
pub const OVERLAY_CLASS: &str = "ZapFloatingDivElements";

/// What the recorder says about itself in the opening comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderIdentity {
    pub product: String,
    pub version: String,
    pub user_agent: String,
}

impl Default for RecorderIdentity {
    fn default() -> Self {
        Self {
            product: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            user_agent: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartOptions {
    /// Open the script with a comment and a browser launch.
    pub init_script: bool,
    /// URL the launch statement opens; the page URL when empty.
    pub login_url: String,
    /// Epoch millis timing starts from; 0 starts at the first statement.
    pub start_time: i64,
}

impl StartOptions {
    /// Options stored in settings by whoever asked for recording to start.
    pub fn from_settings(settings: &dyn SettingsStore) -> Self {
        Self {
            init_script: settings.get_bool(INIT_SCRIPT, false),
            login_url: settings.get_str(LOGIN_URL, ""),
            start_time: settings.get_i64(START_TIME, 0),
        }
    }
}

/// `chrome` for Chromium-based user agents, `firefox` otherwise.
pub fn browser_name(user_agent: &str) -> &'static str {
    if user_agent.contains("Chrome") {
        "chrome"
    } else {
        "firefox"
    }
}

/// In-page recorder: turns UI events into statements and streams them to
/// the background.
pub struct Recorder {
    transport: Rc<dyn Transport>,
    settings: Rc<dyn SettingsStore>,
    clock: Rc<dyn Clock>,
    identity: RecorderIdentity,
    translator: Translator,
    listeners: ListenerRegistry,
    observer: Option<Rc<dyn StatementObserver>>,
    active: bool,
    listeners_attached: bool,
    statements_sent: usize,
}

impl Recorder {
    pub fn new(
        transport: Rc<dyn Transport>,
        settings: Rc<dyn SettingsStore>,
        clock: Rc<dyn Clock>,
        identity: RecorderIdentity,
    ) -> Self {
        Self {
            transport,
            settings,
            clock,
            identity,
            translator: Translator::new(),
            listeners: ListenerRegistry::new(),
            observer: None,
            active: false,
            listeners_attached: false,
            statements_sent: 0,
        }
    }

    pub fn set_observer(&mut self, observer: Rc<dyn StatementObserver>) {
        self.observer = Some(observer);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Statements sent since the last `start`.
    pub fn statements_sent(&self) -> usize {
        self.statements_sent
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn listeners_mut(&mut self) -> &mut ListenerRegistry {
        &mut self.listeners
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub fn start(&mut self, page: &Page, options: &StartOptions) {
        info!(
            init_script = options.init_script,
            login_url = %options.login_url,
            "recording user interactions"
        );
        self.statements_sent = 0;
        if options.init_script {
            self.initialization_script(page, options);
        }
        self.active = true;
        self.settings.set(ZAP_RECORDING_ACTIVE, json!(true));

        if self.listeners_attached {
            return;
        }
        self.listeners_attached = true;
        if let Err(e) = self.listeners.attach_document(page, page.top(), -1, 0) {
            warn!(error = %e, "could not attach listeners to page");
        }
    }

    fn initialization_script(&mut self, page: &Page, options: &StartOptions) {
        self.settings.set(INIT_SCRIPT, json!(false));
        self.settings.set(LOGIN_URL, json!(""));
        self.settings.set(START_TIME, json!(0));
        self.settings.set(DOWNLOAD_SCRIPT, json!(true));
        self.translator.seed_wait(options.start_time);

        let comment = format!(
            "Recorded by {} {} on {}",
            self.identity.product, self.identity.version, self.identity.user_agent
        );
        let url = if options.login_url.is_empty() {
            page.document(page.top())
                .map(|d| d.url().to_string())
                .unwrap_or_default()
        } else {
            options.login_url.clone()
        };
        let browser = browser_name(&self.identity.user_agent);

        self.send_statement(Statement::comment(&comment));
        self.send_statement(Statement::launch_browser(browser, &url));
    }

    /// Flushes any pending submit, closes the window when configured, and
    /// tells the background recording is over.
    pub fn stop(&mut self) {
        if !self.active {
            return;
        }
        info!(statements = self.statements_sent, "stopping recording");
        let now = self.clock.now_millis();
        for statement in self.translator.flush(now) {
            self.send_statement(statement);
        }
        if self.statements_sent > 0 && self.settings.get_bool(ZAP_CLOSE_WINDOW_HANDLE, false) {
            self.send_statement(Statement::window_close(0));
        }

        self.active = false;
        self.settings.set(ZAP_RECORDING_ACTIVE, json!(false));
        send_logged(self.transport.as_ref(), Message::signal(MessageKind::StopRecording));
    }

    // ========================================================================
    // Event handling
    // ========================================================================

    pub fn handle_event(&mut self, page: &Page, event: &UiEvent) {
        if !self.active {
            return;
        }
        let Some(binding) = self.listeners.binding_for(event.document) else {
            debug!(document = event.document.0, event = event.name(), "no listener on document");
            return;
        };
        let doc = match page.document(event.document) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(error = %e, "event from unknown document");
                return;
            }
        };
        if doc
            .element(event.target)
            .is_some_and(|el| el.has_class(OVERLAY_CLASS))
        {
            debug!(event = event.name(), "overlay event ignored");
            return;
        }

        let now = self.clock.now_millis();
        let statements = match &event.kind {
            UiEventKind::Click => self.translator.on_click(doc, event.target, &binding, now),
            UiEventKind::Change => self.translator.on_change(doc, event.target, &binding, now),
            UiEventKind::KeyDown { key } => {
                if !self.listeners.accepts_keydown(event.document, event.target) {
                    return;
                }
                self.translator
                    .on_keydown(doc, event.target, key, event.timestamp, now)
            }
            UiEventKind::Scroll => self.translator.on_scroll(&binding, now),
        };

        for statement in statements {
            self.send_statement(statement);
        }
    }

    /// Nodes were added under `target`; new inputs get keydown listeners.
    pub fn dom_mutated(&mut self, page: &Page, doc: DocumentId, target: NodeId) {
        if let Err(e) = self.listeners.on_nodes_added(page, doc, target) {
            warn!(error = %e, "could not process added nodes");
        }
    }

    pub fn frame_loaded(&mut self, page: &Page, doc: DocumentId, frame: NodeId) {
        if let Err(e) = self.listeners.on_frame_loaded(page, doc, frame) {
            warn!(error = %e, "could not instrument loaded frame");
        }
    }

    pub fn frame_src_changed(&mut self, page: &Page, doc: DocumentId, frame: NodeId) {
        self.listeners.on_frame_src_changed(page, doc, frame);
    }

    fn send_statement(&mut self, statement: Statement) {
        let json = match serde_json::to_string(&statement) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize statement");
                return;
            }
        };
        self.statements_sent += 1;
        if let Some(observer) = &self.observer {
            observer.statement_recorded(&statement);
        }
        send_logged(self.transport.as_ref(), Message::text(MessageKind::ZestScript, json));
    }
}
