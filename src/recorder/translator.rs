use tracing::debug;

use crate::dom::{Document, NodeId};
use crate::locator::{ElementLocator, resolve};
use crate::recorder::frames::FrameTracker;
use crate::recorder::listeners::Binding;
use crate::recorder::wait::WaitBucketer;
use crate::zest::Statement;

/// Submit held back until the value change that usually follows Enter.
#[derive(Debug, Clone, PartialEq)]
struct CachedSubmit {
    locator: ElementLocator,
    statement: Statement,
    timestamp: u64,
}

/// Turns raw interactions into ordered statements.
#[derive(Debug, Default, Clone)]
pub struct Translator {
    frames: FrameTracker,
    waits: WaitBucketer,
    cached_submit: Option<CachedSubmit>,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_wait(&mut self, start_time: i64) {
        self.waits.seed(start_time);
    }

    pub fn frames(&self) -> &FrameTracker {
        &self.frames
    }

    pub fn has_cached_submit(&self) -> bool {
        self.cached_submit.is_some()
    }

    pub fn on_click(&mut self, doc: &Document, target: NodeId, at: &Binding, now: i64) -> Vec<Statement> {
        let waited = self.waits.waited(now);
        let mut out = self.flush(now);
        out.extend(self.sync_frames(at, now));

        let locator = resolve(doc, target);
        debug!(locator = %locator, waited, "click");
        out.push(Statement::scroll_to(locator.clone(), waited));
        out.push(Statement::click(locator, waited));
        out
    }

    pub fn on_change(&mut self, doc: &Document, target: NodeId, at: &Binding, now: i64) -> Vec<Statement> {
        let waited = self.waits.waited(now);
        let mut out = self.sync_frames(at, now);

        let locator = resolve(doc, target);
        let value = doc.value(target);
        debug!(locator = %locator, waited, "change");

        // Keys typed into another element go after that element's submit.
        if self
            .cached_submit
            .as_ref()
            .is_some_and(|cached| cached.locator != locator)
        {
            out.extend(self.flush(now));
        }
        out.push(Statement::scroll_to(locator.clone(), waited));
        out.push(Statement::send_keys(locator, value, waited));
        out.extend(self.flush(now));
        out
    }

    /// Enter caches a submit; other keys are ignored.
    pub fn on_keydown(
        &mut self,
        doc: &Document,
        target: NodeId,
        key: &str,
        timestamp: u64,
        now: i64,
    ) -> Vec<Statement> {
        if key != "Enter" {
            return Vec::new();
        }
        if self
            .cached_submit
            .as_ref()
            .is_some_and(|cached| cached.timestamp == timestamp)
        {
            debug!(timestamp, "duplicate Enter ignored");
            return Vec::new();
        }

        let out = self.flush(now);
        let locator = resolve(doc, target);
        let waited = self.waits.waited(now);
        debug!(locator = %locator, timestamp, "submit cached");
        self.cached_submit = Some(CachedSubmit {
            statement: Statement::submit(locator.clone(), waited),
            locator,
            timestamp,
        });
        out
    }

    /// Scrolling records nothing but keeps replay in the right frame.
    pub fn on_scroll(&mut self, at: &Binding, now: i64) -> Vec<Statement> {
        self.sync_frames(at, now)
    }

    /// Emits the cached submit, preceded by a scroll to its element.
    pub fn flush(&mut self, now: i64) -> Vec<Statement> {
        match self.cached_submit.take() {
            Some(cached) => {
                let waited = self.waits.waited(now);
                vec![Statement::scroll_to(cached.locator, waited), cached.statement]
            }
            None => Vec::new(),
        }
    }

    fn sync_frames(&mut self, at: &Binding, now: i64) -> Vec<Statement> {
        let switches = self.frames.sync(at.level, at.frame);
        if switches.is_empty() {
            return switches;
        }
        let mut out = self.flush(now);
        out.extend(switches);
        out
    }
}
