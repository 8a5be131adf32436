use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

use sha1::{Digest, Sha1};
use tracing::debug;

use crate::recorder::wait::Clock;
use crate::report::report_model::{ReportedEvent, ReportedObject};
use crate::transport::{Message, MessageKind, Transport, send_logged};

/// Page-lifetime dedup of passive observations before they reach ZAP.
/// Recording sessions never touch it.
pub struct ReportCache {
    transport: Rc<dyn Transport>,
    pub(crate) clock: Rc<dyn Clock>,
    /// SHA-1 fingerprints of the short keys already forwarded.
    reported_objects: HashSet<String>,
    /// Open counter per event name.
    reported_events: BTreeMap<String, ReportedEvent>,
}

impl ReportCache {
    pub fn new(transport: Rc<dyn Transport>, clock: Rc<dyn Clock>) -> Self {
        Self {
            transport,
            clock,
            reported_objects: HashSet::new(),
            reported_events: BTreeMap::new(),
        }
    }

    /// Forwards `obj` unless an observation with the same short key was
    /// already forwarded. Returns whether it was forwarded.
    pub fn report_object(&mut self, obj: &ReportedObject) -> bool {
        let fingerprint = key_fingerprint(&obj.short_key());
        if self.reported_objects.contains(&fingerprint) {
            debug!(id = %obj.id, object_type = %obj.object_type, "duplicate object dropped");
            return false;
        }
        self.send(Message::text(MessageKind::ReportObject, obj.to_json()));
        self.reported_objects.insert(fingerprint);
        true
    }

    /// Counts `event` under its name. A new name or a changed URL forwards
    /// immediately; repeats at the same URL only bump the count.
    pub fn report_event(&mut self, event: ReportedEvent) {
        let open = self
            .reported_events
            .get(&event.event_name)
            .map(|existing| (existing.url != event.url, existing.to_json()));

        match open {
            None => {
                self.send(Message::text(MessageKind::ReportEvent, event.to_json()));
                self.reported_events.insert(event.event_name.clone(), event);
            }
            Some((true, previous)) => {
                self.send(Message::text(MessageKind::ReportEvent, previous));
                self.send(Message::text(MessageKind::ReportEvent, event.to_json()));
                self.reported_events.insert(event.event_name.clone(), event);
            }
            Some((false, _)) => {
                if let Some(existing) = self.reported_events.get_mut(&event.event_name) {
                    existing.count += 1;
                }
            }
        }
    }

    /// Forwards every open counter with its current count.
    pub fn flush_events(&self) {
        for event in self.reported_events.values() {
            self.send(Message::text(MessageKind::ReportEvent, event.to_json()));
        }
    }

    pub fn reported_object_count(&self) -> usize {
        self.reported_objects.len()
    }

    pub fn open_event(&self, event_name: &str) -> Option<&ReportedEvent> {
        self.reported_events.get(event_name)
    }

    pub(crate) fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    pub(crate) fn send(&self, message: Message) {
        send_logged(self.transport.as_ref(), message);
    }
}

fn key_fingerprint(key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}
