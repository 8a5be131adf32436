use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, warn};

use crate::dom::{DocumentId, NodeId, Page};
use crate::error::DomResult;

pub type SubscriptionId = u64;

/// Deepest frame nesting that gets instrumented.
pub const MAX_FRAME_DEPTH: i64 = 16;

/// Context a document's listeners were registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub document: DocumentId,
    /// Frame nesting depth, `-1` for the top document.
    pub level: i64,
    /// Slot of the frame showing this document within its parent.
    pub frame: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subscription {
    /// Click, change and scroll listeners on a document.
    Document(Binding),
    /// Keydown listener on one `input`.
    Input { document: DocumentId, node: NodeId },
    /// Child-list observer that picks up inputs added later.
    Mutation { document: DocumentId },
    /// Load listener on a frame whose document is not ready yet.
    FrameLoad {
        document: DocumentId,
        frame: NodeId,
        level: i64,
    },
    /// Observer of a frame's `src` attribute.
    FrameSrc {
        document: DocumentId,
        frame: NodeId,
        level: i64,
    },
}

/// Every listener the recorder has attached, addressable by id so that
/// teardown is explicit.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    next_id: SubscriptionId,
    subscriptions: BTreeMap<SubscriptionId, Subscription>,
    bindings: HashMap<DocumentId, Binding>,
    inputs: HashSet<(DocumentId, NodeId)>,
    observers: HashSet<DocumentId>,
    frame_loads: HashSet<(DocumentId, NodeId)>,
    frame_srcs: HashSet<(DocumentId, NodeId)>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instruments `doc` and every same-origin frame below it. Cross-origin
    /// frames are logged and left out.
    pub fn attach_document(
        &mut self,
        page: &Page,
        doc: DocumentId,
        level: i64,
        frame: i64,
    ) -> DomResult<()> {
        let document = page.document(doc)?;
        if level > MAX_FRAME_DEPTH {
            warn!(document = doc.0, level, "frames nested too deep, not instrumented");
            return Ok(());
        }
        let binding = Binding {
            document: doc,
            level,
            frame,
        };

        if self.bindings.insert(doc, binding).is_some() {
            debug!(document = doc.0, level, frame, "document rebound");
        } else {
            self.subscribe(Subscription::Document(binding));
            self.subscribe(Subscription::Mutation { document: doc });
        }

        for frame_node in document.frames() {
            self.process_frame(page, doc, frame_node, level + 1);
        }
        for input in document.elements_by_tag(document.root(), "input") {
            self.add_input(doc, input);
        }
        Ok(())
    }

    /// Registers keydown listeners for inputs at or below `target`.
    pub fn on_nodes_added(&mut self, page: &Page, doc: DocumentId, target: NodeId) -> DomResult<()> {
        if !self.bindings.contains_key(&doc) || !self.observers.contains(&doc) {
            return Ok(());
        }
        let document = page.document(doc)?;
        if document.tag_name(target) == Some("input") {
            self.add_input(doc, target);
        }
        for input in document.elements_by_tag(target, "input") {
            self.add_input(doc, input);
        }
        Ok(())
    }

    /// A frame of `doc` finished loading.
    pub fn on_frame_loaded(&mut self, page: &Page, doc: DocumentId, frame: NodeId) -> DomResult<()> {
        let Some(parent) = self.bindings.get(&doc).copied() else {
            return Ok(());
        };
        if !self.frame_loads.contains(&(doc, frame)) {
            return Ok(());
        }
        let slot = frame_slot(page, doc, frame);
        match page.frame_document(doc, frame) {
            Ok(Some(child)) => self.attach_document(page, child, parent.level + 1, slot),
            Ok(None) => Ok(()),
            Err(e) => {
                warn!(error = %e, "cannot instrument loaded frame");
                Ok(())
            }
        }
    }

    /// A frame of `doc` had its `src` changed.
    pub fn on_frame_src_changed(&mut self, page: &Page, doc: DocumentId, frame: NodeId) {
        if !self.frame_srcs.contains(&(doc, frame)) {
            return;
        }
        if let Some(parent) = self.bindings.get(&doc).copied() {
            self.process_frame(page, doc, frame, parent.level + 1);
        }
    }

    pub fn binding_for(&self, doc: DocumentId) -> Option<Binding> {
        self.bindings.get(&doc).copied()
    }

    pub fn accepts_keydown(&self, doc: DocumentId, node: NodeId) -> bool {
        self.inputs.contains(&(doc, node))
    }

    pub fn subscriptions(&self) -> impl Iterator<Item = (&SubscriptionId, &Subscription)> {
        self.subscriptions.iter()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Removes one listener. Returns whether it existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let Some(subscription) = self.subscriptions.remove(&id) else {
            return false;
        };
        match subscription {
            Subscription::Document(binding) => {
                self.bindings.remove(&binding.document);
            }
            Subscription::Input { document, node } => {
                self.inputs.remove(&(document, node));
            }
            Subscription::Mutation { document } => {
                self.observers.remove(&document);
            }
            Subscription::FrameLoad { document, frame, .. } => {
                self.frame_loads.remove(&(document, frame));
            }
            Subscription::FrameSrc { document, frame, .. } => {
                self.frame_srcs.remove(&(document, frame));
            }
        }
        true
    }

    pub fn unsubscribe_all(&mut self) {
        self.subscriptions.clear();
        self.bindings.clear();
        self.inputs.clear();
        self.observers.clear();
        self.frame_loads.clear();
        self.frame_srcs.clear();
    }

    fn process_frame(&mut self, page: &Page, doc: DocumentId, frame: NodeId, level: i64) {
        self.subscribe_once(Subscription::FrameSrc {
            document: doc,
            frame,
            level,
        });

        let slot = frame_slot(page, doc, frame);
        match page.frame_document(doc, frame) {
            Ok(Some(child)) => {
                if let Err(e) = self.attach_document(page, child, level, slot) {
                    warn!(error = %e, "cannot instrument frame document");
                }
            }
            Ok(None) => {
                self.subscribe_once(Subscription::FrameLoad {
                    document: doc,
                    frame,
                    level,
                });
            }
            Err(e) => {
                warn!(error = %e, frame = frame.0, "skipping frame");
            }
        }
    }

    fn add_input(&mut self, document: DocumentId, node: NodeId) {
        if self.inputs.insert((document, node)) {
            self.subscribe(Subscription::Input { document, node });
        }
    }

    fn subscribe_once(&mut self, subscription: Subscription) {
        if !self.subscriptions.values().any(|s| *s == subscription) {
            self.subscribe(subscription);
        }
    }

    fn subscribe(&mut self, subscription: Subscription) -> SubscriptionId {
        match &subscription {
            Subscription::Mutation { document } => {
                self.observers.insert(*document);
            }
            Subscription::FrameLoad { document, frame, .. } => {
                self.frame_loads.insert((*document, *frame));
            }
            Subscription::FrameSrc { document, frame, .. } => {
                self.frame_srcs.insert((*document, *frame));
            }
            Subscription::Document(_) | Subscription::Input { .. } => {}
        }
        self.next_id += 1;
        self.subscriptions.insert(self.next_id, subscription);
        self.next_id
    }
}

fn frame_slot(page: &Page, doc: DocumentId, frame: NodeId) -> i64 {
    page.frame_slot(doc, frame).map_or(-1, |slot| slot as i64)
}
