use crate::dom::tree::{Document, DocumentId, NodeId};
use crate::error::{DomError, DomResult};

/// All browsing contexts of one tab. The top-level document is always
/// `DocumentId(0)`; frame documents are linked through their `frame` /
/// `iframe` element's `content_document`.
#[derive(Debug, Clone)]
pub struct Page {
    documents: Vec<Document>,
}

impl Page {
    pub fn new(top: Document) -> Self {
        Self {
            documents: vec![top],
        }
    }

    pub fn top(&self) -> DocumentId {
        DocumentId(0)
    }

    pub fn add_document(&mut self, document: Document) -> DocumentId {
        self.documents.push(document);
        DocumentId(self.documents.len() - 1)
    }

    pub fn document(&self, id: DocumentId) -> DomResult<&Document> {
        self.documents
            .get(id.0)
            .ok_or(DomError::UnknownDocument(id.0))
    }

    pub fn document_mut(&mut self, id: DocumentId) -> DomResult<&mut Document> {
        self.documents
            .get_mut(id.0)
            .ok_or(DomError::UnknownDocument(id.0))
    }

    pub fn documents(&self) -> impl Iterator<Item = (DocumentId, &Document)> {
        self.documents
            .iter()
            .enumerate()
            .map(|(i, d)| (DocumentId(i), d))
    }

    /// Creates a `frame` / `iframe` element under `parent` in `doc`, optionally
    /// already showing `content`.
    pub fn attach_frame(
        &mut self,
        doc: DocumentId,
        parent: NodeId,
        tag_name: &str,
        content: Option<DocumentId>,
    ) -> DomResult<NodeId> {
        let src = match content {
            Some(id) => Some(self.document(id)?.url().to_string()),
            None => None,
        };
        let document = self.document_mut(doc)?;
        let frame = document.create_element(parent, tag_name);
        if let Some(src) = src {
            document.set_attribute(frame, "src", &src);
        }
        document.set_content_document(frame, content);
        Ok(frame)
    }

    /// Points an existing frame element at a new document, as a `src` change
    /// followed by a load would.
    pub fn navigate_frame(
        &mut self,
        doc: DocumentId,
        frame: NodeId,
        content: DocumentId,
    ) -> DomResult<()> {
        let src = self.document(content)?.url().to_string();
        let document = self.document_mut(doc)?;
        if !document.element(frame).is_some_and(|el| el.is_frame()) {
            return Err(DomError::NotAnElement(frame.0));
        }
        document.set_attribute(frame, "src", &src);
        document.set_content_document(frame, Some(content));
        Ok(())
    }

    /// The document shown by `frame`, if it has loaded. Reading a frame whose
    /// document lives on another origin fails the same way the browser does.
    pub fn frame_document(&self, doc: DocumentId, frame: NodeId) -> DomResult<Option<DocumentId>> {
        let parent = self.document(doc)?;
        let element = parent
            .element(frame)
            .ok_or(DomError::NotAnElement(frame.0))?;
        let Some(content) = element.content_document else {
            return Ok(None);
        };
        let child = self.document(content)?;
        if !child.inherits_origin() && child.origin() != parent.origin() {
            return Err(DomError::CrossOrigin {
                parent_origin: parent.origin().to_string(),
                frame_url: child.url().to_string(),
            });
        }
        Ok(Some(content))
    }

    /// 0-based position of `frame` among the frame elements of `doc`.
    pub fn frame_slot(&self, doc: DocumentId, frame: NodeId) -> Option<usize> {
        self.document(doc)
            .ok()?
            .frames()
            .iter()
            .position(|f| *f == frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_origin_frame_is_readable() {
        let mut page = Page::new(Document::new("http://localhost/index.html"));
        let child = page.add_document(Document::new("http://localhost/frame.html"));
        let body = page.document(page.top()).unwrap().body().unwrap();
        let frame = page
            .attach_frame(page.top(), body, "iframe", Some(child))
            .unwrap();

        assert_eq!(page.frame_document(page.top(), frame).unwrap(), Some(child));
        assert_eq!(page.frame_slot(page.top(), frame), Some(0));
    }

    #[test]
    fn cross_origin_frame_is_blocked() {
        let mut page = Page::new(Document::new("http://localhost/"));
        let child = page.add_document(Document::new("https://other.example/"));
        let body = page.document(page.top()).unwrap().body().unwrap();
        let frame = page
            .attach_frame(page.top(), body, "iframe", Some(child))
            .unwrap();

        let err = page.frame_document(page.top(), frame).unwrap_err();
        assert!(matches!(err, DomError::CrossOrigin { .. }));
    }

    #[test]
    fn blank_frame_shares_the_parent_origin() {
        let mut page = Page::new(Document::new("http://localhost/"));
        let child = page.add_document(Document::new("about:blank"));
        let body = page.document(page.top()).unwrap().body().unwrap();
        let frame = page
            .attach_frame(page.top(), body, "iframe", Some(child))
            .unwrap();

        assert_eq!(page.document(child).unwrap().origin(), "null");
        assert_eq!(page.frame_document(page.top(), frame).unwrap(), Some(child));
    }

    #[test]
    fn unloaded_frame_has_no_document() {
        let mut page = Page::new(Document::new("http://localhost/"));
        let body = page.document(page.top()).unwrap().body().unwrap();
        let first = page.attach_frame(page.top(), body, "frame", None).unwrap();
        let second = page.attach_frame(page.top(), body, "iframe", None).unwrap();

        assert_eq!(page.frame_document(page.top(), first).unwrap(), None);
        assert_eq!(page.frame_slot(page.top(), second), Some(1));
    }
}
