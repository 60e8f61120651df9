use crate::models::Document;
use std::sync::Arc;

/// Published store state: the documents on screen and the live total.
///
/// Both values travel together, so a reader always sees a pair that belongs to
/// the same update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    documents: Arc<Vec<Document>>,
    total: u64,
}

impl StoreSnapshot {
    pub fn new(documents: Vec<Document>, total: u64) -> Self {
        Self {
            documents: Arc::new(documents),
            total,
        }
    }

    pub fn documents(&self) -> &Arc<Vec<Document>> {
        &self.documents
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub(crate) fn replace_page(&mut self, documents: Vec<Document>, total: u64) {
        self.documents = Arc::new(documents);
        self.total = total;
    }

    /// Put a pushed document in front and count it.
    ///
    /// Returns false, leaving the snapshot untouched, when a document with the
    /// same id is already on the page. There is no cap on the list length.
    pub(crate) fn prepend(&mut self, document: Document) -> bool {
        if let Some(id) = document.id {
            if self.documents.iter().any(|existing| existing.id == Some(id)) {
                return false;
            }
        }

        Arc::make_mut(&mut self.documents).insert(0, document);
        self.total += 1;
        true
    }
}
