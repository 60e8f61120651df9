use super::filter::DocumentFilter;
use super::image::normalize_image_payload;
use crate::models::Document;
use crate::store::{DocumentStore, StoreSnapshot, SubscriptionGroup};
use std::borrow::Cow;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Number of pages for `total` items; an empty result still shows one page.
pub fn total_pages_for(total: u64, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    let pages = total.div_ceil(page_size as u64).max(1);
    usize::try_from(pages).unwrap_or(usize::MAX)
}

/// View model for the document list.
///
/// Mirrors the store while active and keeps purely local state: page cursor,
/// filter, and selection.
pub struct DocumentListController {
    store: Arc<DocumentStore>,
    subscriptions: Option<SubscriptionGroup>,
    documents: Arc<Vec<Document>>,
    total_items: u64,
    current_page: usize,
    page_size: usize,
    total_pages: usize,
    filter: DocumentFilter,
    selected: Option<Document>,
}

impl DocumentListController {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        let page_size = store.page_size();
        Self {
            store,
            subscriptions: None,
            documents: Arc::default(),
            total_items: 0,
            current_page: 0,
            page_size,
            total_pages: total_pages_for(0, page_size),
            filter: DocumentFilter::default(),
            selected: None,
        }
    }

    /// Subscribe to the store's documents and total and take their current values.
    pub fn activate(&mut self) {
        if self.subscriptions.is_some() {
            return;
        }
        let mut group = self.store.subscribe();
        let snapshot = group.latest();
        self.apply(snapshot);
        self.subscriptions = Some(group);
    }

    /// Release both store subscriptions.
    pub fn deactivate(&mut self) {
        self.subscriptions = None;
    }

    pub fn is_active(&self) -> bool {
        self.subscriptions.is_some()
    }

    /// Wait for the next store update and apply it.
    ///
    /// Returns false when inactive or when the store has gone away.
    pub async fn next_update(&mut self) -> bool {
        let Some(group) = self.subscriptions.as_mut() else {
            return false;
        };
        match group.changed().await {
            Some(snapshot) => {
                self.apply(snapshot);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, snapshot: StoreSnapshot) {
        self.documents = snapshot.documents().clone();
        self.total_items = snapshot.total();
        self.total_pages = total_pages_for(self.total_items, self.page_size);
    }

    /// Navigate to `page` when it is in `0..total_pages`.
    ///
    /// Returns the pending load, or `None` when the page is out of range and nothing
    /// was requested.
    pub fn change_page(&mut self, page: i64) -> Option<JoinHandle<()>> {
        let page = usize::try_from(page).ok().filter(|p| *p < self.total_pages)?;
        self.current_page = page;
        Some(self.store.load_page(page, self.page_size))
    }

    /// Documents on the current page that pass the filter.
    pub fn filtered_documents(&self) -> Vec<&Document> {
        self.filter.apply(&self.documents)
    }

    pub fn set_ruc_filter(&mut self, ruc: impl Into<String>) {
        self.filter.issuer_ruc = ruc.into();
    }

    pub fn set_date_filter(&mut self, date: impl Into<String>) {
        self.filter.document_date = date.into();
    }

    pub fn clear_filters(&mut self) {
        self.filter.clear();
    }

    pub fn filter(&self) -> &DocumentFilter {
        &self.filter
    }

    pub fn select_document(&mut self, document: Document) {
        self.selected = Some(document);
    }

    pub fn selected_document(&self) -> Option<&Document> {
        self.selected.as_ref()
    }

    /// Data URI for the document's image, ready for the trusted renderer.
    pub fn image_source<'a>(&self, document: &'a Document) -> Cow<'a, str> {
        normalize_image_payload(&document.image_base64)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }
}
