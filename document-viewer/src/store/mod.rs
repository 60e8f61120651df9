//! The document store: single owner of what page the user sees and how many
//! documents exist.
//!
//! Three inputs feed it: page loads, push events and page changes. Each one is
//! applied to the snapshot and published in a single `watch` update, so every
//! subscriber sees the documents and the total move together.

pub mod channel;
pub mod snapshot;

pub use channel::{DocumentsSubscription, Subscription, SubscriptionGroup, TotalSubscription};
pub use snapshot::StoreSnapshot;

use crate::models::{Document, PageRequest};
use crate::services::{
    DocumentApi, EventStream, PushSource, ServerEvent, TransportError, NEW_DOCUMENT_EVENT,
};
use futures::StreamExt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Last requested page position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub page_index: usize,
    pub page_size: usize,
}

/// State reachable from spawned load and stream tasks.
struct Shared {
    api: Arc<dyn DocumentApi>,
    state: watch::Sender<StoreSnapshot>,
    /// Sequence number of the most recently issued page load.
    latest_load: AtomicU64,
}

impl Shared {
    async fn fetch_and_apply(&self, seq: u64, request: PageRequest) {
        let page = match self.api.fetch_page(&request).await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(
                    page = request.page,
                    size = request.size,
                    error = %e,
                    "Failed to load documents"
                );
                return;
            }
        };

        let count = page.content.len();
        let total = page.total_elements;
        let applied = self.state.send_if_modified(|snapshot| {
            // A newer load was issued while this one was in flight.
            if self.latest_load.load(Ordering::SeqCst) != seq {
                return false;
            }
            snapshot.replace_page(page.content, total);
            true
        });

        if applied {
            tracing::debug!(page = request.page, count, total, "Loaded document page");
        } else {
            tracing::debug!(page = request.page, seq, "Discarded stale page response");
        }
    }

    fn apply_event(&self, event: ServerEvent) {
        if event.event != NEW_DOCUMENT_EVENT {
            tracing::debug!(event = %event.event, "Ignoring unknown stream event");
            return;
        }

        let document: Document = match serde_json::from_str(&event.data) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed new-document payload");
                return;
            }
        };

        let id = document.id;
        let accepted = self.state.send_if_modified(|snapshot| snapshot.prepend(document));
        if accepted {
            tracing::debug!(document_id = ?id, "Received new document");
        } else {
            tracing::debug!(document_id = ?id, "Ignoring pushed document already on page");
        }
    }

    async fn run_stream(self: Arc<Self>, mut events: EventStream, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Closing document stream");
                    break;
                }
                next = events.next() => match next {
                    Some(Ok(event)) => self.apply_event(event),
                    Some(Err(e)) => {
                        // No reconnect: live updates stop until the client restarts.
                        tracing::warn!(error = %e, "Document stream connection lost, closing");
                        break;
                    }
                    None => {
                        tracing::info!("Document stream ended by server");
                        break;
                    }
                },
            }
        }
    }
}

/// The running push subscription.
struct StreamHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl StreamHandle {
    /// Cancel and wait until the task has dropped its connection.
    async fn close(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Document stream task failed");
        }
    }
}

/// Owner of the current page of documents and the live total.
///
/// Constructed explicitly and handed to views as `Arc<DocumentStore>`. Dropping it
/// cancels the push subscription.
pub struct DocumentStore {
    shared: Arc<Shared>,
    push: Arc<dyn PushSource>,
    stream: Mutex<Option<StreamHandle>>,
    page_index: AtomicUsize,
    /// Fixed for the session.
    page_size: usize,
}

impl DocumentStore {
    pub fn new(api: Arc<dyn DocumentApi>, push: Arc<dyn PushSource>, page_size: usize) -> Self {
        let (state, _) = watch::channel(StoreSnapshot::default());

        Self {
            shared: Arc::new(Shared {
                api,
                state,
                latest_load: AtomicU64::new(0),
            }),
            push,
            stream: Mutex::new(None),
            page_index: AtomicUsize::new(0),
            page_size,
        }
    }

    /// Startup sequence: request the first page and open the push stream.
    ///
    /// A failed connection is logged and leaves the store usable without live updates.
    pub async fn initialize(&self) -> JoinHandle<()> {
        let load = self.load_page(0, self.page_size());
        if let Err(e) = self.connect().await {
            tracing::warn!(error = %e, "Starting without live document updates");
        }
        load
    }

    /// Fetch one page, newest first, without blocking the caller.
    ///
    /// On success the documents and total are replaced together. On failure the
    /// previous state stays in place. Only the most recently issued load may
    /// apply; a slower response to an earlier request is dropped. The returned
    /// handle resolves once the response has been applied or discarded.
    ///
    /// The page size cannot change mid-session; a different `page_size` is ignored
    /// in favour of the one the store was built with.
    pub fn load_page(&self, page_index: usize, page_size: usize) -> JoinHandle<()> {
        if page_size != self.page_size {
            tracing::warn!(
                requested = page_size,
                page_size = self.page_size,
                "Ignoring page size change; keeping the session page size"
            );
        }
        let page_size = self.page_size;
        self.page_index.store(page_index, Ordering::SeqCst);
        let seq = self.shared.latest_load.fetch_add(1, Ordering::SeqCst) + 1;

        let shared = self.shared.clone();
        let request = PageRequest::newest_first(page_index, page_size);
        tokio::spawn(async move { shared.fetch_and_apply(seq, request).await })
    }

    /// Open the push subscription, closing any existing one first.
    ///
    /// The previous connection is fully released before the new one is requested,
    /// so at most one subscription is ever alive.
    pub async fn connect(&self) -> Result<(), TransportError> {
        let mut slot = self.stream.lock().await;
        if let Some(previous) = slot.take() {
            previous.close().await;
        }

        let events = self.push.subscribe().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to open document stream");
            e
        })?;

        let cancel = CancellationToken::new();
        let task = tokio::spawn(self.shared.clone().run_stream(events, cancel.clone()));
        *slot = Some(StreamHandle { cancel, task });

        tracing::info!("Document stream connected");
        Ok(())
    }

    /// Release the push subscription. Safe to call when never connected.
    pub async fn close(&self) {
        if let Some(handle) = self.stream.lock().await.take() {
            handle.close().await;
            tracing::info!("Document stream closed");
        }
    }

    /// Whether a push subscription is currently delivering events.
    pub async fn is_connected(&self) -> bool {
        self.stream
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.task.is_finished())
    }

    pub fn cursor(&self) -> PageCursor {
        PageCursor {
            page_index: self.page_index.load(Ordering::SeqCst),
            page_size: self.page_size,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.shared.state.borrow().clone()
    }

    pub fn documents(&self) -> DocumentsSubscription {
        Subscription::new(self.shared.state.subscribe(), channel::project_documents)
    }

    pub fn total(&self) -> TotalSubscription {
        Subscription::new(self.shared.state.subscribe(), channel::project_total)
    }

    /// Both channels as one unit, for consumers that render documents and total together.
    pub fn subscribe(&self) -> SubscriptionGroup {
        SubscriptionGroup::new(self.documents(), self.total())
    }
}

impl Drop for DocumentStore {
    fn drop(&mut self) {
        if let Some(handle) = self.stream.get_mut().take() {
            handle.cancel.cancel();
        }
    }
}
