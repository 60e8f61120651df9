//! In-memory transports for tests and local runs without a backend.

use super::{
    DocumentApi, EventStream, PushSource, ServerEvent, TransportError, NEW_DOCUMENT_EVENT,
};
use crate::models::{Document, Page, PageRequest};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, Notify};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;

#[derive(Default)]
struct ApiState {
    responses: HashMap<usize, Result<Page<Document>, TransportError>>,
    gates: HashMap<usize, Arc<Notify>>,
    requests: Vec<PageRequest>,
}

/// Scripted listing endpoint.
///
/// Pages without a scripted response come back empty with a zero total.
#[derive(Default)]
pub struct MockDocumentApi {
    state: Mutex<ApiState>,
}

impl MockDocumentApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ApiState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_page(&self, page_index: usize, page: Page<Document>) {
        self.state().responses.insert(page_index, Ok(page));
    }

    pub fn fail_page(&self, page_index: usize, error: TransportError) {
        self.state().responses.insert(page_index, Err(error));
    }

    /// Hold responses for `page_index` until the returned handle is notified.
    pub fn hold_page(&self, page_index: usize) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state().gates.insert(page_index, gate.clone());
        gate
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<PageRequest> {
        self.state().requests.clone()
    }
}

#[async_trait]
impl DocumentApi for MockDocumentApi {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<Document>, TransportError> {
        let gate = {
            let mut state = self.state();
            state.requests.push(request.clone());
            state.gates.remove(&request.page)
        };

        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.state()
            .responses
            .get(&request.page)
            .cloned()
            .unwrap_or_else(|| {
                Ok(Page::new(
                    Vec::new(),
                    request.page as u64,
                    request.size as u64,
                    0,
                ))
            })
    }
}

#[derive(Default)]
struct PushState {
    sender: Option<mpsc::UnboundedSender<Result<ServerEvent, TransportError>>>,
    next_error: Option<TransportError>,
    live_at_open: Vec<usize>,
}

/// Push source whose events are injected by the caller.
///
/// Tracks how many subscriptions are alive so tests can check connection hygiene.
#[derive(Default)]
pub struct MockPushSource {
    state: Mutex<PushState>,
    live: Arc<AtomicUsize>,
    opened: AtomicUsize,
}

impl MockPushSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, PushState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver an event to the most recent subscription. Returns false when it is closed.
    pub fn push(&self, event: ServerEvent) -> bool {
        match &self.state().sender {
            Some(sender) => sender.send(Ok(event)).is_ok(),
            None => false,
        }
    }

    pub fn push_document(&self, document: &Document) -> bool {
        match serde_json::to_string(document) {
            Ok(data) => self.push(ServerEvent::new(NEW_DOCUMENT_EVENT, data)),
            Err(_) => false,
        }
    }

    /// Break the most recent subscription with a transport error.
    pub fn fail(&self, error: TransportError) -> bool {
        match &self.state().sender {
            Some(sender) => sender.send(Err(error)).is_ok(),
            None => false,
        }
    }

    /// Make the next `subscribe` call fail.
    pub fn fail_next_subscribe(&self, error: TransportError) {
        self.state().next_error = Some(error);
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Subscriptions whose stream has not been dropped yet.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Number of live subscriptions observed at each successful open.
    pub fn live_at_open(&self) -> Vec<usize> {
        self.state().live_at_open.clone()
    }
}

struct LiveGuard(Arc<AtomicUsize>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PushSource for MockPushSource {
    async fn subscribe(&self) -> Result<EventStream, TransportError> {
        let mut state = self.state();
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        let live_now = self.live.fetch_add(1, Ordering::SeqCst);
        self.opened.fetch_add(1, Ordering::SeqCst);
        state.live_at_open.push(live_now);

        let (tx, rx) = mpsc::unbounded_channel();
        state.sender = Some(tx);

        let guard = LiveGuard(self.live.clone());
        let stream = UnboundedReceiverStream::new(rx).map(move |item| {
            let _ = &guard;
            item
        });

        Ok(Box::pin(stream))
    }
}
