//! Shared fixtures for document-viewer integration tests.

#![allow(dead_code)]

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use document_viewer::config::ApiConfig;
use document_viewer::models::{Document, Page};
use document_viewer::store::DocumentStore;
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

pub const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

pub fn document(id: i64, issuer_ruc: &str, document_date: &str) -> Document {
    Document {
        id: Some(id),
        document_type: "INVOICE".to_string(),
        document_number: format!("F001-{:05}", id),
        document_date: document_date.to_string(),
        issuer_ruc: issuer_ruc.to_string(),
        amount: 250.75,
        image_base64: "/9j/4AAQSkZJRg==".to_string(),
    }
}

/// `count` documents with ids `first..first + count`.
pub fn documents(first: i64, count: i64) -> Vec<Document> {
    (first..first + count)
        .map(|id| document(id, "20100070970", "2024-01-01"))
        .collect()
}

/// Wait until the store publishes `expected` as its total.
pub async fn wait_for_total(store: &DocumentStore, expected: u64) {
    let mut total = store.total();
    tokio::time::timeout(WAIT_TIMEOUT, async {
        while let Some(value) = total.next().await {
            if value == expected {
                return;
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for total {}", expected));
}

/// Wait until the store's push subscription has stopped.
pub async fn wait_until_disconnected(store: &DocumentStore) {
    tokio::time::timeout(WAIT_TIMEOUT, async {
        while store.is_connected().await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("stream did not close");
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ListParams {
    pub page: usize,
    pub size: usize,
    pub sort: String,
}

#[derive(Clone, Default)]
struct BackendState {
    documents: Arc<Mutex<Vec<Document>>>,
    requests: Arc<Mutex<Vec<ListParams>>>,
    failing: Arc<Mutex<bool>>,
}

/// In-process stand-in for the document API: a listing endpoint and an SSE stream.
pub struct FakeBackend {
    pub base_url: String,
    state: BackendState,
    events: broadcast::Sender<(String, String)>,
}

impl FakeBackend {
    pub async fn spawn() -> Self {
        let state = BackendState::default();
        let (events, _) = broadcast::channel(64);

        let app = Router::new()
            .route("/api/documents", get(list_documents))
            .route("/api/documents/stream", get(stream_documents))
            .with_state((state.clone(), events.clone()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let address = listener.local_addr().expect("No local address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        FakeBackend {
            base_url: format!("http://{}/api/documents", address),
            state,
            events,
        }
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url.clone(),
            request_timeout_secs: 5,
        }
    }

    /// Replace the server-side collection, newest first.
    pub fn set_documents(&self, documents: Vec<Document>) {
        *self.state.documents.lock().unwrap() = documents;
    }

    pub fn set_failing(&self, failing: bool) {
        *self.state.failing.lock().unwrap() = failing;
    }

    pub fn requests(&self) -> Vec<ListParams> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Store a new document and announce it on the stream.
    pub fn create(&self, document: Document) {
        self.state.documents.lock().unwrap().insert(0, document.clone());
        let data = serde_json::to_string(&document).unwrap();
        self.publish("new-document", &data);
    }

    pub fn publish(&self, event: &str, data: &str) {
        self.events
            .send((event.to_string(), data.to_string()))
            .expect("no stream subscribers");
    }

    /// Open SSE connections.
    pub fn subscribers(&self) -> usize {
        self.events.receiver_count()
    }

    pub async fn wait_for_subscribers(&self, expected: usize) {
        tokio::time::timeout(WAIT_TIMEOUT, async {
            while self.subscribers() != expected {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("expected {} stream subscribers", expected));
    }
}

type AppState = (BackendState, broadcast::Sender<(String, String)>);

async fn list_documents(
    State((state, _)): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<Document>>, StatusCode> {
    state.requests.lock().unwrap().push(params.clone());
    if *state.failing.lock().unwrap() {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    let documents = state.documents.lock().unwrap().clone();
    let total = documents.len() as u64;
    let content = documents
        .into_iter()
        .skip(params.page * params.size)
        .take(params.size)
        .collect();

    Ok(Json(Page::new(
        content,
        params.page as u64,
        params.size as u64,
        total,
    )))
}

async fn stream_documents(
    State((_, events)): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(events.subscribe())
        .filter_map(|message| message.ok())
        .map(|(name, data)| Ok(Event::default().event(name).data(data)));

    Sse::new(stream).keep_alive(KeepAlive::default())
}
