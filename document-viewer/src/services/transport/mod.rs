//! Transport abstractions for the document API.
//!
//! The listing call and the push stream are external collaborators: the store only
//! sees these traits, so the HTTP implementations can be swapped for in-memory ones.

pub mod http;
pub mod mock;
pub mod sse;

use crate::models::{Document, Page, PageRequest};
use async_trait::async_trait;
use std::pin::Pin;
use thiserror::Error;
use tokio_stream::Stream;

pub use http::{HttpDocumentApi, HttpPushSource};
pub use mock::{MockDocumentApi, MockPushSource};
pub use sse::{ServerEvent, SseDecoder};

/// Name of the push event that carries a newly created document.
pub const NEW_DOCUMENT_EVENT: &str = "new-document";

/// Error type for transport operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Stream error: {0}")]
    Stream(String),
}

/// Events of one push subscription. Dropping the stream closes the connection.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<ServerEvent, TransportError>> + Send>>;

/// Request/response listing of documents.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<Document>, TransportError>;
}

/// Long-lived server-to-client event stream.
#[async_trait]
pub trait PushSource: Send + Sync {
    /// Open a new subscription. Each call opens an independent connection.
    async fn subscribe(&self) -> Result<EventStream, TransportError>;
}
