//! reqwest-backed transports for the document API.

use super::{DocumentApi, EventStream, PushSource, ServerEvent, SseDecoder, TransportError};
use crate::config::ApiConfig;
use crate::models::{Document, Page, PageRequest};
use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use reqwest::{Client, Response};
use std::collections::VecDeque;
use uuid::Uuid;
use viewer_core::observability::TracedClientExt;

/// Listing endpoint client.
pub struct HttpDocumentApi {
    client: Client,
    base_url: String,
}

impl HttpDocumentApi {
    pub fn new(config: &ApiConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl DocumentApi for HttpDocumentApi {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<Document>, TransportError> {
        let request_id = Uuid::new_v4().to_string();

        tracing::debug!(
            request_id = %request_id,
            page = request.page,
            size = request.size,
            "Fetching document page"
        );

        let response = self
            .client
            .traced_get(&self.base_url)
            .query(&request.query_params())
            .send(&request_id)
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let response = ensure_success(response).await?;

        response
            .json::<Page<Document>>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}

/// Server-Sent Events client for `{base_url}/stream`.
pub struct HttpPushSource {
    client: Client,
    stream_url: String,
}

impl HttpPushSource {
    pub fn new(config: &ApiConfig) -> Result<Self, TransportError> {
        // No total timeout: the response body stays open for the whole session.
        let client = Client::builder()
            .connect_timeout(config.request_timeout())
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            client,
            stream_url: config.stream_url(),
        })
    }
}

#[async_trait]
impl PushSource for HttpPushSource {
    async fn subscribe(&self) -> Result<EventStream, TransportError> {
        let request_id = Uuid::new_v4().to_string();

        tracing::debug!(
            request_id = %request_id,
            url = %self.stream_url,
            "Opening document stream"
        );

        let response = self
            .client
            .traced_get(&self.stream_url)
            .header("accept", "text/event-stream")
            .send(&request_id)
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let response = ensure_success(response).await?;

        Ok(decode_events(response.bytes_stream().boxed()))
    }
}

async fn ensure_success(response: Response) -> Result<Response, TransportError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(TransportError::Status { status, body })
}

/// Turn a body byte stream into decoded events.
///
/// The byte stream is owned by the returned stream, so dropping the events drops the
/// response body and closes the connection. A body error, or an event too large to
/// buffer, is yielded once and ends the stream.
fn decode_events<S, B, E>(bytes: S) -> EventStream
where
    S: Stream<Item = Result<B, E>> + Send + Unpin + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let state = DecodeState {
        bytes,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.pending.pop_front() {
                return Some((Ok(event), state));
            }
            if state.finished {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => match state.decoder.push(chunk.as_ref()) {
                    Ok(events) => state.pending.extend(events),
                    Err(e) => {
                        state.finished = true;
                        return Some((Err(e), state));
                    }
                },
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(TransportError::Stream(e.to_string())), state));
                }
                None => return None,
            }
        }
    })
    .boxed()
}

struct DecodeState<S> {
    bytes: S,
    decoder: SseDecoder,
    pending: VecDeque<ServerEvent>,
    finished: bool,
}
