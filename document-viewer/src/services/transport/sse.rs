//! Incremental Server-Sent Events decoder.

use super::TransportError;

/// One dispatched event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEvent {
    /// Event name; `message` when the server sent none.
    pub event: String,
    pub data: String,
    pub id: Option<String>,
}

impl ServerEvent {
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
            id: None,
        }
    }
}

const DEFAULT_EVENT: &str = "message";

/// Largest incomplete event the decoder will hold before giving up on the stream.
pub const MAX_EVENT_BYTES: usize = 16 * 1024 * 1024;

/// Buffers raw bytes and yields complete events.
///
/// Blocks are terminated by a blank line. CRLF and lone CR line endings are turned
/// into LF on input, including a CRLF pair split across two chunks.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    /// Buffer prefix already searched for a block terminator.
    scanned: usize,
    /// The previous chunk ended in CR; a leading LF in the next one belongs to it.
    pending_cr: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every event it completed, in order.
    ///
    /// Fails once an unterminated event grows past [`MAX_EVENT_BYTES`]; the buffered
    /// bytes are discarded.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<ServerEvent>, TransportError> {
        for &byte in chunk {
            if std::mem::take(&mut self.pending_cr) && byte == b'\n' {
                continue;
            }
            if byte == b'\r' {
                self.buffer.push(b'\n');
                self.pending_cr = true;
            } else {
                self.buffer.push(byte);
            }
        }

        let mut events = Vec::new();
        while let Some(end) = self.find_block_end() {
            let block: Vec<u8> = self.buffer.drain(..end + 2).collect();
            self.scanned = 0;
            let text = String::from_utf8_lossy(&block[..end]);
            if let Some(event) = parse_block(&text) {
                events.push(event);
            }
        }

        if self.buffer.len() > MAX_EVENT_BYTES {
            let size = self.buffer.len();
            self.buffer.clear();
            self.scanned = 0;
            return Err(TransportError::Stream(format!(
                "event exceeds {} bytes without terminating ({} buffered)",
                MAX_EVENT_BYTES, size
            )));
        }

        Ok(events)
    }

    /// Position of the next `\n\n`, searching only bytes not scanned before.
    fn find_block_end(&mut self) -> Option<usize> {
        // Back up one byte so a terminator straddling two chunks is found.
        let start = self.scanned.saturating_sub(1);
        match self.buffer[start..].windows(2).position(|w| w == b"\n\n") {
            Some(offset) => Some(start + offset),
            None => {
                self.scanned = self.buffer.len();
                None
            }
        }
    }
}

fn parse_block(block: &str) -> Option<ServerEvent> {
    let mut event = None;
    let mut data: Vec<&str> = Vec::new();
    let mut id = None;

    for line in block.lines() {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => event = Some(value.to_string()),
            "data" => data.push(value),
            "id" => id = Some(value.to_string()),
            _ => {}
        }
    }

    // Blocks without data are keep-alives or retry hints; nothing to dispatch.
    if data.is_empty() {
        return None;
    }

    Some(ServerEvent {
        event: event
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_EVENT.to_string()),
        data: data.join("\n"),
        id,
    })
}
