pub mod transport;

pub use transport::{
    DocumentApi, EventStream, PushSource, ServerEvent, TransportError, NEW_DOCUMENT_EVENT,
};
