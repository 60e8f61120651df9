//! viewer-core: Shared infrastructure for the document viewer client.
pub mod config;
pub mod error;
pub mod observability;

pub use serde;
pub use tracing;
pub use validator;
