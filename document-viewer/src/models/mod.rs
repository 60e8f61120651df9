pub mod document;
pub mod page;

pub use document::Document;
pub use page::{Page, PageRequest, SORT_NEWEST_FIRST};
