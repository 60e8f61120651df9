use serde::{Deserialize, Serialize};

/// Paginated listing response.
///
/// Only `content` and `total_elements` drive client state. The rest mirrors the
/// server's view at response time and goes stale as soon as a push event arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u64,
    #[serde(default)]
    pub size: u64,
    /// Zero-based index of this page.
    #[serde(default)]
    pub number: u64,
    #[serde(default)]
    pub first: bool,
    #[serde(default)]
    pub last: bool,
    #[serde(default)]
    pub empty: bool,
}

impl<T> Page<T> {
    /// Build an envelope the way the server would for `content` at `number`.
    pub fn new(content: Vec<T>, number: u64, size: u64, total_elements: u64) -> Self {
        let total_pages = if size == 0 {
            0
        } else {
            total_elements.div_ceil(size)
        };
        let empty = content.is_empty();
        Self {
            content,
            total_elements,
            total_pages,
            size,
            number,
            first: number == 0,
            last: number + 1 >= total_pages,
            empty,
        }
    }
}

/// Sort key requested on every listing call: newest first.
pub const SORT_NEWEST_FIRST: &str = "createdAt,desc";

/// Parameters of one listing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
    pub sort: &'static str,
}

impl PageRequest {
    pub fn newest_first(page: usize, size: usize) -> Self {
        Self {
            page,
            size,
            sort: SORT_NEWEST_FIRST,
        }
    }

    pub fn query_params(&self) -> [(&'static str, String); 3] {
        [
            ("page", self.page.to_string()),
            ("size", self.size.to_string()),
            ("sort", self.sort.to_string()),
        ]
    }
}
