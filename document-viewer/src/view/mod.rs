pub mod controller;
pub mod filter;
pub mod image;
pub mod render;

pub use controller::{total_pages_for, DocumentListController};
pub use filter::DocumentFilter;
pub use image::normalize_image_payload;
pub use render::render_table;
