pub mod config;
pub mod models;
pub mod services;
pub mod startup;
pub mod store;
pub mod view;

pub use store::DocumentStore;
pub use view::DocumentListController;
