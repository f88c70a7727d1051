pub mod api;
pub mod client;
pub mod models;
pub mod store;


pub use api::Counted;
pub use client::{ApiCall, ProductsClient};
pub use models::{Product, ProductDraft, ProductId};
pub use store::ProductStore;
