pub mod catalog;
pub mod config;
pub mod error;
pub mod pagination;
pub mod products;
pub mod session;
pub mod state;


pub use catalog::{Catalog, CatalogSnapshot, CountTicket, FetchRequest};
pub use config::CatalogConfig;
pub use error::CatalogError;
pub use pagination::{PAGE_SIZE, PageWindow};
pub use products::{
    ApiCall, Counted, Product, ProductDraft, ProductId, ProductStore, ProductsClient,
    api::{
        count_products, create_and_count, fetch_page, find_product, remove_and_count,
        replace_product,
    },
};
pub use session::CatalogSession;
pub use state::{FetchTicket, Operation, ProductEvent, ProductListState, RequestStatus};
