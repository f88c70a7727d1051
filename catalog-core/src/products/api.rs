//! Composite operations over a [`ProductStore`].
//!
//! The backing service has no paging or count endpoint, so both the page slice
//! and the total count come from the full collection. The mutation helpers
//! here pair each mutating call with exactly one count refresh so callers
//! never issue that second request themselves.

use log::{info, warn};

use super::models::{Product, ProductDraft, ProductId};
use super::store::ProductStore;
use crate::error::CatalogError;
use crate::pagination::PageWindow;

/// Result of a mutation together with the collection size observed right after it.
///
/// `total_count` is `None` when the mutation went through but the follow-up
/// count request failed.
#[derive(Debug, Clone, PartialEq)]
pub struct Counted<T> {
    pub value: T,
    pub total_count: Option<usize>,
}

/// Fetch the full collection and keep only the products inside `window`.
pub async fn fetch_page<S: ProductStore>(
    store: &S,
    window: PageWindow,
) -> Result<Vec<Product>, CatalogError> {
    let all = store.list_all().await?;
    Ok(window.slice(&all).to_vec())
}

pub async fn count_products<S: ProductStore>(store: &S) -> Result<usize, CatalogError> {
    Ok(store.list_all().await?.len())
}

pub async fn find_product<S: ProductStore>(
    store: &S,
    id: ProductId,
) -> Result<Option<Product>, CatalogError> {
    let all = store.list_all().await?;
    Ok(all.into_iter().find(|p| p.id == id))
}

pub async fn create_and_count<S: ProductStore>(
    store: &S,
    draft: &ProductDraft,
) -> Result<Counted<Product>, CatalogError> {
    draft.validate()?;
    let product = store.create(draft).await?;
    info!("Created product {} ('{}')", product.id, product.title);
    let total_count = refresh_count(store).await;
    Ok(Counted {
        value: product,
        total_count,
    })
}

pub async fn replace_product<S: ProductStore>(
    store: &S,
    id: ProductId,
    draft: &ProductDraft,
) -> Result<Product, CatalogError> {
    draft.validate()?;
    let product = store.replace(id, draft).await?;
    info!("Updated product {} ('{}')", product.id, product.title);
    Ok(product)
}

pub async fn remove_and_count<S: ProductStore>(
    store: &S,
    id: ProductId,
) -> Result<Counted<ProductId>, CatalogError> {
    let removed = store.remove(id).await?;
    info!("Deleted product {}", removed);
    let total_count = refresh_count(store).await;
    Ok(Counted {
        value: removed,
        total_count,
    })
}

async fn refresh_count<S: ProductStore>(store: &S) -> Option<usize> {
    match count_products(store).await {
        Ok(count) => Some(count),
        Err(e) => {
            warn!("Failed to refresh product count: {}", e);
            None
        }
    }
}
