use std::future::Future;

use super::models::{Product, ProductDraft, ProductId};
use crate::error::CatalogError;

/// The products collection resource. One method per HTTP call; each is a
/// single attempt and any failure is handed straight back to the caller.
pub trait ProductStore {
    /// The full collection, in server order.
    fn list_all(&self) -> impl Future<Output = Result<Vec<Product>, CatalogError>> + Send;

    /// Create a product and return the record with its server-assigned id.
    fn create(
        &self,
        draft: &ProductDraft,
    ) -> impl Future<Output = Result<Product, CatalogError>> + Send;

    /// Full replacement of the product with `id`.
    fn replace(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> impl Future<Output = Result<Product, CatalogError>> + Send;

    /// Delete by id and echo the id back on success.
    fn remove(&self, id: ProductId) -> impl Future<Output = Result<ProductId, CatalogError>> + Send;
}

#[cfg(test)]
pub(crate) mod memory {
    //! In-memory store used by the session and api tests.

    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct Inner {
        products: Vec<Product>,
        next_id: ProductId,
        fail_list: bool,
        fail_mutations: bool,
        list_calls: usize,
    }

    #[derive(Debug, Clone, Default)]
    pub(crate) struct MemoryStore {
        inner: Arc<Mutex<Inner>>,
    }

    impl MemoryStore {
        pub(crate) fn with_products(count: usize) -> Self {
            let store = MemoryStore::default();
            {
                let mut inner = store.inner.lock().unwrap();
                for i in 1..=count {
                    let id = i as ProductId;
                    inner.products.push(sample_draft(&format!("Product {}", i)).into_product(id));
                }
                inner.next_id = count as ProductId + 1;
            }
            store
        }

        pub(crate) fn set_fail_list(&self, fail: bool) {
            self.inner.lock().unwrap().fail_list = fail;
        }

        pub(crate) fn set_fail_mutations(&self, fail: bool) {
            self.inner.lock().unwrap().fail_mutations = fail;
        }

        pub(crate) fn len(&self) -> usize {
            self.inner.lock().unwrap().products.len()
        }

        pub(crate) fn list_calls(&self) -> usize {
            self.inner.lock().unwrap().list_calls
        }

        pub(crate) fn titles(&self) -> Vec<String> {
            self.inner
                .lock()
                .unwrap()
                .products
                .iter()
                .map(|p| p.title.clone())
                .collect()
        }

        fn unavailable() -> CatalogError {
            CatalogError::Http {
                status: 503,
                url: "memory://products".to_string(),
            }
        }
    }

    pub(crate) fn sample_draft(title: &str) -> ProductDraft {
        ProductDraft {
            title: title.to_string(),
            description: format!("{} description", title),
            category: "Test Category".to_string(),
            brand: "Test Brand".to_string(),
            price: 10.0,
            rating: 4.0,
            stock: 3,
            is_available: true,
            created_at: None,
            updated_at: None,
        }
    }

    impl ProductStore for MemoryStore {
        async fn list_all(&self) -> Result<Vec<Product>, CatalogError> {
            let mut inner = self.inner.lock().unwrap();
            inner.list_calls += 1;
            if inner.fail_list {
                return Err(Self::unavailable());
            }
            Ok(inner.products.clone())
        }

        async fn create(&self, draft: &ProductDraft) -> Result<Product, CatalogError> {
            let mut inner = self.inner.lock().unwrap();
            if inner.fail_mutations {
                return Err(Self::unavailable());
            }
            inner.next_id = inner.next_id.max(1);
            let product = draft.clone().into_product(inner.next_id);
            inner.next_id += 1;
            inner.products.push(product.clone());
            Ok(product)
        }

        async fn replace(
            &self,
            id: ProductId,
            draft: &ProductDraft,
        ) -> Result<Product, CatalogError> {
            let mut inner = self.inner.lock().unwrap();
            if inner.fail_mutations {
                return Err(Self::unavailable());
            }
            let product = draft.clone().into_product(id);
            match inner.products.iter_mut().find(|p| p.id == id) {
                Some(existing) => *existing = product.clone(),
                None => {
                    return Err(CatalogError::Http {
                        status: 404,
                        url: format!("memory://products/{}", id),
                    });
                }
            }
            Ok(product)
        }

        async fn remove(&self, id: ProductId) -> Result<ProductId, CatalogError> {
            let mut inner = self.inner.lock().unwrap();
            if inner.fail_mutations {
                return Err(Self::unavailable());
            }
            inner.products.retain(|p| p.id != id);
            Ok(id)
        }
    }
}
