use log::{debug, info, warn};

use crate::catalog::{Catalog, CatalogSnapshot, FetchRequest};
use crate::error::CatalogError;
use crate::products::{Product, ProductDraft, ProductId, ProductStore, api};
use crate::state::Operation;

/// Drives a [`Catalog`] against a store one call at a time.
///
/// Used by the command-line front-end; the GUI runs the same steps as
/// independent tasks instead.
#[derive(Debug)]
pub struct CatalogSession<S> {
    store: S,
    catalog: Catalog,
}

impl<S: ProductStore> CatalogSession<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            catalog: Catalog::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn snapshot(&self) -> CatalogSnapshot<'_> {
        self.catalog.snapshot()
    }

    /// Load the total count and the first page. A failed count is logged and
    /// leaves the count at zero; a failed page load is returned.
    pub async fn initialize(&mut self) -> Result<(), CatalogError> {
        if let Err(e) = self.refresh_counts().await {
            warn!("Failed to fetch total product count: {}", e);
        }
        self.load_current_page().await
    }

    pub async fn refresh_counts(&mut self) -> Result<usize, CatalogError> {
        let ticket = self.catalog.begin_count();
        let count = api::count_products(&self.store).await?;
        debug!("Total product count is {}", count);
        self.catalog.complete_count(ticket, count);
        Ok(count)
    }

    pub async fn load_current_page(&mut self) -> Result<(), CatalogError> {
        let request = self.catalog.begin_fetch();
        self.run_fetch(request).await
    }

    /// Returns `Ok(false)` when `page` is out of range and nothing was fetched.
    pub async fn view_page(&mut self, page: usize) -> Result<bool, CatalogError> {
        let request = self.catalog.request_page(page);
        self.run_navigation(request).await
    }

    pub async fn next_page(&mut self) -> Result<bool, CatalogError> {
        let request = self.catalog.next_page();
        self.run_navigation(request).await
    }

    pub async fn prev_page(&mut self) -> Result<bool, CatalogError> {
        let request = self.catalog.prev_page();
        self.run_navigation(request).await
    }

    pub async fn add(&mut self, draft: &ProductDraft) -> Result<Product, CatalogError> {
        match api::create_and_count(&self.store, draft).await {
            Ok(counted) => {
                let product = counted.value.clone();
                let request = self.catalog.on_created(counted.value, counted.total_count);
                self.reload(request).await;
                Ok(product)
            }
            Err(e) => {
                self.catalog.on_mutation_failed(Operation::Create, &e);
                Err(e)
            }
        }
    }

    pub async fn edit(
        &mut self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, CatalogError> {
        match api::replace_product(&self.store, id, draft).await {
            Ok(product) => {
                let request = self.catalog.on_updated(product.clone());
                self.reload(request).await;
                Ok(product)
            }
            Err(e) => {
                self.catalog.on_mutation_failed(Operation::Update, &e);
                Err(e)
            }
        }
    }

    pub async fn remove(&mut self, id: ProductId) -> Result<ProductId, CatalogError> {
        match api::remove_and_count(&self.store, id).await {
            Ok(counted) => {
                let request = self.catalog.on_deleted(counted.value, counted.total_count);
                self.reload(request).await;
                Ok(counted.value)
            }
            Err(e) => {
                self.catalog.on_mutation_failed(Operation::Delete, &e);
                Err(e)
            }
        }
    }

    /// Product details from the current page.
    pub fn view(&self, id: ProductId) -> Option<&Product> {
        self.catalog.product(id)
    }

    async fn run_navigation(
        &mut self,
        request: Option<FetchRequest>,
    ) -> Result<bool, CatalogError> {
        match request {
            Some(request) => {
                self.run_fetch(request).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn run_fetch(&mut self, request: FetchRequest) -> Result<(), CatalogError> {
        debug!(
            "Fetching page {} (items {}..{})",
            request.page, request.window.start, request.window.end
        );
        match api::fetch_page(&self.store, request.window).await {
            Ok(items) => {
                info!("Loaded {} products for page {}", items.len(), request.page);
                self.catalog
                    .complete_fetch(request.ticket, Ok::<_, &CatalogError>(items));
                Ok(())
            }
            Err(e) => {
                self.catalog.complete_fetch(request.ticket, Err(&e));
                Err(e)
            }
        }
    }

    /// Follow-up fetch after a mutation. Its failure is already recorded in
    /// the state, so the mutation itself still counts as done.
    async fn reload(&mut self, request: FetchRequest) {
        if let Err(e) = self.run_fetch(request).await {
            warn!("Reloading page {} failed: {}", request.page, e);
        }
    }
}
