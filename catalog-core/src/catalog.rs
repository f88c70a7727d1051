//! Reconciles the product list with the total item count.
//!
//! [`Catalog`] does no I/O. Front-ends run the remote calls themselves (see
//! [`crate::products::api`]) and feed the outcomes back in; every step that
//! needs a reload hands back the [`FetchRequest`] to run next.

use log::{info, warn};
use std::fmt::Display;

use crate::pagination::{self, PAGE_SIZE, PageWindow};
use crate::products::{Product, ProductId};
use crate::state::{FetchTicket, Operation, ProductEvent, ProductListState, RequestStatus};

/// A page fetch the caller must now perform and report back through
/// [`Catalog::complete_fetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub page: usize,
    pub window: PageWindow,
}

/// Id of one standalone count request, see [`Catalog::begin_count`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CountTicket(pub u64);

/// Everything a view needs to render the list.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSnapshot<'a> {
    pub items: &'a [Product],
    pub status: RequestStatus,
    pub error: Option<&'a str>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub can_go_prev: bool,
    pub can_go_next: bool,
}

#[derive(Debug, Default)]
pub struct Catalog {
    state: ProductListState,
    total_count: usize,
    last_ticket: u64,
    last_count_ticket: u64,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ProductListState {
        &self.state
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn total_pages(&self) -> usize {
        pagination::total_pages(self.total_count, PAGE_SIZE)
    }

    pub fn set_total_count(&mut self, total_count: usize) {
        self.total_count = total_count;
    }

    /// Issue a ticket for a count request the caller is about to run.
    pub fn begin_count(&mut self) -> CountTicket {
        self.last_count_ticket += 1;
        CountTicket(self.last_count_ticket)
    }

    /// Apply a count fetched under `ticket`. Returns `false` and keeps the
    /// current total when a newer count request was issued since, or a
    /// mutation reported its own count in the meantime.
    pub fn complete_count(&mut self, ticket: CountTicket, total_count: usize) -> bool {
        if ticket.0 != self.last_count_ticket {
            warn!(
                "Discarding stale product count {} ({:?}, latest is {})",
                total_count, ticket, self.last_count_ticket
            );
            return false;
        }
        self.total_count = total_count;
        true
    }

    /// Mark the current page as loading and issue a fresh ticket for it.
    pub fn begin_fetch(&mut self) -> FetchRequest {
        self.last_ticket += 1;
        let ticket = FetchTicket(self.last_ticket);
        self.state.apply(ProductEvent::FetchStarted { ticket });

        let page = self.state.current_page();
        FetchRequest {
            ticket,
            page,
            window: pagination::window(page, PAGE_SIZE),
        }
    }

    /// Settle the fetch identified by `ticket`. Returns `false` if a newer
    /// fetch has been issued since, in which case nothing changes.
    pub fn complete_fetch<E: Display>(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Product>, E>,
    ) -> bool {
        let event = match result {
            Ok(items) => ProductEvent::FetchSucceeded { ticket, items },
            Err(e) => ProductEvent::FetchFailed {
                ticket,
                message: e.to_string(),
            },
        };
        self.state.apply(event)
    }

    /// Navigate to `page` if it exists. Out-of-range requests are ignored
    /// and return `None`.
    pub fn request_page(&mut self, page: usize) -> Option<FetchRequest> {
        let page = pagination::clamp(page, self.total_pages())?;
        info!("Switching to page {} of {}", page, self.total_pages());
        self.state.apply(ProductEvent::PageSet(page));
        Some(self.begin_fetch())
    }

    pub fn next_page(&mut self) -> Option<FetchRequest> {
        self.request_page(self.state.current_page() + 1)
    }

    pub fn prev_page(&mut self) -> Option<FetchRequest> {
        let page = self.state.current_page().checked_sub(1)?;
        self.request_page(page)
    }

    /// A product was created. Moves to the new last page when the product
    /// opened one, then reloads.
    ///
    /// `total_count` is the collection size observed after the create; when
    /// that refresh failed the count is bumped locally instead.
    pub fn on_created(&mut self, product: Product, total_count: Option<usize>) -> FetchRequest {
        let previous_total_pages = self.total_pages();
        self.state.apply(ProductEvent::Created(product));
        self.last_count_ticket += 1;
        self.total_count = total_count.unwrap_or(self.total_count + 1);

        let page = pagination::post_create_page(
            self.state.current_page(),
            self.total_pages(),
            previous_total_pages,
        );
        self.move_to(page);
        self.begin_fetch()
    }

    /// A product was replaced. The current page is reloaded.
    pub fn on_updated(&mut self, product: Product) -> FetchRequest {
        self.state.apply(ProductEvent::Updated(product));
        self.begin_fetch()
    }

    /// A product was deleted. Steps back a page if the current one vanished,
    /// then reloads.
    pub fn on_deleted(&mut self, id: ProductId, total_count: Option<usize>) -> FetchRequest {
        self.state.apply(ProductEvent::Deleted(id));
        self.last_count_ticket += 1;
        self.total_count = total_count.unwrap_or(self.total_count.saturating_sub(1));

        let page = pagination::post_delete_page(self.state.current_page(), self.total_pages());
        self.move_to(page);
        self.begin_fetch()
    }

    pub fn on_mutation_failed<E: Display>(&mut self, operation: Operation, error: E) {
        self.state.apply(ProductEvent::MutationFailed {
            operation,
            message: error.to_string(),
        });
    }

    /// Look up a product on the current page (the "view details" intent).
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.state.items().iter().find(|p| p.id == id)
    }

    pub fn snapshot(&self) -> CatalogSnapshot<'_> {
        let current_page = self.state.current_page();
        let total_pages = self.total_pages();
        CatalogSnapshot {
            items: self.state.items(),
            status: self.state.status(),
            error: self.state.error(),
            current_page,
            total_pages,
            total_count: self.total_count,
            can_go_prev: pagination::can_go_prev(current_page),
            can_go_next: pagination::can_go_next(current_page, total_pages),
        }
    }

    fn move_to(&mut self, page: usize) {
        if page != self.state.current_page() {
            info!("Moving from page {} to page {}", self.state.current_page(), page);
            self.state.apply(ProductEvent::PageSet(page));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::store::memory::sample_draft;

    fn product(id: ProductId) -> Product {
        sample_draft(&format!("Product {}", id)).into_product(id)
    }

    fn page_of(ids: std::ops::RangeInclusive<ProductId>) -> Vec<Product> {
        ids.map(product).collect()
    }

    /// A catalog showing `page` of a collection with `total` products.
    fn catalog_on(page: usize, total: usize) -> Catalog {
        let mut catalog = Catalog::new();
        catalog.set_total_count(total);
        let request = if page == 1 {
            catalog.begin_fetch()
        } else {
            catalog.request_page(page).unwrap()
        };
        let start = request.window.start as ProductId + 1;
        let end = (request.window.end.min(total)) as ProductId;
        catalog.complete_fetch(request.ticket, Ok::<_, String>(page_of(start..=end)));
        catalog
    }

    #[test]
    fn test_two_items_single_page() {
        let catalog = catalog_on(1, 2);
        let snapshot = catalog.snapshot();
        assert_eq!(snapshot.total_pages, 1);
        assert_eq!(snapshot.items.len(), 2);
        assert!(!snapshot.can_go_prev);
        assert!(!snapshot.can_go_next);
        assert_eq!(snapshot.status, RequestStatus::Succeeded);
    }

    #[test]
    fn test_begin_fetch_uses_current_page_window() {
        let mut catalog = Catalog::new();
        catalog.set_total_count(12);
        let request = catalog.request_page(3).unwrap();
        assert_eq!(request.page, 3);
        assert_eq!(request.window, PageWindow { start: 10, end: 15 });
        assert!(catalog.state().is_loading());
    }

    #[test]
    fn test_tickets_increase() {
        let mut catalog = Catalog::new();
        let first = catalog.begin_fetch();
        let second = catalog.begin_fetch();
        assert!(second.ticket > first.ticket);
    }

    #[test]
    fn test_out_of_range_navigation_is_ignored() {
        let mut catalog = catalog_on(1, 7);
        assert!(catalog.request_page(0).is_none());
        assert!(catalog.request_page(3).is_none());
        assert!(catalog.prev_page().is_none());
        assert_eq!(catalog.state().current_page(), 1);
        assert_eq!(catalog.state().status(), RequestStatus::Succeeded);

        let request = catalog.next_page().unwrap();
        assert_eq!(request.page, 2);
        assert!(catalog.next_page().is_none());
    }

    #[test]
    fn test_delete_last_item_on_last_page_steps_back() {
        let mut catalog = catalog_on(2, 6);
        assert_eq!(catalog.snapshot().items.len(), 1);

        let request = catalog.on_deleted(6, Some(5));
        assert_eq!(request.page, 1);
        assert_eq!(request.window, PageWindow { start: 0, end: 5 });
        assert_eq!(catalog.state().current_page(), 1);
        assert_eq!(catalog.total_pages(), 1);
        assert!(catalog.state().items().is_empty());
    }

    #[test]
    fn test_delete_keeps_page_and_reloads_it() {
        let mut catalog = catalog_on(1, 8);
        let request = catalog.on_deleted(2, Some(7));
        assert_eq!(request.page, 1);
        assert_eq!(catalog.state().items().len(), 4);
        assert!(catalog.state().is_loading());
    }

    #[test]
    fn test_delete_only_product() {
        let mut catalog = catalog_on(1, 1);
        let request = catalog.on_deleted(1, Some(0));
        assert_eq!(request.page, 1);
        assert_eq!(catalog.total_pages(), 0);
        assert!(!catalog.snapshot().can_go_next);
    }

    #[test]
    fn test_sixth_product_moves_to_page_two() {
        let mut catalog = catalog_on(1, 5);
        let request = catalog.on_created(product(6), Some(6));
        assert_eq!(catalog.total_pages(), 2);
        assert_eq!(request.page, 2);
        assert_eq!(request.window, PageWindow { start: 5, end: 10 });
    }

    #[test]
    fn test_create_with_room_left_stays() {
        let mut catalog = catalog_on(1, 3);
        let request = catalog.on_created(product(4), Some(4));
        assert_eq!(request.page, 1);
        // Appended locally until the reload lands.
        assert_eq!(catalog.state().items().len(), 4);
    }

    #[test]
    fn test_count_refresh_failure_falls_back_to_local_count() {
        let mut catalog = catalog_on(1, 5);
        catalog.on_created(product(6), None);
        assert_eq!(catalog.total_count(), 6);
        assert_eq!(catalog.state().current_page(), 2);

        catalog.on_deleted(6, None);
        assert_eq!(catalog.total_count(), 5);
        assert_eq!(catalog.state().current_page(), 1);
    }

    #[test]
    fn test_update_absent_product_leaves_items() {
        let mut catalog = catalog_on(1, 3);
        let before = catalog.state().items().to_vec();
        let mut elsewhere = product(40);
        elsewhere.title = "Not on this page".to_string();

        catalog.on_updated(elsewhere);
        assert_eq!(catalog.state().items(), before.as_slice());
    }

    #[test]
    fn test_stale_page_does_not_overwrite_newer_one() {
        let mut catalog = Catalog::new();
        catalog.set_total_count(15);
        let slow = catalog.begin_fetch();
        let fast = catalog.request_page(2).unwrap();

        assert!(catalog.complete_fetch(fast.ticket, Ok::<_, String>(page_of(6..=10))));
        assert!(!catalog.complete_fetch(slow.ticket, Ok::<_, String>(page_of(1..=5))));

        assert_eq!(catalog.state().current_page(), 2);
        assert_eq!(catalog.state().items()[0].id, 6);
    }

    #[test]
    fn test_latest_count_request_wins() {
        let mut catalog = Catalog::new();
        let first = catalog.begin_count();
        let second = catalog.begin_count();

        assert!(catalog.complete_count(second, 8));
        assert!(!catalog.complete_count(first, 3));
        assert_eq!(catalog.total_count(), 8);
    }

    #[test]
    fn test_count_issued_before_mutation_is_discarded() {
        let mut catalog = catalog_on(1, 5);
        let startup = catalog.begin_count();

        catalog.on_created(product(6), Some(6));
        assert!(!catalog.complete_count(startup, 5));

        let snapshot = catalog.snapshot();
        assert_eq!(snapshot.total_count, 6);
        assert_eq!(snapshot.current_page, 2);
        assert_eq!(snapshot.total_pages, 2);

        let startup = catalog.begin_count();
        catalog.on_deleted(6, Some(5));
        assert!(!catalog.complete_count(startup, 6));
        assert_eq!(catalog.total_count(), 5);
    }

    #[test]
    fn test_failed_fetch_shows_error() {
        let mut catalog = Catalog::new();
        let request = catalog.begin_fetch();
        catalog.complete_fetch(request.ticket, Err("Failed to fetch products"));
        let snapshot = catalog.snapshot();
        assert_eq!(snapshot.status, RequestStatus::Failed);
        assert_eq!(snapshot.error, Some("Failed to fetch products"));
    }

    #[test]
    fn test_view_looks_up_current_page() {
        let catalog = catalog_on(1, 3);
        assert_eq!(catalog.product(2).map(|p| p.id), Some(2));
        assert!(catalog.product(9).is_none());
    }

    #[test]
    fn test_mutation_failure() {
        let mut catalog = catalog_on(1, 3);
        catalog.on_mutation_failed(Operation::Create, "Request to x failed with status 500");
        assert_eq!(
            catalog.snapshot().error,
            Some("Adding product failed: Request to x failed with status 500")
        );
        assert_eq!(catalog.state().items().len(), 3);
    }
}
