//! Product list state machine.
//!
//! Holds the products of the current page together with the status of the
//! most recent request. All changes go through [`ProductListState::apply`];
//! fetch results are fenced by [`FetchTicket`] so that only the most recently
//! issued fetch can settle the state.

use log::warn;
use std::fmt;

use crate::products::{Product, ProductId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Monotonic id of one fetch. Higher means issued later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(pub u64);

/// A mutating operation, as named in failure messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Create => "Adding product",
            Operation::Update => "Updating product",
            Operation::Delete => "Deleting product",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProductEvent {
    FetchStarted { ticket: FetchTicket },
    FetchSucceeded { ticket: FetchTicket, items: Vec<Product> },
    FetchFailed { ticket: FetchTicket, message: String },
    Created(Product),
    Updated(Product),
    Deleted(ProductId),
    PageSet(usize),
    MutationFailed { operation: Operation, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductListState {
    items: Vec<Product>,
    status: RequestStatus,
    error: Option<String>,
    current_page: usize,
    pending_fetch: Option<FetchTicket>,
}

impl Default for ProductListState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            status: RequestStatus::Idle,
            error: None,
            current_page: 1,
            pending_fetch: None,
        }
    }
}

impl ProductListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Product] {
        &self.items
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Ticket of the fetch whose result is still awaited, if any.
    pub fn pending_fetch(&self) -> Option<FetchTicket> {
        self.pending_fetch
    }

    pub fn is_loading(&self) -> bool {
        self.status == RequestStatus::Loading
    }

    /// Apply one lifecycle event. Returns `false` when the event was ignored:
    /// a stale or duplicate fetch result, or an update/delete for a product
    /// that is not on the current page.
    pub fn apply(&mut self, event: ProductEvent) -> bool {
        let applied = match event {
            ProductEvent::FetchStarted { ticket } => {
                self.status = RequestStatus::Loading;
                self.error = None;
                self.pending_fetch = Some(ticket);
                true
            }
            ProductEvent::FetchSucceeded { ticket, items } => {
                if self.settles(ticket) {
                    self.status = RequestStatus::Succeeded;
                    self.items = items;
                    self.pending_fetch = None;
                    true
                } else {
                    false
                }
            }
            ProductEvent::FetchFailed { ticket, message } => {
                if self.settles(ticket) {
                    self.status = RequestStatus::Failed;
                    self.error = Some(message);
                    self.pending_fetch = None;
                    true
                } else {
                    false
                }
            }
            // Appended as-is; the follow-up fetch puts it where it belongs.
            ProductEvent::Created(product) => {
                self.items.push(product);
                true
            }
            ProductEvent::Updated(product) => {
                match self.items.iter_mut().find(|item| item.id == product.id) {
                    Some(item) => {
                        *item = product;
                        true
                    }
                    None => false,
                }
            }
            ProductEvent::Deleted(id) => {
                let before = self.items.len();
                self.items.retain(|item| item.id != id);
                self.items.len() != before
            }
            ProductEvent::PageSet(page) => {
                self.current_page = page;
                true
            }
            ProductEvent::MutationFailed { operation, message } => {
                self.status = RequestStatus::Failed;
                self.error = Some(format!("{} failed: {}", operation, message));
                true
            }
        };

        debug_assert_eq!(
            self.status == RequestStatus::Failed,
            self.error.is_some(),
            "failed status and error message must go together"
        );
        applied
    }

    fn settles(&self, ticket: FetchTicket) -> bool {
        let current = self.pending_fetch == Some(ticket) && self.status == RequestStatus::Loading;
        if !current {
            warn!(
                "Discarding stale fetch result {:?} (awaiting {:?})",
                ticket, self.pending_fetch
            );
        }
        current
    }
}
