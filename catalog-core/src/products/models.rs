use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::CatalogError;

/// Server-assigned product identifier.
pub type ProductId = u64;

pub const MAX_RATING: f64 = 5.0;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub brand: String,
    pub price: f64,
    pub rating: f64,
    pub stock: u32,
    /// Informational only; not derived from `stock`.
    pub is_available: bool,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<OffsetDateTime>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<OffsetDateTime>,
}

/// Request body for create and replace: a product without its id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub brand: String,
    pub price: f64,
    pub rating: f64,
    pub stock: u32,
    pub is_available: bool,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<OffsetDateTime>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<OffsetDateTime>,
}

impl ProductDraft {
    /// Pre-fill a draft from an existing record, e.g. for the edit dialog.
    pub fn from_product(product: &Product) -> Self {
        ProductDraft {
            title: product.title.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            brand: product.brand.clone(),
            price: product.price,
            rating: product.rating,
            stock: product.stock,
            is_available: product.is_available,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }

    /// Set `updated_at` to `now`, and `created_at` too if the draft has none yet.
    pub fn stamped(mut self, now: OffsetDateTime) -> Self {
        self.created_at.get_or_insert(now);
        self.updated_at = Some(now);
        self
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.title.trim().is_empty() {
            return Err(CatalogError::InvalidProduct("Title is required".to_string()));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(CatalogError::InvalidProduct(format!(
                "Price must be a non-negative number, got {}",
                self.price
            )));
        }
        if !(0.0..=MAX_RATING).contains(&self.rating) {
            return Err(CatalogError::InvalidProduct(format!(
                "Rating must be between 0 and {}, got {}",
                MAX_RATING, self.rating
            )));
        }
        Ok(())
    }

    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            title: self.title,
            description: self.description,
            category: self.category,
            brand: self.brand,
            price: self.price,
            rating: self.rating,
            stock: self.stock,
            is_available: self.is_available,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
