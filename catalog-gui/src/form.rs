use catalog_core::{Product, ProductDraft};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Category,
    Brand,
    Price,
    Rating,
    Stock,
}

/// Text-backed state of the add/edit dialog. Numbers stay as typed until submit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    pub title: String,
    pub description: String,
    pub category: String,
    pub brand: String,
    pub price: String,
    pub rating: String,
    pub stock: String,
    pub is_available: bool,
    pub error: Option<String>,
    created_at: Option<OffsetDateTime>,
}

impl ProductForm {
    pub fn new() -> Self {
        Self {
            is_available: true,
            ..Default::default()
        }
    }

    pub fn from_product(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            brand: product.brand.clone(),
            price: product.price.to_string(),
            rating: product.rating.to_string(),
            stock: product.stock.to_string(),
            is_available: product.is_available,
            error: None,
            created_at: product.created_at,
        }
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Description => &self.description,
            FormField::Category => &self.category,
            FormField::Brand => &self.brand,
            FormField::Price => &self.price,
            FormField::Rating => &self.rating,
            FormField::Stock => &self.stock,
        }
    }

    pub fn set(&mut self, field: FormField, value: String) {
        let slot = match field {
            FormField::Title => &mut self.title,
            FormField::Description => &mut self.description,
            FormField::Category => &mut self.category,
            FormField::Brand => &mut self.brand,
            FormField::Price => &mut self.price,
            FormField::Rating => &mut self.rating,
            FormField::Stock => &mut self.stock,
        };
        *slot = value;
        self.error = None;
    }

    /// Parse and validate into a draft stamped with `now`.
    pub fn to_draft(&self, now: OffsetDateTime) -> Result<ProductDraft, String> {
        let price = self
            .price
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("Price must be a number, got '{}'", self.price.trim()))?;
        let rating = self
            .rating
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("Rating must be a number, got '{}'", self.rating.trim()))?;
        let stock = self.stock.trim().parse::<u32>().map_err(|_| {
            format!(
                "Stock must be a whole number of units, got '{}'",
                self.stock.trim()
            )
        })?;

        let draft = ProductDraft {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category.trim().to_string(),
            brand: self.brand.trim().to_string(),
            price,
            rating,
            stock,
            is_available: self.is_available,
            created_at: self.created_at,
            updated_at: None,
        }
        .stamped(now);

        draft.validate().map_err(|e| e.to_string())?;
        Ok(draft)
    }
}
