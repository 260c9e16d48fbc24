//! Product Entity

use chrono::{DateTime, Utc};
use kernel::error::app_error::{AppError, AppResult};
use platform::sanitize::{clean_optional, clean_required};

use crate::domain::value_object::{ProductId, money::Money, product_status::ProductStatus};

pub const NAME_MAX_CHARS: usize = 120;
pub const DESCRIPTION_MAX_CHARS: usize = 2000;
pub const CATEGORY_MAX_CHARS: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price: Money,
    pub stock: i32,
    pub status: ProductStatus,
    /// Public path of the uploaded image
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated, sanitized product fields from a create or update request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price: Money,
    pub stock: i32,
    pub status: ProductStatus,
}

impl ProductDraft {
    pub fn new(
        name: &str,
        description: Option<&str>,
        category: &str,
        price: Money,
        stock: i64,
        status: ProductStatus,
    ) -> AppResult<Self> {
        let name = clean_required(name, NAME_MAX_CHARS).map_err(|e| e.for_field("name"))?;
        let description = clean_optional(description, DESCRIPTION_MAX_CHARS)
            .map_err(|e| e.for_field("description"))?;
        let category =
            clean_required(category, CATEGORY_MAX_CHARS).map_err(|e| e.for_field("category"))?;

        if price.cents() < 0 {
            return Err(AppError::bad_request("Price must not be negative").with_param("price"));
        }
        let stock = i32::try_from(stock)
            .ok()
            .filter(|s| *s >= 0)
            .ok_or_else(|| {
                AppError::bad_request("Stock must be a non-negative integer").with_param("stock")
            })?;

        Ok(Self {
            name,
            description,
            category,
            price,
            stock,
            status,
        })
    }
}

impl Product {
    pub fn new(draft: ProductDraft) -> Self {
        let now = Utc::now();
        Self {
            product_id: ProductId::new(),
            name: draft.name,
            description: draft.description,
            category: draft.category,
            price: draft.price,
            stock: draft.stock,
            status: draft.status,
            image_path: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every editable field
    pub fn apply(&mut self, draft: ProductDraft) {
        self.name = draft.name;
        self.description = draft.description;
        self.category = draft.category;
        self.price = draft.price;
        self.stock = draft.stock;
        self.status = draft.status;
        self.updated_at = Utc::now();
    }

    pub fn set_image(&mut self, path: String) {
        self.image_path = Some(path);
        self.updated_at = Utc::now();
    }

    pub fn is_listed(&self) -> bool {
        self.status.is_purchasable()
    }
}
