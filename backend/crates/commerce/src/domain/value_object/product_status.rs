use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog visibility of a product
///
/// Only `Active` products are listed to shoppers and can be ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Active,
    #[default]
    Draft,
    Discontinued,
}

impl ProductStatus {
    /// Filter values accepted by the product list
    pub const CODES: &'static [&'static str] = &["active", "draft", "discontinued"];

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Draft => "draft",
            ProductStatus::Discontinued => "discontinued",
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "active" => Some(ProductStatus::Active),
            "draft" => Some(ProductStatus::Draft),
            "discontinued" => Some(ProductStatus::Discontinued),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_purchasable(&self) -> bool {
        matches!(self, ProductStatus::Active)
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
