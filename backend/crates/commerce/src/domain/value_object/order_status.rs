//! Order lifecycle
//!
//! ```text
//! pending ──> processing ──> shipped ──> delivered
//!    │             │
//!    └──> cancelled <┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const CODES: &'static [&'static str] =
        &["pending", "processing", "shipped", "delivered", "cancelled"];

    #[inline]
    pub const fn code(&self) -> &'static str {
        use OrderStatus::*;
        match self {
            Pending => "pending",
            Processing => "processing",
            Shipped => "shipped",
            Delivered => "delivered",
            Cancelled => "cancelled",
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        use OrderStatus::*;
        match code {
            "pending" => Some(Pending),
            "processing" => Some(Processing),
            "shipped" => Some(Shipped),
            "delivered" => Some(Delivered),
            "cancelled" => Some(Cancelled),
            _ => None,
        }
    }

    pub const fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Pending, Cancelled)
                | (Processing, Shipped)
                | (Processing, Cancelled)
                | (Shipped, Delivered)
        )
    }

    /// Stock is still reserved and the order may be cancelled
    #[inline]
    pub const fn is_open(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Processing)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
