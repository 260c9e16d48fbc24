//! Customer Entity
//!
//! A shopper's profile. Keyed by the owning auth user's id, so the profile
//! of a signed-in caller is found without a lookup table.

use auth::domain::value_object::email::Email;
use chrono::{DateTime, Utc};
use kernel::error::app_error::{AppError, AppResult};
use platform::sanitize::{clean_optional, clean_required};

use crate::domain::value_object::{CustomerId, customer_status::CustomerStatus};

pub const FULL_NAME_MAX_CHARS: usize = 100;
pub const PHONE_MAX_CHARS: usize = 30;
pub const ADDRESS_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: CustomerStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated profile fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerProfile {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl CustomerProfile {
    pub fn new(
        full_name: &str,
        email: &str,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> AppResult<Self> {
        let full_name = clean_required(full_name, FULL_NAME_MAX_CHARS)
            .map_err(|e| e.for_field("fullName"))?;
        let email = Email::new(email)?.as_str().to_string();
        let phone = clean_optional(phone, PHONE_MAX_CHARS).map_err(|e| e.for_field("phone"))?;
        if let Some(phone) = &phone {
            validate_phone(phone)?;
        }
        let address =
            clean_optional(address, ADDRESS_MAX_CHARS).map_err(|e| e.for_field("address"))?;

        Ok(Self {
            full_name,
            email,
            phone,
            address,
        })
    }
}

/// Digits with the usual separators, optionally a leading `+`
fn validate_phone(phone: &str) -> AppResult<()> {
    let body = phone.strip_prefix('+').unwrap_or(phone);
    let allowed = body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'));
    if !allowed || !body.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::bad_request("Invalid phone number")
            .with_param("phone")
            .with_action("Use digits, spaces, dashes and parentheses only"));
    }
    Ok(())
}

impl Customer {
    pub fn new(customer_id: CustomerId, profile: CustomerProfile) -> Self {
        let now = Utc::now();
        Self {
            customer_id,
            full_name: profile.full_name,
            email: profile.email,
            phone: profile.phone,
            address: profile.address,
            status: CustomerStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, profile: CustomerProfile) {
        self.full_name = profile.full_name;
        self.email = profile.email;
        self.phone = profile.phone;
        self.address = profile.address;
        self.updated_at = Utc::now();
    }

    pub fn set_status(&mut self, status: CustomerStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn is_blocked(&self) -> bool {
        self.status == CustomerStatus::Blocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_normalizes() {
        let profile = CustomerProfile::new(
            " Ada Lovelace ",
            "Ada@Example.com",
            Some("+44 (20) 7946-0000"),
            Some(""),
        )
        .unwrap();
        assert_eq!(profile.full_name, "Ada Lovelace");
        assert_eq!(profile.email, "ada@example.com");
        assert_eq!(profile.address, None);
    }

    #[test]
    fn test_profile_rejects_bad_phone_and_email() {
        let err = CustomerProfile::new("Ada", "ada@example.com", Some("call me"), None).unwrap_err();
        assert_eq!(err.param(), Some("phone"));

        let err = CustomerProfile::new("Ada", "not-an-email", None, None).unwrap_err();
        assert_eq!(err.param(), Some("email"));
    }

    #[test]
    fn test_block() {
        let profile = CustomerProfile::new("Ada", "ada@example.com", None, None).unwrap();
        let mut customer = Customer::new(CustomerId::new(), profile);
        assert!(!customer.is_blocked());
        customer.set_status(CustomerStatus::Blocked);
        assert!(customer.is_blocked());
    }
}
