//! Typed entity identifiers
//!
//! Every storefront id is a UUID; the phantom marker stops an `OrderId`
//! from being passed where a `ProductId` is expected.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::app_error::{AppError, AppResult};

pub struct Id<Entity> {
    uuid: Uuid,
    _entity: PhantomData<fn() -> Entity>,
}

pub mod markers {
    pub struct User;
    pub struct Product;
    pub struct Order;
    /// Shares its UUID with the owning [`User`]
    pub struct Customer;
}

pub type UserId = Id<markers::User>;
pub type ProductId = Id<markers::Product>;
pub type OrderId = Id<markers::Order>;
pub type CustomerId = Id<markers::Customer>;

impl<Entity> Id<Entity> {
    /// Fresh random (v4) id
    pub fn new() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self {
            uuid,
            _entity: PhantomData,
        }
    }

    /// Parse a path segment or body field; anything but a UUID is a 400
    pub fn parse(raw: &str) -> AppResult<Self> {
        match Uuid::parse_str(raw.trim()) {
            Ok(uuid) => Ok(Self::from_uuid(uuid)),
            Err(e) => Err(AppError::bad_request("Invalid identifier format")
                .with_action("Identifiers must be UUIDs")
                .with_source(e)),
        }
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.uuid
    }

    pub fn into_uuid(self) -> Uuid {
        self.uuid
    }

    /// Same UUID, other entity (a customer profile is keyed by its user)
    pub fn cast<Other>(self) -> Id<Other> {
        Id::from_uuid(self.uuid)
    }
}

// Manual impls: derives would demand the bounds on `Entity` itself.

impl<Entity> Default for Id<Entity> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Entity> Clone for Id<Entity> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Entity> Copy for Id<Entity> {}

impl<Entity> PartialEq for Id<Entity> {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl<Entity> Eq for Id<Entity> {}

impl<Entity> Hash for Id<Entity> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uuid.hash(state);
    }
}

impl<Entity> fmt::Debug for Id<Entity> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Id").field(&self.uuid).finish()
    }
}

impl<Entity> fmt::Display for Id<Entity> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.uuid, f)
    }
}

impl<Entity> FromStr for Id<Entity> {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        Self::parse(s)
    }
}

impl<Entity> From<Uuid> for Id<Entity> {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl<Entity> From<Id<Entity>> for Uuid {
    fn from(id: Id<Entity>) -> Self {
        id.uuid
    }
}

impl<Entity> Serialize for Id<Entity> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.uuid)
    }
}

impl<'de, Entity> Deserialize<'de> for Id<Entity> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Uuid::parse_str(raw.trim())
            .map(Self::from_uuid)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_non_uuid_with_400() {
        for raw in ["", "42", "not-a-uuid", "{\"$gt\": \"\"}"] {
            let err = ProductId::parse(raw).unwrap_err();
            assert_eq!(err.status_code(), 400, "{raw}");
            assert_eq!(err.message(), "Invalid identifier format");
        }
    }

    #[test]
    fn test_parse_ignores_surrounding_whitespace() {
        let uuid = Uuid::new_v4();
        let id: OrderId = format!("  {uuid}\n").parse().unwrap();
        assert_eq!(id.into_uuid(), uuid);
    }

    #[test]
    fn test_customer_id_follows_user_id() {
        let user = UserId::new();
        let customer: CustomerId = user.cast();
        assert_eq!(user.as_uuid(), customer.as_uuid());
        assert_eq!(user.to_string(), customer.to_string());
    }

    #[test]
    fn test_json_is_a_plain_string() {
        let id = OrderId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        assert_eq!(serde_json::from_str::<OrderId>(&json).unwrap(), id);
        assert!(serde_json::from_str::<OrderId>("\"order-1\"").is_err());
    }
}
