use serde::{Deserialize, Serialize};
use std::fmt;

/// Storefront roles
///
/// Sign-up always yields `Customer`. Staff manage the catalog; admins manage
/// everything, including orders and customers. Stored as
/// `users.user_role SMALLINT` and carried by name in access tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Customer,
    Staff,
    Admin,
}

impl UserRole {
    const ALL: [UserRole; 3] = [UserRole::Customer, UserRole::Staff, UserRole::Admin];

    pub const fn id(self) -> i16 {
        match self {
            UserRole::Customer => 0,
            UserRole::Staff => 1,
            UserRole::Admin => 2,
        }
    }

    pub fn from_id(id: i16) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.id() == id)
    }

    pub const fn is_admin(self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UserRole::Customer => "customer",
            UserRole::Staff => "staff",
            UserRole::Admin => "admin",
        })
    }
}
