//! Role gate
//!
//! `attach_principal` turns a bearer token into a [`Principal`]; handlers
//! then declare who may call them with `Authorized<Policy>`:
//!
//! ```rust,ignore
//! async fn delete_order(gate: Authorized<Administrators>, Path(id): Path<String>) { .. }
//! ```
//!
//! Without a principal the extractor rejects with 401, with the wrong role
//! 403. Either way the handler body (and any list query) never runs.

use std::marker::PhantomData;
use std::ops::Deref;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::value_object::{UserId, user_role::UserRole};
use crate::error::AuthError;

/// Caller identity taken from a verified access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub role: UserRole,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Set of roles a route accepts
pub trait RolePolicy: Send + Sync + 'static {
    const ALLOWED: &'static [UserRole];

    fn allows(role: UserRole) -> bool {
        Self::ALLOWED.contains(&role)
    }
}

/// Any signed-in user
pub struct AnyUser;

impl RolePolicy for AnyUser {
    const ALLOWED: &'static [UserRole] = &[UserRole::Customer, UserRole::Staff, UserRole::Admin];
}

/// Shoppers only (placing orders, own profile)
pub struct CustomersOnly;

impl RolePolicy for CustomersOnly {
    const ALLOWED: &'static [UserRole] = &[UserRole::Customer];
}

/// Product catalog writers
pub struct CatalogManagers;

impl RolePolicy for CatalogManagers {
    const ALLOWED: &'static [UserRole] = &[UserRole::Staff, UserRole::Admin];
}

pub struct Administrators;

impl RolePolicy for Administrators {
    const ALLOWED: &'static [UserRole] = &[UserRole::Admin];
}

/// Extractor proving the caller passed policy `P`
pub struct Authorized<P: RolePolicy> {
    principal: Principal,
    _policy: PhantomData<fn() -> P>,
}

impl<P: RolePolicy> Authorized<P> {
    pub fn principal(&self) -> Principal {
        self.principal
    }
}

impl<P: RolePolicy> Deref for Authorized<P> {
    type Target = Principal;

    fn deref(&self) -> &Principal {
        &self.principal
    }
}

impl<S, P> FromRequestParts<S> for Authorized<P>
where
    S: Send + Sync,
    P: RolePolicy,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = parts
            .extensions
            .get::<Principal>()
            .copied()
            .ok_or(AuthError::MissingToken)?;

        if !P::allows(principal.role) {
            tracing::warn!(
                user_id = %principal.user_id,
                role = %principal.role,
                path = %parts.uri.path(),
                "Role not permitted for route"
            );
            return Err(AuthError::InsufficientRole);
        }

        Ok(Self {
            principal,
            _policy: PhantomData,
        })
    }
}
