//! PostgreSQL adapter for accounts, credentials and refresh tokens
//!
//! Tables are defined in `database/migrations/0001_init.sql`. Roles and
//! statuses are stored as `SMALLINT` ids; user names keep the typed form
//! next to a `user_name_canonical` column carrying the unique index.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::entity::{auth::Auth, refresh_token::RefreshToken, user::User};
use crate::domain::repository::{AuthRepository, RefreshTokenRepository, UserRepository};
use crate::domain::value_object::{
    UserId, email::Email, user_name::UserName, user_password::UserPassword, user_role::UserRole,
    user_status::UserStatus,
};
use crate::error::{AuthError, AuthResult};

/// Unique constraint names from the migration
const EMAIL_KEY: &str = "users_email_key";

const SELECT_USER: &str = "SELECT user_id, user_name, email, user_role, user_status, \
     last_login_at, created_at, updated_at FROM users WHERE ";

#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Drop refresh-token rows that can no longer be presented
    pub async fn cleanup_expired(&self) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < now()")
            .execute(&self.pool)
            .await?
            .rows_affected();
        tracing::info!(tokens_deleted = deleted, "Expired refresh tokens removed");
        Ok(deleted)
    }

    async fn user_where(&self, column: &'static str, value: &str) -> AuthResult<Option<User>> {
        let mut query = QueryBuilder::<Postgres>::new(SELECT_USER);
        query.push(column).push(" = ").push_bind(value);
        let row: Option<UserRow> = query.build_query_as().fetch_optional(&self.pool).await?;
        row.map(User::try_from).transpose()
    }

    async fn user_exists(&self, column: &'static str, value: &str) -> AuthResult<bool> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT EXISTS(SELECT 1 FROM users WHERE ");
        query.push(column).push(" = ").push_bind(value).push(")");
        let exists: bool = query.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(exists)
    }
}

/// Which unique key a duplicate sign-up hit
fn duplicate_user(err: sqlx::Error) -> AuthError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            if db.constraint() == Some(EMAIL_KEY) {
                AuthError::EmailTaken
            } else {
                AuthError::UserNameTaken
            }
        }
        _ => AuthError::Database(err),
    }
}

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &User, auth: &Auth) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO users (user_id, user_name, user_name_canonical, email, user_role, \
             user_status, last_login_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(user.user_id.as_uuid())
        .bind(user.user_name.original())
        .bind(user.user_name.canonical())
        .bind(user.email.as_str())
        .bind(user.user_role.id())
        .bind(user.user_status.id())
        .bind(user.last_login_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(duplicate_user)?;

        sqlx::query(
            "INSERT INTO auth_credentials (user_id, password_hash, login_failed_count, \
             last_failed_at, locked_until, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(auth.user_id.as_uuid())
        .bind(auth.password_hash.as_phc_string())
        .bind(failure_count(auth))
        .bind(auth.last_failed_at)
        .bind(auth.locked_until)
        .bind(auth.created_at)
        .bind(auth.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(user_id = %user.user_id, "Account rows inserted");
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USER}user_id = $1"))
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        self.user_where("user_name_canonical", user_name.canonical()).await
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        self.user_where("email", email.as_str()).await
    }

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool> {
        self.user_exists("user_name_canonical", user_name.canonical()).await
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        self.user_exists("email", email.as_str()).await
    }

    async fn exists_admin(&self) -> AuthResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE user_role = $1)")
            .bind(UserRole::Admin.id())
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            "UPDATE users SET user_role = $2, user_status = $3, last_login_at = $4, \
             updated_at = $5 WHERE user_id = $1",
        )
        .bind(user.user_id.as_uuid())
        .bind(user.user_role.id())
        .bind(user.user_status.id())
        .bind(user.last_login_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

impl AuthRepository for PgAuthRepository {
    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<Auth>> {
        let row: Option<AuthRow> = sqlx::query_as(
            "SELECT user_id, password_hash, login_failed_count, last_failed_at, locked_until, \
             created_at, updated_at FROM auth_credentials WHERE user_id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Auth::try_from).transpose()
    }

    async fn update(&self, auth: &Auth) -> AuthResult<()> {
        sqlx::query(
            "UPDATE auth_credentials SET password_hash = $2, login_failed_count = $3, \
             last_failed_at = $4, locked_until = $5, updated_at = $6 WHERE user_id = $1",
        )
        .bind(auth.user_id.as_uuid())
        .bind(auth.password_hash.as_phc_string())
        .bind(failure_count(auth))
        .bind(auth.last_failed_at)
        .bind(auth.locked_until)
        .bind(auth.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

impl RefreshTokenRepository for PgAuthRepository {
    async fn create(&self, token: &RefreshToken) -> AuthResult<()> {
        sqlx::query(
            "INSERT INTO refresh_tokens (token_id, user_id, expires_at, revoked_at, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(token.token_id)
        .bind(token.user_id.as_uuid())
        .bind(token.expires_at)
        .bind(token.revoked_at)
        .bind(token.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, token_id: Uuid) -> AuthResult<Option<RefreshToken>> {
        let row: Option<RefreshTokenRow> = sqlx::query_as(
            "SELECT token_id, user_id, expires_at, revoked_at, created_at \
             FROM refresh_tokens WHERE token_id = $1",
        )
        .bind(token_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(RefreshToken::from))
    }

    async fn revoke(&self, token_id: Uuid) -> AuthResult<bool> {
        // of two concurrent rotations only one updates the row
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = now() \
             WHERE token_id = $1 AND revoked_at IS NULL",
        )
        .bind(token_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn revoke_all_for_user(&self, user_id: &UserId) -> AuthResult<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = now() \
             WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        PgAuthRepository::cleanup_expired(self).await
    }
}

fn failure_count(auth: &Auth) -> i16 {
    i16::try_from(auth.login_failed_count).unwrap_or(i16::MAX)
}

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    user_name: String,
    email: String,
    user_role: i16,
    user_status: i16,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AuthError;

    fn try_from(row: UserRow) -> AuthResult<Self> {
        let user_role = UserRole::from_id(row.user_role)
            .ok_or_else(|| AuthError::Internal(format!("Unknown user_role {}", row.user_role)))?;
        let user_status = UserStatus::from_id(row.user_status).ok_or_else(|| {
            AuthError::Internal(format!("Unknown user_status {}", row.user_status))
        })?;

        Ok(User {
            user_id: UserId::from_uuid(row.user_id),
            user_name: UserName::from_db(row.user_name),
            email: Email::from_db(row.email),
            user_role,
            user_status,
            last_login_at: row.last_login_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AuthRow {
    user_id: Uuid,
    password_hash: String,
    login_failed_count: i16,
    last_failed_at: Option<DateTime<Utc>>,
    locked_until: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AuthRow> for Auth {
    type Error = AuthError;

    fn try_from(row: AuthRow) -> AuthResult<Self> {
        Ok(Auth {
            user_id: UserId::from_uuid(row.user_id),
            password_hash: UserPassword::from_phc_string(row.password_hash)?,
            login_failed_count: u16::try_from(row.login_failed_count).unwrap_or(0),
            last_failed_at: row.last_failed_at,
            locked_until: row.locked_until,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RefreshTokenRow {
    token_id: Uuid,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<RefreshTokenRow> for RefreshToken {
    fn from(row: RefreshTokenRow) -> Self {
        RefreshToken {
            token_id: row.token_id,
            user_id: UserId::from_uuid(row.user_id),
            expires_at: row.expires_at,
            revoked_at: row.revoked_at,
            created_at: row.created_at,
        }
    }
}
