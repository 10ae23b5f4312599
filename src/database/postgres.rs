use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{postgres::PgRow, FromRow, PgPool, Row};
use uuid::Uuid;

use crate::database::models::{Listing, Role, User};
use crate::database::store::{ListingStore, Store, StoreError, UserStore};
use crate::filter::{FilterParam, ListingFilter};

const UNIQUE_VIOLATION: &str = "23505";

/// Postgres-backed store. Listings are kept as jsonb documents with the id and
/// owner copied into indexed columns.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row.role.parse::<Role>().map_err(|reason| StoreError::CorruptDocument {
            id: row.email.clone(),
            reason,
        })?;
        Ok(User {
            email: row.email,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
        })
    }
}

fn listing_from_row(row: &PgRow) -> Result<Listing, StoreError> {
    let id: Uuid = row.try_get("id")?;
    let document: Value = row.try_get("document")?;
    serde_json::from_value(document).map_err(|e| StoreError::CorruptDocument {
        id: id.to_string(),
        reason: e.to_string(),
    })
}

fn listing_document(listing: &Listing) -> Result<Value, StoreError> {
    serde_json::to_value(listing).map_err(|e| StoreError::QueryError(e.to_string()))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO users (email, password_hash, role, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(StoreError::DuplicateEmail(user.email.clone())),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT email, password_hash, role, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl ListingStore for PgStore {
    async fn insert_listing(&self, listing: &Listing) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO listings (id, owner_email, document, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(listing.id)
        .bind(&listing.owner_email)
        .bind(listing_document(listing)?)
        .bind(listing.created_at)
        .bind(listing.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_listing(&self, id: Uuid) -> Result<Option<Listing>, StoreError> {
        let row = sqlx::query("SELECT id, document FROM listings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(listing_from_row).transpose()
    }

    async fn listings_by_owner(&self, owner_email: &str) -> Result<Vec<Listing>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, document FROM listings WHERE owner_email = $1 ORDER BY created_at",
        )
        .bind(owner_email)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(listing_from_row).collect()
    }

    async fn search_listings(&self, filter: &ListingFilter) -> Result<Vec<Listing>, StoreError> {
        let (where_clause, params) = filter.where_clause(0);
        let sql = format!(
            "SELECT id, document FROM listings WHERE {} ORDER BY created_at",
            where_clause
        );

        let mut query = sqlx::query(&sql);
        for param in params {
            query = match param {
                FilterParam::Text(s) => query.bind(s),
                FilterParam::Number(n) => query.bind(n),
            };
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(listing_from_row).collect()
    }

    async fn replace_listing(&self, listing: &Listing) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE listings SET document = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(listing.id)
        .bind(listing_document(listing)?)
        .bind(listing.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_listing(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
