use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use thiserror::Error;
use time::{Date, OffsetDateTime};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// User record. Never serialized; the hash stays inside the service layer.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub password_hash: String,
}

/// Expense record as stored and as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Expense {
    pub id: i32,
    pub user_id: Option<i32>, // None = anonymous
    pub amount: Decimal,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(with = "iso_date")]
    pub date: Date,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The mutable part of an expense, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseFields {
    pub amount: Decimal,
    pub description: Option<String>,
    pub category: Option<String>,
    pub date: Date,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated")]
    UniqueViolation,
    #[error("foreign key constraint violated")]
    ForeignKeyViolation,
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return StoreError::UniqueViolation;
            }
            if db.is_foreign_key_violation() {
                return StoreError::ForeignKeyViolation;
            }
        }
        StoreError::Database(err)
    }
}

/// Persistence boundary for users and expenses.
///
/// Mutations on owned expenses take the owner id and must apply it in the same
/// statement as the record id, so a foreign or missing record matches nothing.
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Removes the user and every expense they own as one unit.
    async fn delete_user(&self, user_id: i32) -> Result<(), StoreError>;

    /// Expenses of `owner`, or ownerless ones for `None`; newest date first.
    async fn list_expenses(&self, owner: Option<i32>) -> Result<Vec<Expense>, StoreError>;

    async fn insert_expense(
        &self,
        owner: Option<i32>,
        fields: &ExpenseFields,
    ) -> Result<Expense, StoreError>;

    async fn update_owned_expense(
        &self,
        owner: i32,
        id: i32,
        fields: &ExpenseFields,
    ) -> Result<Option<Expense>, StoreError>;

    /// Returns the number of rows removed (0 or 1).
    async fn delete_owned_expense(&self, owner: i32, id: i32) -> Result<u64, StoreError>;
}
