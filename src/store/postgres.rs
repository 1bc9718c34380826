use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::{Expense, ExpenseFields, Store, StoreError, User};

const EXPENSE_COLUMNS: &str = "id, user_id, amount, description, category, date, created_at";

/// Postgres-backed store over an explicitly constructed pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password)
            VALUES ($1, $2)
            RETURNING id, email, password AS password_hash
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password AS password_hash
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn delete_user(&self, user_id: i32) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let expenses = sqlx::query("DELETE FROM expenses WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!(user_id, expenses, "user and expenses deleted");
        Ok(())
    }

    async fn list_expenses(&self, owner: Option<i32>) -> Result<Vec<Expense>, StoreError> {
        let rows = match owner {
            Some(user_id) => {
                sqlx::query_as::<_, Expense>(&format!(
                    "SELECT {EXPENSE_COLUMNS} FROM expenses \
                     WHERE user_id = $1 ORDER BY date DESC, id DESC"
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Expense>(&format!(
                    "SELECT {EXPENSE_COLUMNS} FROM expenses \
                     WHERE user_id IS NULL ORDER BY date DESC, id DESC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    async fn insert_expense(
        &self,
        owner: Option<i32>,
        fields: &ExpenseFields,
    ) -> Result<Expense, StoreError> {
        let expense = sqlx::query_as::<_, Expense>(&format!(
            "INSERT INTO expenses (user_id, amount, description, category, date) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {EXPENSE_COLUMNS}"
        ))
        .bind(owner)
        .bind(fields.amount)
        .bind(fields.description.as_deref())
        .bind(fields.category.as_deref())
        .bind(fields.date)
        .fetch_one(&self.pool)
        .await?;
        Ok(expense)
    }

    async fn update_owned_expense(
        &self,
        owner: i32,
        id: i32,
        fields: &ExpenseFields,
    ) -> Result<Option<Expense>, StoreError> {
        let expense = sqlx::query_as::<_, Expense>(&format!(
            "UPDATE expenses SET amount = $1, description = $2, category = $3, date = $4 \
             WHERE id = $5 AND user_id = $6 RETURNING {EXPENSE_COLUMNS}"
        ))
        .bind(fields.amount)
        .bind(fields.description.as_deref())
        .bind(fields.category.as_deref())
        .bind(fields.date)
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(expense)
    }

    async fn delete_owned_expense(&self, owner: i32, id: i32) -> Result<u64, StoreError> {
        let done = sqlx::query("DELETE FROM expenses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected())
    }
}
