use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::store::{Expense, ExpenseFields, Store, StoreError};

pub async fn list(store: &dyn Store, owner: Option<i32>) -> AppResult<Vec<Expense>> {
    Ok(store.list_expenses(owner).await?)
}

pub async fn create(
    store: &dyn Store,
    owner: Option<i32>,
    fields: ExpenseFields,
) -> AppResult<Expense> {
    let expense = store
        .insert_expense(owner, &fields)
        .await
        .map_err(|e| match e {
            // token outlived its account
            StoreError::ForeignKeyViolation => AppError::invalid_token(),
            other => AppError::Store(other),
        })?;
    info!(expense_id = expense.id, owner = ?owner, "expense created");
    Ok(expense)
}

/// `None` when the id does not exist or belongs to someone else.
pub async fn update(
    store: &dyn Store,
    user_id: i32,
    id: i32,
    fields: ExpenseFields,
) -> AppResult<Option<Expense>> {
    let updated = store.update_owned_expense(user_id, id, &fields).await?;
    if updated.is_none() {
        debug!(user_id, expense_id = id, "update matched no owned expense");
    }
    Ok(updated)
}

pub async fn delete(store: &dyn Store, user_id: i32, id: i32) -> AppResult<()> {
    let removed = store.delete_owned_expense(user_id, id).await?;
    debug!(user_id, expense_id = id, removed, "expense delete");
    Ok(())
}
