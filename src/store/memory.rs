use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use super::{Expense, ExpenseFields, Store, StoreError, User};

/// In-process store with the same constraints as the SQL schema.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    expenses: Vec<Expense>,
    next_user_id: i32,
    next_expense_id: i32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every expense row regardless of owner.
    pub fn all_expenses(&self) -> Vec<Expense> {
        self.inner.lock().unwrap().expenses.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut t = self.inner.lock().unwrap();
        if t.users.iter().any(|u| u.email == email) {
            return Err(StoreError::UniqueViolation);
        }
        t.next_user_id += 1;
        let user = User {
            id: t.next_user_id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let t = self.inner.lock().unwrap();
        Ok(t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn delete_user(&self, user_id: i32) -> Result<(), StoreError> {
        let mut t = self.inner.lock().unwrap();
        t.expenses.retain(|e| e.user_id != Some(user_id));
        t.users.retain(|u| u.id != user_id);
        Ok(())
    }

    async fn list_expenses(&self, owner: Option<i32>) -> Result<Vec<Expense>, StoreError> {
        let t = self.inner.lock().unwrap();
        let mut rows: Vec<Expense> = t
            .expenses
            .iter()
            .filter(|e| e.user_id == owner)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn insert_expense(
        &self,
        owner: Option<i32>,
        fields: &ExpenseFields,
    ) -> Result<Expense, StoreError> {
        let mut t = self.inner.lock().unwrap();
        if let Some(user_id) = owner {
            if !t.users.iter().any(|u| u.id == user_id) {
                return Err(StoreError::ForeignKeyViolation);
            }
        }
        t.next_expense_id += 1;
        let expense = Expense {
            id: t.next_expense_id,
            user_id: owner,
            amount: fields.amount,
            description: fields.description.clone(),
            category: fields.category.clone(),
            date: fields.date,
            created_at: OffsetDateTime::now_utc(),
        };
        t.expenses.push(expense.clone());
        Ok(expense)
    }

    async fn update_owned_expense(
        &self,
        owner: i32,
        id: i32,
        fields: &ExpenseFields,
    ) -> Result<Option<Expense>, StoreError> {
        let mut t = self.inner.lock().unwrap();
        let Some(row) = t
            .expenses
            .iter_mut()
            .find(|e| e.id == id && e.user_id == Some(owner))
        else {
            return Ok(None);
        };
        row.amount = fields.amount;
        row.description = fields.description.clone();
        row.category = fields.category.clone();
        row.date = fields.date;
        Ok(Some(row.clone()))
    }

    async fn delete_owned_expense(&self, owner: i32, id: i32) -> Result<u64, StoreError> {
        let mut t = self.inner.lock().unwrap();
        let before = t.expenses.len();
        t.expenses.retain(|e| !(e.id == id && e.user_id == Some(owner)));
        Ok((before - t.expenses.len()) as u64)
    }
}
