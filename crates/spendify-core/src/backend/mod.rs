//! Surface of the hosted backend: auth, the `users` profile table, categories,
//! expenses and the two debt tables.

mod memory;
mod tables;

pub use memory::InMemoryBackend;
pub use tables::{hash_password, BackendTables, UserAccount};

use spendify_domain::{
    AuthUser, Category, DateWindow, DebtKind, DebtRecord, Expense, ExpensePatch, NewDebt,
    NewExpense, UserProfile,
};
use uuid::Uuid;

use crate::CoreError;

/// Row filter for expense reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpenseQuery {
    pub user_id: Uuid,
    pub window: Option<DateWindow>,
    pub category_id: Option<Uuid>,
}

impl ExpenseQuery {
    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id,
            window: None,
            category_id: None,
        }
    }

    pub fn within(mut self, window: DateWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        expense.user_id == self.user_id
            && self
                .window
                .map_or(true, |window| window.contains(expense.expense_date))
            && self
                .category_id
                .map_or(true, |category| expense.category_id == category)
    }
}

/// Hosted service used by every service in this crate.
///
/// Ids and `created_at` stamps are assigned by the implementation.
pub trait Backend: Send + Sync {
    fn sign_up(&self, email: &str, password: &str, full_name: &str)
        -> Result<AuthUser, CoreError>;
    fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, CoreError>;
    fn delete_auth_user(&self, user_id: Uuid) -> Result<(), CoreError>;

    fn insert_profile(&self, profile: &UserProfile) -> Result<(), CoreError>;
    fn fetch_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, CoreError>;
    fn update_budget(&self, user_id: Uuid, amount: f64) -> Result<(), CoreError>;
    fn delete_profile(&self, user_id: Uuid) -> Result<(), CoreError>;

    fn insert_category(&self, user_id: Uuid, name: &str) -> Result<Category, CoreError>;
    fn list_categories(&self, user_id: Uuid) -> Result<Vec<Category>, CoreError>;
    fn delete_category(&self, id: Uuid) -> Result<(), CoreError>;
    fn delete_categories_for_user(&self, user_id: Uuid) -> Result<usize, CoreError>;

    fn insert_expense(&self, draft: &NewExpense) -> Result<Expense, CoreError>;
    fn update_expense(&self, id: Uuid, patch: &ExpensePatch) -> Result<Expense, CoreError>;
    fn delete_expense(&self, id: Uuid) -> Result<(), CoreError>;
    fn delete_expenses_by_category(&self, category_id: Uuid) -> Result<usize, CoreError>;
    fn delete_expenses_for_user(&self, user_id: Uuid) -> Result<usize, CoreError>;
    /// Matching expenses, newest `expense_date` first.
    fn list_expenses(&self, query: &ExpenseQuery) -> Result<Vec<Expense>, CoreError>;

    /// Debt records of one kind, newest date first.
    fn list_debts(&self, user_id: Uuid, kind: DebtKind) -> Result<Vec<DebtRecord>, CoreError>;
    fn insert_debt(&self, draft: &NewDebt) -> Result<DebtRecord, CoreError>;
    fn delete_debt(&self, kind: DebtKind, id: Uuid) -> Result<(), CoreError>;
    fn delete_debts_for_user(&self, user_id: Uuid) -> Result<usize, CoreError>;
}
