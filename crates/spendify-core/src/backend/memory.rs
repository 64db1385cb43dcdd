use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use spendify_domain::{
    AuthUser, Category, DebtKind, DebtRecord, Expense, ExpensePatch, NewDebt, NewExpense,
    UserProfile,
};
use uuid::Uuid;

use super::{Backend, BackendTables, ExpenseQuery};
use crate::{time::SystemClock, Clock, CoreError};

/// Process-local backend. Can be switched to "unreachable" to exercise offline paths.
pub struct InMemoryBackend {
    tables: Mutex<BackendTables>,
    clock: Arc<dyn Clock>,
    reachable: AtomicBool,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::default()))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: Mutex::new(BackendTables::default()),
            clock,
            reachable: AtomicBool::new(true),
        }
    }

    /// Simulates the hosted service going away (or coming back).
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Result<BackendTables, CoreError> {
        self.read(|tables| Ok(tables.clone()))
    }

    fn read<T>(&self, f: impl FnOnce(&BackendTables) -> Result<T, CoreError>) -> Result<T, CoreError> {
        self.ensure_reachable()?;
        let tables = self
            .tables
            .lock()
            .map_err(|_| CoreError::Storage("backend lock poisoned".into()))?;
        f(&tables)
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut BackendTables) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        self.ensure_reachable()?;
        let mut tables = self
            .tables
            .lock()
            .map_err(|_| CoreError::Storage("backend lock poisoned".into()))?;
        f(&mut tables)
    }

    fn ensure_reachable(&self) -> Result<(), CoreError> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CoreError::Unavailable("backend unreachable".into()))
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for InMemoryBackend {
    fn sign_up(&self, email: &str, password: &str, full_name: &str) -> Result<AuthUser, CoreError> {
        let now = self.clock.now();
        self.write(|tables| tables.sign_up(email, password, full_name, now))
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, CoreError> {
        self.read(|tables| tables.sign_in(email, password))
    }

    fn delete_auth_user(&self, user_id: Uuid) -> Result<(), CoreError> {
        self.write(|tables| tables.delete_auth_user(user_id))
    }

    fn insert_profile(&self, profile: &UserProfile) -> Result<(), CoreError> {
        self.write(|tables| tables.insert_profile(profile))
    }

    fn fetch_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, CoreError> {
        self.read(|tables| Ok(tables.fetch_profile(user_id)))
    }

    fn update_budget(&self, user_id: Uuid, amount: f64) -> Result<(), CoreError> {
        self.write(|tables| tables.update_budget(user_id, amount))
    }

    fn delete_profile(&self, user_id: Uuid) -> Result<(), CoreError> {
        self.write(|tables| tables.delete_profile(user_id))
    }

    fn insert_category(&self, user_id: Uuid, name: &str) -> Result<Category, CoreError> {
        let now = self.clock.now();
        self.write(|tables| tables.insert_category(user_id, name, now))
    }

    fn list_categories(&self, user_id: Uuid) -> Result<Vec<Category>, CoreError> {
        self.read(|tables| Ok(tables.list_categories(user_id)))
    }

    fn delete_category(&self, id: Uuid) -> Result<(), CoreError> {
        self.write(|tables| tables.delete_category(id))
    }

    fn delete_categories_for_user(&self, user_id: Uuid) -> Result<usize, CoreError> {
        self.write(|tables| Ok(tables.delete_categories_for_user(user_id)))
    }

    fn insert_expense(&self, draft: &NewExpense) -> Result<Expense, CoreError> {
        let now = self.clock.now();
        self.write(|tables| tables.insert_expense(draft, now))
    }

    fn update_expense(&self, id: Uuid, patch: &ExpensePatch) -> Result<Expense, CoreError> {
        self.write(|tables| tables.update_expense(id, patch))
    }

    fn delete_expense(&self, id: Uuid) -> Result<(), CoreError> {
        self.write(|tables| tables.delete_expense(id))
    }

    fn delete_expenses_by_category(&self, category_id: Uuid) -> Result<usize, CoreError> {
        self.write(|tables| Ok(tables.delete_expenses_by_category(category_id)))
    }

    fn delete_expenses_for_user(&self, user_id: Uuid) -> Result<usize, CoreError> {
        self.write(|tables| Ok(tables.delete_expenses_for_user(user_id)))
    }

    fn list_expenses(&self, query: &ExpenseQuery) -> Result<Vec<Expense>, CoreError> {
        self.read(|tables| Ok(tables.list_expenses(query)))
    }

    fn list_debts(&self, user_id: Uuid, kind: DebtKind) -> Result<Vec<DebtRecord>, CoreError> {
        self.read(|tables| Ok(tables.list_debts(user_id, kind)))
    }

    fn insert_debt(&self, draft: &NewDebt) -> Result<DebtRecord, CoreError> {
        self.write(|tables| tables.insert_debt(draft))
    }

    fn delete_debt(&self, kind: DebtKind, id: Uuid) -> Result<(), CoreError> {
        self.write(|tables| tables.delete_debt(kind, id))
    }

    fn delete_debts_for_user(&self, user_id: Uuid) -> Result<usize, CoreError> {
        self.write(|tables| Ok(tables.delete_debts_for_user(user_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_backend_reports_unavailable() {
        let backend = InMemoryBackend::new();
        backend.set_reachable(false);
        let err = backend.list_categories(Uuid::new_v4()).unwrap_err();
        assert!(err.is_unavailable());
        backend.set_reachable(true);
        assert!(backend.list_categories(Uuid::new_v4()).unwrap().is_empty());
    }
}
