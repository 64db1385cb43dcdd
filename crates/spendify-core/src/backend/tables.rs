use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use spendify_domain::{
    AuthUser, Category, DebtKind, DebtRecord, Expense, ExpensePatch, NewDebt, NewExpense,
    UserProfile,
};
use uuid::Uuid;

use super::ExpenseQuery;
use crate::CoreError;

/// Credential row of the auth surface. Passwords are kept as salted digests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserAccount {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub salt: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    fn verify(&self, password: &str) -> bool {
        hash_password(&self.salt, password) == self.password_hash
    }
}

pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn same_email(left: &str, right: &str) -> bool {
    left.trim().eq_ignore_ascii_case(right.trim())
}

/// Every table the backend serves, in a single serializable snapshot.
///
/// Row rules (foreign keys, ordering, id assignment) live here so that all
/// backend implementations behave the same.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BackendTables {
    #[serde(default)]
    pub accounts: Vec<UserAccount>,
    #[serde(default)]
    pub users: Vec<UserProfile>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub lendings: Vec<DebtRecord>,
    #[serde(default)]
    pub borrowings: Vec<DebtRecord>,
}

impl BackendTables {
    pub fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        full_name: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthUser, CoreError> {
        if self
            .accounts
            .iter()
            .any(|account| same_email(&account.email, email))
        {
            return Err(CoreError::AuthFailed(format!(
                "User already registered: {}",
                email.trim()
            )));
        }
        let salt = Uuid::new_v4().simple().to_string();
        let account = UserAccount {
            user_id: Uuid::new_v4(),
            email: email.trim().to_string(),
            full_name: full_name.trim().to_string(),
            password_hash: hash_password(&salt, password),
            salt,
            created_at: now,
        };
        let user = AuthUser {
            id: account.user_id,
            email: account.email.clone(),
        };
        self.accounts.push(account);
        Ok(user)
    }

    pub fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, CoreError> {
        self.accounts
            .iter()
            .find(|account| same_email(&account.email, email) && account.verify(password))
            .map(|account| AuthUser {
                id: account.user_id,
                email: account.email.clone(),
            })
            .ok_or_else(|| CoreError::AuthFailed("Invalid login credentials".into()))
    }

    pub fn delete_auth_user(&mut self, user_id: Uuid) -> Result<(), CoreError> {
        let before = self.accounts.len();
        self.accounts.retain(|account| account.user_id != user_id);
        if self.accounts.len() == before {
            return Err(CoreError::UserNotFound(user_id));
        }
        Ok(())
    }

    pub fn insert_profile(&mut self, profile: &UserProfile) -> Result<(), CoreError> {
        if !self
            .accounts
            .iter()
            .any(|account| account.user_id == profile.user_id)
        {
            return Err(CoreError::UserNotFound(profile.user_id));
        }
        if self.users.iter().any(|user| user.user_id == profile.user_id) {
            return Err(CoreError::InvalidOperation(format!(
                "profile for {} already exists",
                profile.user_id
            )));
        }
        self.users.push(profile.clone());
        Ok(())
    }

    pub fn fetch_profile(&self, user_id: Uuid) -> Option<UserProfile> {
        self.users.iter().find(|user| user.user_id == user_id).cloned()
    }

    pub fn update_budget(&mut self, user_id: Uuid, amount: f64) -> Result<(), CoreError> {
        let profile = self
            .users
            .iter_mut()
            .find(|user| user.user_id == user_id)
            .ok_or(CoreError::UserNotFound(user_id))?;
        profile.budget = amount;
        Ok(())
    }

    pub fn delete_profile(&mut self, user_id: Uuid) -> Result<(), CoreError> {
        let before = self.users.len();
        self.users.retain(|user| user.user_id != user_id);
        if self.users.len() == before {
            return Err(CoreError::UserNotFound(user_id));
        }
        Ok(())
    }

    pub fn insert_category(
        &mut self,
        user_id: Uuid,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<Category, CoreError> {
        let category = Category::new(user_id, name, now);
        self.categories.push(category.clone());
        Ok(category)
    }

    pub fn list_categories(&self, user_id: Uuid) -> Vec<Category> {
        self.categories
            .iter()
            .filter(|category| category.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn delete_category(&mut self, id: Uuid) -> Result<(), CoreError> {
        let before = self.categories.len();
        self.categories.retain(|category| category.id != id);
        if self.categories.len() == before {
            return Err(CoreError::CategoryNotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn delete_categories_for_user(&mut self, user_id: Uuid) -> usize {
        let before = self.categories.len();
        self.categories.retain(|category| category.user_id != user_id);
        before - self.categories.len()
    }

    fn ensure_category(&self, user_id: Uuid, category_id: Uuid) -> Result<(), CoreError> {
        let owned = self
            .categories
            .iter()
            .any(|category| category.id == category_id && category.user_id == user_id);
        if owned {
            Ok(())
        } else {
            Err(CoreError::CategoryNotFound(category_id.to_string()))
        }
    }

    pub fn insert_expense(
        &mut self,
        draft: &NewExpense,
        now: DateTime<Utc>,
    ) -> Result<Expense, CoreError> {
        self.ensure_category(draft.user_id, draft.category_id)?;
        let expense = Expense::from_draft(draft, now);
        self.expenses.push(expense.clone());
        Ok(expense)
    }

    pub fn update_expense(&mut self, id: Uuid, patch: &ExpensePatch) -> Result<Expense, CoreError> {
        let owner = self
            .expenses
            .iter()
            .find(|expense| expense.id == id)
            .map(|expense| expense.user_id)
            .ok_or(CoreError::ExpenseNotFound(id))?;
        if let Some(category_id) = patch.category_id {
            self.ensure_category(owner, category_id)?;
        }
        let expense = self
            .expenses
            .iter_mut()
            .find(|expense| expense.id == id)
            .ok_or(CoreError::ExpenseNotFound(id))?;
        expense.apply(patch);
        Ok(expense.clone())
    }

    pub fn delete_expense(&mut self, id: Uuid) -> Result<(), CoreError> {
        let before = self.expenses.len();
        self.expenses.retain(|expense| expense.id != id);
        if self.expenses.len() == before {
            return Err(CoreError::ExpenseNotFound(id));
        }
        Ok(())
    }

    pub fn delete_expenses_by_category(&mut self, category_id: Uuid) -> usize {
        let before = self.expenses.len();
        self.expenses
            .retain(|expense| expense.category_id != category_id);
        before - self.expenses.len()
    }

    pub fn delete_expenses_for_user(&mut self, user_id: Uuid) -> usize {
        let before = self.expenses.len();
        self.expenses.retain(|expense| expense.user_id != user_id);
        before - self.expenses.len()
    }

    pub fn list_expenses(&self, query: &ExpenseQuery) -> Vec<Expense> {
        let mut rows: Vec<Expense> = self
            .expenses
            .iter()
            .filter(|expense| query.matches(expense))
            .cloned()
            .collect();
        rows.sort_by_key(|expense| Reverse((expense.expense_date, expense.created_at)));
        rows
    }

    fn debt_table(&self, kind: DebtKind) -> &Vec<DebtRecord> {
        match kind {
            DebtKind::Lending => &self.lendings,
            DebtKind::Borrowing => &self.borrowings,
        }
    }

    fn debt_table_mut(&mut self, kind: DebtKind) -> &mut Vec<DebtRecord> {
        match kind {
            DebtKind::Lending => &mut self.lendings,
            DebtKind::Borrowing => &mut self.borrowings,
        }
    }

    pub fn list_debts(&self, user_id: Uuid, kind: DebtKind) -> Vec<DebtRecord> {
        let mut rows: Vec<DebtRecord> = self
            .debt_table(kind)
            .iter()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|record| Reverse(record.date));
        rows
    }

    pub fn insert_debt(&mut self, draft: &NewDebt) -> Result<DebtRecord, CoreError> {
        let record = DebtRecord::from_draft(draft);
        self.debt_table_mut(draft.kind).push(record.clone());
        Ok(record)
    }

    pub fn delete_debt(&mut self, kind: DebtKind, id: Uuid) -> Result<(), CoreError> {
        let table = self.debt_table_mut(kind);
        let before = table.len();
        table.retain(|record| record.id != id);
        if table.len() == before {
            return Err(CoreError::DebtNotFound(id));
        }
        Ok(())
    }

    pub fn delete_debts_for_user(&mut self, user_id: Uuid) -> usize {
        let before = self.lendings.len() + self.borrowings.len();
        self.lendings.retain(|record| record.user_id != user_id);
        self.borrowings.retain(|record| record.user_id != user_id);
        before - self.lendings.len() - self.borrowings.len()
    }
}
