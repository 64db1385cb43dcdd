use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use spendify_domain::{Category, DateWindow, Expense, ExpensePatch, NewExpense, Session};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    backend::{Backend, ExpenseQuery},
    CoreError,
};

/// Label used when an expense points at a category that no longer resolves.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Per-category slice of a single day's spending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAmount {
    pub name: String,
    pub amount: f64,
    pub count: usize,
}

/// An expense paired with its resolved category name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseLine {
    pub expense: Expense,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBreakdown {
    pub date: NaiveDate,
    pub categories: Vec<CategoryAmount>,
    pub expenses: Vec<ExpenseLine>,
    pub total: f64,
}

impl DailyBreakdown {
    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }
}

pub struct ExpenseService;

impl ExpenseService {
    pub fn validate_amount(amount: f64) -> Result<(), CoreError> {
        if amount.is_finite() && amount > 0.0 {
            Ok(())
        } else {
            Err(CoreError::Validation(
                "Amount must be a positive number".into(),
            ))
        }
    }

    pub fn validate_draft(draft: &NewExpense) -> Result<(), CoreError> {
        Self::validate_amount(draft.amount)
    }

    pub fn create(backend: &dyn Backend, draft: &NewExpense) -> Result<Expense, CoreError> {
        Self::validate_draft(draft)?;
        let expense = backend.insert_expense(draft)?;
        info!(expense_id = %expense.id, amount = expense.amount, "expense saved");
        Ok(expense)
    }

    pub fn update(
        backend: &dyn Backend,
        id: Uuid,
        patch: &ExpensePatch,
    ) -> Result<Expense, CoreError> {
        if !patch.has_effect() {
            return Err(CoreError::InvalidOperation("Nothing to update".into()));
        }
        if let Some(amount) = patch.amount {
            Self::validate_amount(amount)?;
        }
        let expense = backend.update_expense(id, patch)?;
        info!(expense_id = %id, "expense updated");
        Ok(expense)
    }

    pub fn delete(backend: &dyn Backend, id: Uuid) -> Result<(), CoreError> {
        backend.delete_expense(id)?;
        info!(expense_id = %id, "expense deleted");
        Ok(())
    }

    pub fn list(backend: &dyn Backend, user: &Session) -> Result<Vec<Expense>, CoreError> {
        backend.list_expenses(&ExpenseQuery::for_user(user.user_id))
    }

    pub fn for_window(
        backend: &dyn Backend,
        user: &Session,
        window: DateWindow,
    ) -> Result<Vec<Expense>, CoreError> {
        let rows = backend.list_expenses(&ExpenseQuery::for_user(user.user_id).within(window))?;
        debug!(%window, count = rows.len(), "expenses loaded for window");
        Ok(rows)
    }

    /// Finds an expense by full id or by the leading characters of its id.
    pub fn find(
        backend: &dyn Backend,
        user: &Session,
        id_prefix: &str,
    ) -> Result<Expense, CoreError> {
        let needle = id_prefix.trim().to_ascii_lowercase();
        let mut matches: Vec<Expense> = Self::list(backend, user)?
            .into_iter()
            .filter(|expense| !needle.is_empty() && expense.id.to_string().starts_with(&needle))
            .collect();
        match matches.len() {
            1 => Ok(matches.remove(0)),
            0 => Err(CoreError::InvalidOperation(format!(
                "No expense matches `{}`",
                id_prefix.trim()
            ))),
            _ => Err(CoreError::InvalidOperation(format!(
                "`{}` matches more than one expense",
                id_prefix.trim()
            ))),
        }
    }

    /// One day's expenses grouped by category name, with the day total.
    pub fn daily_breakdown(
        backend: &dyn Backend,
        user: &Session,
        date: NaiveDate,
    ) -> Result<DailyBreakdown, CoreError> {
        let expenses = Self::for_window(backend, user, DateWindow::day(date)?)?;
        let categories = backend.list_categories(user.user_id)?;
        Ok(Self::breakdown_of(date, expenses, &categories))
    }

    pub fn breakdown_of(
        date: NaiveDate,
        mut expenses: Vec<Expense>,
        categories: &[Category],
    ) -> DailyBreakdown {
        let names = category_names(categories);
        expenses.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut order: Vec<String> = Vec::new();
        let mut sums: HashMap<String, (f64, usize)> = HashMap::new();
        let mut lines = Vec::with_capacity(expenses.len());
        let mut total = 0.0;
        for expense in expenses {
            let name = resolve_name(&names, expense.category_id);
            let entry = sums.entry(name.clone()).or_insert_with(|| {
                order.push(name.clone());
                (0.0, 0)
            });
            entry.0 += expense.amount;
            entry.1 += 1;
            total += expense.amount;
            lines.push(ExpenseLine {
                expense,
                category: name,
            });
        }

        let mut rows: Vec<CategoryAmount> = order
            .into_iter()
            .filter_map(|name| {
                sums.get(&name).map(|(amount, count)| CategoryAmount {
                    name: name.clone(),
                    amount: *amount,
                    count: *count,
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            b.amount
                .total_cmp(&a.amount)
                .then_with(|| a.name.cmp(&b.name))
        });

        DailyBreakdown {
            date,
            categories: rows,
            expenses: lines,
            total,
        }
    }

    /// Sum of the user's expenses over the calendar month containing `reference`.
    pub fn month_total(
        backend: &dyn Backend,
        user: &Session,
        reference: NaiveDate,
    ) -> Result<f64, CoreError> {
        let expenses = Self::for_window(backend, user, DateWindow::month_of(reference)?)?;
        Ok(expenses.iter().map(|expense| expense.amount).sum())
    }
}

pub(crate) fn category_names(categories: &[Category]) -> HashMap<Uuid, String> {
    categories
        .iter()
        .map(|category| (category.id, category.name.trim().to_string()))
        .collect()
}

pub(crate) fn resolve_name(names: &HashMap<Uuid, String>, id: Uuid) -> String {
    names
        .get(&id)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CategoryService, InMemoryBackend};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> (InMemoryBackend, Session, Category, Category) {
        let backend = InMemoryBackend::new();
        let user = Session {
            user_id: Uuid::new_v4(),
            email: "asha@example.com".into(),
        };
        let food = CategoryService::add(&backend, &user, "Food").unwrap();
        let travel = CategoryService::add(&backend, &user, "Travel").unwrap();
        (backend, user, food, travel)
    }

    #[test]
    fn create_rejects_non_positive_amounts() {
        let (backend, user, food, _) = setup();
        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let draft = NewExpense::new(user.user_id, food.id, amount, date(2024, 6, 3));
            assert!(matches!(
                ExpenseService::create(&backend, &draft),
                Err(CoreError::Validation(_))
            ));
        }
    }

    #[test]
    fn update_requires_a_change() {
        let (backend, user, food, travel) = setup();
        let expense = ExpenseService::create(
            &backend,
            &NewExpense::new(user.user_id, food.id, 40.0, date(2024, 6, 3)),
        )
        .unwrap();
        assert!(ExpenseService::update(&backend, expense.id, &ExpensePatch::default()).is_err());

        let patch = ExpensePatch {
            category_id: Some(travel.id),
            ..ExpensePatch::default()
        };
        let updated = ExpenseService::update(&backend, expense.id, &patch).unwrap();
        assert_eq!(updated.category_id, travel.id);
        assert_eq!(updated.amount, 40.0);
    }

    #[test]
    fn daily_breakdown_groups_by_category() {
        let (backend, user, food, travel) = setup();
        let day = date(2024, 6, 3);
        for (category, amount) in [(&food, 100.0), (&travel, 250.0), (&food, 50.0)] {
            ExpenseService::create(
                &backend,
                &NewExpense::new(user.user_id, category.id, amount, day),
            )
            .unwrap();
        }
        ExpenseService::create(
            &backend,
            &NewExpense::new(user.user_id, food.id, 999.0, date(2024, 6, 4)),
        )
        .unwrap();

        let breakdown = ExpenseService::daily_breakdown(&backend, &user, day).unwrap();
        assert_eq!(breakdown.total, 400.0);
        assert_eq!(breakdown.expenses.len(), 3);
        assert_eq!(breakdown.categories[0].name, "Travel");
        assert_eq!(breakdown.categories[1].name, "Food");
        assert_eq!(breakdown.categories[1].amount, 150.0);
        assert_eq!(breakdown.categories[1].count, 2);
    }

    #[test]
    fn missing_category_shows_as_unknown() {
        let expense = Expense::from_draft(
            &NewExpense::new(Uuid::new_v4(), Uuid::new_v4(), 12.0, date(2024, 6, 3)),
            chrono::Utc::now(),
        );
        let breakdown = ExpenseService::breakdown_of(date(2024, 6, 3), vec![expense], &[]);
        assert_eq!(breakdown.categories[0].name, UNKNOWN_CATEGORY);
        assert_eq!(breakdown.expenses[0].category, UNKNOWN_CATEGORY);
    }

    #[test]
    fn month_total_includes_last_day() {
        let (backend, user, food, _) = setup();
        for (day, amount) in [(date(2024, 6, 1), 10.0), (date(2024, 6, 30), 5.0), (date(2024, 7, 1), 99.0)] {
            ExpenseService::create(&backend, &NewExpense::new(user.user_id, food.id, amount, day))
                .unwrap();
        }
        let total = ExpenseService::month_total(&backend, &user, date(2024, 6, 15)).unwrap();
        assert_eq!(total, 15.0);
    }

    #[test]
    fn find_accepts_id_prefix() {
        let (backend, user, food, _) = setup();
        let expense = ExpenseService::create(
            &backend,
            &NewExpense::new(user.user_id, food.id, 9.0, date(2024, 6, 3)),
        )
        .unwrap();
        let prefix = &expense.id.to_string()[..8];
        assert_eq!(ExpenseService::find(&backend, &user, prefix).unwrap().id, expense.id);
        assert!(ExpenseService::find(&backend, &user, "").is_err());
    }
}
