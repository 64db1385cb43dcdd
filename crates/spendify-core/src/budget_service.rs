use chrono::NaiveDate;
use serde::Serialize;
use spendify_domain::Session;
use tracing::info;

use crate::{backend::Backend, expense_service::ExpenseService, CoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetState {
    Unset,
    UnderBudget,
    OnTrack,
    OverBudget,
}

impl BudgetState {
    pub fn label(&self) -> &'static str {
        match self {
            BudgetState::Unset => "no budget set",
            BudgetState::UnderBudget => "under budget",
            BudgetState::OnTrack => "on budget",
            BudgetState::OverBudget => "over budget",
        }
    }
}

/// Monthly budget compared with what has been spent so far this month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub budget: f64,
    pub spent: f64,
    pub remaining: f64,
    pub percent_used: Option<f64>,
    pub state: BudgetState,
}

impl BudgetStatus {
    pub fn evaluate(budget: f64, spent: f64) -> Self {
        let state = if budget <= 0.0 {
            BudgetState::Unset
        } else if spent < budget {
            BudgetState::UnderBudget
        } else if spent == budget {
            BudgetState::OnTrack
        } else {
            BudgetState::OverBudget
        };
        let percent_used = (budget > 0.0).then(|| spent / budget * 100.0);
        Self {
            budget,
            spent,
            remaining: budget - spent,
            percent_used,
            state,
        }
    }
}

pub struct BudgetService;

impl BudgetService {
    /// Stored budget, or 0 when the profile has none.
    pub fn get(backend: &dyn Backend, user: &Session) -> Result<f64, CoreError> {
        Ok(backend
            .fetch_profile(user.user_id)?
            .map(|profile| profile.budget)
            .unwrap_or(0.0))
    }

    pub fn set(backend: &dyn Backend, user: &Session, amount: f64) -> Result<(), CoreError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(CoreError::Validation(
                "Budget must be a non-negative number".into(),
            ));
        }
        backend.update_budget(user.user_id, amount)?;
        info!(user_id = %user.user_id, amount, "budget updated");
        Ok(())
    }

    pub fn status(
        backend: &dyn Backend,
        user: &Session,
        reference: NaiveDate,
    ) -> Result<BudgetStatus, CoreError> {
        let budget = Self::get(backend, user)?;
        let spent = ExpenseService::month_total(backend, user, reference)?;
        Ok(BudgetStatus::evaluate(budget, spent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_reports_state_and_remaining() {
        let under = BudgetStatus::evaluate(1000.0, 250.0);
        assert_eq!(under.state, BudgetState::UnderBudget);
        assert_eq!(under.remaining, 750.0);
        assert_eq!(under.percent_used, Some(25.0));

        assert_eq!(BudgetStatus::evaluate(100.0, 100.0).state, BudgetState::OnTrack);

        let over = BudgetStatus::evaluate(100.0, 130.0);
        assert_eq!(over.state, BudgetState::OverBudget);
        assert_eq!(over.remaining, -30.0);

        let unset = BudgetStatus::evaluate(0.0, 50.0);
        assert_eq!(unset.state, BudgetState::Unset);
        assert!(unset.percent_used.is_none());
    }
}
