//! Expense records, drafts and partial updates.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{short_id, Displayable, Identifiable};

/// A single spending record as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub amount: f64,
    #[serde(default)]
    pub method: PaymentMethod,
    pub expense_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Expense {
    /// Materializes a stored row from a draft. Used by backends when inserting.
    pub fn from_draft(draft: &NewExpense, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: draft.user_id,
            category_id: draft.category_id,
            amount: draft.amount,
            method: draft.method,
            expense_date: draft.expense_date,
            created_at,
            description: draft.description.clone(),
        }
    }

    /// Applies the fields present in `patch`, leaving the others untouched.
    pub fn apply(&mut self, patch: &ExpensePatch) {
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        if let Some(method) = patch.method {
            self.method = method;
        }
        if let Some(date) = patch.expense_date {
            self.expense_date = date;
        }
        if let Some(description) = patch.description.as_ref() {
            self.description = description.clone();
        }
    }
}

impl Identifiable for Expense {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Expense {
    fn display_label(&self) -> String {
        format!(
            "expense:{} {:.2} on {} [{}]",
            short_id(self.id),
            self.amount,
            self.expense_date,
            self.method
        )
    }
}

/// Payload submitted to the backend when logging an expense.
///
/// The same shape is parked in the offline queue while the device has no
/// connectivity, so it must stay serializable on its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewExpense {
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub amount: f64,
    #[serde(default)]
    pub method: PaymentMethod,
    pub expense_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewExpense {
    pub fn new(user_id: Uuid, category_id: Uuid, amount: f64, expense_date: NaiveDate) -> Self {
        Self {
            user_id,
            category_id,
            amount,
            method: PaymentMethod::default(),
            expense_date,
            description: None,
        }
    }

    pub fn with_method(mut self, method: PaymentMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let text = description.into();
        self.description = if text.trim().is_empty() {
            None
        } else {
            Some(text.trim().to_string())
        };
        self
    }
}

/// Partial update for an existing expense. `None` means "leave as is".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExpensePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expense_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
}

impl ExpensePatch {
    pub fn has_effect(&self) -> bool {
        self.amount.is_some()
            || self.category_id.is_some()
            || self.method.is_some()
            || self.expense_date.is_some()
            || self.description.is_some()
    }
}

/// How an expense was paid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Upi,
    Cash,
    Card,
    BankTransfer,
    Other,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::Upi,
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::BankTransfer,
        PaymentMethod::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Upi => "upi",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Other => "other",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown payment method `{0}` (expected upi, cash, card, bank or other)")]
pub struct ParsePaymentMethodError(pub String);

impl FromStr for PaymentMethod {
    type Err = ParsePaymentMethodError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "upi" => Ok(PaymentMethod::Upi),
            "cash" => Ok(PaymentMethod::Cash),
            "card" | "credit" | "debit" => Ok(PaymentMethod::Card),
            "bank" | "bank_transfer" | "netbanking" => Ok(PaymentMethod::BankTransfer),
            "other" => Ok(PaymentMethod::Other),
            other => Err(ParsePaymentMethodError(other.to_string())),
        }
    }
}
