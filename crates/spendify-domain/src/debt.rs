//! Lendings and borrowings between the user and other people.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{short_id, Displayable, Identifiable};

/// Direction of a debt record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DebtKind {
    /// Money the user lent to someone.
    Lending,
    /// Money the user borrowed from someone.
    Borrowing,
}

impl DebtKind {
    /// Name of the backend table holding this kind of record.
    pub fn table(&self) -> &'static str {
        match self {
            DebtKind::Lending => "lendings",
            DebtKind::Borrowing => "borrowings",
        }
    }

    /// Sign shown next to amounts: lent money comes back, borrowed money goes out.
    pub fn sign(&self) -> char {
        match self {
            DebtKind::Lending => '+',
            DebtKind::Borrowing => '-',
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            DebtKind::Lending => "Money You Lent",
            DebtKind::Borrowing => "Money You Borrowed",
        }
    }
}

impl fmt::Display for DebtKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DebtKind::Lending => "lending",
            DebtKind::Borrowing => "borrowing",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown debt kind `{0}` (expected lending or borrowing)")]
pub struct ParseDebtKindError(pub String);

impl FromStr for DebtKind {
    type Err = ParseDebtKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lend" | "lent" | "lending" | "lendings" => Ok(DebtKind::Lending),
            "borrow" | "borrowed" | "borrowing" | "borrowings" => Ok(DebtKind::Borrowing),
            other => Err(ParseDebtKindError(other.to_string())),
        }
    }
}

/// A stored lending or borrowing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DebtRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: DebtKind,
    pub person_name: String,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DebtRecord {
    pub fn from_draft(draft: &NewDebt) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: draft.user_id,
            kind: draft.kind,
            person_name: draft.person_name.trim().to_string(),
            amount: draft.amount,
            date: draft.date,
            description: draft.description.clone(),
        }
    }
}

impl Identifiable for DebtRecord {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for DebtRecord {
    fn display_label(&self) -> String {
        format!(
            "{}:{} {} {}{:.2}",
            self.kind,
            short_id(self.id),
            self.person_name,
            self.kind.sign(),
            self.amount
        )
    }
}

/// Draft for a new lending or borrowing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewDebt {
    pub user_id: Uuid,
    pub kind: DebtKind,
    pub person_name: String,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewDebt {
    pub fn new(
        user_id: Uuid,
        kind: DebtKind,
        person_name: impl Into<String>,
        amount: f64,
        date: NaiveDate,
    ) -> Self {
        Self {
            user_id,
            kind,
            person_name: person_name.into(),
            amount,
            date,
            description: None,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
        self
    }
}
