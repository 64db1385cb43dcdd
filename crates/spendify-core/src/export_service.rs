//! CSV exports of expenses and debt records.

use std::{fmt, fs, path::Path, str::FromStr};

use spendify_domain::{DebtKind, DebtRecord, Session};
use tracing::info;

use crate::{
    backend::{Backend, ExpenseQuery},
    expense_service::{category_names, resolve_name},
    CoreError,
};

pub const EXPENSE_HEADER: [&str; 5] = [
    "description",
    "amount",
    "expense_date",
    "expense_method",
    "category",
];
pub const DEBT_HEADER: [&str; 4] = ["person_name", "amount", "date", "description"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Expenses,
    Debts(DebtKind),
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportKind::Expenses => f.write_str("expenses"),
            ExportKind::Debts(DebtKind::Lending) => f.write_str("lendings"),
            ExportKind::Debts(DebtKind::Borrowing) => f.write_str("borrowings"),
        }
    }
}

impl FromStr for ExportKind {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "expense" | "expenses" => Ok(ExportKind::Expenses),
            other => other
                .parse::<DebtKind>()
                .map(ExportKind::Debts)
                .map_err(|_| {
                    CoreError::Validation(format!(
                        "Unknown export `{other}` (expected expenses, lendings or borrowings)"
                    ))
                }),
        }
    }
}

/// Rendered CSV document with its data row count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub kind: ExportKind,
    pub rows: usize,
    pub content: String,
}

pub struct ExportService;

impl ExportService {
    pub fn render(
        backend: &dyn Backend,
        user: &Session,
        kind: ExportKind,
    ) -> Result<CsvExport, CoreError> {
        match kind {
            ExportKind::Expenses => Self::expenses_csv(backend, user),
            ExportKind::Debts(debt_kind) => {
                let records = backend.list_debts(user.user_id, debt_kind)?;
                Ok(Self::debts_csv(debt_kind, &records))
            }
        }
    }

    pub fn expenses_csv(backend: &dyn Backend, user: &Session) -> Result<CsvExport, CoreError> {
        let expenses = backend.list_expenses(&ExpenseQuery::for_user(user.user_id))?;
        let names = category_names(&backend.list_categories(user.user_id)?);
        let mut content = csv_line(EXPENSE_HEADER.iter().copied());
        for expense in &expenses {
            let amount = expense.amount.to_string();
            let date = expense.expense_date.to_string();
            let category = resolve_name(&names, expense.category_id);
            content.push_str(&csv_line([
                expense.description.as_deref().unwrap_or(""),
                amount.as_str(),
                date.as_str(),
                expense.method.as_str(),
                category.as_str(),
            ]));
        }
        Ok(CsvExport {
            kind: ExportKind::Expenses,
            rows: expenses.len(),
            content,
        })
    }

    pub fn debts_csv(kind: DebtKind, records: &[DebtRecord]) -> CsvExport {
        let mut content = csv_line(DEBT_HEADER.iter().copied());
        for record in records {
            let amount = record.amount.to_string();
            let date = record.date.to_string();
            content.push_str(&csv_line([
                record.person_name.as_str(),
                amount.as_str(),
                date.as_str(),
                record.description.as_deref().unwrap_or(""),
            ]));
        }
        CsvExport {
            kind: ExportKind::Debts(kind),
            rows: records.len(),
            content,
        }
    }

    /// Renders `kind` and writes it to `path`, creating parent directories.
    pub fn write(
        backend: &dyn Backend,
        user: &Session,
        kind: ExportKind,
        path: &Path,
    ) -> Result<CsvExport, CoreError> {
        let export = Self::render(backend, user, kind)?;
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &export.content)?;
        info!(%kind, rows = export.rows, path = %path.display(), "export written");
        Ok(export)
    }
}

fn csv_line<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    let mut line = fields
        .into_iter()
        .map(escape_field)
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

/// Quotes a field when it holds a comma, quote or line break; quotes are doubled.
fn escape_field(field: &str) -> String {
    if field.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use spendify_domain::NewDebt;
    use uuid::Uuid;

    #[test]
    fn fields_are_quoted_when_needed() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn debt_csv_has_header_and_rows() {
        let record = DebtRecord::from_draft(
            &NewDebt::new(
                Uuid::new_v4(),
                DebtKind::Lending,
                "Ravi",
                250.5,
                NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            )
            .with_description(Some("rent, May".into())),
        );
        let export = ExportService::debts_csv(DebtKind::Lending, &[record]);
        assert_eq!(export.rows, 1);
        assert_eq!(
            export.content,
            "person_name,amount,date,description\nRavi,250.5,2024-05-01,\"rent, May\"\n"
        );
        assert_eq!(export.kind.to_string(), "lendings");
    }

    #[test]
    fn export_kind_parses_names() {
        assert_eq!("expenses".parse::<ExportKind>().unwrap(), ExportKind::Expenses);
        assert_eq!(
            "borrowings".parse::<ExportKind>().unwrap(),
            ExportKind::Debts(DebtKind::Borrowing)
        );
        assert!("stocks".parse::<ExportKind>().is_err());
    }
}
