use serde::Serialize;
use spendify_domain::{DebtKind, DebtRecord, NewDebt, Session};
use tracing::info;
use uuid::Uuid;

use crate::{backend::Backend, CoreError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DebtTotals {
    pub lent: f64,
    pub borrowed: f64,
    /// Positive when others owe the user more than the user owes.
    pub net: f64,
}

pub struct DebtService;

impl DebtService {
    /// Records of one kind, newest first.
    pub fn list(
        backend: &dyn Backend,
        user: &Session,
        kind: DebtKind,
    ) -> Result<Vec<DebtRecord>, CoreError> {
        backend.list_debts(user.user_id, kind)
    }

    pub fn add(backend: &dyn Backend, draft: &NewDebt) -> Result<DebtRecord, CoreError> {
        if draft.person_name.trim().is_empty() {
            return Err(CoreError::Validation("Person name cannot be empty".into()));
        }
        if !draft.amount.is_finite() || draft.amount <= 0.0 {
            return Err(CoreError::Validation(
                "Amount must be a positive number".into(),
            ));
        }
        let record = backend.insert_debt(draft)?;
        info!(kind = %record.kind, record_id = %record.id, "debt recorded");
        Ok(record)
    }

    pub fn delete(backend: &dyn Backend, kind: DebtKind, id: Uuid) -> Result<(), CoreError> {
        backend.delete_debt(kind, id)?;
        info!(%kind, record_id = %id, "debt deleted");
        Ok(())
    }

    /// Finds a record of `kind` by full id or id prefix.
    pub fn find(
        backend: &dyn Backend,
        user: &Session,
        kind: DebtKind,
        id_prefix: &str,
    ) -> Result<DebtRecord, CoreError> {
        let needle = id_prefix.trim().to_ascii_lowercase();
        let mut matches: Vec<DebtRecord> = Self::list(backend, user, kind)?
            .into_iter()
            .filter(|record| !needle.is_empty() && record.id.to_string().starts_with(&needle))
            .collect();
        if matches.len() == 1 {
            Ok(matches.remove(0))
        } else {
            Err(CoreError::InvalidOperation(format!(
                "`{}` does not identify a single {kind}",
                id_prefix.trim()
            )))
        }
    }

    pub fn totals(backend: &dyn Backend, user: &Session) -> Result<DebtTotals, CoreError> {
        let lent: f64 = Self::list(backend, user, DebtKind::Lending)?
            .iter()
            .map(|record| record.amount)
            .sum();
        let borrowed: f64 = Self::list(backend, user, DebtKind::Borrowing)?
            .iter()
            .map(|record| record.amount)
            .sum();
        Ok(DebtTotals {
            lent,
            borrowed,
            net: lent - borrowed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryBackend;
    use chrono::NaiveDate;

    fn session() -> Session {
        Session {
            user_id: Uuid::new_v4(),
            email: "asha@example.com".into(),
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn add_validates_person_and_amount() {
        let backend = InMemoryBackend::new();
        let user = session();
        let blank = NewDebt::new(user.user_id, DebtKind::Lending, "  ", 10.0, date(1));
        assert!(DebtService::add(&backend, &blank).is_err());
        let negative = NewDebt::new(user.user_id, DebtKind::Lending, "Ravi", -1.0, date(1));
        assert!(DebtService::add(&backend, &negative).is_err());
    }

    #[test]
    fn list_orders_newest_first_and_totals_net() {
        let backend = InMemoryBackend::new();
        let user = session();
        DebtService::add(
            &backend,
            &NewDebt::new(user.user_id, DebtKind::Lending, "Ravi", 500.0, date(1)),
        )
        .unwrap();
        DebtService::add(
            &backend,
            &NewDebt::new(user.user_id, DebtKind::Lending, "Mira", 200.0, date(9)),
        )
        .unwrap();
        DebtService::add(
            &backend,
            &NewDebt::new(user.user_id, DebtKind::Borrowing, "Dev", 150.0, date(4)),
        )
        .unwrap();

        let lent = DebtService::list(&backend, &user, DebtKind::Lending).unwrap();
        assert_eq!(lent[0].person_name, "Mira");
        assert_eq!(lent[1].person_name, "Ravi");

        let totals = DebtService::totals(&backend, &user).unwrap();
        assert_eq!(totals.lent, 700.0);
        assert_eq!(totals.borrowed, 150.0);
        assert_eq!(totals.net, 550.0);
    }
}
