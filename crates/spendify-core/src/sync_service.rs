//! Offline expense queue: drafts are parked in the secure store while the
//! device has no connectivity and replayed in submission order later.

use serde::Serialize;
use spendify_domain::{Expense, NewExpense};
use tracing::{info, warn};

use crate::{
    backend::Backend,
    category_service::CategoryService,
    connectivity::Connectivity,
    expense_service::ExpenseService,
    keystore::{load_json, save_json, SecureStore, OFFLINE_QUEUE_KEY},
    CoreError,
};

/// Outcome of submitting an expense.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Submission {
    /// Accepted by the backend.
    Saved(Expense),
    /// Parked in the offline queue; `pending` counts every queued draft.
    Queued { pending: usize },
}

/// A queued draft the backend refused during a drain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedDraft {
    pub draft: NewExpense,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    pub synced: Vec<Expense>,
    pub rejected: Vec<RejectedDraft>,
    /// Drafts still queued after the drain.
    pub remaining: usize,
    /// True when the drain was skipped because the device is offline.
    pub offline: bool,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.synced.is_empty() && self.rejected.is_empty()
    }
}

pub struct SyncService;

impl SyncService {
    pub fn submit(
        backend: &dyn Backend,
        store: &dyn SecureStore,
        net: &dyn Connectivity,
        draft: &NewExpense,
    ) -> Result<Submission, CoreError> {
        ExpenseService::validate_draft(draft)?;
        if net.is_online() {
            match ExpenseService::create(backend, draft) {
                Ok(expense) => return Ok(Submission::Saved(expense)),
                Err(err) if err.is_unavailable() => {
                    warn!(error = %err, "backend unreachable, queueing expense");
                }
                Err(err) => return Err(err),
            }
        } else if let Some(cached) = CategoryService::cached(store)? {
            if !cached.iter().any(|category| category.id == draft.category_id) {
                return Err(CoreError::CategoryNotFound(draft.category_id.to_string()));
            }
        }
        let pending = Self::enqueue(store, draft)?;
        warn!(pending, "expense saved offline");
        Ok(Submission::Queued { pending })
    }

    /// Queued drafts, oldest first.
    pub fn pending(store: &dyn SecureStore) -> Result<Vec<NewExpense>, CoreError> {
        Ok(load_json(store, OFFLINE_QUEUE_KEY)?.unwrap_or_default())
    }

    /// Replays the queue in FIFO order.
    ///
    /// An unreachable backend stops the drain and keeps the rest of the queue.
    /// Any other failure drops only the offending draft.
    pub fn drain(
        backend: &dyn Backend,
        store: &dyn SecureStore,
        net: &dyn Connectivity,
    ) -> Result<SyncReport, CoreError> {
        let queue = Self::pending(store)?;
        if !net.is_online() {
            return Ok(SyncReport {
                remaining: queue.len(),
                offline: true,
                ..SyncReport::default()
            });
        }

        let mut report = SyncReport::default();
        let mut remaining: Vec<NewExpense> = Vec::new();
        let mut drafts = queue.into_iter();
        while let Some(draft) = drafts.next() {
            match ExpenseService::create(backend, &draft) {
                Ok(expense) => report.synced.push(expense),
                Err(err) if err.is_unavailable() => {
                    warn!(error = %err, "backend unreachable, sync paused");
                    remaining.push(draft);
                    remaining.extend(drafts.by_ref());
                    break;
                }
                Err(err) => {
                    warn!(error = %err, "queued expense rejected");
                    report.rejected.push(RejectedDraft {
                        draft,
                        reason: err.to_string(),
                    });
                }
            }
        }

        report.remaining = remaining.len();
        Self::store_queue(store, &remaining)?;
        if !report.is_noop() {
            info!(
                synced = report.synced.len(),
                rejected = report.rejected.len(),
                remaining = report.remaining,
                "local data synced"
            );
        }
        Ok(report)
    }

    /// Drops every queued draft and returns how many were discarded.
    pub fn clear(store: &dyn SecureStore) -> Result<usize, CoreError> {
        let count = Self::pending(store)?.len();
        store.delete(OFFLINE_QUEUE_KEY)?;
        Ok(count)
    }

    fn enqueue(store: &dyn SecureStore, draft: &NewExpense) -> Result<usize, CoreError> {
        let mut queue = Self::pending(store)?;
        queue.push(draft.clone());
        Self::store_queue(store, &queue)?;
        Ok(queue.len())
    }

    fn store_queue(store: &dyn SecureStore, queue: &[NewExpense]) -> Result<(), CoreError> {
        if queue.is_empty() {
            store.delete(OFFLINE_QUEUE_KEY)
        } else {
            save_json(store, OFFLINE_QUEUE_KEY, queue)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InMemoryBackend, MemorySecureStore, NetworkStatus};
    use chrono::NaiveDate;
    use spendify_domain::{Category, Session};
    use uuid::Uuid;

    struct Harness {
        backend: InMemoryBackend,
        store: MemorySecureStore,
        net: NetworkStatus,
        user: Session,
        food: Category,
    }

    impl Harness {
        fn new() -> Self {
            let backend = InMemoryBackend::new();
            let user = Session {
                user_id: Uuid::new_v4(),
                email: "asha@example.com".into(),
            };
            let food = CategoryService::add(&backend, &user, "Food").unwrap();
            Self {
                backend,
                store: MemorySecureStore::new(),
                net: NetworkStatus::online(),
                user,
                food,
            }
        }

        fn draft(&self, amount: f64) -> NewExpense {
            NewExpense::new(
                self.user.user_id,
                self.food.id,
                amount,
                NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            )
        }

        fn submit(&self, amount: f64) -> Submission {
            SyncService::submit(&self.backend, &self.store, &self.net, &self.draft(amount)).unwrap()
        }

        fn drain(&self) -> SyncReport {
            SyncService::drain(&self.backend, &self.store, &self.net).unwrap()
        }
    }

    #[test]
    fn online_submit_saves_directly() {
        let h = Harness::new();
        assert!(matches!(h.submit(10.0), Submission::Saved(_)));
        assert!(SyncService::pending(&h.store).unwrap().is_empty());
    }

    #[test]
    fn offline_submit_queues_in_order() {
        let h = Harness::new();
        h.net.set_online(false);
        assert_eq!(h.submit(1.0), Submission::Queued { pending: 1 });
        assert_eq!(h.submit(2.0), Submission::Queued { pending: 2 });
        let amounts: Vec<f64> = SyncService::pending(&h.store)
            .unwrap()
            .iter()
            .map(|draft| draft.amount)
            .collect();
        assert_eq!(amounts, vec![1.0, 2.0]);
    }

    #[test]
    fn invalid_draft_is_never_queued() {
        let h = Harness::new();
        h.net.set_online(false);
        let err = SyncService::submit(&h.backend, &h.store, &h.net, &h.draft(0.0)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(SyncService::pending(&h.store).unwrap().is_empty());
    }

    #[test]
    fn offline_submit_checks_cached_categories() {
        let h = Harness::new();
        CategoryService::refresh_cache(&h.backend, &h.store, &h.user).unwrap();
        h.net.set_online(false);
        let mut draft = h.draft(5.0);
        draft.category_id = Uuid::new_v4();
        let err = SyncService::submit(&h.backend, &h.store, &h.net, &draft).unwrap_err();
        assert!(matches!(err, CoreError::CategoryNotFound(_)));
    }

    #[test]
    fn unreachable_backend_falls_back_to_queue() {
        let h = Harness::new();
        h.backend.set_reachable(false);
        assert_eq!(h.submit(7.0), Submission::Queued { pending: 1 });
    }

    #[test]
    fn drain_skips_while_offline() {
        let h = Harness::new();
        h.net.set_online(false);
        h.submit(3.0);
        let report = h.drain();
        assert!(report.offline);
        assert_eq!(report.remaining, 1);
    }

    #[test]
    fn drain_replays_and_clears_queue() {
        let h = Harness::new();
        h.net.set_online(false);
        h.submit(1.0);
        h.submit(2.0);
        h.net.set_online(true);

        let report = h.drain();
        assert_eq!(report.synced.len(), 2);
        assert_eq!(report.synced[0].amount, 1.0);
        assert_eq!(report.remaining, 0);
        assert!(h.store.get(OFFLINE_QUEUE_KEY).unwrap().is_none());
    }

    #[test]
    fn drain_rejects_orphaned_drafts_and_continues() {
        let h = Harness::new();
        h.net.set_online(false);
        h.submit(1.0);
        let mut orphan = h.draft(2.0);
        orphan.category_id = Uuid::new_v4();
        SyncService::submit(&h.backend, &h.store, &h.net, &orphan).unwrap();
        h.submit(3.0);
        h.net.set_online(true);

        let report = h.drain();
        assert_eq!(report.synced.len(), 2);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].draft.amount, 2.0);
        assert_eq!(report.remaining, 0);
    }

    #[test]
    fn drain_stops_when_backend_unreachable() {
        let h = Harness::new();
        h.net.set_online(false);
        h.submit(1.0);
        h.submit(2.0);
        h.net.set_online(true);
        h.backend.set_reachable(false);

        let report = h.drain();
        assert!(report.synced.is_empty());
        assert_eq!(report.remaining, 2);
        assert_eq!(SyncService::pending(&h.store).unwrap().len(), 2);
    }

    #[test]
    fn clear_discards_queue() {
        let h = Harness::new();
        h.net.set_online(false);
        h.submit(1.0);
        assert_eq!(SyncService::clear(&h.store).unwrap(), 1);
        assert!(SyncService::pending(&h.store).unwrap().is_empty());
    }
}
