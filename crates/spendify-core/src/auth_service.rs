//! Sign-up, sign-in and account lifecycle on top of the backend auth surface.

use spendify_domain::{AuthUser, Session, UserProfile};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    backend::Backend,
    keystore::{SecureStore, CATEGORIES_KEY, OFFLINE_QUEUE_KEY, USER_EMAIL_KEY, USER_ID_KEY},
    Clock, CoreError,
};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const PROFILE_SAVE_FAILED: &str =
    "Account created, but failed to save user info. Please contact support.";

/// Row counts removed while deleting an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountDeletion {
    pub expenses: usize,
    pub categories: usize,
    pub debts: usize,
}

pub struct AuthService;

impl AuthService {
    /// Registers credentials and creates the matching `users` row with a zero budget.
    pub fn sign_up(
        backend: &dyn Backend,
        clock: &dyn Clock,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<AuthUser, CoreError> {
        Self::validate_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(CoreError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(CoreError::Validation("Name cannot be empty".into()));
        }

        let user = backend.sign_up(email, password, full_name)?;
        let profile = UserProfile::new(user.id, full_name, user.email.clone(), clock.now());
        if let Err(err) = backend.insert_profile(&profile) {
            warn!(user_id = %user.id, error = %err, "profile insert failed after sign-up");
            return Err(CoreError::Validation(PROFILE_SAVE_FAILED.into()));
        }
        info!(user_id = %user.id, "account created");
        Ok(user)
    }

    /// Authenticates and remembers the session on the device.
    pub fn sign_in(
        backend: &dyn Backend,
        store: &dyn SecureStore,
        email: &str,
        password: &str,
    ) -> Result<Session, CoreError> {
        Self::validate_email(email)?;
        let user = backend.sign_in(email, password)?;
        store.save(USER_EMAIL_KEY, &user.email)?;
        store.save(USER_ID_KEY, &user.id.to_string())?;
        info!(user_id = %user.id, "signed in");
        Ok(Session {
            user_id: user.id,
            email: user.email,
        })
    }

    /// Session remembered by the device. Both keys must be present.
    pub fn current_session(store: &dyn SecureStore) -> Result<Option<Session>, CoreError> {
        let user_id = store.get(USER_ID_KEY)?;
        let email = store.get(USER_EMAIL_KEY)?;
        match (user_id, email) {
            (Some(raw_id), Some(email)) => {
                let user_id = Uuid::parse_str(raw_id.trim()).map_err(|err| {
                    CoreError::Storage(format!("stored user id is invalid: {err}"))
                })?;
                Ok(Some(Session { user_id, email }))
            }
            _ => Ok(None),
        }
    }

    pub fn require_session(store: &dyn SecureStore) -> Result<Session, CoreError> {
        Self::current_session(store)?.ok_or(CoreError::NotAuthenticated)
    }

    /// Forgets the session and the per-user category cache.
    pub fn sign_out(store: &dyn SecureStore) -> Result<(), CoreError> {
        store.delete(USER_EMAIL_KEY)?;
        store.delete(USER_ID_KEY)?;
        store.delete(CATEGORIES_KEY)?;
        info!("signed out");
        Ok(())
    }

    /// Removes every row owned by the user, then the credentials, then signs out.
    pub fn delete_account(
        backend: &dyn Backend,
        store: &dyn SecureStore,
        session: &Session,
    ) -> Result<AccountDeletion, CoreError> {
        let user_id = session.user_id;
        let expenses = backend.delete_expenses_for_user(user_id)?;
        let categories = backend.delete_categories_for_user(user_id)?;
        let debts = backend.delete_debts_for_user(user_id)?;
        match backend.delete_profile(user_id) {
            Ok(()) | Err(CoreError::UserNotFound(_)) => {}
            Err(err) => return Err(err),
        }
        backend.delete_auth_user(user_id)?;
        store.delete(OFFLINE_QUEUE_KEY)?;
        Self::sign_out(store)?;
        info!(%user_id, expenses, categories, debts, "account deleted");
        Ok(AccountDeletion {
            expenses,
            categories,
            debts,
        })
    }

    pub fn profile(backend: &dyn Backend, session: &Session) -> Result<UserProfile, CoreError> {
        backend
            .fetch_profile(session.user_id)?
            .ok_or(CoreError::UserNotFound(session.user_id))
    }

    fn validate_email(email: &str) -> Result<(), CoreError> {
        let email = email.trim();
        let valid = email
            .split_once('@')
            .map_or(false, |(local, domain)| !local.is_empty() && !domain.is_empty());
        if valid {
            Ok(())
        } else {
            Err(CoreError::Validation(format!("Invalid email address: {email}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{backend::ExpenseQuery, FixedClock, InMemoryBackend, MemorySecureStore};
    use chrono::{TimeZone, Utc};
    use spendify_domain::{
        Category, DebtKind, DebtRecord, Expense, ExpensePatch, NewDebt, NewExpense,
    };

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap())
    }

    #[test]
    fn sign_up_creates_profile_with_zero_budget() {
        let backend = InMemoryBackend::new();
        let user = AuthService::sign_up(&backend, &clock(), "asha@example.com", "secret1", " Asha ")
            .unwrap();
        let profile = backend.fetch_profile(user.id).unwrap().unwrap();
        assert_eq!(profile.name, "Asha");
        assert_eq!(profile.budget, 0.0);
        assert_eq!(profile.member_since(), "June 3, 2024");
    }

    #[test]
    fn sign_up_validates_input() {
        let backend = InMemoryBackend::new();
        let clock = clock();
        assert!(AuthService::sign_up(&backend, &clock, "nope", "secret1", "A").is_err());
        assert!(AuthService::sign_up(&backend, &clock, "a@b.c", "short", "A").is_err());
        assert!(AuthService::sign_up(&backend, &clock, "a@b.c", "secret1", "  ").is_err());
    }

    /// Accepts credentials but refuses every `users` row insert.
    struct ProfileRejectingBackend(InMemoryBackend);

    impl Backend for ProfileRejectingBackend {
        fn sign_up(
            &self,
            email: &str,
            password: &str,
            full_name: &str,
        ) -> Result<AuthUser, CoreError> {
            self.0.sign_up(email, password, full_name)
        }
        fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, CoreError> {
            self.0.sign_in(email, password)
        }
        fn delete_auth_user(&self, user_id: Uuid) -> Result<(), CoreError> {
            self.0.delete_auth_user(user_id)
        }
        fn insert_profile(&self, _profile: &UserProfile) -> Result<(), CoreError> {
            Err(CoreError::Unavailable("users table is read-only".into()))
        }
        fn fetch_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, CoreError> {
            self.0.fetch_profile(user_id)
        }
        fn update_budget(&self, user_id: Uuid, amount: f64) -> Result<(), CoreError> {
            self.0.update_budget(user_id, amount)
        }
        fn delete_profile(&self, user_id: Uuid) -> Result<(), CoreError> {
            self.0.delete_profile(user_id)
        }
        fn insert_category(&self, user_id: Uuid, name: &str) -> Result<Category, CoreError> {
            self.0.insert_category(user_id, name)
        }
        fn list_categories(&self, user_id: Uuid) -> Result<Vec<Category>, CoreError> {
            self.0.list_categories(user_id)
        }
        fn delete_category(&self, id: Uuid) -> Result<(), CoreError> {
            self.0.delete_category(id)
        }
        fn delete_categories_for_user(&self, user_id: Uuid) -> Result<usize, CoreError> {
            self.0.delete_categories_for_user(user_id)
        }
        fn insert_expense(&self, draft: &NewExpense) -> Result<Expense, CoreError> {
            self.0.insert_expense(draft)
        }
        fn update_expense(&self, id: Uuid, patch: &ExpensePatch) -> Result<Expense, CoreError> {
            self.0.update_expense(id, patch)
        }
        fn delete_expense(&self, id: Uuid) -> Result<(), CoreError> {
            self.0.delete_expense(id)
        }
        fn delete_expenses_by_category(&self, category_id: Uuid) -> Result<usize, CoreError> {
            self.0.delete_expenses_by_category(category_id)
        }
        fn delete_expenses_for_user(&self, user_id: Uuid) -> Result<usize, CoreError> {
            self.0.delete_expenses_for_user(user_id)
        }
        fn list_expenses(&self, query: &ExpenseQuery) -> Result<Vec<Expense>, CoreError> {
            self.0.list_expenses(query)
        }
        fn list_debts(
            &self,
            user_id: Uuid,
            kind: DebtKind,
        ) -> Result<Vec<DebtRecord>, CoreError> {
            self.0.list_debts(user_id, kind)
        }
        fn insert_debt(&self, draft: &NewDebt) -> Result<DebtRecord, CoreError> {
            self.0.insert_debt(draft)
        }
        fn delete_debt(&self, kind: DebtKind, id: Uuid) -> Result<(), CoreError> {
            self.0.delete_debt(kind, id)
        }
        fn delete_debts_for_user(&self, user_id: Uuid) -> Result<usize, CoreError> {
            self.0.delete_debts_for_user(user_id)
        }
    }

    #[test]
    fn failed_profile_insert_reports_support_message() {
        let backend = ProfileRejectingBackend(InMemoryBackend::new());
        let err = AuthService::sign_up(&backend, &clock(), "asha@example.com", "secret1", "Asha")
            .unwrap_err();
        match err {
            CoreError::Validation(message) => assert_eq!(
                message,
                "Account created, but failed to save user info. Please contact support."
            ),
            other => panic!("unexpected error: {other:?}"),
        }
        // Credentials were registered before the profile write failed.
        let user = backend.sign_in("asha@example.com", "secret1").unwrap();
        assert!(backend.fetch_profile(user.id).unwrap().is_none());
    }

    #[test]
    fn sign_in_persists_session_keys() {
        let backend = InMemoryBackend::new();
        let store = MemorySecureStore::new();
        let user =
            AuthService::sign_up(&backend, &clock(), "asha@example.com", "secret1", "Asha").unwrap();

        assert!(AuthService::current_session(&store).unwrap().is_none());
        let session =
            AuthService::sign_in(&backend, &store, "asha@example.com", "secret1").unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(
            AuthService::current_session(&store).unwrap(),
            Some(session.clone())
        );

        AuthService::sign_out(&store).unwrap();
        assert!(AuthService::current_session(&store).unwrap().is_none());
        assert!(matches!(
            AuthService::require_session(&store),
            Err(CoreError::NotAuthenticated)
        ));
    }

    #[test]
    fn session_needs_both_keys() {
        let store = MemorySecureStore::new();
        store.save(USER_ID_KEY, &Uuid::new_v4().to_string()).unwrap();
        assert!(AuthService::current_session(&store).unwrap().is_none());
    }

    #[test]
    fn wrong_password_fails() {
        let backend = InMemoryBackend::new();
        let store = MemorySecureStore::new();
        AuthService::sign_up(&backend, &clock(), "asha@example.com", "secret1", "Asha").unwrap();
        let err = AuthService::sign_in(&backend, &store, "asha@example.com", "nope!!").unwrap_err();
        assert!(matches!(err, CoreError::AuthFailed(_)));
        assert!(store.keys().is_empty());
    }
}
