//! Application facade wiring the JSON backend, the device key store, the
//! network flag and the clock into one handle for the shell.

use std::{path::Path, sync::Arc};

use chrono::NaiveDate;
use spendify_config::Config;
use spendify_core::{
    AuthService, CategoryService, Clock, Connectivity, FixedClock, NetworkStatus, SyncReport,
    SyncService, SystemClock,
};
use spendify_domain::{Category, Session};
use spendify_storage_json::{JsonBackend, JsonSecureStore, StoragePaths};
use tracing::{debug, info};

use super::errors::{AppError, Result};
use super::utils;

/// Everything a command needs to talk to the backend and the device.
pub struct Spendify {
    backend: JsonBackend,
    store: JsonSecureStore,
    network: NetworkStatus,
    clock: Arc<dyn Clock>,
}

impl Spendify {
    /// Opens the backend tables and key store under `home` using `config`.
    ///
    /// The clock follows the configured UTC offset unless `SPENDIFY_TODAY` pins a date.
    pub fn open(home: &Path, config: &Config) -> Result<Self> {
        let clock: Arc<dyn Clock> = match utils::pinned_today() {
            Some(date) => Arc::new(FixedClock::at_date(date)),
            None => Arc::new(SystemClock::with_offset_minutes(config.utc_offset_minutes)),
        };
        Self::with_clock(home, config, clock)
    }

    pub fn with_clock(home: &Path, config: &Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let paths = StoragePaths {
            data_root: config.resolve_data_root(home),
            backup_root: config.resolve_backup_root(home),
        };
        let backend = JsonBackend::with_options(paths, config.backup_retention, Arc::clone(&clock))?;
        let store = JsonSecureStore::new(utils::secure_store_file(home))?;
        let network = NetworkStatus::new(!config.offline_mode);
        debug!(home = %home.display(), online = !config.offline_mode, "application opened");
        Ok(Self {
            backend,
            store,
            network,
            clock,
        })
    }

    pub fn backend(&self) -> &JsonBackend {
        &self.backend
    }

    pub fn store(&self) -> &JsonSecureStore {
        &self.store
    }

    pub fn network(&self) -> &NetworkStatus {
        &self.network
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn is_online(&self) -> bool {
        self.network.is_online()
    }

    pub fn session(&self) -> Result<Option<Session>> {
        Ok(AuthService::current_session(&self.store)?)
    }

    pub fn require_session(&self) -> Result<Session> {
        self.session()?.ok_or(AppError::NotSignedIn)
    }

    /// Fails with `Unavailable` while the device is offline.
    pub fn require_online(&self, action: &str) -> Result<()> {
        if self.is_online() {
            Ok(())
        } else {
            Err(AppError::Unavailable(format!(
                "{action} needs a connection. Use `network online` first."
            )))
        }
    }

    /// Signs in, refreshes the category cache and replays queued expenses.
    pub fn login(&self, email: &str, password: &str) -> Result<(Session, Option<SyncReport>)> {
        self.require_online("Signing in")?;
        let session = AuthService::sign_in(&self.backend, &self.store, email, password)?;
        CategoryService::refresh_cache(&self.backend, &self.store, &session)?;
        let report = self.sync_pending()?;
        Ok((session, report))
    }

    /// Live categories when online (refreshing the cache), cached ones otherwise.
    pub fn categories(&self, session: &Session) -> Result<Vec<Category>> {
        if self.is_online() {
            return Ok(CategoryService::refresh_cache(
                &self.backend,
                &self.store,
                session,
            )?);
        }
        CategoryService::cached(&self.store)?.ok_or_else(|| {
            AppError::Unavailable(
                "No cached categories on this device. Go online once to load them.".into(),
            )
        })
    }

    /// Flips the network flag. Coming back online drains the offline queue.
    pub fn set_online(&self, online: bool) -> Result<Option<SyncReport>> {
        let was_online = self.network.set_online(online);
        info!(online, "network status changed");
        if online && !was_online {
            self.sync_pending()
        } else {
            Ok(None)
        }
    }

    /// Drains the offline queue when a user is signed in and drafts are waiting.
    pub fn sync_pending(&self) -> Result<Option<SyncReport>> {
        if self.session()?.is_none() || !self.is_online() {
            return Ok(None);
        }
        if SyncService::pending(&self.store)?.is_empty() {
            return Ok(None);
        }
        Ok(Some(SyncService::drain(
            &self.backend,
            &self.store,
            &self.network,
        )?))
    }
}
