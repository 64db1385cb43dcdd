//! Filesystem persistence: a JSON emulation of the hosted backend tables and
//! a JSON-file device key store.

mod secure_store;

pub use secure_store::JsonSecureStore;

use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use spendify_core::{Backend, BackendTables, Clock, CoreError, ExpenseQuery, SystemClock};
use spendify_domain::{
    AuthUser, Category, DebtKind, DebtRecord, Expense, ExpensePatch, NewDebt, NewExpense,
    UserProfile,
};
use tracing::{debug, info};
use uuid::Uuid;

const DATA_FILE_STEM: &str = "spendify";
const JSON_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";
const TMP_SUFFIX: &str = "tmp";
pub const DEFAULT_RETENTION: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    pub data_root: PathBuf,
    pub backup_root: PathBuf,
}

impl StoragePaths {
    /// `data/` and `backups/` under a common application directory.
    pub fn under(base: &Path) -> Self {
        Self {
            data_root: base.join("data"),
            backup_root: base.join("backups"),
        }
    }
}

/// Describes a snapshot of the backend tables on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub size_bytes: u64,
    pub path: PathBuf,
}

/// Backend whose tables live in a single JSON document.
///
/// Every successful mutation rewrites the document atomically; a failed
/// mutation leaves both memory and disk untouched.
pub struct JsonBackend {
    paths: StoragePaths,
    retention: usize,
    clock: Arc<dyn Clock>,
    tables: Mutex<BackendTables>,
}

impl JsonBackend {
    pub fn new(paths: StoragePaths) -> Result<Self, CoreError> {
        Self::with_options(paths, DEFAULT_RETENTION, Arc::new(SystemClock::default()))
    }

    pub fn with_options(
        paths: StoragePaths,
        retention: usize,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CoreError> {
        fs::create_dir_all(&paths.data_root)?;
        fs::create_dir_all(&paths.backup_root)?;
        let data_path = data_path(&paths);
        let tables = if data_path.exists() {
            load_tables(&data_path)?
        } else {
            BackendTables::default()
        };
        debug!(path = %data_path.display(), "backend tables loaded");
        Ok(Self {
            paths,
            retention: retention.max(1),
            clock,
            tables: Mutex::new(tables),
        })
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    pub fn data_path(&self) -> PathBuf {
        data_path(&self.paths)
    }

    /// Writes a timestamped copy of the tables and prunes old copies.
    pub fn backup(&self, note: Option<&str>) -> Result<BackupInfo, CoreError> {
        let tables = self.lock()?;
        let timestamp = self.clock.now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut stem = format!("{DATA_FILE_STEM}_{timestamp}");
        if let Some(label) = sanitize_backup_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let file_name = format!("{stem}.{JSON_EXTENSION}");
        let path = self.paths.backup_root.join(&file_name);
        save_tables(&tables, &path)?;
        drop(tables);
        self.prune_backups()?;
        info!(backup = %file_name, "backup created");
        Ok(BackupInfo {
            created_at: parse_backup_timestamp(&file_name),
            size_bytes: fs::metadata(&path).map(|meta| meta.len()).unwrap_or(0),
            id: file_name,
            path,
        })
    }

    /// Backups, newest first.
    pub fn list_backups(&self) -> Result<Vec<BackupInfo>, CoreError> {
        let dir = &self.paths.backup_root;
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(JSON_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(BackupInfo {
                    id: file_name.to_string(),
                    created_at: parse_backup_timestamp(file_name),
                    size_bytes: fs::metadata(&path).map(|meta| meta.len()).unwrap_or(0),
                    path: path.clone(),
                });
            }
        }
        entries.sort_by(|a, b| {
            Reverse(a.created_at)
                .cmp(&Reverse(b.created_at))
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(entries)
    }

    /// Finds a backup by file name, with or without the extension.
    pub fn find_backup(&self, id: &str) -> Result<Option<BackupInfo>, CoreError> {
        let wanted = id.trim();
        Ok(self.list_backups()?.into_iter().find(|info| {
            info.id == wanted || info.id.strip_suffix(".json") == Some(wanted)
        }))
    }

    /// Replaces the live tables with the contents of `backup`.
    pub fn restore(&self, backup: &BackupInfo) -> Result<(), CoreError> {
        if !backup.path.exists() {
            return Err(CoreError::Storage(format!(
                "backup `{}` not found",
                backup.id
            )));
        }
        let restored = load_tables(&backup.path)?;
        let mut tables = self.lock()?;
        save_tables(&restored, &self.data_path())?;
        *tables = restored;
        info!(backup = %backup.id, "backup restored");
        Ok(())
    }

    fn prune_backups(&self) -> Result<(), CoreError> {
        for entry in self.list_backups()?.into_iter().skip(self.retention) {
            let _ = fs::remove_file(entry.path);
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BackendTables>, CoreError> {
        self.tables
            .lock()
            .map_err(|_| CoreError::Storage("backend lock poisoned".into()))
    }

    fn read<T>(&self, f: impl FnOnce(&BackendTables) -> Result<T, CoreError>) -> Result<T, CoreError> {
        let tables = self.lock()?;
        f(&tables)
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut BackendTables) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let mut tables = self.lock()?;
        let mut next = tables.clone();
        let output = f(&mut next)?;
        save_tables(&next, &self.data_path())?;
        *tables = next;
        Ok(output)
    }
}

impl Backend for JsonBackend {
    fn sign_up(&self, email: &str, password: &str, full_name: &str) -> Result<AuthUser, CoreError> {
        let now = self.clock.now();
        self.write(|tables| tables.sign_up(email, password, full_name, now))
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, CoreError> {
        self.read(|tables| tables.sign_in(email, password))
    }

    fn delete_auth_user(&self, user_id: Uuid) -> Result<(), CoreError> {
        self.write(|tables| tables.delete_auth_user(user_id))
    }

    fn insert_profile(&self, profile: &UserProfile) -> Result<(), CoreError> {
        self.write(|tables| tables.insert_profile(profile))
    }

    fn fetch_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, CoreError> {
        self.read(|tables| Ok(tables.fetch_profile(user_id)))
    }

    fn update_budget(&self, user_id: Uuid, amount: f64) -> Result<(), CoreError> {
        self.write(|tables| tables.update_budget(user_id, amount))
    }

    fn delete_profile(&self, user_id: Uuid) -> Result<(), CoreError> {
        self.write(|tables| tables.delete_profile(user_id))
    }

    fn insert_category(&self, user_id: Uuid, name: &str) -> Result<Category, CoreError> {
        let now = self.clock.now();
        self.write(|tables| tables.insert_category(user_id, name, now))
    }

    fn list_categories(&self, user_id: Uuid) -> Result<Vec<Category>, CoreError> {
        self.read(|tables| Ok(tables.list_categories(user_id)))
    }

    fn delete_category(&self, id: Uuid) -> Result<(), CoreError> {
        self.write(|tables| tables.delete_category(id))
    }

    fn delete_categories_for_user(&self, user_id: Uuid) -> Result<usize, CoreError> {
        self.write(|tables| Ok(tables.delete_categories_for_user(user_id)))
    }

    fn insert_expense(&self, draft: &NewExpense) -> Result<Expense, CoreError> {
        let now = self.clock.now();
        self.write(|tables| tables.insert_expense(draft, now))
    }

    fn update_expense(&self, id: Uuid, patch: &ExpensePatch) -> Result<Expense, CoreError> {
        self.write(|tables| tables.update_expense(id, patch))
    }

    fn delete_expense(&self, id: Uuid) -> Result<(), CoreError> {
        self.write(|tables| tables.delete_expense(id))
    }

    fn delete_expenses_by_category(&self, category_id: Uuid) -> Result<usize, CoreError> {
        self.write(|tables| Ok(tables.delete_expenses_by_category(category_id)))
    }

    fn delete_expenses_for_user(&self, user_id: Uuid) -> Result<usize, CoreError> {
        self.write(|tables| Ok(tables.delete_expenses_for_user(user_id)))
    }

    fn list_expenses(&self, query: &ExpenseQuery) -> Result<Vec<Expense>, CoreError> {
        self.read(|tables| Ok(tables.list_expenses(query)))
    }

    fn list_debts(&self, user_id: Uuid, kind: DebtKind) -> Result<Vec<DebtRecord>, CoreError> {
        self.read(|tables| Ok(tables.list_debts(user_id, kind)))
    }

    fn insert_debt(&self, draft: &NewDebt) -> Result<DebtRecord, CoreError> {
        self.write(|tables| tables.insert_debt(draft))
    }

    fn delete_debt(&self, kind: DebtKind, id: Uuid) -> Result<(), CoreError> {
        self.write(|tables| tables.delete_debt(kind, id))
    }

    fn delete_debts_for_user(&self, user_id: Uuid) -> Result<usize, CoreError> {
        self.write(|tables| Ok(tables.delete_debts_for_user(user_id)))
    }
}

fn data_path(paths: &StoragePaths) -> PathBuf {
    paths
        .data_root
        .join(format!("{DATA_FILE_STEM}.{JSON_EXTENSION}"))
}

/// Loads a table snapshot from `path`.
pub fn load_tables(path: &Path) -> Result<BackendTables, CoreError> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Writes a table snapshot to `path` through a temporary file.
pub fn save_tables(tables: &BackendTables, path: &Path) -> Result<(), CoreError> {
    let json = serde_json::to_string_pretty(tables)?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub(crate) fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Reads `YYYYMMDD_HHMM` out of `spendify_YYYYMMDD_HHMM[_note].json`.
pub(crate) fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(&format!(".{JSON_EXTENSION}"))?;
    let mut segments = stem.split('_').skip(1);
    let date = segments.next()?;
    let time = segments.next()?;
    if !is_digits(date, 8) || !is_digits(time, 4) {
        return None;
    }
    NaiveDateTime::parse_from_str(&format!("{date}{time}"), "%Y%m%d%H%M")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

pub(crate) fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_notes_become_slugs() {
        assert_eq!(
            sanitize_backup_note(Some("  Before Reset! v2 ")),
            Some("before-reset-v2".into())
        );
        assert_eq!(sanitize_backup_note(Some("!!!")), None);
        assert_eq!(sanitize_backup_note(None), None);
    }

    #[test]
    fn backup_timestamps_parse_with_and_without_note() {
        let plain = parse_backup_timestamp("spendify_20240603_0915.json").unwrap();
        assert_eq!(plain.format("%Y-%m-%d %H:%M").to_string(), "2024-06-03 09:15");
        assert!(parse_backup_timestamp("spendify_20240603_0915_pre-sync.json").is_some());
        assert!(parse_backup_timestamp("notes.json").is_none());
    }

    #[test]
    fn tmp_path_appends_suffix() {
        let tmp = tmp_path(Path::new("/data/spendify.json"));
        assert_eq!(tmp, PathBuf::from("/data/spendify.json.tmp"));
    }
}
