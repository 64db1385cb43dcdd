use dirs::home_dir;
use std::{env, path::PathBuf};

use chrono::NaiveDate;

const DEFAULT_DIR_NAME: &str = ".spendify";
const SECURE_STORE_FILE: &str = "secure_store.json";

/// Overrides the application home directory.
pub const HOME_ENV: &str = "SPENDIFY_HOME";
/// Pins "today" to a fixed `YYYY-MM-DD`, used by scripted sessions.
pub const TODAY_ENV: &str = "SPENDIFY_TODAY";

/// Returns the application directory, defaulting to `~/.spendify`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Device key store file under the application directory.
pub fn secure_store_file(home: &std::path::Path) -> PathBuf {
    home.join(SECURE_STORE_FILE)
}

/// Date pinned through [`TODAY_ENV`], if set and valid.
pub fn pinned_today() -> Option<NaiveDate> {
    let raw = env::var(TODAY_ENV).ok()?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}
