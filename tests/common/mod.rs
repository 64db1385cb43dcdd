use std::path::{Path, PathBuf};
use std::sync::Mutex;

use assert_cmd::{assert::Assert, Command};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Pinned "today" for every scripted run.
pub const TODAY: &str = "2024-06-03";

/// Creates an isolated Spendify home directory.
pub fn setup_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Runs `script` through the shell in script mode against `home`.
pub fn run_script(home: &Path, script: &str) -> Assert {
    let mut cmd = Command::cargo_bin("spendify_cli").expect("locate spendify_cli binary");
    cmd.env("SPENDIFY_CLI_SCRIPT", "1")
        .env("SPENDIFY_HOME", home)
        .env("SPENDIFY_TODAY", TODAY)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .write_stdin(script.to_string())
        .assert()
}

/// Signs up and signs in the default test user.
pub const SIGN_IN: &str = "\
signup asha@example.com secret123 Asha Rao
login asha@example.com secret123
";
