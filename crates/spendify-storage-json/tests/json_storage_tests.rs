use std::{fs, sync::Arc};

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use spendify_core::{
    keystore::{USER_EMAIL_KEY, USER_ID_KEY},
    AuthService, Backend, CategoryService, ExpenseService, FixedClock, SecureStore,
};
use spendify_domain::NewExpense;
use spendify_storage_json::{JsonBackend, JsonSecureStore, StoragePaths};
use tempfile::tempdir;

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 6, 3, 9, 15, 0).unwrap(),
    ))
}

#[test]
fn tables_survive_reopening() {
    let dir = tempdir().expect("tempdir");
    let paths = StoragePaths::under(dir.path());
    let clock = clock();
    let store = JsonSecureStore::new(dir.path().join("secure.json")).expect("store");

    {
        let backend = JsonBackend::with_options(paths.clone(), 5, clock.clone()).expect("backend");
        AuthService::sign_up(&backend, clock.as_ref(), "asha@example.com", "secret1", "Asha")
            .expect("sign up");
        let session = AuthService::sign_in(&backend, &store, "asha@example.com", "secret1")
            .expect("sign in");
        let food = CategoryService::add(&backend, &session, "Food").expect("category");
        ExpenseService::create(
            &backend,
            &NewExpense::new(
                session.user_id,
                food.id,
                42.0,
                NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            ),
        )
        .expect("expense");
        assert!(backend.data_path().exists());
    }

    let reopened = JsonBackend::with_options(paths, 5, clock).expect("reopen");
    let store = JsonSecureStore::new(dir.path().join("secure.json")).expect("reopen store");
    let session = AuthService::current_session(&store)
        .expect("session read")
        .expect("session present");
    let expenses = ExpenseService::list(&reopened, &session).expect("list");
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].amount, 42.0);
    assert!(store.get(USER_EMAIL_KEY).unwrap().is_some());
    assert!(store.get(USER_ID_KEY).unwrap().is_some());
}

#[test]
fn failed_mutation_leaves_disk_untouched() {
    let dir = tempdir().expect("tempdir");
    let backend = JsonBackend::with_options(StoragePaths::under(dir.path()), 5, clock())
        .expect("backend");
    backend
        .sign_up("asha@example.com", "secret1", "Asha")
        .expect("sign up");
    let before = fs::read_to_string(backend.data_path()).expect("read");

    assert!(backend.sign_up("asha@example.com", "secret2", "Asha").is_err());
    let after = fs::read_to_string(backend.data_path()).expect("read");
    assert_eq!(before, after);
}

#[test]
fn backups_are_listed_newest_first_and_pruned() {
    let dir = tempdir().expect("tempdir");
    let clock = clock();
    let backend =
        JsonBackend::with_options(StoragePaths::under(dir.path()), 2, clock.clone()).expect("backend");

    let first = backend.backup(Some("first")).expect("backup 1");
    clock.advance(Duration::minutes(1));
    let second = backend.backup(None).expect("backup 2");
    clock.advance(Duration::minutes(1));
    let third = backend.backup(Some("Third one")).expect("backup 3");

    assert_eq!(first.id, "spendify_20240603_0915_first.json");
    assert_eq!(third.id, "spendify_20240603_0917_third-one.json");

    let listed: Vec<String> = backend
        .list_backups()
        .expect("list")
        .into_iter()
        .map(|info| info.id)
        .collect();
    assert_eq!(listed, vec![third.id.clone(), second.id.clone()]);
    assert!(!first.path.exists());
}

#[test]
fn restore_brings_back_previous_tables() {
    let dir = tempdir().expect("tempdir");
    let clock = clock();
    let backend =
        JsonBackend::with_options(StoragePaths::under(dir.path()), 5, clock.clone()).expect("backend");
    let user = backend
        .sign_up("asha@example.com", "secret1", "Asha")
        .expect("sign up");
    backend.insert_category(user.id, "Food").expect("category");
    let snapshot = backend.backup(Some("with food")).expect("backup");

    let categories = backend.list_categories(user.id).expect("list");
    backend.delete_category(categories[0].id).expect("delete");
    assert!(backend.list_categories(user.id).unwrap().is_empty());

    let found = backend
        .find_backup("spendify_20240603_0915_with-food")
        .expect("find")
        .expect("present");
    assert_eq!(found.id, snapshot.id);
    backend.restore(&found).expect("restore");
    assert_eq!(backend.list_categories(user.id).unwrap().len(), 1);
}

#[test]
fn secure_store_delete_is_idempotent() {
    let dir = tempdir().expect("tempdir");
    let store = JsonSecureStore::new(dir.path().join("nested").join("secure.json")).expect("store");
    store.delete("missing").expect("delete missing");
    store.save("k", "v").expect("save");
    store.delete("k").expect("delete");
    assert!(store.get("k").unwrap().is_none());
    assert!(store.path().exists());
}
