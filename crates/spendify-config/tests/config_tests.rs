use spendify_config::{Config, ConfigManager};
use spendify_domain::AggregationPeriod;
use tempfile::tempdir;

#[test]
fn default_config_matches_app_defaults() {
    let cfg = Config::default();

    assert_eq!(cfg.locale, "en-IN");
    assert_eq!(cfg.currency_symbol, "₹");
    assert_eq!(cfg.utc_offset_minutes, 330);
    assert_eq!(cfg.backup_retention, 5);
    assert!(!cfg.offline_mode);
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
    assert!(!manager.config_path().exists());
    assert_eq!(manager.load().expect("load"), Config::default());
    assert!(manager.backups_dir().exists());
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"), dir.path().join("backups"));

    let mut cfg = Config::default();
    cfg.set("default_period", "week").expect("set period");
    cfg.set("currency_symbol", "Rs").expect("set symbol");

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded.default_period, AggregationPeriod::Week);
    assert_eq!(loaded.currency_symbol, "Rs");
}

#[test]
fn partial_file_fills_in_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
    std::fs::write(
        manager.config_path(),
        r#"{ "locale": "en-GB", "currency_symbol": "£" }"#,
    )
    .expect("write");
    let loaded = manager.load().expect("load");
    assert_eq!(loaded.locale, "en-GB");
    assert_eq!(loaded.utc_offset_minutes, 330);
    assert!(loaded.ui_color_enabled);
}

#[test]
fn backup_and_restore_round_trip() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    let mut cfg = Config::default();
    cfg.set("offline_mode", "on").expect("set");
    let name = manager.backup(&cfg, Some("offline first")).expect("backup");
    assert!(name.starts_with("config_"));
    assert!(name.ends_with("_offline-first.json"));
    assert_eq!(manager.list_backups().expect("list"), vec![name.clone()]);

    manager.save(&Config::default()).expect("save");
    let restored = manager
        .restore(name.trim_end_matches(".json"))
        .expect("restore");
    assert!(restored.offline_mode);
    assert!(manager.load().expect("reload").offline_mode);
    assert!(manager.restore("config_19990101_0000").is_err());
}

#[test]
fn pruning_keeps_the_newest_backups() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
    for stamp in ["20240101_0900", "20240102_0900", "20240103_0900"] {
        let path = manager.backups_dir().join(format!("config_{stamp}.json"));
        std::fs::write(path, "{}").expect("seed backup");
    }

    assert_eq!(manager.prune_backups(2).expect("prune"), 1);
    assert_eq!(
        manager.list_backups().expect("list"),
        vec!["config_20240103_0900.json", "config_20240102_0900.json"]
    );
    assert_eq!(manager.prune_backups(0).expect("prune"), 1);
    assert_eq!(manager.list_backups().expect("list").len(), 1);
}
