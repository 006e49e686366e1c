use std::collections::HashMap;
use std::path::Path;

use partsxref::config::*;
use partsxref::errors::XrefError;
use tempfile::TempDir;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn test_default_config_matches_search_defaults() {
    let config = XrefConfig::default();
    assert_eq!(config.result_cap, 500);
    assert!((config.fuzzy_threshold - 0.25).abs() < f32::EPSILON);
    assert!(config.fuzzy_fallback);
    assert_eq!(config.socket_addr().unwrap().port(), 3000);
}

#[test]
fn test_save_and_load_config() {
    let dir = TempDir::new().unwrap();
    let config = XrefConfig {
        result_cap: 42,
        refresh_interval_secs: 0,
        ..XrefConfig::default()
    };
    save_config(dir.path(), &config).unwrap();
    let loaded = load_config(dir.path()).unwrap();
    assert_eq!(config, loaded);
}

#[test]
fn test_missing_config_yields_defaults() {
    let dir = TempDir::new().unwrap();
    assert_eq!(load_config(dir.path()).unwrap(), XrefConfig::default());
}

#[test]
fn test_partial_config_fills_defaults() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(get_partsxref_dir(dir.path())).unwrap();
    std::fs::write(get_config_path(dir.path()), r#"{"result_cap": 7}"#).unwrap();
    let loaded = load_config(dir.path()).unwrap();
    assert_eq!(loaded.result_cap, 7);
    assert_eq!(loaded.max_family_size, XrefConfig::default().max_family_size);
}

#[test]
fn test_malformed_config_is_config_error() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(get_partsxref_dir(dir.path())).unwrap();
    std::fs::write(get_config_path(dir.path()), "{not json").unwrap();
    assert!(matches!(load_config(dir.path()), Err(XrefError::Config { .. })));
}

#[test]
fn test_partsxref_dir_location() {
    let dir = TempDir::new().unwrap();
    assert!(get_partsxref_dir(dir.path()).ends_with(".partsxref"));
    assert!(get_config_path(dir.path()).ends_with(".partsxref/config.json"));
}

#[test]
fn test_database_path_resolution() {
    let config = XrefConfig::default();
    assert_eq!(
        config.database_path(Path::new("/srv/parts")),
        Path::new("/srv/parts/.partsxref/parts.db")
    );
    let absolute = XrefConfig {
        database_path: "/var/lib/parts.db".to_string(),
        ..XrefConfig::default()
    };
    assert_eq!(
        absolute.database_path(Path::new("/srv/parts")),
        Path::new("/var/lib/parts.db")
    );
}

#[test]
fn test_env_overrides() {
    let mut config = XrefConfig::default();
    config
        .apply_overrides(env_of(&[
            (ENV_DATABASE, "/tmp/other.db"),
            (ENV_PORT, "8080"),
            (ENV_REFRESH_SECS, "15"),
        ]))
        .unwrap();
    assert_eq!(config.database_path, "/tmp/other.db");
    assert_eq!(config.listen_addr, "0.0.0.0:8080");
    assert_eq!(config.refresh_interval_secs, 15);
}

#[test]
fn test_blank_env_values_are_ignored() {
    let mut config = XrefConfig::default();
    config.apply_overrides(env_of(&[(ENV_PORT, "  ")])).unwrap();
    assert_eq!(config, XrefConfig::default());
}

#[test]
fn test_invalid_env_values_are_config_errors() {
    let mut config = XrefConfig::default();
    let err = config
        .apply_overrides(env_of(&[(ENV_PORT, "eighty")]))
        .unwrap_err();
    assert!(matches!(err, XrefError::Config { .. }));

    let err = config
        .apply_overrides(env_of(&[(ENV_REFRESH_SECS, "-1")]))
        .unwrap_err();
    assert!(matches!(err, XrefError::Config { .. }));
}
