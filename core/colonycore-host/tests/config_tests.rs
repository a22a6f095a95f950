use colonycore_host::{ColonyConfig, HostConfig, WorkerConfig};
use colonycore_store::StoreConfig;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

#[test]
fn missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();

    let config = ColonyConfig::load_from(dir.path().join("colonycore.toml"));

    assert_eq!(config, ColonyConfig::default());
    assert_eq!(config.export.queue_capacity, 32);
    assert_eq!(config.export.default_formats, vec!["json", "csv"]);
    assert_eq!(config.host.entity_model_major, 1);
    assert_eq!(config.store.evaluation_timeout_ms, 5_000);
}

#[test]
fn malformed_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("colonycore.toml");
    fs::write(&path, "[export\nqueue_capacity = ").unwrap();

    assert_eq!(ColonyConfig::load_from(&path), ColonyConfig::default());
}

#[test]
fn partial_file_keeps_other_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("colonycore.toml");
    fs::write(
        &path,
        r#"
[export]
queue_capacity = 4

[store]
builtin_rules = false
"#,
    )
    .unwrap();

    let config = ColonyConfig::load_from(&path);

    assert_eq!(
        config.export,
        WorkerConfig {
            queue_capacity: 4,
            default_formats: vec!["json".into(), "csv".into()],
        }
    );
    assert_eq!(
        config.store,
        StoreConfig {
            builtin_rules: false,
            evaluation_timeout_ms: 5_000,
        }
    );
    assert_eq!(config.host, HostConfig::default());
}

#[test]
fn parse_errors_surface_from_toml_str() {
    assert!(ColonyConfig::from_toml_str("host = 3").is_err());
    assert_eq!(
        ColonyConfig::from_toml_str("").unwrap(),
        ColonyConfig::default()
    );
}
