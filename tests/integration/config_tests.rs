use copyfinder::config::{Config, ConfigError};
use figment::providers::{Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use std::sync::Mutex;
use tempfile::tempdir;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Clear all COPYFINDER_* environment variables to avoid interference.
fn clear_env() {
    for (key, _) in std::env::vars() {
        if key.starts_with("COPYFINDER_") {
            std::env::remove_var(key);
        }
    }
}

#[test]
fn test_config_defaults_extract() {
    // Figment directly, no Env layer
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_load_from_toml() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    fs::write(
        &config_path,
        r#"
threads = 8
chunk_size = 65536
report_singletons = false
skip_hidden = true
min_size = 10
"#,
    )
    .unwrap();

    let config = Config::load_from(Some(&config_path)).unwrap();

    assert_eq!(config.threads, Some(8));
    assert_eq!(config.chunk_size, 65_536);
    assert!(!config.report_singletons);
    assert!(config.skip_hidden);
    assert_eq!(config.min_size, Some(10));
    assert_eq!(config.max_size, None);
}

#[test]
fn test_config_env_overrides_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "threads = 2\nchunk_size = 4096\n").unwrap();

    std::env::set_var("COPYFINDER_THREADS", "16");
    let result = Config::load_from(Some(&config_path));
    clear_env();

    let config = result.unwrap();
    assert_eq!(config.threads, Some(16));
    assert_eq!(config.chunk_size, 4096);
}

#[test]
fn test_config_env_value_is_validated() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();

    std::env::set_var("COPYFINDER_CHUNK_SIZE", "0");
    let result = Config::load_from(None);
    clear_env();

    assert!(matches!(
        result,
        Err(ConfigError::Invalid {
            field: "chunk_size",
            ..
        })
    ));
}

#[test]
fn test_config_missing_explicit_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let temp_dir = tempdir().unwrap();

    let result = Config::load_from(Some(&temp_dir.path().join("absent.toml")));
    assert!(matches!(result, Err(ConfigError::Missing(_))));
}

#[test]
fn test_config_invalid_toml_is_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "threads = \"many\"").unwrap();

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));
    assert!(figment.extract::<Config>().is_err());
    assert!(matches!(
        Config::load_from(Some(&config_path)),
        Err(ConfigError::Load(_))
    ));
}

#[test]
fn test_config_save_round_trips_through_load() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("saved.toml");

    let config = Config {
        threads: Some(3),
        max_size: Some(1_000_000),
        ..Config::default()
    };
    config.save(&config_path).unwrap();

    assert_eq!(Config::load_from(Some(&config_path)).unwrap(), config);
}
