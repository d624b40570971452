use figment::Jail;
use std::path::PathBuf;
use vf_config::{ConfigError, VfConfig};

#[test]
fn env_sets_nested_values() {
    Jail::expect_with(|jail| {
        jail.set_env("VENDORFACTS_STORE__DB_PATH", ":memory:");
        jail.set_env("VENDORFACTS_FRESHNESS__DEFAULT_TTL_DAYS", "14");

        let config = VfConfig::load().expect("config loads");
        assert_eq!(config.store.db_path, PathBuf::from(":memory:"));
        assert!(config.store.is_in_memory());
        assert_eq!(config.freshness.default_ttl_days, 14);
        Ok(())
    });
}

#[test]
fn invalid_env_value_fails_validation() {
    Jail::expect_with(|jail| {
        jail.set_env("VENDORFACTS_HTTP__TIMEOUT_SECS", "0");

        let err = VfConfig::load().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        Ok(())
    });
}
