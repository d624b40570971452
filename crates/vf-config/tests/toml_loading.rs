//! Integration tests for TOML configuration loading.
//!
//! Uses `figment::Jail` for sandboxed files and env vars.

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use vf_config::VfConfig;
use vf_core::enums::ResearchMode;

#[test]
fn loads_sections_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[store]
db_path = "/var/lib/vendorfacts/facts.db"
trail_dir = "/var/lib/vendorfacts/trail"

[research]
max_concurrent_rechecks = 8
recheck_timeout_secs = 5
default_mode = "full"

[freshness]
failure_recheck_days = 3
"#,
        )?;

        let config: VfConfig = Figment::from(Serialized::defaults(VfConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.store.db_path, PathBuf::from("/var/lib/vendorfacts/facts.db"));
        assert_eq!(
            config.store.trail_dir,
            Some(PathBuf::from("/var/lib/vendorfacts/trail"))
        );
        assert_eq!(config.research.max_concurrent_rechecks, 8);
        assert_eq!(config.research.recheck_timeout_secs, 5);
        assert_eq!(config.research.discovery_timeout_secs, 120);
        assert_eq!(config.research.default_mode, ResearchMode::Full);
        assert_eq!(config.freshness.failure_recheck_days, 3);
        assert_eq!(config.freshness.default_ttl_days, 30);
        Ok(())
    });
}

#[test]
fn local_project_file_is_picked_up() {
    Jail::expect_with(|jail| {
        jail.create_dir(".vendorfacts")?;
        jail.create_file(
            ".vendorfacts/config.toml",
            r#"
[http]
user_agent = "acme-risk/2.0"
"#,
        )?;

        let config = VfConfig::load().expect("config loads");
        assert_eq!(config.http.user_agent, "acme-risk/2.0");
        Ok(())
    });
}

#[test]
fn explicit_file_is_validated() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "custom.toml",
            r#"
[research]
max_concurrent_rechecks = 0
"#,
        )?;

        let result = VfConfig::load_from(std::path::Path::new("custom.toml"));
        assert!(result.is_err());
        Ok(())
    });
}

#[test]
fn env_beats_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[research]
max_concurrent_rechecks = 8
"#,
        )?;
        jail.set_env("VENDORFACTS_RESEARCH__MAX_CONCURRENT_RECHECKS", "2");

        let config: VfConfig = Figment::from(Serialized::defaults(VfConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("VENDORFACTS_").split("__"))
            .extract()?;

        assert_eq!(config.research.max_concurrent_rechecks, 2);
        Ok(())
    });
}
