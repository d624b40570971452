use anyhow::Context;
use vf_config::VfConfig;

use crate::cli::GlobalFlags;

/// Load configuration, honouring `--config` and `--db`.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<VfConfig> {
    let mut config = match &flags.config {
        Some(path) => VfConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => VfConfig::load_with_dotenv().context("failed to load configuration")?,
    };
    if let Some(db) = &flags.db {
        config.store.db_path.clone_from(db);
    }
    config.validate()?;
    tracing::debug!(db = %config.store.db_path.display(), "configuration loaded");
    Ok(config)
}
