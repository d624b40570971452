use std::sync::Arc;

use anyhow::Context;
use vf_config::VfConfig;
use vf_db::service::FactService;

/// Shared state for commands that touch the fact store.
pub struct AppContext {
    pub config: VfConfig,
    pub service: Arc<FactService>,
}

impl AppContext {
    pub async fn init(config: VfConfig) -> anyhow::Result<Self> {
        let service = FactService::from_config(&config).await.with_context(|| {
            format!(
                "failed to open fact store at {}",
                config.store.db_path.display()
            )
        })?;
        Ok(Self {
            config,
            service: Arc::new(service),
        })
    }
}
