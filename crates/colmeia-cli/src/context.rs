use anyhow::Context;
use colmeia_config::ColmeiaConfig;
use colmeia_db::service::ColmeiaService;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: ColmeiaService,
    pub config: ColmeiaConfig,
}

impl AppContext {
    /// Open the configured database, running migrations on the way.
    pub async fn init(config: ColmeiaConfig) -> anyhow::Result<Self> {
        if config.database.is_in_memory() {
            tracing::warn!("using an in-memory database; nothing will be persisted");
        }

        let service = ColmeiaService::new_local(&config.database.path)
            .await
            .with_context(|| format!("failed to open database at {}", config.database.path))?;

        Ok(Self { service, config })
    }
}
