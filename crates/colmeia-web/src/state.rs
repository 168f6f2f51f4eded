use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate, Utc};
use colmeia_config::{ColmeiaConfig, ConfigError};
use colmeia_db::service::ColmeiaService;

use crate::media::MediaStore;
use crate::registry::AdminRegistry;
use crate::routes::Routes;

/// Shared by every handler. Cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ColmeiaService>,
    pub config: Arc<ColmeiaConfig>,
    pub registry: Arc<AdminRegistry>,
    pub routes: Arc<Routes>,
    pub media: Arc<MediaStore>,
    pub offset: FixedOffset,
}

impl AppState {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the configured UTC offset
    /// is out of range.
    pub fn new(service: ColmeiaService, config: ColmeiaConfig) -> Result<Self, ConfigError> {
        let offset = config.general.offset()?;
        let registry = AdminRegistry::default();
        let routes = Routes::new(&registry);
        let media = MediaStore::new(&config.server.media_dir);
        Ok(Self {
            service: Arc::new(service),
            config: Arc::new(config),
            registry: Arc::new(registry),
            routes: Arc::new(routes),
            media: Arc::new(media),
            offset,
        })
    }

    /// Today's date in the configured offset.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }
}
