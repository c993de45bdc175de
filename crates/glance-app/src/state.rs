use std::sync::Arc;

use glance_config::Config;
use glance_core::{FileStore, KeyValueStore, SettingsRepository};
use tokio::sync::RwLock;

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub dictionary: Arc<dyn KeyValueStore>,
    pub settings: SettingsRepository,
}

impl AppState {
    /// Open the file-backed stores under the configured data directory
    pub async fn open(config: Config) -> anyhow::Result<Self> {
        let dictionary = FileStore::open(config.store.dictionary_path()).await?;
        let settings = FileStore::open(config.store.settings_path()).await?;

        tracing::info!("Data directory: {}", config.store.data_dir.display());
        Ok(Self::with_stores(config, Arc::new(dictionary), Arc::new(settings)))
    }

    pub fn with_stores(
        config: Config,
        dictionary: Arc<dyn KeyValueStore>,
        settings: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            dictionary,
            settings: SettingsRepository::new(settings),
        }
    }
}
