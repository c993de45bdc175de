use std::collections::HashMap;
use std::sync::Arc;

use glance_config::Settings;

use crate::error::StoreError;
use crate::store::KeyValueStore;

/// Fixed key the settings blob lives under
pub const SETTINGS_KEY: &str = "**** config ****";

/// Reads and writes [`Settings`] as one JSON blob in a key-value store
#[derive(Clone)]
pub struct SettingsRepository {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Defaults overlaid with whatever was saved; an unreadable blob yields defaults
    pub async fn load(&self) -> Result<Settings, StoreError> {
        let stored = self.store.get(&[SETTINGS_KEY.to_string()]).await?;

        let Some(json) = stored.get(SETTINGS_KEY).filter(|json| !json.is_empty()) else {
            tracing::debug!("No saved settings, using defaults");
            return Ok(Settings::default());
        };

        Ok(Settings::from_json(json).unwrap_or_else(|e| {
            tracing::warn!("Saved settings are unreadable, using defaults: {e}");
            Settings::default()
        }))
    }

    /// Persist, dropping inert replace rules
    pub async fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        let json = serde_json::to_string(&settings.persisted())?;
        self.store
            .set(HashMap::from([(SETTINGS_KEY.to_string(), json)]))
            .await?;
        tracing::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glance_types::{OptionValue, ReplaceRule, SettingsCommand};

    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn missing_settings_load_as_defaults() {
        let repo = SettingsRepository::new(Arc::new(MemoryStore::new()));
        assert_eq!(repo.load().await.unwrap(), Settings::default());
    }

    #[tokio::test]
    async fn save_then_load_drops_inert_rules() {
        let repo = SettingsRepository::new(Arc::new(MemoryStore::new()));

        let mut settings = Settings {
            replace_rules: vec![ReplaceRule::new("1", "a", "b")],
            ..Settings::default()
        };
        settings.apply(SettingsCommand::AddRule).unwrap();
        settings
            .apply(SettingsCommand::UpdateOption {
                name: "desc_font_color".into(),
                value: OptionValue::Text("#222".into()),
            })
            .unwrap();

        repo.save(&settings).await.unwrap();
        let loaded = repo.load().await.unwrap();

        assert_eq!(loaded.desc_font_color, "#222");
        assert_eq!(loaded.replace_rules, vec![ReplaceRule::new("1", "a", "b")]);
    }

    #[tokio::test]
    async fn corrupt_blob_falls_back_to_defaults() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(HashMap::from([(SETTINGS_KEY.to_string(), "{oops".to_string())]))
            .await
            .unwrap();

        let repo = SettingsRepository::new(store);
        assert_eq!(repo.load().await.unwrap(), Settings::default());
    }

    #[tokio::test]
    async fn one_bad_field_keeps_the_rest() {
        let store = Arc::new(MemoryStore::new());
        let blob = r##"{"head_font_color": "#123456", "head_font_size": 12.5}"##;
        store
            .set(HashMap::from([(SETTINGS_KEY.to_string(), blob.to_string())]))
            .await
            .unwrap();

        let loaded = SettingsRepository::new(store).load().await.unwrap();
        assert_eq!(loaded.head_font_color, "#123456");
        assert_eq!(loaded.head_font_size, Settings::default().head_font_size);
    }
}
