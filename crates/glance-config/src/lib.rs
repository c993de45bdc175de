use std::env;

use serde::{Deserialize, Serialize};

use self::ingest::IngestConfig;
use self::lookup::LookupConfig;
use self::preview::PreviewConfig;
use self::store::StoreConfig;

pub mod ingest;
pub mod lookup;
pub mod preview;
pub mod settings;
pub mod store;

pub use settings::{Settings, SettingsError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    pub ingest: IngestConfig,
    pub lookup: LookupConfig,
    pub preview: PreviewConfig,

    /// Default `tracing` filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Config {
    pub fn new() -> Self {
        let log_filter = env::var("GLANCE_LOG").unwrap_or_else(|_| "info".to_string());

        Config {
            store: StoreConfig::new(),
            ingest: IngestConfig::new(),
            lookup: LookupConfig::new(),
            preview: PreviewConfig::new(),

            log_filter,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
