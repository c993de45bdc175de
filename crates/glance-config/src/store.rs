use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where the dictionary and settings stores live on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
}

impl StoreConfig {
    pub fn new() -> Self {
        let data_dir = env::var("GLANCE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./glance-data"));

        Self { data_dir }
    }

    pub fn dictionary_path(&self) -> PathBuf {
        self.data_dir.join("dictionary.jsonl")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join("settings.jsonl")
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new()
    }
}
