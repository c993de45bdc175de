use std::env;

use serde::{Deserialize, Serialize};

fn default_batch_size() -> usize {
    1000
}

fn default_chunk_bytes() -> usize {
    64 * 1024
}

fn default_encoding() -> String {
    "Shift-JIS".to_string()
}

fn default_format() -> String {
    "EIJIRO".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct IngestConfig {
    /// Entries written to the store per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Bytes read from the source per step
    #[serde(default = "default_chunk_bytes")]
    pub chunk_bytes: usize,
    #[serde(default = "default_encoding")]
    pub default_encoding: String,
    #[serde(default = "default_format")]
    pub default_format: String,
}

impl IngestConfig {
    pub fn new() -> Self {
        let batch_size = env::var("INGEST_BATCH_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&v: &usize| v > 0)
            .unwrap_or_else(default_batch_size);

        let chunk_bytes = env::var("INGEST_CHUNK_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&v: &usize| v > 0)
            .unwrap_or_else(default_chunk_bytes);

        let default_encoding = env::var("INGEST_ENCODING").unwrap_or_else(|_| default_encoding());
        let default_format = env::var("INGEST_FORMAT").unwrap_or_else(|_| default_format());

        Self {
            batch_size,
            chunk_bytes,
            default_encoding,
            default_format,
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            chunk_bytes: default_chunk_bytes(),
            default_encoding: default_encoding(),
            default_format: default_format(),
        }
    }
}
