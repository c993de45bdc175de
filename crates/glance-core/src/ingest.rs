use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use glance_config::ingest::IngestConfig;
use glance_types::{DictionaryEntry, IngestProgress};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;

use crate::decoder::StreamDecoder;
use crate::encoding::SourceEncoding;
use crate::error::IngestError;
use crate::format::SourceFormat;
use crate::store::KeyValueStore;

static DEFAULT_DICTIONARY: &[u8] = include_bytes!("../data/default_dict.json");

/// Receives ingestion progress. Delivery is best effort.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn report(&self, progress: IngestProgress);
}

#[async_trait]
impl ProgressSink for kanal::AsyncSender<IngestProgress> {
    async fn report(&self, progress: IngestProgress) {
        // Nobody listening is fine
        let _ = self.send(progress).await;
    }
}

/// Discards progress
#[async_trait]
impl ProgressSink for () {
    async fn report(&self, _progress: IngestProgress) {}
}

#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    pub batch_size: usize,
    pub chunk_bytes: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self::from(&IngestConfig::default())
    }
}

impl From<&IngestConfig> for IngestOptions {
    fn from(config: &IngestConfig) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            chunk_bytes: config.chunk_bytes.max(1),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Heads persisted in this run, distinct within each batch. A head that
    /// reappears in a later batch overwrites the earlier body and counts again.
    pub word_count: usize,
    /// Malformed records that were dropped
    pub skipped: usize,
    /// Cancelled before the source was exhausted
    pub stopped: bool,
}

/// Streams a dictionary source into a [`KeyValueStore`] in bounded batches
pub struct Ingestor {
    store: Arc<dyn KeyValueStore>,
    options: IngestOptions,
    cancel: CancellationToken,
}

struct Batch {
    pending: HashMap<String, String>,
    last_head: String,
    persisted: usize,
}

impl Ingestor {
    pub fn new(store: Arc<dyn KeyValueStore>, options: IngestOptions) -> Self {
        Self {
            store,
            options,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Ingest `source`, which is expected to be `total_bytes` long.
    ///
    /// Batches persisted before a fatal error stay in the store.
    pub async fn ingest<R>(
        &self,
        mut source: R,
        total_bytes: u64,
        encoding: SourceEncoding,
        format: SourceFormat,
        progress: &dyn ProgressSink,
    ) -> Result<IngestSummary, IngestError>
    where
        R: AsyncRead + Unpin + Send,
    {
        tracing::info!("Ingesting {total_bytes} bytes as {format} ({encoding})");

        let mut decoder = StreamDecoder::new(encoding, format);
        let mut batch = Batch {
            pending: HashMap::with_capacity(self.options.batch_size),
            last_head: String::new(),
            persisted: 0,
        };
        let mut chunk = vec![0u8; self.options.chunk_bytes];
        let mut loaded_bytes = 0u64;

        loop {
            if self.cancel.is_cancelled() {
                tracing::info!("Ingestion stopped after {} records", batch.persisted);
                return Ok(IngestSummary {
                    word_count: batch.persisted,
                    skipped: decoder.skipped(),
                    stopped: true,
                });
            }

            let read = source.read(&mut chunk).await?;
            if read == 0 {
                break;
            }
            loaded_bytes += read as u64;
            progress
                .report(IngestProgress::Reading {
                    loaded_bytes,
                    total_bytes: total_bytes.max(loaded_bytes),
                })
                .await;

            for entry in decoder.feed(&chunk[..read]) {
                self.push(&mut batch, entry, progress).await?;
            }
        }

        let (rest, skipped) = decoder.finish().inspect_err(|e| {
            tracing::error!("Aborting ingestion after {} records: {e}", batch.persisted);
        })?;
        for entry in rest {
            self.push(&mut batch, entry, progress).await?;
        }
        self.flush(&mut batch, progress).await?;

        tracing::info!("Ingested {} words ({skipped} skipped)", batch.persisted);

        Ok(IngestSummary {
            word_count: batch.persisted,
            skipped,
            stopped: false,
        })
    }

    pub async fn ingest_bytes(
        &self,
        bytes: &[u8],
        encoding: SourceEncoding,
        format: SourceFormat,
        progress: &dyn ProgressSink,
    ) -> Result<IngestSummary, IngestError> {
        self.ingest(bytes, bytes.len() as u64, encoding, format, progress)
            .await
    }

    pub async fn ingest_file(
        &self,
        path: impl AsRef<Path>,
        encoding: SourceEncoding,
        format: SourceFormat,
        progress: &dyn ProgressSink,
    ) -> Result<IngestSummary, IngestError> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path).await?;
        let total_bytes = file.metadata().await?.len();
        tracing::debug!("Reading {}", path.display());
        self.ingest(file, total_bytes, encoding, format, progress)
            .await
    }

    /// The small dictionary bundled with the binary
    pub async fn ingest_default(
        &self,
        progress: &dyn ProgressSink,
    ) -> Result<IngestSummary, IngestError> {
        self.ingest_bytes(
            DEFAULT_DICTIONARY,
            SourceEncoding::Utf8,
            SourceFormat::Json,
            progress,
        )
        .await
    }

    async fn push(
        &self,
        batch: &mut Batch,
        entry: DictionaryEntry,
        progress: &dyn ProgressSink,
    ) -> Result<(), IngestError> {
        batch.last_head.clone_from(&entry.head);
        batch.pending.insert(entry.head, entry.body);
        if batch.pending.len() >= self.options.batch_size {
            self.flush(batch, progress).await?;
        }
        Ok(())
    }

    async fn flush(&self, batch: &mut Batch, progress: &dyn ProgressSink) -> Result<(), IngestError> {
        if batch.pending.is_empty() {
            return Ok(());
        }

        let items = std::mem::take(&mut batch.pending);
        let count = items.len();
        self.store.set(items).await?;
        batch.persisted += count;

        tracing::debug!("Persisted batch of {count} ({} total)", batch.persisted);
        progress
            .report(IngestProgress::Loaded {
                count: batch.persisted,
                last_head: batch.last_head.clone(),
            })
            .await;

        // Let the tick loop run between batches
        tokio::task::yield_now().await;
        Ok(())
    }
}
