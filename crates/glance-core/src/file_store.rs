use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::KeyValueStore;

/// Below this many superseded bytes the log is left alone while open
const COMPACT_FLOOR: u64 = 1 << 20;

#[derive(Serialize)]
struct RecordRef<'a> {
    k: &'a str,
    v: &'a str,
}

#[derive(Deserialize)]
struct Record {
    k: String,
    v: String,
}

fn record_line(k: &str, v: &str) -> Result<String, serde_json::Error> {
    let mut line = serde_json::to_string(&RecordRef { k, v })?;
    line.push('\n');
    Ok(line)
}

struct Slot {
    value: String,
    /// Size of the record that holds this value in the log
    bytes: u64,
}

struct Inner {
    map: HashMap<String, Slot>,
    file: File,
    /// Log length, superseded records included
    len: u64,
    /// Bytes of the records still in the map
    live: u64,
}

impl Inner {
    fn insert(&mut self, key: String, slot: Slot) {
        self.live += slot.bytes;
        if let Some(old) = self.map.insert(key, slot) {
            self.live -= old.bytes;
        }
    }
}

/// Append-only JSON-lines log, replayed into memory on open.
///
/// Later records for a key win. The log is rewritten with only live records
/// on open when it holds superseded ones, and while open once superseded
/// bytes outgrow live ones. `clear` truncates the log.
pub struct FileStore {
    path: PathBuf,
    inner: RwLock<Inner>,
}

impl FileStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let mut map = HashMap::new();
        let mut len = 0;
        let mut live = 0;
        if fs::try_exists(&path).await.map_err(io_err)? {
            let reader = BufReader::new(File::open(&path).await.map_err(io_err)?);
            let mut lines = reader.lines();
            let mut line_no = 0usize;
            while let Some(line) = lines.next_line().await.map_err(io_err)? {
                line_no += 1;
                let bytes = line.len() as u64 + 1;
                len += bytes;
                match serde_json::from_str::<Record>(&line) {
                    Ok(record) => {
                        live += bytes;
                        let slot = Slot {
                            value: record.v,
                            bytes,
                        };
                        if let Some(old) = map.insert(record.k, slot) {
                            live -= old.bytes;
                        }
                    }
                    // A torn final write is the usual cause
                    Err(e) => tracing::warn!("{}:{line_no}: unreadable record: {e}", path.display()),
                }
            }
        }

        let (file, len) = if live < len {
            tracing::info!("Compacting {} ({live} of {len} bytes live)", path.display());
            compact(&path, &mut map).await.map_err(io_err)?
        } else {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .await
                .map_err(io_err)?;

            // Terminate a last line without a newline so the next append starts a fresh record
            let on_disk = file.metadata().await.map_err(io_err)?.len();
            if on_disk != len {
                file.write_all(b"\n").await.map_err(io_err)?;
            }
            (file, len)
        };

        tracing::debug!("Opened {} with {} keys", path.display(), map.len());

        Ok(Self {
            path,
            inner: RwLock::new(Inner {
                map,
                file,
                len,
                live: len,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

/// Rewrite the log with one record per live key, swapping it in by rename.
/// Returns the reopened log and its length.
async fn compact(path: &Path, map: &mut HashMap<String, Slot>) -> std::io::Result<(File, u64)> {
    let tmp = path.with_extension("compact");
    let mut out = BufWriter::new(File::create(&tmp).await?);
    let mut written = 0;
    for (k, slot) in map.iter_mut() {
        let line = record_line(k, &slot.value)?;
        out.write_all(line.as_bytes()).await?;
        slot.bytes = line.len() as u64;
        written += slot.bytes;
    }
    out.flush().await?;
    out.into_inner().sync_all().await?;
    fs::rename(&tmp, path).await?;

    let file = OpenOptions::new().append(true).open(path).await?;
    Ok((file, written))
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, keys: &[String]) -> Result<HashMap<String, String>, StoreError> {
        let inner = self.inner.read().await;
        Ok(keys
            .iter()
            .filter_map(|k| inner.map.get(k).map(|slot| (k.clone(), slot.value.clone())))
            .collect())
    }

    async fn set(&self, items: HashMap<String, String>) -> Result<(), StoreError> {
        if items.is_empty() {
            return Ok(());
        }

        let mut buf = String::new();
        let mut slots = Vec::with_capacity(items.len());
        for (k, v) in items {
            let line = record_line(&k, &v)?;
            buf.push_str(&line);
            slots.push((
                k,
                Slot {
                    value: v,
                    bytes: line.len() as u64,
                },
            ));
        }

        let mut inner = self.inner.write().await;
        inner
            .file
            .write_all(buf.as_bytes())
            .await
            .map_err(|e| self.io_err(e))?;
        inner.file.flush().await.map_err(|e| self.io_err(e))?;

        inner.len += buf.len() as u64;
        for (k, slot) in slots {
            inner.insert(k, slot);
        }

        let dead = inner.len - inner.live;
        if dead > inner.live.max(COMPACT_FLOOR) {
            tracing::debug!("Compacting {} ({dead} bytes superseded)", self.path.display());
            let Inner {
                map,
                file,
                len,
                live,
            } = &mut *inner;
            let (compacted, written) = compact(&self.path, map)
                .await
                .map_err(|e| self.io_err(e))?;
            *file = compacted;
            *len = written;
            *live = written;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.file.set_len(0).await.map_err(|e| self.io_err(e))?;
        inner.map.clear();
        inner.len = 0;
        inner.live = 0;
        Ok(())
    }

    /// Bytes held by live records. Superseded records awaiting compaction are
    /// not counted.
    async fn size_in_use_bytes(&self) -> Result<u64, StoreError> {
        Ok(self.inner.read().await.live)
    }
}
