// # Disk Cache Store
//
// Disk-backed implementation of CacheStore.
//
// ## Purpose
//
// Persists cache partitions across process restarts, so a restarted client
// still serves static assets and locale data offline.
//
// ## Layout
//
// One JSON file per partition under a root directory:
//
// ```text
// <root>/static-v1.0.0.json
// <root>/dynamic-v1.0.0.json
// ```
//
// ## Crash Behavior
//
// - Atomic writes: new content goes to a `.tmp` file, then renamed over
// - Corruption detection: JSON validation on load
// - Recovery: a corrupted partition file degrades to an empty partition
//   (cache contents are re-fillable from the network, so there is no
//   backup file to restore from)

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, trace, warn};

use crate::Error;
use crate::traits::cache::CacheStore;
use crate::traits::network::{Request, Response};

/// Partition file format version, for future migration
const PARTITION_FILE_VERSION: &str = "1.0";

/// Serializable partition file format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PartitionFileFormat {
    version: String,
    entries: HashMap<String, Response>,
}

/// Disk-backed cache partition store
///
/// Partitions are mirrored in memory and written through on every put,
/// so reads never touch the disk after the initial load.
pub struct DiskCacheStore {
    root: PathBuf,
    partitions: Arc<RwLock<HashMap<String, HashMap<String, Response>>>>,
}

impl DiskCacheStore {
    /// Open a store rooted at a directory, loading existing partitions
    ///
    /// The directory is created if missing. A partition file that fails to
    /// parse is logged and treated as empty; the next put overwrites it.
    pub async fn new<P: AsRef<Path>>(root: P) -> Result<Self, Error> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            Error::cache(format!(
                "failed to create cache directory {}: {}",
                root.display(),
                e
            ))
        })?;

        let mut partitions = HashMap::new();
        let mut dir = fs::read_dir(&root)
            .await
            .map_err(|e| Error::cache(format!("failed to list {}: {}", root.display(), e)))?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| Error::cache(format!("failed to list {}: {}", root.display(), e)))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let entries = Self::load_partition(&path).await;
            debug!(partition = %name, entries = entries.len(), "loaded cache partition");
            partitions.insert(name.to_string(), entries);
        }

        Ok(Self {
            root,
            partitions: Arc::new(RwLock::new(partitions)),
        })
    }

    /// Load one partition file, degrading to empty on corruption
    async fn load_partition(path: &Path) -> HashMap<String, Response> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read partition file, starting empty");
                return HashMap::new();
            }
        };

        match serde_json::from_str::<PartitionFileFormat>(&content) {
            Ok(file) => {
                if file.version != PARTITION_FILE_VERSION {
                    warn!(
                        path = %path.display(),
                        expected = PARTITION_FILE_VERSION,
                        got = %file.version,
                        "partition file version mismatch, loading anyway"
                    );
                }
                file.entries
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "partition file corrupted, starting empty");
                HashMap::new()
            }
        }
    }

    /// Write one partition file atomically (write-then-rename)
    async fn write_partition(
        &self,
        name: &str,
        entries: &HashMap<String, Response>,
    ) -> Result<(), Error> {
        let file = PartitionFileFormat {
            version: PARTITION_FILE_VERSION.to_string(),
            entries: entries.clone(),
        };
        let json = serde_json::to_string(&file)
            .map_err(|e| Error::cache(format!("failed to serialize partition {}: {}", name, e)))?;

        let path = self.partition_path(name);
        let temp = self.temp_path(name);
        {
            let mut out = fs::File::create(&temp).await.map_err(|e| {
                Error::cache(format!("failed to create {}: {}", temp.display(), e))
            })?;
            out.write_all(json.as_bytes()).await.map_err(|e| {
                Error::cache(format!("failed to write {}: {}", temp.display(), e))
            })?;
            out.flush().await.map_err(|e| {
                Error::cache(format!("failed to flush {}: {}", temp.display(), e))
            })?;
        }

        fs::rename(&temp, &path).await.map_err(|e| {
            Error::cache(format!(
                "failed to rename {} to {}: {}",
                temp.display(),
                path.display(),
                e
            ))
        })?;

        trace!(partition = %name, "partition written");
        Ok(())
    }

    fn partition_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.json", name))
    }

    fn temp_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.json.tmp", name))
    }
}

#[async_trait]
impl CacheStore for DiskCacheStore {
    async fn open(&self, partition: &str) -> Result<(), Error> {
        let mut partitions = self.partitions.write().await;
        if !partitions.contains_key(partition) {
            partitions.insert(partition.to_string(), HashMap::new());
            self.write_partition(partition, &HashMap::new()).await?;
        }
        Ok(())
    }

    async fn match_in(&self, partition: &str, req: &Request) -> Result<Option<Response>, Error> {
        let partitions = self.partitions.read().await;
        Ok(partitions
            .get(partition)
            .and_then(|p| p.get(&req.identity()))
            .cloned())
    }

    async fn match_any(&self, req: &Request) -> Result<Option<Response>, Error> {
        let identity = req.identity();
        let partitions = self.partitions.read().await;
        Ok(partitions
            .values()
            .find_map(|p| p.get(&identity))
            .cloned())
    }

    async fn put(&self, partition: &str, req: &Request, resp: &Response) -> Result<(), Error> {
        let mut partitions = self.partitions.write().await;
        let entries = partitions.entry(partition.to_string()).or_default();
        entries.insert(req.identity(), resp.clone());
        let entries = entries.clone();
        // Write-through while still holding the lock keeps the file and
        // the mirror consistent under concurrent puts.
        self.write_partition(partition, &entries).await
    }

    async fn delete_partition(&self, partition: &str) -> Result<bool, Error> {
        let mut partitions = self.partitions.write().await;
        let existed = partitions.remove(partition).is_some();

        let path = self.partition_path(partition);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(existed),
            Err(e) => Err(Error::cache(format!(
                "failed to delete {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn list_partitions(&self) -> Result<Vec<String>, Error> {
        let partitions = self.partitions.read().await;
        Ok(partitions.keys().cloned().collect())
    }
}

impl std::fmt::Debug for DiskCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskCacheStore")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}
