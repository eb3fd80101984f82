/// File-backed key-value store
use crate::{
    error::{CredsError, CredsResult},
    storage::KeyValueStore,
};
use async_trait::async_trait;
use lazy_static::lazy_static;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

lazy_static! {
    /// One write lock per store file, shared by every `FileStore` on that path
    static ref PATH_LOCKS: std::sync::Mutex<HashMap<PathBuf, Arc<Mutex<()>>>> =
        std::sync::Mutex::new(HashMap::new());
}

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

fn lock_for(path: &Path) -> Arc<Mutex<()>> {
    let key = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|dir| dir.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut locks = PATH_LOCKS.lock().unwrap_or_else(|e| e.into_inner());
    Arc::clone(locks.entry(key).or_default())
}

/// File storage backend
///
/// Keeps every entry in a single JSON object on disk, the same shape a
/// browser's local storage has. Writes replace the file through a temporary
/// sibling so readers never see a half-written file. Stores opened on the
/// same path share one write lock, so writes to different keys never drop
/// each other's entries.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles on this path within the process
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    /// Create a store backed by `path`; the file is created on first write
    pub fn new(path: PathBuf) -> Self {
        Self {
            write_lock: lock_for(&path),
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(
            ".{}.{}.tmp",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        self.path.with_file_name(name)
    }

    async fn read_raw(&self) -> CredsResult<Option<Vec<u8>>> {
        match fs::read(&self.path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CredsError::Storage(format!(
                "Failed to read store file {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn parse_entries(&self, data: &[u8]) -> CredsResult<BTreeMap<String, String>> {
        serde_json::from_slice(data).map_err(|e| {
            CredsError::Storage(format!("Corrupt store file {}: {}", self.path.display(), e))
        })
    }

    async fn write_entries(&self, entries: &BTreeMap<String, String>) -> CredsResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    CredsError::Storage(format!("Failed to create store directory: {}", e))
                })?;
            }
        }

        let data = serde_json::to_vec_pretty(entries)?;
        let tmp_path = self.tmp_path();

        fs::write(&tmp_path, data).await.map_err(|e| {
            CredsError::Storage(format!("Failed to write {}: {}", tmp_path.display(), e))
        })?;
        if let Err(e) = fs::rename(&tmp_path, &self.path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(CredsError::Storage(format!(
                "Failed to replace store file {}: {}",
                self.path.display(),
                e
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> CredsResult<Option<String>> {
        match self.read_raw().await? {
            Some(data) => Ok(self.parse_entries(&data)?.get(key).cloned()),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> CredsResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut entries = match self.read_raw().await? {
            Some(data) => self.parse_entries(&data).unwrap_or_else(|e| {
                // Unparseable file: start over rather than refuse every write
                warn!("{}; resetting store", e);
                BTreeMap::new()
            }),
            None => BTreeMap::new(),
        };

        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries).await?;

        debug!("Stored {} in {}", key, self.path.display());
        Ok(())
    }
}
