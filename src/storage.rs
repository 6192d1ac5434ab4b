use crate::errors::AppError;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use tokio::fs;
use tracing::error;

pub const KEY_XP: &str = "wellnessXP";
pub const KEY_LEVEL: &str = "wellnessLevel";
pub const KEY_DROPLETS: &str = "wellnessDroplets";
pub const KEY_COMPLETED_TODAY: &str = "completedToday";
pub const KEY_LAST_DATE: &str = "lastDate";
pub const KEY_MATRIX_TASKS: &str = "matrixTasks";

/// Durable string key-value map, stored as a single JSON object on disk.
#[derive(Debug, Clone)]
pub struct KvStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl KvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Reads the store at `path`. A missing or corrupt file yields an empty store.
    pub async fn open(path: &Path) -> Self {
        let entries = match fs::read(path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entries) => entries,
                Err(err) => {
                    error!("failed to parse data file: {err}");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                error!("failed to read data file: {err}");
                BTreeMap::new()
            }
        };

        Self {
            path: path.to_path_buf(),
            entries,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.to_string(), value.into());
    }

    pub async fn persist(&self) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let payload = serde_json::to_vec_pretty(&self.entries)?;
        fs::write(&self.path, payload).await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn temp_path(label: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("wellness_{label}_{}_{nanos}.json", std::process::id()));
    path
}
