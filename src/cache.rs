use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::discovery::FileMetadata;
use crate::error::ScanError;
use crate::options::PluginOptions;

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    hash: String,
    metadata: FileMetadata,
}

/// On-disk cache of per-file scan results, keyed by source content and options.
#[derive(Debug, Clone)]
pub struct MetadataCache {
    cache_dir: PathBuf,
}

impl MetadataCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Result<Self, ScanError> {
        let cache_dir = cache_dir.into();
        fs::create_dir_all(&cache_dir).map_err(|e| ScanError::Cache {
            path: cache_dir.clone(),
            message: e.to_string(),
        })?;
        Ok(Self { cache_dir })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn compute_hash(source: &str, options: &PluginOptions) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        hasher.update([0u8]);
        hasher.update(options.fingerprint().as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn entry_path(&self, file_path: &str) -> PathBuf {
        let safe_name = file_path.replace(['/', '\\', ':'], "_");
        self.cache_dir.join(format!("{}.json", safe_name))
    }

    pub fn get(&self, file_path: &str, source: &str, options: &PluginOptions) -> Option<FileMetadata> {
        let entry_path = self.entry_path(file_path);
        let data = fs::read_to_string(&entry_path).ok()?;

        let entry: CacheEntry = match serde_json::from_str(&data) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(file = file_path, error = %e, "discarding corrupt cache entry");
                fs::remove_file(&entry_path).ok();
                return None;
            }
        };

        if entry.hash == Self::compute_hash(source, options) {
            tracing::debug!(file = file_path, "cache hit");
            Some(entry.metadata)
        } else {
            tracing::debug!(file = file_path, "cache stale");
            None
        }
    }

    pub fn set(
        &self,
        file_path: &str,
        source: &str,
        options: &PluginOptions,
        metadata: &FileMetadata,
    ) -> Result<(), ScanError> {
        let entry_path = self.entry_path(file_path);
        let entry = CacheEntry {
            hash: Self::compute_hash(source, options),
            metadata: metadata.clone(),
        };
        let to_cache_error = |message: String| ScanError::Cache {
            path: entry_path.clone(),
            message,
        };

        let data = serde_json::to_string(&entry).map_err(|e| to_cache_error(e.to_string()))?;
        fs::write(&entry_path, data).map_err(|e| to_cache_error(e.to_string()))
    }
}
