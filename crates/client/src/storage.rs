use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{debug, warn};

/// Key under which the last chosen page size is remembered.
pub const PAGE_SIZE_KEY: &str = "pageSize";

/// String key/value store backed by a JSON object file.
///
/// No operation fails loudly: reads of a missing or corrupt file behave as
/// empty, and writes report success as a `bool`.
#[derive(Debug, Clone)]
pub struct SafeStorage {
    path: PathBuf,
}

impl SafeStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.read().remove(key)
    }

    pub fn set_item(&self, key: &str, value: &str) -> bool {
        let mut items = self.read();
        items.insert(key.to_string(), value.to_string());
        self.write(&items)
    }

    pub fn remove_item(&self, key: &str) -> bool {
        let mut items = self.read();
        if items.remove(key).is_none() {
            return true;
        }
        self.write(&items)
    }

    pub fn clear(&self) -> bool {
        match std::fs::remove_file(&self.path) {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "storage clear failed");
                false
            }
        }
    }

    fn read(&self) -> BTreeMap<String, String> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    debug!(path = %self.path.display(), error = %e, "storage unreadable");
                }
                return BTreeMap::new();
            }
        };
        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            debug!(path = %self.path.display(), error = %e, "storage corrupt; treating as empty");
            BTreeMap::new()
        })
    }

    fn write(&self, items: &BTreeMap<String, String>) -> bool {
        let result = (|| -> std::io::Result<()> {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let bytes = serde_json::to_vec_pretty(items)?;
            std::fs::write(&self.path, bytes)
        })();
        if let Err(e) = &result {
            warn!(path = %self.path.display(), error = %e, "storage write failed");
        }
        result.is_ok()
    }
}
