//! Advisory entitlement cache.
//!
//! Mirrors the last `{ token, expires_at }` pair the server confirmed.
//! Read optimistically at startup so the UI does not flash locked
//! content while the first server check is in flight; discarded the
//! moment the server disagrees or the local clock says expired. The
//! server-side token store is always authoritative.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use adgate_core::types::Timestamp;

use crate::error::Result;

/// File name under the storage directory.
const CACHE_FILE: &str = "entitlement.json";

/// The last server-confirmed entitlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedEntitlement {
    pub token: String,
    pub expires_at: Timestamp,
}

/// File-backed store for the cached entitlement.
#[derive(Debug, Clone)]
pub struct EntitlementCache {
    path: PathBuf,
}

impl EntitlementCache {
    /// Create a cache rooted in the given storage directory.
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(CACHE_FILE),
        }
    }

    /// Load the cached entitlement, if present, fresh, and well-formed.
    ///
    /// Expired or unreadable entries are deleted on sight.
    pub fn load(&self) -> Option<CachedEntitlement> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<CachedEntitlement>(&raw) {
            Ok(cached) if cached.expires_at > Utc::now() => Some(cached),
            Ok(_) => {
                self.clear();
                None
            }
            Err(_) => {
                tracing::warn!("Entitlement cache is corrupt, clearing");
                self.clear();
                None
            }
        }
    }

    /// Persist a server-confirmed entitlement.
    pub fn save(&self, entitlement: &CachedEntitlement) -> Result<()> {
        fs::write(&self.path, serde_json::to_string(entitlement)?)?;
        Ok(())
    }

    /// Remove the cache file. A missing file is fine.
    pub fn clear(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(error = %e, "Failed to clear entitlement cache");
            }
        }
    }
}
