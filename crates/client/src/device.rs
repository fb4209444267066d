//! Persistent per-installation device identity.

use std::fs;
use std::path::Path;

use adgate_core::device::{generate_device_id, is_valid_device_id};

use crate::error::Result;

/// File name under the storage directory.
const DEVICE_ID_FILE: &str = "device_id";

/// The stable identifier binding tokens to this installation.
#[derive(Debug, Clone)]
pub struct DeviceIdentity {
    id: String,
}

impl DeviceIdentity {
    /// Load the persisted device id, or generate and persist a new one.
    ///
    /// A stored value that fails the format check is discarded and
    /// replaced; otherwise the id is stable across sessions.
    pub fn load_or_create(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(DEVICE_ID_FILE);

        if let Ok(existing) = fs::read_to_string(&path) {
            let existing = existing.trim().to_string();
            if is_valid_device_id(&existing) {
                return Ok(Self { id: existing });
            }
            tracing::warn!("Stored device id is malformed, regenerating");
        }

        let id = generate_device_id();
        fs::write(&path, &id)?;
        tracing::info!(device_id = %id, "Generated new device id");
        Ok(Self { id })
    }

    /// The device id as a 32-char lowercase hex string.
    pub fn id(&self) -> &str {
        &self.id
    }
}
