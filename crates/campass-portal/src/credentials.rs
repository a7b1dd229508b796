//! Credential model and file-backed store.
//!
//! The credential file is written only after a successful password login,
//! at which point the password field holds the marker-prefixed ciphertext.
//! Replaying it through the login flow works because the cipher never
//! encrypts twice.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::crypto::CIPHERTEXT_MARKER;
use crate::error::{PortalError, PortalResult};

/// A portal account credential.
///
/// `password` is plaintext before the first login and ciphertext afterwards;
/// `student_id` is scraped from the portal greeting on a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
}

impl Credential {
    /// Creates a credential from a username and (plaintext or sealed)
    /// password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            student_id: None,
        }
    }

    /// Returns true if the password already carries the ciphertext marker.
    pub fn is_encrypted(&self) -> bool {
        self.password.starts_with(CIPHERTEXT_MARKER)
    }
}

/// File-backed credential persistence.
#[derive(Debug)]
pub struct CredentialStore {
    /// Path to the credential file.
    path: PathBuf,
}

impl CredentialStore {
    /// Creates a store backed by the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the stored credential, if the file exists.
    pub fn load(&self) -> PortalResult<Option<Credential>> {
        if !self.path.exists() {
            debug!("no credential file at {:?}", self.path);
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            PortalError::configuration(format!("failed to read credential file: {}", e))
        })?;

        let credential: Credential = serde_json::from_str(&content).map_err(|e| {
            PortalError::configuration(format!("failed to parse credential file: {}", e))
        })?;

        debug!("loaded credential from {:?}", self.path);
        Ok(Some(credential))
    }

    /// Saves a credential to disk.
    pub fn save(&self, credential: &Credential) -> PortalResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                PortalError::configuration(format!("failed to create credential directory: {}", e))
            })?;
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(credential).map_err(|e| {
            PortalError::internal(format!("failed to serialize credential: {}", e))
        })?;

        fs::write(&temp_path, &content).map_err(|e| {
            PortalError::configuration(format!("failed to write credential file: {}", e))
        })?;

        fs::rename(&temp_path, &self.path).map_err(|e| {
            PortalError::configuration(format!("failed to rename credential file: {}", e))
        })?;

        // Set restrictive permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            let _ = fs::set_permissions(&self.path, perms);
        }

        info!("saved credential to {:?}", self.path);
        Ok(())
    }

    /// Removes the credential file if present.
    pub fn clear(&self) -> PortalResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                PortalError::configuration(format!("failed to remove credential file: {}", e))
            })?;
            info!("cleared credential at {:?}", self.path);
        }
        Ok(())
    }

    /// Returns the credential file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
