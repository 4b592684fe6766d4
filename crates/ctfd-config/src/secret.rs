//! Persistent secret key provisioning
//!
//! The secret is read from a file; when the file is missing, unreadable or
//! empty a fresh random key is generated and written back. Failing to persist
//! only costs stability across restarts, so I/O errors never surface.

use std::fmt;
use std::path::{Path, PathBuf};

use rand::rngs::OsRng;
use rand::RngCore;

/// Length of a generated secret key in bytes
pub const SECRET_KEY_LEN: usize = 64;

/// Default secret file, relative to the working directory
pub const DEFAULT_SECRET_FILE: &str = ".ctfd_secret_key";

/// Secret key bytes. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    /// Generate a key from the operating system's CSPRNG
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; SECRET_KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecretKey").field(&"[REDACTED]").finish()
    }
}

impl From<Vec<u8>> for SecretKey {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<String> for SecretKey {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

/// Obtains the secret key from a fixed file location
#[derive(Debug, Clone)]
pub struct SecretProvisioner {
    path: PathBuf,
}

impl Default for SecretProvisioner {
    fn default() -> Self {
        Self::new(DEFAULT_SECRET_FILE)
    }
}

impl SecretProvisioner {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted key, or generate and try to persist a new one
    pub fn obtain(&self) -> SecretKey {
        if let Some(existing) = self.read() {
            return existing;
        }

        let key = SecretKey::generate();
        match std::fs::write(&self.path, key.as_bytes()) {
            Ok(()) => log::info!("Generated new secret key at {}", self.path.display()),
            Err(e) => log::warn!(
                "Could not persist secret key to {}: {}; it will change on restart",
                self.path.display(),
                e
            ),
        }
        key
    }

    fn read(&self) -> Option<SecretKey> {
        match std::fs::read(&self.path) {
            Ok(bytes) if !bytes.is_empty() => Some(SecretKey(bytes)),
            Ok(_) => {
                log::debug!("Secret key file {} is empty", self.path.display());
                None
            }
            Err(e) => {
                log::debug!("No secret key at {}: {}", self.path.display(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generate_length() {
        let key = SecretKey::generate();
        assert_eq!(key.len(), SECRET_KEY_LEN);
        assert_ne!(key, SecretKey::generate());
    }

    #[test]
    fn test_stable_across_calls() {
        let dir = TempDir::new().unwrap();
        let provisioner = SecretProvisioner::new(dir.path().join(".ctfd_secret_key"));

        let first = provisioner.obtain();
        let second = provisioner.obtain();

        assert_eq!(first.len(), SECRET_KEY_LEN);
        assert_eq!(first, second);
        assert_eq!(
            std::fs::read(provisioner.path()).unwrap(),
            first.as_bytes().to_vec()
        );
    }

    #[test]
    fn test_existing_file_is_used_verbatim() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secret");
        std::fs::write(&path, b"short-but-present").unwrap();

        let key = SecretProvisioner::new(&path).obtain();
        assert_eq!(key.as_bytes(), b"short-but-present");
    }

    #[test]
    fn test_empty_file_is_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secret");
        std::fs::write(&path, b"").unwrap();

        let key = SecretProvisioner::new(&path).obtain();
        assert_eq!(key.len(), SECRET_KEY_LEN);
        assert_eq!(std::fs::read(&path).unwrap().len(), SECRET_KEY_LEN);
    }

    #[test]
    fn test_unwritable_location_still_yields_keys() {
        let dir = TempDir::new().unwrap();
        let provisioner = SecretProvisioner::new(dir.path().join("missing-dir").join("secret"));

        let first = provisioner.obtain();
        let second = provisioner.obtain();

        assert_eq!(first.len(), SECRET_KEY_LEN);
        assert_eq!(second.len(), SECRET_KEY_LEN);
        assert!(!provisioner.path().exists());
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = SecretKey::from("hunter2".to_string());
        assert_eq!(format!("{:?}", key), "SecretKey(\"[REDACTED]\")");
    }
}
