//! Configuration for a served folder.
//!
//! ```toml
//! root = "/srv/share"
//! realm = "share"
//!
//! [users]
//! alice = "wonderland"
//! ```

use crate::error::{FolderDavError, FolderDavResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Default realm name when none is configured.
pub const DEFAULT_REALM: &str = "folderdav";

fn default_realm() -> String {
    DEFAULT_REALM.to_string()
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FolderDavConfig {
    /// Directory to serve.
    pub root: PathBuf,
    /// Realm presented to clients when authentication is enabled.
    #[serde(default = "default_realm")]
    pub realm: String,
    /// User name to password. Empty means open access.
    #[serde(default)]
    pub users: BTreeMap<String, String>,
}

impl FolderDavConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            realm: default_realm(),
            users: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    #[must_use]
    pub fn with_user(mut self, name: impl Into<String>, password: impl Into<String>) -> Self {
        self.users.insert(name.into(), password.into());
        self
    }

    pub fn from_toml_str(s: &str) -> FolderDavResult<Self> {
        toml::from_str(s).map_err(|e| FolderDavError::Config(format!("invalid configuration: {e}")))
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: &Path) -> FolderDavResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            FolderDavError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> FolderDavResult<String> {
        toml::to_string(self)
            .map_err(|e| FolderDavError::Config(format!("cannot serialize configuration: {e}")))
    }

    pub fn requires_auth(&self) -> bool {
        !self.users.is_empty()
    }
}

impl fmt::Debug for FolderDavConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FolderDavConfig")
            .field("root", &self.root)
            .field("realm", &self.realm)
            .field("users", &self.users.keys().collect::<Vec<_>>())
            .finish()
    }
}
