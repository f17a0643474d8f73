//! Process-wide resource context.
//!
//! [`ResourceFactory`] owns the served root and the optional security
//! manager. Resources borrow it for path re-rooting and security delegation;
//! both values are fixed once the factory is built.

use crate::config::FolderDavConfig;
use crate::error::{FolderDavError, FolderDavResult};
use crate::folder::FolderResource;
use crate::paths::resolve_request_path;
use crate::resource::Resource;
use crate::security::{SecurityManager, SimpleSecurityManager};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Resolves request paths below a root directory into resources.
pub struct ResourceFactory {
    root: PathBuf,
    security: Option<Arc<dyn SecurityManager>>,
}

impl ResourceFactory {
    /// Create a factory serving `root` in open mode.
    ///
    /// The root is canonicalized and must be an existing directory.
    pub fn new(root: impl AsRef<Path>) -> FolderDavResult<Self> {
        let root = root.as_ref();
        let canonical = fs::canonicalize(root).map_err(|e| {
            FolderDavError::Config(format!(
                "root directory {} is not accessible: {e}",
                root.display()
            ))
        })?;
        if !canonical.is_dir() {
            return Err(FolderDavError::Config(format!(
                "root {} is not a directory",
                canonical.display()
            )));
        }

        info!(root = %canonical.display(), "Serving folder");
        Ok(Self {
            root: canonical,
            security: None,
        })
    }

    /// Build a factory from configuration.
    ///
    /// A [`SimpleSecurityManager`] is installed when any users are configured.
    pub fn from_config(config: &FolderDavConfig) -> FolderDavResult<Self> {
        let factory = Self::new(&config.root)?;
        if !config.requires_auth() {
            return Ok(factory);
        }

        let manager = config
            .users
            .iter()
            .fold(SimpleSecurityManager::new(&config.realm), |m, (name, password)| {
                m.with_user(name, password)
            });
        debug!(realm = %config.realm, users = manager.user_count(), "Authentication enabled");
        Ok(factory.with_security_manager(Arc::new(manager)))
    }

    #[must_use]
    pub fn with_security_manager(mut self, manager: Arc<dyn SecurityManager>) -> Self {
        self.security = Some(manager);
        self
    }

    /// The canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn security_manager(&self) -> Option<&dyn SecurityManager> {
        self.security.as_deref()
    }

    pub fn root_folder(&self) -> FolderResource<'_> {
        FolderResource::new(self.root.clone(), self)
    }

    /// Resolve a root-relative request path.
    ///
    /// Returns `Ok(None)` when nothing exists at the path, and an error when
    /// the path cannot be addressed below the root. `_host` is accepted for
    /// the protocol layer and not used for resolution.
    #[instrument(level = "debug", skip(self, _host))]
    pub fn resource(&self, _host: Option<&str>, url_path: &str) -> FolderDavResult<Option<Resource<'_>>> {
        let path = resolve_request_path(&self.root, url_path)?;
        Ok(Resource::from_path(path, self))
    }
}

impl fmt::Debug for ResourceFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceFactory")
            .field("root", &self.root)
            .field(
                "security",
                &self.security.as_ref().map(|m| m.realm().to_string()),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_canonicalizes_root() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("share")).unwrap();
        let factory = ResourceFactory::new(tmp.path().join("share/../share")).unwrap();
        assert_eq!(
            factory.root(),
            fs::canonicalize(tmp.path().join("share")).unwrap()
        );
        assert!(factory.security_manager().is_none());
    }

    #[test]
    fn test_new_rejects_missing_root() {
        let tmp = TempDir::new().unwrap();
        let err = ResourceFactory::new(tmp.path().join("missing")).unwrap_err();
        assert!(matches!(err, FolderDavError::Config(_)));
    }

    #[test]
    fn test_new_rejects_file_root() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("plain.txt");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(
            ResourceFactory::new(&file).unwrap_err(),
            FolderDavError::Config(_)
        ));
    }

    #[test]
    fn test_from_config_installs_security() {
        let tmp = TempDir::new().unwrap();
        let open = ResourceFactory::from_config(&FolderDavConfig::new(tmp.path())).unwrap();
        assert!(open.security_manager().is_none());

        let config = FolderDavConfig::new(tmp.path())
            .with_realm("share")
            .with_user("alice", "wonderland");
        let secured = ResourceFactory::from_config(&config).unwrap();
        let manager = secured.security_manager().unwrap();
        assert_eq!(manager.realm(), "share");
        assert!(manager.authenticate("alice", "wonderland").is_some());
    }

    #[test]
    fn test_debug_shows_root() {
        let tmp = TempDir::new().unwrap();
        let factory = ResourceFactory::new(tmp.path()).unwrap();
        assert!(format!("{factory:?}").contains("ResourceFactory"));
    }
}
