//! The resource contract shared by folders and files.

use crate::error::FolderDavResult;
use crate::factory::ResourceFactory;
use crate::file::FileResource;
use crate::folder::FolderResource;
use crate::request::{Auth, Method, Principal, Request};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Metadata and access-control surface every resource exposes.
pub trait DavResource {
    /// Stable identifier (the absolute filesystem path).
    fn unique_id(&self) -> String;

    /// Display name.
    fn name(&self) -> String;

    /// Protection realm this resource belongs to.
    fn realm(&self) -> String;

    fn modified_date(&self) -> SystemTime;

    fn create_date(&self) -> Option<SystemTime>;

    /// Content type for a response, given the client's `Accept` header.
    fn content_type(&self, accepts: Option<&str>) -> Option<String>;

    fn content_length(&self) -> Option<u64>;

    /// How long clients may cache the resource for.
    fn max_age_seconds(&self, auth: Option<&Auth>) -> Option<u64>;

    fn authenticate(&self, user: &str, password: &str) -> Option<Principal>;

    fn authorise(&self, request: &Request, method: Method, auth: Option<&Auth>) -> bool;

    /// Redirect target for `request`, if the resource lives elsewhere.
    fn check_redirect(&self, request: &Request) -> Option<String>;

    fn is_collection(&self) -> bool;
}

/// A resource that contains other resources.
pub trait CollectionResource<'f>: DavResource {
    /// Look up a direct child by name. Missing children are `None`.
    fn child(&self, name: &str) -> Option<Resource<'f>>;

    /// All direct children in filesystem enumeration order.
    fn children(&self) -> FolderDavResult<Vec<Resource<'f>>>;
}

/// A folder or a file below the factory root.
#[derive(Debug, Clone)]
pub enum Resource<'f> {
    Folder(FolderResource<'f>),
    File(FileResource<'f>),
}

impl<'f> Resource<'f> {
    /// Build the resource for an existing entry, or `None` if nothing is there.
    pub(crate) fn from_path(path: PathBuf, factory: &'f ResourceFactory) -> Option<Self> {
        match fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => Some(Resource::Folder(FolderResource::new(path, factory))),
            Ok(_) => Some(Resource::File(FileResource::new(path, factory))),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No resource at path");
                None
            }
        }
    }

    /// Build the resource for a directory entry that was just enumerated.
    ///
    /// Entries whose type can no longer be read (dangling links, races with
    /// deletion) are reported as files.
    pub(crate) fn from_entry(path: PathBuf, factory: &'f ResourceFactory) -> Self {
        if fs::metadata(&path).is_ok_and(|m| m.is_dir()) {
            Resource::Folder(FolderResource::new(path, factory))
        } else {
            Resource::File(FileResource::new(path, factory))
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Resource::Folder(folder) => folder.path(),
            Resource::File(file) => file.path(),
        }
    }

    pub fn as_folder(&self) -> Option<&FolderResource<'f>> {
        match self {
            Resource::Folder(folder) => Some(folder),
            Resource::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileResource<'f>> {
        match self {
            Resource::File(file) => Some(file),
            Resource::Folder(_) => None,
        }
    }

    pub fn into_folder(self) -> Option<FolderResource<'f>> {
        match self {
            Resource::Folder(folder) => Some(folder),
            Resource::File(_) => None,
        }
    }

    pub fn into_file(self) -> Option<FileResource<'f>> {
        match self {
            Resource::File(file) => Some(file),
            Resource::Folder(_) => None,
        }
    }

    fn inner(&self) -> &dyn DavResource {
        match self {
            Resource::Folder(folder) => folder as &dyn DavResource,
            Resource::File(file) => file as &dyn DavResource,
        }
    }
}

impl DavResource for Resource<'_> {
    fn unique_id(&self) -> String {
        self.inner().unique_id()
    }

    fn name(&self) -> String {
        self.inner().name()
    }

    fn realm(&self) -> String {
        self.inner().realm()
    }

    fn modified_date(&self) -> SystemTime {
        self.inner().modified_date()
    }

    fn create_date(&self) -> Option<SystemTime> {
        self.inner().create_date()
    }

    fn content_type(&self, accepts: Option<&str>) -> Option<String> {
        self.inner().content_type(accepts)
    }

    fn content_length(&self) -> Option<u64> {
        self.inner().content_length()
    }

    fn max_age_seconds(&self, auth: Option<&Auth>) -> Option<u64> {
        self.inner().max_age_seconds(auth)
    }

    fn authenticate(&self, user: &str, password: &str) -> Option<Principal> {
        self.inner().authenticate(user, password)
    }

    fn authorise(&self, request: &Request, method: Method, auth: Option<&Auth>) -> bool {
        self.inner().authorise(request, method, auth)
    }

    fn check_redirect(&self, request: &Request) -> Option<String> {
        self.inner().check_redirect(request)
    }

    fn is_collection(&self) -> bool {
        self.inner().is_collection()
    }
}

/// A filesystem path bound to the factory that produced it.
///
/// Holds the identity and security plumbing common to both resource kinds.
#[derive(Debug, Clone)]
pub(crate) struct PathBinding<'f> {
    pub(crate) path: PathBuf,
    pub(crate) factory: &'f ResourceFactory,
}

impl<'f> PathBinding<'f> {
    pub(crate) fn new(path: PathBuf, factory: &'f ResourceFactory) -> Self {
        Self { path, factory }
    }

    pub(crate) fn absolute_path_string(&self) -> String {
        std::path::absolute(&self.path)
            .unwrap_or_else(|_| self.path.clone())
            .display()
            .to_string()
    }

    pub(crate) fn display_name(&self) -> String {
        self.path.display().to_string()
    }

    pub(crate) fn root_relative(&self) -> String {
        crate::paths::root_relative(self.factory.root(), &self.path)
    }

    pub(crate) fn modified(&self) -> SystemTime {
        fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH)
    }

    pub(crate) fn authenticate(&self, user: &str, password: &str) -> Option<Principal> {
        debug!(user = %user, path = %self.path.display(), "Authenticating user");
        match self.factory.security_manager() {
            Some(manager) => manager.authenticate(user, password),
            None => Some(Principal::new(user)),
        }
    }

    pub(crate) fn authorise(
        &self,
        request: &Request,
        method: Method,
        auth: Option<&Auth>,
        target: &dyn DavResource,
    ) -> bool {
        if let Some(user) = auth.and_then(|a| a.user.as_deref()) {
            debug!(user = %user, path = %self.path.display(), "Authorising user");
        }
        self.factory
            .security_manager()
            .is_none_or(|manager| manager.authorise(request, method, auth, target))
    }
}
