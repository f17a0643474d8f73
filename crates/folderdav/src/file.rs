//! File-backed leaf resource.

use crate::error::{FolderDavError, FolderDavResult, OpContext};
use crate::factory::ResourceFactory;
use crate::paths::rerooted_destination;
use crate::request::{Auth, Method, Principal, Request};
use crate::resource::{CollectionResource, DavResource, PathBinding};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, error, instrument};

/// A regular filesystem file exposed as a WebDAV leaf resource.
///
/// Content is always served whole; range handling belongs to the protocol
/// layer.
#[derive(Debug, Clone)]
pub struct FileResource<'f> {
    binding: PathBinding<'f>,
}

impl<'f> FileResource<'f> {
    pub fn new(path: impl Into<PathBuf>, factory: &'f ResourceFactory) -> Self {
        Self {
            binding: PathBinding::new(path.into(), factory),
        }
    }

    pub fn path(&self) -> &Path {
        &self.binding.path
    }

    pub fn root_relative_path(&self) -> String {
        self.binding.root_relative()
    }

    fn fault(&self, operation: &'static str, e: io::Error) -> FolderDavError {
        error!(path = %self.path().display(), operation, error = %e, "File operation failed");
        FolderDavError::io(e, OpContext::new().with_operation(operation).with_path(self.path()))
    }

    /// Stream the whole file into `out`, then flush and drop it.
    #[instrument(level = "debug", skip(self, out), fields(path = %self.path().display()))]
    pub fn send_content<W: Write>(&self, mut out: W) -> FolderDavResult<u64> {
        let copy = |out: &mut W| -> io::Result<u64> {
            let mut file = File::open(self.path())?;
            let sent = io::copy(&mut file, out)?;
            out.flush()?;
            Ok(sent)
        };
        copy(&mut out).map_err(|e| self.fault("read", e))
    }

    /// Replace the file's content with everything read from `content`.
    #[instrument(level = "debug", skip(self, content), fields(path = %self.path().display()))]
    pub fn replace_content<R: Read>(
        &self,
        mut content: R,
        length: Option<u64>,
    ) -> FolderDavResult<()> {
        let mut write = || -> io::Result<u64> {
            let mut out = File::create(self.path())?;
            let written = io::copy(&mut content, &mut out)?;
            out.flush()?;
            Ok(written)
        };
        let written = write().map_err(|e| self.fault("write", e))?;
        debug!(written, expected = ?length, "Replaced file content");
        Ok(())
    }

    /// Copy the file to `<root>/<destination name>/<new_name>`.
    #[instrument(level = "debug", skip(self, destination), fields(path = %self.path().display()))]
    pub fn copy_to(
        &self,
        destination: &dyn CollectionResource<'_>,
        new_name: &str,
    ) -> FolderDavResult<()> {
        let target =
            rerooted_destination(self.binding.factory.root(), &destination.name(), new_name)?;
        debug!(to = %target.display(), "Copying file");
        fs::copy(self.path(), &target)
            .map(|_| ())
            .map_err(|e| self.fault("copy", e))
    }

    /// Move the file to `<root>/<destination name>/<new_name>`.
    #[instrument(level = "debug", skip(self, destination), fields(path = %self.path().display()))]
    pub fn move_to(
        &self,
        destination: &dyn CollectionResource<'_>,
        new_name: &str,
    ) -> FolderDavResult<()> {
        let target =
            rerooted_destination(self.binding.factory.root(), &destination.name(), new_name)?;
        debug!(to = %target.display(), "Moving file");
        fs::rename(self.path(), &target).map_err(|e| self.fault("move", e))
    }

    #[instrument(level = "debug", skip(self), fields(path = %self.path().display()))]
    pub fn delete(&self) -> FolderDavResult<()> {
        debug!("Deleting file");
        fs::remove_file(self.path()).map_err(|e| self.fault("delete", e))
    }
}

impl DavResource for FileResource<'_> {
    fn unique_id(&self) -> String {
        self.binding.absolute_path_string()
    }

    fn name(&self) -> String {
        self.binding.display_name()
    }

    fn realm(&self) -> String {
        self.binding.absolute_path_string()
    }

    fn modified_date(&self) -> SystemTime {
        self.binding.modified()
    }

    fn create_date(&self) -> Option<SystemTime> {
        None
    }

    fn content_type(&self, _accepts: Option<&str>) -> Option<String> {
        None
    }

    fn content_length(&self) -> Option<u64> {
        fs::metadata(self.path()).ok().map(|m| m.len())
    }

    fn max_age_seconds(&self, _auth: Option<&Auth>) -> Option<u64> {
        None
    }

    fn authenticate(&self, user: &str, password: &str) -> Option<Principal> {
        self.binding.authenticate(user, password)
    }

    fn authorise(&self, request: &Request, method: Method, auth: Option<&Auth>) -> bool {
        self.binding.authorise(request, method, auth, self)
    }

    fn check_redirect(&self, _request: &Request) -> Option<String> {
        None
    }

    fn is_collection(&self) -> bool {
        false
    }
}
