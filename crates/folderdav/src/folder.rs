//! Directory-backed collection resource.
//!
//! A [`FolderResource`] is a stateless view of one directory for the duration
//! of a single operation. Children are read from disk on every call and are
//! never cached, so a listing always reflects the current directory state.

use crate::error::{FolderDavError, FolderDavResult, OpContext};
use crate::factory::ResourceFactory;
use crate::file::FileResource;
use crate::paths::{encode_href, is_plain_segment, rerooted_destination, root_relative};
use crate::request::{Auth, Method, Principal, Request};
use crate::resource::{CollectionResource, DavResource, PathBinding, Resource};
use crate::tree;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, error, instrument, trace};

/// A filesystem directory exposed as a WebDAV collection.
#[derive(Debug, Clone)]
pub struct FolderResource<'f> {
    binding: PathBinding<'f>,
}

impl<'f> FolderResource<'f> {
    /// Bind a directory path. The path is not checked for directory-ness.
    pub fn new(path: impl Into<PathBuf>, factory: &'f ResourceFactory) -> Self {
        Self {
            binding: PathBinding::new(path.into(), factory),
        }
    }

    pub fn path(&self) -> &Path {
        &self.binding.path
    }

    /// `/`-prefixed path of this folder relative to the factory root.
    pub fn root_relative_path(&self) -> String {
        self.binding.root_relative()
    }

    fn factory(&self) -> &'f ResourceFactory {
        self.binding.factory
    }

    /// Enumerate entry paths. The directory handle is dropped on every return.
    fn entry_paths(&self) -> FolderDavResult<Vec<PathBuf>> {
        let fail = |e: io::Error| {
            error!(path = %self.path().display(), error = %e, "Error listing directory");
            FolderDavError::io(e, OpContext::new().with_operation("list").with_path(self.path()))
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(self.path()).map_err(fail)? {
            paths.push(entry.map_err(fail)?.path());
        }
        Ok(paths)
    }

    /// Copy this folder's tree to `<root>/<destination name>/<new_name>`.
    #[instrument(level = "debug", skip(self, destination), fields(path = %self.path().display()))]
    pub fn copy_to(
        &self,
        destination: &dyn CollectionResource<'_>,
        new_name: &str,
    ) -> FolderDavResult<()> {
        let collection = destination.name();
        debug!(to = %collection, name = %new_name, "Copying folder");

        let target = rerooted_destination(self.factory().root(), &collection, new_name)?;
        tree::copy_tree(self.path(), &target).map_err(|e| {
            error!(path = %self.path().display(), to = %target.display(), error = %e, "Error copying folder");
            FolderDavError::io(
                e,
                OpContext::new()
                    .with_operation("copy")
                    .with_path(self.path())
                    .with_destination(&target),
            )
        })
    }

    /// Move this folder's tree to `<root>/<destination name>/<new_name>`.
    #[instrument(level = "debug", skip(self, destination), fields(path = %self.path().display()))]
    pub fn move_to(
        &self,
        destination: &dyn CollectionResource<'_>,
        new_name: &str,
    ) -> FolderDavResult<()> {
        let collection = destination.name();
        debug!(to = %collection, name = %new_name, "Moving folder");

        let target = rerooted_destination(self.factory().root(), &collection, new_name)?;
        tree::move_tree(self.path(), &target).map_err(|e| {
            error!(path = %self.path().display(), to = %target.display(), error = %e, "Error moving folder");
            FolderDavError::io(
                e,
                OpContext::new()
                    .with_operation("move")
                    .with_path(self.path())
                    .with_destination(&target),
            )
        })
    }

    /// Remove the directory. Only empty directories can be removed.
    #[instrument(level = "debug", skip(self), fields(path = %self.path().display()))]
    pub fn delete(&self) -> FolderDavResult<()> {
        debug!("Deleting folder");
        fs::remove_dir(self.path()).map_err(|e| {
            error!(path = %self.path().display(), error = %e, "Error deleting folder");
            FolderDavError::io(e, OpContext::new().with_operation("delete").with_path(self.path()))
        })
    }

    /// Write an HTML index of the folder's direct children to `out`.
    ///
    /// The listing is read before anything is written, so a failed listing
    /// leaves `out` untouched. `out` is flushed and dropped before returning.
    #[instrument(level = "debug", skip(self, out, params), fields(path = %self.path().display()))]
    pub fn send_content<W: Write>(
        &self,
        out: W,
        params: &HashMap<String, String>,
    ) -> FolderDavResult<()> {
        trace!(params = params.len(), "Rendering folder index");
        let entries = self.entry_paths()?;
        let root = self.factory().root();
        let title = escape_html(&self.root_relative_path()).into_owned();

        let render = |out: W| -> io::Result<()> {
            let mut w = BufWriter::new(out);
            writeln!(w, "<html><head><title>Folder listing for {title}</title></head>")?;
            writeln!(w, "<body>")?;
            writeln!(w, "<h1>Folder listing for {title}</h1>")?;
            writeln!(w, "<ul>")?;
            for entry in &entries {
                let href = encode_href(&root_relative(root, entry));
                let label = entry
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                writeln!(
                    w,
                    "<li><a href=\"{}\">{}</a></li>",
                    escape_html(&href),
                    escape_html(&label)
                )?;
            }
            writeln!(w, "</ul></body></html>")?;
            w.flush()
        };

        render(out).map_err(|e| {
            error!(path = %self.path().display(), error = %e, "Error writing folder index");
            FolderDavError::io(e, OpContext::new().with_operation("index").with_path(self.path()))
        })
    }

    /// Create subfolder `new_name`, reporting any failure as `None`.
    ///
    /// See [`try_create_collection`](Self::try_create_collection) for the
    /// variant that returns the error.
    pub fn create_collection(&self, new_name: &str) -> Option<FolderResource<'f>> {
        match self.try_create_collection(new_name) {
            Ok(folder) => Some(folder),
            Err(e) => {
                debug!(path = %self.path().display(), name = %new_name, error = %e, "Subfolder not created");
                None
            }
        }
    }

    /// Create subfolder `new_name`.
    #[instrument(level = "debug", skip(self), fields(path = %self.path().display()))]
    pub fn try_create_collection(&self, new_name: &str) -> FolderDavResult<FolderResource<'f>> {
        if !is_plain_segment(new_name) {
            return Err(FolderDavError::invalid_path(
                new_name,
                "folder name must be a single path segment",
            ));
        }

        let subfolder = self.path().join(new_name);
        fs::create_dir(&subfolder).map_err(|e| {
            error!(subfolder = %subfolder.display(), error = %e, "Error creating folder");
            FolderDavError::io(e, OpContext::new().with_operation("mkcol").with_path(&subfolder))
        })?;
        debug!(subfolder = %subfolder.display(), "Created folder");
        Ok(FolderResource::new(subfolder, self.factory()))
    }

    /// Create file `new_name` and fill it from `content`.
    ///
    /// `length` and `content_type` are accepted for the protocol layer's
    /// benefit and are not checked against the stream.
    #[instrument(level = "debug", skip(self, content), fields(path = %self.path().display()))]
    pub fn create_new<R: Read>(
        &self,
        new_name: &str,
        mut content: R,
        length: Option<u64>,
        content_type: Option<&str>,
    ) -> FolderDavResult<FileResource<'f>> {
        if !is_plain_segment(new_name) {
            return Err(FolderDavError::invalid_path(
                new_name,
                "file name must be a single path segment",
            ));
        }

        let new_file = self.path().join(new_name);
        let mut write = || -> io::Result<u64> {
            let mut out = File::create(&new_file)?;
            let written = io::copy(&mut content, &mut out)?;
            out.flush()?;
            Ok(written)
        };

        match write() {
            Ok(written) => {
                debug!(file = %new_file.display(), written, "Created file");
                Ok(FileResource::new(new_file, self.factory()))
            }
            Err(e) => {
                error!(file = %new_file.display(), error = %e, "Error creating file");
                Err(FolderDavError::io(
                    e,
                    OpContext::new().with_operation("create").with_path(&new_file),
                ))
            }
        }
    }
}

impl<'f> CollectionResource<'f> for FolderResource<'f> {
    fn child(&self, name: &str) -> Option<Resource<'f>> {
        debug!(child = %name, path = %self.path().display(), "Getting child");
        if !is_plain_segment(name) {
            return None;
        }
        Resource::from_path(self.path().join(name), self.factory())
    }

    fn children(&self) -> FolderDavResult<Vec<Resource<'f>>> {
        debug!(path = %self.path().display(), "Getting children");
        let factory = self.factory();
        Ok(self
            .entry_paths()?
            .into_iter()
            .map(|path| Resource::from_entry(path, factory))
            .collect())
    }
}

impl DavResource for FolderResource<'_> {
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
        None
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
        true
    }
}

fn escape_html(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
